//! Operator definitions for expressions.

/// Arithmetic operators of binary-op nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl ArithmeticOperator {
    /// Map an operator symbol to its operator
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '+' => Some(ArithmeticOperator::Add),
            '-' => Some(ArithmeticOperator::Sub),
            '*' => Some(ArithmeticOperator::Mul),
            '/' => Some(ArithmeticOperator::Div),
            '%' => Some(ArithmeticOperator::Mod),
            '^' => Some(ArithmeticOperator::Pow),
            _ => None,
        }
    }

    /// Get the display string for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            ArithmeticOperator::Add => "+",
            ArithmeticOperator::Sub => "-",
            ArithmeticOperator::Mul => "*",
            ArithmeticOperator::Div => "/",
            ArithmeticOperator::Mod => "%",
            ArithmeticOperator::Pow => "^",
        }
    }

    /// Apply the operator to two numbers.
    ///
    /// Division follows IEEE semantics. Modulo truncates both operands to
    /// integers first; a zero divisor yields NaN.
    pub fn apply(&self, left: f64, right: f64) -> f64 {
        match self {
            ArithmeticOperator::Add => left + right,
            ArithmeticOperator::Sub => left - right,
            ArithmeticOperator::Mul => left * right,
            ArithmeticOperator::Div => left / right,
            ArithmeticOperator::Mod => (left as i64)
                .checked_rem(right as i64)
                .map_or(f64::NAN, |rem| rem as f64),
            ArithmeticOperator::Pow => left.powf(right),
        }
    }
}

/// Conditions of predicate nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    // Comparison
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
    Ne,

    // Logical
    And,
    Or,
}

impl Condition {
    /// Get the display string for this condition
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Eq => "==",
            Condition::Lt => "<",
            Condition::Le => "<=",
            Condition::Gt => ">",
            Condition::Ge => ">=",
            Condition::Ne => "!=",
            Condition::And => "&&",
            Condition::Or => "||",
        }
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, Condition::And | Condition::Or)
    }
}
