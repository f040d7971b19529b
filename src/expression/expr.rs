//! Expression tree definitions.

use crate::access::{LookupKey, Value};
use crate::expression::function::Function;
use crate::expression::operator::{ArithmeticOperator, Condition};
use std::fmt;

/// A child slot; `None` marks a malformed tree that binding rejects
pub type Operand = Option<Box<Expr>>;

/// Named field reference, resolved to a lookup key by binding
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    key: Option<LookupKey>,
}

impl Property {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: None,
        }
    }

    /// The resolved accessor, present once the property is bound
    pub fn key(&self) -> Option<&LookupKey> {
        self.key.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.key.is_some()
    }

    pub(crate) fn bind(&mut self, key: LookupKey) {
        self.key = Some(key);
    }
}

/// Call of a function over an ordered list of argument expressions
#[derive(Debug, Clone)]
pub struct FunctionCall {
    pub function: Function,
    pub args: Vec<Operand>,
}

/// Expression tree node
#[derive(Debug, Clone)]
pub enum Expr {
    /// Constant value, referenced rather than copied by evaluation
    Literal(Value<'static>),

    /// Field of the current row
    Property(Property),

    /// Function call
    Function(FunctionCall),

    /// Arithmetic operation
    Op {
        op: ArithmeticOperator,
        left: Operand,
        right: Operand,
    },

    /// Comparison or logical condition
    Predicate {
        cond: Condition,
        left: Operand,
        right: Operand,
    },

    /// Logical negation
    Not { child: Operand },
}

impl Expr {
    /// Create a literal expression
    pub fn literal(value: Value<'static>) -> Self {
        Expr::Literal(value)
    }

    pub fn number(n: f64) -> Self {
        Expr::Literal(Value::number(n))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Expr::Literal(Value::string(s))
    }

    pub fn null() -> Self {
        Expr::Literal(Value::null())
    }

    /// Create an unbound property reference
    pub fn property(name: impl Into<String>) -> Self {
        Expr::Property(Property::new(name))
    }

    /// Create a function call expression
    pub fn call(function: Function, args: Vec<Expr>) -> Self {
        Expr::Function(FunctionCall {
            function,
            args: args.into_iter().map(|arg| Some(Box::new(arg))).collect(),
        })
    }

    /// Create an arithmetic expression
    pub fn op(op: ArithmeticOperator, left: Expr, right: Expr) -> Self {
        Expr::Op {
            op,
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }

    /// Create a predicate expression
    pub fn predicate(cond: Condition, left: Expr, right: Expr) -> Self {
        Expr::Predicate {
            cond,
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }

    pub fn add_expr(left: Expr, right: Expr) -> Self {
        Self::op(ArithmeticOperator::Add, left, right)
    }

    pub fn sub_expr(left: Expr, right: Expr) -> Self {
        Self::op(ArithmeticOperator::Sub, left, right)
    }

    pub fn mul_expr(left: Expr, right: Expr) -> Self {
        Self::op(ArithmeticOperator::Mul, left, right)
    }

    pub fn div_expr(left: Expr, right: Expr) -> Self {
        Self::op(ArithmeticOperator::Div, left, right)
    }

    pub fn mod_expr(left: Expr, right: Expr) -> Self {
        Self::op(ArithmeticOperator::Mod, left, right)
    }

    pub fn pow_expr(left: Expr, right: Expr) -> Self {
        Self::op(ArithmeticOperator::Pow, left, right)
    }

    pub fn eq(left: Expr, right: Expr) -> Self {
        Self::predicate(Condition::Eq, left, right)
    }

    pub fn ne(left: Expr, right: Expr) -> Self {
        Self::predicate(Condition::Ne, left, right)
    }

    pub fn lt(left: Expr, right: Expr) -> Self {
        Self::predicate(Condition::Lt, left, right)
    }

    pub fn le(left: Expr, right: Expr) -> Self {
        Self::predicate(Condition::Le, left, right)
    }

    pub fn gt(left: Expr, right: Expr) -> Self {
        Self::predicate(Condition::Gt, left, right)
    }

    pub fn ge(left: Expr, right: Expr) -> Self {
        Self::predicate(Condition::Ge, left, right)
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Self::predicate(Condition::And, left, right)
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Self::predicate(Condition::Or, left, right)
    }

    pub fn not_expr(child: Expr) -> Self {
        Expr::Not {
            child: Some(Box::new(child)),
        }
    }

    /// Drop every resolved lookup key in the tree
    pub fn unbind(&mut self) {
        match self {
            Expr::Literal(_) => {}
            Expr::Property(prop) => prop.key = None,
            Expr::Function(call) => {
                for arg in call.args.iter_mut().flatten() {
                    arg.unbind();
                }
            }
            Expr::Op { left, right, .. } | Expr::Predicate { left, right, .. } => {
                for child in [left, right].into_iter().flatten() {
                    child.unbind();
                }
            }
            Expr::Not { child } => {
                if let Some(child) = child {
                    child.unbind();
                }
            }
        }
    }

    /// Whether every property in the tree has a resolved key
    pub fn is_bound(&self) -> bool {
        match self {
            Expr::Literal(_) => true,
            Expr::Property(prop) => prop.is_bound(),
            Expr::Function(call) => call.args.iter().flatten().all(|arg| arg.is_bound()),
            Expr::Op { left, right, .. } | Expr::Predicate { left, right, .. } => {
                [left, right].into_iter().flatten().all(|child| child.is_bound())
            }
            Expr::Not { child } => child.as_ref().map_or(true, |child| child.is_bound()),
        }
    }
}

struct Slot<'e>(&'e Operand);

impl fmt::Display for Slot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(expr) => write!(f, "{}", expr),
            None => f.write_str("<missing>"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(value) => match value.as_str() {
                Some(s) => write!(f, "{:?}", s),
                None => write!(f, "{}", value),
            },
            Expr::Property(prop) => write!(f, "@{}", prop.name),
            Expr::Function(call) => {
                write!(f, "{}(", call.function.name())?;
                for (i, arg) in call.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", Slot(arg))?;
                }
                f.write_str(")")
            }
            Expr::Op { op, left, right } => {
                write!(f, "({} {} {})", Slot(left), op.as_str(), Slot(right))
            }
            Expr::Predicate { cond, left, right } => {
                write!(f, "({} {} {})", Slot(left), cond.as_str(), Slot(right))
            }
            Expr::Not { child } => write!(f, "!{}", Slot(child)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Lookup;
    use crate::expression::function;

    #[test]
    fn test_display() {
        let expr = Expr::and(
            Expr::gt(
                Expr::mul_expr(Expr::property("price"), Expr::number(2.0)),
                Expr::number(10.5),
            ),
            Expr::not_expr(Expr::call(
                function::EXISTS,
                vec![Expr::property("discount")],
            )),
        );
        assert_eq!(
            expr.to_string(),
            "(((@price * 2) > 10.5) && !exists(@discount))"
        );
    }

    #[test]
    fn test_display_literals_and_missing_slots() {
        assert_eq!(Expr::string("a b").to_string(), "\"a b\"");
        assert_eq!(Expr::null().to_string(), "null");

        let malformed = Expr::Op {
            op: ArithmeticOperator::Pow,
            left: Some(Box::new(Expr::number(2.0))),
            right: None,
        };
        assert_eq!(malformed.to_string(), "(2 ^ <missing>)");
    }

    #[test]
    fn test_unbind_clears_all_keys() {
        let lookup = Lookup::with_keys(["a", "b"]);
        let mut expr = Expr::add_expr(Expr::property("a"), Expr::not_expr(Expr::property("b")));
        assert!(!expr.is_bound());

        if let Expr::Op {
            left: Some(left),
            right: Some(right),
            ..
        } = &mut expr
        {
            if let Expr::Property(prop) = left.as_mut() {
                prop.bind(lookup.get_key("a").unwrap());
            }
            if let Expr::Not { child: Some(child) } = right.as_mut() {
                if let Expr::Property(prop) = child.as_mut() {
                    prop.bind(lookup.get_key("b").unwrap());
                }
            }
        }
        assert!(expr.is_bound());

        expr.unbind();
        assert!(!expr.is_bound());
    }
}
