//! Expression evaluation against a single row.

use crate::access::{Row, Value};
use crate::expression::{
    ArithmeticOperator, Condition, Expr, ExpressionError, ExpressionResult, FunctionCall, Operand,
    Property,
};
use bumpalo::collections::Vec as BumpVec;
use bumpalo::Bump;
use log::trace;

/// Result of evaluating one expression node
#[derive(Debug)]
pub enum Outcome<'a> {
    /// Evaluation produced a value
    Ok(Value<'a>),
    /// The expression legitimately has no value for this row
    NoValue(ExpressionError),
    /// Evaluation failed
    Err(ExpressionError),
}

impl<'a> Outcome<'a> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok(_))
    }

    pub fn is_no_value(&self) -> bool {
        matches!(self, Outcome::NoValue(_))
    }

    pub fn value(&self) -> Option<&Value<'a>> {
        match self {
            Outcome::Ok(value) => Some(value),
            _ => None,
        }
    }

    /// Collapse into a `Result`, treating a missing value as an error
    pub fn into_result(self) -> ExpressionResult<Value<'a>> {
        match self {
            Outcome::Ok(value) => Ok(value),
            Outcome::NoValue(err) | Outcome::Err(err) => Err(err),
        }
    }
}

impl<'a> From<ExpressionResult<Value<'a>>> for Outcome<'a> {
    fn from(result: ExpressionResult<Value<'a>>) -> Self {
        match result {
            Ok(value) => Outcome::Ok(value),
            Err(err) => Outcome::Err(err),
        }
    }
}

/// Evaluator for one row.
///
/// Values it returns may borrow from the row or from literals of the tree,
/// so they cannot outlive either. Argument buffers go to the scratch arena,
/// which the owner resets in bulk once the row is done.
pub struct ExprEval<'a> {
    row: &'a Row,
    scratch: &'a Bump,
}

impl<'a> ExprEval<'a> {
    pub fn new(row: &'a Row, scratch: &'a Bump) -> Self {
        Self { row, scratch }
    }

    /// Evaluate `root` against the current row
    pub fn eval(&self, root: &'a Expr) -> Outcome<'a> {
        self.eval_internal(root)
    }

    fn eval_internal(&self, expr: &'a Expr) -> Outcome<'a> {
        match expr {
            Expr::Literal(value) => Outcome::Ok(Value::reference(value)),
            Expr::Property(prop) => self.eval_property(prop),
            Expr::Function(call) => self.eval_function(call),
            Expr::Op { op, left, right } => self.eval_op(*op, left, right).into(),
            Expr::Predicate { cond, left, right } => {
                self.eval_predicate(*cond, left, right).into()
            }
            Expr::Not { child } => self.eval_not(child).into(),
        }
    }

    /// Evaluate a child slot, treating a missing value as an error
    fn eval_operand(&self, slot: &'a Operand, name: &str) -> ExpressionResult<Value<'a>> {
        match slot {
            Some(expr) => self.eval_internal(expr).into_result(),
            None => Err(ExpressionError::MalformedExpression {
                slot: name.to_string(),
            }),
        }
    }

    fn eval_property(&self, prop: &'a Property) -> Outcome<'a> {
        let Some(key) = prop.key() else {
            return Outcome::Err(ExpressionError::UnboundProperty {
                name: prop.name.clone(),
            });
        };

        match self.row.get_item(key) {
            Some(value) => Outcome::Ok(Value::reference(value)),
            None => Outcome::NoValue(ExpressionError::NoPropertyValue {
                name: prop.name.clone(),
            }),
        }
    }

    fn eval_op(
        &self,
        op: ArithmeticOperator,
        left: &'a Operand,
        right: &'a Operand,
    ) -> ExpressionResult<Value<'a>> {
        let l = self.eval_operand(left, "left")?;
        let r = self.eval_operand(right, "right")?;

        match (l.to_number(), r.to_number()) {
            (Some(n1), Some(n2)) => Ok(Value::number(op.apply(n1, n2))),
            _ => Err(ExpressionError::NonNumericOperand {
                operator: op.as_str().to_string(),
                left: l.resolved_kind(),
                right: r.resolved_kind(),
            }),
        }
    }

    fn eval_predicate(
        &self,
        cond: Condition,
        left: &'a Operand,
        right: &'a Operand,
    ) -> ExpressionResult<Value<'a>> {
        let l = self.eval_operand(left, "left")?;

        let result = match cond {
            Condition::Or if l.bool_test() => true,
            Condition::And if !l.bool_test() => false,
            _ => {
                let r = self.eval_operand(right, "right")?;
                predicate_boolean(cond, &l, &r)?
            }
        };
        Ok(Value::boolean(result))
    }

    fn eval_not(&self, child: &'a Operand) -> ExpressionResult<Value<'a>> {
        let value = self.eval_operand(child, "child")?;
        Ok(Value::boolean(!value.bool_test()))
    }

    fn eval_function(&self, call: &'a FunctionCall) -> Outcome<'a> {
        let function = &call.function;
        let mut args = BumpVec::with_capacity_in(call.args.len(), self.scratch);

        // Arguments evaluate eagerly, left to right. Values already pushed are
        // released with the buffer on early return.
        for (i, slot) in call.args.iter().enumerate() {
            let Some(arg) = slot else {
                return Outcome::Err(ExpressionError::MalformedExpression {
                    slot: format!("args[{}]", i),
                });
            };
            match self.eval_internal(arg) {
                Outcome::Ok(value) => args.push(value),
                Outcome::NoValue(err) if function.tests_existence() => {
                    trace!("{}: passing absent argument {} ({})", function.name(), i, err);
                    args.push(Value::undefined());
                }
                Outcome::NoValue(err) | Outcome::Err(err) => return Outcome::Err(err),
            }
        }

        function.invoke(self, &args)
    }
}

fn predicate_boolean(cond: Condition, l: &Value<'_>, r: &Value<'_>) -> ExpressionResult<bool> {
    let result = match cond {
        Condition::Eq => l.equal(r)?,
        Condition::Ne => !l.equal(r)?,
        Condition::Lt => l.compare(r)?.is_lt(),
        Condition::Le => l.compare(r)?.is_le(),
        Condition::Gt => l.compare(r)?.is_gt(),
        Condition::Ge => l.compare(r)?.is_ge(),
        Condition::And => l.bool_test() && r.bool_test(),
        Condition::Or => l.bool_test() || r.bool_test(),
    };
    Ok(result)
}
