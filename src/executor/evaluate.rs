//! Evaluate executor implementation.
//!
//! This executor pulls a row from its child and evaluates an expression
//! against it. The row is passed through unchanged; the result is held by the
//! executor until a wrapping stage (projection, filter) consumes it. Scratch
//! memory used while evaluating is released before `next()` returns.

use crate::access::{Lookup, Row, Value};
use crate::executor::Executor;
use crate::expression::{resolve_lookup_keys, Expr, ExprEval};
use anyhow::{bail, Result};
use bumpalo::Bump;
use log::{debug, trace};
use std::sync::Arc;

/// Initial size of the per-row scratch arena
pub const SCRATCH_BLOCK_SIZE: usize = 1024;

/// Executor that evaluates an expression for each row
pub struct EvaluateExecutor {
    /// Child executor that produces rows
    child: Box<dyn Executor>,
    /// Expression to evaluate, bound during `init()`
    expr: Expr,
    /// Lookup the expression's properties are bound against
    lookup: Arc<Lookup>,
    /// Scratch memory, reset once each row is evaluated
    scratch: Bump,
    /// Result of the last successful evaluation, until consumed
    value: Option<Value<'static>>,
    /// Whether the executor has been initialized
    initialized: bool,
}

impl EvaluateExecutor {
    /// Create a new evaluate executor
    ///
    /// # Arguments
    /// * `child` - The child executor that produces rows
    /// * `expr` - The expression to evaluate; bound against `lookup` in `init()`
    /// * `lookup` - The lookup shared by the pipeline
    pub fn new(child: Box<dyn Executor>, expr: Expr, lookup: Arc<Lookup>) -> Self {
        Self {
            child,
            expr,
            lookup,
            scratch: Bump::with_capacity(SCRATCH_BLOCK_SIZE),
            value: None,
            initialized: false,
        }
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Whether a result is waiting to be consumed
    pub fn has_pending_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn value(&self) -> Option<&Value<'static>> {
        self.value.as_ref()
    }

    /// Take the held result, leaving the holder empty
    pub fn take_value(&mut self) -> Option<Value<'static>> {
        self.value.take()
    }
}

impl Executor for EvaluateExecutor {
    fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        // Initialize child executor
        self.child.init()?;

        resolve_lookup_keys(&mut self.expr, &self.lookup)?;
        debug!("{} over {}: {}", self.name(), self.child.name(), self.expr);

        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Row>> {
        if !self.initialized {
            bail!("Executor not initialized. Call init() first.");
        }

        let Some(row) = self.child.next()? else {
            return Ok(None);
        };

        // Release the previous row's result
        self.value = None;

        let result = ExprEval::new(&row, &self.scratch)
            .eval(&self.expr)
            .into_result()
            .map(Value::into_static);
        // The result no longer borrows the row or the arena
        self.scratch.reset();

        let value = match result {
            Ok(value) => value,
            Err(err) => {
                trace!("evaluation of {} failed: {}", self.expr, err);
                return Err(err.into());
            }
        };
        self.value = Some(value);

        Ok(Some(row))
    }

    fn name(&self) -> &'static str {
        "Evaluator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::test_util::{lookup, rows_of_x, FailingSource};
    use crate::executor::MemorySource;
    use crate::expression::{function, ErrorCode, ExpressionError};

    fn scratch_in_use(evaluator: &mut EvaluateExecutor) -> usize {
        evaluator
            .scratch
            .iter_allocated_chunks()
            .map(|chunk| chunk.len())
            .sum()
    }

    #[test]
    fn test_evaluate_holds_result() -> Result<()> {
        let (lookup, x, _) = lookup();
        let source = Box::new(MemorySource::new(rows_of_x(&lookup, &[2.0, 5.0])));
        let expr = Expr::mul_expr(Expr::property("x"), Expr::number(10.0));

        let mut evaluator = EvaluateExecutor::new(source, expr, lookup);
        evaluator.init()?;
        assert!(!evaluator.has_pending_value());

        let row = evaluator.next()?.expect("Should have first row");
        assert_eq!(row.get_item(&x), Some(&Value::number(2.0)));
        assert_eq!(evaluator.value(), Some(&Value::number(20.0)));

        // A new row replaces an unconsumed result
        evaluator.next()?.expect("Should have second row");
        assert_eq!(evaluator.take_value(), Some(Value::number(50.0)));
        assert!(!evaluator.has_pending_value());

        assert!(evaluator.next()?.is_none());
        Ok(())
    }

    #[test]
    fn test_evaluate_detaches_property_result() -> Result<()> {
        let (lookup, _, _) = lookup();
        let source = Box::new(MemorySource::new(rows_of_x(&lookup, &[4.0])));

        let mut evaluator = EvaluateExecutor::new(source, Expr::property("x"), lookup);
        evaluator.init()?;
        let row = evaluator.next()?.expect("Should have a row");
        drop(row);

        let value = evaluator.take_value().expect("Should hold a value");
        assert!(!value.is_reference());
        assert_eq!(value.to_number(), Some(4.0));
        Ok(())
    }

    #[test]
    fn test_no_value_becomes_error() -> Result<()> {
        let (lookup, _, _) = lookup();
        let row = lookup.row_from([("y", Value::number(1.0))])?;
        let source = Box::new(MemorySource::new(vec![row]));

        let mut evaluator = EvaluateExecutor::new(source, Expr::property("x"), lookup);
        evaluator.init()?;

        let err = evaluator.next().unwrap_err();
        let err = err.downcast_ref::<ExpressionError>().expect("expression error");
        assert_eq!(err.code(), ErrorCode::NoPropVal);
        assert!(!evaluator.has_pending_value());
        Ok(())
    }

    #[test]
    fn test_scratch_released_after_each_row() -> Result<()> {
        let (lookup, _, _) = lookup();
        let source = Box::new(FailingSource {
            rows: rows_of_x(&lookup, &[1.0, 2.0]),
        });
        let expr = Expr::call(
            function::CONCAT,
            vec![Expr::property("x"), Expr::string("!")],
        );

        let mut evaluator = EvaluateExecutor::new(source, expr, lookup);
        evaluator.init()?;

        evaluator.next()?.expect("Should have first row");
        assert_eq!(evaluator.value().and_then(|v| v.as_str()), Some("1!"));
        assert_eq!(scratch_in_use(&mut evaluator), 0);

        evaluator.next()?.expect("Should have second row");
        assert_eq!(scratch_in_use(&mut evaluator), 0);

        // Nothing left over once upstream fails
        assert!(evaluator.next().is_err());
        assert_eq!(scratch_in_use(&mut evaluator), 0);
        Ok(())
    }

    #[test]
    fn test_init_fails_on_unknown_property() {
        let (lookup, _, _) = lookup();
        let source = Box::new(MemorySource::new(vec![]));
        let mut evaluator = EvaluateExecutor::new(source, Expr::property("nope"), lookup);

        let err = evaluator.init().unwrap_err();
        assert_eq!(err.to_string(), "Property `nope` not loaded in pipeline");
        assert!(!evaluator.expr().is_bound());

        // Still not usable
        assert!(evaluator.next().is_err());
    }

    #[test]
    fn test_upstream_error_passes_through() -> Result<()> {
        let (lookup, _, _) = lookup();
        let source = Box::new(FailingSource {
            rows: rows_of_x(&lookup, &[1.0]),
        });
        let mut evaluator = EvaluateExecutor::new(source, Expr::property("x"), lookup);
        evaluator.init()?;

        assert!(evaluator.next()?.is_some());
        let err = evaluator.next().unwrap_err();
        assert_eq!(err.to_string(), "upstream failed");
        Ok(())
    }
}
