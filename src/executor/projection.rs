//! Projection executor implementation.
//!
//! This executor computes an expression for every row from its child and
//! writes the result into the row under an output key. Rows keep every field
//! they already had.

use crate::access::{Lookup, LookupKey, Row};
use crate::executor::{EvaluateExecutor, Executor};
use crate::expression::Expr;
use anyhow::Result;
use std::sync::Arc;

/// Executor that adds a computed field to each row
pub struct ProjectionExecutor {
    /// Evaluates the expression for each child row
    evaluator: EvaluateExecutor,
    /// Key the computed value is stored under
    out_key: LookupKey,
}

impl ProjectionExecutor {
    /// Create a new projection executor
    ///
    /// # Arguments
    /// * `child` - The child executor that produces rows
    /// * `expr` - The expression computing the new field
    /// * `lookup` - The lookup shared by the pipeline
    /// * `out_key` - Key of `lookup` receiving the computed value
    pub fn new(
        child: Box<dyn Executor>,
        expr: Expr,
        lookup: Arc<Lookup>,
        out_key: LookupKey,
    ) -> Self {
        Self {
            evaluator: EvaluateExecutor::new(child, expr, lookup),
            out_key,
        }
    }

    pub fn out_key(&self) -> &LookupKey {
        &self.out_key
    }

    /// Whether the evaluator still holds a result
    pub fn has_pending_value(&self) -> bool {
        self.evaluator.has_pending_value()
    }
}

impl Executor for ProjectionExecutor {
    fn init(&mut self) -> Result<()> {
        self.evaluator.init()
    }

    fn next(&mut self) -> Result<Option<Row>> {
        let Some(mut row) = self.evaluator.next()? else {
            return Ok(None);
        };

        // Ownership of the result moves into the row
        if let Some(value) = self.evaluator.take_value() {
            row.write_own(&self.out_key, value);
        }
        Ok(Some(row))
    }

    fn name(&self) -> &'static str {
        "Projector"
    }
}
