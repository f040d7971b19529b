//! Filter executor implementation.
//!
//! This executor filters rows from a child executor based on a predicate
//! expression. It implements the volcano-style iterator model, producing one
//! row at a time whose predicate value is truthy.

use crate::access::{Lookup, Row};
use crate::executor::{EvaluateExecutor, Executor};
use crate::expression::Expr;
use anyhow::Result;
use log::trace;
use std::sync::Arc;

/// Executor that filters rows based on an expression
pub struct FilterExecutor {
    /// Evaluates the predicate for each child row
    evaluator: EvaluateExecutor,
    /// Number of rows dropped so far
    discarded: usize,
}

impl FilterExecutor {
    /// Create a new filter executor
    ///
    /// # Arguments
    /// * `child` - The child executor that produces rows
    /// * `predicate` - Expression whose truthiness decides whether a row passes
    /// * `lookup` - The lookup shared by the pipeline
    pub fn new(child: Box<dyn Executor>, predicate: Expr, lookup: Arc<Lookup>) -> Self {
        Self {
            evaluator: EvaluateExecutor::new(child, predicate, lookup),
            discarded: 0,
        }
    }

    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// Whether the evaluator still holds a result
    pub fn has_pending_value(&self) -> bool {
        self.evaluator.has_pending_value()
    }
}

impl Executor for FilterExecutor {
    fn init(&mut self) -> Result<()> {
        self.evaluator.init()
    }

    fn next(&mut self) -> Result<Option<Row>> {
        // Keep pulling rows until one passes the predicate
        while let Some(row) = self.evaluator.next()? {
            let passed = self
                .evaluator
                .take_value()
                .is_some_and(|value| value.bool_test());
            if passed {
                return Ok(Some(row));
            }

            self.discarded += 1;
            trace!("{} dropped row #{}", self.name(), self.discarded);
        }
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "Filter"
    }
}
