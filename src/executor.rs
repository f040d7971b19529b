//! Executor layer for pipeline stages.
//!
//! This module implements the Volcano-style iterator model for result
//! processing. Each executor produces rows one at a time via the `next()`
//! method, pulling from its child as needed. Stages that evaluate an
//! expression bind it once in `init()` and evaluate it once per row.

use crate::access::Row;
use anyhow::Result;

pub mod evaluate;
pub mod filter;
pub mod memory;
pub mod projection;

// Re-export executors
pub use evaluate::{EvaluateExecutor, SCRATCH_BLOCK_SIZE};
pub use filter::FilterExecutor;
pub use memory::MemorySource;
pub use projection::ProjectionExecutor;

/// Trait for all pipeline executors
pub trait Executor: Send {
    /// Initialize the executor. This must be called before `next()`.
    fn init(&mut self) -> Result<()>;

    /// Get the next row from the executor.
    /// Returns None when there are no more rows.
    fn next(&mut self) -> Result<Option<Row>>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}
