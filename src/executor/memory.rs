//! In-memory row source.
//!
//! Yields a fixed list of rows in order. Used as the upstream of a pipeline
//! when rows are already materialized.

use crate::access::Row;
use crate::executor::Executor;
use anyhow::{bail, Result};
use std::collections::VecDeque;

/// Executor that produces rows from a vector
pub struct MemorySource {
    rows: VecDeque<Row>,
    /// Number of rows handed out so far
    pulled: usize,
    initialized: bool,
}

impl MemorySource {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows: rows.into(),
            pulled: 0,
            initialized: false,
        }
    }

    pub fn pulled(&self) -> usize {
        self.pulled
    }

    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl Executor for MemorySource {
    fn init(&mut self) -> Result<()> {
        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Row>> {
        if !self.initialized {
            bail!("Executor not initialized. Call init() first.");
        }

        let row = self.rows.pop_front();
        if row.is_some() {
            self.pulled += 1;
        }
        Ok(row)
    }

    fn name(&self) -> &'static str {
        "MemorySource"
    }
}
