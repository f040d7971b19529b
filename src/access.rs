//! Access layer for row-oriented evaluation.
//!
//! This module provides the data the expression engine reads and writes:
//!
//! - **Value**: Tagged values with owned, shared and borrowed ownership modes
//! - **Lookup**: Name table resolving field names to per-row accessor keys
//! - **Row**: The record a pipeline stage evaluates one at a time
//!
//! Names are resolved against a [`Lookup`] once, then rows are read through the
//! resulting [`LookupKey`] handles without repeating the name search.

pub mod lookup;
pub mod value;

pub use lookup::{Lookup, LookupKey, Row};
pub use value::{Datum, Value, ValueKind};
