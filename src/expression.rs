//! Expression evaluation engine.
//!
//! This module provides:
//! - Expression tree representation
//! - One-time binding of property names to lookup keys
//! - Per-row evaluation with a tri-state outcome (value, no value, error)
//! - Callable functions invoked from function-call nodes

pub mod bind;
pub mod error;
pub mod eval;
pub mod expr;
pub mod function;
pub mod operator;

pub use bind::resolve_lookup_keys;
pub use error::{ErrorCode, ExpressionError, ExpressionResult};
pub use eval::{ExprEval, Outcome};
pub use expr::{Expr, FunctionCall, Operand, Property};
pub use function::Function;
pub use operator::{ArithmeticOperator, Condition};
