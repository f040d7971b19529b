//! Error types for expression binding and evaluation.

use crate::access::ValueKind;
use thiserror::Error;

/// Coarse error code carried alongside each error's message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A property name did not resolve to a lookup key
    NoPropKey,
    /// A bound property had no value in the current row
    NoPropVal,
    /// A value could not be used as a number
    NotNumeric,
    /// The expression tree itself is malformed
    Expr,
    /// A function rejected its arguments
    ParseArgs,
}

/// Errors that can occur while binding or evaluating an expression
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    /// Property name missing from the lookup at bind time
    #[error("Property `{name}` not loaded in pipeline")]
    PropertyNotLoaded { name: String },

    /// Property reached evaluation without a resolved key
    #[error("Property `{name}` evaluated before it was bound")]
    UnboundProperty { name: String },

    /// Bound property absent from the current row
    #[error("No value for property `{name}`")]
    NoPropertyValue { name: String },

    /// Arithmetic on a value that does not convert to a number
    #[error("Non-numeric operand for operator {operator}: left={left}, right={right}")]
    NonNumericOperand {
        operator: String,
        left: ValueKind,
        right: ValueKind,
    },

    /// A string compared against a number did not parse as one
    #[error("Error converting string '{value}' to number")]
    ConversionFailed { value: String },

    /// No ordering is defined between the two kinds
    #[error("Cannot compare {left} with {right}")]
    IncomparableValues { left: ValueKind, right: ValueKind },

    /// A child slot of the tree is empty
    #[error("Missing (or badly formatted) value for {slot}")]
    MalformedExpression { slot: String },

    /// Wrong number of function arguments
    #[error("Function {function} expects {} arguments, got {actual}", arity_text(.min, .max))]
    FunctionArgumentCount {
        function: String,
        min: usize,
        max: usize,
        actual: usize,
    },

    /// A function argument has a kind the function cannot use
    #[error("Invalid type ({kind}) for argument {index} in function '{function}'")]
    InvalidArgument {
        function: String,
        index: usize,
        kind: ValueKind,
    },
}

fn arity_text(min: &usize, max: &usize) -> String {
    if min == max {
        min.to_string()
    } else if *max == usize::MAX {
        format!("at least {}", min)
    } else {
        format!("{} to {}", min, max)
    }
}

impl ExpressionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ExpressionError::PropertyNotLoaded { .. } | ExpressionError::UnboundProperty { .. } => {
                ErrorCode::NoPropKey
            }
            ExpressionError::NoPropertyValue { .. } => ErrorCode::NoPropVal,
            ExpressionError::NonNumericOperand { .. }
            | ExpressionError::ConversionFailed { .. }
            | ExpressionError::IncomparableValues { .. } => ErrorCode::NotNumeric,
            ExpressionError::MalformedExpression { .. } => ErrorCode::Expr,
            ExpressionError::FunctionArgumentCount { .. }
            | ExpressionError::InvalidArgument { .. } => ErrorCode::ParseArgs,
        }
    }
}

/// Result type for expression operations
pub type ExpressionResult<T> = Result<T, ExpressionError>;
