//! Callable functions for function-call nodes.
//!
//! A [`Function`] is a handle: a name, an accepted argument count and the
//! code to run. Arguments arrive already evaluated. Only the existence test
//! ([`EXISTS`]) is handed arguments that had no value; they show up as
//! undefined.

use crate::access::{Datum, Value, ValueKind};
use crate::expression::{ExprEval, ExpressionError, Outcome};
use std::fmt;
use std::fmt::Write as _;

/// Signature shared by every callable
pub type CallFn = for<'a> fn(&ExprEval<'a>, &[Value<'a>]) -> Outcome<'a>;

/// Upper bound for functions taking any number of arguments
pub const VARIADIC: usize = usize::MAX;

/// Handle to a callable function
#[derive(Clone, Copy)]
pub struct Function {
    name: &'static str,
    min_args: usize,
    max_args: usize,
    call: CallFn,
    tests_existence: bool,
}

impl Function {
    pub const fn new(name: &'static str, min_args: usize, max_args: usize, call: CallFn) -> Self {
        Self {
            name,
            min_args,
            max_args,
            call,
            tests_existence: false,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn min_args(&self) -> usize {
        self.min_args
    }

    pub fn max_args(&self) -> usize {
        self.max_args
    }

    /// Whether this is the existence test, which may receive absent arguments
    pub fn tests_existence(&self) -> bool {
        self.tests_existence
    }

    /// Check the argument count and run the function
    pub fn invoke<'a>(&self, ctx: &ExprEval<'a>, args: &[Value<'a>]) -> Outcome<'a> {
        if args.len() < self.min_args || args.len() > self.max_args {
            return Outcome::Err(ExpressionError::FunctionArgumentCount {
                function: self.name.to_string(),
                min: self.min_args,
                max: self.max_args,
                actual: args.len(),
            });
        }
        (self.call)(ctx, args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("min_args", &self.min_args)
            .field("max_args", &self.max_args)
            .field("tests_existence", &self.tests_existence)
            .finish()
    }
}

/// `exists(x)`: 1 when `x` has a non-null value, 0 otherwise
pub const EXISTS: Function = Function {
    name: "exists",
    min_args: 1,
    max_args: 1,
    call: func_exists,
    tests_existence: true,
};

pub const LOWER: Function = Function::new("lower", 1, 1, func_lower);
pub const UPPER: Function = Function::new("upper", 1, 1, func_upper);
pub const STRLEN: Function = Function::new("strlen", 1, 1, func_strlen);
pub const CONCAT: Function = Function::new("concat", 1, VARIADIC, func_concat);
pub const ABS: Function = Function::new("abs", 1, 1, func_abs);
pub const FLOOR: Function = Function::new("floor", 1, 1, func_floor);
pub const CEIL: Function = Function::new("ceil", 1, 1, func_ceil);
pub const SQRT: Function = Function::new("sqrt", 1, 1, func_sqrt);
pub const LOG: Function = Function::new("log", 1, 1, func_log);

fn func_exists<'a>(_ctx: &ExprEval<'a>, args: &[Value<'a>]) -> Outcome<'a> {
    let present = !matches!(
        args[0].resolved_kind(),
        ValueKind::Undefined | ValueKind::Null
    );
    Outcome::Ok(Value::boolean(present))
}

fn func_lower<'a>(_ctx: &ExprEval<'a>, args: &[Value<'a>]) -> Outcome<'a> {
    match args[0].as_str() {
        Some(s) => Outcome::Ok(Value::string(s.to_lowercase())),
        // Non-strings pass through unchanged
        None => Outcome::Ok(args[0].clone()),
    }
}

fn func_upper<'a>(_ctx: &ExprEval<'a>, args: &[Value<'a>]) -> Outcome<'a> {
    match args[0].as_str() {
        Some(s) => Outcome::Ok(Value::string(s.to_uppercase())),
        None => Outcome::Ok(args[0].clone()),
    }
}

fn func_strlen<'a>(_ctx: &ExprEval<'a>, args: &[Value<'a>]) -> Outcome<'a> {
    let len = args[0].as_str().map_or(0, str::len);
    Outcome::Ok(Value::number(len as f64))
}

fn func_concat<'a>(_ctx: &ExprEval<'a>, args: &[Value<'a>]) -> Outcome<'a> {
    let mut buf = String::new();
    for arg in args {
        match arg.datum() {
            Datum::Null | Datum::Undefined => {}
            datum => {
                let _ = write!(buf, "{}", datum);
            }
        }
    }
    Outcome::Ok(Value::string(buf))
}

fn math_unary<'a>(name: &str, args: &[Value<'a>], f: fn(f64) -> f64) -> Outcome<'a> {
    match args[0].to_number() {
        Some(n) => Outcome::Ok(Value::number(f(n))),
        None => Outcome::Err(ExpressionError::InvalidArgument {
            function: name.to_string(),
            index: 0,
            kind: args[0].resolved_kind(),
        }),
    }
}

fn func_abs<'a>(_ctx: &ExprEval<'a>, args: &[Value<'a>]) -> Outcome<'a> {
    math_unary("abs", args, f64::abs)
}

fn func_floor<'a>(_ctx: &ExprEval<'a>, args: &[Value<'a>]) -> Outcome<'a> {
    math_unary("floor", args, f64::floor)
}

fn func_ceil<'a>(_ctx: &ExprEval<'a>, args: &[Value<'a>]) -> Outcome<'a> {
    math_unary("ceil", args, f64::ceil)
}

fn func_sqrt<'a>(_ctx: &ExprEval<'a>, args: &[Value<'a>]) -> Outcome<'a> {
    math_unary("sqrt", args, f64::sqrt)
}

fn func_log<'a>(_ctx: &ExprEval<'a>, args: &[Value<'a>]) -> Outcome<'a> {
    math_unary("log", args, f64::ln)
}
