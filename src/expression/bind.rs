//! Binding of property names to lookup keys.
//!
//! Binding walks the tree once, before any row is evaluated, and stores the
//! resolved [`LookupKey`](crate::access::LookupKey) on every property node.
//! Evaluation afterwards reads row slots directly.

use crate::access::Lookup;
use crate::expression::{Expr, ExpressionError, ExpressionResult, Operand};
use log::debug;

/// Resolve every property of `expr` against `lookup`.
///
/// Stops at the first unknown property or missing child slot. On failure the
/// whole tree is left unbound, so no partially bound tree can be evaluated.
pub fn resolve_lookup_keys(expr: &mut Expr, lookup: &Lookup) -> ExpressionResult<()> {
    match resolve_keys(expr, lookup) {
        Ok(()) => {
            debug!("bound expression {}", expr);
            Ok(())
        }
        Err(err) => {
            expr.unbind();
            debug!("binding failed for {}: {}", expr, err);
            Err(err)
        }
    }
}

fn resolve_keys(expr: &mut Expr, lookup: &Lookup) -> ExpressionResult<()> {
    match expr {
        Expr::Literal(_) => Ok(()),
        Expr::Property(prop) => {
            let key = lookup
                .get_key(&prop.name)
                .ok_or_else(|| ExpressionError::PropertyNotLoaded {
                    name: prop.name.clone(),
                })?;
            prop.bind(key);
            Ok(())
        }
        Expr::Function(call) => {
            for (i, arg) in call.args.iter_mut().enumerate() {
                resolve_slot(arg, || format!("args[{}]", i), lookup)?;
            }
            Ok(())
        }
        Expr::Op { left, right, .. } | Expr::Predicate { left, right, .. } => {
            resolve_slot(left, || "left".to_string(), lookup)?;
            resolve_slot(right, || "right".to_string(), lookup)
        }
        Expr::Not { child } => resolve_slot(child, || "child".to_string(), lookup),
    }
}

fn resolve_slot<F>(slot: &mut Operand, slot_name: F, lookup: &Lookup) -> ExpressionResult<()>
where
    F: FnOnce() -> String,
{
    match slot {
        Some(child) => resolve_keys(child, lookup),
        None => Err(ExpressionError::MalformedExpression { slot: slot_name() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{function, ArithmeticOperator, ErrorCode};

    fn lookup() -> Lookup {
        Lookup::with_keys(["x", "y", "name"])
    }

    #[test]
    fn test_bind_resolves_every_property() -> ExpressionResult<()> {
        let mut expr = Expr::and(
            Expr::gt(Expr::property("x"), Expr::number(1.0)),
            Expr::call(function::LOWER, vec![Expr::property("name")]),
        );
        resolve_lookup_keys(&mut expr, &lookup())?;
        assert!(expr.is_bound());

        if let Expr::Predicate { left: Some(left), .. } = &expr {
            if let Expr::Predicate { left: Some(prop), .. } = left.as_ref() {
                if let Expr::Property(prop) = prop.as_ref() {
                    assert_eq!(prop.key().map(|k| k.index()), Some(0));
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_bind_literal_is_noop() -> ExpressionResult<()> {
        let mut expr = Expr::number(3.0);
        resolve_lookup_keys(&mut expr, &Lookup::new())?;
        Ok(())
    }

    #[test]
    fn test_unknown_property_fails_anywhere_in_tree() {
        let trees = vec![
            Expr::property("missing"),
            Expr::add_expr(Expr::property("x"), Expr::property("missing")),
            Expr::not_expr(Expr::eq(Expr::property("missing"), Expr::number(0.0))),
            Expr::call(
                function::CONCAT,
                vec![Expr::property("name"), Expr::property("missing")],
            ),
        ];

        for mut expr in trees {
            let err = resolve_lookup_keys(&mut expr, &lookup()).unwrap_err();
            assert_eq!(
                err,
                ExpressionError::PropertyNotLoaded {
                    name: "missing".to_string()
                }
            );
            assert_eq!(err.code(), ErrorCode::NoPropKey);
            // Nothing stays bound after a failed pass
            assert!(!expr.is_bound());
        }
    }

    #[test]
    fn test_missing_child_is_malformed() {
        let mut expr = Expr::Op {
            op: ArithmeticOperator::Add,
            left: Some(Box::new(Expr::property("x"))),
            right: None,
        };
        let err = resolve_lookup_keys(&mut expr, &lookup()).unwrap_err();
        assert_eq!(
            err,
            ExpressionError::MalformedExpression {
                slot: "right".to_string()
            }
        );
        assert!(!expr.is_bound());

        let mut call = Expr::call(function::CONCAT, vec![Expr::property("x")]);
        if let Expr::Function(call) = &mut call {
            call.args.push(None);
        }
        let err = resolve_lookup_keys(&mut call, &lookup()).unwrap_err();
        assert_eq!(err.to_string(), "Missing (or badly formatted) value for args[1]");
    }
}
