use std::rc::Rc;

use replica_core::{Callable, ReplicaError, Value};

use crate::dispatch::mismatch;

/// Rebuild a callable from its name, kind, source and body.
///
/// The copy gets a fresh, empty scope: bindings captured by the original are
/// not carried over, so a body reading one sees `undefined`.
pub fn duplicate_function(value: &Value) -> Result<Value, ReplicaError> {
    let Value::Function(src) = value else {
        return Err(mismatch("function", value));
    };
    let copy = Callable::from_body(
        src.name().map(str::to_string),
        src.kind(),
        Rc::clone(src.source()),
        Rc::clone(src.body()),
    );
    Ok(Value::function(copy))
}

#[cfg(test)]
mod tests {
    use replica_core::FunctionKind;

    use super::*;

    fn adder() -> Value {
        let callable = Callable::new(
            Some("add"),
            FunctionKind::Normal,
            "function add(a, b) { return a + b + offset; }",
            |scope, args| {
                let sum: f64 = args.iter().filter_map(Value::as_number).sum();
                let offset = scope.get("offset").as_number().unwrap_or(f64::NAN);
                Ok(Value::number(sum + offset))
            },
        )
        .capture("offset", Value::number(10.0));
        Value::function(callable)
    }

    #[test]
    fn test_copy_keeps_name_kind_and_source() {
        let original = adder();
        let copy = duplicate_function(&original).unwrap();
        let (Value::Function(a), Value::Function(b)) = (&original, &copy) else {
            panic!("expected functions");
        };
        assert!(!Rc::ptr_eq(a, b));
        assert_eq!(b.name(), Some("add"));
        assert_eq!(b.kind(), FunctionKind::Normal);
        assert_eq!(a.source(), b.source());
        assert!(Rc::ptr_eq(a.body(), b.body()));
    }

    #[test]
    fn test_copy_loses_captured_scope() {
        let original = adder();
        let copy = duplicate_function(&original).unwrap();
        let (Value::Function(a), Value::Function(b)) = (&original, &copy) else {
            panic!("expected functions");
        };
        let args = [Value::number(1.0), Value::number(2.0)];
        assert_eq!(a.call(&args).unwrap(), Value::number(13.0));
        assert!(b.scope().is_empty());
        let result = b.call(&args).unwrap();
        assert!(result.as_number().is_some_and(f64::is_nan));
    }

    #[test]
    fn test_rejects_non_functions() {
        assert!(matches!(
            duplicate_function(&Value::Null),
            Err(ReplicaError::Type { .. })
        ));
    }
}
