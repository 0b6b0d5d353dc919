#![allow(dead_code)]

use std::rc::Rc;

use replica::{duplicate, ReplicaError, Value};
use replica_core::{deep_equal, HostObject};
use tracing_subscriber::EnvFilter;

/// Install a test-friendly subscriber once per test binary. Filter with
/// `RUST_LOG`, e.g. `RUST_LOG=replica=trace`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Duplicate, panicking with the error on failure
pub fn dup(value: &Value) -> Value {
    init_tracing();
    duplicate(value).unwrap_or_else(|e| panic!("duplicate failed for `{value}`: {e}"))
}

/// Duplicate, expecting an error
pub fn dup_err(value: &Value) -> ReplicaError {
    init_tracing();
    match duplicate(value) {
        Ok(copy) => panic!("expected an error duplicating `{value}`, got `{copy}`"),
        Err(e) => e,
    }
}

/// Assert `copy` is structurally equal to `original` but not the same heap
/// value.
pub fn assert_independent(original: &Value, copy: &Value) {
    assert!(
        deep_equal(original, copy),
        "copy `{copy}` differs from `{original}`"
    );
    if original.identity().is_some() {
        assert_ne!(original.identity(), copy.identity(), "copy aliases `{original}`");
    }
}

pub fn host(class_name: &str) -> Value {
    Value::Host(Rc::new(HostObject {
        class_name: class_name.to_string(),
    }))
}

/// Generate one test per value asserting the copy is equal but independent.
///
/// Usage:
/// ```ignore
/// independent_copy_tests! {
///     copy_date: Value::date(DateValue::from_millis(0)),
/// }
/// ```
#[macro_export]
macro_rules! independent_copy_tests {
    ($($name:ident : $value:expr),* $(,)?) => {
        $(
            #[test]
            fn $name() {
                let original = $value;
                let copy = common::dup(&original);
                common::assert_independent(&original, &copy);
            }
        )*
    };
}
