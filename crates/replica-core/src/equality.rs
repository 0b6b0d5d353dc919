//! Structural equality over the value model.
//!
//! Primitives compare with SameValue (`NaN` equals `NaN`, `+0` differs from
//! `-0`). Containers compare member-wise and in enumeration order. Kinds that
//! have no independent structure compare by what they share: weak collections
//! by storage, promises by identity or equal settlement, opaque handles by
//! identity. Cyclic values are not supported.

use std::rc::Rc;

use crate::object::{Array, Object};
use crate::promise::Settlement;
use crate::value::Value;

pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(x), Value::Object(y)) => Rc::ptr_eq(x, y) || objects_equal(x, y),
        (Value::Array(x), Value::Array(y)) => Rc::ptr_eq(x, y) || arrays_equal(x, y),
        (Value::Function(x), Value::Function(y)) => {
            Rc::ptr_eq(x, y)
                || (x.kind() == y.kind() && x.name() == y.name() && x.source() == y.source())
        }
        (Value::Error(x), Value::Error(y)) => x.name() == y.name() && x.message() == y.message(),
        (Value::RegExp(x), Value::RegExp(y)) => {
            x.source() == y.source() && x.flags() == y.flags()
        }
        (Value::Date(x), Value::Date(y)) => x.time() == y.time(),
        (Value::Map(x), Value::Map(y)) => {
            let (xs, ys) = (x.entries(), y.entries());
            xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(&ys)
                    .all(|((k1, v1), (k2, v2))| deep_equal(k1, k2) && deep_equal(v1, v2))
        }
        (Value::Set(x), Value::Set(y)) => all_equal(&x.values(), &y.values()),
        (Value::WeakMap(x), Value::WeakMap(y)) => Rc::ptr_eq(x, y) || x.shares_storage_with(y),
        (Value::WeakSet(x), Value::WeakSet(y)) => Rc::ptr_eq(x, y) || x.shares_storage_with(y),
        (Value::Promise(x), Value::Promise(y)) => {
            Rc::ptr_eq(x, y)
                || match (x.settlement(), y.settlement()) {
                    (Some(Settlement::Fulfilled(a)), Some(Settlement::Fulfilled(b)))
                    | (Some(Settlement::Rejected(a)), Some(Settlement::Rejected(b))) => {
                        deep_equal(&a, &b)
                    }
                    _ => false,
                }
        }
        (Value::TypedArray(x), Value::TypedArray(y)) => {
            x.kind() == y.kind() && all_equal(&x.to_values(), &y.to_values())
        }
        (Value::ArrayBuffer(x), Value::ArrayBuffer(y)) => x.to_vec() == y.to_vec(),
        (Value::DataView(x), Value::DataView(y)) => {
            x.byte_offset() == y.byte_offset()
                && x.byte_length() == y.byte_length()
                && (Rc::ptr_eq(x.buffer(), y.buffer())
                    || x.buffer().to_vec() == y.buffer().to_vec())
        }
        _ => a == b,
    }
}

fn all_equal(xs: &[Value], ys: &[Value]) -> bool {
    xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| deep_equal(x, y))
}

fn objects_equal(x: &Object, y: &Object) -> bool {
    let (xk, yk) = (x.enumerable_keys(), y.enumerable_keys());
    xk == yk
        && xk.iter().all(|key| match (x.get_spur(*key), y.get_spur(*key)) {
            (Some(a), Some(b)) => deep_equal(&a, &b),
            _ => false,
        })
}

fn arrays_equal(x: &Array, y: &Array) -> bool {
    if x.len() != y.len() {
        return false;
    }
    let (xk, yk) = (x.enumerable_keys(), y.enumerable_keys());
    xk == yk
        && xk.iter().all(|key| match (x.get_key(*key), y.get_key(*key)) {
            (Some(a), Some(b)) => deep_equal(&a, &b),
            _ => false,
        })
}
