use std::rc::Rc;

use replica_core::{Promise, ReplicaError, Value};

use crate::dispatch::mismatch;

/// A new promise that settles with whatever the original settles with. The
/// settled value is passed through by reference and nothing is re-run.
pub fn duplicate_promise(value: &Value) -> Result<Value, ReplicaError> {
    let Value::Promise(src) = value else {
        return Err(mismatch("promise", value));
    };
    let copy = Rc::new(Promise::pending());
    let target = Rc::clone(&copy);
    src.on_settled(move |settlement| {
        target.settle(settlement.clone());
    });
    Ok(Value::Promise(copy))
}

#[cfg(test)]
mod tests {
    use replica_core::Settlement;

    use super::*;

    #[test]
    fn test_copy_follows_later_fulfillment() {
        let original = Value::promise(Promise::pending());
        let copy = duplicate_promise(&original).unwrap();
        let (Value::Promise(a), Value::Promise(b)) = (&original, &copy) else {
            panic!("expected promises");
        };
        assert!(!Rc::ptr_eq(a, b));
        assert!(b.is_pending());

        let payload = Value::record([("ok", Value::Bool(true))]);
        a.resolve(payload.clone());
        assert_eq!(b.settlement(), Some(Settlement::Fulfilled(payload)));
    }

    #[test]
    fn test_copy_of_rejected_promise_is_rejected() {
        let reason = Value::string("boom");
        let original = Value::promise(Promise::rejected(reason.clone()));
        let copy = duplicate_promise(&original).unwrap();
        let Value::Promise(copy) = copy else {
            panic!("expected a promise");
        };
        assert_eq!(copy.settlement(), Some(Settlement::Rejected(reason)));
    }

    #[test]
    fn test_settling_copy_does_not_touch_original() {
        let original = Value::promise(Promise::pending());
        let copy = duplicate_promise(&original).unwrap();
        let (Value::Promise(a), Value::Promise(b)) = (&original, &copy) else {
            panic!("expected promises");
        };
        b.resolve(Value::number(1.0));
        assert!(a.is_pending());
        a.resolve(Value::number(2.0));
        assert_eq!(b.settlement(), Some(Settlement::Fulfilled(Value::number(1.0))));
    }
}
