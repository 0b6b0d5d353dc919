//! Keyed and unique-element collections. Entries are carried over by
//! reference; weak collections get a new handle onto the same storage.

use std::rc::Rc;

use replica_core::{MapValue, ReplicaError, SetValue, Value};

use crate::dispatch::mismatch;

pub fn duplicate_map(value: &Value) -> Result<Value, ReplicaError> {
    let Value::Map(src) = value else {
        return Err(mismatch("map", value));
    };
    Ok(Value::map(MapValue::from_entries(src.entries())))
}

pub fn duplicate_set(value: &Value) -> Result<Value, ReplicaError> {
    let Value::Set(src) = value else {
        return Err(mismatch("set", value));
    };
    Ok(Value::set(SetValue::from_values(src.values())))
}

/// Weak storage cannot be enumerated, so the copy aliases it.
pub fn duplicate_weak_map(value: &Value) -> Result<Value, ReplicaError> {
    let Value::WeakMap(src) = value else {
        return Err(mismatch("weakmap", value));
    };
    Ok(Value::WeakMap(Rc::new(src.share())))
}

pub fn duplicate_weak_set(value: &Value) -> Result<Value, ReplicaError> {
    let Value::WeakSet(src) = value else {
        return Err(mismatch("weakset", value));
    };
    Ok(Value::WeakSet(Rc::new(src.share())))
}

#[cfg(test)]
mod tests {
    use replica_core::{Object, WeakMapValue, WeakSetValue};

    use super::*;

    #[test]
    fn test_map_copy_is_shallow_and_ordered() {
        let key = Value::object(Object::new());
        let payload = Value::record([("n", Value::number(1.0))]);
        let original = Value::map(MapValue::from_entries([
            (Value::string("z"), Value::Null),
            (key.clone(), payload.clone()),
        ]));
        let copy = duplicate_map(&original).unwrap();
        let Value::Map(copy) = &copy else {
            panic!("expected a map");
        };
        let entries = copy.entries();
        assert_eq!(entries[0].0, Value::string("z"));
        assert_eq!(entries[1].0, key);
        assert_eq!(entries[1].1, payload);

        copy.set(Value::string("extra"), Value::Null);
        let Value::Map(src) = &original else {
            unreachable!()
        };
        assert_eq!(src.len(), 2);
    }

    #[test]
    fn test_set_copy_keeps_elements() {
        let element = Value::array(vec![]);
        let original = Value::set(SetValue::from_values([Value::number(1.0), element.clone()]));
        let copy = duplicate_set(&original).unwrap();
        let Value::Set(copy) = &copy else {
            panic!("expected a set");
        };
        assert_eq!(copy.values(), vec![Value::number(1.0), element]);
        copy.delete(&Value::number(1.0));
        assert!(matches!(&original, Value::Set(s) if s.len() == 2));
    }

    #[test]
    fn test_weak_copies_alias_storage() {
        let key = Value::object(Object::new());
        let map = WeakMapValue::new();
        map.set(&key, Value::number(1.0)).unwrap();
        let original = Value::WeakMap(Rc::new(map));
        let copy = duplicate_weak_map(&original).unwrap();
        let (Value::WeakMap(a), Value::WeakMap(b)) = (&original, &copy) else {
            panic!("expected weak maps");
        };
        assert!(!Rc::ptr_eq(a, b));
        assert!(b.shares_storage_with(a));
        assert_eq!(b.get(&key), Some(Value::number(1.0)));

        let set = Value::WeakSet(Rc::new(WeakSetValue::new()));
        let copy = duplicate_weak_set(&set).unwrap();
        let (Value::WeakSet(a), Value::WeakSet(b)) = (&set, &copy) else {
            panic!("expected weak sets");
        };
        b.add(&key).unwrap();
        assert!(a.has(&key));
    }
}
