//! Keyed and unique-element collections, strong and weak.
//!
//! Strong collections keep insertion order and compare keys with
//! SameValueZero. Weak collections are handles onto a [`WeakTable`] keyed by
//! heap address; several handles may share one table.

use std::any::Any;
use std::cell::RefCell;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use hashbrown::HashMap;
use indexmap::{IndexMap, IndexSet};

use crate::error::ReplicaError;
use crate::value::Value;

/// SameValueZero: like `==` on [`Value`] except that `+0` equals `-0`.
pub fn same_value_zero(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y || (x.is_nan() && y.is_nan()),
        _ => a == b,
    }
}

/// A collection key hashed and compared with SameValueZero.
#[derive(Debug, Clone)]
pub struct EntryKey(pub Value);

impl EntryKey {
    /// Normalizes `-0` to `+0` the way keyed collections store it.
    pub fn new(value: Value) -> Self {
        match value {
            Value::Number(n) if n == 0.0 => EntryKey(Value::Number(0.0)),
            other => EntryKey(other),
        }
    }

    pub fn value(&self) -> &Value {
        &self.0
    }
}

impl PartialEq for EntryKey {
    fn eq(&self, other: &Self) -> bool {
        same_value_zero(&self.0, &other.0)
    }
}

impl Eq for EntryKey {}

impl Hash for EntryKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(&self.0).hash(state);
        match &self.0 {
            Value::Undefined | Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Number(n) => {
                let bits = if n.is_nan() {
                    f64::NAN.to_bits()
                } else if *n == 0.0 {
                    0
                } else {
                    n.to_bits()
                };
                bits.hash(state);
            }
            Value::BigInt(n) => n.hash(state),
            Value::String(s) => s.hash(state),
            Value::Symbol(s) => s.hash(state),
            Value::Namespace(ns) => ns.hash(state),
            other => other.identity().hash(state),
        }
    }
}

/// An insertion-ordered key/value collection.
#[derive(Debug, Default)]
pub struct MapValue {
    entries: RefCell<IndexMap<EntryKey, Value>>,
}

impl MapValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        let map = MapValue::new();
        for (key, value) in entries {
            map.set(key, value);
        }
        map
    }

    pub fn get(&self, key: &Value) -> Option<Value> {
        self.entries
            .borrow()
            .get(&EntryKey::new(key.clone()))
            .cloned()
    }

    /// Insert or update; an existing key keeps its position.
    pub fn set(&self, key: Value, value: Value) {
        self.entries.borrow_mut().insert(EntryKey::new(key), value);
    }

    pub fn has(&self, key: &Value) -> bool {
        self.entries
            .borrow()
            .contains_key(&EntryKey::new(key.clone()))
    }

    pub fn delete(&self, key: &Value) -> bool {
        self.entries
            .borrow_mut()
            .shift_remove(&EntryKey::new(key.clone()))
            .is_some()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Snapshot of the entries in insertion order.
    pub fn entries(&self) -> Vec<(Value, Value)> {
        self.entries
            .borrow()
            .iter()
            .map(|(k, v)| (k.0.clone(), v.clone()))
            .collect()
    }
}

/// An insertion-ordered collection of unique values.
#[derive(Debug, Default)]
pub struct SetValue {
    entries: RefCell<IndexSet<EntryKey>>,
}

impl SetValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        let set = SetValue::new();
        for value in values {
            set.add(value);
        }
        set
    }

    pub fn add(&self, value: Value) {
        self.entries.borrow_mut().insert(EntryKey::new(value));
    }

    pub fn has(&self, value: &Value) -> bool {
        self.entries
            .borrow()
            .contains(&EntryKey::new(value.clone()))
    }

    pub fn delete(&self, value: &Value) -> bool {
        self.entries
            .borrow_mut()
            .shift_remove(&EntryKey::new(value.clone()))
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn values(&self) -> Vec<Value> {
        self.entries.borrow().iter().map(|k| k.0.clone()).collect()
    }
}

#[derive(Debug)]
struct WeakEntry {
    key: Weak<dyn Any>,
    value: Value,
}

/// Storage behind weak collections. Entries hold their key weakly; an entry
/// whose key has been dropped is invisible and is purged on the next insert.
#[derive(Debug, Default)]
pub struct WeakTable {
    entries: HashMap<usize, WeakEntry>,
}

fn downgrade(value: &Value) -> Option<Weak<dyn Any>> {
    fn erase<T: Any>(rc: &Rc<T>) -> Weak<dyn Any> {
        let weak: Weak<T> = Rc::downgrade(rc);
        weak
    }
    match value {
        Value::Function(v) => Some(erase(v)),
        Value::Error(v) => Some(erase(v)),
        Value::RegExp(v) => Some(erase(v)),
        Value::Date(v) => Some(erase(v)),
        Value::Object(v) => Some(erase(v)),
        Value::Array(v) => Some(erase(v)),
        Value::Map(v) => Some(erase(v)),
        Value::WeakMap(v) => Some(erase(v)),
        Value::Set(v) => Some(erase(v)),
        Value::WeakSet(v) => Some(erase(v)),
        Value::Promise(v) => Some(erase(v)),
        Value::TypedArray(v) => Some(erase(v)),
        Value::ArrayBuffer(v) => Some(erase(v)),
        Value::DataView(v) => Some(erase(v)),
        Value::Generator(v) => Some(erase(v)),
        Value::WasmModule(v) => Some(erase(v)),
        Value::Host(v) => Some(erase(v)),
        Value::Undefined
        | Value::Null
        | Value::Bool(_)
        | Value::Number(_)
        | Value::BigInt(_)
        | Value::String(_)
        | Value::Symbol(_)
        | Value::Namespace(_) => None,
    }
}

impl WeakTable {
    fn live(&self, key: &Value) -> Option<&WeakEntry> {
        let addr = key.identity()?;
        self.entries
            .get(&addr)
            .filter(|entry| entry.key.strong_count() > 0)
    }

    pub fn get(&self, key: &Value) -> Option<Value> {
        self.live(key).map(|entry| entry.value.clone())
    }

    pub fn has(&self, key: &Value) -> bool {
        self.live(key).is_some()
    }

    pub fn insert(&mut self, key: &Value, value: Value) -> Result<(), ReplicaError> {
        let (Some(addr), Some(weak)) = (key.identity(), downgrade(key)) else {
            return Err(ReplicaError::InvalidWeakKey {
                got: key.type_name().to_string(),
            });
        };
        self.entries.retain(|_, entry| entry.key.strong_count() > 0);
        self.entries.insert(addr, WeakEntry { key: weak, value });
        Ok(())
    }

    pub fn remove(&mut self, key: &Value) -> bool {
        let present = self.has(key);
        if let Some(addr) = key.identity() {
            self.entries.remove(&addr);
        }
        present
    }

    /// Number of entries whose key is still alive.
    pub fn live_len(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.key.strong_count() > 0)
            .count()
    }
}

/// A weakly keyed map handle.
#[derive(Debug, Default)]
pub struct WeakMapValue {
    table: Rc<RefCell<WeakTable>>,
}

impl WeakMapValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new handle onto the same storage.
    pub fn share(&self) -> Self {
        WeakMapValue {
            table: Rc::clone(&self.table),
        }
    }

    pub fn shares_storage_with(&self, other: &WeakMapValue) -> bool {
        Rc::ptr_eq(&self.table, &other.table)
    }

    pub fn get(&self, key: &Value) -> Option<Value> {
        self.table.borrow().get(key)
    }

    pub fn set(&self, key: &Value, value: Value) -> Result<(), ReplicaError> {
        self.table.borrow_mut().insert(key, value)
    }

    pub fn has(&self, key: &Value) -> bool {
        self.table.borrow().has(key)
    }

    pub fn delete(&self, key: &Value) -> bool {
        self.table.borrow_mut().remove(key)
    }

    pub fn live_len(&self) -> usize {
        self.table.borrow().live_len()
    }
}

/// A weakly held set handle.
#[derive(Debug, Default)]
pub struct WeakSetValue {
    table: Rc<RefCell<WeakTable>>,
}

impl WeakSetValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn share(&self) -> Self {
        WeakSetValue {
            table: Rc::clone(&self.table),
        }
    }

    pub fn shares_storage_with(&self, other: &WeakSetValue) -> bool {
        Rc::ptr_eq(&self.table, &other.table)
    }

    pub fn add(&self, value: &Value) -> Result<(), ReplicaError> {
        self.table.borrow_mut().insert(value, Value::Undefined)
    }

    pub fn has(&self, value: &Value) -> bool {
        self.table.borrow().has(value)
    }

    pub fn delete(&self, value: &Value) -> bool {
        self.table.borrow_mut().remove(value)
    }

    pub fn live_len(&self) -> usize {
        self.table.borrow().live_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Object;

    #[test]
    fn test_map_keys_use_same_value_zero() {
        let map = MapValue::new();
        map.set(Value::number(f64::NAN), Value::string("nan"));
        map.set(Value::number(-0.0), Value::string("zero"));
        assert_eq!(map.get(&Value::number(f64::NAN)), Some(Value::string("nan")));
        assert_eq!(map.get(&Value::number(0.0)), Some(Value::string("zero")));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_map_object_keys_by_identity() {
        let a = Value::object(Object::new());
        let b = Value::object(Object::new());
        let map = MapValue::from_entries([(a.clone(), Value::number(1.0))]);
        assert!(map.has(&a));
        assert!(!map.has(&b));
    }

    #[test]
    fn test_map_update_keeps_position() {
        let map = MapValue::from_entries([
            (Value::string("a"), Value::number(1.0)),
            (Value::string("b"), Value::number(2.0)),
        ]);
        map.set(Value::string("a"), Value::number(3.0));
        let keys: Vec<Value> = map.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![Value::string("a"), Value::string("b")]);
        assert!(map.delete(&Value::string("a")));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_set_deduplicates() {
        let set = SetValue::from_values([
            Value::number(1.0),
            Value::number(1.0),
            Value::string("1"),
        ]);
        assert_eq!(set.len(), 2);
        assert!(set.has(&Value::string("1")));
    }

    #[test]
    fn test_weak_map_rejects_primitive_keys() {
        let map = WeakMapValue::new();
        let err = map.set(&Value::number(1.0), Value::Null).unwrap_err();
        assert!(matches!(err, ReplicaError::InvalidWeakKey { .. }));
    }

    #[test]
    fn test_weak_map_forgets_dropped_keys() {
        let map = WeakMapValue::new();
        let key = Value::object(Object::new());
        map.set(&key, Value::number(7.0)).unwrap();
        assert_eq!(map.get(&key), Some(Value::number(7.0)));
        assert_eq!(map.live_len(), 1);
        drop(key);
        assert_eq!(map.live_len(), 0);
    }

    #[test]
    fn test_shared_weak_handles_see_each_other() {
        let set = WeakSetValue::new();
        let alias = set.share();
        let key = Value::array(vec![]);
        set.add(&key).unwrap();
        assert!(alias.has(&key));
        assert!(alias.shares_storage_with(&set));
        assert!(alias.delete(&key));
        assert!(!set.has(&key));
    }
}
