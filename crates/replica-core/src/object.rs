use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashSet;
use indexmap::IndexMap;
use lasso::Spur;

use crate::value::{intern, resolve, Value};

/// A property slot. Non-enumerable properties are skipped by for-in style
/// enumeration but still shadow inherited keys of the same name.
#[derive(Debug, Clone)]
pub struct Property {
    pub value: Value,
    pub enumerable: bool,
}

impl Property {
    pub fn enumerable(value: Value) -> Self {
        Property {
            value,
            enumerable: true,
        }
    }

    pub fn hidden(value: Value) -> Self {
        Property {
            value,
            enumerable: false,
        }
    }
}

/// A plain key-value object with an optional prototype.
#[derive(Debug, Default)]
pub struct Object {
    properties: RefCell<IndexMap<Spur, Property>>,
    prototype: Option<Rc<Object>>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prototype(prototype: Rc<Object>) -> Self {
        Object {
            properties: RefCell::new(IndexMap::new()),
            prototype: Some(prototype),
        }
    }

    pub fn prototype(&self) -> Option<&Rc<Object>> {
        self.prototype.as_ref()
    }

    /// Assign an own property. An existing own property keeps its
    /// enumerability; a new one is enumerable.
    pub fn set(&self, key: &str, value: Value) {
        self.set_spur(intern(key), value);
    }

    pub fn set_spur(&self, key: Spur, value: Value) {
        let mut props = self.properties.borrow_mut();
        match props.get_mut(&key) {
            Some(prop) => prop.value = value,
            None => {
                props.insert(key, Property::enumerable(value));
            }
        }
    }

    /// Define (or redefine) an own property with explicit enumerability.
    pub fn define(&self, key: &str, value: Value, enumerable: bool) {
        self.define_spur(intern(key), Property { value, enumerable });
    }

    pub fn define_spur(&self, key: Spur, property: Property) {
        self.properties.borrow_mut().insert(key, property);
    }

    /// Look a key up along the prototype chain.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.get_spur(intern(key))
    }

    pub fn get_spur(&self, key: Spur) -> Option<Value> {
        if let Some(prop) = self.properties.borrow().get(&key) {
            return Some(prop.value.clone());
        }
        self.prototype.as_ref().and_then(|proto| proto.get_spur(key))
    }

    pub fn get_own(&self, key: &str) -> Option<Value> {
        self.properties
            .borrow()
            .get(&intern(key))
            .map(|prop| prop.value.clone())
    }

    pub fn has_own(&self, key: &str) -> bool {
        self.properties.borrow().contains_key(&intern(key))
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.properties
            .borrow_mut()
            .shift_remove(&intern(key))
            .map(|prop| prop.value)
    }

    pub fn own_keys(&self) -> Vec<String> {
        self.properties.borrow().keys().map(|k| resolve(*k)).collect()
    }

    /// Number of own properties, enumerable or not.
    pub fn len(&self) -> usize {
        self.properties.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.borrow().is_empty()
    }

    pub fn own_enumerable_keys(&self) -> Vec<Spur> {
        self.properties
            .borrow()
            .iter()
            .filter(|(_, prop)| prop.enumerable)
            .map(|(key, _)| *key)
            .collect()
    }

    /// for-in enumeration: own enumerable keys in insertion order, then the
    /// enumerable keys of each prototype that no nearer object already owns.
    pub fn enumerable_keys(&self) -> Vec<Spur> {
        let mut seen = HashSet::new();
        let mut keys = Vec::new();
        let mut current = Some(self);
        while let Some(object) = current {
            for (key, prop) in object.properties.borrow().iter() {
                if seen.insert(*key) && prop.enumerable {
                    keys.push(*key);
                }
            }
            current = object.prototype.as_deref();
        }
        keys
    }
}

/// A key produced by array enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayKey {
    Index(usize),
    Named(Spur),
}

/// An indexed sequence with holes and optional named properties.
#[derive(Debug, Default)]
pub struct Array {
    elements: RefCell<Vec<Option<Value>>>,
    properties: RefCell<IndexMap<Spur, Property>>,
}

impl Array {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(items: Vec<Value>) -> Self {
        Self::with_holes(items.into_iter().map(Some).collect())
    }

    /// Build an array where `None` slots are holes.
    pub fn with_holes(slots: Vec<Option<Value>>) -> Self {
        Array {
            elements: RefCell::new(slots),
            properties: RefCell::new(IndexMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.elements.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.borrow().is_empty()
    }

    /// The element at `index`; `None` for holes and out-of-range indices.
    pub fn get(&self, index: usize) -> Option<Value> {
        self.elements.borrow().get(index).cloned().flatten()
    }

    pub fn is_hole(&self, index: usize) -> bool {
        matches!(self.elements.borrow().get(index), Some(None))
    }

    /// Assign `index`, growing the array with holes when it lies past the end.
    pub fn set(&self, index: usize, value: Value) {
        let mut elements = self.elements.borrow_mut();
        if index >= elements.len() {
            elements.resize(index + 1, None);
        }
        elements[index] = Some(value);
    }

    pub fn push(&self, value: Value) {
        self.elements.borrow_mut().push(Some(value));
    }

    /// Delete an element, leaving a hole.
    pub fn delete(&self, index: usize) {
        if let Some(slot) = self.elements.borrow_mut().get_mut(index) {
            *slot = None;
        }
    }

    pub fn set_property(&self, key: &str, value: Value) {
        let key = intern(key);
        let mut props = self.properties.borrow_mut();
        match props.get_mut(&key) {
            Some(prop) => prop.value = value,
            None => {
                props.insert(key, Property::enumerable(value));
            }
        }
    }

    pub fn define_property(&self, key: &str, value: Value, enumerable: bool) {
        self.define_property_spur(intern(key), Property { value, enumerable });
    }

    pub fn define_property_spur(&self, key: Spur, property: Property) {
        self.properties.borrow_mut().insert(key, property);
    }

    pub fn property(&self, key: &str) -> Option<Value> {
        self.property_spur(intern(key))
    }

    pub fn property_spur(&self, key: Spur) -> Option<Value> {
        self.properties
            .borrow()
            .get(&key)
            .map(|prop| prop.value.clone())
    }

    pub fn get_key(&self, key: ArrayKey) -> Option<Value> {
        match key {
            ArrayKey::Index(index) => self.get(index),
            ArrayKey::Named(name) => self.property_spur(name),
        }
    }

    /// Present indices ascending, then named enumerable properties in
    /// insertion order.
    pub fn enumerable_keys(&self) -> Vec<ArrayKey> {
        let elements = self.elements.borrow();
        let props = self.properties.borrow();
        let indices = elements
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(index, _)| ArrayKey::Index(index));
        let named = props
            .iter()
            .filter(|(_, prop)| prop.enumerable)
            .map(|(key, _)| ArrayKey::Named(*key));
        indices.chain(named).collect()
    }

    pub fn values(&self) -> Vec<Option<Value>> {
        self.elements.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_names(keys: &[Spur]) -> Vec<String> {
        keys.iter().map(|k| resolve(*k)).collect()
    }

    #[test]
    fn test_enumeration_includes_inherited_keys() {
        let proto = Rc::new(Object::new());
        proto.set("inherited", Value::number(1.0));
        proto.set("shadowed", Value::number(2.0));
        let object = Object::with_prototype(proto);
        object.set("own", Value::number(3.0));
        object.set("shadowed", Value::number(4.0));

        assert_eq!(
            key_names(&object.enumerable_keys()),
            vec!["own", "shadowed", "inherited"]
        );
        assert_eq!(object.get("shadowed"), Some(Value::number(4.0)));
        assert_eq!(object.get("inherited"), Some(Value::number(1.0)));
        assert_eq!(object.get_own("inherited"), None);
    }

    #[test]
    fn test_hidden_property_shadows_inherited_enumerable() {
        let proto = Rc::new(Object::new());
        proto.set("k", Value::number(1.0));
        let object = Object::with_prototype(proto);
        object.define("k", Value::number(2.0), false);
        assert!(object.enumerable_keys().is_empty());
    }

    #[test]
    fn test_set_keeps_enumerability() {
        let object = Object::new();
        object.define("secret", Value::Null, false);
        object.set("secret", Value::Bool(true));
        assert!(object.own_enumerable_keys().is_empty());
        assert_eq!(object.get("secret"), Some(Value::Bool(true)));
    }

    #[test]
    fn test_array_holes_and_named_keys() {
        let array = Array::from_values(vec![Value::number(1.0)]);
        array.set(3, Value::number(4.0));
        array.set_property("label", Value::string("x"));
        array.define_property("hidden", Value::Null, false);

        assert_eq!(array.len(), 4);
        assert!(array.is_hole(1));
        assert_eq!(array.get(1), None);
        let keys = array.enumerable_keys();
        assert_eq!(keys.len(), 3);
        assert_eq!(keys[0], ArrayKey::Index(0));
        assert_eq!(keys[1], ArrayKey::Index(3));
        assert!(matches!(keys[2], ArrayKey::Named(k) if resolve(k) == "label"));
    }

    #[test]
    fn test_array_delete_leaves_hole() {
        let array = Array::from_values(vec![Value::Null, Value::Bool(false)]);
        array.delete(0);
        assert_eq!(array.len(), 2);
        assert!(array.is_hole(0));
    }
}
