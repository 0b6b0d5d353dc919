//! Object and array strategies. Each member is duplicated through the
//! dispatcher, so nested values get their own strategy.

use std::rc::Rc;

use replica_core::{resolve, Array, ArrayKey, Object, Property, ReplicaError, Value};

use crate::dispatch::{mismatch, Duplicator};
use crate::tag::Classify;

/// Copy enumerable members into a new plain object without a prototype.
///
/// Inherited enumerable keys land as own properties of the copy unless
/// `inherited_properties` is off.
pub fn duplicate_object<C: Classify>(
    dup: &Duplicator<C>,
    value: &Value,
) -> Result<Value, ReplicaError> {
    let Value::Object(src) = value else {
        return Err(mismatch("object", value));
    };
    let keys = if dup.options().inherited_properties {
        src.enumerable_keys()
    } else {
        src.own_enumerable_keys()
    };
    let copy = Object::new();
    for key in keys {
        let member = src.get_spur(key).unwrap_or(Value::Undefined);
        let member = dup
            .duplicate(&member)
            .map_err(|e| e.at_key(resolve(key)))?;
        copy.set_spur(key, member);
    }
    Ok(Value::object(copy))
}

/// Copy present elements and named enumerable properties into a new array.
/// Interior holes stay holes; trailing holes are dropped.
pub fn duplicate_array<C: Classify>(
    dup: &Duplicator<C>,
    value: &Value,
) -> Result<Value, ReplicaError> {
    let Value::Array(src) = value else {
        return Err(mismatch("array", value));
    };
    let copy = Array::new();
    for key in src.enumerable_keys() {
        let member = src.get_key(key).unwrap_or(Value::Undefined);
        match key {
            ArrayKey::Index(index) => {
                let member = dup.duplicate(&member).map_err(|e| e.at_index(index))?;
                copy.set(index, member);
            }
            ArrayKey::Named(name) => {
                let member = dup
                    .duplicate(&member)
                    .map_err(|e| e.at_key(resolve(name)))?;
                copy.define_property_spur(name, Property::enumerable(member));
            }
        }
    }
    Ok(Value::Array(Rc::new(copy)))
}
