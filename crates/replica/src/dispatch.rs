use std::cell::Cell;

use replica_core::{ReplicaError, Value};
use tracing::{debug, trace};

use crate::options::DuplicateOptions;
use crate::tag::{Classify, RuntimeClassifier, TypeTag};
use crate::{binary, builtin, callable, collections, container, deferred};

/// Classifies values and routes each one to the strategy for its tag.
/// Composite strategies call back into [`Duplicator::duplicate`] for their
/// members.
#[derive(Debug)]
pub struct Duplicator<C = RuntimeClassifier> {
    classifier: C,
    options: DuplicateOptions,
    depth: Cell<usize>,
}

impl Default for Duplicator {
    fn default() -> Self {
        Self::new()
    }
}

impl Duplicator {
    pub fn new() -> Self {
        Self::with_options(DuplicateOptions::default())
    }

    pub fn with_options(options: DuplicateOptions) -> Self {
        Self::with_classifier(RuntimeClassifier, options)
    }
}

/// Decrements the nesting depth on the way out, including error paths.
struct DepthGuard<'a> {
    depth: &'a Cell<usize>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get() - 1);
    }
}

impl<C: Classify> Duplicator<C> {
    pub fn with_classifier(classifier: C, options: DuplicateOptions) -> Self {
        Duplicator {
            classifier,
            options,
            depth: Cell::new(0),
        }
    }

    pub fn options(&self) -> &DuplicateOptions {
        &self.options
    }

    fn enter(&self) -> Result<DepthGuard<'_>, ReplicaError> {
        let depth = self.depth.get() + 1;
        if let Some(limit) = self.options.max_depth {
            if depth > limit {
                debug!(limit, "duplication depth limit reached");
                return Err(ReplicaError::DepthExceeded { limit });
            }
        }
        self.depth.set(depth);
        Ok(DepthGuard { depth: &self.depth })
    }

    /// Produce an independent copy of `value`.
    pub fn duplicate(&self, value: &Value) -> Result<Value, ReplicaError> {
        let tag = self.classifier.classify(value);
        let _guard = self.enter()?;
        trace!(tag = %tag, depth = self.depth.get(), "duplicate");
        match &tag {
            TypeTag::Undefined
            | TypeTag::Null
            | TypeTag::Boolean
            | TypeTag::Number
            | TypeTag::BigInt
            | TypeTag::String
            | TypeTag::Symbol
            | TypeTag::Math
            | TypeTag::Json
            | TypeTag::Reflect
            | TypeTag::Atomics
            | TypeTag::Generator
            | TypeTag::WebAssemblyModule => Ok(value.clone()),
            TypeTag::Function
            | TypeTag::AsyncFunction
            | TypeTag::GeneratorFunction
            | TypeTag::AsyncGeneratorFunction => callable::duplicate_function(value),
            TypeTag::Error => builtin::duplicate_error(value),
            TypeTag::RegExp => builtin::duplicate_regexp(value),
            TypeTag::Date => builtin::duplicate_date(value),
            TypeTag::Object => container::duplicate_object(self, value),
            TypeTag::Array => container::duplicate_array(self, value),
            TypeTag::Map => collections::duplicate_map(value),
            TypeTag::WeakMap => collections::duplicate_weak_map(value),
            TypeTag::Set => collections::duplicate_set(value),
            TypeTag::WeakSet => collections::duplicate_weak_set(value),
            TypeTag::Promise => deferred::duplicate_promise(value),
            TypeTag::Int8Array
            | TypeTag::Uint8Array
            | TypeTag::Uint8ClampedArray
            | TypeTag::Int16Array
            | TypeTag::Uint16Array
            | TypeTag::Int32Array
            | TypeTag::Uint32Array
            | TypeTag::Float32Array
            | TypeTag::Float64Array
            | TypeTag::BigInt64Array
            | TypeTag::BigUint64Array => binary::duplicate_typed_array(self, &tag, value),
            TypeTag::ArrayBuffer => binary::duplicate_array_buffer(self, value),
            TypeTag::DataView => binary::duplicate_data_view(value),
            TypeTag::Other(name) => {
                debug!(tag = %name, value_type = value.type_name(), "no duplication strategy");
                Err(ReplicaError::unsupported(&**name))
            }
        }
    }
}

/// The error a strategy reports when the classifier handed it a value of
/// another shape.
pub(crate) fn mismatch(expected: &str, value: &Value) -> ReplicaError {
    ReplicaError::type_error(expected, value.type_name())
}

/// Duplicate `value` with default options and the built-in classifier.
pub fn duplicate(value: &Value) -> Result<Value, ReplicaError> {
    Duplicator::new().duplicate(value)
}

pub fn duplicate_with(value: &Value, options: DuplicateOptions) -> Result<Value, ReplicaError> {
    Duplicator::with_options(options).duplicate(value)
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use replica_core::{deep_equal, Object};

    use super::*;

    #[test]
    fn test_depth_resets_after_each_call() {
        let dup = Duplicator::new();
        let nested = Value::record([("a", Value::record([("b", Value::Null)]))]);
        dup.duplicate(&nested).unwrap();
        assert_eq!(dup.depth.get(), 0);
    }

    #[test]
    fn test_depth_resets_after_failure() {
        let dup = Duplicator::with_options(DuplicateOptions::default().with_max_depth(Some(1)));
        let nested = Value::record([("a", Value::object(Object::new()))]);
        let err = dup.duplicate(&nested).unwrap_err();
        assert!(matches!(err.root(), ReplicaError::DepthExceeded { limit: 1 }));
        assert_eq!(dup.depth.get(), 0);
    }

    #[test]
    fn test_limit_counts_nesting_levels() {
        let dup = Duplicator::with_options(DuplicateOptions::default().with_max_depth(Some(2)));
        let two_levels = Value::record([("a", Value::number(1.0))]);
        assert!(dup.duplicate(&two_levels).is_ok());
        let three_levels = Value::record([("a", Value::record([("b", Value::Null)]))]);
        assert!(dup.duplicate(&three_levels).is_err());
    }

    #[test]
    fn test_custom_classifier_can_reject_everything() {
        let dup = Duplicator::with_classifier(
            |_: &Value| TypeTag::Other(Rc::from("Opaque")),
            DuplicateOptions::default(),
        );
        let err = dup.duplicate(&Value::Null).unwrap_err();
        assert!(matches!(err, ReplicaError::UnsupportedType { ref tag } if tag == "Opaque"));
    }

    #[test]
    fn test_misclassified_value_is_a_type_error() {
        let dup =
            Duplicator::with_classifier(|_: &Value| TypeTag::Date, DuplicateOptions::default());
        let err = dup.duplicate(&Value::number(3.0)).unwrap_err();
        assert!(matches!(err, ReplicaError::Type { .. }));
    }

    #[test]
    fn test_objects_are_copied_strings_are_shared() {
        let object = Value::object(Object::new());
        let copy = duplicate(&object).unwrap();
        assert!(deep_equal(&copy, &object));
        assert_ne!(copy, object);
        let s = Value::string("same");
        let copied = duplicate(&s).unwrap();
        match (&s, &copied) {
            (Value::String(a), Value::String(b)) => assert!(Rc::ptr_eq(a, b)),
            _ => unreachable!(),
        }
    }
}
