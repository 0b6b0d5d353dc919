use std::fmt;
use std::rc::Rc;

use replica_core::{ElementKind, FunctionKind, Namespace, Value};

/// Runtime category of a value. The dispatcher matches on this exhaustively;
/// `Other` carries categories it has no strategy for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Undefined,
    Null,
    Boolean,
    Number,
    BigInt,
    String,
    Symbol,
    Math,
    Json,
    Reflect,
    Atomics,
    Function,
    AsyncFunction,
    GeneratorFunction,
    AsyncGeneratorFunction,
    Error,
    RegExp,
    Date,
    Object,
    Array,
    Map,
    WeakMap,
    Set,
    WeakSet,
    Promise,
    Int8Array,
    Uint8Array,
    Uint8ClampedArray,
    Int16Array,
    Uint16Array,
    Int32Array,
    Uint32Array,
    Float32Array,
    Float64Array,
    BigInt64Array,
    BigUint64Array,
    ArrayBuffer,
    DataView,
    Generator,
    WebAssemblyModule,
    Other(Rc<str>),
}

impl TypeTag {
    pub fn name(&self) -> &str {
        match self {
            TypeTag::Undefined => "Undefined",
            TypeTag::Null => "Null",
            TypeTag::Boolean => "Boolean",
            TypeTag::Number => "Number",
            TypeTag::BigInt => "BigInt",
            TypeTag::String => "String",
            TypeTag::Symbol => "Symbol",
            TypeTag::Math => "Math",
            TypeTag::Json => "JSON",
            TypeTag::Reflect => "Reflect",
            TypeTag::Atomics => "Atomics",
            TypeTag::Function => "Function",
            TypeTag::AsyncFunction => "AsyncFunction",
            TypeTag::GeneratorFunction => "GeneratorFunction",
            TypeTag::AsyncGeneratorFunction => "AsyncGeneratorFunction",
            TypeTag::Error => "Error",
            TypeTag::RegExp => "RegExp",
            TypeTag::Date => "Date",
            TypeTag::Object => "Object",
            TypeTag::Array => "Array",
            TypeTag::Map => "Map",
            TypeTag::WeakMap => "WeakMap",
            TypeTag::Set => "Set",
            TypeTag::WeakSet => "WeakSet",
            TypeTag::Promise => "Promise",
            TypeTag::ArrayBuffer => "ArrayBuffer",
            TypeTag::DataView => "DataView",
            TypeTag::Generator => "Generator",
            TypeTag::WebAssemblyModule => "WebAssembly.Module",
            TypeTag::Other(name) => &**name,
            typed => typed
                .element_kind()
                .map(ElementKind::name)
                .unwrap_or("TypedArray"),
        }
    }

    /// The element kind named by a typed-array tag.
    pub fn element_kind(&self) -> Option<ElementKind> {
        match self {
            TypeTag::Int8Array => Some(ElementKind::Int8),
            TypeTag::Uint8Array => Some(ElementKind::Uint8),
            TypeTag::Uint8ClampedArray => Some(ElementKind::Uint8Clamped),
            TypeTag::Int16Array => Some(ElementKind::Int16),
            TypeTag::Uint16Array => Some(ElementKind::Uint16),
            TypeTag::Int32Array => Some(ElementKind::Int32),
            TypeTag::Uint32Array => Some(ElementKind::Uint32),
            TypeTag::Float32Array => Some(ElementKind::Float32),
            TypeTag::Float64Array => Some(ElementKind::Float64),
            TypeTag::BigInt64Array => Some(ElementKind::BigInt64),
            TypeTag::BigUint64Array => Some(ElementKind::BigUint64),
            _ => None,
        }
    }

    pub fn for_element_kind(kind: ElementKind) -> TypeTag {
        match kind {
            ElementKind::Int8 => TypeTag::Int8Array,
            ElementKind::Uint8 => TypeTag::Uint8Array,
            ElementKind::Uint8Clamped => TypeTag::Uint8ClampedArray,
            ElementKind::Int16 => TypeTag::Int16Array,
            ElementKind::Uint16 => TypeTag::Uint16Array,
            ElementKind::Int32 => TypeTag::Int32Array,
            ElementKind::Uint32 => TypeTag::Uint32Array,
            ElementKind::Float32 => TypeTag::Float32Array,
            ElementKind::Float64 => TypeTag::Float64Array,
            ElementKind::BigInt64 => TypeTag::BigInt64Array,
            ElementKind::BigUint64 => TypeTag::BigUint64Array,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decides the runtime category of a value for the dispatcher.
pub trait Classify {
    fn classify(&self, value: &Value) -> TypeTag;
}

impl<F> Classify for F
where
    F: Fn(&Value) -> TypeTag,
{
    fn classify(&self, value: &Value) -> TypeTag {
        self(value)
    }
}

/// The classifier for the built-in value model.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeClassifier;

impl Classify for RuntimeClassifier {
    fn classify(&self, value: &Value) -> TypeTag {
        classify(value)
    }
}

pub fn classify(value: &Value) -> TypeTag {
    match value {
        Value::Undefined => TypeTag::Undefined,
        Value::Null => TypeTag::Null,
        Value::Bool(_) => TypeTag::Boolean,
        Value::Number(_) => TypeTag::Number,
        Value::BigInt(_) => TypeTag::BigInt,
        Value::String(_) => TypeTag::String,
        Value::Symbol(_) => TypeTag::Symbol,
        Value::Namespace(Namespace::Math) => TypeTag::Math,
        Value::Namespace(Namespace::Json) => TypeTag::Json,
        Value::Namespace(Namespace::Reflect) => TypeTag::Reflect,
        Value::Namespace(Namespace::Atomics) => TypeTag::Atomics,
        Value::Function(f) => match f.kind() {
            FunctionKind::Normal => TypeTag::Function,
            FunctionKind::Async => TypeTag::AsyncFunction,
            FunctionKind::Generator => TypeTag::GeneratorFunction,
            FunctionKind::AsyncGenerator => TypeTag::AsyncGeneratorFunction,
        },
        Value::Error(_) => TypeTag::Error,
        Value::RegExp(_) => TypeTag::RegExp,
        Value::Date(_) => TypeTag::Date,
        Value::Object(_) => TypeTag::Object,
        Value::Array(_) => TypeTag::Array,
        Value::Map(_) => TypeTag::Map,
        Value::WeakMap(_) => TypeTag::WeakMap,
        Value::Set(_) => TypeTag::Set,
        Value::WeakSet(_) => TypeTag::WeakSet,
        Value::Promise(_) => TypeTag::Promise,
        Value::TypedArray(t) => TypeTag::for_element_kind(t.kind()),
        Value::ArrayBuffer(_) => TypeTag::ArrayBuffer,
        Value::DataView(_) => TypeTag::DataView,
        Value::Generator(_) => TypeTag::Generator,
        Value::WasmModule(_) => TypeTag::WebAssemblyModule,
        Value::Host(h) => TypeTag::Other(Rc::from(h.class_name.as_str())),
    }
}

#[cfg(test)]
mod tests {
    use replica_core::{Callable, HostObject, TypedArray};

    use super::*;

    #[test]
    fn test_typed_array_tags_roundtrip_kind() {
        for kind in ElementKind::ALL {
            let tag = TypeTag::for_element_kind(kind);
            assert_eq!(tag.element_kind(), Some(kind));
            assert_eq!(tag.name(), kind.name());
        }
        let value = Value::TypedArray(Rc::new(TypedArray::new(ElementKind::Float32, 2).unwrap()));
        assert_eq!(classify(&value), TypeTag::Float32Array);
    }

    #[test]
    fn test_function_kinds() {
        let f = Value::function(Callable::new(
            None,
            FunctionKind::AsyncGenerator,
            "async function* g() {}",
            |_, _| Ok(Value::Undefined),
        ));
        assert_eq!(classify(&f), TypeTag::AsyncGeneratorFunction);
    }

    #[test]
    fn test_host_objects_are_other() {
        let host = Value::Host(Rc::new(HostObject {
            class_name: "CanvasContext".to_string(),
        }));
        let tag = classify(&host);
        assert_eq!(tag, TypeTag::Other(Rc::from("CanvasContext")));
        assert_eq!(tag.to_string(), "CanvasContext");
    }

    #[test]
    fn test_closures_classify() {
        let everything_is_a_date = |_: &Value| TypeTag::Date;
        assert_eq!(everything_is_a_date.classify(&Value::Null), TypeTag::Date);
    }
}
