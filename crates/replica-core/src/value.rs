use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use lasso::{Rodeo, Spur};

use crate::binary::{ArrayBuffer, DataView, TypedArray};
use crate::callable::Callable;
use crate::collections::{MapValue, SetValue, WeakMapValue, WeakSetValue};
use crate::date::DateValue;
use crate::error_value::ErrorValue;
use crate::object::{Array, Object};
use crate::pattern::Pattern;
use crate::promise::Promise;

thread_local! {
    static INTERNER: RefCell<Rodeo> = RefCell::new(Rodeo::default());
    static NEXT_SYMBOL_ID: Cell<u64> = const { Cell::new(0) };
}

/// Intern a property key or symbol description.
pub fn intern(s: &str) -> Spur {
    INTERNER.with(|r| r.borrow_mut().get_or_intern(s))
}

/// Resolve a Spur key back to a String.
pub fn resolve(spur: Spur) -> String {
    INTERNER.with(|r| r.borrow().resolve(&spur).to_string())
}

/// Resolve a Spur and call f with the &str, avoiding allocation.
pub fn with_resolved<F, R>(spur: Spur, f: F) -> R
where
    F: FnOnce(&str) -> R,
{
    INTERNER.with(|r| {
        let interner = r.borrow();
        f(interner.resolve(&spur))
    })
}

/// A unique symbolic token. Two symbols are equal only if they came from the
/// same `Symbol::new` call, whatever their descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol {
    id: u64,
    description: Option<Spur>,
}

impl Symbol {
    pub fn new(description: Option<&str>) -> Self {
        let id = NEXT_SYMBOL_ID.with(|next| {
            let id = next.get();
            next.set(id + 1);
            id
        });
        Symbol {
            id,
            description: description.map(intern),
        }
    }

    pub fn description(&self) -> Option<String> {
        self.description.map(resolve)
    }
}

/// Built-in namespace singletons. They hold no per-instance state and are
/// shared rather than copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Math,
    Json,
    Reflect,
    Atomics,
}

impl Namespace {
    pub fn name(self) -> &'static str {
        match self {
            Namespace::Math => "Math",
            Namespace::Json => "JSON",
            Namespace::Reflect => "Reflect",
            Namespace::Atomics => "Atomics",
        }
    }
}

/// A suspended generator instance. Opaque to the engine.
#[derive(Debug)]
pub struct Generator {
    pub function_name: Option<String>,
}

/// A compiled WebAssembly module handle. Immutable once compiled.
#[derive(Debug)]
pub struct WasmModule {
    pub name: String,
    pub bytes: Rc<[u8]>,
}

/// A host-defined object the runtime knows only by its class name.
#[derive(Debug)]
pub struct HostObject {
    pub class_name: String,
}

/// The runtime value model.
///
/// Primitives are held inline (strings share an `Rc<str>`); everything else is
/// an `Rc` handle onto interior-mutable state, so cloning a `Value` aliases it.
/// Producing an independent copy is the job of the duplication engine.
#[derive(Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    BigInt(i128),
    String(Rc<str>),
    Symbol(Symbol),
    Namespace(Namespace),
    Function(Rc<Callable>),
    Error(Rc<ErrorValue>),
    RegExp(Rc<Pattern>),
    Date(Rc<DateValue>),
    Object(Rc<Object>),
    Array(Rc<Array>),
    Map(Rc<MapValue>),
    WeakMap(Rc<WeakMapValue>),
    Set(Rc<SetValue>),
    WeakSet(Rc<WeakSetValue>),
    Promise(Rc<Promise>),
    TypedArray(Rc<TypedArray>),
    ArrayBuffer(Rc<ArrayBuffer>),
    DataView(Rc<DataView>),
    Generator(Rc<Generator>),
    WasmModule(Rc<WasmModule>),
    Host(Rc<HostObject>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Namespace(_) => "namespace",
            Value::Function(_) => "function",
            Value::Error(_) => "error",
            Value::RegExp(_) => "regexp",
            Value::Date(_) => "date",
            Value::Object(_) => "object",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::WeakMap(_) => "weakmap",
            Value::Set(_) => "set",
            Value::WeakSet(_) => "weakset",
            Value::Promise(_) => "promise",
            Value::TypedArray(_) => "typed-array",
            Value::ArrayBuffer(_) => "arraybuffer",
            Value::DataView(_) => "dataview",
            Value::Generator(_) => "generator",
            Value::WasmModule(_) => "wasm-module",
            Value::Host(_) => "host-object",
        }
    }

    /// Address of the shared allocation behind a heap value, `None` for
    /// primitives and namespaces.
    pub fn identity(&self) -> Option<usize> {
        fn addr<T: ?Sized>(rc: &Rc<T>) -> usize {
            Rc::as_ptr(rc) as *const () as usize
        }
        match self {
            Value::Undefined
            | Value::Null
            | Value::Bool(_)
            | Value::Number(_)
            | Value::BigInt(_)
            | Value::String(_)
            | Value::Symbol(_)
            | Value::Namespace(_) => None,
            Value::Function(v) => Some(addr(v)),
            Value::Error(v) => Some(addr(v)),
            Value::RegExp(v) => Some(addr(v)),
            Value::Date(v) => Some(addr(v)),
            Value::Object(v) => Some(addr(v)),
            Value::Array(v) => Some(addr(v)),
            Value::Map(v) => Some(addr(v)),
            Value::WeakMap(v) => Some(addr(v)),
            Value::Set(v) => Some(addr(v)),
            Value::WeakSet(v) => Some(addr(v)),
            Value::Promise(v) => Some(addr(v)),
            Value::TypedArray(v) => Some(addr(v)),
            Value::ArrayBuffer(v) => Some(addr(v)),
            Value::DataView(v) => Some(addr(v)),
            Value::Generator(v) => Some(addr(v)),
            Value::WasmModule(v) => Some(addr(v)),
            Value::Host(v) => Some(addr(v)),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Rc<Object>> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Rc<Array>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn string(s: &str) -> Value {
        Value::String(Rc::from(s))
    }

    pub fn number(n: f64) -> Value {
        Value::Number(n)
    }

    pub fn symbol(description: &str) -> Value {
        Value::Symbol(Symbol::new(Some(description)))
    }

    pub fn object(object: Object) -> Value {
        Value::Object(Rc::new(object))
    }

    /// A plain object with the given entries as own enumerable properties.
    pub fn record<'a>(entries: impl IntoIterator<Item = (&'a str, Value)>) -> Value {
        let object = Object::new();
        for (key, value) in entries {
            object.set(key, value);
        }
        Value::object(object)
    }

    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(Array::from_values(items)))
    }

    pub fn function(callable: Callable) -> Value {
        Value::Function(Rc::new(callable))
    }

    pub fn error(error: ErrorValue) -> Value {
        Value::Error(Rc::new(error))
    }

    pub fn regexp(pattern: Pattern) -> Value {
        Value::RegExp(Rc::new(pattern))
    }

    pub fn date(date: DateValue) -> Value {
        Value::Date(Rc::new(date))
    }

    pub fn map(map: MapValue) -> Value {
        Value::Map(Rc::new(map))
    }

    pub fn set(set: SetValue) -> Value {
        Value::Set(Rc::new(set))
    }

    pub fn promise(promise: Promise) -> Value {
        Value::Promise(Rc::new(promise))
    }
}

/// `==` is identity for heap values and value equality for primitives;
/// numbers compare by bit pattern so `NaN == NaN`. Structural comparison
/// lives in [`crate::equality::deep_equal`].
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a.to_bits() == b.to_bits(),
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Namespace(a), Value::Namespace(b)) => a == b,
            _ => match (self.identity(), other.identity()) {
                (Some(a), Some(b)) => {
                    a == b && std::mem::discriminant(self) == std::mem::discriminant(other)
                }
                _ => false,
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, &mut Vec::new())
    }
}

/// Renders through `Display`, so cyclic values print a marker instead of
/// recursing forever.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined | Value::Null => write!(f, "{self}"),
            _ => write!(f, "{}({self})", self.type_name()),
        }
    }
}

/// `open` holds the identities of the objects and arrays being written, one
/// per level of nesting.
fn write_value(f: &mut fmt::Formatter<'_>, value: &Value, open: &mut Vec<usize>) -> fmt::Result {
    if let (Value::Object(_) | Value::Array(_), Some(id)) = (value, value.identity()) {
        if open.contains(&id) {
            return write!(f, "[Circular]");
        }
        open.push(id);
        let written = write_container(f, value, open);
        open.pop();
        return written;
    }
    match value {
        Value::Undefined => write!(f, "undefined"),
        Value::Null => write!(f, "null"),
        Value::Bool(b) => write!(f, "{b}"),
        Value::Number(n) => write_number(f, *n),
        Value::BigInt(n) => write!(f, "{n}n"),
        Value::String(s) => write!(f, "{s:?}"),
        Value::Symbol(s) => match s.description {
            Some(desc) => with_resolved(desc, |d| write!(f, "Symbol({d})")),
            None => write!(f, "Symbol()"),
        },
        Value::Namespace(ns) => write!(f, "[object {}]", ns.name()),
        Value::Function(c) => match c.name() {
            Some(name) => write!(f, "[Function: {name}]"),
            None => write!(f, "[Function (anonymous)]"),
        },
        Value::Error(e) => write!(f, "{}: {}", e.name(), e.message()),
        Value::RegExp(p) => write!(f, "/{}/{}", p.source(), p.flags()),
        Value::Date(d) => match d.to_datetime() {
            Some(dt) => {
                let text = dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
                write!(f, "{text}")
            }
            None => write!(f, "Invalid Date"),
        },
        Value::Object(_) | Value::Array(_) => write_container(f, value, open),
        Value::Map(m) => write!(f, "Map({})", m.len()),
        Value::WeakMap(_) => write!(f, "WeakMap {{ <items unknown> }}"),
        Value::Set(s) => write!(f, "Set({})", s.len()),
        Value::WeakSet(_) => write!(f, "WeakSet {{ <items unknown> }}"),
        Value::Promise(p) => {
            if p.is_pending() {
                write!(f, "Promise {{ <pending> }}")
            } else {
                write!(f, "Promise {{ <settled> }}")
            }
        }
        Value::TypedArray(t) => write!(f, "{}({})", t.kind().name(), t.len()),
        Value::ArrayBuffer(b) => write!(f, "ArrayBuffer {{ byteLength: {} }}", b.byte_length()),
        Value::DataView(v) => write!(f, "DataView {{ byteLength: {} }}", v.byte_length()),
        Value::Generator(_) => write!(f, "Object [Generator] {{}}"),
        Value::WasmModule(m) => write!(f, "Module [WebAssembly.Module] {}", m.name),
        Value::Host(h) => write!(f, "[object {}]", h.class_name),
    }
}

fn write_container(
    f: &mut fmt::Formatter<'_>,
    value: &Value,
    open: &mut Vec<usize>,
) -> fmt::Result {
    match value {
        Value::Object(o) => {
            let keys = o.enumerable_keys();
            write!(f, "{{")?;
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                with_resolved(*key, |k| write!(f, " {k}: "))?;
                let member = o.get_spur(*key).unwrap_or(Value::Undefined);
                write_value(f, &member, open)?;
            }
            if keys.is_empty() {
                write!(f, "}}")
            } else {
                write!(f, " }}")
            }
        }
        Value::Array(a) => {
            write!(f, "[")?;
            for i in 0..a.len() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                match a.get(i) {
                    Some(item) => write_value(f, &item, open)?,
                    None => write!(f, "<empty>")?,
                }
            }
            write!(f, "]")
        }
        _ => write_value(f, value, open),
    }
}

fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_nan() {
        write!(f, "NaN")
    } else if n.is_infinite() {
        write!(f, "{}Infinity", if n < 0.0 { "-" } else { "" })
    } else if n == 0.0 && n.is_sign_negative() {
        write!(f, "-0")
    } else {
        write!(f, "{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols_are_unique() {
        let a = Symbol::new(Some("tag"));
        let b = Symbol::new(Some("tag"));
        assert_ne!(a, b);
        assert_eq!(a.description().as_deref(), Some("tag"));
    }

    #[test]
    fn test_heap_values_compare_by_identity() {
        let a = Value::record([("x", Value::number(1.0))]);
        let b = Value::record([("x", Value::number(1.0))]);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_nan_equals_itself() {
        assert_eq!(Value::number(f64::NAN), Value::number(f64::NAN));
        assert_ne!(Value::number(0.0), Value::number(-0.0));
    }

    #[test]
    fn test_display_nested() {
        let v = Value::record([
            ("a", Value::number(1.0)),
            ("b", Value::array(vec![Value::string("x"), Value::Null])),
        ]);
        assert_eq!(v.to_string(), "{ a: 1, b: [\"x\", null] }");
        assert_eq!(Value::object(Object::new()).to_string(), "{}");
    }

    #[test]
    fn test_cyclic_values_print_a_marker() {
        let object = Rc::new(Object::new());
        object.set("name", Value::string("loop"));
        object.set("self", Value::Object(Rc::clone(&object)));
        let list = Value::array(vec![Value::Object(Rc::clone(&object))]);
        object.set("list", list.clone());

        let value = Value::Object(Rc::clone(&object));
        assert_eq!(
            value.to_string(),
            "{ name: \"loop\", self: [Circular], list: [[Circular]] }"
        );
        assert_eq!(list.to_string(), "[{ name: \"loop\", self: [Circular], list: [Circular] }]");
        assert!(format!("{value:?}").starts_with("object({ name:"));
        assert!(format!("{:?}", object.get("list")).contains("[Circular]"));

        object.remove("self");
        object.remove("list");
        assert_eq!(value.to_string(), "{ name: \"loop\" }");
    }

    #[test]
    fn test_shared_members_are_not_circular() {
        let shared = Value::array(vec![Value::Null]);
        let v = Value::array(vec![shared.clone(), shared]);
        assert_eq!(v.to_string(), "[[null], [null]]");
    }
}
