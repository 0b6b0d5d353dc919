use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use lasso::Spur;

use crate::error::ReplicaError;
use crate::value::{intern, Value};

/// The compiled body of a callable. It receives the callable's captured
/// scope and the call arguments.
pub type NativeBody = dyn Fn(&Scope, &[Value]) -> Result<Value, ReplicaError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Normal,
    Async,
    Generator,
    AsyncGenerator,
}

/// Lexical bindings captured by a closure.
#[derive(Debug, Default)]
pub struct Scope {
    bindings: RefCell<IndexMap<Spur, Value>>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captured binding, `Undefined` when the name was never captured.
    pub fn get(&self, name: &str) -> Value {
        self.bindings
            .borrow()
            .get(&intern(name))
            .cloned()
            .unwrap_or(Value::Undefined)
    }

    pub fn set(&self, name: &str, value: Value) {
        self.bindings.borrow_mut().insert(intern(name), value);
    }

    pub fn len(&self) -> usize {
        self.bindings.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.borrow().is_empty()
    }
}

/// A callable value: source text plus the native body compiled from it.
pub struct Callable {
    name: Option<String>,
    kind: FunctionKind,
    source: Rc<str>,
    body: Rc<NativeBody>,
    scope: Scope,
}

impl Callable {
    pub fn new(
        name: Option<&str>,
        kind: FunctionKind,
        source: &str,
        body: impl Fn(&Scope, &[Value]) -> Result<Value, ReplicaError> + 'static,
    ) -> Self {
        Self::from_body(
            name.map(str::to_string),
            kind,
            Rc::from(source),
            Rc::new(body),
        )
    }

    /// Assemble a callable from already compiled parts, with an empty scope.
    pub fn from_body(
        name: Option<String>,
        kind: FunctionKind,
        source: Rc<str>,
        body: Rc<NativeBody>,
    ) -> Self {
        Callable {
            name,
            kind,
            source,
            body,
            scope: Scope::new(),
        }
    }

    /// Capture a binding into this callable's closure scope.
    pub fn capture(self, name: &str, value: Value) -> Self {
        self.scope.set(name, value);
        self
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, ReplicaError> {
        (self.body)(&self.scope, args)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kind(&self) -> FunctionKind {
        self.kind
    }

    pub fn source(&self) -> &Rc<str> {
        &self.source
    }

    pub fn body(&self) -> &Rc<NativeBody> {
        &self.body
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "<{:?} fn {name}>", self.kind),
            None => write!(f, "<{:?} fn>", self.kind),
        }
    }
}
