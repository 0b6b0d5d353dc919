use std::cell::RefCell;

use indexmap::IndexMap;
use lasso::Spur;

use crate::value::{intern, Value};

/// A runtime error object, distinct from [`crate::ReplicaError`] which reports
/// failures of the engine itself.
#[derive(Debug)]
pub struct ErrorValue {
    name: String,
    message: String,
    stack: Option<String>,
    properties: RefCell<IndexMap<Spur, Value>>,
}

impl ErrorValue {
    pub fn new(name: &str, message: &str) -> Self {
        ErrorValue {
            name: name.to_string(),
            message: message.to_string(),
            stack: None,
            properties: RefCell::new(IndexMap::new()),
        }
    }

    pub fn with_stack(mut self, stack: &str) -> Self {
        self.stack = Some(stack.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn stack(&self) -> Option<&str> {
        self.stack.as_deref()
    }

    /// Attach a custom field such as `code` or `cause`.
    pub fn set_property(&self, key: &str, value: Value) {
        self.properties.borrow_mut().insert(intern(key), value);
    }

    pub fn property(&self, key: &str) -> Option<Value> {
        self.properties.borrow().get(&intern(key)).cloned()
    }

    pub fn property_count(&self) -> usize {
        self.properties.borrow().len()
    }
}
