pub mod binary;
pub mod callable;
pub mod collections;
pub mod date;
pub mod equality;
pub mod error;
pub mod error_value;
pub mod json;
pub mod object;
pub mod pattern;
pub mod promise;
pub mod value;

pub use binary::{ArrayBuffer, DataView, ElementKind, TypedArray};
pub use callable::{Callable, FunctionKind, NativeBody, Scope};
pub use collections::{same_value_zero, MapValue, SetValue, WeakMapValue, WeakSetValue};
pub use date::DateValue;
pub use equality::deep_equal;
pub use error::{MemberPath, PathSegment, ReplicaError};
pub use error_value::ErrorValue;
pub use object::{Array, ArrayKey, Object, Property};
pub use pattern::{Flags, Pattern};
pub use promise::{Promise, Settlement};
pub use value::{
    intern, resolve, with_resolved, Generator, HostObject, Namespace, Symbol, Value, WasmModule,
};
