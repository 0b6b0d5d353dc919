//! Typed arrays, raw byte buffers and buffer views.

use std::rc::Rc;

use replica_core::{ArrayBuffer, DataView, ReplicaError, TypedArray, Value};
use tracing::warn;

use crate::dispatch::{mismatch, Duplicator};
use crate::options::BufferSizing;
use crate::tag::{Classify, TypeTag};

/// Same kind and length on a fresh buffer, each element passed through the
/// dispatcher before it is stored.
pub fn duplicate_typed_array<C: Classify>(
    dup: &Duplicator<C>,
    tag: &TypeTag,
    value: &Value,
) -> Result<Value, ReplicaError> {
    let src = match value {
        Value::TypedArray(src) if tag.element_kind() == Some(src.kind()) => src,
        _ => return Err(mismatch(tag.name(), value)),
    };
    let copy = TypedArray::new(src.kind(), src.len())?;
    for index in 0..src.len() {
        // Elements past a shrunk buffer read as absent and stay zero.
        let Some(element) = src.get(index) else {
            continue;
        };
        let element = dup.duplicate(&element).map_err(|e| e.at_index(index))?;
        copy.set(index, &element).map_err(|e| e.at_index(index))?;
    }
    Ok(Value::TypedArray(Rc::new(copy)))
}

pub fn duplicate_array_buffer<C: Classify>(
    dup: &Duplicator<C>,
    value: &Value,
) -> Result<Value, ReplicaError> {
    let Value::ArrayBuffer(src) = value else {
        return Err(mismatch("arraybuffer", value));
    };
    let copy = match dup.options().buffer_sizing {
        BufferSizing::ByteLength => ArrayBuffer::from_bytes(src.to_vec()),
        BufferSizing::LengthField => {
            if src.byte_length() > 0 {
                warn!(
                    byte_length = src.byte_length(),
                    "length-field sizing produces an empty buffer copy"
                );
            }
            ArrayBuffer::new(0)
        }
    };
    Ok(Value::ArrayBuffer(Rc::new(copy)))
}

/// A new view over the same buffer, offset and length.
pub fn duplicate_data_view(value: &Value) -> Result<Value, ReplicaError> {
    let Value::DataView(src) = value else {
        return Err(mismatch("dataview", value));
    };
    let copy = DataView::new(
        Rc::clone(src.buffer()),
        src.byte_offset(),
        Some(src.byte_length()),
    )?;
    Ok(Value::DataView(Rc::new(copy)))
}
