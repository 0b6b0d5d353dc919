//! Raw byte buffers and the typed views over them.
//!
//! All multi-byte element access is little-endian unless a method says
//! otherwise.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::ReplicaError;
use crate::value::Value;

/// Element kind of a fixed-width numeric array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Int8,
    Uint8,
    Uint8Clamped,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
    BigInt64,
    BigUint64,
}

impl ElementKind {
    pub const ALL: [ElementKind; 11] = [
        ElementKind::Int8,
        ElementKind::Uint8,
        ElementKind::Uint8Clamped,
        ElementKind::Int16,
        ElementKind::Uint16,
        ElementKind::Int32,
        ElementKind::Uint32,
        ElementKind::Float32,
        ElementKind::Float64,
        ElementKind::BigInt64,
        ElementKind::BigUint64,
    ];

    pub fn byte_width(self) -> usize {
        match self {
            ElementKind::Int8 | ElementKind::Uint8 | ElementKind::Uint8Clamped => 1,
            ElementKind::Int16 | ElementKind::Uint16 => 2,
            ElementKind::Int32 | ElementKind::Uint32 | ElementKind::Float32 => 4,
            ElementKind::Float64 | ElementKind::BigInt64 | ElementKind::BigUint64 => 8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Int8 => "Int8Array",
            ElementKind::Uint8 => "Uint8Array",
            ElementKind::Uint8Clamped => "Uint8ClampedArray",
            ElementKind::Int16 => "Int16Array",
            ElementKind::Uint16 => "Uint16Array",
            ElementKind::Int32 => "Int32Array",
            ElementKind::Uint32 => "Uint32Array",
            ElementKind::Float32 => "Float32Array",
            ElementKind::Float64 => "Float64Array",
            ElementKind::BigInt64 => "BigInt64Array",
            ElementKind::BigUint64 => "BigUint64Array",
        }
    }

    pub fn is_bigint(self) -> bool {
        matches!(self, ElementKind::BigInt64 | ElementKind::BigUint64)
    }

    /// Convert `value` to this kind's little-endian byte image. Only the first
    /// `byte_width()` bytes are meaningful.
    fn encode(self, value: &Value) -> Result<[u8; 8], ReplicaError> {
        let mut out = [0u8; 8];
        if self.is_bigint() {
            let Value::BigInt(n) = value else {
                return Err(ReplicaError::type_error("bigint", value.type_name()));
            };
            // Both 64-bit kinds keep the low 64 bits.
            out.copy_from_slice(&(*n as u64).to_le_bytes());
            return Ok(out);
        }
        let Value::Number(n) = value else {
            return Err(ReplicaError::type_error("number", value.type_name()));
        };
        let n = *n;
        match self {
            ElementKind::Float32 => out[..4].copy_from_slice(&(n as f32).to_le_bytes()),
            ElementKind::Float64 => out.copy_from_slice(&n.to_le_bytes()),
            ElementKind::Uint8Clamped => {
                out[0] = if n.is_nan() {
                    0
                } else {
                    n.clamp(0.0, 255.0).round_ties_even() as u8
                };
            }
            _ => {
                let bits = (self.byte_width() * 8) as i32;
                out.copy_from_slice(&wrap(n, bits).to_le_bytes());
            }
        }
        Ok(out)
    }

    fn decode(self, bytes: &[u8]) -> Value {
        let mut buf = [0u8; 8];
        buf[..bytes.len()].copy_from_slice(bytes);
        match self {
            ElementKind::Int8 => Value::Number(bytes[0] as i8 as f64),
            ElementKind::Uint8 | ElementKind::Uint8Clamped => Value::Number(bytes[0] as f64),
            ElementKind::Int16 => Value::Number(i16::from_le_bytes([buf[0], buf[1]]) as f64),
            ElementKind::Uint16 => Value::Number(u16::from_le_bytes([buf[0], buf[1]]) as f64),
            ElementKind::Int32 => {
                Value::Number(i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as f64)
            }
            ElementKind::Uint32 => {
                Value::Number(u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as f64)
            }
            ElementKind::Float32 => {
                Value::Number(f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as f64)
            }
            ElementKind::Float64 => Value::Number(f64::from_le_bytes(buf)),
            ElementKind::BigInt64 => Value::BigInt(i64::from_le_bytes(buf) as i128),
            ElementKind::BigUint64 => Value::BigInt(u64::from_le_bytes(buf) as i128),
        }
    }
}

/// Modular conversion of a number to an unsigned integer of `bits` width
/// (at most 32), as integer typed-array stores do.
fn wrap(n: f64, bits: i32) -> u64 {
    if !n.is_finite() {
        return 0;
    }
    let modulus = 2f64.powi(bits);
    n.trunc().rem_euclid(modulus) as u64
}

/// A raw, zero-initialized byte store.
#[derive(Debug, Default)]
pub struct ArrayBuffer {
    bytes: RefCell<Vec<u8>>,
}

impl ArrayBuffer {
    pub fn new(byte_length: usize) -> Self {
        Self::from_bytes(vec![0; byte_length])
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        ArrayBuffer {
            bytes: RefCell::new(bytes),
        }
    }

    pub fn byte_length(&self) -> usize {
        self.bytes.borrow().len()
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.borrow().clone()
    }

    /// Grow (zero-filled) or shrink in place. Views that no longer fit report
    /// themselves out of bounds.
    pub fn resize(&self, byte_length: usize) {
        self.bytes.borrow_mut().resize(byte_length, 0);
    }

    pub fn read(&self, offset: usize, len: usize) -> Result<Vec<u8>, ReplicaError> {
        let bytes = self.bytes.borrow();
        offset
            .checked_add(len)
            .and_then(|end| bytes.get(offset..end))
            .map(<[u8]>::to_vec)
            .ok_or_else(|| out_of_bounds(offset, len, bytes.len()))
    }

    pub fn write(&self, offset: usize, data: &[u8]) -> Result<(), ReplicaError> {
        let mut bytes = self.bytes.borrow_mut();
        let available = bytes.len();
        let slot = offset
            .checked_add(data.len())
            .and_then(|end| bytes.get_mut(offset..end))
            .ok_or_else(|| out_of_bounds(offset, data.len(), available))?;
        slot.copy_from_slice(data);
        Ok(())
    }
}

fn out_of_bounds(offset: usize, len: usize, available: usize) -> ReplicaError {
    ReplicaError::range(format!(
        "access of {len} bytes at offset {offset} is outside a buffer of {available} bytes"
    ))
}

/// Bytes needed for `length` elements of `kind`.
fn byte_size(kind: ElementKind, length: usize) -> Result<usize, ReplicaError> {
    length.checked_mul(kind.byte_width()).ok_or_else(|| {
        ReplicaError::range(format!("invalid {} length {length}", kind.name()))
    })
}

/// A fixed-width numeric array over (a window of) an [`ArrayBuffer`].
#[derive(Debug)]
pub struct TypedArray {
    kind: ElementKind,
    buffer: Rc<ArrayBuffer>,
    byte_offset: usize,
    length: usize,
}

impl TypedArray {
    /// A zero-filled array on a fresh buffer.
    pub fn new(kind: ElementKind, length: usize) -> Result<Self, ReplicaError> {
        let byte_length = byte_size(kind, length)?;
        Ok(TypedArray {
            kind,
            buffer: Rc::new(ArrayBuffer::new(byte_length)),
            byte_offset: 0,
            length,
        })
    }

    pub fn from_values(kind: ElementKind, values: &[Value]) -> Result<Self, ReplicaError> {
        let array = TypedArray::new(kind, values.len())?;
        for (index, value) in values.iter().enumerate() {
            array.set(index, value)?;
        }
        Ok(array)
    }

    /// A view onto an existing buffer. With `length` omitted the view runs to
    /// the end of the buffer, which must then be a whole number of elements.
    pub fn on_buffer(
        kind: ElementKind,
        buffer: Rc<ArrayBuffer>,
        byte_offset: usize,
        length: Option<usize>,
    ) -> Result<Self, ReplicaError> {
        let width = kind.byte_width();
        if byte_offset % width != 0 {
            return Err(ReplicaError::range(format!(
                "start offset of {} should be a multiple of {width}",
                kind.name()
            )));
        }
        let available = buffer.byte_length().checked_sub(byte_offset).ok_or_else(|| {
            ReplicaError::range(format!(
                "start offset {byte_offset} is outside the bounds of the buffer"
            ))
        })?;
        let length = match length {
            Some(length) => {
                if byte_size(kind, length)? > available {
                    return Err(ReplicaError::range(format!(
                        "invalid {} length {length}",
                        kind.name()
                    )));
                }
                length
            }
            None if available % width == 0 => available / width,
            None => {
                return Err(ReplicaError::range(format!(
                    "byte length of {} should be a multiple of {width}",
                    kind.name()
                )))
            }
        };
        Ok(TypedArray {
            kind,
            buffer,
            byte_offset,
            length,
        })
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn buffer(&self) -> &Rc<ArrayBuffer> {
        &self.buffer
    }

    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    fn element_offset(&self, index: usize) -> Option<usize> {
        (index < self.length).then(|| self.byte_offset + index * self.kind.byte_width())
    }

    /// Element at `index`; `None` past the end or when the buffer shrank
    /// underneath the view.
    pub fn get(&self, index: usize) -> Option<Value> {
        let offset = self.element_offset(index)?;
        let bytes = self.buffer.read(offset, self.kind.byte_width()).ok()?;
        Some(self.kind.decode(&bytes))
    }

    /// Store `value` at `index`, converting it to the element kind.
    pub fn set(&self, index: usize, value: &Value) -> Result<(), ReplicaError> {
        let offset = self.element_offset(index).ok_or_else(|| {
            ReplicaError::range(format!(
                "index {index} is outside a {} of length {}",
                self.kind.name(),
                self.length
            ))
        })?;
        let image = self.kind.encode(value)?;
        self.buffer
            .write(offset, &image[..self.kind.byte_width()])
    }

    pub fn to_values(&self) -> Vec<Value> {
        (0..self.length).filter_map(|i| self.get(i)).collect()
    }
}

/// An untyped window onto an [`ArrayBuffer`].
#[derive(Debug)]
pub struct DataView {
    buffer: Rc<ArrayBuffer>,
    byte_offset: usize,
    byte_length: usize,
}

impl DataView {
    /// With `byte_length` omitted the view runs to the end of the buffer.
    pub fn new(
        buffer: Rc<ArrayBuffer>,
        byte_offset: usize,
        byte_length: Option<usize>,
    ) -> Result<Self, ReplicaError> {
        let available = buffer.byte_length().checked_sub(byte_offset).ok_or_else(|| {
            ReplicaError::range(format!(
                "start offset {byte_offset} is outside the bounds of the buffer"
            ))
        })?;
        let byte_length = match byte_length {
            Some(len) if len <= available => len,
            Some(len) => {
                return Err(ReplicaError::range(format!("invalid DataView length {len}")));
            }
            None => available,
        };
        Ok(DataView {
            buffer,
            byte_offset,
            byte_length,
        })
    }

    pub fn buffer(&self) -> &Rc<ArrayBuffer> {
        &self.buffer
    }

    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    pub fn byte_length(&self) -> usize {
        self.byte_length
    }

    /// True once the buffer has shrunk below the end of this view.
    pub fn is_out_of_bounds(&self) -> bool {
        self.byte_offset + self.byte_length > self.buffer.byte_length()
    }

    fn checked(&self, offset: usize, len: usize) -> Result<usize, ReplicaError> {
        match offset.checked_add(len) {
            Some(end) if end <= self.byte_length => Ok(self.byte_offset + offset),
            _ => Err(out_of_bounds(offset, len, self.byte_length)),
        }
    }

    pub fn get_u8(&self, offset: usize) -> Result<u8, ReplicaError> {
        let at = self.checked(offset, 1)?;
        Ok(self.buffer.read(at, 1)?[0])
    }

    pub fn set_u8(&self, offset: usize, value: u8) -> Result<(), ReplicaError> {
        let at = self.checked(offset, 1)?;
        self.buffer.write(at, &[value])
    }

    pub fn get_i32(&self, offset: usize, little_endian: bool) -> Result<i32, ReplicaError> {
        let at = self.checked(offset, 4)?;
        let bytes = self.buffer.read(at, 4)?;
        let raw = [bytes[0], bytes[1], bytes[2], bytes[3]];
        Ok(if little_endian {
            i32::from_le_bytes(raw)
        } else {
            i32::from_be_bytes(raw)
        })
    }

    pub fn set_i32(
        &self,
        offset: usize,
        value: i32,
        little_endian: bool,
    ) -> Result<(), ReplicaError> {
        let at = self.checked(offset, 4)?;
        let bytes = if little_endian {
            value.to_le_bytes()
        } else {
            value.to_be_bytes()
        };
        self.buffer.write(at, &bytes)
    }
}
