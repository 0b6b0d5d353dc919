use std::fmt;

use crate::value::Value;

/// One step of the member path attached to a nested duplication failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, ".{key}"),
            PathSegment::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// Member path from the duplicated root to the failing value, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberPath(pub Vec<PathSegment>);

impl fmt::Display for MemberPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut segments = self.0.iter();
        match segments.next() {
            Some(PathSegment::Key(key)) => write!(f, "{key}")?,
            Some(first) => write!(f, "{first}")?,
            None => return write!(f, "<root>"),
        }
        for segment in segments {
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ReplicaError {
    #[error("Unsupported type: cannot duplicate a value tagged {tag}")]
    UnsupportedType { tag: String },

    #[error("Type error: expected {expected}, got {got}")]
    Type { expected: String, got: String },

    #[error("Range error: {0}")]
    Range(String),

    #[error("Invalid pattern: {0}")]
    Pattern(String),

    #[error("Invalid weak key: expected an object-like value, got {got}")]
    InvalidWeakKey { got: String },

    #[error("Maximum duplication depth of {limit} exceeded (cyclic or too deeply nested value)")]
    DepthExceeded { limit: usize },

    #[error("Uncaught {0}")]
    Thrown(Value),

    #[error("at {path}: {inner}")]
    AtPath {
        path: MemberPath,
        inner: Box<ReplicaError>,
    },
}

impl ReplicaError {
    pub fn unsupported(tag: impl Into<String>) -> Self {
        ReplicaError::UnsupportedType { tag: tag.into() }
    }

    pub fn type_error(expected: impl Into<String>, got: impl Into<String>) -> Self {
        ReplicaError::Type {
            expected: expected.into(),
            got: got.into(),
        }
    }

    pub fn range(msg: impl Into<String>) -> Self {
        ReplicaError::Range(msg.into())
    }

    pub fn pattern(msg: impl Into<String>) -> Self {
        ReplicaError::Pattern(msg.into())
    }

    /// Prefix the member path of this error with `segment`.
    ///
    /// Called while unwinding out of nested duplication, so the outermost
    /// segment ends up first.
    pub fn at(self, segment: PathSegment) -> Self {
        match self {
            ReplicaError::AtPath { mut path, inner } => {
                path.0.insert(0, segment);
                ReplicaError::AtPath { path, inner }
            }
            other => ReplicaError::AtPath {
                path: MemberPath(vec![segment]),
                inner: Box::new(other),
            },
        }
    }

    pub fn at_key(self, key: impl Into<String>) -> Self {
        self.at(PathSegment::Key(key.into()))
    }

    pub fn at_index(self, index: usize) -> Self {
        self.at(PathSegment::Index(index))
    }

    /// The error underneath any path wrapping.
    pub fn root(&self) -> &ReplicaError {
        match self {
            ReplicaError::AtPath { inner, .. } => inner.root(),
            other => other,
        }
    }

    pub fn path(&self) -> Option<&MemberPath> {
        match self {
            ReplicaError::AtPath { path, .. } => Some(path),
            _ => None,
        }
    }
}
