use serde::{Deserialize, Serialize};

/// Default nesting limit, the same recursion limit serde_json applies. The
/// guard has to trip before a 2 MiB thread stack runs out, in debug builds
/// too.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// How the raw byte-buffer strategy sizes its copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BufferSizing {
    /// Same byte length as the source, with the source's bytes copied.
    #[default]
    ByteLength,
    /// Size from the buffer's `length` attribute, which byte buffers do not
    /// have: the copy is always empty. Kept for hosts that depend on it.
    LengthField,
}

/// Knobs for a duplication run.
///
/// Loadable from JSON or TOML:
///
/// ```json
/// { "max-depth": 256, "inherited-properties": false, "buffer-sizing": "byte-length" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DuplicateOptions {
    /// Nesting limit; `None` disables the guard, so cyclic input overflows
    /// the stack.
    pub max_depth: Option<usize>,
    /// Copy enumerable properties inherited through the prototype chain as
    /// own properties of the copy.
    pub inherited_properties: bool,
    pub buffer_sizing: BufferSizing,
}

impl Default for DuplicateOptions {
    fn default() -> Self {
        DuplicateOptions {
            max_depth: Some(DEFAULT_MAX_DEPTH),
            inherited_properties: true,
            buffer_sizing: BufferSizing::default(),
        }
    }
}

impl DuplicateOptions {
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_inherited_properties(mut self, inherited: bool) -> Self {
        self.inherited_properties = inherited;
        self
    }

    pub fn with_buffer_sizing(mut self, sizing: BufferSizing) -> Self {
        self.buffer_sizing = sizing;
        self
    }
}
