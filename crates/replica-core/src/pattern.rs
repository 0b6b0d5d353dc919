use std::cell::Cell;
use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::error::ReplicaError;

/// A validated regular-expression flag set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Flags(u8);

impl Flags {
    pub const HAS_INDICES: Flags = Flags(1 << 0);
    pub const GLOBAL: Flags = Flags(1 << 1);
    pub const IGNORE_CASE: Flags = Flags(1 << 2);
    pub const MULTILINE: Flags = Flags(1 << 3);
    pub const DOT_ALL: Flags = Flags(1 << 4);
    pub const UNICODE: Flags = Flags(1 << 5);
    pub const STICKY: Flags = Flags(1 << 6);

    // Canonical order, the same order the flags accessor reports them in.
    const LETTERS: [(char, Flags); 7] = [
        ('d', Flags::HAS_INDICES),
        ('g', Flags::GLOBAL),
        ('i', Flags::IGNORE_CASE),
        ('m', Flags::MULTILINE),
        ('s', Flags::DOT_ALL),
        ('u', Flags::UNICODE),
        ('y', Flags::STICKY),
    ];

    /// Parse a flag string. Unknown or repeated letters are rejected.
    pub fn parse(flags: &str) -> Result<Flags, ReplicaError> {
        let mut parsed = Flags::default();
        for c in flags.chars() {
            let flag = Self::LETTERS
                .iter()
                .find(|(letter, _)| *letter == c)
                .map(|(_, flag)| *flag)
                .ok_or_else(|| {
                    ReplicaError::pattern(format!("unknown flag '{c}' in \"{flags}\""))
                })?;
            if parsed.contains(flag) {
                return Err(ReplicaError::pattern(format!(
                    "repeated flag '{c}' in \"{flags}\""
                )));
            }
            parsed = Flags(parsed.0 | flag.0);
        }
        Ok(parsed)
    }

    pub fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (letter, flag) in Self::LETTERS {
            if self.contains(flag) {
                write!(f, "{letter}")?;
            }
        }
        Ok(())
    }
}

/// A compiled pattern matcher.
#[derive(Debug)]
pub struct Pattern {
    source: String,
    flags: Flags,
    regex: Regex,
    last_index: Cell<usize>,
}

impl Pattern {
    pub fn new(source: &str, flags: &str) -> Result<Self, ReplicaError> {
        let flags = Flags::parse(flags)?;
        let regex = RegexBuilder::new(source)
            .case_insensitive(flags.contains(Flags::IGNORE_CASE))
            .multi_line(flags.contains(Flags::MULTILINE))
            .dot_matches_new_line(flags.contains(Flags::DOT_ALL))
            .build()
            .map_err(|e| ReplicaError::pattern(format!("/{source}/: {e}")))?;
        Ok(Pattern {
            source: source.to_string(),
            flags,
            regex,
            last_index: Cell::new(0),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Stateful search honoring `g`/`y`: searches from `last_index` and
    /// advances it past the match, resetting to 0 on failure. Without either
    /// flag it searches from the start and leaves `last_index` alone.
    pub fn exec<'t>(&self, text: &'t str) -> Option<&'t str> {
        let stateful =
            self.flags.contains(Flags::GLOBAL) || self.flags.contains(Flags::STICKY);
        if !stateful {
            return self.regex.find(text).map(|m| m.as_str());
        }
        let start = self.last_index.get();
        if start > text.len() || !text.is_char_boundary(start) {
            self.last_index.set(0);
            return None;
        }
        let found = self
            .regex
            .find_at(text, start)
            .filter(|m| !self.flags.contains(Flags::STICKY) || m.start() == start);
        match found {
            Some(m) => {
                self.last_index.set(m.end());
                Some(m.as_str())
            }
            None => {
                self.last_index.set(0);
                None
            }
        }
    }

    pub fn last_index(&self) -> usize {
        self.last_index.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_render_in_canonical_order() {
        let flags = Flags::parse("ygi").unwrap();
        assert_eq!(flags.to_string(), "giy");
    }

    #[test]
    fn test_flags_reject_unknown_and_repeated() {
        assert!(matches!(Flags::parse("q"), Err(ReplicaError::Pattern(_))));
        assert!(matches!(Flags::parse("gg"), Err(ReplicaError::Pattern(_))));
    }

    #[test]
    fn test_ignore_case() {
        let p = Pattern::new("ab+", "i").unwrap();
        assert!(p.is_match("xABBy"));
    }

    #[test]
    fn test_global_exec_advances_last_index() {
        let p = Pattern::new("ab+", "g").unwrap();
        assert_eq!(p.exec("ab abb"), Some("ab"));
        assert_eq!(p.last_index(), 2);
        assert_eq!(p.exec("ab abb"), Some("abb"));
        assert_eq!(p.exec("ab abb"), None);
        assert_eq!(p.last_index(), 0);
    }

    #[test]
    fn test_invalid_source() {
        assert!(matches!(Pattern::new("(", ""), Err(ReplicaError::Pattern(_))));
    }
}
