//! Ordered compiler/linker flag sets.
//!
//! A `FlagSet` is built by a chain of transformations, each consuming the
//! previous set and returning a new one. Order is preserved: a flag added
//! and later removed is gone even if something in between looked at it.

use serde::Serialize;

/// How flags are quoted when rendered into a command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QuoteStyle {
    /// POSIX shells
    Posix,
    /// `cmd.exe`-style invocations; flags are passed through untouched
    Windows,
}

/// Escape a flag so that a POSIX shell reads it as a single argument.
///
/// Only flags containing `"` are rewritten: they are wrapped in single
/// quotes with inner `'` escaped. This is not a general quoting algorithm.
/// Windows-style invocations are never rewritten.
pub fn shell_escape(flag: &str, style: QuoteStyle) -> String {
    match style {
        QuoteStyle::Windows => flag.to_string(),
        QuoteStyle::Posix if flag.contains('"') => format!("'{}'", flag.replace('\'', "\\'")),
        QuoteStyle::Posix => flag.to_string(),
    }
}

/// An ordered sequence of flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FlagSet(Vec<String>);

impl FlagSet {
    /// Create an empty flag set.
    pub fn new() -> Self {
        FlagSet(Vec::new())
    }

    /// Create a flag set from a list of flags.
    pub fn from_flags(flags: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        FlagSet::new().with_all(flags)
    }

    /// Append a flag.
    #[must_use]
    pub fn with(mut self, flag: impl Into<String>) -> Self {
        self.0.push(flag.into());
        self
    }

    /// Append several flags, in order.
    #[must_use]
    pub fn with_all(mut self, flags: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        self.0.extend(flags.into_iter().map(|f| f.as_ref().to_string()));
        self
    }

    /// Append a flag only when `cond` holds.
    #[must_use]
    pub fn with_if(self, cond: bool, flag: impl Into<String>) -> Self {
        if cond {
            self.with(flag)
        } else {
            self
        }
    }

    /// Remove every occurrence of a flag.
    #[must_use]
    pub fn without(mut self, flag: &str) -> Self {
        self.0.retain(|f| f != flag);
        self
    }

    /// Check whether a flag is present.
    pub fn contains(&self, flag: &str) -> bool {
        self.0.iter().any(|f| f == flag)
    }

    /// Position of a flag, if present.
    pub fn position(&self, flag: &str) -> Option<usize> {
        self.0.iter().position(|f| f == flag)
    }

    /// Iterate over the flags in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as a single space-separated, shell-escaped string.
    pub fn render(&self, style: QuoteStyle) -> String {
        self.0
            .iter()
            .map(|flag| shell_escape(flag, style))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
