//! Environment overrides recognized by `configure`.
//!
//! Exactly four variables influence the generated build file:
//! - `CXX` - compiler path
//! - `AR` - archiver path
//! - `CFLAGS` - extra compile flags
//! - `LDFLAGS` - extra link flags
//!
//! Only the variables present in the environment are captured. They are
//! echoed back into the regeneration command so that a rerun triggered by
//! the build engine sees the same environment as the original invocation.

use serde::Serialize;

/// One of the recognized environment variables.
///
/// The declaration order is the display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EnvKey {
    Cxx,
    Ar,
    Cflags,
    Ldflags,
}

impl EnvKey {
    /// All keys, in display order.
    pub const ALL: [EnvKey; 4] = [EnvKey::Cxx, EnvKey::Ar, EnvKey::Cflags, EnvKey::Ldflags];

    /// The environment variable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::Cxx => "CXX",
            EnvKey::Ar => "AR",
            EnvKey::Cflags => "CFLAGS",
            EnvKey::Ldflags => "LDFLAGS",
        }
    }
}

impl std::fmt::Display for EnvKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The captured environment overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnvOverrides {
    /// Compiler path (`CXX`)
    pub cxx: Option<String>,
    /// Archiver path (`AR`)
    pub ar: Option<String>,
    /// Extra compile flags (`CFLAGS`)
    pub cflags: Option<String>,
    /// Extra link flags (`LDFLAGS`)
    pub ldflags: Option<String>,
}

impl EnvOverrides {
    /// Capture overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Capture overrides through an arbitrary lookup function.
    pub fn from_lookup(mut lookup: impl FnMut(&str) -> Option<String>) -> Self {
        let mut overrides = EnvOverrides::default();
        for key in EnvKey::ALL {
            if let Some(value) = lookup(key.as_str()) {
                *overrides.slot_mut(key) = Some(value);
            }
        }
        overrides
    }

    /// Get the value captured for a key.
    pub fn get(&self, key: EnvKey) -> Option<&str> {
        match key {
            EnvKey::Cxx => self.cxx.as_deref(),
            EnvKey::Ar => self.ar.as_deref(),
            EnvKey::Cflags => self.cflags.as_deref(),
            EnvKey::Ldflags => self.ldflags.as_deref(),
        }
    }

    fn slot_mut(&mut self, key: EnvKey) -> &mut Option<String> {
        match key {
            EnvKey::Cxx => &mut self.cxx,
            EnvKey::Ar => &mut self.ar,
            EnvKey::Cflags => &mut self.cflags,
            EnvKey::Ldflags => &mut self.ldflags,
        }
    }

    /// Iterate over the captured overrides in display order.
    pub fn iter(&self) -> impl Iterator<Item = (EnvKey, &str)> + '_ {
        EnvKey::ALL
            .into_iter()
            .filter_map(move |key| self.get(key).map(|value| (key, value)))
    }

    /// Check if nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Render the overrides as `KEY=value` assignments.
    ///
    /// Returns `None` when nothing was captured. Values the shell would
    /// split, expand or unquote are single-quoted, so running the assignments
    /// through `sh` reproduces the captured values exactly.
    pub fn display_string(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let parts: Vec<String> = self
            .iter()
            .map(|(key, value)| format!("{}={}", key, quote_env_value(value)))
            .collect();
        Some(parts.join(" "))
    }
}

fn quote_env_value(value: &str) -> String {
    if !value.is_empty() && value.chars().all(is_shell_safe) {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "'\\''"))
    }
}

fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c)
}
