//! `Configure.toml` source manifest.
//!
//! The manifest declares which sources make up the library and where the
//! test sources live. It is optional; without it the built-in layout is
//! used:
//!
//! ```toml
//! [library]
//! name = "immutable"
//! dir = "immutable"
//! sources = ["array"]
//! extension = "cc"
//!
//! [tests]
//! dir = "tests"
//! extension = "cc"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::fs::discover_stems;

/// Manifest file name, looked up in the project root.
pub const MANIFEST_NAME: &str = "Configure.toml";

/// Invalid manifest contents.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManifestError {
    #[error("library `{library}` declares no sources")]
    EmptyLibrary { library: String },

    #[error("library source `{source_name}` is declared more than once")]
    DuplicateSource { source_name: String },

    #[error("invalid library name `{0}`")]
    InvalidName(String),
}

/// The library section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LibrarySection {
    /// Library name; the archive is `lib<name>.a` or `<name>.lib`
    pub name: String,
    /// Directory holding the sources, relative to the root
    pub dir: String,
    /// Source stems, without directory or extension
    pub sources: Vec<String>,
    /// Source file extension
    pub extension: String,
}

impl Default for LibrarySection {
    fn default() -> Self {
        LibrarySection {
            name: "immutable".to_string(),
            dir: "immutable".to_string(),
            sources: vec!["array".to_string()],
            extension: "cc".to_string(),
        }
    }
}

/// The tests section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestsSection {
    /// Directory scanned for test sources
    pub dir: String,
    /// Test source extension
    pub extension: String,
}

impl Default for TestsSection {
    fn default() -> Self {
        TestsSection {
            dir: "tests".to_string(),
            extension: "cc".to_string(),
        }
    }
}

/// Parsed manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    pub library: LibrarySection,
    pub tests: TestsSection,
}

impl Manifest {
    /// Load a manifest from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("invalid manifest: {}", path.display()))
    }

    /// Parse and validate manifest content.
    pub fn parse(content: &str) -> Result<Self> {
        let manifest: Manifest =
            toml::from_str(content).with_context(|| format!("failed to parse {}", MANIFEST_NAME))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load `Configure.toml` from `root` if it exists, otherwise use defaults.
    ///
    /// Returns the manifest path alongside when one was read.
    pub fn discover(root: &Path) -> Result<(Self, Option<PathBuf>)> {
        let path = root.join(MANIFEST_NAME);
        if path.is_file() {
            let manifest = Self::load(&path)?;
            tracing::debug!("loaded manifest {}", path.display());
            Ok((manifest, Some(path)))
        } else {
            Ok((Manifest::default(), None))
        }
    }

    /// Check the invariants the graph builder relies on.
    pub fn validate(&self) -> Result<(), ManifestError> {
        let lib = &self.library;
        let name_ok = !lib.name.is_empty()
            && lib
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !name_ok {
            return Err(ManifestError::InvalidName(lib.name.clone()));
        }

        if lib.sources.is_empty() {
            return Err(ManifestError::EmptyLibrary {
                library: lib.name.clone(),
            });
        }

        let mut seen = HashSet::new();
        for source in &lib.sources {
            if !seen.insert(source.as_str()) {
                return Err(ManifestError::DuplicateSource {
                    source_name: source.clone(),
                });
            }
        }

        Ok(())
    }

    /// Resolve the manifest into concrete source stems.
    ///
    /// Test sources are discovered on disk under `root`.
    pub fn resolve_sources(&self, root: &Path) -> Result<Sources> {
        let lib = &self.library;
        let library = lib
            .sources
            .iter()
            .map(|name| join_stem(&lib.dir, name))
            .collect();

        let tests = discover_stems(root, &self.tests.dir, &self.tests.extension)?;
        if tests.is_empty() {
            tracing::warn!("no test sources found in `{}`", self.tests.dir);
        }

        Ok(Sources {
            library_name: lib.name.clone(),
            library,
            library_extension: lib.extension.clone(),
            tests,
            test_extension: self.tests.extension.clone(),
        })
    }
}

fn join_stem(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() || dir == "." {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Concrete source lists for one generation pass.
///
/// Stems are paths relative to the root without extension, e.g.
/// `immutable/array`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sources {
    pub library_name: String,
    pub library: Vec<String>,
    pub library_extension: String,
    pub tests: Vec<String>,
    pub test_extension: String,
}

impl Sources {
    /// Source file path for a library stem.
    pub fn library_source(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.library_extension)
    }

    /// Source file path for a test stem.
    pub fn test_source(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.test_extension)
    }
}
