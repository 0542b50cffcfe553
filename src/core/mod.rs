//! Core data types: platforms, flag sets and the source manifest.

pub mod flags;
pub mod manifest;
pub mod platform;

pub use flags::{shell_escape, FlagSet, QuoteStyle};
pub use manifest::{Manifest, Sources};
pub use platform::{Platform, PlatformVariant};
