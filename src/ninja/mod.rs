//! Ninja file emission.

pub mod writer;

pub use writer::{escape_path, render, Writer};
