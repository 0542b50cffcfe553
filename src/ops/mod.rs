//! High-level operations.
//!
//! This module contains the implementation of a configure run.

pub mod configure;

pub use configure::{
    configure, generate, resolve, ConfigureError, ConfigureOptions, ConfigureOutcome,
    DEFAULT_OUTPUT,
};
