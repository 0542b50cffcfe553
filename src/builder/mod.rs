//! Build graph construction.
//!
//! This module turns the resolved platform and toolchain into flag sets and
//! a dependency graph of compile, archive, link and regeneration edges.

pub mod command;
pub mod context;
pub mod graph;
pub mod plan;
pub mod toolchain;

pub use command::{CommandTemplate, Invocation};
pub use context::{BuildContext, GeneratorInfo};
pub use graph::{BuildEdge, BuildGraph, GraphError, Rule};
pub use plan::plan_build;
pub use toolchain::{
    compose_flags, detect_toolchain, FlagInputs, FlagSets, ToolchainConfig, ToolchainVendor,
};
