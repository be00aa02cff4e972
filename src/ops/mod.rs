//! High-level operations.
//!
//! This module contains the implementation of the bridgecraft commands and
//! the wrappers around the external tools they drive.

pub mod artifacts;
pub mod build_tool;
pub mod generate;
pub mod interface;
pub mod patch;
pub mod preprocess;

pub use artifacts::TempArtifacts;
pub use build_tool::{BuildTool, DryRunOptions};
pub use generate::{emit, generate, render_output, ArtifactPaths, GenerateOptions, Pipeline};
pub use interface::{InterfaceRequest, InterfaceService, SourceKitten};
pub use patch::{patch, register_source, PatchOptions, PatchResult};
pub use preprocess::Preprocessor;
