//! Bridgecraft - generate the Swift interface of an Objective-C bridging header
//!
//! This crate provides the library behind the `bridgecraft` binary: reading
//! and patching Xcode project descriptors, recovering compiler flags from a
//! dry-run build, and driving the preprocessor and SourceKit.

pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for bridgecraft unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides project fixtures, fake external tools and a
/// recording interface service.
#[cfg(test)]
pub mod test_support;

pub use core::{BridgeError, CompilerFlags, ErrorKind, FileReference, ProjectFile};
pub use ops::{GenerateOptions, InterfaceService, PatchOptions, Pipeline};
pub use util::{Config, Shell};
