//! Core data structures and parsing for bridgecraft.
//!
//! This module contains the pure parts of the pipeline:
//! - Compiler flag extraction from build logs
//! - Build-settings scanning
//! - Translation-unit synthesis and header rewriting
//! - The project descriptor model

pub mod errors;
pub mod flags;
pub mod pbxproj;
pub mod settings;
pub mod translation_unit;

pub use errors::{BridgeError, ErrorKind};
pub use flags::{extract_flags, CompilerFlags, FlagKind};
pub use pbxproj::{FileReference, ProjectFile, SourceTree};
pub use settings::find_setting;
