//! Xcode project descriptors (`<Name>.xcodeproj/project.pbxproj`).
//!
//! The descriptor is an OpenStep-style property list: a dictionary of
//! objects keyed by 24-digit hex ids plus a `rootObject` pointing at the
//! project. Only the queries and mutations needed to register a source file
//! with a target are modeled; everything else round-trips untouched.

pub mod parser;
pub mod project;
pub mod value;
pub mod writer;

pub use parser::{parse, ParseError};
pub use project::{
    file_type_for, AddedSource, FileReference, ProjectFile, SourceTree, PBXPROJ_FILE_NAME,
};
pub use value::{Dict, Value};
