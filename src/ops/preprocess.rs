//! Preprocessing of the synthesized translation unit.

use std::path::{Path, PathBuf};

use crate::core::errors::BridgeError;
use crate::core::flags::CompilerFlags;
use crate::core::translation_unit::wrap_assume_nonnull;
use crate::util::fs;
use crate::util::process::ProcessBuilder;

/// Options every preprocessor run gets: Objective-C, keep comments, modules on.
pub const PREPROCESS_ARGS: &[&str] = &["-x", "objective-c", "-C", "-fmodules", "-fimplicit-modules"];

/// Handle on the preprocessor executable.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    program: PathBuf,
}

impl Preprocessor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Preprocessor {
            program: program.into(),
        }
    }

    /// `<clang> -x objective-c -C -fmodules -fimplicit-modules -E <input> -o <output> <flags...>`
    pub fn command(&self, input: &Path, output: &Path, flags: &CompilerFlags) -> ProcessBuilder {
        ProcessBuilder::new(&self.program)
            .args(PREPROCESS_ARGS)
            .arg("-E")
            .arg(input)
            .arg("-o")
            .arg(output)
            .args(flags)
    }

    /// Flatten `input` into `output`.
    pub fn run(&self, input: &Path, output: &Path, flags: &CompilerFlags) -> Result<(), BridgeError> {
        self.command(input, output, flags).exec_and_check()?;
        Ok(())
    }
}

/// Rewrite a preprocessed header in place so every declaration is nonnull by default.
pub fn normalize_nullability(path: &Path, umbrella_header: &str) -> Result<(), BridgeError> {
    let source = fs::read_to_string(path)?;
    fs::write_string(path, &wrap_assume_nonnull(&source, umbrella_header))
}
