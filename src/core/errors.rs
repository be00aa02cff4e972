//! Error taxonomy for the bridging pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Broad failure category of a [`BridgeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required setting, target, file or log line is absent.
    NotFound,
    /// An external tool exited with a nonzero status.
    ExternalToolFailure,
    /// Reading, writing, copying or removing a file failed.
    Io,
    /// The interface service returned blank text.
    EmptyResult,
    /// The project descriptor could not be parsed or is malformed.
    InvalidProject,
}

/// Error raised by a pipeline step.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("build setting `{key}` not found")]
    SettingNotFound { key: String },

    #[error("cannot find target `{target}`")]
    TargetNotFound { target: String },

    #[error("project has no main group")]
    MainGroupNotFound,

    #[error("compile sources build phase not found in target `{target}`")]
    SourcesPhaseNotFound { target: String },

    #[error("no compiler invocation found for `{}`", unit.display())]
    CompileLineNotFound { unit: PathBuf },

    #[error("tool `{tool}` not found")]
    ToolNotFound { tool: String },

    #[error("`{command}` failed with exit code {code:?}\n{stderr}")]
    ToolFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("generated interface for `{}` is empty", file.display())]
    EmptyInterface { file: PathBuf },

    #[error("invalid project at {}: {message}", path.display())]
    InvalidProject { path: PathBuf, message: String },

    #[error("cannot create file reference: {message}")]
    InvalidFileReference { message: String },
}

impl BridgeError {
    /// Category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::SettingNotFound { .. }
            | BridgeError::TargetNotFound { .. }
            | BridgeError::MainGroupNotFound
            | BridgeError::SourcesPhaseNotFound { .. }
            | BridgeError::CompileLineNotFound { .. }
            | BridgeError::ToolNotFound { .. } => ErrorKind::NotFound,
            BridgeError::ToolFailed { .. } => ErrorKind::ExternalToolFailure,
            BridgeError::Io { .. } => ErrorKind::Io,
            BridgeError::EmptyInterface { .. } => ErrorKind::EmptyResult,
            BridgeError::InvalidProject { .. } | BridgeError::InvalidFileReference { .. } => {
                ErrorKind::InvalidProject
            }
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        BridgeError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Find the [`BridgeError`] anywhere in an `anyhow` error chain.
pub fn find_bridge_error(err: &anyhow::Error) -> Option<&BridgeError> {
    err.chain().find_map(|cause| cause.downcast_ref::<BridgeError>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            BridgeError::SettingNotFound {
                key: "SWIFT_OBJC_BRIDGING_HEADER".into()
            }
            .kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            BridgeError::ToolFailed {
                command: "clang".into(),
                code: Some(1),
                stderr: String::new(),
            }
            .kind(),
            ErrorKind::ExternalToolFailure
        );
        assert_eq!(
            BridgeError::EmptyInterface {
                file: PathBuf::from("Bridging-1.h")
            }
            .kind(),
            ErrorKind::EmptyResult
        );
    }

    #[test]
    fn test_find_through_context() {
        let result: anyhow::Result<()> = Err(BridgeError::MainGroupNotFound.into());
        let err = result.context("cannot add source file to project").unwrap_err();

        let found = find_bridge_error(&err).unwrap();
        assert_eq!(found.kind(), ErrorKind::NotFound);
        assert!(format!("{:#}", err).contains("project has no main group"));
    }
}
