//! Subprocess execution utilities.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use crate::core::errors::BridgeError;

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }

    /// Execute the command and wait for completion.
    ///
    /// Stdout and stderr are captured separately.
    pub fn exec(&self) -> Result<Output, BridgeError> {
        tracing::debug!("running `{}`", self.display_command());

        let output = self
            .build_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                if e.kind() == io::ErrorKind::NotFound {
                    BridgeError::ToolNotFound {
                        tool: self.program.display().to_string(),
                    }
                } else {
                    BridgeError::io(&self.program, e)
                }
            })?;

        tracing::trace!(
            "`{}` exited with {:?}\nstdout:\n{}\nstderr:\n{}",
            self.program.display(),
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );

        Ok(output)
    }

    /// Execute and require success.
    pub fn exec_and_check(&self) -> Result<Output, BridgeError> {
        let output = self.exec()?;
        if !output.status.success() {
            return Err(BridgeError::ToolFailed {
                command: self.display_command(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }
        Ok(output)
    }

    /// Execute, require success and return stdout as text.
    pub fn exec_stdout(&self) -> Result<String, BridgeError> {
        let output = self.exec_and_check()?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Resolve a configured tool to a path.
///
/// A path that exists is used as-is, a bare name is looked up on `PATH`,
/// and anything else is returned unchanged so spawning reports it.
pub fn resolve_tool(configured: &Path) -> PathBuf {
    if configured.exists() {
        return configured.to_path_buf();
    }
    if configured.components().count() == 1 {
        if let Some(found) = configured.to_str().and_then(find_executable) {
            return found;
        }
    }
    configured.to_path_buf()
}
