//! Invocations of the external build tool (`xcodebuild`).

use std::path::{Path, PathBuf};

use crate::core::errors::BridgeError;
use crate::core::pbxproj::ProjectFile;
use crate::core::settings::find_setting;
use crate::util::process::ProcessBuilder;

/// Overrides applied to a dry-run build.
#[derive(Debug, Clone, Default)]
pub struct DryRunOptions {
    /// SDK override (`-sdk`)
    pub sdk: Option<String>,

    /// Destination override (`-destination`)
    pub destination: Option<String>,

    /// Append `-UseModernBuildSystem=0`
    pub legacy_build_system: bool,

    /// Extra arguments passed through verbatim
    pub extra_args: Vec<String>,
}

/// Handle on the build tool executable.
#[derive(Debug, Clone)]
pub struct BuildTool {
    program: PathBuf,
}

impl BuildTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        BuildTool {
            program: program.into(),
        }
    }

    fn command(&self, project: &Path) -> ProcessBuilder {
        let builder = ProcessBuilder::new(&self.program);
        match project.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(dir) => builder.cwd(dir),
            None => builder,
        }
    }

    /// `<tool> -showBuildSettings -project <project> -target <target>`
    pub fn show_settings_command(&self, project: &Path, target: &str) -> ProcessBuilder {
        self.command(project)
            .arg("-showBuildSettings")
            .arg("-project")
            .arg(project)
            .arg("-target")
            .arg(target)
    }

    /// `<tool> clean build -dry-run -project <project> -target <target> [...]`
    pub fn dry_run_command(
        &self,
        project: &Path,
        target: &str,
        opts: &DryRunOptions,
    ) -> ProcessBuilder {
        let mut cmd = self
            .command(project)
            .args(["clean", "build", "-dry-run"])
            .arg("-project")
            .arg(project)
            .arg("-target")
            .arg(target);

        if opts.legacy_build_system {
            cmd = cmd.arg("-UseModernBuildSystem=0");
        }
        if let Some(ref sdk) = opts.sdk {
            cmd = cmd.arg("-sdk").arg(sdk);
        }
        if let Some(ref destination) = opts.destination {
            cmd = cmd.arg("-destination").arg(destination);
        }
        cmd.args(&opts.extra_args)
    }

    /// Read one build setting of `target`.
    ///
    /// The target is looked up in the project first; the tool reports an
    /// unknown target only through its exit status.
    pub fn read_setting(&self, project: &Path, target: &str, key: &str) -> Result<String, BridgeError> {
        if ProjectFile::load(project)?.find_target(target).is_none() {
            return Err(BridgeError::TargetNotFound {
                target: target.to_string(),
            });
        }

        let output = self.show_settings_command(project, target).exec_stdout()?;
        let value = find_setting(&output, key)?;
        tracing::debug!("{} = {}", key, value);
        Ok(value)
    }

    /// Run a dry-run build and return everything it printed.
    pub fn dry_run_build(
        &self,
        project: &Path,
        target: &str,
        opts: &DryRunOptions,
    ) -> Result<String, BridgeError> {
        let output = self
            .dry_run_command(project, target, opts)
            .exec_and_check()?;

        let mut log = String::from_utf8_lossy(&output.stdout).into_owned();
        log.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(log)
    }
}
