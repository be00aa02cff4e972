//! Registering a source file with a project target (`bridgecraft patch`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::errors::BridgeError;
use crate::core::pbxproj::{AddedSource, FileReference, ProjectFile};
use crate::ops::artifacts::TempArtifacts;
use crate::util::fs;

/// Options for the patch command.
#[derive(Debug, Clone)]
pub struct PatchOptions {
    /// Project bundle to patch
    pub project: PathBuf,

    /// Target that receives the file
    pub target: String,

    /// Source file to add
    pub source_file: PathBuf,

    /// Write the patched project here instead of in place
    pub output: Option<PathBuf>,
}

/// Outcome of a successful patch.
#[derive(Debug, Clone)]
pub struct PatchResult {
    /// Bundle that was written
    pub project: PathBuf,

    /// Reference that was added
    pub file: FileReference,

    /// Ids of the new objects
    pub added: AddedSource,
}

/// Load `project`, add `file` to the sources of `target` and save to `output`.
///
/// Nothing is written unless every step succeeds. When `output` differs from
/// `project`, the descriptor at `project` is never touched.
pub fn register_source(
    project: &Path,
    target: &str,
    file: &FileReference,
    output: &Path,
) -> Result<AddedSource> {
    let mut project_file = ProjectFile::load(project)
        .with_context(|| format!("cannot load project at {}", project.display()))?;

    let added = project_file.add_source(target, file).map_err(|e| match e {
        BridgeError::TargetNotFound { .. } => {
            let available = project_file.target_names();
            anyhow::Error::new(e).context(format!(
                "cannot add {} to project\navailable targets: {}",
                file.path,
                if available.is_empty() {
                    "(none)".to_string()
                } else {
                    available.join(", ")
                }
            ))
        }
        e => anyhow::Error::new(e).context(format!("cannot add {} to project", file.path)),
    })?;

    project_file
        .save(output)
        .with_context(|| format!("cannot save project to {}", output.display()))?;

    Ok(added)
}

/// Copy a project bundle to `dst`, replacing whatever is there.
pub fn clone_project(src: &Path, dst: &Path) -> Result<()> {
    fs::remove_path_if_exists(dst)
        .and_then(|()| fs::copy_all(src, dst))
        .with_context(|| {
            format!(
                "cannot clone project at {} to {}",
                src.display(),
                dst.display()
            )
        })
}

/// The reference used for `source_file` in the project at `project`.
///
/// The path is made relative to the directory holding the project bundle,
/// which is where the main group resolves group-relative paths.
pub fn source_reference(project: &Path, source_file: &Path) -> FileReference {
    let source = fs::absolute(source_file);
    let path = match fs::absolute(project).parent() {
        Some(project_dir) => fs::relative_path(project_dir, &source),
        None => source.clone(),
    };

    FileReference::group_relative(&path)
}

/// Patch a project as described by `opts`.
pub fn patch(opts: &PatchOptions) -> Result<PatchResult> {
    let output = opts.output.clone().unwrap_or_else(|| opts.project.clone());
    let in_place = fs::normalize_path(&output) == fs::normalize_path(&opts.project);

    let mut artifacts = TempArtifacts::new();
    if !in_place {
        artifacts.track(&output);
        clone_project(&opts.project, &output)?;
    }

    let file = source_reference(&output, &opts.source_file);
    let added = register_source(&output, &opts.target, &file, &output)?;

    // The patched copy is the result; keep it.
    artifacts.keep();

    Ok(PatchResult {
        project: output,
        file,
        added,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::{find_bridge_error, ErrorKind};
    use crate::core::pbxproj::PBXPROJ_FILE_NAME;
    use crate::test_support::create_sample_project;
    use tempfile::TempDir;

    #[test]
    fn test_patch_in_place() {
        let tmp = TempDir::new().unwrap();
        let project = create_sample_project(tmp.path(), "Sample");

        let result = patch(&PatchOptions {
            project: project.clone(),
            target: "App".into(),
            source_file: tmp.path().join("Sources").join("Extra.swift"),
            output: None,
        })
        .unwrap();

        assert_eq!(result.project, project);
        assert_eq!(result.file.name, "Extra.swift");
        assert_eq!(result.file.path, "Sources/Extra.swift");
        assert_eq!(result.file.file_type, "sourcecode.swift");

        let reloaded = ProjectFile::load(&project).unwrap();
        assert!(reloaded.object(&result.added.build_file).is_some());
    }

    #[test]
    fn test_patch_to_output_leaves_original() {
        let tmp = TempDir::new().unwrap();
        let project = create_sample_project(tmp.path(), "Sample");
        let before = std::fs::read_to_string(project.join(PBXPROJ_FILE_NAME)).unwrap();
        let output = tmp.path().join("Patched.xcodeproj");

        patch(&PatchOptions {
            project: project.clone(),
            target: "App".into(),
            source_file: tmp.path().join("New.m"),
            output: Some(output.clone()),
        })
        .unwrap();

        let after = std::fs::read_to_string(project.join(PBXPROJ_FILE_NAME)).unwrap();
        assert_eq!(before, after);

        let patched = std::fs::read_to_string(output.join(PBXPROJ_FILE_NAME)).unwrap();
        assert!(patched.contains("New.m"));
    }

    #[test]
    fn test_failed_patch_removes_output_clone() {
        let tmp = TempDir::new().unwrap();
        let project = create_sample_project(tmp.path(), "Sample");
        let output = tmp.path().join("Patched.xcodeproj");

        let err = patch(&PatchOptions {
            project,
            target: "Missing".into(),
            source_file: tmp.path().join("New.m"),
            output: Some(output.clone()),
        })
        .unwrap_err();

        assert_eq!(find_bridge_error(&err).unwrap().kind(), ErrorKind::NotFound);
        assert!(format!("{:#}", err).contains("available targets: App, Lint"));
        assert!(!output.exists());
    }

    #[test]
    fn test_no_sources_phase_never_saves() {
        let tmp = TempDir::new().unwrap();
        let project = create_sample_project(tmp.path(), "Sample");
        let pbxproj = project.join(PBXPROJ_FILE_NAME);
        let before = std::fs::read_to_string(&pbxproj).unwrap();

        let file = FileReference::group_relative(Path::new("New.m"));
        let err = register_source(&project, "Lint", &file, &project).unwrap_err();

        assert!(matches!(
            find_bridge_error(&err),
            Some(BridgeError::SourcesPhaseNotFound { .. })
        ));
        assert_eq!(std::fs::read_to_string(&pbxproj).unwrap(), before);
    }

    #[test]
    fn test_register_source_to_other_path() {
        let tmp = TempDir::new().unwrap();
        let project = create_sample_project(tmp.path(), "Sample");
        let before = std::fs::read_to_string(project.join(PBXPROJ_FILE_NAME)).unwrap();
        let output = tmp.path().join("Other.xcodeproj");

        let file = FileReference::group_relative(Path::new("Bridging-5.m"));
        register_source(&project, "App", &file, &output).unwrap();

        assert_eq!(
            std::fs::read_to_string(project.join(PBXPROJ_FILE_NAME)).unwrap(),
            before
        );
        assert!(output.join(PBXPROJ_FILE_NAME).exists());
    }

    #[test]
    fn test_missing_project() {
        let tmp = TempDir::new().unwrap();
        let err = patch(&PatchOptions {
            project: tmp.path().join("Nope.xcodeproj"),
            target: "App".into(),
            source_file: tmp.path().join("New.m"),
            output: None,
        })
        .unwrap_err();

        assert_eq!(find_bridge_error(&err).unwrap().kind(), ErrorKind::Io);
    }
}
