//! In-memory project descriptor.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use super::parser;
use super::value::{Dict, Value};
use super::writer;
use crate::core::errors::BridgeError;
use crate::util::fs;

/// Name of the descriptor file inside a project bundle.
pub const PBXPROJ_FILE_NAME: &str = "project.pbxproj";

const SOURCES_PHASE_ISA: &str = "PBXSourcesBuildPhase";

/// Anchor a file reference path is relative to. Only group-relative
/// references are ever written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTree {
    Group,
}

impl SourceTree {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTree::Group => "<group>",
        }
    }
}

/// Declared file type for a path, from its extension.
pub fn file_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("m") => "sourcecode.c.objc",
        Some("mm") => "sourcecode.cpp.objcpp",
        Some("c") => "sourcecode.c.c",
        Some("cpp" | "cc" | "cxx") => "sourcecode.cpp.cpp",
        Some("swift") => "sourcecode.swift",
        Some("h") => "sourcecode.c.h",
        _ => "text",
    }
}

/// A file to be added to the project hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReference {
    pub name: String,
    pub path: String,
    pub source_tree: SourceTree,
    pub file_type: String,
}

impl FileReference {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        source_tree: SourceTree,
        file_type: impl Into<String>,
    ) -> Self {
        FileReference {
            name: name.into(),
            path: path.into(),
            source_tree,
            file_type: file_type.into(),
        }
    }

    /// Group-relative reference named after the last component of `path`.
    pub fn group_relative(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        FileReference::new(
            name,
            path.to_string_lossy(),
            SourceTree::Group,
            file_type_for(path),
        )
    }

    fn validate(&self) -> Result<(), BridgeError> {
        if self.name.is_empty() {
            return Err(BridgeError::InvalidFileReference {
                message: format!("no file name in `{}`", self.path),
            });
        }
        if self.path.is_empty() {
            return Err(BridgeError::InvalidFileReference {
                message: format!("empty path for `{}`", self.name),
            });
        }
        Ok(())
    }
}

/// Object ids created by [`ProjectFile::add_source`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedSource {
    pub file_ref: String,
    pub build_file: String,
}

/// A loaded `project.pbxproj`.
#[derive(Debug, Clone)]
pub struct ProjectFile {
    root: Dict,
}

impl ProjectFile {
    /// Load the descriptor of the project bundle at `bundle`.
    pub fn load(bundle: &Path) -> Result<Self, BridgeError> {
        let path = bundle.join(PBXPROJ_FILE_NAME);
        let text = fs::read_to_string(&path)?;
        Self::parse(&text, &path)
    }

    /// Parse descriptor text; `origin` is only used in error messages.
    pub fn parse(text: &str, origin: &Path) -> Result<Self, BridgeError> {
        let invalid = |message: String| BridgeError::InvalidProject {
            path: origin.to_path_buf(),
            message,
        };

        let root = match parser::parse(text).map_err(|e| invalid(e.to_string()))? {
            Value::Dict(root) => root,
            _ => return Err(invalid("root value is not a dictionary".into())),
        };
        if root.get_dict("objects").is_none() {
            return Err(invalid("missing `objects` dictionary".into()));
        }

        let project = ProjectFile { root };
        if project.project_object().is_none() {
            return Err(invalid("`rootObject` does not name a project object".into()));
        }
        Ok(project)
    }

    /// Write the descriptor into the bundle at `bundle`, creating it if needed.
    pub fn save(&self, bundle: &Path) -> Result<PathBuf, BridgeError> {
        fs::ensure_dir(bundle)?;
        let path = bundle.join(PBXPROJ_FILE_NAME);
        fs::write_string(&path, &self.to_pbxproj_string())?;
        Ok(path)
    }

    pub fn to_pbxproj_string(&self) -> String {
        writer::to_string(&Value::Dict(self.root.clone()))
    }

    fn objects(&self) -> Option<&Dict> {
        self.root.get_dict("objects")
    }

    fn objects_mut(&mut self) -> Option<&mut Dict> {
        self.root.get_dict_mut("objects")
    }

    pub fn object(&self, id: &str) -> Option<&Dict> {
        self.objects()?.get_dict(id)
    }

    fn project_object(&self) -> Option<&Dict> {
        self.object(self.root.get_str("rootObject")?)
    }

    fn target_ids(&self) -> Vec<&str> {
        self.project_object()
            .and_then(|p| p.get_array("targets"))
            .map(|ids| ids.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Names of all targets, in project order.
    pub fn target_names(&self) -> Vec<&str> {
        self.target_ids()
            .into_iter()
            .filter_map(|id| self.object(id)?.get_str("name"))
            .collect()
    }

    /// Id of the first target named exactly `name`.
    pub fn find_target(&self, name: &str) -> Option<String> {
        self.target_ids()
            .into_iter()
            .find(|id| {
                self.object(id)
                    .and_then(|t| t.get_str("name"))
                    .is_some_and(|n| n == name)
            })
            .map(str::to_string)
    }

    /// Id of the project's root file group.
    pub fn main_group(&self) -> Option<String> {
        let id = self.project_object()?.get_str("mainGroup")?;
        self.object(id).map(|_| id.to_string())
    }

    /// Id of the first compile-sources phase of a target.
    pub fn sources_phase(&self, target_id: &str) -> Option<String> {
        self.object(target_id)?
            .get_array("buildPhases")?
            .iter()
            .filter_map(Value::as_str)
            .find(|id| {
                self.object(id)
                    .and_then(|phase| phase.get_str("isa"))
                    .is_some_and(|isa| isa == SOURCES_PHASE_ISA)
            })
            .map(str::to_string)
    }

    /// Add a `PBXFileReference` object and return its id.
    pub fn create_file_reference(&mut self, file: &FileReference) -> Result<String, BridgeError> {
        file.validate()?;

        let mut object = Dict::new();
        object.insert("isa", "PBXFileReference");
        object.insert("lastKnownFileType", file.file_type.as_str());
        object.insert("name", file.name.as_str());
        object.insert("path", file.path.as_str());
        object.insert("sourceTree", file.source_tree.as_str());

        let seed = format!("PBXFileReference:{}:{}", file.name, file.path);
        Ok(self.add_object(&seed, object))
    }

    /// Add a `PBXBuildFile` pointing at `file_ref` and return its id.
    pub fn create_build_file(&mut self, file_ref: &str) -> Result<String, BridgeError> {
        if self.object(file_ref).is_none() {
            return Err(BridgeError::InvalidFileReference {
                message: format!("no object with id {file_ref}"),
            });
        }

        let mut object = Dict::new();
        object.insert("isa", "PBXBuildFile");
        object.insert("fileRef", file_ref);

        let seed = format!("PBXBuildFile:{file_ref}");
        Ok(self.add_object(&seed, object))
    }

    /// Insert `child` into a group's `children` at `index`.
    pub fn insert_group_child(
        &mut self,
        group: &str,
        child: &str,
        index: usize,
    ) -> Result<(), BridgeError> {
        self.insert_id(group, "children", child, index)
    }

    /// Insert `build_file` into a build phase's `files` at `index`.
    pub fn insert_phase_file(
        &mut self,
        phase: &str,
        build_file: &str,
        index: usize,
    ) -> Result<(), BridgeError> {
        self.insert_id(phase, "files", build_file, index)
    }

    /// Register `file` as the first source of `target`.
    ///
    /// Every precondition is checked before anything is mutated, so a
    /// failure leaves the project untouched.
    pub fn add_source(
        &mut self,
        target: &str,
        file: &FileReference,
    ) -> Result<AddedSource, BridgeError> {
        let target_id = self
            .find_target(target)
            .ok_or_else(|| BridgeError::TargetNotFound {
                target: target.to_string(),
            })?;
        let main_group = self.main_group().ok_or(BridgeError::MainGroupNotFound)?;
        file.validate()?;
        let phase = self
            .sources_phase(&target_id)
            .ok_or_else(|| BridgeError::SourcesPhaseNotFound {
                target: target.to_string(),
            })?;

        let file_ref = self.create_file_reference(file)?;
        self.insert_group_child(&main_group, &file_ref, 0)?;
        let build_file = self.create_build_file(&file_ref)?;
        self.insert_phase_file(&phase, &build_file, 0)?;

        tracing::debug!(
            "added {} to target `{}` (file {}, build file {})",
            file.path,
            target,
            file_ref,
            build_file
        );

        Ok(AddedSource {
            file_ref,
            build_file,
        })
    }

    fn insert_id(
        &mut self,
        owner: &str,
        key: &str,
        id: &str,
        index: usize,
    ) -> Result<(), BridgeError> {
        let object = self
            .objects_mut()
            .and_then(|objects| objects.get_dict_mut(owner))
            .ok_or_else(|| BridgeError::InvalidFileReference {
                message: format!("no object with id {owner}"),
            })?;

        if !object.contains_key(key) {
            object.insert(key, Value::Array(Vec::new()));
        }
        let list = object
            .get_mut(key)
            .and_then(Value::as_array_mut)
            .ok_or_else(|| BridgeError::InvalidFileReference {
                message: format!("`{key}` of {owner} is not a list"),
            })?;

        let index = index.min(list.len());
        list.insert(index, Value::from(id));
        Ok(())
    }

    fn add_object(&mut self, seed: &str, object: Dict) -> String {
        let id = self.generate_id(seed);
        if let Some(objects) = self.objects_mut() {
            objects.insert(id.clone(), object);
        }
        id
    }

    /// 24 hex digits, unique within this project.
    fn generate_id(&self, seed: &str) -> String {
        let taken = |id: &str| self.objects().is_some_and(|o| o.contains_key(id));
        let count = self.objects().map_or(0, Dict::len);

        (0u64..)
            .map(|salt| {
                let mut hasher = Sha256::new();
                hasher.update(seed.as_bytes());
                hasher.update(count.to_le_bytes());
                hasher.update(salt.to_le_bytes());
                hex::encode_upper(&hasher.finalize()[..12])
            })
            .find(|id| !taken(id))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::SAMPLE_PBXPROJ;

    fn sample() -> ProjectFile {
        ProjectFile::parse(SAMPLE_PBXPROJ, Path::new("Sample.xcodeproj")).unwrap()
    }

    fn bridging_source() -> FileReference {
        FileReference::group_relative(Path::new("Bridging-42.m"))
    }

    #[test]
    fn test_file_type_for() {
        assert_eq!(file_type_for(Path::new("a.m")), "sourcecode.c.objc");
        assert_eq!(file_type_for(Path::new("a.swift")), "sourcecode.swift");
        assert_eq!(file_type_for(Path::new("a.mm")), "sourcecode.cpp.objcpp");
        assert_eq!(file_type_for(Path::new("README")), "text");
    }

    #[test]
    fn test_queries() {
        let project = sample();

        assert_eq!(project.target_names(), vec!["App", "Lint"]);
        let app = project.find_target("App").unwrap();
        assert_eq!(app, "1F00000000000000000000D1");
        assert!(project.find_target("app").is_none());
        assert_eq!(project.main_group().unwrap(), "1F00000000000000000000C1");
        assert_eq!(
            project.sources_phase(&app).unwrap(),
            "1F00000000000000000000E1"
        );

        let lint = project.find_target("Lint").unwrap();
        assert!(project.sources_phase(&lint).is_none());
    }

    #[test]
    fn test_add_source_inserts_at_head() {
        let mut project = sample();
        let added = project.add_source("App", &bridging_source()).unwrap();

        let group = project.object("1F00000000000000000000C1").unwrap();
        assert_eq!(
            group.get_array("children").unwrap()[0],
            Value::from(added.file_ref.as_str())
        );
        assert_eq!(group.get_array("children").unwrap().len(), 4);

        let phase = project.object("1F00000000000000000000E1").unwrap();
        let files = phase.get_array("files").unwrap();
        assert_eq!(files[0], Value::from(added.build_file.as_str()));
        assert_eq!(files.len(), 2);

        let file_ref = project.object(&added.file_ref).unwrap();
        assert_eq!(file_ref.get_str("isa"), Some("PBXFileReference"));
        assert_eq!(file_ref.get_str("name"), Some("Bridging-42.m"));
        assert_eq!(file_ref.get_str("sourceTree"), Some("<group>"));
        assert_eq!(file_ref.get_str("lastKnownFileType"), Some("sourcecode.c.objc"));

        let build_file = project.object(&added.build_file).unwrap();
        assert_eq!(build_file.get_str("fileRef"), Some(added.file_ref.as_str()));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let mut project = sample();
        let first = project.add_source("App", &bridging_source()).unwrap();
        let second = project.add_source("App", &bridging_source()).unwrap();

        assert_eq!(first.file_ref.len(), 24);
        assert_ne!(first.file_ref, second.file_ref);
        assert_ne!(first.build_file, second.build_file);
    }

    #[test]
    fn test_missing_target_leaves_project_unchanged() {
        let mut project = sample();
        let before = project.to_pbxproj_string();

        let err = project.add_source("Missing", &bridging_source()).unwrap_err();
        assert!(matches!(err, BridgeError::TargetNotFound { .. }));
        assert_eq!(project.to_pbxproj_string(), before);
    }

    #[test]
    fn test_missing_sources_phase_leaves_project_unchanged() {
        let mut project = sample();
        let before = project.to_pbxproj_string();

        let err = project.add_source("Lint", &bridging_source()).unwrap_err();
        assert!(matches!(err, BridgeError::SourcesPhaseNotFound { .. }));
        assert_eq!(project.to_pbxproj_string(), before);
    }

    #[test]
    fn test_invalid_file_reference() {
        let mut project = sample();
        let file = FileReference::new("", "x.m", SourceTree::Group, "sourcecode.c.objc");
        let err = project.add_source("App", &file).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidFileReference { .. }));
    }

    #[test]
    fn test_missing_main_group() {
        let text = SAMPLE_PBXPROJ.replace(
            "mainGroup = 1F00000000000000000000C1;",
            "mainGroup = 1F0000000000000000000099;",
        );
        let mut project = ProjectFile::parse(&text, Path::new("Sample.xcodeproj")).unwrap();

        let err = project.add_source("App", &bridging_source()).unwrap_err();
        assert!(matches!(err, BridgeError::MainGroupNotFound));
    }

    #[test]
    fn test_parse_rejects_non_project() {
        let err = ProjectFile::parse("{ objects = { }; }", Path::new("x")).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidProject { .. }));

        let err = ProjectFile::parse("{ objects = ", Path::new("x")).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidProject { .. }));
    }

    #[test]
    fn test_save_and_reload() {
        let tmp = tempfile::TempDir::new().unwrap();
        let bundle = tmp.path().join("Out.xcodeproj");

        let mut project = sample();
        let added = project.add_source("App", &bridging_source()).unwrap();
        project.save(&bundle).unwrap();

        let reloaded = ProjectFile::load(&bundle).unwrap();
        assert!(reloaded.object(&added.file_ref).is_some());
        assert_eq!(reloaded.target_names(), vec!["App", "Lint"]);
    }
}
