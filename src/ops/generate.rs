//! The `generate` pipeline.
//!
//! A run works on a throwaway clone of the project:
//!
//! 1. clone the project next to the original
//! 2. read the target's bridging header setting
//! 3. write a translation unit importing that header and add it to the clone
//! 4. dry-run build the clone and pick the unit's compiler flags out of the log
//! 5. preprocess the unit with those flags, optionally bracketing the result
//!    in `NS_ASSUME_NONNULL_BEGIN`/`END`
//! 6. ask the interface service for the Swift interface of the result
//!
//! Every temporary is removed before the interface is emitted, and on any
//! failure.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::Rng;

use crate::core::errors::BridgeError;
use crate::core::flags::{extract_flags, CompilerFlags};
use crate::core::pbxproj::FileReference;
use crate::core::settings::BRIDGING_HEADER_KEY;
use crate::core::translation_unit::{synthesize, DEFAULT_UMBRELLA_HEADER};
use crate::ops::artifacts::TempArtifacts;
use crate::ops::build_tool::{BuildTool, DryRunOptions};
use crate::ops::interface::{source_text, InterfaceRequest, InterfaceService};
use crate::ops::patch::{clone_project, register_source};
use crate::ops::preprocess::{normalize_nullability, Preprocessor};
use crate::util::fs;
use crate::util::shell::{Shell, Status};

/// Upper bound (exclusive) of the random suffix of temporary names.
pub const SEED_RANGE: u32 = 1000;

/// Options for one `generate` run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Project bundle to read
    pub project: PathBuf,

    /// Target whose bridging header is processed
    pub target: String,

    /// Bracket the preprocessed header in nullability assumptions
    pub assume_nonnull: bool,

    /// Header imported ahead of the nullability brackets
    pub umbrella_header: String,

    /// Dry-run build overrides
    pub dry_run: DryRunOptions,

    /// Output file; stdout when unset
    pub output: Option<PathBuf>,

    /// Suffix of temporary names; random when unset
    pub seed: Option<u32>,
}

impl GenerateOptions {
    pub fn new(project: impl Into<PathBuf>, target: impl Into<String>) -> Self {
        GenerateOptions {
            project: project.into(),
            target: target.into(),
            assume_nonnull: false,
            umbrella_header: DEFAULT_UMBRELLA_HEADER.to_string(),
            dry_run: DryRunOptions::default(),
            output: None,
            seed: None,
        }
    }
}

/// Pick a suffix for temporary names.
pub fn random_seed() -> u32 {
    rand::thread_rng().gen_range(0..SEED_RANGE)
}

/// Locations of the temporaries of one run, all siblings of the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// `<Stem>-<N>.xcodeproj`
    pub project: PathBuf,

    /// `Bridging-<N>.m`
    pub unit: PathBuf,

    /// `Bridging-<N>.h`
    pub header: PathBuf,
}

impl ArtifactPaths {
    pub fn new(project: &Path, seed: u32) -> Result<Self> {
        let project = fs::absolute(project);
        let stem = project
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow::anyhow!("invalid project path {}", project.display()))?;
        let extension = project
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let dir = project.parent().unwrap_or_else(|| Path::new("."));

        Ok(ArtifactPaths {
            project: dir.join(format!("{stem}-{seed}{extension}")),
            unit: dir.join(format!("Bridging-{seed}.m")),
            header: dir.join(format!("Bridging-{seed}.h")),
        })
    }
}

/// The external collaborators of a run.
pub struct Pipeline<'a> {
    shell: &'a Shell,
    build_tool: BuildTool,
    preprocessor: Preprocessor,
    service: &'a dyn InterfaceService,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        shell: &'a Shell,
        build_tool: BuildTool,
        preprocessor: Preprocessor,
        service: &'a dyn InterfaceService,
    ) -> Self {
        Pipeline {
            shell,
            build_tool,
            preprocessor,
            service,
        }
    }

    /// Produce the interface text for `opts`.
    ///
    /// All temporaries are gone by the time this returns, whatever the outcome.
    pub fn run(&self, opts: &GenerateOptions) -> Result<String> {
        let seed = opts.seed.unwrap_or_else(random_seed);
        let paths = ArtifactPaths::new(&opts.project, seed)?;
        tracing::debug!("temporaries: {:?}", paths);

        let mut artifacts = TempArtifacts::new();
        let result = self.run_steps(opts, &paths, &mut artifacts);
        artifacts.cleanup();
        result
    }

    fn run_steps(
        &self,
        opts: &GenerateOptions,
        paths: &ArtifactPaths,
        artifacts: &mut TempArtifacts,
    ) -> Result<String> {
        let target = opts.target.as_str();

        self.shell.status(
            Status::Cloning,
            format!("{} to {}", opts.project.display(), paths.project.display()),
        );
        artifacts.track(&paths.project);
        clone_project(&opts.project, &paths.project)?;

        self.shell
            .status(Status::Reading, format!("bridging header of `{target}`"));
        let bridging_header = self
            .build_tool
            .read_setting(&paths.project, target, BRIDGING_HEADER_KEY)
            .with_context(|| format!("cannot read {BRIDGING_HEADER_KEY} of target `{target}`"))?;

        artifacts.track(&paths.unit);
        fs::write_string(&paths.unit, &synthesize(&bridging_header))
            .context("cannot write translation unit")?;

        self.shell.status(
            Status::Patching,
            format!("{} into `{target}`", paths.project.display()),
        );
        let unit_name = paths
            .unit
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| paths.unit.clone());
        register_source(
            &paths.project,
            target,
            &FileReference::group_relative(&unit_name),
            &paths.project,
        )?;

        let span = self
            .shell
            .span(Status::Building, format!("`{target}` (dry run)"));
        let log = self
            .build_tool
            .dry_run_build(&paths.project, target, &opts.dry_run)
            .with_context(|| format!("dry-run build of target `{target}` failed"))?;
        span.finish();

        let flags = extract_flags(&log, &paths.unit).with_context(|| {
            format!(
                "cannot determine compiler flags of {}",
                paths.unit.display()
            )
        })?;
        tracing::debug!("compiler flags: {}", flags);

        self.shell
            .status(Status::Preprocessing, paths.unit.display());
        artifacts.track(&paths.header);
        self.preprocessor
            .run(&paths.unit, &paths.header, &flags)
            .context("preprocessing failed")?;

        if opts.assume_nonnull {
            normalize_nullability(&paths.header, &opts.umbrella_header)
                .context("cannot rewrite preprocessed header")?;
        }

        self.shell.status(Status::Generating, "interface");
        self.synthesize_interface(&paths.header, flags)
    }

    fn synthesize_interface(&self, header: &Path, flags: CompilerFlags) -> Result<String> {
        let request = InterfaceRequest::new(header, flags.into_vec());
        let response = self
            .service
            .send(&request)
            .context("interface synthesis failed")?;

        match source_text(&response) {
            Some(text) => Ok(text.to_string()),
            None => Err(BridgeError::EmptyInterface {
                file: header.to_path_buf(),
            }
            .into()),
        }
    }
}

/// Prefix the interface with the generated-file banner.
pub fn render_output(interface: &str) -> String {
    format!(
        "// Generated using bridgecraft {} - {}\n// DO NOT EDIT\n\n{}",
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_REPOSITORY"),
        interface
    )
}

/// Write the rendered interface to `output`, or to stdout.
pub fn emit(interface: &str, output: Option<&Path>) -> Result<()> {
    let text = render_output(interface);
    match output {
        Some(path) => fs::write_string_atomic(path, &text)
            .with_context(|| format!("cannot write interface to {}", path.display())),
        None => write_terminated(std::io::stdout().lock(), &text)
            .context("cannot write interface to stdout"),
    }
}

/// Write `text` to a stream, ending it with a newline if it lacks one.
fn write_terminated<W: Write>(mut out: W, text: &str) -> std::io::Result<()> {
    out.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        out.write_all(b"\n")?;
    }
    out.flush()
}

/// Run the pipeline and emit its result.
pub fn generate(pipeline: &Pipeline<'_>, opts: &GenerateOptions) -> Result<()> {
    let interface = pipeline.run(opts)?;
    emit(&interface, opts.output.as_deref())?;

    if let Some(ref output) = opts.output {
        pipeline
            .shell
            .status(Status::Finished, format!("wrote {}", output.display()));
    }
    Ok(())
}
