//! `bridgecraft generate` command

use anyhow::Result;

use crate::cli::GenerateArgs;
use bridgecraft::ops::generate::{generate, GenerateOptions, Pipeline};
use bridgecraft::ops::{BuildTool, DryRunOptions, Preprocessor, SourceKitten};
use bridgecraft::util::config::load_default_config;
use bridgecraft::util::process::resolve_tool;
use bridgecraft::util::Shell;

pub fn execute(args: GenerateArgs, shell: &Shell) -> Result<()> {
    // Load configuration (global + project)
    let config = load_default_config();

    // Tools: CLI/env > config > default
    let xcodebuild = resolve_tool(&args.xcodebuild.unwrap_or_else(|| config.tools.xcodebuild()));
    let clang = resolve_tool(&args.clang.unwrap_or_else(|| config.tools.clang()));
    let sourcekitten =
        resolve_tool(&args.sourcekitten.unwrap_or_else(|| config.tools.sourcekitten()));
    tracing::debug!(
        "tools: xcodebuild={} clang={} sourcekitten={}",
        xcodebuild.display(),
        clang.display(),
        sourcekitten.display()
    );

    let opts = GenerateOptions {
        project: args.project,
        target: args.target,
        assume_nonnull: args.assume_nonnull || config.generate.assume_nonnull(),
        umbrella_header: config.generate.umbrella_header(),
        dry_run: DryRunOptions {
            sdk: args.sdk.or(config.build.sdk.clone()),
            destination: args.destination.or(config.build.destination.clone()),
            legacy_build_system: config.build.legacy_build_system(),
            extra_args: args.extra,
        },
        output: args.output,
        seed: None,
    };

    let service = SourceKitten::new(sourcekitten);
    let pipeline = Pipeline::new(
        shell,
        BuildTool::new(xcodebuild),
        Preprocessor::new(clang),
        &service,
    );

    generate(&pipeline, &opts)
}
