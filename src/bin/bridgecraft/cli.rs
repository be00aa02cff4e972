//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use bridgecraft::util::ColorChoice;

/// Bridgecraft - generate the Swift interface of an Objective-C bridging header
#[derive(Parser)]
#[command(name = "bridgecraft")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring of status output: auto, always or never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    /// Disable colored output (same as --color never)
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn color(&self) -> ColorChoice {
        if self.no_color {
            ColorChoice::Never
        } else {
            self.color
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the Swift interface of a target's bridging header
    Generate(GenerateArgs),

    /// Add a source file to a target of a project
    Patch(PatchArgs),
}

impl Commands {
    /// Process exit code when the command fails.
    pub fn failure_code(&self) -> i32 {
        match self {
            Commands::Generate(_) => 2,
            Commands::Patch(_) => 1,
        }
    }
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Path to the .xcodeproj bundle
    pub project: PathBuf,

    /// Name of the target whose bridging header is used
    pub target: String,

    /// Assume the headers are audited for nullability
    #[arg(long)]
    pub assume_nonnull: bool,

    /// SDK for the dry-run build (see `xcodebuild -sdk`)
    #[arg(long)]
    pub sdk: Option<String>,

    /// Destination for the dry-run build (see `xcodebuild -destination`)
    #[arg(long)]
    pub destination: Option<String>,

    /// Write the interface to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Build tool to use
    #[arg(long, env = "BRIDGECRAFT_XCODEBUILD")]
    pub xcodebuild: Option<PathBuf>,

    /// Preprocessor to use
    #[arg(long, env = "BRIDGECRAFT_CLANG")]
    pub clang: Option<PathBuf>,

    /// sourcekitten executable to use
    #[arg(long, env = "BRIDGECRAFT_SOURCEKITTEN")]
    pub sourcekitten: Option<PathBuf>,

    /// Extra arguments passed to the dry-run build
    #[arg(last = true)]
    pub extra: Vec<String>,
}

#[derive(Args)]
pub struct PatchArgs {
    /// Path to the .xcodeproj bundle
    pub project: PathBuf,

    /// Name of the target to add the file to
    pub target: String,

    /// Source file to add
    pub source: PathBuf,

    /// Write the patched project here instead of modifying it in place
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
