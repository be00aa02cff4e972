//! `bridgecraft patch` command

use anyhow::Result;

use crate::cli::PatchArgs;
use bridgecraft::ops::patch::{patch, PatchOptions};
use bridgecraft::util::{Shell, Status};

pub fn execute(args: PatchArgs, shell: &Shell) -> Result<()> {
    let opts = PatchOptions {
        project: args.project,
        target: args.target,
        source_file: args.source,
        output: args.output,
    };

    let result = patch(&opts)?;

    shell.status(
        Status::Added,
        format!(
            "{} to target `{}` of {}",
            result.file.path,
            opts.target,
            result.project.display()
        ),
    );

    Ok(())
}
