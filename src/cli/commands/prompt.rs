//! Prompt Command
//!
//! Print a commit-message prompt: instructions, branch and ticket context,
//! and the staged diff reduced to fit.

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, SourceArgs};
use crate::diff::compress_if_needed;
use crate::prompt::{GitContext, build_commit_prompt, commit_template};
use crate::types::Result;

pub fn run(
    ctx: &CommandContext,
    source: &SourceArgs,
    branch: Option<String>,
    template: bool,
) -> Result<()> {
    let loaded = ctx.load_diff(&source.resolve()?)?;
    let branch = match branch {
        Some(branch) => branch,
        None => ctx.current_branch(&loaded)?,
    };
    let context = GitContext::from_branch(branch, &ctx.config.prompt.ticket_prefix);

    if template {
        print!("{}", commit_template(&context));
        return Ok(());
    }

    let result = compress_if_needed(loaded.provider.as_ref(), &loaded.original, &ctx.strategy);
    print!("{}", build_commit_prompt(&context, &result));

    let out = Output::diagnostics();
    if result.is_compressed() {
        out.info(&format!(
            "Diff reduced with {} strategy ({} -> {} bytes)",
            result.metadata.strategy,
            result.metadata.original_size,
            result.metadata.compressed_size
        ));
    }
    Ok(())
}
