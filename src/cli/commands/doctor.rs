//! Doctor Command
//!
//! Check the environment diffpack depends on and report the effective setup.

use crate::cli::ui::Output;
use crate::cli::util::CommandContext;
use crate::config::ConfigLoader;
use crate::diff::DiffTarget;
use crate::types::Result;

pub fn run(ctx: &CommandContext) -> Result<()> {
    let out = Output::new();
    out.header("diffpack doctor");

    out.section("Git");
    let git = ctx.git(DiffTarget::Staged);
    let mut healthy = true;
    match git.version() {
        Ok(version) => out.success(version.trim()),
        Err(e) if e.is_tool_unavailable() => {
            healthy = false;
            out.error(&format!("'{}' not found", ctx.config.git.binary));
        }
        Err(e) => {
            healthy = false;
            out.error(&format!("'{}' is not usable: {}", ctx.config.git.binary, e));
        }
    }

    if git.is_inside_work_tree() {
        out.success("Inside a git work tree");
        match git.current_branch() {
            Ok(Some(branch)) => out.field("Branch", branch),
            Ok(None) => out.warning("Detached HEAD; prompts need --branch"),
            Err(e) => out.warning(&format!("Could not read branch: {}", e)),
        }
    } else {
        out.warning("Not inside a git work tree; use --stdin or --diff-file");
    }

    out.section("Configuration");
    match ConfigLoader::global_config_path() {
        Some(path) => out.field("Global", describe(&path)),
        None => out.field("Global", "(not available)"),
    }
    out.field("Project", describe(&ConfigLoader::project_config_path()));
    for (key, value) in ConfigLoader::env_overrides() {
        out.field(&key, value);
    }

    out.section("Compression");
    let strategy = &ctx.strategy;
    out.field("Enabled", strategy.enabled);
    out.field("Strategy", strategy.strategy);
    out.field(
        "Thresholds",
        format!(
            "{} bytes or {} files",
            strategy.size_threshold_bytes, strategy.files_threshold
        ),
    );
    out.field("Priority files", strategy.max_priority_files);
    out.field("Character limit", strategy.token_limit);
    out.field("Ticket prefix", &ctx.config.prompt.ticket_prefix);

    println!();
    if healthy {
        out.success("Ready");
    } else {
        out.warning("Git is unavailable; only --stdin and --diff-file will work");
    }
    Ok(())
}

fn describe(path: &std::path::Path) -> String {
    let mark = if path.exists() { "found" } else { "missing" };
    format!("{} ({})", path.display(), mark)
}
