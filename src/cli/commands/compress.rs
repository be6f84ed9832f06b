//! Compress Command
//!
//! Print the diff reduced for prompt embedding.
//!
//! Usage:
//!   diffpack compress [--range BASE..HEAD | --stdin | --diff-file FILE]
//!                     [--strategy NAME] [--force] [--format text|json]

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, SourceArgs};
use crate::diff::{CompressionResult, Strategy, apply_strategy, compress_if_needed};
use crate::types::{ParseWithDefault, Result};

pub fn run(
    ctx: &CommandContext,
    source: &SourceArgs,
    strategy: Option<&str>,
    force: bool,
    format: &str,
) -> Result<()> {
    let loaded = ctx.load_diff(&source.resolve()?)?;

    let mut config = ctx.strategy.clone();
    if let Some(name) = strategy {
        config.strategy = Strategy::parse_or_default(name);
    }

    let result = if force {
        apply_strategy(loaded.provider.as_ref(), config.strategy, &loaded.original, &config)
            .or_original(&loaded.original)
    } else {
        compress_if_needed(loaded.provider.as_ref(), &loaded.original, &config)
    };

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print!("{}", result.compressed_diff);
    if !result.compressed_diff.ends_with('\n') {
        println!();
    }
    report(&result);
    Ok(())
}

fn report(result: &CompressionResult) {
    let out = Output::diagnostics();
    let meta = &result.metadata;

    if !result.is_compressed() {
        out.info(&format!(
            "Diff passed through unchanged ({} bytes)",
            meta.original_size
        ));
        return;
    }

    let mut line = format!(
        "{}: {} -> {} bytes",
        meta.strategy, meta.original_size, meta.compressed_size
    );
    if meta.files_included > 0 || meta.files_excluded > 0 {
        line.push_str(&format!(
            " ({} included, {} excluded)",
            meta.files_included, meta.files_excluded
        ));
    }
    if let (Some(chars), Some(limit)) = (meta.char_count, meta.token_limit) {
        line.push_str(&format!(", {} of {} chars", chars, limit));
    }
    out.success(&line);
}
