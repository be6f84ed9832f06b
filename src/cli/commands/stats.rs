//! Stats Command
//!
//! Show size metrics, change statistics and whether compression would run.

use tracing::warn;

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, SourceArgs};
use crate::diff::{ChangeStatistics, measure, should_compress};
use crate::types::Result;

pub fn run(ctx: &CommandContext, source: &SourceArgs, format: &str) -> Result<()> {
    let loaded = ctx.load_diff(&source.resolve()?)?;
    let provider = loaded.provider.as_ref();

    let metrics = measure(&loaded.original, Some(provider));
    let statistics = match provider.shortstat() {
        Ok(summary) => ChangeStatistics::parse(&summary),
        Err(e) => {
            warn!("Could not read change statistics: {}", e);
            ChangeStatistics::default()
        }
    };
    let config = &ctx.strategy;
    let would_compress = config.enabled && should_compress(&metrics, config);

    if format == "json" {
        let report = serde_json::json!({
            "metrics": metrics,
            "statistics": statistics,
            "thresholds": {
                "size_bytes": config.size_threshold_bytes,
                "files": config.files_threshold,
            },
            "enabled": config.enabled,
            "would_compress": would_compress,
            "strategy": config.strategy.as_str(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let out = Output::new();
    out.section("Diff Size");
    out.field("Bytes", metrics.bytes);
    out.field("Characters", metrics.chars);
    out.field("Lines", metrics.lines);
    out.field("Files", metrics.files);

    out.section("Changes");
    out.field("Files changed", statistics.files_changed);
    out.field("Insertions", statistics.insertions);
    out.field("Deletions", statistics.deletions);

    out.section("Compression");
    out.field(
        "Thresholds",
        format!(
            "{} bytes or {} files",
            config.size_threshold_bytes, config.files_threshold
        ),
    );
    out.field("Strategy", config.strategy);
    println!();
    if !config.enabled {
        out.info("Compression is disabled");
    } else if would_compress {
        out.warning("Diff exceeds a threshold and would be compressed");
    } else {
        out.success("Diff is within thresholds");
    }
    Ok(())
}
