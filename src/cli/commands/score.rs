//! Score Command
//!
//! Show the priority score the smart strategy would give each path.

use std::fs;

use console::style;
use tracing::debug;

use crate::constants::smart::CONTENT_SAMPLE_CHARS;
use crate::diff::{ScoreBreakdown, explain};
use crate::types::{Result, truncate_chars};

/// Score `paths`; with `read_content`, each file on disk supplies the content
/// sample used for generated-file detection.
pub fn run(paths: &[String], read_content: bool, format: &str) -> Result<()> {
    let breakdowns: Vec<ScoreBreakdown> = paths
        .iter()
        .map(|path| {
            let sample = if read_content {
                match fs::read_to_string(path) {
                    Ok(content) => Some(content),
                    Err(e) => {
                        debug!("Cannot read {}: {}", path, e);
                        None
                    }
                }
            } else {
                None
            };
            let sample = sample
                .as_deref()
                .map(|content| truncate_chars(content, CONTENT_SAMPLE_CHARS));
            explain(path, sample)
        })
        .collect();

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&breakdowns)?);
        return Ok(());
    }

    for breakdown in &breakdowns {
        let score = match breakdown.score {
            0 => style(format!("{:>3}", breakdown.score)).red(),
            1..=49 => style(format!("{:>3}", breakdown.score)).yellow(),
            _ => style(format!("{:>3}", breakdown.score)).green(),
        };

        let mut notes = Vec::new();
        if breakdown.excluded {
            notes.push("excluded".to_string());
        } else {
            notes.push(format!("base {}", breakdown.base));
            if let Some(percent) = breakdown.location_percent {
                notes.push(format!("location {}%", percent));
            }
            if breakdown.generated {
                notes.push("generated".to_string());
            }
        }

        println!(
            "{}  {}  {}",
            score,
            breakdown.path,
            style(format!("({})", notes.join(", "))).dim()
        );
    }
    Ok(())
}
