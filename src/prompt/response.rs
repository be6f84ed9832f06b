//! Commit message extraction from model replies.

use std::sync::LazyLock;

use regex::Regex;

static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```[a-zA-Z0-9_ ]*$").expect("valid regex"));

/// Lines a model puts before the actual message
static PREAMBLE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)^here\s+(is|are)\s+(the\s+)?(commit\s+)?message",
        r"(?i)^(the\s+)?commit\s+message\s*(is|:)",
        r"(?i)^i('ve|'ll| have| will| would)",
        r"(?i)^(sure|okay|certainly|of course)[,!.]?\s*",
        r"(?i)^based on (the |your )?",
        r"(?i)^(let me|allow me)",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Remove a code fence wrapping the whole text, if there is one
pub fn strip_markdown_code_blocks(text: &str) -> String {
    let trimmed = text.trim();
    let lines: Vec<&str> = trimmed.split('\n').collect();
    if lines.len() >= 2
        && lines[0].starts_with("```")
        && lines.last().is_some_and(|last| last.trim_end() == "```")
    {
        return lines[1..lines.len() - 1].join("\n").trim().to_string();
    }
    text.to_string()
}

/// Pull the commit message out of a model reply.
///
/// The first non-empty fenced block wins. Without one, leading preamble
/// lines ("Here is the commit message:", "Sure!") are skipped and the rest
/// is returned. `None` when nothing usable remains.
pub fn extract_commit_message(reply: &str) -> Option<String> {
    let reply = reply.trim();
    if reply.is_empty() {
        return None;
    }

    if let Some(block) = first_fenced_block(reply) {
        return Some(block);
    }

    let mut collected: Vec<&str> = Vec::new();
    for line in reply.lines() {
        let stripped = line.trim();
        if collected.is_empty()
            && (stripped.is_empty() || stripped.ends_with(':') || is_preamble(stripped))
        {
            continue;
        }
        collected.push(line);
    }

    let message = collected.join("\n").trim().to_string();
    (!message.is_empty()).then_some(message)
}

fn first_fenced_block(reply: &str) -> Option<String> {
    let mut block: Option<Vec<&str>> = None;

    for line in reply.lines() {
        if FENCE.is_match(line.trim()) {
            match block.take() {
                None => block = Some(Vec::new()),
                Some(lines) => {
                    let content = lines.join("\n").trim().to_string();
                    if !content.is_empty() {
                        return Some(content);
                    }
                }
            }
        } else if let Some(lines) = block.as_mut() {
            lines.push(line);
        }
    }
    None
}

fn is_preamble(line: &str) -> bool {
    PREAMBLE.iter().any(|re| re.is_match(line))
}
