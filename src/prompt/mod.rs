//! Commit Prompt Assembly
//!
//! Builds the commit-message prompt around a (possibly reduced) staged diff,
//! and cleans the model's reply back into a commit message.
//!
//! The model call itself is out of scope: the prompt is printed for whatever
//! client the user pipes it into, and `extract` reads the reply back.

mod response;

pub use response::{extract_commit_message, strip_markdown_code_blocks};

use regex::Regex;

use crate::diff::CompressionResult;

/// Instructions placed ahead of the git context
pub const COMMIT_INSTRUCTIONS: &str = "\
## Generate Commit Message

Write a commit message for the staged changes below.

### Format
- Subject line in the imperative mood, at most 72 characters
- Blank line between subject and body
- Body wrapped at 72 characters

### Content
- Explain why the change is needed and why this approach, not what the diff shows
- First paragraph: the problem. Second paragraph: the solution
- No lists of changed files, no URLs, no Co-Authored-By or Signed-off-by lines
- If a ticket is given, end with a `Related: <TICKET>` line

### Output
Return only the commit message.";

/// Extract the ticket number from a branch name such as `IOTIL-1639-fix-login`.
///
/// The prefix must start the branch name and is matched case-insensitively.
pub fn extract_ticket(branch: &str, prefix: &str) -> Option<String> {
    let pattern = format!(r"(?i)^{}-(\d+)", regex::escape(prefix));
    let re = Regex::new(&pattern).ok()?;
    re.captures(branch)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Git context shown to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitContext {
    pub branch: String,
    /// Full ticket id, e.g. `IOTIL-1639`
    pub ticket: Option<String>,
}

impl GitContext {
    /// Derive the ticket id from the branch name
    pub fn from_branch(branch: impl Into<String>, ticket_prefix: &str) -> Self {
        let branch = branch.into();
        let ticket = extract_ticket(&branch, ticket_prefix)
            .map(|number| format!("{}-{}", ticket_prefix, number));
        Self { branch, ticket }
    }
}

/// Assemble the commit prompt.
///
/// A reduced diff is preceded by a note naming the strategy so the model
/// knows some detail was dropped.
pub fn build_commit_prompt(context: &GitContext, diff: &CompressionResult) -> String {
    let mut prompt = String::with_capacity(COMMIT_INSTRUCTIONS.len() + diff.compressed_diff.len() + 256);
    prompt.push_str(COMMIT_INSTRUCTIONS);
    prompt.push_str("\n\n## Git Context\n");
    prompt.push_str(&format!("- Branch: {}\n", context.branch));
    prompt.push_str(&format!(
        "- Ticket: {}\n",
        context.ticket.as_deref().unwrap_or("none")
    ));

    prompt.push_str("\n## Staged Changes Diff\n");
    if diff.is_compressed() {
        prompt.push_str(&format!(
            "(diff reduced with the {} strategy: {} -> {} bytes)\n",
            diff.metadata.strategy, diff.metadata.original_size, diff.metadata.compressed_size
        ));
    }
    prompt.push_str(&diff.compressed_diff);
    if !prompt.ends_with('\n') {
        prompt.push('\n');
    }
    prompt
}

/// Fallback commit message template, used when no message could be
/// extracted from the model's reply.
pub fn commit_template(context: &GitContext) -> String {
    let related = context
        .ticket
        .as_ref()
        .map(|ticket| format!("\nRelated: {}", ticket))
        .unwrap_or_default();

    format!(
        "<type>(<scope>): <subject>

<body: explain the why, not the what>

Paragraph 1, the problem:
What is broken, missing, or suboptimal? What happens if this isn't fixed?

Paragraph 2, the solution:
Describe the approach at a conceptual level, not the code changes.
{related}

# Lines starting with '#' will be ignored.
# Branch: {branch}
#
# Subject line: imperative mood, at most 72 characters
# Body: wrap at 72 characters
# Types: feat, fix, docs, style, refactor, test, chore
",
        related = related,
        branch = context.branch
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_ticket() {
        assert_eq!(extract_ticket("IOTIL-1639-fix-login", "IOTIL"), Some("1639".into()));
        assert_eq!(extract_ticket("iotil-42", "IOTIL"), Some("42".into()));
        assert_eq!(extract_ticket("feature/IOTIL-42", "IOTIL"), None);
        assert_eq!(extract_ticket("IOTIL-abc", "IOTIL"), None);
        assert_eq!(extract_ticket("PROJ-7-x", "PROJ"), Some("7".into()));
    }

    #[test]
    fn test_prefix_is_literal() {
        assert_eq!(extract_ticket("AxB-1", "A.B"), None);
        assert_eq!(extract_ticket("A.B-1", "A.B"), Some("1".into()));
    }

    #[test]
    fn test_git_context_from_branch() {
        let context = GitContext::from_branch("iotil-12-cleanup", "IOTIL");
        assert_eq!(context.ticket.as_deref(), Some("IOTIL-12"));

        let context = GitContext::from_branch("main", "IOTIL");
        assert_eq!(context.ticket, None);
    }

    #[test]
    fn test_build_commit_prompt_sections() {
        let context = GitContext::from_branch("IOTIL-7-thing", "IOTIL");
        let diff = CompressionResult::passthrough("diff --git a/a b/a\n+x\n");
        let prompt = build_commit_prompt(&context, &diff);

        assert!(prompt.starts_with(COMMIT_INSTRUCTIONS));
        assert!(prompt.contains("## Git Context\n- Branch: IOTIL-7-thing\n- Ticket: IOTIL-7\n"));
        assert!(prompt.contains("## Staged Changes Diff\ndiff --git a/a b/a\n+x\n"));
        assert!(!prompt.contains("diff reduced"));
    }

    #[test]
    fn test_build_commit_prompt_notes_reduction() {
        let context = GitContext::from_branch("main", "IOTIL");
        let mut diff = CompressionResult::passthrough("summary");
        diff.metadata.strategy = "stat".to_string();
        let prompt = build_commit_prompt(&context, &diff);

        assert!(prompt.contains("- Ticket: none\n"));
        assert!(prompt.contains("(diff reduced with the stat strategy"));
        assert!(prompt.ends_with("summary\n"));
    }

    #[test]
    fn test_commit_template() {
        let with_ticket = commit_template(&GitContext::from_branch("IOTIL-9-x", "IOTIL"));
        assert!(with_ticket.contains("\nRelated: IOTIL-9\n"));
        assert!(with_ticket.contains("# Branch: IOTIL-9-x\n"));

        let without = commit_template(&GitContext::from_branch("main", "IOTIL"));
        assert!(!without.contains("Related:"));
    }
}
