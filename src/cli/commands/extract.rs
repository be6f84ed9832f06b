//! Extract Command
//!
//! Read a model reply and print the commit message inside it. When nothing
//! usable is found the fallback template is printed instead.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use crate::cli::ui::Output;
use crate::cli::util::CommandContext;
use crate::prompt::{GitContext, commit_template, extract_commit_message};
use crate::types::Result;

pub fn run(ctx: &CommandContext, input: Option<&Path>, branch: Option<String>) -> Result<()> {
    let reply = match input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut reply = String::new();
            io::stdin().read_to_string(&mut reply)?;
            reply
        }
    };

    match extract_commit_message(&reply) {
        Some(message) => println!("{}", message),
        None => {
            Output::diagnostics().warning("No commit message found in reply, printing template");
            let branch = branch.unwrap_or_else(|| "unknown".to_string());
            let context = GitContext::from_branch(branch, &ctx.config.prompt.ticket_prefix);
            print!("{}", commit_template(&context));
        }
    }
    Ok(())
}
