//! Commit command implementation

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

use super::display;
use crate::config::Config;
use crate::store::PromptStore;

pub fn run(
    store: &PromptStore,
    config: &Config,
    prompt_name: &str,
    file: &Path,
    message: &str,
    model: Option<&str>,
    tags: Option<&str>,
) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("reading prompt file {}", file.display()))?;
    let tags = parse_tags(tags.unwrap_or_default());
    let model = model.unwrap_or(&config.defaults.model);

    debug!(
        prompt = prompt_name,
        file = %file.display(),
        bytes = content.len(),
        "committing prompt"
    );
    let commit = store.create_commit(prompt_name, &content, message, Some(model), &tags)?;
    info!(prompt = prompt_name, hash = %commit.hash, "commit created");

    println!("{}", display::commit_success(&commit));
    Ok(())
}

/// Split a comma-separated tag list, dropping blank entries.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}
