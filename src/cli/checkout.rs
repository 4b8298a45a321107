//! Checkout command implementation

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use super::display;
use crate::config::Config;
use crate::store::PromptStore;

/// Write the referenced version to `output`, or to the configured default
/// target for the prompt. Returns the path written.
pub fn run(
    store: &PromptStore,
    config: &Config,
    prompt_name: &str,
    reference: &str,
    output: Option<&Path>,
) -> Result<PathBuf> {
    let commit = store.resolve(prompt_name, reference)?;
    let target = match output {
        Some(path) => path.to_path_buf(),
        None => config.checkout_path(prompt_name)?,
    };

    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    std::fs::write(&target, &commit.content)
        .with_context(|| format!("writing {}", target.display()))?;
    info!(hash = %commit.hash, path = %target.display(), "checked out");

    println!("{}", display::checkout_success(&commit, &target));
    Ok(target)
}
