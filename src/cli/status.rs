//! Status command implementation

use anyhow::Result;
use colored::Colorize;

use super::display;
use crate::error::StoreError;
use crate::store::PromptStore;

pub fn run(store: &PromptStore, prompt_name: &str, json: bool) -> Result<()> {
    let latest = match store.latest(prompt_name) {
        Ok(commit) => commit,
        Err(err @ StoreError::NotFound(_)) => {
            eprintln!(
                "{}",
                format!(
                    "  Tip: promptvc commit {} <file> -m \"initial version\"",
                    prompt_name
                )
                .dimmed()
            );
            return Err(err.into());
        }
        Err(err) => return Err(err.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&latest)?);
        return Ok(());
    }

    println!();
    println!("{}", display::render_status(&latest));
    println!();
    Ok(())
}
