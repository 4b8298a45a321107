//! Log command implementation

use anyhow::Result;
use colored::Colorize;

use super::display;
use crate::store::{Commit, PromptStore};

pub fn run(store: &PromptStore, prompt_name: &str, limit: usize, json: bool) -> Result<()> {
    let shown = store
        .history(prompt_name)?
        .take(limit)
        .collect::<Result<Vec<Commit>, _>>()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    if shown.is_empty() {
        println!(
            "{}",
            format!("  No history found for '{}'.", prompt_name).dimmed()
        );
        return Ok(());
    }

    println!("{}", display::render_log(&shown));
    println!();

    let omitted = store.count_commits(prompt_name)?.saturating_sub(shown.len());
    if omitted > 0 {
        println!(
            "{}",
            format!(
                "  … {} older commit(s) not shown. Use -n to see more.",
                omitted
            )
            .dimmed()
        );
    }

    Ok(())
}
