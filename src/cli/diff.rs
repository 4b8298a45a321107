//! Diff command implementation

use anyhow::Result;
use tracing::debug;

use super::display;
use crate::store::PromptStore;

pub fn run(
    store: &PromptStore,
    prompt_name: &str,
    old_ref: &str,
    new_ref: &str,
    context: usize,
) -> Result<()> {
    let comparison = store.compare(prompt_name, old_ref, new_ref)?;
    debug!(
        old = %comparison.old.hash,
        new = %comparison.new.hash,
        inserted = comparison.script.stats.inserted,
        deleted = comparison.script.stats.deleted,
        "diff computed"
    );

    println!("{}", display::render_diff(&comparison, context));
    println!();
    Ok(())
}
