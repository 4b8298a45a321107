//! List command implementation

use anyhow::Result;

use super::display;
use crate::store::PromptStore;

pub fn run(store: &PromptStore) -> Result<()> {
    let prompts = store.list_prompts()?;
    println!("{}", display::render_prompt_list(&prompts));
    println!();
    Ok(())
}
