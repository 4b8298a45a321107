//! Tag command implementation

use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};

use super::display;
use crate::store::PromptStore;

pub fn run(
    store: &PromptStore,
    prompt_name: &str,
    reference: &str,
    label: Option<&str>,
) -> Result<()> {
    let label = match label {
        Some(label) => label.to_string(),
        None => prompt_label(&mut io::stdin().lock(), &mut io::stdout())?,
    };

    let commit = store.add_tag(prompt_name, reference, &label)?;
    println!("{}", display::tag_success(label.trim(), &commit));
    Ok(())
}

/// Ask for a label interactively.
fn prompt_label(input: &mut impl BufRead, output: &mut impl Write) -> Result<String> {
    write!(output, "Tag label: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line).context("reading tag label")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
