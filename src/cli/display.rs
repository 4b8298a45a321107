//! Terminal rendering for commits, diffs and listings
//!
//! Everything here returns strings; the command modules decide where they
//! are printed. Colour: yellow hashes, green insertions, red deletions, cyan
//! metadata keys, magenta tags, dimmed context.

use chrono::{DateTime, Utc};
use colored::Colorize;
use std::path::Path;

use crate::diff::{DiffStats, LineChange};
use crate::store::{Commit, Comparison, PromptSummary};

const PREVIEW_LIMIT: usize = 400;
const RULE_WIDTH: usize = 50;

pub fn format_date(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d  %H:%M UTC").to_string()
}

fn key(label: &str) -> String {
    label.cyan().to_string()
}

fn tag_list(tags: &[String]) -> String {
    tags.iter()
        .map(|t| t.magenta().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn rule() -> String {
    "─".repeat(RULE_WIDTH)
}

/// git-log style listing, newest first.
pub fn render_log(commits: &[Commit]) -> String {
    let mut lines = Vec::new();

    for (i, commit) in commits.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.push(format!("commit {}", commit.hash).yellow().to_string());
        lines.push(format!("{} {}", key("Model:  "), commit.model));
        lines.push(format!("{} {}", key("Date:   "), format_date(&commit.created_at)));
        if !commit.tags.is_empty() {
            lines.push(format!("{} {}", key("Tags:   "), tag_list(&commit.tags)));
        }
        lines.push(String::new());
        lines.push(format!("    {}", commit.message));
    }

    lines.join("\n")
}

/// Unified-style diff showing `context` unchanged lines around each change.
pub fn render_diff(comparison: &Comparison, context: usize) -> String {
    let script = &comparison.script;
    let mut lines = vec![
        format!(
            "--- {}  ({})",
            comparison.old.short_hash(),
            comparison.old.message
        )
        .dimmed()
        .to_string(),
        format!(
            "+++ {}  ({})",
            comparison.new.short_hash(),
            comparison.new.message
        )
        .dimmed()
        .to_string(),
        String::new(),
    ];

    if script.is_identical() {
        lines.push("  Versions are identical.".dimmed().to_string());
        return lines.join("\n");
    }

    for (n, hunk) in script.hunks(context).into_iter().enumerate() {
        if n > 0 {
            lines.push("  ···".dimmed().to_string());
        }
        for line in &script.lines[hunk] {
            lines.push(match line.change {
                LineChange::Inserted => format!("+ {}", line.text).green().to_string(),
                LineChange::Deleted => format!("- {}", line.text).red().to_string(),
                LineChange::Unchanged => format!("  {}", line.text).dimmed().to_string(),
            });
        }
    }

    lines.push(String::new());
    lines.push(render_stats(&script.stats));
    lines.join("\n")
}

fn render_stats(stats: &DiffStats) -> String {
    format!(
        "{}{}{}",
        format!("  +{}", stats.inserted).green(),
        format!("  -{}", stats.deleted).red(),
        format!("  {} unchanged", stats.unchanged).dimmed()
    )
}

/// Latest commit of a prompt with a content preview.
pub fn render_status(commit: &Commit) -> String {
    let mut lines = vec![
        format!("{} {}", key("Prompt: "), commit.prompt_name.bold()),
        format!(
            "{} {}  -  {}",
            key("Latest: "),
            commit.short_hash().yellow(),
            commit.message
        ),
        format!("{} {}", key("Model:  "), commit.model),
        format!("{} {}", key("Date:   "), format_date(&commit.created_at)),
    ];
    if !commit.tags.is_empty() {
        lines.push(format!("{} {}", key("Tags:   "), tag_list(&commit.tags)));
    }

    lines.push(String::new());
    lines.push("Content preview:".bold().to_string());
    lines.push(rule());

    let mut preview: String = commit.content.chars().take(PREVIEW_LIMIT).collect();
    if commit.content.chars().nth(PREVIEW_LIMIT).is_some() {
        preview.push_str(&"\n  … (truncated)".dimmed().to_string());
    }
    lines.push(preview);
    lines.push(rule());

    lines.join("\n")
}

/// `ls` table: name, version count, short latest hash.
pub fn render_prompt_list(prompts: &[PromptSummary]) -> String {
    if prompts.is_empty() {
        return "  No prompts tracked yet. Use 'promptvc commit' to start."
            .dimmed()
            .to_string();
    }

    let name_width = prompts.iter().map(|p| p.name.chars().count()).max().unwrap_or(0) + 2;
    let mut lines = vec!["Tracked prompts:".bold().to_string(), String::new()];

    for prompt in prompts {
        let unit = if prompt.commit_count == 1 {
            "version"
        } else {
            "versions"
        };
        lines.push(format!(
            "  • {}  {}  {}",
            format!("{:<width$}", prompt.name, width = name_width).bold(),
            format!("({} {})", prompt.commit_count, unit).dimmed(),
            format!("[{}]", crate::hash::short(&prompt.latest_hash)).yellow()
        ));
    }

    lines.join("\n")
}

pub fn commit_success(commit: &Commit) -> String {
    format!(
        "{}Committed [{}] {}",
        "✓ ".green(),
        commit.short_hash().yellow(),
        commit.message
    )
}

pub fn checkout_success(commit: &Commit, path: &Path) -> String {
    format!(
        "{}Checked out [{}] → {}",
        "✓ ".green(),
        commit.short_hash().yellow(),
        path.display().to_string().underline()
    )
}

pub fn tag_success(label: &str, commit: &Commit) -> String {
    format!(
        "{}Tagged [{}] as {}",
        "✓ ".green(),
        commit.short_hash().yellow(),
        format!("'{}'", label).magenta()
    )
}

pub fn error_line(message: &str) -> String {
    format!("{}{}", "✗ Error: ".red().bold(), message)
}
