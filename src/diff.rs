//! Line-level diff engine
//!
//! Two snapshots are split into lines and compared with a longest common
//! subsequence table. The walk over the table is greedy from the top: equal
//! lines are matched as early as possible, and when dropping an old line or
//! taking a new line are equally good, the old line is dropped first. The
//! result is deterministic for identical inputs and reads naturally: inside
//! a changed block, deletions come before insertions.
//!
//! Lines are split on `\n` only. A trailing newline does not produce an
//! empty final line, and every other character (including `\r` and trailing
//! spaces) is part of the line.

use std::fmt;
use std::ops::Range;

use serde::Serialize;

/// Role of one line in an edit script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineChange {
    Unchanged,
    Deleted,
    Inserted,
}

/// One entry of an edit script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffLine {
    pub change: LineChange,
    pub text: String,
    /// 1-based line number in the old snapshot (absent for insertions)
    pub old_line: Option<usize>,
    /// 1-based line number in the new snapshot (absent for deletions)
    pub new_line: Option<usize>,
}

/// Aggregate counts of an edit script
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub inserted: usize,
    pub deleted: usize,
    pub unchanged: usize,
}

impl DiffStats {
    pub fn is_identical(&self) -> bool {
        self.inserted == 0 && self.deleted == 0
    }

    pub fn total(&self) -> usize {
        self.inserted + self.deleted + self.unchanged
    }
}

impl fmt::Display for DiffStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "+{} lines  -{} lines  {} unchanged",
            self.inserted, self.deleted, self.unchanged
        )
    }
}

/// Ordered edit script turning one snapshot into another
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditScript {
    pub lines: Vec<DiffLine>,
    pub stats: DiffStats,
}

impl EditScript {
    pub fn is_identical(&self) -> bool {
        self.stats.is_identical()
    }

    /// Replay the script against `old`, returning the lines of the new
    /// snapshot. Returns `None` when the script was not computed from `old`.
    pub fn apply<'a>(&'a self, old: &'a str) -> Option<Vec<&'a str>> {
        let mut source = split_lines(old).into_iter();
        let mut out = Vec::with_capacity(self.stats.inserted + self.stats.unchanged);

        for line in &self.lines {
            match line.change {
                LineChange::Unchanged => {
                    let current = source.next()?;
                    if current != line.text {
                        return None;
                    }
                    out.push(current);
                }
                LineChange::Deleted => {
                    if source.next()? != line.text {
                        return None;
                    }
                }
                LineChange::Inserted => out.push(line.text.as_str()),
            }
        }

        if source.next().is_some() {
            return None;
        }
        Some(out)
    }

    /// Index ranges of entries lying within `context` lines of a change.
    /// Overlapping or touching windows are merged into one range.
    pub fn hunks(&self, context: usize) -> Vec<Range<usize>> {
        let mut hunks: Vec<Range<usize>> = Vec::new();

        for (idx, line) in self.lines.iter().enumerate() {
            if line.change == LineChange::Unchanged {
                continue;
            }
            let start = idx.saturating_sub(context);
            let end = (idx + context + 1).min(self.lines.len());
            match hunks.last_mut() {
                Some(last) if start <= last.end => last.end = last.end.max(end),
                _ => hunks.push(start..end),
            }
        }

        hunks
    }
}

/// Split content into lines on `\n`.
pub fn split_lines(content: &str) -> Vec<&str> {
    content.split_terminator('\n').collect()
}

/// Diff two snapshots given as raw text.
pub fn diff(old: &str, new: &str) -> EditScript {
    diff_lines(&split_lines(old), &split_lines(new))
}

/// Diff two snapshots given as line sequences.
pub fn diff_lines(old: &[&str], new: &[&str]) -> EditScript {
    let mut builder = ScriptBuilder::default();

    // A shared prefix is matched line-for-line by the walk anyway, so keep it
    // out of the table.
    let prefix = old.iter().zip(new).take_while(|(a, b)| a == b).count();
    for line in &old[..prefix] {
        builder.unchanged(line);
    }

    let a = &old[prefix..];
    let b = &new[prefix..];
    let table = LcsTable::build(a, b);

    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i] == b[j] {
            builder.unchanged(a[i]);
            i += 1;
            j += 1;
        } else if table.get(i + 1, j) >= table.get(i, j + 1) {
            builder.deleted(a[i]);
            i += 1;
        } else {
            builder.inserted(b[j]);
            j += 1;
        }
    }
    for line in &a[i..] {
        builder.deleted(line);
    }
    for line in &b[j..] {
        builder.inserted(line);
    }

    builder.finish()
}

/// Suffix LCS lengths: `get(i, j)` is the LCS length of `a[i..]` and `b[j..]`.
struct LcsTable {
    cols: usize,
    cells: Vec<u32>,
}

impl LcsTable {
    fn build(a: &[&str], b: &[&str]) -> Self {
        let cols = b.len() + 1;
        let mut cells = vec![0u32; (a.len() + 1) * cols];

        for i in (0..a.len()).rev() {
            for j in (0..b.len()).rev() {
                cells[i * cols + j] = if a[i] == b[j] {
                    cells[(i + 1) * cols + j + 1] + 1
                } else {
                    cells[(i + 1) * cols + j].max(cells[i * cols + j + 1])
                };
            }
        }

        Self { cols, cells }
    }

    fn get(&self, i: usize, j: usize) -> u32 {
        self.cells[i * self.cols + j]
    }
}

#[derive(Default)]
struct ScriptBuilder {
    lines: Vec<DiffLine>,
    stats: DiffStats,
    old_line: usize,
    new_line: usize,
}

impl ScriptBuilder {
    fn unchanged(&mut self, text: &str) {
        self.old_line += 1;
        self.new_line += 1;
        self.stats.unchanged += 1;
        self.push(LineChange::Unchanged, text, Some(self.old_line), Some(self.new_line));
    }

    fn deleted(&mut self, text: &str) {
        self.old_line += 1;
        self.stats.deleted += 1;
        self.push(LineChange::Deleted, text, Some(self.old_line), None);
    }

    fn inserted(&mut self, text: &str) {
        self.new_line += 1;
        self.stats.inserted += 1;
        self.push(LineChange::Inserted, text, None, Some(self.new_line));
    }

    fn push(
        &mut self,
        change: LineChange,
        text: &str,
        old_line: Option<usize>,
        new_line: Option<usize>,
    ) {
        self.lines.push(DiffLine {
            change,
            text: text.to_string(),
            old_line,
            new_line,
        });
    }

    fn finish(self) -> EditScript {
        EditScript {
            lines: self.lines,
            stats: self.stats,
        }
    }
}
