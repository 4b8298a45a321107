//! Snapshot storage with SQLite
//!
//! Every commit is a full, immutable copy of a prompt's content. Commits are
//! grouped by prompt name and ordered by `(created_at, id)`; the newest one
//! is the prompt's latest version. Hash lookups are always scoped to a
//! prompt name, since identical content under two names shares a hash.

mod schema;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

use crate::diff::{self, EditScript};
use crate::error::{StoreError, StoreResult};
use crate::hash;

pub use schema::SCHEMA;

/// Model recorded when a commit does not name one
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Shortest accepted hash reference
pub const MIN_REF_LEN: usize = 4;

const HISTORY_PAGE_SIZE: usize = 64;

const COMMIT_COLUMNS: &str = "id, prompt_name, hash, content, message, model, tags, created_at";

pub struct PromptStore {
    conn: Connection,
}

impl PromptStore {
    pub fn open(path: &Path) -> StoreResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(10))?;
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| {
            row.get::<_, String>(0)
        })?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ============================================
    // WRITES
    // ============================================

    /// Append a new snapshot to `prompt_name`.
    ///
    /// Identical content is still recorded as a new commit: re-committing an
    /// earlier wording is an event of its own, with its own message and time.
    pub fn create_commit(
        &self,
        prompt_name: &str,
        content: &str,
        message: &str,
        model: Option<&str>,
        tags: &[String],
    ) -> StoreResult<Commit> {
        require_non_empty("prompt name", prompt_name)?;
        require_non_empty("commit message", message)?;
        let model = match model {
            None => DEFAULT_MODEL,
            Some(m) => {
                require_non_empty("model", m)?;
                m
            }
        };
        let tags = normalize_tags(tags)?;
        let hash = hash::digest(content);

        let tx = self.conn.unchecked_transaction()?;

        // Keep the per-prompt sequence non-decreasing even if the clock steps back
        let previous: Option<String> = tx
            .query_row(
                "SELECT created_at FROM commits WHERE prompt_name = ?1
                 ORDER BY created_at DESC, id DESC LIMIT 1",
                params![prompt_name],
                |row| row.get(0),
            )
            .optional()?;
        let mut created_at = Utc::now().trunc_subsecs(6);
        if let Some(previous) = previous {
            created_at = created_at.max(parse_timestamp(&previous)?);
        }

        let id: i64 = tx.query_row(
            r#"INSERT INTO commits
               (prompt_name, hash, content, message, model, tags, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
               RETURNING id"#,
            params![
                prompt_name,
                hash,
                content,
                message,
                model,
                encode_tags(&tags)?,
                format_timestamp(&created_at),
            ],
            |row| row.get(0),
        )?;
        tx.commit()?;

        Ok(Commit {
            id,
            prompt_name: prompt_name.to_string(),
            hash,
            content: content.to_string(),
            message: message.to_string(),
            model: model.to_string(),
            tags,
            created_at,
        })
    }

    /// Attach `label` to the referenced commit. Adding a label the commit
    /// already carries changes nothing.
    pub fn add_tag(&self, prompt_name: &str, reference: &str, label: &str) -> StoreResult<Commit> {
        let label = normalize_label(label)?;

        let tx = self.conn.unchecked_transaction()?;
        let mut commit = self.resolve(prompt_name, reference)?;
        if commit.has_tag(label) {
            return Ok(commit);
        }

        commit.tags.push(label.to_string());
        tx.execute(
            "UPDATE commits SET tags = ?1 WHERE id = ?2",
            params![encode_tags(&commit.tags)?, commit.id],
        )?;
        tx.commit()?;

        Ok(commit)
    }

    // ============================================
    // LOOKUPS
    // ============================================

    /// Resolve a full hash or an unambiguous hash prefix within `prompt_name`.
    ///
    /// Several commits with the same full hash (re-committed content) are not
    /// ambiguous; the newest of them is returned.
    pub fn resolve(&self, prompt_name: &str, reference: &str) -> StoreResult<Commit> {
        require_non_empty("prompt name", prompt_name)?;
        let prefix = normalize_reference(reference)?;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COMMIT_COLUMNS} FROM commits
             WHERE prompt_name = ?1 AND substr(hash, 1, length(?2)) = ?2
             ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt
            .query_map(params![prompt_name, prefix], CommitRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut candidates: Vec<String> = rows.iter().map(|r| r.hash.clone()).collect();
        candidates.sort();
        candidates.dedup();

        if candidates.len() > 1 {
            return Err(StoreError::AmbiguousReference {
                reference: reference.to_string(),
                count: candidates.len(),
                candidates: candidates
                    .iter()
                    .map(|h| hash::short(h).to_string())
                    .collect(),
            });
        }

        match rows.into_iter().next() {
            Some(row) => row.try_into(),
            None => Err(StoreError::not_found(format!(
                "no commit matching '{}' for prompt '{}'",
                reference, prompt_name
            ))),
        }
    }

    /// Most recent commit of `prompt_name`.
    pub fn latest(&self, prompt_name: &str) -> StoreResult<Commit> {
        require_non_empty("prompt name", prompt_name)?;

        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {COMMIT_COLUMNS} FROM commits WHERE prompt_name = ?1
                     ORDER BY created_at DESC, id DESC LIMIT 1"
                ),
                params![prompt_name],
                CommitRow::from_row,
            )
            .optional()?;

        match row {
            Some(row) => row.try_into(),
            None => Err(StoreError::not_found(format!(
                "prompt '{}' has no commits",
                prompt_name
            ))),
        }
    }

    /// Commits of `prompt_name`, newest first, fetched lazily page by page.
    /// An unknown prompt yields an empty history.
    pub fn history(&self, prompt_name: &str) -> StoreResult<History<'_>> {
        require_non_empty("prompt name", prompt_name)?;
        Ok(History {
            store: self,
            prompt_name: prompt_name.to_string(),
            page_size: HISTORY_PAGE_SIZE,
            buffer: VecDeque::new(),
            cursor: None,
            exhausted: false,
        })
    }

    fn history_page(
        &self,
        prompt_name: &str,
        cursor: Option<&(String, i64)>,
        limit: usize,
    ) -> StoreResult<Vec<CommitRow>> {
        let limit = limit as i64;
        let rows = match cursor {
            Some((created_at, id)) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {COMMIT_COLUMNS} FROM commits
                     WHERE prompt_name = ?1
                       AND (created_at < ?2 OR (created_at = ?2 AND id < ?3))
                     ORDER BY created_at DESC, id DESC LIMIT ?4"
                ))?;
                let rows = stmt
                    .query_map(
                        params![prompt_name, created_at, id, limit],
                        CommitRow::from_row,
                    )?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {COMMIT_COLUMNS} FROM commits WHERE prompt_name = ?1
                     ORDER BY created_at DESC, id DESC LIMIT ?2"
                ))?;
                let rows = stmt
                    .query_map(params![prompt_name, limit], CommitRow::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(rows)
    }

    /// Number of commits recorded for `prompt_name`.
    pub fn count_commits(&self, prompt_name: &str) -> StoreResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM commits WHERE prompt_name = ?1",
            params![prompt_name],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Every prompt with at least one commit, ordered by name.
    pub fn list_prompts(&self) -> StoreResult<Vec<PromptSummary>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT c.prompt_name, COUNT(*),
                      (SELECT l.hash FROM commits l
                        WHERE l.prompt_name = c.prompt_name
                        ORDER BY l.created_at DESC, l.id DESC LIMIT 1)
               FROM commits c
               GROUP BY c.prompt_name
               ORDER BY c.prompt_name"#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(PromptSummary {
                name: row.get(0)?,
                commit_count: row.get::<_, i64>(1)? as usize,
                latest_hash: row.get(2)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Resolve two references of `prompt_name` and diff their contents.
    pub fn compare(&self, prompt_name: &str, old_ref: &str, new_ref: &str) -> StoreResult<Comparison> {
        let old = self.resolve(prompt_name, old_ref)?;
        let new = self.resolve(prompt_name, new_ref)?;
        let script = diff::diff(&old.content, &new.content);
        Ok(Comparison { old, new, script })
    }
}

// ============================================
// HISTORY
// ============================================

/// Lazy newest-first walk over a prompt's commits.
///
/// Pages are fetched with a keyset cursor on `(created_at, id)`, so stopping
/// early never loads the rest of the history.
pub struct History<'a> {
    store: &'a PromptStore,
    prompt_name: String,
    page_size: usize,
    buffer: VecDeque<Commit>,
    cursor: Option<(String, i64)>,
    exhausted: bool,
}

impl History<'_> {
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn fill(&mut self) -> StoreResult<()> {
        let rows =
            self.store
                .history_page(&self.prompt_name, self.cursor.as_ref(), self.page_size)?;
        if rows.len() < self.page_size {
            self.exhausted = true;
        }
        if let Some(last) = rows.last() {
            self.cursor = Some((last.created_at.clone(), last.id));
        }
        for row in rows {
            self.buffer.push_back(row.try_into()?);
        }
        Ok(())
    }
}

impl Iterator for History<'_> {
    type Item = StoreResult<Commit>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.fill() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}

// ============================================
// VALIDATION & ENCODING
// ============================================

fn require_non_empty(field: &str, value: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::validation(format!("{} cannot be empty", field)));
    }
    Ok(())
}

fn normalize_label(label: &str) -> StoreResult<&str> {
    let label = label.trim();
    if label.is_empty() {
        return Err(StoreError::validation("tag label cannot be empty"));
    }
    Ok(label)
}

fn normalize_tags(tags: &[String]) -> StoreResult<Vec<String>> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let label = normalize_label(tag)?;
        if !out.iter().any(|t| t == label) {
            out.push(label.to_string());
        }
    }
    Ok(out)
}

fn normalize_reference(reference: &str) -> StoreResult<String> {
    let reference = reference.trim();
    if reference.len() < MIN_REF_LEN {
        return Err(StoreError::validation(format!(
            "hash reference '{}' must be at least {} characters",
            reference, MIN_REF_LEN
        )));
    }
    if reference.len() > hash::DIGEST_LEN {
        return Err(StoreError::validation(format!(
            "hash reference '{}' is longer than a full hash ({} characters)",
            reference,
            hash::DIGEST_LEN
        )));
    }
    if !reference.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(StoreError::validation(format!(
            "hash reference '{}' must contain only hex characters",
            reference
        )));
    }
    Ok(reference.to_ascii_lowercase())
}

fn encode_tags(tags: &[String]) -> StoreResult<String> {
    serde_json::to_string(tags).map_err(|e| StoreError::Corrupt(format!("tags: {}", e)))
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("created_at '{}': {}", raw, e)))
}

// ============================================
// ROW TYPES
// ============================================

/// An immutable prompt snapshot plus its metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    pub id: i64,
    pub prompt_name: String,
    pub hash: String,
    pub content: String,
    pub message: String,
    pub model: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Commit {
    pub fn short_hash(&self) -> &str {
        hash::short(&self.hash)
    }

    pub fn has_tag(&self, label: &str) -> bool {
        self.tags.iter().any(|t| t == label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptSummary {
    pub name: String,
    pub commit_count: usize,
    pub latest_hash: String,
}

/// Two resolved commits and the edit script between them
#[derive(Debug, Clone)]
pub struct Comparison {
    pub old: Commit,
    pub new: Commit,
    pub script: EditScript,
}

/// Raw `commits` row before tags and timestamp are decoded
#[derive(Debug)]
struct CommitRow {
    id: i64,
    prompt_name: String,
    hash: String,
    content: String,
    message: String,
    model: Option<String>,
    tags: Option<String>,
    created_at: String,
}

impl CommitRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            prompt_name: row.get(1)?,
            hash: row.get(2)?,
            content: row.get(3)?,
            message: row.get(4)?,
            model: row.get(5)?,
            tags: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}

impl TryFrom<CommitRow> for Commit {
    type Error = StoreError;

    fn try_from(row: CommitRow) -> StoreResult<Self> {
        let tags = match row.tags.as_deref() {
            None | Some("") => Vec::new(),
            Some(raw) => serde_json::from_str(raw)
                .map_err(|e| StoreError::Corrupt(format!("tags of commit {}: {}", row.id, e)))?,
        };

        Ok(Commit {
            id: row.id,
            created_at: parse_timestamp(&row.created_at)?,
            prompt_name: row.prompt_name,
            hash: row.hash,
            content: row.content,
            message: row.message,
            model: row.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            tags,
        })
    }
}
