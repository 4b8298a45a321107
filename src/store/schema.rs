//! SQLite schema definition
//!
//! One relation holds every commit. A prompt has no row of its own: it
//! exists exactly while it has at least one commit.

pub const SCHEMA: &str = r#"
-- ============================================
-- COMMITS
-- ============================================

-- Immutable full snapshots, grouped by prompt name.
-- Only `tags` is ever updated, and only by appending labels.
CREATE TABLE IF NOT EXISTS commits (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    prompt_name TEXT NOT NULL,
    hash        TEXT NOT NULL,             -- sha256 hex of content
    content     TEXT NOT NULL,
    message     TEXT NOT NULL,
    model       TEXT,
    tags        TEXT NOT NULL DEFAULT '[]', -- JSON array of labels
    created_at  TEXT NOT NULL              -- RFC 3339 UTC, fixed width
);

-- ============================================
-- INDEXES
-- ============================================

CREATE INDEX IF NOT EXISTS idx_commits_prompt_order
    ON commits(prompt_name, created_at DESC, id DESC);
CREATE INDEX IF NOT EXISTS idx_commits_prompt_hash
    ON commits(prompt_name, hash);
"#;
