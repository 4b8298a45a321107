use promptvc::config::Config;
use promptvc::{cli, diff, hash, LineChange, PromptStore, StoreError};
use rusqlite::Connection;
use tempfile::TempDir;

fn db_path(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("nested").join("prompts.db")
}

fn open(dir: &TempDir) -> PromptStore {
    PromptStore::open(&db_path(dir)).unwrap()
}

/// Install a trigger through a second connection that aborts every `event`
/// (INSERT or UPDATE) on the commits table.
fn fail_writes(dir: &TempDir, event: &str) {
    let conn = Connection::open(db_path(dir)).unwrap();
    conn.execute_batch(&format!(
        "CREATE TRIGGER fail_{event} BEFORE {event} ON commits \
         BEGIN SELECT RAISE(ABORT, 'disk full'); END;"
    ))
    .unwrap();
}

#[test]
fn commits_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let first = {
        let store = open(&dir);
        store
            .create_commit(
                "summarizer",
                "You are a helpful assistant.\n",
                "initial version",
                Some("claude-3"),
                &["prod".to_string()],
            )
            .unwrap()
    };

    let store = open(&dir);
    let latest = store.latest("summarizer").unwrap();
    assert_eq!(latest, first);
    assert_eq!(latest.model, "claude-3");
    assert_eq!(hash::digest(&latest.content), latest.hash);
}

#[test]
fn two_versions_diff_to_one_delete_one_insert() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let v1 = store
        .create_commit("alpha", "Answer in 3 sentences max.", "v1", None, &[])
        .unwrap();
    let v2 = store
        .create_commit("alpha", "Be direct. Max 2 sentences.", "v2", None, &[])
        .unwrap();

    let cmp = store.compare("alpha", v1.short_hash(), v2.short_hash()).unwrap();
    let stats = cmp.script.stats;
    assert_eq!((stats.deleted, stats.inserted, stats.unchanged), (1, 1, 0));

    let deleted: Vec<_> = cmp
        .script
        .lines
        .iter()
        .filter(|l| l.change == LineChange::Deleted)
        .map(|l| l.text.as_str())
        .collect();
    assert_eq!(deleted, vec!["Answer in 3 sentences max."]);
    assert_eq!(
        cmp.script.apply(&v1.content),
        Some(diff::split_lines(&v2.content))
    );
}

#[test]
fn listing_reports_commit_counts() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    store.create_commit("alpha", "a", "one", None, &[]).unwrap();
    store.create_commit("beta", "b", "one", None, &[]).unwrap();
    store.create_commit("beta", "bb", "two", None, &[]).unwrap();

    let listed: Vec<_> = store
        .list_prompts()
        .unwrap()
        .into_iter()
        .map(|p| (p.name, p.commit_count))
        .collect();
    assert_eq!(listed, vec![("alpha".to_string(), 1), ("beta".to_string(), 2)]);
}

#[test]
fn latest_follows_most_recent_commit_even_for_repeated_content() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let contents = ["draft", "polished", "draft"];
    for (n, content) in contents.iter().enumerate() {
        let created = store
            .create_commit("alpha", content, &format!("step {n}"), None, &[])
            .unwrap();
        assert_eq!(store.latest("alpha").unwrap().id, created.id);
    }
    assert_eq!(store.history("alpha").unwrap().count(), 3);
}

#[test]
fn tagging_twice_keeps_one_label_and_persists() {
    let dir = TempDir::new().unwrap();
    let hash = {
        let store = open(&dir);
        let c = store.create_commit("alpha", "text", "v1", None, &[]).unwrap();
        store.add_tag("alpha", &c.hash, "prod").unwrap();
        store.add_tag("alpha", &c.hash, "prod").unwrap();
        c.hash
    };

    let store = open(&dir);
    assert_eq!(store.resolve("alpha", &hash).unwrap().tags, vec!["prod"]);
}

#[test]
fn rejected_commit_leaves_store_untouched() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    store.create_commit("alpha", "keep", "v1", None, &[]).unwrap();

    let err = store.create_commit("alpha", "lost", "", None, &[]).unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(err.exit_code(), 2);
    assert_eq!(store.count_commits("alpha").unwrap(), 1);
    assert_eq!(store.latest("alpha").unwrap().content, "keep");
}

#[test]
fn failed_insert_rolls_back_and_reports_storage_error() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let kept = store.create_commit("alpha", "keep", "v1", None, &[]).unwrap();
    fail_writes(&dir, "INSERT");

    let err = store
        .create_commit("alpha", "lost", "v2", None, &["prod".to_string()])
        .unwrap_err();
    assert!(matches!(err, StoreError::Storage(_)));
    assert_eq!(err.exit_code(), 5);
    assert_eq!(store.count_commits("alpha").unwrap(), 1);
    assert_eq!(store.latest("alpha").unwrap(), kept);

    // the failed attempt left no open transaction behind
    let err = store.create_commit("beta", "new", "v1", None, &[]).unwrap_err();
    assert!(matches!(err, StoreError::Storage(_)));
    drop(store);

    let store = open(&dir);
    assert_eq!(store.count_commits("alpha").unwrap(), 1);
    assert!(matches!(store.latest("beta"), Err(StoreError::NotFound(_))));
}

#[test]
fn failed_tag_update_keeps_existing_tags() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let c = store
        .create_commit("alpha", "text", "v1", None, &["stable".to_string()])
        .unwrap();
    fail_writes(&dir, "UPDATE");

    let err = store.add_tag("alpha", c.short_hash(), "prod").unwrap_err();
    assert!(matches!(err, StoreError::Storage(_)));
    assert_eq!(err.exit_code(), 5);
    assert_eq!(store.resolve("alpha", &c.hash).unwrap().tags, vec!["stable"]);

    // tagging with a label already present needs no write
    assert_eq!(store.add_tag("alpha", &c.hash, "stable").unwrap(), c);
    drop(store);

    let store = open(&dir);
    assert_eq!(store.resolve("alpha", &c.hash).unwrap(), c);
}

#[test]
fn log_command_rejects_blank_prompt_name() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    store.create_commit("alpha", "text", "v1", None, &[]).unwrap();

    let err = cli::log::run(&store, "", 20, false).unwrap_err();
    let err = err.downcast_ref::<StoreError>().unwrap();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn failure_kinds_map_to_distinct_exit_codes() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    store.create_commit("alpha", "text", "v1", None, &[]).unwrap();

    let not_found = store.latest("ghost").unwrap_err();
    let bad_ref = store.resolve("alpha", "xy").unwrap_err();
    assert_eq!(not_found.exit_code(), 3);
    assert_eq!(bad_ref.exit_code(), 2);
}

#[test]
fn checkout_writes_content_to_configured_target() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let content = "Line one\nLine two  \n";
    let c = store.create_commit("chatbot", content, "v1", None, &[]).unwrap();

    let mut config = Config::default();
    config.checkout.output_dir = dir.path().join("out").display().to_string();

    let written = cli::checkout::run(&store, &config, "chatbot", c.short_hash(), None).unwrap();
    assert_eq!(written, dir.path().join("out").join("chatbot.txt"));
    assert_eq!(std::fs::read_to_string(&written).unwrap(), content);

    let explicit = dir.path().join("restored.md");
    cli::checkout::run(&store, &config, "chatbot", &c.hash, Some(explicit.as_path())).unwrap();
    assert_eq!(std::fs::read_to_string(&explicit).unwrap(), content);
}

#[test]
fn checkout_keeps_default_target_inside_output_dir() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let c = store.create_commit("../escape", "text", "v1", None, &[]).unwrap();

    let mut config = Config::default();
    config.checkout.output_dir = dir.path().join("out").display().to_string();

    let err = cli::checkout::run(&store, &config, "../escape", &c.hash, None).unwrap_err();
    let err = err.downcast_ref::<StoreError>().unwrap();
    assert_eq!(err.exit_code(), 2);
    assert!(!dir.path().join("escape.txt").exists());

    let explicit = dir.path().join("escape.txt");
    cli::checkout::run(&store, &config, "../escape", &c.hash, Some(explicit.as_path())).unwrap();
    assert_eq!(std::fs::read_to_string(&explicit).unwrap(), "text");
}

#[test]
fn commit_command_reads_file_and_tags() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let file = dir.path().join("prompt.txt");
    std::fs::write(&file, "Summarize the text.\n").unwrap();

    cli::commit::run(
        &store,
        &Config::default(),
        "summarizer",
        &file,
        "initial draft",
        None,
        Some("prod, stable"),
    )
    .unwrap();

    let latest = store.latest("summarizer").unwrap();
    assert_eq!(latest.content, "Summarize the text.\n");
    assert_eq!(latest.model, "gpt-4");
    assert_eq!(latest.tags, vec!["prod", "stable"]);

    let missing = cli::commit::run(
        &store,
        &Config::default(),
        "summarizer",
        &dir.path().join("absent.txt"),
        "nope",
        None,
        None,
    );
    assert!(missing.is_err());
    assert_eq!(store.count_commits("summarizer").unwrap(), 1);
}
