// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

const PING: &str = r#"
[[actions]]
name = "ping"
command = "echo hi"
"#;

const PING_PONG: &str = r#"
[[actions]]
name = "ping"
command = "echo hi"

[[actions]]
name = "pong"
command = ["echo", "pong"]
"#;

fn write_config(content: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, content).unwrap();
    (dir, path)
}

fn action_names(config: &Config) -> Vec<&str> {
    config.actions.iter().map(|a| a.name.as_str()).collect()
}

#[test]
fn load_and_snapshot() {
    let (_dir, path) = write_config(PING);
    let store = ConfigStore::load(&path).unwrap();
    assert_eq!(action_names(&store.snapshot()), vec!["ping"]);
}

#[test]
fn load_fails_on_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = ConfigStore::load(dir.path().join("absent.toml")).err().unwrap();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn reload_swaps_snapshot_but_old_readers_keep_theirs() {
    let (_dir, path) = write_config(PING);
    let store = ConfigStore::load(&path).unwrap();
    let before = store.snapshot();

    std::fs::write(&path, PING_PONG).unwrap();
    store.reload().unwrap();

    assert_eq!(action_names(&before), vec!["ping"]);
    assert_eq!(action_names(&store.snapshot()), vec!["ping", "pong"]);
}

#[test]
fn failed_reload_keeps_previous() {
    let (_dir, path) = write_config(PING);
    let store = ConfigStore::load(&path).unwrap();

    std::fs::write(&path, "[[actions]\nname = ").unwrap();
    assert!(store.reload().is_err());
    assert_eq!(action_names(&store.snapshot()), vec!["ping"]);

    std::fs::remove_file(&path).unwrap();
    assert!(store.reload().is_err());
    assert_eq!(action_names(&store.snapshot()), vec!["ping"]);
}

#[test]
fn debouncer_collapses_burst() {
    let window = Duration::from_millis(100);
    let start = Instant::now();
    let mut d = Debouncer::new(window);
    assert_eq!(d.state(), DebounceState::Idle);
    assert!(!d.fire(start));

    d.notify(start);
    d.notify(start + Duration::from_millis(30));
    d.notify(start + Duration::from_millis(60));
    assert_eq!(d.deadline(), Some(start + Duration::from_millis(160)));

    assert!(!d.fire(start + Duration::from_millis(120)));
    assert!(d.fire(start + Duration::from_millis(160)));
    assert_eq!(d.state(), DebounceState::Idle);
    assert!(!d.fire(start + Duration::from_millis(500)));
}

#[test]
fn debouncer_separate_bursts_fire_separately() {
    let window = Duration::from_millis(100);
    let start = Instant::now();
    let mut d = Debouncer::new(window);

    d.notify(start);
    assert!(d.fire(start + window));
    d.notify(start + Duration::from_millis(300));
    assert!(d.fire(start + Duration::from_millis(400)));
}

#[tokio::test]
async fn watch_reports_initial_and_reloaded_config() {
    let (_dir, path) = write_config(PING);
    let store = Arc::new(ConfigStore::load(&path).unwrap());
    let cancel = CancellationToken::new();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let handle = watch(Arc::clone(&store), Duration::from_millis(50), cancel.clone(), move |config| {
        let _ = tx.send(config.actions.len());
    })
    .unwrap();

    assert_eq!(rx.recv().await, Some(1));

    std::fs::write(&path, PING_PONG).unwrap();

    let reloaded = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
    assert_eq!(reloaded, Some(2));
    assert_eq!(action_names(&store.snapshot()), vec!["ping", "pong"]);

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn watch_collapses_write_burst_into_one_reload() {
    let (_dir, path) = write_config(PING);
    let store = Arc::new(ConfigStore::load(&path).unwrap());
    let cancel = CancellationToken::new();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let _handle = watch(Arc::clone(&store), Duration::from_millis(100), cancel.clone(), move |config| {
        let _ = tx.send(config.actions.len());
    })
    .unwrap();
    assert_eq!(rx.recv().await, Some(1));

    for content in [PING_PONG, PING, PING_PONG] {
        std::fs::write(&path, content).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let reloaded = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
    assert_eq!(reloaded, Some(2));

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(rx.try_recv().is_err(), "burst caused more than one reload");

    cancel.cancel();
}

#[tokio::test]
async fn watch_ignores_broken_edit() {
    let (_dir, path) = write_config(PING);
    let store = Arc::new(ConfigStore::load(&path).unwrap());
    let cancel = CancellationToken::new();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let _handle = watch(Arc::clone(&store), Duration::from_millis(50), cancel.clone(), move |config| {
        let _ = tx.send(config.actions.len());
    })
    .unwrap();
    assert_eq!(rx.recv().await, Some(1));

    std::fs::write(&path, "not = [valid").unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(action_names(&store.snapshot()), vec!["ping"]);

    cancel.cancel();
}
