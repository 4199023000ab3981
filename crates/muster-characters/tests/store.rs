//! Integration tests for the character store against a real filesystem.

use muster_characters::{CharacterError, CharacterStore, SAVE_SIZE};
use tempfile::TempDir;

/// Builds a store with isolated base and active directories.
fn store() -> (CharacterStore, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let store = CharacterStore::new(
        dir.path().join("saves"),
        dir.path().join("active"),
    );
    (store, dir)
}

#[tokio::test]
async fn test_initialize_user_creates_directory_and_metadata() {
    let (store, _guard) = store();

    let dir = store.initialize_user("u1").await.expect("should init");

    assert!(dir.is_dir());
    assert!(dir.join("characters.json").is_file());
    // Idempotent: a second call leaves the metadata in place.
    store.initialize_user("u1").await.expect("re-init ok");
}

#[tokio::test]
async fn test_list_characters_for_unknown_user_is_empty() {
    let (store, _guard) = store();
    let chars = store.list_characters("nobody").await.expect("ok");
    assert!(chars.is_empty());
}

#[tokio::test]
async fn test_create_character_writes_save_and_metadata() {
    let (store, _guard) = store();

    let (name, meta) = store
        .create_character("u1", "Kormir", "Paladin", false)
        .await
        .expect("should create");

    assert_eq!(name, "Kormir");
    assert_eq!(meta.level, 1);
    assert!(!meta.hardcore);
    assert_eq!(meta.icon, "🛡️");

    let chars = store.list_characters("u1").await.expect("ok");
    assert_eq!(chars.len(), 1);
    assert_eq!(chars["Kormir"], meta);
    assert_eq!(store.character_count("u1").await.expect("ok"), 1);
}

#[tokio::test]
async fn test_create_character_sanitizes_the_name() {
    let (store, _guard) = store();

    let (name, _) = store
        .create_character("u1", "K/or mir!", "Druid", true)
        .await
        .expect("should create");

    assert_eq!(name, "Kormir");
}

#[tokio::test]
async fn test_create_character_rejects_empty_name() {
    let (store, _guard) = store();
    let result =
        store.create_character("u1", "!!!", "Druid", false).await;
    assert!(matches!(result, Err(CharacterError::InvalidName)));
}

#[tokio::test]
async fn test_create_character_rejects_unknown_class() {
    let (store, _guard) = store();
    let result =
        store.create_character("u1", "Lute", "Bard", false).await;
    assert!(matches!(result, Err(CharacterError::UnknownClass(c)) if c == "Bard"));
}

#[tokio::test]
async fn test_create_duplicate_character_is_rejected() {
    let (store, _guard) = store();
    store
        .create_character("u1", "Kormir", "Paladin", false)
        .await
        .expect("first create");

    let result = store
        .create_character("u1", "Kormir", "Sorceress", false)
        .await;

    assert!(
        matches!(result, Err(CharacterError::AlreadyExists(n)) if n == "Kormir")
    );
}

#[tokio::test]
async fn test_users_do_not_see_each_others_characters() {
    let (store, _guard) = store();
    store
        .create_character("u1", "Kormir", "Paladin", false)
        .await
        .expect("create");

    assert_eq!(store.character_count("u2").await.expect("ok"), 0);
}

#[tokio::test]
async fn test_delete_character_removes_save_and_metadata() {
    let (store, _guard) = store();
    store
        .create_character("u1", "Kormir", "Paladin", false)
        .await
        .expect("create");

    store
        .delete_character("u1", "Kormir")
        .await
        .expect("should delete");

    assert_eq!(store.character_count("u1").await.expect("ok"), 0);
    assert!(matches!(
        store.delete_character("u1", "Kormir").await,
        Err(CharacterError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_activate_character_copies_save_into_active_dir() {
    let (store, _guard) = store();
    store
        .create_character("u1", "Kormir", "Paladin", false)
        .await
        .expect("create");
    let before = store.list_characters("u1").await.unwrap()["Kormir"]
        .last_played;

    let path = store
        .activate_character("u1", "Kormir")
        .await
        .expect("should activate");

    assert!(path.is_file());
    let data = tokio::fs::read(&path).await.expect("readable");
    assert_eq!(data.len(), SAVE_SIZE);
    let after = store.list_characters("u1").await.unwrap()["Kormir"]
        .last_played;
    assert!(after >= before);
}

#[tokio::test]
async fn test_activate_unknown_character_returns_not_found() {
    let (store, _guard) = store();
    store.initialize_user("u1").await.expect("init");

    let result = store.activate_character("u1", "Ghost").await;
    assert!(matches!(result, Err(CharacterError::NotFound(_))));
}

#[tokio::test]
async fn test_sync_character_back_copies_updated_save_home() {
    let (store, _guard) = store();
    store
        .create_character("u1", "Kormir", "Paladin", false)
        .await
        .expect("create");
    let active = store
        .activate_character("u1", "Kormir")
        .await
        .expect("activate");

    // Simulate the game mutating the active save.
    let mut data = tokio::fs::read(&active).await.expect("read");
    data[43] = 9; // level byte
    tokio::fs::write(&active, &data).await.expect("write");

    store
        .sync_character_back("u1", "Kormir")
        .await
        .expect("should sync");

    let dir = store.initialize_user("u1").await.expect("dir");
    let home = tokio::fs::read(dir.join("Kormir.sav"))
        .await
        .expect("home save");
    assert_eq!(home[43], 9, "updated save was copied back");
}

#[tokio::test]
async fn test_sync_back_without_active_save_returns_not_found() {
    let (store, _guard) = store();
    store
        .create_character("u1", "Kormir", "Paladin", false)
        .await
        .expect("create");

    let result = store.sync_character_back("u1", "Kormir").await;
    assert!(matches!(result, Err(CharacterError::NotFound(_))));
}
