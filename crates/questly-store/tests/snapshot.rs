//! Snapshot persistence of [`MockStore`] across reopen.

#![allow(clippy::unwrap_used)]

use std::path::PathBuf;

use questly_store::{MockStore, StoreError};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("questly-store-{}", uuid::Uuid::now_v7()))
        .join(name)
}

#[tokio::test]
async fn missing_file_seeds_fresh_data() {
    let path = temp_path("data.json");
    let store = MockStore::open(&path).await.unwrap();
    let data = store.get_data().await;
    assert!(!data.user.onboarding_complete);
    assert_eq!(data.history.len(), 7);
    assert!(!path.exists());
}

#[tokio::test]
async fn sync_then_reopen_restores_state() {
    let path = temp_path("data.json");
    let store = MockStore::open(&path).await.unwrap();

    let mut user = store.get_user().await;
    user.name = String::from("Grace");
    user.xp = 350;
    user.onboarding_complete = true;
    store.update_user(user).await;
    store.sync_data().await.unwrap();
    assert!(path.exists());

    let reopened = MockStore::open(&path).await.unwrap();
    let user = reopened.get_user().await;
    assert_eq!(user.name, "Grace");
    assert_eq!(user.xp, 350);
    assert!(user.onboarding_complete);

    tokio::fs::remove_dir_all(path.parent().unwrap()).await.ok();
}

#[tokio::test]
async fn corrupt_snapshot_is_a_serialization_error() {
    let path = temp_path("broken.json");
    tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
    tokio::fs::write(&path, "{not json").await.unwrap();

    let result = MockStore::open(&path).await;
    assert!(matches!(result, Err(StoreError::Serialization(_))));

    tokio::fs::remove_dir_all(path.parent().unwrap()).await.ok();
}
