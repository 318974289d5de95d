//! The in-process data store.
//!
//! A cloneable handle over shared [`AppData`]. Reads return owned copies;
//! writes replace a whole collection (last write wins, no validation). When
//! opened with a path, [`MockStore::sync_data`] flushes a JSON snapshot so
//! the CLI keeps state between runs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use questly_types::{AppData, ChatMessage, DailyProgress, Task, UserProfile};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::seed::fresh_data;

/// Shared handle to the application data.
#[derive(Debug, Clone)]
pub struct MockStore {
    data: Arc<RwLock<AppData>>,
    path: Option<PathBuf>,
}

impl MockStore {
    /// A store that lives only in memory, seeded with fresh data.
    pub fn in_memory() -> Self {
        Self::with_data(fresh_data())
    }

    /// A store over the given data, not backed by a file.
    pub fn with_data(data: AppData) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
            path: None,
        }
    }

    /// Load a snapshot from `path`, seeding fresh data when the file does
    /// not exist yet.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let data = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => {
                let data: AppData = serde_json::from_str(&raw)?;
                info!(path = %path.display(), tasks = data.tasks.len(), "loaded snapshot");
                data
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no snapshot yet, seeding fresh data");
                fresh_data()
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(Self {
            data: Arc::new(RwLock::new(data)),
            path: Some(path),
        })
    }

    /// Snapshot file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Copy of everything.
    pub async fn get_data(&self) -> AppData {
        self.data.read().await.clone()
    }

    /// Copy of the profile.
    pub async fn get_user(&self) -> UserProfile {
        self.data.read().await.user.clone()
    }

    /// Replace the profile.
    pub async fn update_user(&self, user: UserProfile) {
        self.data.write().await.user = user;
    }

    /// Copy of the quest board.
    pub async fn get_tasks(&self) -> Vec<Task> {
        self.data.read().await.tasks.clone()
    }

    /// Replace the quest board.
    pub async fn update_tasks(&self, tasks: Vec<Task>) {
        self.data.write().await.tasks = tasks;
    }

    /// Copy of the weekly activity log.
    pub async fn get_history(&self) -> Vec<DailyProgress> {
        self.data.read().await.history.clone()
    }

    /// Replace the weekly activity log.
    pub async fn update_history(&self, history: Vec<DailyProgress>) {
        self.data.write().await.history = history;
    }

    /// Copy of the chat log.
    pub async fn get_chat_history(&self) -> Vec<ChatMessage> {
        self.data.read().await.chat_history.clone()
    }

    /// Replace the chat log.
    pub async fn update_chat_history(&self, chat_history: Vec<ChatMessage>) {
        self.data.write().await.chat_history = chat_history;
    }

    /// Flush to the snapshot file. A memory-only store does nothing.
    ///
    /// The file is written to a sibling temp path and renamed into place.
    pub async fn sync_data(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = {
            let data = self.data.read().await;
            serde_json::to_string_pretty(&*data)?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|source| StoreError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), "snapshot written");
        Ok(())
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::in_memory()
    }
}
