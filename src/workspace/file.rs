use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use super::{AcademyProgress, BusinessProfile, Snapshot, SnapshotKind, WorkspaceData, WorkspaceStore};
use crate::{Result, SmartAdsError};

/// JSON-file backed store. Every write rewrites the whole document through a
/// temp file and a rename.
pub struct FileWorkspaceStore {
    path: PathBuf,
    max_snapshots: usize,
    data: RwLock<WorkspaceData>,
}

impl FileWorkspaceStore {
    pub async fn load(path: PathBuf, max_snapshots: usize) -> Result<Self> {
        let data = if path.exists() {
            let raw = tokio::fs::read_to_string(&path)
                .await
                .map_err(|err| storage_error("failed to read workspace", err))?;
            if raw.trim().is_empty() {
                WorkspaceData::default()
            } else {
                serde_json::from_str(&raw)
                    .map_err(|err| storage_error("failed to parse workspace", err))?
            }
        } else {
            WorkspaceData::default()
        };

        Ok(Self {
            path,
            max_snapshots: max_snapshots.max(1),
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applies `change` to a copy, writes the copy, and only then swaps it
    /// in. A failed write leaves memory as it was.
    async fn commit<R, F>(&self, change: F) -> Result<R>
    where
        F: FnOnce(&mut WorkspaceData) -> R + Send,
        R: Send,
    {
        let mut guard = self.data.write().await;
        let mut next = guard.clone();
        let outcome = change(&mut next);
        self.persist(&next).await?;
        *guard = next;
        Ok(outcome)
    }

    async fn persist(&self, data: &WorkspaceData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent).await?;
        }
        let payload = serde_json::to_string_pretty(data)
            .map_err(|err| storage_error("failed to serialize workspace", err))?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, payload)
            .await
            .map_err(|err| storage_error("failed to write workspace", err))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|err| storage_error("failed to finalize workspace", err))?;
        Ok(())
    }
}

impl WorkspaceStore for FileWorkspaceStore {
    async fn add_snapshot(&self, snapshot: Snapshot) -> Result<Snapshot> {
        let max_snapshots = self.max_snapshots;
        let saved = snapshot.clone();
        self.commit(move |data| data.insert_snapshot(snapshot, max_snapshots))
            .await?;
        Ok(saved)
    }

    async fn list_snapshots(&self, user_id: &str, kind: Option<SnapshotKind>) -> Result<Vec<Snapshot>> {
        let guard = self.data.read().await;
        Ok(guard.snapshots_for(user_id, kind))
    }

    async fn delete_snapshot(&self, user_id: &str, snapshot_id: &str) -> Result<bool> {
        let mut guard = self.data.write().await;
        let mut next = guard.clone();
        if !next.remove_snapshot(user_id, snapshot_id) {
            return Ok(false);
        }
        self.persist(&next).await?;
        *guard = next;
        Ok(true)
    }

    async fn profile(&self, user_id: &str) -> Result<Option<BusinessProfile>> {
        let guard = self.data.read().await;
        Ok(guard.profiles.get(user_id).cloned())
    }

    async fn save_profile(&self, user_id: &str, profile: BusinessProfile) -> Result<BusinessProfile> {
        let saved = profile.clone();
        self.commit(|data| {
            data.profiles.insert(user_id.to_string(), profile);
        })
        .await?;
        Ok(saved)
    }

    async fn progress(&self, user_id: &str) -> Result<AcademyProgress> {
        let guard = self.data.read().await;
        Ok(guard.progress.get(user_id).cloned().unwrap_or_default())
    }

    async fn set_lesson(&self, user_id: &str, lesson_id: &str, completed: bool) -> Result<AcademyProgress> {
        self.commit(|data| data.set_lesson(user_id, lesson_id, completed))
            .await
    }
}

fn storage_error(context: &str, err: impl std::fmt::Display) -> SmartAdsError {
    SmartAdsError::Storage(format!("{}: {}", context, err))
}

async fn ensure_dir(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() || path.exists() {
        return Ok(());
    }
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|err| storage_error("failed to create workspace dir", err))
}
