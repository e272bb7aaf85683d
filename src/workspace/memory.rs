use tokio::sync::RwLock;

use super::{AcademyProgress, BusinessProfile, Snapshot, SnapshotKind, WorkspaceData, WorkspaceStore};
use crate::Result;

/// Process-local store; contents vanish with the process.
pub struct MemoryWorkspaceStore {
    max_snapshots: usize,
    data: RwLock<WorkspaceData>,
}

impl MemoryWorkspaceStore {
    pub fn new(max_snapshots: usize) -> Self {
        Self {
            max_snapshots: max_snapshots.max(1),
            data: RwLock::new(WorkspaceData::default()),
        }
    }
}

impl WorkspaceStore for MemoryWorkspaceStore {
    async fn add_snapshot(&self, snapshot: Snapshot) -> Result<Snapshot> {
        let mut guard = self.data.write().await;
        guard.insert_snapshot(snapshot.clone(), self.max_snapshots);
        Ok(snapshot)
    }

    async fn list_snapshots(&self, user_id: &str, kind: Option<SnapshotKind>) -> Result<Vec<Snapshot>> {
        let guard = self.data.read().await;
        Ok(guard.snapshots_for(user_id, kind))
    }

    async fn delete_snapshot(&self, user_id: &str, snapshot_id: &str) -> Result<bool> {
        let mut guard = self.data.write().await;
        Ok(guard.remove_snapshot(user_id, snapshot_id))
    }

    async fn profile(&self, user_id: &str) -> Result<Option<BusinessProfile>> {
        let guard = self.data.read().await;
        Ok(guard.profiles.get(user_id).cloned())
    }

    async fn save_profile(&self, user_id: &str, profile: BusinessProfile) -> Result<BusinessProfile> {
        let mut guard = self.data.write().await;
        guard.profiles.insert(user_id.to_string(), profile.clone());
        Ok(profile)
    }

    async fn progress(&self, user_id: &str) -> Result<AcademyProgress> {
        let guard = self.data.read().await;
        Ok(guard.progress.get(user_id).cloned().unwrap_or_default())
    }

    async fn set_lesson(&self, user_id: &str, lesson_id: &str, completed: bool) -> Result<AcademyProgress> {
        let mut guard = self.data.write().await;
        Ok(guard.set_lesson(user_id, lesson_id, completed))
    }
}
