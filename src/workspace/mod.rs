//! Per-user workspace state: saved analysis snapshots, the business profile
//! the coach works from, and academy progress.
//!
//! Everything goes through [`WorkspaceStore`]; callers receive a store
//! instance instead of reaching for shared globals.

pub mod file;
pub mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;

use crate::Result;

pub use file::FileWorkspaceStore;
pub use memory::MemoryWorkspaceStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SnapshotKind {
    MetricsAnalysis,
    BudgetPlan,
    CampaignStructure,
    ClientReport,
}

impl SnapshotKind {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim() {
            "metricsAnalysis" | "metrics_analysis" | "metrics" => Some(SnapshotKind::MetricsAnalysis),
            "budgetPlan" | "budget_plan" | "budget" => Some(SnapshotKind::BudgetPlan),
            "campaignStructure" | "campaign_structure" | "structure" => {
                Some(SnapshotKind::CampaignStructure)
            }
            "clientReport" | "client_report" | "report" => Some(SnapshotKind::ClientReport),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: String,
    pub user_id: String,
    pub kind: SnapshotKind,
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub input: serde_json::Value,
    pub output: serde_json::Value,
}

impl Snapshot {
    pub fn new(
        user_id: impl Into<String>,
        kind: SnapshotKind,
        label: impl Into<String>,
        input: serde_json::Value,
        output: serde_json::Value,
    ) -> Self {
        Self {
            id: format!("snap_{:016x}", rand::random::<u64>()),
            user_id: user_id.into(),
            kind,
            label: label.into(),
            created_at: Utc::now(),
            input,
            output,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessProfile {
    pub niche: String,
    pub avatar: String,
    pub offer: String,
    pub revenue: String,
    pub goal: String,
    pub bottleneck: String,
}

impl BusinessProfile {
    pub fn is_empty(&self) -> bool {
        [
            &self.niche,
            &self.avatar,
            &self.offer,
            &self.revenue,
            &self.goal,
            &self.bottleneck,
        ]
        .iter()
        .all(|field| field.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcademyProgress {
    pub completed: BTreeMap<String, bool>,
}

impl AcademyProgress {
    pub fn set(&mut self, lesson_id: &str, completed: bool) {
        if completed {
            self.completed.insert(lesson_id.to_string(), true);
        } else {
            self.completed.remove(lesson_id);
        }
    }

    pub fn completed_count(&self) -> usize {
        self.completed.values().filter(|done| **done).count()
    }
}

pub trait WorkspaceStore: Send + Sync + 'static {
    fn add_snapshot(&self, snapshot: Snapshot) -> impl Future<Output = Result<Snapshot>> + Send;

    /// Newest first.
    fn list_snapshots(
        &self,
        user_id: &str,
        kind: Option<SnapshotKind>,
    ) -> impl Future<Output = Result<Vec<Snapshot>>> + Send;

    fn delete_snapshot(
        &self,
        user_id: &str,
        snapshot_id: &str,
    ) -> impl Future<Output = Result<bool>> + Send;

    fn profile(&self, user_id: &str) -> impl Future<Output = Result<Option<BusinessProfile>>> + Send;

    fn save_profile(
        &self,
        user_id: &str,
        profile: BusinessProfile,
    ) -> impl Future<Output = Result<BusinessProfile>> + Send;

    fn progress(&self, user_id: &str) -> impl Future<Output = Result<AcademyProgress>> + Send;

    fn set_lesson(
        &self,
        user_id: &str,
        lesson_id: &str,
        completed: bool,
    ) -> impl Future<Output = Result<AcademyProgress>> + Send;
}

/// The serialized shape shared by both store implementations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct WorkspaceData {
    pub snapshots: Vec<Snapshot>,
    pub profiles: HashMap<String, BusinessProfile>,
    pub progress: HashMap<String, AcademyProgress>,
}

impl WorkspaceData {
    pub fn insert_snapshot(&mut self, snapshot: Snapshot, max_per_user: usize) {
        let user_id = snapshot.user_id.clone();
        self.snapshots.insert(0, snapshot);
        let mut kept = 0usize;
        self.snapshots.retain(|existing| {
            if existing.user_id != user_id {
                return true;
            }
            kept += 1;
            kept <= max_per_user
        });
    }

    pub fn snapshots_for(&self, user_id: &str, kind: Option<SnapshotKind>) -> Vec<Snapshot> {
        self.snapshots
            .iter()
            .filter(|snapshot| snapshot.user_id == user_id)
            .filter(|snapshot| kind.map_or(true, |kind| snapshot.kind == kind))
            .cloned()
            .collect()
    }

    pub fn remove_snapshot(&mut self, user_id: &str, snapshot_id: &str) -> bool {
        let before = self.snapshots.len();
        self.snapshots
            .retain(|snapshot| !(snapshot.id == snapshot_id && snapshot.user_id == user_id));
        self.snapshots.len() != before
    }

    pub fn set_lesson(&mut self, user_id: &str, lesson_id: &str, completed: bool) -> AcademyProgress {
        let progress = self.progress.entry(user_id.to_string()).or_default();
        progress.set(lesson_id, completed);
        progress.clone()
    }
}
