use serde::{Deserialize, Serialize};
use smart_ads::llm::prompts::{
    CopyBrief, CopyContext, FlowBrief, MetricsContext, OrganicBrief, ReportBrief, SalesTraining,
    StructureContext,
};
use smart_ads::llm::HistoryMessage;
use smart_ads::lenient;
use smart_ads::meta_api::{CampaignInsights, MetaCampaign};
use smart_ads::workspace::{AcademyProgress, BusinessProfile, Snapshot, SnapshotKind};
use smart_ads::{
    BudgetInputs, BudgetReport, BudgetResult, CampaignObjective, CampaignPhase, CampaignStructure,
    Currency, Diagnosis, PixelMaturity, Result, SmartAdsError, StructureInputs, TrafficObjective,
};

/// Numeric fields mirror the dashboard form: a blank or missing box counts as
/// zero, which the calculator reports as insufficient input.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BudgetRequest {
    #[serde(deserialize_with = "lenient::number")]
    pub monthly_revenue_goal: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub unit_price: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub conversion_rate_pct: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub cost_per_click: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub ctr_pct: f64,
    pub currency: Option<String>,
    pub traffic_objective: Option<String>,
}

impl BudgetRequest {
    pub fn into_inputs(self) -> Result<BudgetInputs> {
        let currency = match self.currency.as_deref() {
            Some(currency) => Currency::from_str(currency)
                .ok_or_else(|| SmartAdsError::invalid(format!("invalid currency: {}", currency)))?,
            None => Currency::default(),
        };
        let traffic_objective = match self.traffic_objective.as_deref() {
            Some(objective) => TrafficObjective::from_str(objective).ok_or_else(|| {
                SmartAdsError::invalid(format!("invalid traffic objective: {}", objective))
            })?,
            None => TrafficObjective::default(),
        };
        Ok(BudgetInputs {
            monthly_revenue_goal: self.monthly_revenue_goal,
            unit_price: self.unit_price,
            conversion_rate_pct: self.conversion_rate_pct,
            cost_per_click: self.cost_per_click,
            ctr_pct: self.ctr_pct,
            currency,
            traffic_objective,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetResponse {
    pub success: bool,
    pub inputs: BudgetInputs,
    pub result: Option<BudgetResult>,
    pub report: Option<BudgetReport>,
    pub snapshot_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureRequest {
    pub objective: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub daily_budget: Option<f64>,
    pub currency: Option<String>,
    pub pixel_maturity: Option<String>,
    pub phase: Option<String>,
}

impl StructureRequest {
    pub fn into_inputs(self) -> Result<StructureInputs> {
        let mut inputs = StructureInputs::default();
        if let Some(objective) = self.objective.as_deref() {
            inputs.objective = CampaignObjective::from_str(objective)
                .ok_or_else(|| SmartAdsError::invalid(format!("invalid objective: {}", objective)))?;
        }
        if let Some(value) = self.daily_budget {
            inputs.daily_budget = value;
        }
        if let Some(currency) = self.currency.as_deref() {
            inputs.currency = Currency::from_str(currency)
                .ok_or_else(|| SmartAdsError::invalid(format!("invalid currency: {}", currency)))?;
        }
        if let Some(maturity) = self.pixel_maturity.as_deref() {
            inputs.pixel_maturity = PixelMaturity::from_str(maturity).ok_or_else(|| {
                SmartAdsError::invalid(format!("invalid pixel maturity: {}", maturity))
            })?;
        }
        if let Some(phase) = self.phase.as_deref() {
            inputs.phase = CampaignPhase::from_str(phase)
                .ok_or_else(|| SmartAdsError::invalid(format!("invalid phase: {}", phase)))?;
        }
        Ok(inputs)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureResponse {
    pub success: bool,
    pub structure: CampaignStructure,
    pub snapshot_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnoseResponse {
    pub success: bool,
    pub diagnosis: Diagnosis,
    pub snapshot_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetaRequest {
    pub ad_account_id: Option<String>,
    pub user_access_token: Option<String>,
    pub campaign_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CampaignsResponse {
    pub success: bool,
    pub campaigns: Vec<MetaCampaign>,
}

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub success: bool,
    pub insights: Option<CampaignInsights>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OAuthUrlResponse {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub message: Option<String>,
    pub metrics_context: Option<MetricsContext>,
    #[serde(default)]
    pub history: Vec<HistoryMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineCopyRequest {
    pub message: Option<String>,
    pub copy_context: Option<CopyContext>,
    #[serde(default)]
    pub history: Vec<HistoryMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineStructureRequest {
    pub message: Option<String>,
    pub structure_context: Option<StructureContext>,
    #[serde(default)]
    pub history: Vec<HistoryMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessCoachRequest {
    pub message: Option<String>,
    pub profile_context: Option<BusinessProfile>,
    #[serde(default)]
    pub history: Vec<HistoryMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesAssistantRequest {
    pub training_context: Option<SalesTraining>,
    pub history: Option<Vec<HistoryMessage>>,
}

pub type GenerateCopyRequest = CopyBrief;
pub type ChatFlowRequest = FlowBrief;
pub type OrganicRequest = OrganicBrief;
pub type ReportRequest = ReportBrief;

#[derive(Debug, Serialize)]
pub struct ReplyResponse {
    pub success: bool,
    pub reply: String,
}

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotRequest {
    pub kind: SnapshotKind,
    pub label: Option<String>,
    #[serde(default)]
    pub input: serde_json::Value,
    #[serde(default)]
    pub output: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotQuery {
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SnapshotListResponse {
    pub success: bool,
    pub snapshots: Vec<Snapshot>,
}

#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    pub success: bool,
    pub snapshot: Snapshot,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted: bool,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub profile: Option<BusinessProfile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonUpdate {
    pub lesson_id: String,
    #[serde(default = "default_completed")]
    pub completed: bool,
}

fn default_completed() -> bool {
    true
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub success: bool,
    pub completed_count: usize,
    pub progress: AcademyProgress,
}

impl ProgressResponse {
    pub fn new(progress: AcademyProgress) -> Self {
        Self {
            success: true,
            completed_count: progress.completed_count(),
            progress,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
