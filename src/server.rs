use axum::{
    extract::{DefaultBodyLimit, FromRequest, Multipart, Path, Query, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{de::DeserializeOwned, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::api::*;
use smart_ads::config::AppConfig;
use smart_ads::llm::prompts::{self, MetricsContext};
use smart_ads::llm::schema::{AdTeardown, ChatFlow, CopyAssets, OrganicPlan, PerformanceReport};
use smart_ads::llm::{build_conversation, GeminiClient, InlineImage};
use smart_ads::meta_api::{resolve_credentials, MetaClient};
use smart_ads::workspace::{
    BusinessProfile, FileWorkspaceStore, MemoryWorkspaceStore, Snapshot, SnapshotKind,
    WorkspaceStore,
};
use smart_ads::{
    authorize, compute_budget, diagnose_with, generate_structure, BudgetReport, Capability,
    MetricsInput, Role, SmartAdsError,
};

const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
const ACCEPTED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];
const USER_ID_HEADER: &str = "x-user-id";
const USER_ROLE_HEADER: &str = "x-user-role";

struct AppState<S> {
    config: Arc<AppConfig>,
    store: Arc<S>,
    meta: MetaClient,
    llm: Option<GeminiClient>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            store: Arc::clone(&self.store),
            meta: self.meta.clone(),
            llm: self.llm.clone(),
        }
    }
}

impl<S: WorkspaceStore> AppState<S> {
    fn llm(&self) -> Result<&GeminiClient, ApiError> {
        self.llm
            .as_ref()
            .ok_or_else(|| ApiError(SmartAdsError::NotConfigured("GEMINI_API_KEY".to_string())))
    }
}

/// Who is calling. The dashboard forwards the signed-in user's id and role.
struct Identity {
    user_id: Option<String>,
    role: Role,
}

impl Identity {
    fn from_headers(headers: &HeaderMap, default_role: Role) -> Result<Self, ApiError> {
        let user_id = header_value(headers, USER_ID_HEADER);
        let role = match header_value(headers, USER_ROLE_HEADER) {
            Some(raw) => Role::from_str(&raw)
                .ok_or_else(|| SmartAdsError::invalid(format!("unknown role: {}", raw)))?,
            None => default_role,
        };
        Ok(Self { user_id, role })
    }

    fn require(&self, capability: Capability) -> Result<(), ApiError> {
        authorize(self.role, capability).map_err(ApiError)
    }

    fn require_user(&self) -> Result<&str, ApiError> {
        self.user_id
            .as_deref()
            .ok_or_else(|| ApiError(SmartAdsError::invalid("x-user-id header is required")))
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

struct ApiError(SmartAdsError);

impl From<SmartAdsError> for ApiError {
    fn from(err: SmartAdsError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self.0 {
            SmartAdsError::InvalidInput(message) => (StatusCode::BAD_REQUEST, message.clone(), None),
            SmartAdsError::Forbidden { .. } => (StatusCode::FORBIDDEN, self.0.to_string(), None),
            SmartAdsError::NotConfigured(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, self.0.to_string(), None)
            }
            SmartAdsError::Upstream { service, message } => {
                tracing::error!(service = %service, "upstream call failed: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to get a response from {}.", service),
                    Some(message.clone()),
                )
            }
            SmartAdsError::MalformedOutput { kind, reason } => {
                tracing::error!(kind = %kind, "malformed model output: {}", reason);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("The AI returned an invalid {}. Please try again.", kind),
                    Some(reason.clone()),
                )
            }
            SmartAdsError::Storage(message) | SmartAdsError::Config(message) => {
                tracing::error!("internal error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string(), None)
            }
        };
        (status, Json(ErrorBody { error, details })).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// JSON body extractor whose rejections (bad syntax, wrong shape, missing
/// content type) come back as a 400 `{error}` body.
struct ApiJson<T>(T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiError(SmartAdsError::invalid(rejection.body_text()))),
        }
    }
}

pub async fn serve(config: AppConfig, ephemeral: bool) -> Result<(), String> {
    let max_snapshots = config.workspace.max_snapshots;
    if ephemeral {
        tracing::info!("using in-memory workspace store");
        let store = MemoryWorkspaceStore::new(max_snapshots);
        run(config, store).await
    } else {
        let path = config.workspace.data_path.clone();
        let store = FileWorkspaceStore::load(path, max_snapshots)
            .await
            .map_err(|err| err.to_string())?;
        tracing::info!(path = %store.path().display(), "loaded workspace store");
        run(config, store).await
    }
}

async fn run<S: WorkspaceStore>(config: AppConfig, store: S) -> Result<(), String> {
    let meta = MetaClient::from_config(&config.meta).map_err(|err| err.to_string())?;
    let llm = GeminiClient::from_config(&config.llm);
    match &llm {
        Some(client) => tracing::info!(model = client.model(), "Gemini client ready"),
        None => tracing::warn!("GEMINI_API_KEY not set; AI routes will answer 503"),
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|err| format!("invalid bind address: {}", err))?;

    let state = AppState {
        config: Arc::new(config),
        store: Arc::new(store),
        meta,
        llm,
    };
    let app = router(state)?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| format!("failed to bind server: {}", err))?;
    tracing::info!(%addr, "smart-ads backend listening");

    axum::serve(listener, app)
        .await
        .map_err(|err| format!("server error: {}", err))?;

    Ok(())
}

fn router<S: WorkspaceStore>(state: AppState<S>) -> Result<Router, String> {
    let cors = cors_layer(state.config.server.frontend_url.as_deref())?;
    let web_root = state.config.server.web_root.clone();
    let index_path = format!("{}/index.html", web_root.trim_end_matches('/'));
    let static_service = ServeDir::new(&web_root).not_found_service(ServeFile::new(index_path));

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/budget", post(budget_handler::<S>))
        .route("/api/structure", post(structure_handler::<S>))
        .route("/api/diagnose", post(diagnose_handler::<S>))
        .route("/api/auth/meta/url", get(oauth_url_handler::<S>))
        .route("/api/auth/meta/callback", get(oauth_callback_handler::<S>))
        .route("/api/meta/campaigns", post(campaigns_handler::<S>))
        .route("/api/meta/insights", post(insights_handler::<S>))
        .route("/api/chat/analyze", post(analyze_handler::<S>))
        .route("/api/chat/refine-copy", post(refine_copy_handler::<S>))
        .route("/api/chat/refine-structure", post(refine_structure_handler::<S>))
        .route("/api/chat/business-coach", post(business_coach_handler::<S>))
        .route("/api/chat/sales-assistant", post(sales_assistant_handler::<S>))
        .route("/api/chat/generate-copy", post(generate_copy_handler::<S>))
        .route("/api/chat/generate-manychat-flow", post(chat_flow_handler::<S>))
        .route("/api/chat/generate-organic", post(organic_handler::<S>))
        .route("/api/chat/generate-report", post(report_handler::<S>))
        .route(
            "/api/vision/analyze-ad",
            post(analyze_ad_handler::<S>).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + 64 * 1024)),
        )
        .route(
            "/api/workspace/snapshots",
            get(list_snapshots_handler::<S>).post(create_snapshot_handler::<S>),
        )
        .route("/api/workspace/snapshots/:id", delete(delete_snapshot_handler::<S>))
        .route(
            "/api/workspace/profile",
            get(get_profile_handler::<S>).put(put_profile_handler::<S>),
        )
        .route(
            "/api/workspace/progress",
            get(get_progress_handler::<S>).put(put_progress_handler::<S>),
        )
        .fallback_service(static_service)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn cors_layer(frontend_url: Option<&str>) -> Result<CorsLayer, String> {
    match frontend_url {
        Some(origin) => {
            let origin = origin
                .trim_end_matches('/')
                .parse::<HeaderValue>()
                .map_err(|err| format!("invalid FRONTEND_URL: {}", err))?;
            Ok(CorsLayer::new()
                .allow_origin(origin)
                .allow_methods(Any)
                .allow_headers(Any))
        }
        None => Ok(CorsLayer::permissive()),
    }
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

/// Saves a snapshot for identified callers. Storage failures are logged and
/// never fail the calculation itself.
async fn record_snapshot<S, I, O>(
    state: &AppState<S>,
    identity: &Identity,
    kind: SnapshotKind,
    label: String,
    input: &I,
    output: &O,
) -> Option<String>
where
    S: WorkspaceStore,
    I: Serialize,
    O: Serialize,
{
    let user_id = identity.user_id.as_deref()?;
    let input = serde_json::to_value(input).ok()?;
    let output = serde_json::to_value(output).ok()?;
    let snapshot = Snapshot::new(user_id, kind, label, input, output);
    match state.store.add_snapshot(snapshot).await {
        Ok(saved) => Some(saved.id),
        Err(err) => {
            tracing::warn!(user_id, "failed to record snapshot: {}", err);
            None
        }
    }
}

async fn budget_handler<S: WorkspaceStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<BudgetRequest>,
) -> ApiResult<BudgetResponse> {
    let identity = Identity::from_headers(&headers, state.config.server.default_role)?;
    identity.require(Capability::BudgetSimulator)?;
    let inputs = request.into_inputs()?;
    let result = compute_budget(&inputs);
    let report = result.as_ref().map(|result| BudgetReport::new(&inputs, result));

    let snapshot_id = match result.as_ref() {
        Some(result) => {
            let label = format!(
                "Budget plan for {}",
                inputs.currency.format(inputs.monthly_revenue_goal)
            );
            record_snapshot(&state, &identity, SnapshotKind::BudgetPlan, label, &inputs, result).await
        }
        None => None,
    };

    Ok(Json(BudgetResponse {
        success: true,
        inputs,
        result,
        report,
        snapshot_id,
    }))
}

async fn structure_handler<S: WorkspaceStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<StructureRequest>,
) -> ApiResult<StructureResponse> {
    let identity = Identity::from_headers(&headers, state.config.server.default_role)?;
    identity.require(Capability::CampaignStructure)?;
    let inputs = request.into_inputs()?;
    let structure = generate_structure(&inputs);
    let label = format!("{:?} / {:?} structure", inputs.objective, inputs.phase);
    let snapshot_id = record_snapshot(
        &state,
        &identity,
        SnapshotKind::CampaignStructure,
        label,
        &inputs,
        &structure,
    )
    .await;

    Ok(Json(StructureResponse {
        success: true,
        structure,
        snapshot_id,
    }))
}

async fn diagnose_handler<S: WorkspaceStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    ApiJson(metrics): ApiJson<MetricsInput>,
) -> ApiResult<DiagnoseResponse> {
    let identity = Identity::from_headers(&headers, state.config.server.default_role)?;
    identity.require(Capability::MetricsDiagnosis)?;
    let diagnosis = diagnose_with(&metrics, &state.config.diagnosis);
    let label = format!("Diagnosis: {}", diagnosis.overall.label());
    let snapshot_id = record_snapshot(
        &state,
        &identity,
        SnapshotKind::MetricsAnalysis,
        label,
        &metrics,
        &diagnosis,
    )
    .await;

    Ok(Json(DiagnoseResponse {
        success: true,
        diagnosis,
        snapshot_id,
    }))
}

async fn oauth_url_handler<S: WorkspaceStore>(
    State(state): State<AppState<S>>,
) -> ApiResult<OAuthUrlResponse> {
    let url = state.meta.oauth_url()?;
    Ok(Json(OAuthUrlResponse { url }))
}

async fn oauth_callback_handler<S: WorkspaceStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Response {
    let Some(code) = query.code.filter(|code| !code.trim().is_empty()) else {
        return (StatusCode::BAD_REQUEST, "No code provided").into_response();
    };
    match state.meta.exchange_code(&code).await {
        Ok(_token) => {
            // TODO: persist the long-lived token per user once accounts are linked server-side.
            tracing::info!("Meta OAuth exchange succeeded");
            (StatusCode::OK, "Authentication successful! You can close this window.").into_response()
        }
        Err(err) => {
            tracing::error!("Meta OAuth exchange failed: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed").into_response()
        }
    }
}

async fn campaigns_handler<S: WorkspaceStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<MetaRequest>,
) -> ApiResult<CampaignsResponse> {
    let identity = Identity::from_headers(&headers, state.config.server.default_role)?;
    identity.require(Capability::MetricsDiagnosis)?;
    let (token, account) =
        resolve_credentials(&state.config.meta, request.user_access_token, request.ad_account_id)?;
    let campaigns = state.meta.list_campaigns(&token, &account).await?;
    tracing::debug!(count = campaigns.len(), "fetched Meta campaigns");
    Ok(Json(CampaignsResponse {
        success: true,
        campaigns,
    }))
}

async fn insights_handler<S: WorkspaceStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<MetaRequest>,
) -> ApiResult<InsightsResponse> {
    let identity = Identity::from_headers(&headers, state.config.server.default_role)?;
    identity.require(Capability::MetricsDiagnosis)?;
    let (token, account) =
        resolve_credentials(&state.config.meta, request.user_access_token, request.ad_account_id)?;
    let campaign = request.campaign_id.filter(|id| !id.trim().is_empty());
    let insights = state
        .meta
        .fetch_insights(&token, &account, campaign.as_deref())
        .await?;
    let message = insights
        .is_none()
        .then(|| "No current ad data found for this period.".to_string());
    Ok(Json(InsightsResponse {
        success: true,
        insights,
        message,
    }))
}

async fn analyze_handler<S: WorkspaceStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<AnalyzeRequest>,
) -> ApiResult<ReplyResponse> {
    let identity = Identity::from_headers(&headers, state.config.server.default_role)?;
    identity.require(Capability::MetricsDiagnosis)?;
    let conversation = build_conversation(&request.history, request.message.as_deref())?;
    let context = request.metrics_context.map(|mut context: MetricsContext| {
        if context.diagnosis.is_none() {
            let diagnosis = diagnose_with(&context.metrics, &state.config.diagnosis);
            context.diagnosis = serde_json::to_value(diagnosis).ok();
        }
        context
    });
    let system = prompts::metrics_analyst_prompt(context.as_ref());
    let reply = state.llm()?.chat(&system, &conversation).await?;
    Ok(Json(ReplyResponse {
        success: true,
        reply,
    }))
}

async fn refine_copy_handler<S: WorkspaceStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<RefineCopyRequest>,
) -> ApiResult<ReplyResponse> {
    let identity = Identity::from_headers(&headers, state.config.server.default_role)?;
    identity.require(Capability::CopyBuilder)?;
    let conversation = build_conversation(&request.history, request.message.as_deref())?;
    let system = prompts::copy_refiner_prompt(request.copy_context.as_ref());
    let reply = state.llm()?.chat(&system, &conversation).await?;
    Ok(Json(ReplyResponse {
        success: true,
        reply,
    }))
}

async fn refine_structure_handler<S: WorkspaceStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<RefineStructureRequest>,
) -> ApiResult<ReplyResponse> {
    let identity = Identity::from_headers(&headers, state.config.server.default_role)?;
    identity.require(Capability::CampaignStructure)?;
    let conversation = build_conversation(&request.history, request.message.as_deref())?;
    let system = prompts::structure_strategist_prompt(request.structure_context.as_ref());
    let reply = state.llm()?.chat(&system, &conversation).await?;
    Ok(Json(ReplyResponse {
        success: true,
        reply,
    }))
}

async fn business_coach_handler<S: WorkspaceStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<BusinessCoachRequest>,
) -> ApiResult<ReplyResponse> {
    let identity = Identity::from_headers(&headers, state.config.server.default_role)?;
    identity.require(Capability::BusinessCoach)?;
    let conversation = build_conversation(&request.history, request.message.as_deref())?;
    let profile = match (request.profile_context, identity.user_id.as_deref()) {
        (Some(profile), _) => Some(profile),
        (None, Some(user_id)) => state.store.profile(user_id).await?,
        (None, None) => None,
    };
    let system = prompts::business_coach_prompt(profile.as_ref());
    let reply = state.llm()?.chat(&system, &conversation).await?;
    Ok(Json(ReplyResponse {
        success: true,
        reply,
    }))
}

async fn sales_assistant_handler<S: WorkspaceStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<SalesAssistantRequest>,
) -> ApiResult<ReplyResponse> {
    let identity = Identity::from_headers(&headers, state.config.server.default_role)?;
    identity.require(Capability::CopyBuilder)?;
    let (Some(training), Some(history)) = (request.training_context, request.history) else {
        return Err(SmartAdsError::invalid("Missing training context or chat history.").into());
    };
    let conversation = build_conversation(&history, None)?;
    let system = prompts::sales_assistant_prompt(&training);
    let reply = state.llm()?.chat(&system, &conversation).await?;
    Ok(Json(ReplyResponse {
        success: true,
        reply,
    }))
}

async fn generate_copy_handler<S: WorkspaceStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    ApiJson(brief): ApiJson<GenerateCopyRequest>,
) -> ApiResult<DataResponse<CopyAssets>> {
    let identity = Identity::from_headers(&headers, state.config.server.default_role)?;
    identity.require(Capability::CopyBuilder)?;
    let prompt = prompts::ad_copy_prompt(&brief);
    let data = state.llm()?.generate_structured::<CopyAssets>(&prompt, None).await?;
    Ok(Json(DataResponse { success: true, data }))
}

async fn chat_flow_handler<S: WorkspaceStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    ApiJson(brief): ApiJson<ChatFlowRequest>,
) -> ApiResult<DataResponse<ChatFlow>> {
    let identity = Identity::from_headers(&headers, state.config.server.default_role)?;
    identity.require(Capability::Automations)?;
    let prompt = prompts::chat_flow_prompt(&brief);
    let data = state.llm()?.generate_structured::<ChatFlow>(&prompt, None).await?;
    Ok(Json(DataResponse { success: true, data }))
}

async fn organic_handler<S: WorkspaceStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    ApiJson(brief): ApiJson<OrganicRequest>,
) -> ApiResult<DataResponse<OrganicPlan>> {
    let identity = Identity::from_headers(&headers, state.config.server.default_role)?;
    identity.require(Capability::CopyBuilder)?;
    let prompt = prompts::organic_plan_prompt(&brief);
    let data = state.llm()?.generate_structured::<OrganicPlan>(&prompt, None).await?;
    Ok(Json(DataResponse { success: true, data }))
}

async fn report_handler<S: WorkspaceStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    ApiJson(brief): ApiJson<ReportRequest>,
) -> ApiResult<DataResponse<PerformanceReport>> {
    let identity = Identity::from_headers(&headers, state.config.server.default_role)?;
    identity.require(Capability::MetricsDiagnosis)?;
    let metrics = brief
        .metrics_extracted
        .clone()
        .ok_or_else(|| SmartAdsError::invalid("Metrics are required to build the report."))?;
    let prompt = prompts::report_prompt(&brief, &metrics);
    let data = state
        .llm()?
        .generate_structured::<PerformanceReport>(&prompt, None)
        .await?;

    let label = if brief.client_name.trim().is_empty() {
        "Client report".to_string()
    } else {
        format!("Client report: {}", brief.client_name.trim())
    };
    record_snapshot(&state, &identity, SnapshotKind::ClientReport, label, &brief, &data).await;

    Ok(Json(DataResponse { success: true, data }))
}

async fn analyze_ad_handler<S: WorkspaceStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ApiResult<DataResponse<AdTeardown>> {
    let identity = Identity::from_headers(&headers, state.config.server.default_role)?;
    identity.require(Capability::AdAnalyzer)?;

    let mut image: Option<InlineImage> = None;
    let mut product_context: Option<String> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| SmartAdsError::invalid(format!("invalid upload: {}", err)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                let mime_type = field.content_type().unwrap_or_default().to_string();
                if !ACCEPTED_IMAGE_TYPES.contains(&mime_type.as_str()) {
                    return Err(SmartAdsError::invalid(format!(
                        "unsupported image type '{}': use JPEG, PNG or WebP",
                        mime_type
                    ))
                    .into());
                }
                let data = field
                    .bytes()
                    .await
                    .map_err(|err| SmartAdsError::invalid(format!("invalid upload: {}", err)))?;
                if data.len() > MAX_IMAGE_BYTES {
                    return Err(SmartAdsError::invalid("image exceeds the 5 MB limit").into());
                }
                image = Some(InlineImage {
                    mime_type,
                    data: data.to_vec(),
                });
            }
            Some("productContext") => {
                let text = field
                    .text()
                    .await
                    .map_err(|err| SmartAdsError::invalid(format!("invalid upload: {}", err)))?;
                product_context = Some(text);
            }
            _ => {}
        }
    }

    let image = image.ok_or_else(|| SmartAdsError::invalid("No image uploaded."))?;
    let prompt = prompts::ad_teardown_prompt(product_context.as_deref());
    let data = state
        .llm()?
        .generate_structured::<AdTeardown>(&prompt, Some(&image))
        .await?;
    Ok(Json(DataResponse { success: true, data }))
}

async fn list_snapshots_handler<S: WorkspaceStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Query(query): Query<SnapshotQuery>,
) -> ApiResult<SnapshotListResponse> {
    let identity = Identity::from_headers(&headers, state.config.server.default_role)?;
    let user_id = identity.require_user()?;
    let kind = match query.kind.as_deref().filter(|kind| !kind.trim().is_empty()) {
        Some(raw) => Some(
            SnapshotKind::from_str(raw)
                .ok_or_else(|| SmartAdsError::invalid(format!("invalid snapshot kind: {}", raw)))?,
        ),
        None => None,
    };
    let snapshots = state.store.list_snapshots(user_id, kind).await?;
    Ok(Json(SnapshotListResponse {
        success: true,
        snapshots,
    }))
}

async fn create_snapshot_handler<S: WorkspaceStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<SnapshotRequest>,
) -> ApiResult<SnapshotResponse> {
    let identity = Identity::from_headers(&headers, state.config.server.default_role)?;
    let user_id = identity.require_user()?;
    let label = request
        .label
        .filter(|label| !label.trim().is_empty())
        .unwrap_or_else(|| "Untitled".to_string());
    let snapshot = Snapshot::new(user_id, request.kind, label, request.input, request.output);
    let snapshot = state.store.add_snapshot(snapshot).await?;
    Ok(Json(SnapshotResponse {
        success: true,
        snapshot,
    }))
}

async fn delete_snapshot_handler<S: WorkspaceStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<DeleteResponse> {
    let identity = Identity::from_headers(&headers, state.config.server.default_role)?;
    let user_id = identity.require_user()?;
    let deleted = state.store.delete_snapshot(user_id, &id).await?;
    Ok(Json(DeleteResponse {
        success: true,
        deleted,
    }))
}

async fn get_profile_handler<S: WorkspaceStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> ApiResult<ProfileResponse> {
    let identity = Identity::from_headers(&headers, state.config.server.default_role)?;
    identity.require(Capability::BusinessCoach)?;
    let user_id = identity.require_user()?;
    let profile = state.store.profile(user_id).await?;
    Ok(Json(ProfileResponse {
        success: true,
        profile,
    }))
}

async fn put_profile_handler<S: WorkspaceStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    ApiJson(profile): ApiJson<BusinessProfile>,
) -> ApiResult<ProfileResponse> {
    let identity = Identity::from_headers(&headers, state.config.server.default_role)?;
    identity.require(Capability::BusinessCoach)?;
    let user_id = identity.require_user()?;
    let profile = state.store.save_profile(user_id, profile).await?;
    Ok(Json(ProfileResponse {
        success: true,
        profile: Some(profile),
    }))
}

async fn get_progress_handler<S: WorkspaceStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> ApiResult<ProgressResponse> {
    let identity = Identity::from_headers(&headers, state.config.server.default_role)?;
    identity.require(Capability::Academy)?;
    let user_id = identity.require_user()?;
    let progress = state.store.progress(user_id).await?;
    Ok(Json(ProgressResponse::new(progress)))
}

async fn put_progress_handler<S: WorkspaceStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    ApiJson(update): ApiJson<LessonUpdate>,
) -> ApiResult<ProgressResponse> {
    let identity = Identity::from_headers(&headers, state.config.server.default_role)?;
    identity.require(Capability::Academy)?;
    let user_id = identity.require_user()?;
    let lesson_id = update.lesson_id.trim();
    if lesson_id.is_empty() {
        return Err(SmartAdsError::invalid("lessonId is required").into());
    }
    let progress = state
        .store
        .set_lesson(user_id, lesson_id, update.completed)
        .await?;
    Ok(Json(ProgressResponse::new(progress)))
}
