use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::config::MetaConfig;
use crate::diagnosis::MetricsInput;
use crate::{round_cents, Result, SmartAdsError};

/// Action types counted as a bottom-of-funnel result.
pub const RESULT_ACTION_TYPES: [&str; 5] = [
    "lead",
    "purchase",
    "onsite_conversion.lead_grouped",
    "messaging_conversation_started_7d",
    "subscribe",
];

/// Traffic campaigns have no conversion actions; clicks stand in for results.
pub const FALLBACK_ACTION_TYPE: &str = "link_click";

const OAUTH_SCOPE: &str = "ads_management,ads_read";
const INSIGHTS_FIELDS: &str = "cpm,ctr,cpc,spend,actions,cost_per_action_type";
const CAMPAIGN_FIELDS: &str = "id,name,status,objective";

#[derive(Clone)]
pub struct MetaClient {
    client: reqwest::Client,
    graph_url: String,
    dialog_url: String,
    app_id: Option<String>,
    app_secret: Option<String>,
    backend_url: Option<String>,
    campaign_limit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaCampaign {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub objective: Option<String>,
}

/// Insights summary for one campaign or a whole ad account, last 30 days.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignInsights {
    pub cpm: f64,
    pub ctr: f64,
    pub cpc: f64,
    pub cost_per_result: f64,
    pub results: f64,
    pub spend: f64,
}

impl CampaignInsights {
    pub fn to_metrics(&self) -> MetricsInput {
        MetricsInput {
            cpm: self.cpm,
            ctr: self.ctr,
            cpc: self.cpc,
            cost_per_result: self.cost_per_result,
            results: self.results,
            spend: self.spend,
            roas: None,
        }
    }
}

/// One row of the Graph `insights` edge. Meta encodes every metric as a string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InsightsRow {
    #[serde(default)]
    pub cpm: Option<String>,
    #[serde(default)]
    pub ctr: Option<String>,
    #[serde(default)]
    pub cpc: Option<String>,
    #[serde(default)]
    pub spend: Option<String>,
    #[serde(default)]
    pub actions: Option<Vec<ActionValue>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionValue {
    pub action_type: String,
    pub value: String,
}

#[derive(Deserialize)]
struct GraphList<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Deserialize)]
struct GraphErrorEnvelope {
    error: GraphError,
}

#[derive(Deserialize)]
struct GraphError {
    message: String,
}

impl MetaClient {
    pub fn from_config(config: &MetaConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| SmartAdsError::Config(format!("failed to build Meta client: {}", err)))?;
        let version = config.graph_version.trim_matches('/');
        Ok(Self {
            client,
            graph_url: format!("{}/{}", config.graph_base.trim_end_matches('/'), version),
            dialog_url: format!("{}/{}", config.dialog_base.trim_end_matches('/'), version),
            app_id: config.app_id.clone(),
            app_secret: env::var("META_APP_SECRET")
                .ok()
                .filter(|value| !value.trim().is_empty()),
            backend_url: config.backend_url.clone(),
            campaign_limit: config.campaign_limit,
        })
    }

    /// Facebook login dialog the browser is redirected to.
    pub fn oauth_url(&self) -> Result<String> {
        let app_id = self
            .app_id
            .as_deref()
            .ok_or_else(|| SmartAdsError::NotConfigured("META_APP_ID".to_string()))?;
        let redirect = self.redirect_uri()?;
        Ok(format!(
            "{}/dialog/oauth?client_id={}&redirect_uri={}&scope={}",
            self.dialog_url,
            urlencoding::encode(app_id),
            urlencoding::encode(&redirect),
            OAUTH_SCOPE
        ))
    }

    /// Swaps an OAuth `code` for a short-lived token, then that for a long-lived one.
    pub async fn exchange_code(&self, code: &str) -> Result<String> {
        let app_id = self
            .app_id
            .as_deref()
            .ok_or_else(|| SmartAdsError::NotConfigured("META_APP_ID".to_string()))?;
        let app_secret = self
            .app_secret
            .as_deref()
            .ok_or_else(|| SmartAdsError::NotConfigured("META_APP_SECRET".to_string()))?;
        let redirect = self.redirect_uri()?;
        let url = format!("{}/oauth/access_token", self.graph_url);

        let short: TokenResponse = self
            .get_json(
                &url,
                &[
                    ("client_id", app_id),
                    ("redirect_uri", redirect.as_str()),
                    ("client_secret", app_secret),
                    ("code", code),
                ],
            )
            .await?;
        let short_token = short
            .access_token
            .ok_or_else(|| SmartAdsError::upstream("Meta", "token response missing access_token"))?;

        let long: TokenResponse = self
            .get_json(
                &url,
                &[
                    ("grant_type", "fb_exchange_token"),
                    ("client_id", app_id),
                    ("client_secret", app_secret),
                    ("fb_exchange_token", short_token.as_str()),
                ],
            )
            .await?;
        long.access_token
            .ok_or_else(|| SmartAdsError::upstream("Meta", "token response missing access_token"))
    }

    pub async fn list_campaigns(&self, token: &str, account_id: &str) -> Result<Vec<MetaCampaign>> {
        let url = format!("{}/act_{}/campaigns", self.graph_url, account_id);
        let limit = self.campaign_limit.to_string();
        let body: GraphList<MetaCampaign> = self
            .get_json(
                &url,
                &[
                    ("access_token", token),
                    ("fields", CAMPAIGN_FIELDS),
                    ("limit", limit.as_str()),
                ],
            )
            .await?;
        Ok(body.data)
    }

    /// Campaign-level insights when `campaign_id` is given, account-level otherwise.
    /// `None` when Meta has no data for the period.
    pub async fn fetch_insights(
        &self,
        token: &str,
        account_id: &str,
        campaign_id: Option<&str>,
    ) -> Result<Option<CampaignInsights>> {
        let (url, level) = match campaign_id {
            Some(campaign) => (format!("{}/{}/insights", self.graph_url, campaign), "campaign"),
            None => (format!("{}/act_{}/insights", self.graph_url, account_id), "account"),
        };
        let body: GraphList<InsightsRow> = self
            .get_json(
                &url,
                &[
                    ("access_token", token),
                    ("fields", INSIGHTS_FIELDS),
                    ("date_preset", "last_30d"),
                    ("level", level),
                ],
            )
            .await?;
        Ok(body.data.first().map(summarize_insights))
    }

    fn redirect_uri(&self) -> Result<String> {
        let backend = self
            .backend_url
            .as_deref()
            .ok_or_else(|| SmartAdsError::NotConfigured("BACKEND_URL".to_string()))?;
        Ok(format!("{}/api/auth/meta/callback", backend.trim_end_matches('/')))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|err| SmartAdsError::upstream("Meta", format!("request failed: {}", err)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_else(|_| String::new());
            let detail = serde_json::from_str::<GraphErrorEnvelope>(&error_body)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| error_body.trim().to_string());
            if detail.is_empty() {
                return Err(SmartAdsError::upstream("Meta", status.to_string()));
            }
            return Err(SmartAdsError::upstream("Meta", format!("{} {}", status, detail)));
        }

        response
            .json()
            .await
            .map_err(|err| SmartAdsError::upstream("Meta", format!("response parse failed: {}", err)))
    }
}

/// Resolves the token and ad account for a request: explicit values first,
/// then the configured development credentials.
pub fn resolve_credentials(
    config: &MetaConfig,
    access_token: Option<String>,
    ad_account_id: Option<String>,
) -> Result<(String, String)> {
    let token = non_empty(access_token).or_else(|| non_empty(config.dev_access_token.clone()));
    let account = non_empty(ad_account_id).or_else(|| non_empty(config.ad_account_id.clone()));
    match (token, account) {
        (Some(token), Some(account)) => Ok((token, normalize_account_id(&account))),
        _ => Err(SmartAdsError::invalid("Missing Access Token or Ad Account ID")),
    }
}

fn normalize_account_id(account: &str) -> String {
    account.trim().trim_start_matches("act_").to_string()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

pub fn summarize_insights(row: &InsightsRow) -> CampaignInsights {
    let actions = row.actions.as_deref().unwrap_or(&[]);
    let mut results: f64 = actions
        .iter()
        .filter(|action| RESULT_ACTION_TYPES.contains(&action.action_type.as_str()))
        .map(|action| parse_metric(Some(&action.value)))
        .sum();
    if results == 0.0 {
        results = actions
            .iter()
            .find(|action| action.action_type == FALLBACK_ACTION_TYPE)
            .map(|action| parse_metric(Some(&action.value)))
            .unwrap_or(0.0);
    }

    let spend = parse_metric(row.spend.as_ref());
    let cost_per_result = if results > 0.0 { spend / results } else { 0.0 };

    CampaignInsights {
        cpm: round_cents(parse_metric(row.cpm.as_ref())),
        ctr: round_cents(parse_metric(row.ctr.as_ref())),
        cpc: round_cents(parse_metric(row.cpc.as_ref())),
        cost_per_result: round_cents(cost_per_result),
        results,
        spend: round_cents(spend),
    }
}

fn parse_metric(value: Option<&String>) -> f64 {
    value
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|parsed| parsed.is_finite())
        .unwrap_or(0.0)
}
