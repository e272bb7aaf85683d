use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::diagnosis::DiagnosisThresholds;
use crate::{Result, Role, SmartAdsError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub web_root: String,
    pub frontend_url: Option<String>,
    pub default_role: Role,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            web_root: "../dashboard/dist".to_string(),
            frontend_url: None,
            default_role: Role::Workshop,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaConfig {
    pub graph_version: String,
    pub graph_base: String,
    pub dialog_base: String,
    pub app_id: Option<String>,
    pub backend_url: Option<String>,
    pub dev_access_token: Option<String>,
    pub ad_account_id: Option<String>,
    pub campaign_limit: u32,
    pub timeout_ms: u64,
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            graph_version: "v19.0".to_string(),
            graph_base: "https://graph.facebook.com".to_string(),
            dialog_base: "https://www.facebook.com".to_string(),
            app_id: None,
            backend_url: None,
            dev_access_token: None,
            ad_account_id: None,
            campaign_limit: 50,
            timeout_ms: 15_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_base: String,
    pub model: String,
    pub temperature: f64,
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.7,
            timeout_ms: 90_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    pub data_path: PathBuf,
    pub max_snapshots: usize,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/workspace.json"),
            max_snapshots: 200,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub meta: MetaConfig,
    pub llm: LlmConfig,
    pub diagnosis: DiagnosisThresholds,
    pub workspace: WorkspaceConfig,
}

impl AppConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>)> {
        let config_path = path.or_else(default_config_path);
        let mut config = if let Some(path) = config_path.as_ref() {
            if path.exists() {
                let contents = std::fs::read_to_string(path)
                    .map_err(|err| SmartAdsError::Config(format!("failed to read config: {}", err)))?;
                toml::from_str(&contents)
                    .map_err(|err| SmartAdsError::Config(format!("failed to parse config: {}", err)))?
            } else {
                AppConfig::default()
            }
        } else {
            AppConfig::default()
        };

        config.apply_env_overrides();
        Ok((config, config_path))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| {
                SmartAdsError::Config(format!("failed to create config dir: {}", err))
            })?;
        }
        let payload = toml::to_string_pretty(self)
            .map_err(|err| SmartAdsError::Config(format!("failed to serialize config: {}", err)))?;
        std::fs::write(path, payload)
            .map_err(|err| SmartAdsError::Config(format!("failed to write config: {}", err)))?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Some(port) = env_value("PORT").and_then(|value| value.parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Some(host) = env_value("HOST") {
            self.server.host = host;
        }
        if let Some(url) = env_value("FRONTEND_URL") {
            self.server.frontend_url = Some(url);
        }
        if let Some(role) = env_value("DEFAULT_ROLE").and_then(|value| Role::from_str(&value)) {
            self.server.default_role = role;
        }
        if let Some(app_id) = env_value("META_APP_ID") {
            self.meta.app_id = Some(app_id);
        }
        if let Some(url) = env_value("BACKEND_URL") {
            self.meta.backend_url = Some(url);
        }
        if let Some(token) = env_value("META_DEV_ACCESS_TOKEN") {
            self.meta.dev_access_token = Some(token);
        }
        if let Some(account) = env_value("TEST_AD_ACCOUNT_ID") {
            self.meta.ad_account_id = Some(account);
        }
        if let Some(base) = env_value("GEMINI_API_BASE") {
            self.llm.api_base = base;
        }
        if let Some(model) = env_value("GEMINI_MODEL") {
            self.llm.model = model;
        }
        if let Some(path) = env_value("SMART_ADS_DATA_PATH") {
            self.workspace.data_path = PathBuf::from(path);
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn default_config_path() -> Option<PathBuf> {
    env_value("SMART_ADS_CONFIG_PATH")
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/smart-ads.toml")))
}
