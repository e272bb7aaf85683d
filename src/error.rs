use thiserror::Error;

pub type Result<T> = std::result::Result<T, SmartAdsError>;

#[derive(Error, Debug)]
pub enum SmartAdsError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("role '{role}' cannot access {capability}")]
    Forbidden { role: String, capability: String },

    #[error("{0} is not configured")]
    NotConfigured(String),

    #[error("{service} error: {message}")]
    Upstream { service: String, message: String },

    #[error("malformed {kind} output: {reason}")]
    MalformedOutput { kind: String, reason: String },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl SmartAdsError {
    pub fn invalid(message: impl Into<String>) -> Self {
        SmartAdsError::InvalidInput(message.into())
    }

    pub fn upstream(service: &str, message: impl Into<String>) -> Self {
        SmartAdsError::Upstream {
            service: service.to_string(),
            message: message.into(),
        }
    }

    pub fn malformed(kind: &str, reason: impl Into<String>) -> Self {
        SmartAdsError::MalformedOutput {
            kind: kind.to_string(),
            reason: reason.into(),
        }
    }
}
