use serde::{Deserialize, Serialize};

use crate::{Result, SmartAdsError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Workshop,
    Pro,
    Client,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    BusinessCoach,
    CopyBuilder,
    AdAnalyzer,
    BudgetSimulator,
    CampaignStructure,
    Automations,
    Academy,
    MetricsDiagnosis,
    SystemHub,
}

const STUDIO: &[Capability] = &[
    Capability::BusinessCoach,
    Capability::CopyBuilder,
    Capability::AdAnalyzer,
    Capability::BudgetSimulator,
    Capability::CampaignStructure,
    Capability::Automations,
    Capability::Academy,
    Capability::SystemHub,
];

const EVERYTHING: &[Capability] = &[
    Capability::BusinessCoach,
    Capability::CopyBuilder,
    Capability::AdAnalyzer,
    Capability::BudgetSimulator,
    Capability::CampaignStructure,
    Capability::Automations,
    Capability::Academy,
    Capability::MetricsDiagnosis,
    Capability::SystemHub,
];

const CLIENT: &[Capability] = &[Capability::MetricsDiagnosis];

impl Role {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "workshop" => Some(Role::Workshop),
            "pro" => Some(Role::Pro),
            "client" => Some(Role::Client),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Workshop => "workshop",
            Role::Pro => "pro",
            Role::Client => "client",
            Role::Admin => "admin",
        }
    }

    pub fn capabilities(self) -> &'static [Capability] {
        match self {
            Role::Workshop => STUDIO,
            Role::Pro | Role::Admin => EVERYTHING,
            Role::Client => CLIENT,
        }
    }

    pub fn can(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

impl Capability {
    pub fn label(self) -> &'static str {
        match self {
            Capability::BusinessCoach => "business coach",
            Capability::CopyBuilder => "copy builder",
            Capability::AdAnalyzer => "ad analyzer",
            Capability::BudgetSimulator => "budget simulator",
            Capability::CampaignStructure => "campaign structure",
            Capability::Automations => "automations builder",
            Capability::Academy => "academy",
            Capability::MetricsDiagnosis => "metrics diagnosis",
            Capability::SystemHub => "system hub",
        }
    }
}

/// The one gate every protected operation goes through.
pub fn authorize(role: Role, capability: Capability) -> Result<()> {
    if role.can(capability) {
        return Ok(());
    }
    Err(SmartAdsError::Forbidden {
        role: role.label().to_string(),
        capability: capability.label().to_string(),
    })
}
