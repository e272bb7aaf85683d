use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::prompts::COPY_ANGLES;
use crate::{Result, SmartAdsError};

/// A JSON document the model is asked to produce.
pub trait StructuredOutput: DeserializeOwned + Serialize {
    const KIND: &'static str;

    fn validate(&self) -> std::result::Result<(), String>;
}

/// Strips markdown fences, pulls out the outermost JSON object and checks it
/// against `T`.
pub fn parse_structured<T: StructuredOutput>(raw: &str) -> Result<T> {
    let body = strip_fences(raw);
    let json = extract_json(body)
        .ok_or_else(|| SmartAdsError::malformed(T::KIND, "response contains no JSON object"))?;
    let parsed: T = serde_json::from_str(json)
        .map_err(|err| SmartAdsError::malformed(T::KIND, err.to_string()))?;
    parsed
        .validate()
        .map_err(|reason| SmartAdsError::malformed(T::KIND, reason))?;
    Ok(parsed)
}

pub fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start >= end {
        return None;
    }
    Some(&text[start..=end])
}

fn require_text(field: &str, value: &str) -> std::result::Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("`{}` is empty", field));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopyAngle {
    pub name: String,
    pub copy: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopyAssets {
    pub angles: Vec<CopyAngle>,
    #[serde(default)]
    pub hooks: Vec<String>,
    #[serde(default)]
    pub scripts: Vec<String>,
    #[serde(default)]
    pub ctas: Vec<String>,
}

impl StructuredOutput for CopyAssets {
    const KIND: &'static str = "ad copy";

    fn validate(&self) -> std::result::Result<(), String> {
        if self.angles.len() != COPY_ANGLES.len() {
            return Err(format!(
                "expected {} angles, got {}",
                COPY_ANGLES.len(),
                self.angles.len()
            ));
        }
        for angle in &self.angles {
            require_text("angles[].copy", &angle.copy)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowNodeKind {
    Message,
    CollectData,
    Action,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowOption {
    pub text: String,
    pub next_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FlowNodeKind,
    pub text: String,
    #[serde(default)]
    pub options: Vec<FlowOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatFlow {
    pub title: String,
    pub trigger: String,
    #[serde(default)]
    pub strategy_rationale: String,
    pub nodes: Vec<FlowNode>,
}

impl StructuredOutput for ChatFlow {
    const KIND: &'static str = "chat flow";

    fn validate(&self) -> std::result::Result<(), String> {
        let first = self.nodes.first().ok_or_else(|| "flow has no nodes".to_string())?;
        if first.id != "node-1" {
            return Err(format!("flow must start at node-1, starts at {}", first.id));
        }
        let mut seen = HashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(format!("duplicate node id {}", node.id));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoScript {
    pub title: String,
    pub hook: String,
    pub body: String,
    pub cta: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarouselOutline {
    pub title: String,
    pub slides: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganicPlan {
    pub viral_hooks: Vec<String>,
    pub video_scripts: Vec<VideoScript>,
    #[serde(default)]
    pub carousel_outlines: Vec<CarouselOutline>,
}

impl StructuredOutput for OrganicPlan {
    const KIND: &'static str = "organic content";

    fn validate(&self) -> std::result::Result<(), String> {
        if self.viral_hooks.is_empty() {
            return Err("no viral hooks".to_string());
        }
        if self.video_scripts.is_empty() {
            return Err("no video scripts".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdTeardown {
    pub psychology: String,
    pub hook_visual: String,
    pub hook_textual: String,
    pub offer: String,
    pub replication_framework: Vec<String>,
    pub suggested_copy: String,
}

impl StructuredOutput for AdTeardown {
    const KIND: &'static str = "ad analysis";

    fn validate(&self) -> std::result::Result<(), String> {
        require_text("psychology", &self.psychology)?;
        require_text("suggestedCopy", &self.suggested_copy)
    }
}

/// Client-facing report. Keys stay in Spanish because the dashboard renders
/// them as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    #[serde(rename = "resumenEjecutivo")]
    pub executive_summary: String,
    #[serde(rename = "puntosPositivos", default)]
    pub strengths: Vec<String>,
    #[serde(rename = "oportunidadesMejora", default)]
    pub opportunities: Vec<String>,
}

impl StructuredOutput for PerformanceReport {
    const KIND: &'static str = "performance report";

    fn validate(&self) -> std::result::Result<(), String> {
        require_text("resumenEjecutivo", &self.executive_summary)
    }
}
