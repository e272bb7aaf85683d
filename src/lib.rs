pub mod access;
pub mod budget;
pub mod config;
pub mod currency;
pub mod diagnosis;
pub mod error;
pub mod lenient;
pub mod llm;
pub mod meta_api;
pub mod structure;
pub mod workspace;

pub use access::{authorize, Capability, Role};
pub use budget::{compute_budget, BudgetInputs, BudgetReport, BudgetResult, TrafficObjective};
pub use currency::Currency;
pub use diagnosis::{diagnose, diagnose_with, Diagnosis, DiagnosisThresholds, MetricsInput, StageStatus};
pub use error::{Result, SmartAdsError};
pub use structure::{
    generate_structure, CampaignObjective, CampaignPhase, CampaignStructure, CampaignTier,
    PixelMaturity, StructureInputs,
};

/// Groups the integer digits of `value` in threes with `separator`.
pub fn group_digits(value: u64, separator: char) -> String {
    let mut chars: Vec<char> = value.to_string().chars().collect();
    let mut result = String::new();
    let mut count = 0usize;

    while let Some(ch) = chars.pop() {
        if count == 3 {
            result.push(separator);
            count = 0;
        }
        result.push(ch);
        count += 1;
    }

    result.chars().rev().collect()
}

pub fn format_number(value: f64) -> String {
    let rounded = value.round().max(0.0) as u64;
    group_digits(rounded, ',')
}

pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

pub fn format_float(value: f64, digits: usize) -> String {
    format!("{:.1$}", value, digits)
}

pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
