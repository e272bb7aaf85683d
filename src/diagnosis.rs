use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Success,
    Warning,
    Danger,
}

impl StageStatus {
    pub fn label(self) -> &'static str {
        match self {
            StageStatus::Success => "success",
            StageStatus::Warning => "warning",
            StageStatus::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunnelStage {
    Attraction,
    Consideration,
    Conversion,
}

impl FunnelStage {
    pub fn title(self) -> &'static str {
        match self {
            FunnelStage::Attraction => "1. Attraction stage (social feed)",
            FunnelStage::Consideration => "2. Consideration stage (ad to page bridge)",
            FunnelStage::Conversion => "3. Conversion stage (landing page)",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricsInput {
    #[serde(deserialize_with = "crate::lenient::number")]
    pub cpm: f64,
    #[serde(deserialize_with = "crate::lenient::number")]
    pub ctr: f64,
    #[serde(deserialize_with = "crate::lenient::number")]
    pub cpc: f64,
    #[serde(alias = "cpr", deserialize_with = "crate::lenient::number")]
    pub cost_per_result: f64,
    #[serde(deserialize_with = "crate::lenient::number")]
    pub results: f64,
    #[serde(deserialize_with = "crate::lenient::number")]
    pub spend: f64,
    #[serde(deserialize_with = "crate::lenient::optional_number")]
    pub roas: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosisThresholds {
    pub min_ctr_pct: f64,
    pub max_cpm: f64,
    pub max_cpc: f64,
    pub max_cost_per_result: f64,
}

impl Default for DiagnosisThresholds {
    fn default() -> Self {
        Self {
            min_ctr_pct: 1.0,
            max_cpm: 15.0,
            max_cpc: 0.8,
            max_cost_per_result: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageVerdict {
    pub stage: FunnelStage,
    pub name: String,
    pub status: StageStatus,
    pub explanation: String,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    pub attraction: StageVerdict,
    pub consideration: StageVerdict,
    pub conversion: StageVerdict,
    pub overall: StageStatus,
    pub summary: String,
}

impl Diagnosis {
    pub fn stages(&self) -> [&StageVerdict; 3] {
        [&self.attraction, &self.consideration, &self.conversion]
    }
}

pub fn diagnose(metrics: &MetricsInput) -> Diagnosis {
    diagnose_with(metrics, &DiagnosisThresholds::default())
}

/// Classifies each funnel stage against `thresholds`; explanations quote them.
///
/// Only a `Danger` stage turns the overall verdict to `Danger`; a campaign with
/// warnings alone is reported as `Success`.
pub fn diagnose_with(metrics: &MetricsInput, thresholds: &DiagnosisThresholds) -> Diagnosis {
    let attraction = attraction_verdict(metrics, thresholds);
    let consideration = consideration_verdict(metrics, thresholds);
    let conversion = conversion_verdict(metrics, thresholds);

    let any_danger = [&attraction, &consideration, &conversion]
        .iter()
        .any(|verdict| verdict.status == StageStatus::Danger);
    let overall = if any_danger {
        StageStatus::Danger
    } else {
        StageStatus::Success
    };
    let summary = match overall {
        StageStatus::Danger => {
            "There are critical stages in your funnel leaking money or inflating your results. \
             Review them carefully below."
        }
        _ => "Your campaign and funnel are flowing well. Great message-to-market fit.",
    };

    Diagnosis {
        attraction,
        consideration,
        conversion,
        overall,
        summary: summary.to_string(),
    }
}

fn attraction_verdict(metrics: &MetricsInput, thresholds: &DiagnosisThresholds) -> StageVerdict {
    if metrics.ctr < thresholds.min_ctr_pct {
        return verdict(
            FunnelStage::Attraction,
            StageStatus::Danger,
            &format!(
                "CTR is very low (under {}%). People are not drawn to click the ad.",
                thresholds.min_ctr_pct
            ),
            &[
                "Test new visual or text hooks in the first 3 seconds.",
                "Change the angle or make the promise in the copy more emphatic.",
            ],
        );
    }
    if metrics.cpm > thresholds.max_cpm {
        return verdict(
            FunnelStage::Attraction,
            StageStatus::Warning,
            &format!(
                "CPM is high (over ${}). You are competing in an expensive auction or the \
                 audience is deceptively small or saturated.",
                thresholds.max_cpm
            ),
            &[
                "Widen the audience with open (broad) targeting or expansive lookalikes.",
                "Refresh creatives to raise your relevance with Meta.",
            ],
        );
    }
    verdict(
        FunnelStage::Attraction,
        StageStatus::Success,
        "The ad captures attention well at a reasonable impression cost.",
        &["Keep similar creatives and the same communication angle."],
    )
}

fn consideration_verdict(metrics: &MetricsInput, thresholds: &DiagnosisThresholds) -> StageVerdict {
    if metrics.cpc > thresholds.max_cpc {
        return verdict(
            FunnelStage::Consideration,
            StageStatus::Warning,
            &format!(
                "You are paying a lot for each individual visitor to the page (CPC over ${}).",
                thresholds.max_cpc
            ),
            &[
                "CTR drives this directly: design creatives that invite the click to lower CPC.",
                "Write clearer calls to action that send people to the site.",
            ],
        );
    }
    verdict(
        FunnelStage::Consideration,
        StageStatus::Success,
        "Traffic to the page is cheap (good CPC). The ad-to-page bridge works.",
        &["Scale by adding light visual variations to keep CPC low."],
    )
}

fn conversion_verdict(metrics: &MetricsInput, thresholds: &DiagnosisThresholds) -> StageVerdict {
    if metrics.results == 0.0 || metrics.cost_per_result > thresholds.max_cost_per_result {
        return verdict(
            FunnelStage::Conversion,
            StageStatus::Danger,
            &format!(
                "People click but do not finish the purchase or sign-up. Cost per result is high \
                 (over ${}) or results are low.",
                thresholds.max_cost_per_result
            ),
            &[
                "Make sure the ad promise matches exactly what the landing page shows.",
                "Improve page load speed, a critical leak point.",
                "Add natural scarcity, urgency and social proof.",
            ],
        );
    }
    verdict(
        FunnelStage::Conversion,
        StageStatus::Success,
        "Cost per result is profitable with good conversion volume.",
        &["The campaign can scale. Raise the daily budget by 20%."],
    )
}

fn verdict(
    stage: FunnelStage,
    status: StageStatus,
    explanation: &str,
    recommendations: &[&str],
) -> StageVerdict {
    StageVerdict {
        stage,
        name: stage.title().to_string(),
        status,
        explanation: explanation.to_string(),
        recommendations: recommendations.iter().map(|r| r.to_string()).collect(),
    }
}
