use serde::{Deserialize, Serialize};

use crate::Currency;

/// Daily budget above which a multi-set prospecting tier is flagged for CBO.
pub const CBO_BUDGET_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CampaignObjective {
    #[default]
    Messages,
    Leads,
    Sales,
}

impl CampaignObjective {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "messages" | "mensajes" => Some(CampaignObjective::Messages),
            "leads" => Some(CampaignObjective::Leads),
            "sales" | "conversiones" | "conversions" => Some(CampaignObjective::Sales),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CampaignPhase {
    #[default]
    Testing,
    Scaling,
}

impl CampaignPhase {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "testing" | "testeo" => Some(CampaignPhase::Testing),
            "scaling" | "escalado" => Some(CampaignPhase::Scaling),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PixelMaturity {
    #[default]
    Cold,
    Warm,
}

impl PixelMaturity {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "cold" | "principiante" | "new" => Some(PixelMaturity::Cold),
            "warm" | "avanzado" | "mature" => Some(PixelMaturity::Warm),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CampaignTier {
    Prospecting,
    ReEngagement,
    Retargeting,
}

impl CampaignTier {
    pub const ALL: [CampaignTier; 3] = [
        CampaignTier::Prospecting,
        CampaignTier::ReEngagement,
        CampaignTier::Retargeting,
    ];

    /// Fixed percentage of the daily budget, independent of the inputs.
    pub fn percent(self) -> u32 {
        match self {
            CampaignTier::Prospecting => 70,
            CampaignTier::ReEngagement => 20,
            CampaignTier::Retargeting => 10,
        }
    }

    pub fn share(self) -> f64 {
        self.percent() as f64 / 100.0
    }

    pub fn title(self) -> &'static str {
        match self {
            CampaignTier::Prospecting => "Campaign 1: Prospecting (Cold)",
            CampaignTier::ReEngagement => "Campaign 2: Re-Engagement (Warm)",
            CampaignTier::Retargeting => "Campaign 3: Retargeting (Hot)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureInputs {
    pub objective: CampaignObjective,
    pub daily_budget: f64,
    pub currency: Currency,
    pub pixel_maturity: PixelMaturity,
    pub phase: CampaignPhase,
}

impl Default for StructureInputs {
    fn default() -> Self {
        Self {
            objective: CampaignObjective::Messages,
            daily_budget: 20.0,
            currency: Currency::Usd,
            pixel_maturity: PixelMaturity::Cold,
            phase: CampaignPhase::Testing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ad {
    pub name: String,
    pub budget: f64,
    pub budget_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdSet {
    pub name: String,
    pub budget: f64,
    pub budget_label: String,
    pub ads: Vec<Ad>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub tier: CampaignTier,
    pub title: String,
    pub share_pct: u32,
    pub budget: f64,
    pub budget_label: String,
    pub cbo_eligible: bool,
    pub ad_sets: Vec<AdSet>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignStructure {
    pub inputs: StructureInputs,
    pub objective_summary: String,
    pub rationale: String,
    pub campaigns: Vec<Campaign>,
}

struct AudienceSet {
    name: &'static str,
    ads: usize,
}

const fn set(name: &'static str, ads: usize) -> AudienceSet {
    AudienceSet { name, ads }
}

struct Playbook {
    summary: &'static str,
    rationale: &'static str,
    prospecting: &'static [AudienceSet],
    re_engagement: &'static [AudienceSet],
    retargeting: &'static [AudienceSet],
}

impl Playbook {
    fn sets(&self, tier: CampaignTier) -> &'static [AudienceSet] {
        match tier {
            CampaignTier::Prospecting => self.prospecting,
            CampaignTier::ReEngagement => self.re_engagement,
            CampaignTier::Retargeting => self.retargeting,
        }
    }
}

const MESSAGES_SUMMARY: &str = "Optimized for conversations by message (WhatsApp/IG)";
const LEADS_SUMMARY: &str = "Optimized for B2B or high-ticket lead capture";
const SALES_SUMMARY: &str = "Optimized for e-commerce sales (Conversions API)";

const MESSAGES_WARM: &[AudienceSet] = &[set("Engaged 90d", 2)];
const MESSAGES_HOT: &[AudienceSet] = &[set("Previous messages (questions)", 2)];
const LEADS_WARM: &[AudienceSet] = &[set("Landing page visitors", 2)];
const LEADS_HOT: &[AudienceSet] = &[set("Opened form without submitting", 3)];
const SALES_WARM: &[AudienceSet] = &[set("ViewContent / AddToCart 90d", 2)];
const SALES_HOT: &[AudienceSet] = &[set("Dynamic catalog ads (DPA)", 4)];

static MESSAGES_TESTING: Playbook = Playbook {
    summary: MESSAGES_SUMMARY,
    rationale: "In the testing phase we look for the winning angle and audience. 70% secures \
                discovery across several ABO sets while the remaining 30% targets people who \
                engaged but never wrote.",
    prospecting: &[
        set("Direct interests 1 (ABO)", 3),
        set("Direct interests 2 (ABO)", 3),
        set("Lookalike 1% (ABO)", 3),
    ],
    re_engagement: MESSAGES_WARM,
    retargeting: MESSAGES_HOT,
};

static MESSAGES_SCALING: Playbook = Playbook {
    summary: MESSAGES_SUMMARY,
    rationale: "In the scaling phase we consolidate budget on the winners. 70% goes to CBO \
                campaigns with broad audiences and 30% reinforces conversions with hot \
                retargeting.",
    prospecting: &[
        set("Open / Broad (winning CBO)", 5),
        set("Lookalike 1-3% (CBO)", 4),
    ],
    re_engagement: MESSAGES_WARM,
    retargeting: MESSAGES_HOT,
};

static LEADS_TESTING: Playbook = Playbook {
    summary: LEADS_SUMMARY,
    rationale: "B2B testing validates the lead magnet. 70% is spread over varied ABO \
                segmentations to find the cheapest qualified lead.",
    prospecting: &[
        set("Authority interest 1 (ABO)", 3),
        set("Industry interest 2 (ABO)", 3),
        set("Segmented broad (ABO)", 3),
    ],
    re_engagement: LEADS_WARM,
    retargeting: LEADS_HOT,
};

static LEADS_SCALING: Playbook = Playbook {
    summary: LEADS_SUMMARY,
    rationale: "B2B scaling concentrates budget (CBO) on the audiences already bringing leads \
                at a good cost. Retargeting (30%) shows strong authority and testimonials to \
                close.",
    prospecting: &[set("Lead lookalike + broad (CBO)", 6)],
    re_engagement: LEADS_WARM,
    retargeting: LEADS_HOT,
};

static SALES_TESTING: Playbook = Playbook {
    summary: SALES_SUMMARY,
    rationale: "E-commerce testing: 70% funds ABO campaigns trying new creatives and angles \
                over separate interests and lookalikes to isolate variables.",
    prospecting: &[
        set("Main interest", 3),
        set("Buyers lookalike 1%", 3),
        set("Secondary interest", 3),
    ],
    re_engagement: SALES_WARM,
    retargeting: SALES_HOT,
};

static SALES_SCALING: Playbook = Playbook {
    summary: SALES_SUMMARY,
    rationale: "E-commerce scaling pushes the algorithm: 70% goes straight to Advantage+ \
                Shopping or open CBO with validated creatives, 30% runs aggressive catalog \
                (DPA) retargeting.",
    prospecting: &[set("Advantage+ Shopping (CBO)", 6)],
    re_engagement: SALES_WARM,
    retargeting: SALES_HOT,
};

fn playbook(objective: CampaignObjective, phase: CampaignPhase) -> &'static Playbook {
    match (objective, phase) {
        (CampaignObjective::Messages, CampaignPhase::Testing) => &MESSAGES_TESTING,
        (CampaignObjective::Messages, CampaignPhase::Scaling) => &MESSAGES_SCALING,
        (CampaignObjective::Leads, CampaignPhase::Testing) => &LEADS_TESTING,
        (CampaignObjective::Leads, CampaignPhase::Scaling) => &LEADS_SCALING,
        (CampaignObjective::Sales, CampaignPhase::Testing) => &SALES_TESTING,
        (CampaignObjective::Sales, CampaignPhase::Scaling) => &SALES_SCALING,
    }
}

/// Lays out the three-tier campaign tree for a daily budget.
///
/// Budgets split evenly at every level: tier budget across its ad sets, ad
/// set budget across its ads. A negative or non-finite budget is treated as
/// zero and echoed back that way. Pixel maturity is echoed back in `inputs`
/// but does not change the allocation.
pub fn generate_structure(inputs: &StructureInputs) -> CampaignStructure {
    let daily_budget = if inputs.daily_budget.is_finite() {
        inputs.daily_budget.max(0.0)
    } else {
        0.0
    };
    let playbook = playbook(inputs.objective, inputs.phase);

    let campaigns = CampaignTier::ALL
        .iter()
        .map(|tier| build_campaign(*tier, playbook.sets(*tier), daily_budget, inputs.currency))
        .collect();

    CampaignStructure {
        inputs: StructureInputs {
            daily_budget,
            ..inputs.clone()
        },
        objective_summary: playbook.summary.to_string(),
        rationale: playbook.rationale.to_string(),
        campaigns,
    }
}

fn build_campaign(
    tier: CampaignTier,
    sets: &[AudienceSet],
    daily_budget: f64,
    currency: Currency,
) -> Campaign {
    let budget = daily_budget * tier.share();
    let cbo_eligible = sets.len() > 1
        && tier == CampaignTier::Prospecting
        && daily_budget > CBO_BUDGET_THRESHOLD;
    let set_budget = budget / sets.len().max(1) as f64;

    let ad_sets = sets
        .iter()
        .map(|audience| {
            let ad_budget = set_budget / audience.ads.max(1) as f64;
            let ads = (1..=audience.ads)
                .map(|index| Ad {
                    name: format!("Ad {}", index),
                    budget: ad_budget,
                    budget_label: currency.format_compact(ad_budget),
                })
                .collect();
            AdSet {
                name: audience.name.to_string(),
                budget: set_budget,
                budget_label: currency.format_compact(set_budget),
                ads,
            }
        })
        .collect();

    Campaign {
        tier,
        title: tier.title().to_string(),
        share_pct: tier.percent(),
        budget,
        budget_label: currency.format_compact(budget),
        cbo_eligible,
        ad_sets,
    }
}
