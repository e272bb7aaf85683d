use smart_ads::structure::CBO_BUDGET_THRESHOLD;
use smart_ads::{
    generate_structure, CampaignObjective, CampaignPhase, CampaignStructure, CampaignTier, Currency,
    PixelMaturity, StructureInputs,
};

const OBJECTIVES: [CampaignObjective; 3] = [
    CampaignObjective::Messages,
    CampaignObjective::Leads,
    CampaignObjective::Sales,
];
const PHASES: [CampaignPhase; 2] = [CampaignPhase::Testing, CampaignPhase::Scaling];

fn inputs(objective: CampaignObjective, phase: CampaignPhase, daily_budget: f64) -> StructureInputs {
    StructureInputs {
        objective,
        daily_budget,
        currency: Currency::Usd,
        pixel_maturity: PixelMaturity::Cold,
        phase,
    }
}

fn set_shape(structure: &CampaignStructure, tier: CampaignTier) -> Vec<usize> {
    structure
        .campaigns
        .iter()
        .find(|campaign| campaign.tier == tier)
        .map(|campaign| campaign.ad_sets.iter().map(|set| set.ads.len()).collect())
        .unwrap_or_default()
}

#[test]
fn tiers_always_split_seventy_twenty_ten() {
    for objective in OBJECTIVES {
        for phase in PHASES {
            for budget in [0.0, 20.0, 51.0, 333.33, 1_000_000.0] {
                let structure = generate_structure(&inputs(objective, phase, budget));
                let shares: Vec<u32> = structure.campaigns.iter().map(|c| c.share_pct).collect();
                assert_eq!(shares, vec![70, 20, 10]);

                let total: f64 = structure.campaigns.iter().map(|c| c.budget).sum();
                assert!((total - budget).abs() < 1e-6 * budget.max(1.0));
                assert!((structure.campaigns[0].budget - budget * 0.7).abs() < 1e-9 * budget.max(1.0));
            }
        }
    }
}

#[test]
fn budgets_split_evenly_down_the_tree() {
    let structure = generate_structure(&inputs(
        CampaignObjective::Messages,
        CampaignPhase::Testing,
        30.0,
    ));
    for campaign in &structure.campaigns {
        let set_total: f64 = campaign.ad_sets.iter().map(|set| set.budget).sum();
        assert!((set_total - campaign.budget).abs() < 1e-9);
        for ad_set in &campaign.ad_sets {
            let ad_total: f64 = ad_set.ads.iter().map(|ad| ad.budget).sum();
            assert!((ad_total - ad_set.budget).abs() < 1e-9);
        }
    }

    let prospecting = &structure.campaigns[0];
    assert!((prospecting.ad_sets[0].budget - 7.0).abs() < 1e-9);
    assert_eq!(prospecting.ad_sets[0].budget_label, "$7.00");
    assert_eq!(prospecting.ad_sets[0].ads[0].name, "Ad 1");
}

#[test]
fn playbook_shapes_follow_objective_and_phase() {
    let messages_testing = generate_structure(&inputs(CampaignObjective::Messages, CampaignPhase::Testing, 20.0));
    assert_eq!(set_shape(&messages_testing, CampaignTier::Prospecting), vec![3, 3, 3]);
    assert_eq!(set_shape(&messages_testing, CampaignTier::ReEngagement), vec![2]);
    assert_eq!(set_shape(&messages_testing, CampaignTier::Retargeting), vec![2]);

    let messages_scaling = generate_structure(&inputs(CampaignObjective::Messages, CampaignPhase::Scaling, 20.0));
    assert_eq!(set_shape(&messages_scaling, CampaignTier::Prospecting), vec![5, 4]);

    let leads_scaling = generate_structure(&inputs(CampaignObjective::Leads, CampaignPhase::Scaling, 20.0));
    assert_eq!(set_shape(&leads_scaling, CampaignTier::Prospecting), vec![6]);
    assert_eq!(set_shape(&leads_scaling, CampaignTier::Retargeting), vec![3]);

    let sales_scaling = generate_structure(&inputs(CampaignObjective::Sales, CampaignPhase::Scaling, 20.0));
    assert_eq!(set_shape(&sales_scaling, CampaignTier::Prospecting), vec![6]);
    assert_eq!(set_shape(&sales_scaling, CampaignTier::Retargeting), vec![4]);
    assert_eq!(
        sales_scaling.campaigns[2].ad_sets[0].name,
        "Dynamic catalog ads (DPA)"
    );
}

#[test]
fn cbo_needs_multiple_prospecting_sets_and_budget_above_threshold() {
    let above = generate_structure(&inputs(CampaignObjective::Messages, CampaignPhase::Scaling, 100.0));
    assert!(above.campaigns[0].cbo_eligible);
    assert!(!above.campaigns[1].cbo_eligible);
    assert!(!above.campaigns[2].cbo_eligible);

    let at_threshold = generate_structure(&inputs(
        CampaignObjective::Messages,
        CampaignPhase::Scaling,
        CBO_BUDGET_THRESHOLD,
    ));
    assert!(!at_threshold.campaigns[0].cbo_eligible);

    let single_set = generate_structure(&inputs(CampaignObjective::Leads, CampaignPhase::Scaling, 100.0));
    assert!(!single_set.campaigns[0].cbo_eligible);
}

#[test]
fn identical_inputs_give_identical_trees() {
    for objective in OBJECTIVES {
        for phase in PHASES {
            let request = inputs(objective, phase, 75.0);
            assert_eq!(generate_structure(&request), generate_structure(&request));
        }
    }
}

#[test]
fn pixel_maturity_is_echoed_without_changing_allocation() {
    let cold = inputs(CampaignObjective::Sales, CampaignPhase::Testing, 80.0);
    let mut warm = cold.clone();
    warm.pixel_maturity = PixelMaturity::Warm;

    let cold_structure = generate_structure(&cold);
    let warm_structure = generate_structure(&warm);
    assert_eq!(cold_structure.campaigns, warm_structure.campaigns);
    assert_eq!(warm_structure.inputs.pixel_maturity, PixelMaturity::Warm);
}

#[test]
fn cop_labels_use_compact_grouped_style() {
    let mut request = inputs(CampaignObjective::Messages, CampaignPhase::Testing, 100_000.0);
    request.currency = Currency::Cop;
    let structure = generate_structure(&request);
    assert_eq!(structure.campaigns[0].budget_label, "COP $70.000");
    assert_eq!(structure.campaigns[2].budget_label, "COP $10.000");
}

#[test]
fn negative_or_nan_budget_allocates_nothing() {
    for budget in [-50.0, f64::NAN] {
        let structure = generate_structure(&inputs(CampaignObjective::Leads, CampaignPhase::Testing, budget));
        assert!(structure.campaigns.iter().all(|campaign| campaign.budget == 0.0));
        assert!(structure.campaigns.iter().all(|campaign| !campaign.cbo_eligible));
        assert_eq!(structure.inputs.daily_budget, 0.0);

        let json = serde_json::to_value(&structure).expect("serialize");
        assert_eq!(json["inputs"]["dailyBudget"], 0.0);
    }
}

#[test]
fn spanish_aliases_parse() {
    assert_eq!(CampaignObjective::from_str("mensajes"), Some(CampaignObjective::Messages));
    assert_eq!(CampaignObjective::from_str("conversiones"), Some(CampaignObjective::Sales));
    assert_eq!(CampaignPhase::from_str("escalado"), Some(CampaignPhase::Scaling));
    assert_eq!(PixelMaturity::from_str("avanzado"), Some(PixelMaturity::Warm));
    assert_eq!(CampaignObjective::from_str("traffic"), None);
}
