use smart_ads::diagnosis::FunnelStage;
use smart_ads::{diagnose, diagnose_with, DiagnosisThresholds, MetricsInput, StageStatus};

fn metrics(ctr: f64, cpm: f64, cpc: f64, cost_per_result: f64, results: f64) -> MetricsInput {
    MetricsInput {
        cpm,
        ctr,
        cpc,
        cost_per_result,
        results,
        spend: cost_per_result * results,
        roas: None,
    }
}

#[test]
fn low_ctr_is_an_attraction_danger() {
    let diagnosis = diagnose(&metrics(0.5, 10.0, 0.5, 5.0, 10.0));
    assert_eq!(diagnosis.attraction.status, StageStatus::Danger);
    assert_eq!(diagnosis.consideration.status, StageStatus::Success);
    assert_eq!(diagnosis.conversion.status, StageStatus::Success);
    assert_eq!(diagnosis.overall, StageStatus::Danger);
}

#[test]
fn healthy_funnel_is_all_success() {
    let diagnosis = diagnose(&metrics(2.0, 5.0, 0.3, 2.0, 50.0));
    for verdict in diagnosis.stages() {
        assert_eq!(verdict.status, StageStatus::Success);
        assert!(!verdict.recommendations.is_empty());
    }
    assert_eq!(diagnosis.overall, StageStatus::Success);
}

#[test]
fn warnings_alone_do_not_escalate_overall_status() {
    let diagnosis = diagnose(&metrics(2.0, 20.0, 1.2, 5.0, 10.0));
    assert_eq!(diagnosis.attraction.status, StageStatus::Warning);
    assert_eq!(diagnosis.consideration.status, StageStatus::Warning);
    assert_eq!(diagnosis.conversion.status, StageStatus::Success);
    assert_eq!(diagnosis.overall, StageStatus::Success);
}

#[test]
fn low_ctr_takes_precedence_over_high_cpm() {
    let diagnosis = diagnose(&metrics(0.8, 40.0, 0.5, 5.0, 10.0));
    assert_eq!(diagnosis.attraction.status, StageStatus::Danger);
}

#[test]
fn zero_results_or_expensive_results_are_a_conversion_danger() {
    let no_results = diagnose(&metrics(2.0, 5.0, 0.3, 0.0, 0.0));
    assert_eq!(no_results.conversion.status, StageStatus::Danger);
    assert_eq!(no_results.overall, StageStatus::Danger);

    let expensive = diagnose(&metrics(2.0, 5.0, 0.3, 10.01, 4.0));
    assert_eq!(expensive.conversion.status, StageStatus::Danger);

    let at_limit = diagnose(&metrics(2.0, 5.0, 0.3, 10.0, 4.0));
    assert_eq!(at_limit.conversion.status, StageStatus::Success);
}

#[test]
fn thresholds_are_inclusive_boundaries() {
    let diagnosis = diagnose(&metrics(1.0, 15.0, 0.8, 10.0, 1.0));
    assert_eq!(diagnosis.attraction.status, StageStatus::Success);
    assert_eq!(diagnosis.consideration.status, StageStatus::Success);
    assert_eq!(diagnosis.conversion.status, StageStatus::Success);
}

#[test]
fn custom_thresholds_shift_the_verdicts() {
    let thresholds = DiagnosisThresholds {
        min_ctr_pct: 2.5,
        max_cpm: 30.0,
        max_cpc: 2.0,
        max_cost_per_result: 50.0,
    };
    let diagnosis = diagnose_with(&metrics(2.0, 20.0, 1.2, 40.0, 3.0), &thresholds);
    assert_eq!(diagnosis.attraction.status, StageStatus::Danger);
    assert_eq!(diagnosis.consideration.status, StageStatus::Success);
    assert_eq!(diagnosis.conversion.status, StageStatus::Success);
}

#[test]
fn stages_are_reported_in_funnel_order() {
    let diagnosis = diagnose(&metrics(2.0, 5.0, 0.3, 2.0, 50.0));
    let order: Vec<FunnelStage> = diagnosis.stages().iter().map(|verdict| verdict.stage).collect();
    assert_eq!(
        order,
        vec![FunnelStage::Attraction, FunnelStage::Consideration, FunnelStage::Conversion]
    );
}

#[test]
fn metrics_payload_accepts_cpr_alias_and_missing_fields() {
    let parsed: MetricsInput =
        serde_json::from_str(r#"{"cpm": 12.5, "ctr": 1.8, "cpr": 4.2, "results": 7}"#)
            .expect("metrics json");
    assert_eq!(parsed.cost_per_result, 4.2);
    assert_eq!(parsed.cpc, 0.0);
    assert_eq!(parsed.results, 7.0);
    assert_eq!(parsed.roas, None);
}

#[test]
fn diagnosis_serializes_lowercase_statuses() {
    let diagnosis = diagnose(&metrics(0.5, 10.0, 0.5, 5.0, 10.0));
    let value = serde_json::to_value(&diagnosis).expect("serialize");
    assert_eq!(value["overall"], "danger");
    assert_eq!(value["attraction"]["status"], "danger");
    assert!(value["consideration"]["recommendations"].is_array());
}

#[test]
fn metrics_payload_accepts_form_strings() {
    let parsed: MetricsInput = serde_json::from_str(
        r#"{"cpm": "8.50", "ctr": "1.2", "cpc": "0.35", "costPerResult": "4", "results": "12", "spend": "", "roas": ""}"#,
    )
    .expect("form metrics");
    assert_eq!(parsed.cpm, 8.5);
    assert_eq!(parsed.ctr, 1.2);
    assert_eq!(parsed.cost_per_result, 4.0);
    assert_eq!(parsed.results, 12.0);
    assert_eq!(parsed.spend, 0.0);
    assert_eq!(parsed.roas, None);

    let diagnosis = diagnose(&parsed);
    assert_eq!(diagnosis.overall, StageStatus::Success);
}

#[test]
fn explanations_quote_the_thresholds_in_use() {
    let defaults = diagnose(&metrics(0.5, 10.0, 0.5, 5.0, 0.0));
    assert!(defaults.attraction.explanation.contains("under 1%"));
    assert!(defaults.conversion.explanation.contains("over $10"));

    let thresholds = DiagnosisThresholds {
        min_ctr_pct: 2.5,
        max_cpm: 30.0,
        max_cpc: 0.4,
        max_cost_per_result: 50.0,
    };
    let custom = diagnose_with(&metrics(2.0, 20.0, 1.2, 60.0, 3.0), &thresholds);
    assert!(custom.attraction.explanation.contains("under 2.5%"));
    assert!(custom.consideration.explanation.contains("over $0.4"));
    assert!(custom.conversion.explanation.contains("over $50"));
}
