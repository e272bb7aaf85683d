use smart_ads::llm::prompts::{
    ad_copy_prompt, business_coach_prompt, metrics_analyst_prompt, CopyBrief, MetricsContext,
    COPY_ANGLES,
};
use smart_ads::llm::schema::{
    extract_json, strip_fences, AdTeardown, ChatFlow, CopyAssets, FlowNodeKind, PerformanceReport,
};
use smart_ads::llm::{build_conversation, parse_structured, HistoryMessage, Speaker};
use smart_ads::workspace::BusinessProfile;
use smart_ads::SmartAdsError;

fn msg(role: &str, content: &str) -> HistoryMessage {
    HistoryMessage {
        role: role.to_string(),
        content: content.to_string(),
    }
}

const REPORT_JSON: &str = r#"{
  "resumenEjecutivo": "Buen mes.",
  "puntosPositivos": ["CTR sólido"],
  "oportunidadesMejora": ["Bajar CPM"]
}"#;

#[test]
fn fences_are_stripped_before_parsing() {
    let fenced = format!("```json\n{}\n```", REPORT_JSON);
    assert!(strip_fences(&fenced).starts_with('{'));
    assert!(strip_fences(&fenced).ends_with('}'));

    let bare_fence = format!("```\n{}\n```", REPORT_JSON);
    let report: PerformanceReport = parse_structured(&bare_fence).expect("report");
    assert_eq!(report.executive_summary, "Buen mes.");
    assert_eq!(report.strengths, vec!["CTR sólido".to_string()]);
    assert_eq!(report.opportunities.len(), 1);
}

#[test]
fn json_object_is_extracted_from_surrounding_prose() {
    let noisy = format!("Here is your report:\n{}\nHope it helps!", REPORT_JSON);
    assert!(extract_json(&noisy).is_some());
    let report: PerformanceReport = parse_structured(&noisy).expect("report");
    assert_eq!(report.executive_summary, "Buen mes.");
    assert!(extract_json("no json here").is_none());
}

#[test]
fn schema_mismatch_is_a_malformed_output_error() {
    let missing = r#"{"puntosPositivos": []}"#;
    match parse_structured::<PerformanceReport>(missing) {
        Err(SmartAdsError::MalformedOutput { kind, .. }) => assert_eq!(kind, "performance report"),
        other => panic!("expected malformed output, got {:?}", other.map(|_| ())),
    }

    let empty_summary = r#"{"resumenEjecutivo": "  "}"#;
    assert!(matches!(
        parse_structured::<PerformanceReport>(empty_summary),
        Err(SmartAdsError::MalformedOutput { .. })
    ));

    assert!(matches!(
        parse_structured::<PerformanceReport>("sorry, I can't help with that"),
        Err(SmartAdsError::MalformedOutput { .. })
    ));
}

#[test]
fn copy_assets_require_all_twenty_angles() {
    let angles: Vec<String> = COPY_ANGLES
        .iter()
        .map(|name| format!(r#"{{"name": "{}", "copy": "Texto para {}"}}"#, name, name))
        .collect();
    let full = format!(
        r#"{{"angles": [{}], "hooks": ["a"], "scripts": ["b"], "ctas": ["c"]}}"#,
        angles.join(",")
    );
    let assets: CopyAssets = parse_structured(&full).expect("copy assets");
    assert_eq!(assets.angles.len(), 20);
    assert_eq!(assets.angles[0].name, COPY_ANGLES[0]);

    let short = format!(r#"{{"angles": [{}]}}"#, angles[..19].join(","));
    assert!(matches!(
        parse_structured::<CopyAssets>(&short),
        Err(SmartAdsError::MalformedOutput { .. })
    ));
}

#[test]
fn chat_flow_must_start_at_node_one() {
    let valid = r#"{
      "title": "Captación",
      "trigger": "Comenta PRECIO",
      "strategyRationale": "Corto y directo",
      "nodes": [
        {"id": "node-1", "type": "message", "text": "Hola", "options": [{"text": "Info", "nextId": "node-2"}]},
        {"id": "node-2", "type": "collect_data", "text": "Tu WhatsApp?"},
        {"id": "node-3", "type": "action", "text": "[INTERNAL ACTION]", "options": []}
      ]
    }"#;
    let flow: ChatFlow = parse_structured(valid).expect("flow");
    assert_eq!(flow.nodes[1].kind, FlowNodeKind::CollectData);
    assert!(flow.nodes[1].options.is_empty());
    assert_eq!(flow.nodes[0].options[0].next_id, "node-2");

    let wrong_start = valid.replace("\"id\": \"node-1\"", "\"id\": \"start\"");
    assert!(matches!(
        parse_structured::<ChatFlow>(&wrong_start),
        Err(SmartAdsError::MalformedOutput { .. })
    ));

    let duplicated = valid.replace("\"id\": \"node-3\"", "\"id\": \"node-2\"");
    assert!(matches!(
        parse_structured::<ChatFlow>(&duplicated),
        Err(SmartAdsError::MalformedOutput { .. })
    ));
}

#[test]
fn ad_teardown_reads_camel_case_keys() {
    let raw = r#"{
      "psychology": "Estatus",
      "hookVisual": "Rostro grande",
      "hookTextual": "¿Cansado de...?",
      "offer": "2x1",
      "replicationFramework": ["Paso 1", "Paso 2"],
      "suggestedCopy": "Copy de ejemplo"
    }"#;
    let teardown: AdTeardown = parse_structured(raw).expect("teardown");
    assert_eq!(teardown.hook_visual, "Rostro grande");
    assert_eq!(teardown.replication_framework.len(), 2);
}

#[test]
fn history_roles_map_and_consecutive_turns_merge() {
    let history = vec![
        msg("user", "Hola"),
        msg("ai", "¡Hola!"),
        msg("assistant", "¿En qué te ayudo?"),
        msg("user", "Mi CTR es bajo"),
    ];
    let conversation = build_conversation(&history, Some("¿Qué hago?")).expect("conversation");

    let turns: Vec<_> = conversation.turns().collect();
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[0].speaker, Speaker::User);
    assert_eq!(turns[1].speaker, Speaker::Model);
    assert_eq!(turns[1].text, "¡Hola!\n\n¿En qué te ayudo?");
    // Trailing user turn folds into the outgoing message.
    assert_eq!(conversation.message(), "Mi CTR es bajo\n\n¿Qué hago?");
    assert_eq!(conversation.history().len(), 2);
}

#[test]
fn leading_model_greetings_are_dropped() {
    let history = vec![msg("model", "¡Soy Smarty!"), msg("user", "Hola")];
    let conversation = build_conversation(&history, Some("Analiza")).expect("conversation");
    assert!(conversation.history().is_empty());
    assert_eq!(conversation.message(), "Hola\n\nAnaliza");
}

#[test]
fn missing_message_uses_trailing_user_turn() {
    let history: Vec<HistoryMessage> = serde_json::from_str(
        r#"[{"role": "user", "text": "¿Cuánto cuesta?"},
            {"role": "model", "text": "Depende del plan."},
            {"role": "user", "text": "El básico"}]"#,
    )
    .expect("history json");
    let conversation = build_conversation(&history, None).expect("conversation");
    assert_eq!(conversation.message(), "El básico");
    assert_eq!(conversation.history().len(), 2);
}

#[test]
fn missing_message_after_model_turn_is_invalid() {
    let history = vec![msg("user", "Hola"), msg("model", "Hola, ¿qué necesitas?")];
    assert!(matches!(
        build_conversation(&history, None),
        Err(SmartAdsError::InvalidInput(_))
    ));
    assert!(matches!(
        build_conversation(&[], Some("   ")),
        Err(SmartAdsError::InvalidInput(_))
    ));
}

#[test]
fn coach_prompt_injects_profile_with_placeholders() {
    let profile = BusinessProfile {
        niche: "Odontología estética".to_string(),
        goal: "Llegar a 10k/mes".to_string(),
        ..BusinessProfile::default()
    };
    let prompt = business_coach_prompt(Some(&profile));
    assert!(prompt.contains("Odontología estética"));
    assert!(prompt.contains("Llegar a 10k/mes"));
    assert!(prompt.contains("Not defined"));

    let bare = business_coach_prompt(Some(&BusinessProfile::default()));
    assert!(!bare.contains("CURRENT CLIENT BUSINESS CONTEXT"));
}

#[test]
fn copy_prompt_lists_every_angle_in_order() {
    let brief: CopyBrief = serde_json::from_str(r#"{"niche": "Fitness", "ticket": 49}"#).expect("brief");
    assert_eq!(brief.ticket, "49");
    let prompt = ad_copy_prompt(&brief);
    for (index, angle) in COPY_ANGLES.iter().enumerate() {
        assert!(prompt.contains(&format!("{}. {}", index + 1, angle)));
    }
}

#[test]
fn analyst_prompt_reports_missing_metrics() {
    assert!(metrics_analyst_prompt(None).contains("No metrics provided yet."));

    let context: MetricsContext =
        serde_json::from_str(r#"{"cpm": 8, "ctr": 1.2, "cpc": 0.4, "cpr": 3, "results": 12, "spend": 36}"#)
            .expect("context");
    let prompt = metrics_analyst_prompt(Some(&context));
    assert!(prompt.contains("- Cost per result: $3.00"));
    assert!(prompt.contains("- ROAS: N/A"));
}

#[test]
fn analyst_context_accepts_dashboard_form_values() {
    let context: MetricsContext = serde_json::from_str(
        r#"{"cpm": "8.50", "ctr": "", "cpc": "0.4", "cpr": "3", "results": "12", "spend": "36", "diagnosis": {"overall": "danger"}}"#,
    )
    .expect("context");
    assert_eq!(context.metrics.cpm, 8.5);
    assert_eq!(context.metrics.ctr, 0.0);
    assert_eq!(context.metrics.cost_per_result, 3.0);
    assert!(context.diagnosis.is_some());

    let prompt = metrics_analyst_prompt(Some(&context));
    assert!(prompt.contains("- CPM: $8.50"));
}
