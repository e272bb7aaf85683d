use smart_ads::{authorize, Capability, Role, SmartAdsError};

#[test]
fn client_only_sees_metrics() {
    assert!(Role::Client.can(Capability::MetricsDiagnosis));
    for capability in Role::Admin.capabilities() {
        if *capability != Capability::MetricsDiagnosis {
            assert!(!Role::Client.can(*capability), "client can {:?}", capability);
        }
    }
}

#[test]
fn workshop_gets_every_tool_except_metrics() {
    assert!(!Role::Workshop.can(Capability::MetricsDiagnosis));
    for capability in [
        Capability::BusinessCoach,
        Capability::CopyBuilder,
        Capability::AdAnalyzer,
        Capability::BudgetSimulator,
        Capability::CampaignStructure,
        Capability::Automations,
        Capability::Academy,
        Capability::SystemHub,
    ] {
        assert!(Role::Workshop.can(capability));
    }
}

#[test]
fn pro_and_admin_can_do_everything() {
    assert_eq!(Role::Pro.capabilities().len(), 9);
    assert_eq!(Role::Pro.capabilities(), Role::Admin.capabilities());
}

#[test]
fn authorize_reports_role_and_capability() {
    assert!(authorize(Role::Pro, Capability::Automations).is_ok());

    match authorize(Role::Client, Capability::CopyBuilder) {
        Err(SmartAdsError::Forbidden { role, capability }) => {
            assert_eq!(role, "client");
            assert_eq!(capability, "copy builder");
        }
        other => panic!("expected forbidden, got {:?}", other),
    }
}

#[test]
fn roles_parse_from_header_values() {
    assert_eq!(Role::from_str("Admin"), Some(Role::Admin));
    assert_eq!(Role::from_str(" workshop "), Some(Role::Workshop));
    assert_eq!(Role::from_str("guest"), None);
    assert_eq!(Role::default(), Role::Workshop);
}
