use smart_ads::config::AppConfig;
use tempfile::tempdir;

#[test]
fn partial_config_keeps_defaults_for_missing_sections() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("smart-ads.toml");
    std::fs::write(
        &path,
        r#"
[diagnosis]
min_ctr_pct = 1.5

[workspace]
max_snapshots = 25
"#,
    )
    .expect("write config");

    let (config, loaded_from) = AppConfig::load(Some(path.clone())).expect("load");
    assert_eq!(loaded_from, Some(path));
    assert_eq!(config.diagnosis.min_ctr_pct, 1.5);
    assert_eq!(config.diagnosis.max_cpm, 15.0);
    assert_eq!(config.workspace.max_snapshots, 25);
    assert_eq!(config.llm.temperature, 0.7);
    assert_eq!(config.meta.campaign_limit, 50);
}

#[test]
fn missing_config_file_falls_back_to_defaults() {
    let dir = tempdir().expect("tempdir");
    let (config, _) = AppConfig::load(Some(dir.path().join("absent.toml"))).expect("load");
    assert_eq!(config.diagnosis.max_cost_per_result, 10.0);
    assert_eq!(config.workspace.max_snapshots, 200);
}

#[test]
fn written_config_loads_back() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config").join("smart-ads.toml");

    let mut config = AppConfig::default();
    config.diagnosis.max_cpc = 1.1;
    config.server.web_root = "public".to_string();
    config.write(&path).expect("write");

    let (loaded, _) = AppConfig::load(Some(path)).expect("load");
    assert_eq!(loaded.diagnosis.max_cpc, 1.1);
    assert_eq!(loaded.server.web_root, "public");
}

#[test]
fn malformed_config_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("smart-ads.toml");
    std::fs::write(&path, "[workspace\nmax_snapshots = ").expect("write config");
    assert!(AppConfig::load(Some(path)).is_err());
}
