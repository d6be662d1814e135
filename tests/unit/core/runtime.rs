//! Unit tests for run configuration

use trendwatch::config::MonitorConfig;
use trendwatch::core::{RunReport, RuntimeConfig};

#[test]
fn test_runtime_config_defaults() {
    let config = RuntimeConfig::default();
    assert_eq!(config.concurrency, 4);
    assert_eq!(config.history_cap, 4);
    assert_eq!(config.default_params.threshold, 10.0);
    assert_eq!(config.default_params.n_periods, 3);
    assert!(!config.dry_run);
}

#[test]
fn test_runtime_config_from_monitor_config() {
    let yaml = r#"
indicator_ids: [1, 2]
default_threshold: 7.5
concurrency: 2
indicators:
  2:
    n_periods: 5
signals:
  - name: one_vs_two
    type: growth_diff
    indicators: [1, 2]
"#;
    let monitor = MonitorConfig::from_yaml_str(yaml).unwrap();
    let config = RuntimeConfig::from_config(&monitor, true).unwrap();

    assert_eq!(config.indicator_ids, vec![1, 2]);
    assert_eq!(config.params[&1].threshold, 7.5);
    assert_eq!(config.params[&2].n_periods, 5);
    assert_eq!(config.signals.len(), 1);
    assert_eq!(config.concurrency, 2);
    assert_eq!(config.history_cap, 6);
    assert!(config.dry_run);
}

#[test]
fn test_run_report_success_tracks_failures() {
    let mut report = RunReport::default();
    assert!(report.is_success());
    report.failures.push(9);
    assert!(!report.is_success());
    assert_eq!(report.triggered().count(), 0);
}
