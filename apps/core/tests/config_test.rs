use std::time::{SystemTime, UNIX_EPOCH};

use keylaunch_core::config::{self, Config, ConfigError};

fn unique_path() -> std::path::PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir()
        .join(format!("keylaunch-config-{unique}"))
        .join("config.toml")
}

#[test]
fn accepts_default_config() {
    let cfg = Config::default();
    assert_eq!(cfg.tick_interval_ms, 10);
    assert_eq!(cfg.blink_interval_ms, 700);
    assert_eq!(cfg.app_dirs.len(), 3);
    assert!(cfg.counts_path.to_string_lossy().contains("keylaunch"));
    assert!(config::validate(&cfg).is_ok());
}

#[test]
fn rejects_out_of_range_intervals() {
    let cfg = Config {
        tick_interval_ms: 0,
        ..Default::default()
    };
    assert!(matches!(config::validate(&cfg), Err(ConfigError::Invalid(_))));

    let cfg = Config {
        blink_interval_ms: 50,
        ..Default::default()
    };
    assert!(config::validate(&cfg).is_err());

    let cfg = Config {
        counts_path: Default::default(),
        ..Default::default()
    };
    assert!(config::validate(&cfg).is_err());
}

#[test]
fn missing_file_loads_defaults() {
    let path = unique_path();
    let cfg = config::load(Some(&path)).unwrap();
    assert_eq!(cfg.config_path, path);
    assert_eq!(cfg.tick_interval_ms, Config::default().tick_interval_ms);
}

#[test]
fn partial_file_overrides_only_given_keys() {
    let path = unique_path();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        &path,
        "blink_interval_ms = 500\napp_dirs = [\"/opt/apps\"]\n",
    )
    .unwrap();

    let cfg = config::load(Some(&path)).unwrap();
    assert_eq!(cfg.blink_interval_ms, 500);
    assert_eq!(cfg.app_dirs, vec![std::path::PathBuf::from("/opt/apps")]);
    assert_eq!(cfg.tick_interval_ms, 10);

    std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
}

#[test]
fn malformed_file_is_a_parse_error() {
    let path = unique_path();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "tick_interval_ms = \"fast\"\n").unwrap();

    assert!(matches!(
        config::load(Some(&path)),
        Err(ConfigError::Parse { .. })
    ));

    std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
}

#[test]
fn saved_config_loads_back() {
    let path = unique_path();
    let cfg = Config {
        config_path: path.clone(),
        tick_interval_ms: 20,
        ..Default::default()
    };
    config::save(&cfg).unwrap();

    let loaded = config::load(Some(&path)).unwrap();
    assert_eq!(loaded, cfg);

    std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
}
