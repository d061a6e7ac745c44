use std::fs;

use serde::Deserialize;

#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
struct SystemSection {
    log_level: String,
}

// One test per binary: the store is process-wide and can be set only once.
#[test]
fn init_then_get() {
    let before: SystemSection = inky_shared::config::get("system");
    assert_eq!(before, SystemSection::default());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[system]\nlog_level = \"debug\"\n").unwrap();

    inky_shared::config::init(&path).unwrap();
    let after: SystemSection = inky_shared::config::get("system");
    assert_eq!(after.log_level, "debug");

    assert!(inky_shared::config::init(&path).is_err());
}
