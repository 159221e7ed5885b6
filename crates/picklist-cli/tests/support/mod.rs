use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;

pub fn new_command_with_temp_home() -> (Command, tempfile::TempDir) {
    let temp_home = tempfile::tempdir().expect("temp home");
    let binary = assert_cmd::cargo::cargo_bin!("picklist");
    let mut command = Command::new(binary);
    command.env("HOME", temp_home.path());
    command.env("XDG_CONFIG_HOME", temp_home.path().join(".config"));
    (command, temp_home)
}

pub fn write_valid_config(home: &Path, store_path: &Path) {
    let config_dir = home.join(".config").join("picklist");
    fs::create_dir_all(&config_dir).expect("create config dir");
    fs::write(
        config_dir.join("config.toml"),
        format!(
            r#"
version = 1

[store]
path = "{}"
"#,
            store_path.display()
        ),
    )
    .expect("write config");
}

pub fn write_store_fixture(home: &Path) -> PathBuf {
    let store_path = home.join("titles.json");
    fs::write(
        &store_path,
        r#"[
  {
    "id": 2,
    "title": "Dune",
    "imageUrl": "covers/dune.jpg",
    "barcode": "9780441172719",
    "coordinate": "B02:4",
    "copies": 1,
    "status": 1
  },
  {
    "id": 1,
    "title": "The Lightning Thief",
    "imageUrl": "covers/lightning.jpg",
    "barcode": "9780545582889",
    "coordinate": "A10:5",
    "copies": 2,
    "status": 0
  }
]"#,
    )
    .expect("write store fixture");
    store_path
}

#[allow(dead_code)]
pub fn assert_timestamp_log_names(entries: &[std::fs::DirEntry]) {
    assert!(!entries.is_empty(), "expected at least one diagnostics log");

    for entry in entries {
        let name = entry
            .file_name()
            .into_string()
            .expect("diagnostics filename utf8");
        assert!(
            name.ends_with(".log"),
            "diagnostics file should end with .log: {name}"
        );
        let stem = name
            .strip_suffix(".log")
            .expect("diagnostics filename .log suffix");
        assert!(
            !stem.is_empty() && stem.chars().all(|character| character.is_ascii_digit()),
            "diagnostics filename must be <timestamp>.log, got: {name}"
        );
    }
}
