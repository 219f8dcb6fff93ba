use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn column(name: &str, raw: &str, target: &str, widget: &str, flags: (bool, bool, bool)) -> serde_json::Value {
    let field = name
        .split('_')
        .map(|part| {
            let mut chars = part.chars();
            chars
                .next()
                .map(|c| c.to_ascii_uppercase().to_string() + chars.as_str())
                .unwrap_or_default()
        })
        .collect::<String>();
    let mut wire = field.clone();
    wire.replace_range(..1, &field[..1].to_ascii_lowercase());

    serde_json::json!({
        "column_name": name,
        "raw_type": raw,
        "nullable": !flags.2,
        "field_name": field,
        "target_type": target,
        "wire_field": wire,
        "form_widget": widget,
        "is_query": flags.0,
        "is_list": flags.1,
        "is_form": flags.2,
    })
}

fn write_config(dir: &Path) -> PathBuf {
    let config = serde_json::json!({
        "table_name": "lv_articles",
        "table_comment": "Articles",
        "module_name": "article",
        "package_name": "blog",
        "struct_name": "Article",
        "columns": [
            column("id", "int", "int", "number", (false, false, false)),
            column("title", "varchar", "text", "text", (true, true, true)),
            column("content", "text", "text", "long-text", (false, false, true)),
            column("created_at", "datetime", "timestamp", "date", (false, false, false)),
            column("updated_at", "datetime", "timestamp", "date", (false, false, false)),
            column("deleted_at", "datetime", "timestamp", "date", (false, false, false)),
        ],
    });
    let path = dir.join("article.json");
    std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    path
}

fn lvgen(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("lvgen").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("LVGEN_CONFIG")
        .env_remove("LVGEN_DATABASE_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_offline_preview_of_one_artifact() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());

    lvgen(&dir)
        .args(["preview", "--artifact", "entity", "--from-json"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("type Article struct {"))
        .stdout(predicate::str::contains("gorm.Model"))
        .stdout(predicate::str::contains("return \"lv_articles\""));
}

#[test]
fn test_offline_preview_json_has_every_artifact() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());

    let output = lvgen(&dir)
        .args(["preview", "--json", "--from-json"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());

    let map: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    let mut keys: Vec<_> = map.keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, ["api_client", "entity", "handler", "routes", "service", "view"]);
    assert!(map["routes"].as_str().unwrap().contains("articleGroup := privateGroup.Group(\"blog/article\")"));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    lvgen(&dir)
        .args(["preview", "--from-json", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn test_generate_without_database_url_fails() {
    let dir = TempDir::new().unwrap();
    lvgen(&dir)
        .args(["generate", "lv_articles"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no database url"));
}

#[test]
fn test_unparseable_settings_file_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("lvgen.toml"), "[generation]\nrollback = 7\n").unwrap();
    let config = write_config(dir.path());

    lvgen(&dir)
        .args(["preview", "--from-json"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("lvgen.toml"));
}
