use assert_cmd::Command;
use predicates::prelude::*;

fn rulelint() -> Command {
    let mut cmd = Command::cargo_bin("rulelint").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("invalid JSON ({e}): {stdout}"))
}

// ---- rules ----

#[test]
fn test_rules_valid_default_skill() {
    rulelint()
        .args(["rules", "--root", "tests/fixtures/valid"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Validating rule files..."))
        .stdout(predicate::str::contains("Using validator: redis-development"))
        .stdout(predicate::str::contains("✓ All 2 rule files are valid"))
        .stdout(predicate::str::contains("✓ All validations passed"));
}

#[test]
fn test_no_subcommand_runs_rules() {
    // The root is the working directory, which has no skills tree.
    rulelint()
        .assert()
        .success()
        .stdout(predicate::str::contains("No rules directory found"));
}

#[test]
fn test_rules_named_skill() {
    rulelint()
        .args([
            "rules",
            "--skill",
            "redis-cloud-api",
            "--root",
            "tests/fixtures/valid",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Using validator: redis-cloud-api"))
        .stdout(predicate::str::contains("✓ All 1 rule files are valid"));
}

#[test]
fn test_rules_all_skills() {
    rulelint()
        .args(["rules", "--all", "--root", "tests/fixtures/valid"])
        .assert()
        .success()
        .stdout(predicate::str::contains("redis-cloud-api..."))
        .stdout(predicate::str::contains("redis-development..."))
        .stdout(predicate::str::contains("✓ All validations passed"));
}

#[test]
fn test_rules_skill_and_all_conflict() {
    rulelint()
        .args(["rules", "--all", "--skill", "redis-development"])
        .assert()
        .failure();
}

#[test]
fn test_rules_invalid_reports_grouped_errors() {
    rulelint()
        .args(["rules", "--root", "tests/fixtures/invalid"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("✗ Validation failed:"))
        .stderr(predicate::str::contains("  conn-timeouts.md:"))
        .stderr(predicate::str::contains(
            "    - Invalid impact level: URGENT. Must be one of: CRITICAL, HIGH, MEDIUM-HIGH, MEDIUM, LOW-MEDIUM, LOW",
        ))
        .stderr(predicate::str::contains(
            "    - Missing examples (need at least one bad and one good example)",
        ))
        .stderr(predicate::str::contains("  data-ttl.md:"))
        .stderr(predicate::str::contains(
            "Examples must include at least one bad/incorrect or good/correct example",
        ))
        .stderr(predicate::str::contains(
            "Failed to parse: No section prefix matches file name 'misc-notes.md'",
        ))
        .stderr(predicate::str::contains("Total: 4 error(s)"));
}

#[test]
fn test_rules_invalid_files_listed_in_order() {
    let output = rulelint()
        .args(["rules", "--root", "tests/fixtures/invalid"])
        .output()
        .unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);

    let conn = stderr.find("conn-timeouts.md:").unwrap();
    let data = stderr.find("data-ttl.md:").unwrap();
    let misc = stderr.find("misc-notes.md:").unwrap();
    assert!(conn < data && data < misc, "unexpected order:\n{stderr}");
}

#[test]
fn test_rules_only_partials_means_nothing_to_validate() {
    rulelint()
        .args(["rules", "--root", "tests/fixtures/empty"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No rule files found"));
}

#[test]
fn test_rules_unknown_skill() {
    rulelint()
        .args(["rules", "--skill", "nope", "--root", "tests/fixtures/valid"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains(
            "Unknown skill: nope. Available skills: redis-cloud-api, redis-development",
        ));
}

#[test]
fn test_rules_implicit_config_from_root() {
    rulelint()
        .args(["rules", "--root", "tests/fixtures/custom-config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("widgets..."))
        .stdout(predicate::str::contains("Using validator: base"))
        .stdout(predicate::str::contains("✓ All 1 rule files are valid"));
}

#[test]
fn test_rules_explicit_config_missing() {
    rulelint()
        .args([
            "--config",
            "tests/fixtures/does-not-exist.toml",
            "rules",
            "--root",
            "tests/fixtures/valid",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn test_rules_json_valid() {
    let json = json_stdout(rulelint().args([
        "rules",
        "--all",
        "--root",
        "tests/fixtures/valid",
        "--format",
        "json",
    ]));

    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["files_checked"], 3);
    assert_eq!(json["summary"]["errors"], 0);
    assert_eq!(json["skills"][0]["name"], "redis-cloud-api");
    assert_eq!(json["skills"][1]["name"], "redis-development");
    assert!(json["errors"].as_array().unwrap().is_empty());
}

#[test]
fn test_rules_json_invalid_exits_nonzero() {
    let mut cmd = rulelint();
    cmd.args([
        "rules",
        "--root",
        "tests/fixtures/invalid",
        "--format",
        "json",
    ]);
    cmd.assert().failure().code(1);

    let json = json_stdout(&mut cmd);
    assert_eq!(json["summary"]["errors"], 4);

    let errors = json["errors"].as_array().unwrap();
    assert_eq!(errors[0]["file"], "conn-timeouts.md");
    assert_eq!(errors[0]["ruleId"], "3.1");
    let parse_failure = errors
        .iter()
        .find(|e| e["file"] == "misc-notes.md")
        .unwrap();
    assert!(parse_failure.get("ruleId").is_none());
}

// ---- plugins ----

#[test]
fn test_plugins_claude_valid() {
    rulelint()
        .args(["plugins", "--root", "tests/fixtures/plugins-claude-valid"])
        .assert()
        .success()
        .stdout(predicate::str::contains("=== Claude Plugin Validation ==="))
        .stdout(predicate::str::contains(
            "✓ All Claude plugin configurations are valid",
        ));
}

#[test]
fn test_plugins_claude_invalid() {
    rulelint()
        .args(["plugins", "--root", "tests/fixtures/plugins-claude-invalid"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains(
            "marketplace.json: name 'Redis_Skills' must be lowercase kebab-case",
        ))
        .stdout(predicate::str::contains(
            "plugin 'escape': source '../outside' must be a safe relative path (no ../, no absolute)",
        ))
        .stdout(predicate::str::contains(
            "plugin 'missing': source directory not found: ./plugins/missing",
        ))
        .stdout(predicate::str::contains(
            "plugin 'good-plugin': plugin.json 'commands' references non-existent path './commands/missing.md'",
        ))
        .stdout(predicate::str::contains(
            "⚠  plugin 'good-plugin': plugin.json version 'v1' is not valid semver",
        ))
        .stdout(predicate::str::contains(
            "⚠  marketplace.json: no description in metadata",
        ))
        .stdout(predicate::str::contains("✗ 4 error(s) found"));
}

#[test]
fn test_plugins_missing_marketplace() {
    rulelint()
        .args(["plugins", "--root", "tests/fixtures/valid"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Marketplace manifest not found"));
}

#[test]
fn test_plugins_cursor_valid() {
    rulelint()
        .args([
            "plugins",
            "--flavor",
            "cursor",
            "--root",
            "tests/fixtures/plugins-cursor-valid",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("=== Cursor Plugin Validation ==="))
        .stdout(predicate::str::contains(
            "✓ All Cursor plugin configurations are valid",
        ));
}

#[test]
fn test_plugins_cursor_invalid() {
    rulelint()
        .args([
            "plugins",
            "--flavor",
            "cursor",
            "--root",
            "tests/fixtures/plugins-cursor-invalid",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "plugin 'redis-development': logo file not found: assets/missing.svg",
        ))
        .stdout(predicate::str::contains(
            "plugin 'redis-development': skill 'broken/SKILL.md' frontmatter missing 'description'",
        ))
        .stdout(predicate::str::contains(
            "plugin 'redis-development': skill 'notes' missing SKILL.md",
        ))
        .stdout(predicate::str::contains("✗ 2 error(s) found"));
}

#[test]
fn test_plugins_claude_flavor_ignores_cursor_tree() {
    rulelint()
        .args(["plugins", "--root", "tests/fixtures/plugins-cursor-valid"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Marketplace manifest not found"));
}

#[test]
fn test_plugins_json() {
    let mut cmd = rulelint();
    cmd.args([
        "plugins",
        "--root",
        "tests/fixtures/plugins-claude-invalid",
        "--format",
        "json",
    ]);
    cmd.assert().failure().code(1);

    let json = json_stdout(&mut cmd);
    assert_eq!(json["flavor"], "claude");
    assert_eq!(json["errors"].as_array().unwrap().len(), 4);
    assert_eq!(json["warnings"].as_array().unwrap().len(), 2);
}

// ---- misc commands ----

#[test]
fn test_validators_lists_registry() {
    rulelint()
        .arg("validators")
        .assert()
        .success()
        .stdout(predicate::str::contains("base"))
        .stdout(predicate::str::contains("redis-cloud-api"))
        .stdout(predicate::str::contains("redis-development"));
}

#[test]
fn test_init_writes_loadable_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".rulelint.toml");

    rulelint()
        .arg("init")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config file"));

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("default_skill = \"redis-development\""));
    assert!(content.contains("[skills.redis-cloud-api"));
}

#[test]
fn test_init_then_rules_uses_written_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");

    rulelint().arg("init").arg(&path).assert().success();

    rulelint()
        .arg("--config")
        .arg(&path)
        .args(["rules", "--all", "--root", "tests/fixtures/valid"])
        .assert()
        .success();
}

#[test]
fn test_schema_is_json() {
    let json = json_stdout(rulelint().arg("schema"));

    let properties = json["properties"].as_object().unwrap();
    assert!(properties.contains_key("skills_dir"));
    assert!(properties.contains_key("default_skill"));
    assert!(properties.contains_key("skills"));
}

#[test]
fn test_verbose_logs_to_stderr_only() {
    let mut cmd = rulelint();
    cmd.args([
        "-v",
        "rules",
        "--root",
        "tests/fixtures/valid",
        "--format",
        "json",
    ]);

    // stdout stays parseable with debug logging on
    let json = json_stdout(&mut cmd);
    assert_eq!(json["summary"]["errors"], 0);
}
