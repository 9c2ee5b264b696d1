use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn write_article(dir: &TempDir, name: &str, body: &str) {
    let articles = dir.path().join("articles");
    fs::create_dir_all(&articles).expect("create articles dir");
    fs::write(articles.join(name), body).expect("write article");
}

/// Command running inside `dir` with its own database and articles directory
fn publisher(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("wechat-publisher");
    cmd.current_dir(dir.path())
        .env(
            "WECHAT_PUBLISHER__GENERAL__DB_PATH",
            dir.path().join("data").join("publisher.db"),
        )
        .env(
            "WECHAT_PUBLISHER__GENERAL__ARTICLES_DIR",
            dir.path().join("articles"),
        );
    cmd
}

#[test]
fn config_init_writes_example_file() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");

    let mut cmd = cargo_bin_cmd!("wechat-publisher");
    cmd.args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .success();

    let content = fs::read_to_string(&config_path).expect("read config");
    assert!(content.contains("draft_mode = true"));
    assert!(content.contains("app_secret_env"));
}

#[test]
fn config_init_creates_parent_and_reports_settings() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("nested").join("config.toml");

    let mut cmd = cargo_bin_cmd!("wechat-publisher");
    cmd.args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Database:"))
        .stdout(predicate::str::contains("WECHAT_APP_SECRET"));

    assert!(config_path.exists());
}

#[test]
fn config_show_prints_loaded_settings() {
    let dir = TempDir::new().expect("temp dir");

    let output = publisher(&dir)
        .env("WECHAT_PUBLISHER__WECHAT__APP_ID", "wx123")
        .args(["config", "show", "--json"])
        .output()
        .expect("run config show");
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value["wechat"]["app_id"], "wx123");
    assert_eq!(value["webhook"]["secret_env"], "GITHUB_WEBHOOK_SECRET");
}

#[test]
fn config_init_refuses_to_overwrite() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "# mine\n").expect("write config");

    let mut cmd = cargo_bin_cmd!("wechat-publisher");
    cmd.args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    assert_eq!(fs::read_to_string(&config_path).unwrap(), "# mine\n");
}

#[test]
fn articles_import_then_list_as_json() {
    let dir = TempDir::new().expect("temp dir");
    write_article(
        &dir,
        "hello.md",
        "---\ntitle: Hello WeChat\nauthor: Ann\n---\n\nBody text.\n",
    );
    write_article(&dir, "second.md", "# Second Post\n\nMore text.\n");

    publisher(&dir)
        .args(["articles", "import"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 article(s)"));

    let output = publisher(&dir)
        .args(["articles", "list", "--json"])
        .output()
        .expect("run articles list");
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value["count"], 2);

    let titles: Vec<&str> = value["articles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap())
        .collect();
    assert!(titles.contains(&"Hello WeChat"));
    assert!(titles.contains(&"Second Post"));
    assert!(
        value["articles"]
            .as_array()
            .unwrap()
            .iter()
            .all(|a| a["status"] == "draft")
    );
}

#[test]
fn reimport_does_not_duplicate() {
    let dir = TempDir::new().expect("temp dir");
    write_article(&dir, "post.md", "# First Title\n\nv1\n");

    publisher(&dir).args(["articles", "import"]).assert().success();
    write_article(&dir, "post.md", "# Second Title\n\nv2\n");
    publisher(&dir)
        .args(["articles", "import", "--file", "post.md"])
        .assert()
        .success();

    let output = publisher(&dir)
        .args(["articles", "list", "--json"])
        .output()
        .expect("run articles list");
    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");

    assert_eq!(value["count"], 1);
    assert_eq!(value["articles"][0]["title"], "Second Title");
}

#[test]
fn generate_with_stub_provider_saves_article() {
    let dir = TempDir::new().expect("temp dir");

    let output = publisher(&dir)
        .env("WECHAT_PUBLISHER__AI__PROVIDER", "stub")
        .args(["generate", "--keyword", "Rust", "--save", "--json"])
        .output()
        .expect("run generate");
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value["keyword"], "Rust");
    assert_eq!(value["title"], "Rust");
    assert!(value["content"].as_str().unwrap().starts_with("# Rust"));

    let id = value["article_id"].as_i64().expect("article id");
    publisher(&dir)
        .args(["articles", "show"])
        .arg(id.to_string())
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: draft"));
}

#[test]
fn generate_rejects_unknown_length() {
    let dir = TempDir::new().expect("temp dir");

    publisher(&dir)
        .env("WECHAT_PUBLISHER__AI__PROVIDER", "stub")
        .args(["generate", "--keyword", "Rust", "--length", "epic"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid length"));
}

#[test]
fn logs_start_empty() {
    let dir = TempDir::new().expect("temp dir");

    let output = publisher(&dir)
        .args(["logs", "--json"])
        .output()
        .expect("run logs");
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value, Value::Array(vec![]));
}

#[test]
fn publish_missing_article_fails() {
    let dir = TempDir::new().expect("temp dir");

    publisher(&dir)
        .env("WECHAT_PUBLISHER__WECHAT__APP_ID", "wx123")
        .env("WECHAT_APP_SECRET", "secret")
        .args(["publish", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Article 42 not found"));
}

#[test]
fn publish_without_app_id_fails() {
    let dir = TempDir::new().expect("temp dir");

    publisher(&dir)
        .env_remove("WECHAT_PUBLISHER__WECHAT__APP_ID")
        .args(["publish", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("app_id"));
}

#[test]
fn schedule_status_reports_disabled() {
    let dir = TempDir::new().expect("temp dir");

    let output = publisher(&dir)
        .args(["schedule", "status", "--json"])
        .output()
        .expect("run schedule status");
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value["enabled"], false);
    assert_eq!(value["running"], false);
    assert_eq!(value["jobs"], Value::Array(vec![]));
}

#[test]
fn schedule_status_computes_next_interval_run() {
    let dir = TempDir::new().expect("temp dir");

    let output = publisher(&dir)
        .env("WECHAT_PUBLISHER__SCHEDULE__ENABLED", "true")
        .env("WECHAT_PUBLISHER__SCHEDULE__MODE", "interval")
        .env("WECHAT_PUBLISHER__SCHEDULE__INTERVAL_MINUTES", "15")
        .args(["schedule", "status", "--json"])
        .output()
        .expect("run schedule status");
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value["enabled"], true);
    assert_eq!(value["running"], false);
    assert_eq!(value["mode"], "interval");
    assert_eq!(value["jobs"][0]["id"], "publish_check");
    assert!(value["jobs"][0]["next_run_time"].is_string());
}

#[test]
fn schedule_status_rejects_oversized_interval() {
    let dir = TempDir::new().expect("temp dir");

    publisher(&dir)
        .env("WECHAT_PUBLISHER__SCHEDULE__ENABLED", "true")
        .env("WECHAT_PUBLISHER__SCHEDULE__MODE", "interval")
        .env("WECHAT_PUBLISHER__SCHEDULE__INTERVAL_MINUTES", "1152921504606846976")
        .args(["schedule", "status", "--json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid schedule"));
}

#[test]
fn articles_create_then_edit_keeps_other_fields() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("body.md"), "# Ownership\n\nBorrowing rules.\n")
        .expect("write body");

    let output = publisher(&dir)
        .args([
            "articles",
            "create",
            "--title",
            "Ownership",
            "--author",
            "Ann",
            "--content-file",
            "body.md",
            "--json",
        ])
        .output()
        .expect("run articles create");
    assert!(output.status.success());
    let created: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let id = created["id"].as_i64().expect("article id").to_string();
    assert_eq!(created["status"], "draft");

    publisher(&dir)
        .args(["articles", "edit", &id, "--title", "Borrowing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated article"));

    let output = publisher(&dir)
        .args(["articles", "show", &id, "--json"])
        .output()
        .expect("run articles show");
    let article: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(article["title"], "Borrowing");
    assert_eq!(article["author"], "Ann");
    assert_eq!(article["content"], "# Ownership\n\nBorrowing rules.\n");
    assert_eq!(article["status"], "draft");
}

#[test]
fn articles_edit_without_fields_fails() {
    let dir = TempDir::new().expect("temp dir");

    publisher(&dir)
        .args(["articles", "edit", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to change"));
}

#[test]
fn articles_edit_missing_article_fails() {
    let dir = TempDir::new().expect("temp dir");

    publisher(&dir)
        .args(["articles", "edit", "7", "--status", "published"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Article 7 not found"));
}

fn git(dir: &TempDir, args: &[&str]) {
    let status = std::process::Command::new("git")
        .args(args)
        .current_dir(dir.path())
        .status()
        .expect("run git");
    assert!(status.success(), "git {args:?} failed");
}

#[test]
fn git_status_and_log_of_fresh_repository() {
    let dir = TempDir::new().expect("temp dir");
    git(&dir, &["init", "-q"]);
    fs::write(dir.path().join("draft.md"), "# Draft\n").expect("write draft");

    let output = publisher(&dir)
        .env("WECHAT_PUBLISHER__GIT__REPO_PATH", dir.path())
        .args(["git", "status", "--json"])
        .output()
        .expect("run git status");
    assert!(output.status.success());
    let status: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(status["clean"], false);
    assert!(
        status["files"]
            .as_array()
            .unwrap()
            .iter()
            .any(|f| f["path"] == "draft.md")
    );

    let output = publisher(&dir)
        .env("WECHAT_PUBLISHER__GIT__REPO_PATH", dir.path())
        .args(["git", "log", "--json"])
        .output()
        .expect("run git log");
    assert!(output.status.success());
    let commits: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(commits, Value::Array(vec![]));
}

const WEBHOOK_SECRET: &str = "It's a Secret to Everybody";
const WEBHOOK_SIGNATURE: &str =
    "sha256=757107ea0eb2509fc211221cce984b8a37570b6d7586c22c46f4379c8b043e17";

#[test]
fn webhook_verify_accepts_signed_delivery() {
    let dir = TempDir::new().expect("temp dir");
    let payload = dir.path().join("delivery.txt");
    fs::write(&payload, "Hello, World!").expect("write payload");

    let output = publisher(&dir)
        .env("GITHUB_WEBHOOK_SECRET", WEBHOOK_SECRET)
        .args(["webhook", "verify", "--event", "ping", "--json", "--payload-file"])
        .arg(&payload)
        .args(["--signature", WEBHOOK_SIGNATURE])
        .output()
        .expect("run webhook verify");
    assert!(output.status.success());

    let receipt: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(receipt["event"], "ping");
    assert_eq!(receipt["articles_changed"], false);
}

#[test]
fn webhook_verify_rejects_tampered_body() {
    let dir = TempDir::new().expect("temp dir");
    let payload = dir.path().join("delivery.txt");
    fs::write(&payload, "Hello, World?").expect("write payload");

    publisher(&dir)
        .env("GITHUB_WEBHOOK_SECRET", WEBHOOK_SECRET)
        .args(["webhook", "verify", "--event", "ping", "--payload-file"])
        .arg(&payload)
        .args(["--signature", WEBHOOK_SIGNATURE])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Webhook rejected"));
}

#[test]
fn webhook_push_touching_articles_is_reported() {
    let dir = TempDir::new().expect("temp dir");
    let payload = dir.path().join("push.json");
    fs::write(
        &payload,
        r#"{"commits":[{"added":[],"modified":["articles/post.md"],"removed":[]}]}"#,
    )
    .expect("write payload");

    let output = publisher(&dir)
        .env_remove("GITHUB_WEBHOOK_SECRET")
        .env("WECHAT_PUBLISHER__GENERAL__ARTICLES_DIR", "./articles")
        .args(["webhook", "verify", "--json", "--payload-file"])
        .arg(&payload)
        .output()
        .expect("run webhook verify");
    assert!(output.status.success());

    let receipt: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(receipt["event"], "push");
    assert_eq!(receipt["articles_changed"], true);
}
