use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

const CONFIG: &str = r#"
project_filename: newsapp
secrets_prefix: NEWSAPP
socket:
  path: /run/uwsgi/newsapp.uwsgi.sock
vars:
  SERVER_NAME: news.example.com
services:
  - name: nginx
    installed_directory: /etc/nginx/sites-available
    file_extension: conf
  - name: app
    installed_directory: /etc/uwsgi/sites
    file_extension: ini
targets:
  production:
    server: { host: app.example.com, user: ubuntu }
  staging:
    server: { host: stage.example.com, user: ubuntu }
    vars:
      SERVER_NAME: stage.example.com
"#;

fn stagehand_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("stagehand"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_project(root: &Path) -> PathBuf {
    let confs = root.join("confs");
    fs::create_dir_all(&confs).expect("create confs");
    fs::write(
        confs.join("nginx.conf"),
        "server_name {{ SERVER_NAME }};\n",
    )
    .expect("nginx template");
    fs::write(
        confs.join("app.ini"),
        "[uwsgi]\nsocket = {{ UWSGI_SOCKET_PATH }}\nenv = SECRET_KEY={{ SECRET_KEY }}\n",
    )
    .expect("app template");
    let config = root.join("stagehand.yaml");
    fs::write(&config, CONFIG).expect("write config");
    config
}

#[test]
fn help_lists_every_command() {
    stagehand_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("render"))
        .stdout(contains("deploy"))
        .stdout(contains("nuke"))
        .stdout(contains("status"))
        .stdout(contains("service"));
}

#[test]
fn render_stages_files_with_target_vars_and_secrets() {
    let root = TempDir::new().expect("root");
    let config = write_project(root.path());

    stagehand_cmd()
        .arg("--config")
        .arg(&config)
        .args(["render", "--target", "staging"])
        .env("NEWSAPP_SECRET_KEY", "from-env")
        .assert()
        .success()
        .stdout(contains("rendered 2 service(s) for 'staging'"));

    let rendered = root.path().join("confs/rendered");
    let nginx = fs::read_to_string(rendered.join("newsapp.nginx.conf")).expect("nginx staged");
    assert_eq!(nginx.trim_end(), "server_name stage.example.com;");
    let app = fs::read_to_string(rendered.join("newsapp.app.ini")).expect("app staged");
    assert!(app.contains("socket = /run/uwsgi/newsapp.uwsgi.sock"));
    assert!(app.contains("env = SECRET_KEY=from-env"));
}

#[test]
fn render_fails_on_missing_secret() {
    let root = TempDir::new().expect("root");
    let config = write_project(root.path());

    stagehand_cmd()
        .arg("--config")
        .arg(&config)
        .args(["render", "--target", "production"])
        .env_remove("NEWSAPP_SECRET_KEY")
        .assert()
        .failure()
        .stderr(contains("render failed"))
        .stderr(contains("SECRET_KEY"));
}

#[test]
fn unknown_target_names_declared_ones() {
    let root = TempDir::new().expect("root");
    let config = write_project(root.path());

    stagehand_cmd()
        .arg("--config")
        .arg(&config)
        .args(["deploy", "--target", "qa"])
        .assert()
        .failure()
        .stderr(contains("qa"))
        .stderr(contains("production, staging"));
}

#[test]
fn missing_config_is_reported() {
    let root = TempDir::new().expect("root");

    stagehand_cmd()
        .current_dir(root.path())
        .args(["status", "--target", "production"])
        .assert()
        .failure()
        .stderr(contains("stagehand.yaml"));
}

#[test]
fn deploy_requires_a_target() {
    stagehand_cmd()
        .arg("deploy")
        .assert()
        .failure()
        .stderr(contains("--target"));
}

#[test]
fn service_rejects_unknown_verb() {
    stagehand_cmd()
        .args(["service", "reload", "uwsgi", "--target", "production"])
        .assert()
        .failure()
        .stderr(contains("unknown service verb"));
}

#[test]
fn aborted_deploy_reports_error_on_stderr_only() {
    let root = TempDir::new().expect("root");
    let config = write_project(root.path());
    fs::write(
        root.path().join("confs/nginx.conf"),
        "server_name {{ NOT_DECLARED }};\n",
    )
    .expect("broken template");

    stagehand_cmd()
        .arg("--config")
        .arg(&config)
        .args(["deploy", "--target", "production"])
        .assert()
        .failure()
        .stdout(contains("deploy aborted").not())
        .stdout(contains("NOT_DECLARED").not())
        .stderr(contains("deploy aborted at nginx"));
}
