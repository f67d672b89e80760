use std::path::{Path, PathBuf};

use rstest::rstest;
use stagehand_core::{
    config::{self, CONFIG_FILE_NAME},
    ConfigError, ServiceKind, ServiceName,
};
use tempfile::TempDir;

const FULL: &str = r#"
project_filename: newsapp
confs_dir: deploy/confs
secrets_prefix: NEWSAPP
socket:
  path: /run/uwsgi/newsapp.uwsgi.sock
  owner: app:app
  mode: "660"
vars:
  SERVER_PROJECT_PATH: /home/ubuntu/apps/newsapp
  SERVER_NAME: default.example.com
  WORKERS: 4
services:
  - name: nginx
    installed_directory: /etc/nginx/sites-available
    file_extension: conf
  - name: uwsgi
    installed_directory: /etc/init
    file_extension: conf
  - name: app
    installed_directory: /etc/uwsgi/sites
    file_extension: ini
targets:
  production:
    server:
      host: app.example.com
      user: ubuntu
      port: 2222
    vars:
      SERVER_NAME: example.com
  staging:
    server: { host: stage.example.com, user: ubuntu }
"#;

fn write_config(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join(CONFIG_FILE_NAME);
    std::fs::write(&path, body).expect("write config");
    path
}

#[rstest]
#[case("nginx", ServiceKind::Nginx)]
#[case("uwsgi", ServiceKind::Uwsgi)]
#[case("app", ServiceKind::App)]
#[case("celery", ServiceKind::Generic)]
#[case("Nginx", ServiceKind::Generic)]
fn service_kind_from_name(#[case] name: &str, #[case] expected: ServiceKind) {
    assert_eq!(ServiceKind::of(&ServiceName::from(name)), expected);
}

#[test]
fn deployment_resolves_target_server_and_paths() {
    let tmp = TempDir::new().unwrap();
    let path = write_config(tmp.path(), FULL);
    let deployment = config::load_deployment_at(&path, "production").expect("resolve");

    assert_eq!(deployment.target_name, "production");
    assert_eq!(deployment.server.host, "app.example.com");
    assert_eq!(deployment.server.port, 2222);
    assert_eq!(deployment.root, tmp.path());

    let app = deployment.service(&ServiceName::from("app")).expect("app");
    assert_eq!(
        deployment.template_path(app),
        tmp.path().join("deploy/confs/app.ini")
    );
    assert_eq!(
        deployment.staging_path(app),
        tmp.path().join("deploy/confs/rendered/newsapp.app.ini")
    );
    assert_eq!(
        deployment.installed_path(app).as_str(),
        "/etc/uwsgi/sites/newsapp.app.ini"
    );
}

#[test]
fn services_keep_declaration_order() {
    let tmp = TempDir::new().unwrap();
    let deployment =
        config::load_deployment_at(&write_config(tmp.path(), FULL), "staging").expect("resolve");
    let names: Vec<_> = deployment
        .services()
        .iter()
        .map(|s| s.name.to_string())
        .collect();
    assert_eq!(names, ["nginx", "uwsgi", "app"]);
}

#[test]
fn base_context_precedence() {
    let tmp = TempDir::new().unwrap();
    let path = write_config(tmp.path(), FULL);

    let production = config::load_deployment_at(&path, "production").unwrap();
    let ctx = production.base_context();
    assert_eq!(ctx["SERVER_NAME"].as_str(), Some("example.com"));
    assert_eq!(ctx["WORKERS"].as_u64(), Some(4));
    assert_eq!(ctx["PROJECT_FILENAME"].as_str(), Some("newsapp"));
    assert_eq!(ctx["DEPLOYMENT_TARGET"].as_str(), Some("production"));
    assert_eq!(
        ctx["UWSGI_SOCKET_PATH"].as_str(),
        Some("/run/uwsgi/newsapp.uwsgi.sock")
    );

    let staging = config::load_deployment_at(&path, "staging").unwrap();
    assert_eq!(
        staging.base_context()["SERVER_NAME"].as_str(),
        Some("default.example.com")
    );
}

#[test]
fn base_context_does_not_mutate_config() {
    let tmp = TempDir::new().unwrap();
    let deployment =
        config::load_deployment_at(&write_config(tmp.path(), FULL), "production").unwrap();
    let before = deployment.project.vars.clone();
    let _ = deployment.base_context();
    assert_eq!(deployment.project.vars, before);
}

#[rstest]
#[case("name: ''", "name must not be empty")]
#[case("name: a/b", "name must not contain '/'")]
fn invalid_service_names_are_rejected(#[case] name_line: &str, #[case] reason: &str) {
    let tmp = TempDir::new().unwrap();
    let body = format!(
        "project_filename: x\nsocket: {{ path: /run/x.sock }}\nservices:\n  - {name_line}\n    installed_directory: /etc\n    file_extension: conf\n"
    );
    let err = config::load_at(&write_config(tmp.path(), &body)).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidService { .. }));
    assert!(err.to_string().contains(reason), "unexpected message: {err}");
}

#[test]
fn empty_project_filename_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let err = config::load_at(&write_config(
        tmp.path(),
        "project_filename: ' '\nsocket: { path: /run/x.sock }\n",
    ))
    .unwrap_err();
    assert!(matches!(err, ConfigError::MissingProjectFilename));
}

#[rstest]
#[case("../x", "must not contain '/'")]
#[case("apps/newsapp", "must not contain '/'")]
#[case("..", "must not be '..'")]
fn project_filename_must_be_one_path_component(#[case] value: &str, #[case] reason: &str) {
    let tmp = TempDir::new().unwrap();
    let body = format!("project_filename: '{value}'\nsocket: {{ path: /run/x.sock }}\n");
    let err = config::load_at(&write_config(tmp.path(), &body)).unwrap_err();
    assert!(
        matches!(err, ConfigError::InvalidProjectFilename { .. }),
        "unexpected error: {err}"
    );
    assert!(err.to_string().contains(reason), "unexpected message: {err}");
}
