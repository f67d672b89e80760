use std::collections::BTreeMap;
use std::path::Path;

use stagehand_core::{config, Deployment, ServiceName};
use stagehand_renderer::{RenderError, Renderer};
use tempfile::TempDir;

const CONFIG: &str = r#"
project_filename: newsapp
socket:
  path: /run/uwsgi/newsapp.uwsgi.sock
vars:
  SERVER_NAME: news.example.com
  DB_PASSWORD: not-the-real-one
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
"#;

const NGINX_TEMPLATE: &str = "\
server {
    listen 80;
    server_name {{ SERVER_NAME }};
    location / {
        uwsgi_pass unix://{{ UWSGI_SOCKET_PATH }};
    }
}
";

const APP_TEMPLATE: &str = "\
[uwsgi]
socket = {{ UWSGI_SOCKET_PATH }}
env = DB_PASSWORD={{ DB_PASSWORD }}
env = DEPLOYMENT_TARGET={{ DEPLOYMENT_TARGET }}
";

fn setup(root: &Path) -> Deployment {
    std::fs::write(root.join(config::CONFIG_FILE_NAME), CONFIG).unwrap();
    let confs = root.join("confs");
    std::fs::create_dir_all(&confs).unwrap();
    std::fs::write(confs.join("nginx.conf"), NGINX_TEMPLATE).unwrap();
    std::fs::write(confs.join("app.ini"), APP_TEMPLATE).unwrap();
    config::load_deployment_at(&root.join(config::CONFIG_FILE_NAME), "production").unwrap()
}

fn secrets(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn renders_into_staging_directory() {
    let tmp = TempDir::new().unwrap();
    let deployment = setup(tmp.path());
    let secrets = secrets(&[]);
    let renderer = Renderer::new(&deployment, &secrets);

    let nginx = deployment.service(&ServiceName::from("nginx")).unwrap();
    let artifact = renderer.render(nginx).expect("render nginx");

    assert_eq!(
        artifact.path,
        tmp.path().join("confs/rendered/newsapp.nginx.conf")
    );
    let on_disk = std::fs::read_to_string(&artifact.path).unwrap();
    assert_eq!(on_disk, artifact.content);
    assert!(on_disk.contains("server_name news.example.com;"));
    assert!(on_disk.contains("uwsgi_pass unix:///run/uwsgi/newsapp.uwsgi.sock;"));
}

#[test]
fn secrets_take_precedence_over_static_vars() {
    let tmp = TempDir::new().unwrap();
    let deployment = setup(tmp.path());
    let secrets = secrets(&[("DB_PASSWORD", "hunter2")]);
    let renderer = Renderer::new(&deployment, &secrets);

    let app = deployment.service(&ServiceName::from("app")).unwrap();
    let artifact = renderer.render(app).unwrap();
    assert!(artifact.content.contains("env = DB_PASSWORD=hunter2"));
    assert!(artifact.content.contains("env = DEPLOYMENT_TARGET=production"));
    assert!(!format!("{artifact:?}").contains("hunter2"));

    // The static configuration itself never sees the secret.
    assert_eq!(
        deployment.project.vars["DB_PASSWORD"].as_str(),
        Some("not-the-real-one")
    );
}

#[test]
fn rendering_is_deterministic() {
    let tmp = TempDir::new().unwrap();
    let deployment = setup(tmp.path());
    let secrets = secrets(&[("DB_PASSWORD", "hunter2")]);
    let renderer = Renderer::new(&deployment, &secrets);

    let first: Vec<Vec<u8>> = renderer
        .render_all()
        .unwrap()
        .iter()
        .map(|a| std::fs::read(&a.path).unwrap())
        .collect();
    let second: Vec<Vec<u8>> = renderer
        .render_all()
        .unwrap()
        .iter()
        .map(|a| std::fs::read(&a.path).unwrap())
        .collect();
    assert_eq!(first, second);
}

#[test]
fn render_all_keeps_declaration_order() {
    let tmp = TempDir::new().unwrap();
    let deployment = setup(tmp.path());
    let secrets = secrets(&[]);
    let names: Vec<String> = Renderer::new(&deployment, &secrets)
        .render_all()
        .unwrap()
        .into_iter()
        .map(|a| a.service.to_string())
        .collect();
    assert_eq!(names, ["nginx", "app"]);
}

#[test]
fn rerender_overwrites_staged_file() {
    let tmp = TempDir::new().unwrap();
    let deployment = setup(tmp.path());
    let secrets = secrets(&[]);
    let renderer = Renderer::new(&deployment, &secrets);
    let nginx = deployment.service(&ServiceName::from("nginx")).unwrap();

    let staged = renderer.render(nginx).unwrap().path;
    std::fs::write(&staged, "stale").unwrap();
    renderer.render(nginx).unwrap();
    assert_ne!(std::fs::read_to_string(&staged).unwrap(), "stale");
}

#[test]
fn missing_template_is_io_error() {
    let tmp = TempDir::new().unwrap();
    let deployment = setup(tmp.path());
    std::fs::remove_file(tmp.path().join("confs/app.ini")).unwrap();
    let secrets = secrets(&[]);
    let app = deployment.service(&ServiceName::from("app")).unwrap();

    let err = Renderer::new(&deployment, &secrets).render(app).unwrap_err();
    assert!(matches!(err, RenderError::Io { ref path, .. } if path.ends_with("confs/app.ini")));
}

#[test]
fn unresolved_placeholder_stages_nothing() {
    let tmp = TempDir::new().unwrap();
    let deployment = setup(tmp.path());
    std::fs::write(tmp.path().join("confs/app.ini"), "key = {{ NOT_DEFINED }}\n").unwrap();
    let secrets = secrets(&[]);
    let app = deployment.service(&ServiceName::from("app")).unwrap();

    let err = Renderer::new(&deployment, &secrets).render(app).unwrap_err();
    assert!(matches!(err, RenderError::Template { .. }));
    assert!(!deployment.staging_path(app).exists());
}
