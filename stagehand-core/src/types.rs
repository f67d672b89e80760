//! Domain types for stagehand deployments.
//!
//! Local filesystem paths use `PathBuf`. Paths on the deployment target are
//! always POSIX and use [`RemotePath`] so they never go through the host's
//! path separator rules.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed name for a declared service (`nginx`, `uwsgi`, `app`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceName(pub String);

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ServiceName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ServiceName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// An absolute POSIX path on the deployment target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemotePath(pub String);

impl RemotePath {
    /// Append `name` with exactly one `/` between the parts.
    pub fn join(&self, name: &str) -> RemotePath {
        let base = self.0.trim_end_matches('/');
        RemotePath(format!("{base}/{}", name.trim_start_matches('/')))
    }

    /// Everything before the last `/`, or `None` for a bare name.
    pub fn parent(&self) -> Option<RemotePath> {
        let trimmed = self.0.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(0) => Some(RemotePath("/".to_string())),
            Some(idx) => Some(RemotePath(trimmed[..idx].to_string())),
            None => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RemotePath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RemotePath {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Service kinds
// ---------------------------------------------------------------------------

/// The closed set of services with a dedicated post-install action.
///
/// Every other name maps to [`ServiceKind::Generic`], which has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    Nginx,
    Uwsgi,
    App,
    Generic,
}

impl ServiceKind {
    pub fn of(name: &ServiceName) -> Self {
        match name.0.as_str() {
            "nginx" => ServiceKind::Nginx,
            "uwsgi" => ServiceKind::Uwsgi,
            "app" => ServiceKind::App,
            _ => ServiceKind::Generic,
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceKind::Nginx => write!(f, "nginx"),
            ServiceKind::Uwsgi => write!(f, "uwsgi"),
            ServiceKind::App => write!(f, "app"),
            ServiceKind::Generic => write!(f, "generic"),
        }
    }
}

// ---------------------------------------------------------------------------
// Service descriptor
// ---------------------------------------------------------------------------

/// Static declaration of one deployable configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub name: ServiceName,
    /// Remote directory the rendered file is installed into.
    pub installed_directory: RemotePath,
    pub file_extension: String,
}

impl ServiceDescriptor {
    pub fn kind(&self) -> ServiceKind {
        ServiceKind::of(&self.name)
    }

    /// `{service}.{extension}`, the template file name under the confs dir.
    pub fn template_file_name(&self) -> String {
        format!("{}.{}", self.name, self.file_extension)
    }

    /// `{project}.{service}.{extension}`, shared by staged and installed files.
    pub fn artifact_file_name(&self, project_filename: &str) -> String {
        format!("{project_filename}.{}.{}", self.name, self.file_extension)
    }

    /// `{installed_directory}/{project}.{service}.{extension}`
    pub fn installed_path(&self, project_filename: &str) -> RemotePath {
        self.installed_directory
            .join(&self.artifact_file_name(project_filename))
    }

    /// Init-system job name, `{project}.{service}`.
    pub fn installed_service_name(&self, project_filename: &str) -> String {
        format!("{project_filename}.{}", self.name)
    }
}

// ---------------------------------------------------------------------------
// Config sections
// ---------------------------------------------------------------------------

/// SSH coordinates for a deployment target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub user: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_file: Option<PathBuf>,
}

fn default_port() -> u16 {
    22
}

/// Application socket created by the `app` post-install action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketConfig {
    pub path: RemotePath,
    #[serde(default = "default_socket_owner")]
    pub owner: String,
    #[serde(default = "default_socket_mode")]
    pub mode: String,
}

fn default_socket_owner() -> String {
    "www-data:www-data".to_string()
}

fn default_socket_mode() -> String {
    "644".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NginxConfig {
    /// Directory holding the active-site symlinks.
    #[serde(default = "default_sites_enabled")]
    pub sites_enabled: RemotePath,
}

impl Default for NginxConfig {
    fn default() -> Self {
        NginxConfig {
            sites_enabled: default_sites_enabled(),
        }
    }
}

fn default_sites_enabled() -> RemotePath {
    RemotePath::from("/etc/nginx/sites-enabled")
}

/// A named deployment target (`production`, `staging`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub server: ServerConfig,
    /// Template variables that override the project-wide `vars`.
    #[serde(default)]
    pub vars: BTreeMap<String, serde_yaml::Value>,
}

/// Root of `stagehand.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub project_filename: String,
    #[serde(default = "default_confs_dir")]
    pub confs_dir: PathBuf,
    /// Environment prefix for secrets; defaults to `project_filename`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets_prefix: Option<String>,
    pub socket: SocketConfig,
    #[serde(default)]
    pub nginx: NginxConfig,
    #[serde(default)]
    pub vars: BTreeMap<String, serde_yaml::Value>,
    #[serde(default)]
    pub services: Vec<ServiceDescriptor>,
    #[serde(default)]
    pub targets: BTreeMap<String, TargetConfig>,
}

fn default_confs_dir() -> PathBuf {
    PathBuf::from("confs")
}

impl ProjectConfig {
    pub fn secrets_prefix(&self) -> &str {
        self.secrets_prefix
            .as_deref()
            .unwrap_or(&self.project_filename)
    }
}

// ---------------------------------------------------------------------------
// Resolved deployment
// ---------------------------------------------------------------------------

/// A project configuration resolved against one target.
///
/// This is the immutable value every component is constructed from; nothing
/// downstream reads configuration from anywhere else.
#[derive(Debug, Clone, PartialEq)]
pub struct Deployment {
    pub project: ProjectConfig,
    pub target_name: String,
    pub server: ServerConfig,
    /// Directory containing `stagehand.yaml`; relative paths resolve here.
    pub root: PathBuf,
}

impl Deployment {
    pub fn project_filename(&self) -> &str {
        &self.project.project_filename
    }

    pub fn services(&self) -> &[ServiceDescriptor] {
        &self.project.services
    }

    pub fn service(&self, name: &ServiceName) -> Option<&ServiceDescriptor> {
        self.project.services.iter().find(|s| &s.name == name)
    }

    /// `{root}/{confs_dir}`
    pub fn confs_dir(&self) -> PathBuf {
        self.root.join(&self.project.confs_dir)
    }

    /// `{root}/{confs_dir}/rendered`
    pub fn staging_dir(&self) -> PathBuf {
        self.confs_dir().join("rendered")
    }

    /// `{root}/{confs_dir}/{service}.{extension}`
    pub fn template_path(&self, service: &ServiceDescriptor) -> PathBuf {
        self.confs_dir().join(service.template_file_name())
    }

    /// `{root}/{confs_dir}/rendered/{project}.{service}.{extension}`
    pub fn staging_path(&self, service: &ServiceDescriptor) -> PathBuf {
        self.staging_dir()
            .join(service.artifact_file_name(self.project_filename()))
    }

    pub fn installed_path(&self, service: &ServiceDescriptor) -> RemotePath {
        service.installed_path(self.project_filename())
    }

    /// Static template variables, lowest precedence first: project `vars`,
    /// target `vars`, then the built-in keys.
    pub fn base_context(&self) -> BTreeMap<String, serde_yaml::Value> {
        let mut ctx = self.project.vars.clone();
        if let Some(target) = self.project.targets.get(&self.target_name) {
            for (k, v) in &target.vars {
                ctx.insert(k.clone(), v.clone());
            }
        }
        let builtins = [
            ("PROJECT_FILENAME", self.project.project_filename.as_str()),
            ("DEPLOYMENT_TARGET", self.target_name.as_str()),
            ("UWSGI_SOCKET_PATH", self.project.socket.path.as_str()),
            ("SERVER_HOST", self.server.host.as_str()),
            ("SERVER_USER", self.server.user.as_str()),
        ];
        for (k, v) in builtins {
            ctx.insert(k.to_string(), serde_yaml::Value::String(v.to_string()));
        }
        ctx
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn nginx() -> ServiceDescriptor {
        ServiceDescriptor {
            name: ServiceName::from("nginx"),
            installed_directory: RemotePath::from("/etc/nginx/sites-available/"),
            file_extension: "conf".to_string(),
        }
    }

    #[test]
    fn remote_path_join_collapses_slashes() {
        let p = RemotePath::from("/etc/uwsgi/sites/").join("/x.ini");
        assert_eq!(p.as_str(), "/etc/uwsgi/sites/x.ini");
    }

    #[test]
    fn remote_path_parent() {
        assert_eq!(
            RemotePath::from("/run/uwsgi/app.sock").parent(),
            Some(RemotePath::from("/run/uwsgi"))
        );
        assert_eq!(RemotePath::from("/sock").parent(), Some(RemotePath::from("/")));
        assert_eq!(RemotePath::from("sock").parent(), None);
    }

    #[test]
    fn descriptor_derived_names() {
        let svc = nginx();
        assert_eq!(svc.template_file_name(), "nginx.conf");
        assert_eq!(svc.artifact_file_name("newsapp"), "newsapp.nginx.conf");
        assert_eq!(
            svc.installed_path("newsapp").as_str(),
            "/etc/nginx/sites-available/newsapp.nginx.conf"
        );
        assert_eq!(svc.installed_service_name("newsapp"), "newsapp.nginx");
    }

    #[test]
    fn service_name_serializes_as_plain_string() {
        let yaml = serde_yaml::to_string(&ServiceName::from("uwsgi")).expect("serialize");
        assert_eq!(yaml.trim(), "uwsgi");
    }
}
