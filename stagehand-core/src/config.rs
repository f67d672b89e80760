//! `stagehand.yaml` loading, validation and target resolution.
//!
//! # API pattern
//!
//! Every loader has two forms:
//! - `fn_at(path, …)` — explicit config path; used in tests with `TempDir`
//! - `fn(…)` — reads [`CONFIG_FILE_NAME`] from the current directory
//!
//! Tests must NEVER call the no-arg wrappers; always use `_at`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::{io_err, ConfigError};
use crate::types::{Deployment, ProjectConfig};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "stagehand.yaml";

// ---------------------------------------------------------------------------
// 1. Load
// ---------------------------------------------------------------------------

/// Parse and validate the config at `path`.
///
/// Returns `ConfigError::NotFound` if absent, `ConfigError::Parse` (with
/// path + line context) if the YAML is malformed.
pub fn load_at(path: &Path) -> Result<ProjectConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let config: ProjectConfig = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<ProjectConfig, ConfigError> {
    load_at(Path::new(CONFIG_FILE_NAME))
}

// ---------------------------------------------------------------------------
// 2. Validate
// ---------------------------------------------------------------------------

/// Check the invariants the rest of the workspace relies on: a project
/// filename, unique service names, and names/extensions usable as file name
/// components.
pub fn validate(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project_filename.trim().is_empty() {
        return Err(ConfigError::MissingProjectFilename);
    }
    if let Some(reason) = component_problem("project_filename", &config.project_filename) {
        return Err(ConfigError::InvalidProjectFilename {
            value: config.project_filename.clone(),
            reason,
        });
    }

    let mut seen = BTreeSet::new();
    for service in &config.services {
        let name = &service.name.0;
        if !seen.insert(name.as_str()) {
            return Err(ConfigError::DuplicateService { name: name.clone() });
        }
        check_component(name, "name", name)?;
        check_component(name, "file_extension", &service.file_extension)?;
        if service.installed_directory.as_str().is_empty() {
            return Err(ConfigError::InvalidService {
                name: name.clone(),
                reason: "installed_directory must not be empty".to_string(),
            });
        }
    }
    Ok(())
}

fn check_component(service: &str, field: &str, value: &str) -> Result<(), ConfigError> {
    match component_problem(field, value) {
        None => Ok(()),
        Some(reason) => Err(ConfigError::InvalidService {
            name: service.to_string(),
            reason,
        }),
    }
}

/// Why `value` cannot be used as one file name component, if it cannot.
fn component_problem(field: &str, value: &str) -> Option<String> {
    if value.is_empty() {
        Some(format!("{field} must not be empty"))
    } else if value.contains('/') {
        Some(format!("{field} must not contain '/'"))
    } else if value == "." || value == ".." {
        Some(format!("{field} must not be '{value}'"))
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// 3. Resolve
// ---------------------------------------------------------------------------

/// Resolve `config` against `target`. `root` is the directory the config was
/// read from.
pub fn resolve(
    config: ProjectConfig,
    root: PathBuf,
    target: &str,
) -> Result<Deployment, ConfigError> {
    let Some(target_config) = config.targets.get(target) else {
        let declared = config
            .targets
            .keys()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        return Err(ConfigError::UnknownTarget {
            name: target.to_string(),
            declared,
        });
    };
    let server = target_config.server.clone();
    Ok(Deployment {
        project: config,
        target_name: target.to_string(),
        server,
        root,
    })
}

/// Load the config at `path` and resolve it against `target`.
pub fn load_deployment_at(path: &Path, target: &str) -> Result<Deployment, ConfigError> {
    let config = load_at(path)?;
    resolve(config, config_root(path), target)
}

/// `load_deployment_at` convenience wrapper.
pub fn load_deployment(target: &str) -> Result<Deployment, ConfigError> {
    load_deployment_at(Path::new(CONFIG_FILE_NAME), target)
}

/// Directory relative paths in a config resolve against.
pub fn config_root(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
