//! Stagehand core library: domain types, config loading, errors.
//!
//! - [`types`] — newtypes, service descriptors, config sections
//! - [`config`] — load / validate / resolve `stagehand.yaml`
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use error::ConfigError;
pub use types::{
    Deployment, NginxConfig, ProjectConfig, RemotePath, ServerConfig, ServiceDescriptor,
    ServiceKind, ServiceName, SocketConfig, TargetConfig,
};
