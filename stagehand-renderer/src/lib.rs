//! # stagehand-renderer
//!
//! Tera-based renderer that turns per-service configuration templates into
//! staged files, using static configuration overlaid with secrets.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use stagehand_core::config;
//! use stagehand_renderer::{EnvSecrets, Renderer};
//!
//! fn render_everything() {
//!     if let Ok(deployment) = config::load_deployment("production") {
//!         let secrets = EnvSecrets::new(deployment.project.secrets_prefix());
//!         let renderer = Renderer::new(&deployment, &secrets);
//!         if let Ok(artifacts) = renderer.render_all() {
//!             for artifact in artifacts {
//!                 println!("{}: {} bytes", artifact.path.display(), artifact.content.len());
//!             }
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod secrets;

pub use context::RenderContext;
pub use engine::{RenderedArtifact, Renderer, TemplateEngine};
pub use error::RenderError;
pub use secrets::{EnvSecrets, SecretsProvider};
