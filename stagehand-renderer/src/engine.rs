//! Tera rendering engine — [`TemplateEngine`] and the per-service [`Renderer`].
//!
//! # Path mapping
//!
//! | File       | Path                                                        |
//! |------------|-------------------------------------------------------------|
//! | Template   | `{root}/{confs_dir}/{service}.{ext}`                        |
//! | Staged     | `{root}/{confs_dir}/rendered/{project}.{service}.{ext}`     |

use std::path::{Path, PathBuf};

use tera::Tera;

use stagehand_core::{Deployment, ServiceDescriptor, ServiceName};

use crate::context::RenderContext;
use crate::error::{describe, io_err, RenderError};
use crate::secrets::SecretsProvider;

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Thin wrapper over [`Tera`] for rendering standalone template text.
///
/// Autoescaping is off: the output is configuration, not HTML. Placeholders
/// missing from the context are an error, never an empty string.
#[derive(Debug, Default)]
pub struct TemplateEngine;

impl TemplateEngine {
    pub fn new() -> Self {
        TemplateEngine
    }

    /// Render `source` (registered under `name` for error messages).
    pub fn render_str(
        &self,
        name: &str,
        source: &str,
        ctx: &RenderContext,
    ) -> Result<String, RenderError> {
        let template_err = |source: tera::Error| RenderError::Template {
            template: name.to_string(),
            message: ctx.redact(&describe(&source)),
        };

        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_template(name, source).map_err(template_err)?;
        tera.render(name, &ctx.to_tera_context())
            .map_err(template_err)
    }
}

// ---------------------------------------------------------------------------
// RenderedArtifact
// ---------------------------------------------------------------------------

/// A template rendered into the local staging directory.
#[derive(Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    pub service: ServiceName,
    pub path: PathBuf,
    pub content: String,
}

// Rendered content routinely embeds secrets; keep it out of debug output.
impl std::fmt::Debug for RenderedArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderedArtifact")
            .field("service", &self.service)
            .field("path", &self.path)
            .field("bytes", &self.content.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Renders service templates for one [`Deployment`].
///
/// Secrets are fetched from the provider on every [`Renderer::render`] call
/// and dropped when it returns.
pub struct Renderer<'a> {
    deployment: &'a Deployment,
    secrets: &'a dyn SecretsProvider,
    engine: TemplateEngine,
}

impl<'a> Renderer<'a> {
    pub fn new(deployment: &'a Deployment, secrets: &'a dyn SecretsProvider) -> Self {
        Renderer {
            deployment,
            secrets,
            engine: TemplateEngine::new(),
        }
    }

    /// Render one service's template and stage it, overwriting any previous
    /// staged file for the same service.
    pub fn render(&self, service: &ServiceDescriptor) -> Result<RenderedArtifact, RenderError> {
        let template_path = self.deployment.template_path(service);
        let source =
            std::fs::read_to_string(&template_path).map_err(|e| io_err(&template_path, e))?;

        let ctx = RenderContext::merge(
            &self.deployment.base_context(),
            self.secrets.get_secrets(),
        );
        let content = self
            .engine
            .render_str(&service.template_file_name(), &source, &ctx)?;
        drop(ctx);

        let path = self.deployment.staging_path(service);
        write_staged(&path, &content)?;
        tracing::debug!(service = %service.name, path = %path.display(), "rendered");

        Ok(RenderedArtifact {
            service: service.name.clone(),
            path,
            content,
        })
    }

    /// Render every declared service in declaration order, stopping at the
    /// first failure.
    pub fn render_all(&self) -> Result<Vec<RenderedArtifact>, RenderError> {
        self.deployment
            .services()
            .iter()
            .map(|service| self.render(service))
            .collect()
    }
}

/// Write via a `.tmp` sibling and rename, so a failed write never leaves a
/// truncated staged file behind.
fn write_staged(path: &Path, content: &str) -> Result<(), RenderError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let tmp = PathBuf::from(format!("{}.tmp", path.display()));
    std::fs::write(&tmp, content).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn ctx(pairs: &[(&str, &str)]) -> RenderContext {
        let base = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), serde_yaml::Value::from(*v)))
            .collect();
        RenderContext::merge(&base, BTreeMap::new())
    }

    #[test]
    fn substitutes_placeholders() {
        let out = TemplateEngine::new()
            .render_str(
                "nginx.conf",
                "server_name {{ SERVER_NAME }};\n",
                &ctx(&[("SERVER_NAME", "example.com")]),
            )
            .unwrap();
        assert_eq!(out.trim_end(), "server_name example.com;");
    }

    #[test]
    fn unresolved_placeholder_is_an_error() {
        let err = TemplateEngine::new()
            .render_str("app.ini", "socket = {{ MISSING }}", &ctx(&[]))
            .unwrap_err();
        assert!(matches!(err, RenderError::Template { ref template, .. } if template == "app.ini"));
        assert!(err.to_string().contains("MISSING"), "got: {err}");
    }

    #[test]
    fn syntax_error_is_an_error() {
        let err = TemplateEngine::new()
            .render_str("broken.conf", "{{ unclosed", &ctx(&[]))
            .unwrap_err();
        assert!(matches!(err, RenderError::Template { .. }));
    }

    #[test]
    fn filter_errors_do_not_quote_secrets() {
        let mut secrets = BTreeMap::new();
        secrets.insert("DB_PASSWORD".to_string(), "s3cr3t-pa55".to_string());
        let ctx = RenderContext::merge(&BTreeMap::new(), secrets);
        for source in [
            "{{ DB_PASSWORD | round }}",
            "{{ DB_PASSWORD | filesizeformat }}",
            "{{ DB_PASSWORD | date }}",
            "{{ DB_PASSWORD | first }}",
        ] {
            let err = TemplateEngine::new()
                .render_str("app.ini", source, &ctx)
                .unwrap_err();
            let text = err.to_string();
            assert!(!text.contains("s3cr3t-pa55"), "{source}: {text}");
            assert!(text.contains("app.ini"));
        }
    }

    #[test]
    fn html_like_names_are_not_escaped() {
        let out = TemplateEngine::new()
            .render_str("page.html", "{{ V }}", &ctx(&[("V", "<a & b>")]))
            .unwrap();
        assert_eq!(out, "<a & b>");
    }

    #[test]
    fn staged_write_creates_directory_and_leaves_no_tmp() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("confs").join("rendered").join("x.nginx.conf");
        write_staged(&path, "a").unwrap();
        write_staged(&path, "b").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "b");
        assert!(!PathBuf::from(format!("{}.tmp", path.display())).exists());
    }
}
