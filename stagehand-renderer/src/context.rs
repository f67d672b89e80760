//! Render context — static configuration overlaid with secrets.

use std::collections::BTreeMap;
use std::fmt;

use serde_yaml::Value;

/// Variables available to a template during one render.
///
/// Built by copying the static base context and overlaying secrets on top,
/// so secrets never flow back into the configuration the context came from.
/// `Debug` prints keys only: a context may hold secret values and must stay
/// safe to log.
#[derive(Clone, Default, PartialEq)]
pub struct RenderContext {
    values: BTreeMap<String, Value>,
    /// Secret values, longest first, for scrubbing error text.
    secrets: Vec<String>,
}

impl RenderContext {
    /// Copy `base` and overlay `secrets`. Secrets win on key collision.
    pub fn merge(base: &BTreeMap<String, Value>, secrets: BTreeMap<String, String>) -> Self {
        let mut values = base.clone();
        let mut secret_values = Vec::with_capacity(secrets.len());
        for (key, secret) in secrets {
            if !secret.is_empty() {
                secret_values.push(secret.clone());
            }
            values.insert(key, Value::String(secret));
        }
        secret_values.sort_by(|a, b| b.len().cmp(&a.len()));
        RenderContext {
            values,
            secrets: secret_values,
        }
    }

    /// Replace every secret value in `text` with `***`, both verbatim and in
    /// its escaped (quoted-string) form.
    pub fn redact(&self, text: &str) -> String {
        let mut out = text.to_string();
        for secret in &self.secrets {
            out = out.replace(secret.as_str(), "***");
            let escaped = format!("{secret:?}");
            let escaped = &escaped[1..escaped.len() - 1];
            if escaped != secret {
                out = out.replace(escaped, "***");
            }
        }
        out
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> tera::Context {
        let mut ctx = tera::Context::new();
        for (key, value) in &self.values {
            ctx.insert(key.as_str(), value);
        }
        ctx
    }
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
