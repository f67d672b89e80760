//! Secrets providers.

use std::collections::BTreeMap;

/// Source of secret template variables.
///
/// Called once per render; implementations must not cache the values on the
/// renderer's behalf.
pub trait SecretsProvider {
    fn get_secrets(&self) -> BTreeMap<String, String>;
}

/// Static secrets, mostly useful in tests.
impl SecretsProvider for BTreeMap<String, String> {
    fn get_secrets(&self) -> BTreeMap<String, String> {
        self.clone()
    }
}

/// Secrets read from environment variables named `{prefix}_{KEY}`.
///
/// The prefix and the joining underscore are stripped, so
/// `NEWSAPP_DB_PASSWORD` is exposed to templates as `DB_PASSWORD`.
#[derive(Debug, Clone)]
pub struct EnvSecrets {
    prefix: String,
}

impl EnvSecrets {
    pub fn new(prefix: impl Into<String>) -> Self {
        EnvSecrets {
            prefix: prefix.into(),
        }
    }

    /// Filter an arbitrary `(name, value)` iterator the same way
    /// [`SecretsProvider::get_secrets`] filters the process environment.
    pub fn collect_from<I>(&self, vars: I) -> BTreeMap<String, String>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let marker = format!("{}_", self.prefix);
        vars.into_iter()
            .filter_map(|(name, value)| {
                let key = name.strip_prefix(&marker)?;
                if key.is_empty() {
                    return None;
                }
                Some((key.to_string(), value))
            })
            .collect()
    }
}

impl SecretsProvider for EnvSecrets {
    /// Variables whose name or value is not valid UTF-8 are skipped.
    fn get_secrets(&self) -> BTreeMap<String, String> {
        self.collect_from(
            std::env::vars_os()
                .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?))),
        )
    }
}
