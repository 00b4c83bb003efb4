//! Secret decryption and `${NAME}` placeholder substitution.
//!
//! Every string leaf read from an account file goes through
//! [`ValueResolver::resolve`]:
//!
//! 1. decrypt the raw text,
//! 2. replace `${NAME}` tokens with the value of the environment variable
//!    `NAME`, leaving the token untouched when the variable is unset,
//! 3. decrypt again, so an environment variable may itself hold an
//!    encrypted reference.
//!
//! The decryption backend is external; Stratus only sees it through the
//! [`SecretResolver`] trait.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};
use serde_json::Value;
use tracing::debug;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]*)\}").unwrap_or_else(|e| panic!("invalid placeholder pattern: {e}"))
});

/// Decrypts secret references embedded in configuration values.
///
/// Implementations must return non-encrypted text unchanged, since the
/// resolver is applied to every string value, encrypted or not.
pub trait SecretResolver: Send + Sync {
    /// Decrypts `raw`, returning it as-is when it is not a secret reference.
    fn decrypt(&self, raw: &str) -> String;
}

impl<F> SecretResolver for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn decrypt(&self, raw: &str) -> String {
        self(raw)
    }
}

/// A resolver that performs no decryption.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughResolver;

impl SecretResolver for PassthroughResolver {
    fn decrypt(&self, raw: &str) -> String {
        raw.to_string()
    }
}

/// Looks up values for `${NAME}` placeholders.
pub trait VariableLookup: Send + Sync {
    /// Returns the value of `name`, or `None` when it is not set.
    fn lookup(&self, name: &str) -> Option<String>;
}

/// Reads placeholders from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl VariableLookup for ProcessEnv {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl VariableLookup for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Applies decryption and placeholder substitution to configuration values.
#[derive(Clone)]
pub struct ValueResolver {
    secrets: Arc<dyn SecretResolver>,
    variables: Arc<dyn VariableLookup>,
}

impl ValueResolver {
    /// Creates a resolver that substitutes from the process environment.
    pub fn new(secrets: Arc<dyn SecretResolver>) -> Self {
        Self {
            secrets,
            variables: Arc::new(ProcessEnv),
        }
    }

    /// Replaces the placeholder lookup.
    pub fn with_variables(mut self, variables: Arc<dyn VariableLookup>) -> Self {
        self.variables = variables;
        self
    }

    /// Resolves a single string value.
    pub fn resolve(&self, raw: &str) -> String {
        let value = self.secrets.decrypt(raw);
        if !PLACEHOLDER.is_match(&value) {
            return value;
        }

        debug!("Property value {} will be replaced with env var", value);
        let substituted = PLACEHOLDER.replace_all(&value, |caps: &Captures<'_>| {
            self.variables
                .lookup(&caps[1])
                .unwrap_or_else(|| caps[0].to_string())
        });
        self.secrets.decrypt(&substituted)
    }

    /// Resolves every string leaf of a document tree in place.
    ///
    /// Map keys are left untouched.
    pub fn resolve_tree(&self, value: &mut Value) {
        match value {
            Value::String(s) => *s = self.resolve(s),
            Value::Array(items) => items.iter_mut().for_each(|item| self.resolve_tree(item)),
            Value::Object(map) => map.values_mut().for_each(|item| self.resolve_tree(item)),
            Value::Null | Value::Bool(_) | Value::Number(_) => {},
        }
    }
}

impl Default for ValueResolver {
    fn default() -> Self {
        Self::new(Arc::new(PassthroughResolver))
    }
}

impl std::fmt::Debug for ValueResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(pairs: &[(&str, &str)]) -> Arc<dyn VariableLookup> {
        Arc::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        )
    }

    #[test]
    fn test_plain_value_is_untouched() {
        let resolver = ValueResolver::default();
        assert_eq!(resolver.resolve("kube-1"), "kube-1");
    }

    #[test]
    fn test_set_variable_is_substituted() {
        let resolver = ValueResolver::default().with_variables(vars(&[("CLUSTER", "prod")]));
        assert_eq!(resolver.resolve("${CLUSTER}"), "prod");
        assert_eq!(resolver.resolve("kube-${CLUSTER}-east"), "kube-prod-east");
    }

    #[test]
    fn test_unset_variable_keeps_placeholder() {
        let resolver = ValueResolver::default().with_variables(vars(&[]));
        assert_eq!(resolver.resolve("${UNKNOWN}"), "${UNKNOWN}");
    }

    #[test]
    fn test_process_environment_lookup() {
        let resolver = ValueResolver::default();
        match std::env::var("PATH") {
            Ok(path) => assert_eq!(resolver.resolve("${PATH}"), path),
            Err(_) => assert_eq!(resolver.resolve("${PATH}"), "${PATH}"),
        }
    }

    #[test]
    fn test_decrypt_runs_before_and_after_substitution() {
        let secrets: Arc<dyn SecretResolver> = Arc::new(|raw: &str| match raw {
            "encrypted:token" => "${TOKEN_REF}".to_string(),
            "encrypted:inner" => "s3cr3t".to_string(),
            other => other.to_string(),
        });
        let resolver =
            ValueResolver::new(secrets).with_variables(vars(&[("TOKEN_REF", "encrypted:inner")]));

        assert_eq!(resolver.resolve("encrypted:token"), "s3cr3t");
    }

    #[test]
    fn test_decrypt_once_without_placeholder() {
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let secrets: Arc<dyn SecretResolver> = Arc::new(move |raw: &str| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            raw.to_string()
        });

        ValueResolver::new(secrets).resolve("plain");
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn test_resolve_tree_visits_every_string_leaf() {
        let resolver = ValueResolver::default().with_variables(vars(&[("NS", "team-a")]));
        let mut doc = json!({
            "name": "kube-1",
            "namespaces": ["${NS}", "shared"],
            "nested": {"ns": "${NS}", "port": 443, "enabled": true},
            "${NS}": "key stays"
        });

        resolver.resolve_tree(&mut doc);

        assert_eq!(doc["namespaces"], json!(["team-a", "shared"]));
        assert_eq!(doc["nested"]["ns"], json!("team-a"));
        assert_eq!(doc["nested"]["port"], json!(443));
        assert_eq!(doc["${NS}"], json!("key stays"));
    }
}
