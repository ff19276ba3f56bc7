//! Nested configuration forwarding for composite providers.
//!
//! Some providers front several backend implementations, with the real
//! backend chosen by one of the provider's own option values. Their
//! backend options live one layer below the provider's declared option
//! set, keyed in the flat configuration map by a `"<selector>-"` prefix.
//! Resolution is two-phase: the provider is first built and configured
//! normally, then the backend selector is read off the instance and the
//! prefixed keys are forwarded to the chosen backend's option set.

use crate::error::RegistryError;
use crate::value::ConfigMap;

/// Capability implemented by providers with selector-chosen backends.
///
/// Callers probe for this capability explicitly (typically through an
/// `as_composite_mut` accessor on the provider trait) and branch on its
/// presence; providers without it are used as configured by the registry
/// alone.
pub trait Composite {
    /// The configured backend selector, e.g. the scheme of a key
    /// reference. `None` or an empty string means no backend is selected
    /// and nested resolution is a no-op.
    fn backend_selector(&self) -> Option<String>;

    /// Configures the backend named by `selector` from an already
    /// prefix-stripped config map.
    ///
    /// Implementations derive the declared option-set name by convention
    /// (`"<family>-<selector>"`), apply that set's defaults, then apply
    /// `scoped` under the registry's strict, fail-fast rules.
    ///
    /// # Errors
    ///
    /// `UnknownBackend` when the selector names no declared option set;
    /// otherwise the same errors as registry option application.
    fn configure_backend(&mut self, selector: &str, scoped: &ConfigMap)
        -> Result<(), RegistryError>;
}

/// Forwards backend-scoped options from a flat config map.
///
/// Selects the keys of `config` carrying the `"<selector>-"` prefix,
/// strips the prefix, and hands them to the provider's backend
/// configuration. Keys without the prefix belong to the top-level
/// provider and are ignored here, as are keys carrying some other
/// backend's prefix.
///
/// # Errors
///
/// Propagates `configure_backend` failures. An absent or empty selector
/// is not an error; the call is a no-op.
pub fn forward_backend_options(
    composite: &mut dyn Composite,
    config: &ConfigMap,
) -> Result<(), RegistryError> {
    let Some(selector) = composite.backend_selector() else {
        return Ok(());
    };
    if selector.is_empty() {
        return Ok(());
    }

    let prefix = format!("{selector}-");
    let scoped: ConfigMap = config
        .iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(&prefix)
                .map(|stripped| (stripped.to_string(), value.clone()))
        })
        .collect();

    composite.configure_backend(&selector, &scoped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::OptionValue;

    #[derive(Default)]
    struct FakeComposite {
        selector: Option<String>,
        configured_with: Option<(String, ConfigMap)>,
    }

    impl Composite for FakeComposite {
        fn backend_selector(&self) -> Option<String> {
            self.selector.clone()
        }

        fn configure_backend(
            &mut self,
            selector: &str,
            scoped: &ConfigMap,
        ) -> Result<(), RegistryError> {
            self.configured_with = Some((selector.to_string(), scoped.clone()));
            Ok(())
        }
    }

    fn config(entries: &[(&str, &str)]) -> ConfigMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), OptionValue::from(*v)))
            .collect()
    }

    #[test]
    fn missing_selector_is_a_noop() {
        let mut provider = FakeComposite::default();
        let flat = config(&[("vault-address", "http://localhost:8200")]);

        forward_backend_options(&mut provider, &flat).unwrap();

        assert!(provider.configured_with.is_none());
    }

    #[test]
    fn empty_selector_is_a_noop() {
        let mut provider = FakeComposite {
            selector: Some(String::new()),
            ..Default::default()
        };

        forward_backend_options(&mut provider, &ConfigMap::new()).unwrap();

        assert!(provider.configured_with.is_none());
    }

    #[test]
    fn prefixed_keys_are_stripped_and_forwarded() {
        let mut provider = FakeComposite {
            selector: Some("vault".to_string()),
            ..Default::default()
        };
        let flat = config(&[
            ("ref", "vault:my-key"),
            ("vault-address", "http://localhost:8200"),
            ("vault-token-file", "/run/secrets/token"),
        ]);

        forward_backend_options(&mut provider, &flat).unwrap();

        let (selector, scoped) = provider.configured_with.unwrap();
        assert_eq!(selector, "vault");
        assert_eq!(scoped.len(), 2);
        assert_eq!(scoped["address"].as_str(), Some("http://localhost:8200"));
        assert_eq!(scoped["token-file"].as_str(), Some("/run/secrets/token"));
    }

    #[test]
    fn other_backend_prefixes_are_ignored() {
        let mut provider = FakeComposite {
            selector: Some("vault".to_string()),
            ..Default::default()
        };
        let flat = config(&[
            ("gcp-project", "some-project"),
            ("vault-address", "http://localhost:8200"),
        ]);

        forward_backend_options(&mut provider, &flat).unwrap();

        let (_, scoped) = provider.configured_with.unwrap();
        assert_eq!(scoped.len(), 1);
        assert!(!scoped.contains_key("project"));
    }
}
