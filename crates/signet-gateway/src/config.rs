//! Gateway configuration.
//!
//! Configuration is loaded in priority order: environment variables
//! (prefix `SIGNET_`, highest), then the YAML configuration file, then
//! built-in defaults. Route options stay untyped here; they are
//! interpreted by the provider registry, not by the configuration layer.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use signet_registry::ConfigMap;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "SIGNET_CONFIG_PATH";

/// Configuration file consulted when `SIGNET_CONFIG_PATH` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "/signet-config.yaml";

/// Complete gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the HTTP server binds to.
    ///
    /// Environment variable: `SIGNET_LISTEN_ADDR`
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Base URL of the remote attestation archive. Unset disables the
    /// remote sink.
    ///
    /// Environment variable: `SIGNET_ARCHIVE_URL`
    #[serde(default)]
    pub archive_url: Option<String>,

    /// Directory for content-addressed local copies of signed envelopes.
    /// Unset disables the local sink.
    ///
    /// Environment variable: `SIGNET_ATTESTATION_DIR`
    #[serde(default)]
    pub attestation_dir: Option<PathBuf>,

    /// Configured webhook routes, keyed by route name. The key doubles
    /// as the URL path segment, so it must be unique and path-safe.
    #[serde(default)]
    pub webhooks: BTreeMap<String, RouteConfig>,
}

/// One configured webhook route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Webhook handler implementation to use.
    #[serde(rename = "type")]
    pub handler_type: String,

    /// Handler options, interpreted by the registry.
    #[serde(default)]
    pub options: ConfigMap,

    /// Signer provider implementation to use.
    pub signer: String,

    /// Signer provider options, including any backend-prefixed keys for
    /// composite providers.
    #[serde(default)]
    pub signer_options: ConfigMap,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            archive_url: None,
            attestation_dir: None,
            webhooks: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Loads configuration from defaults, the YAML file, and environment.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be parsed or the merged configuration
    /// is invalid.
    pub fn load(path: &str) -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("SIGNET_"));

        let config: Self = figment.extract().context("failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Parses the listen address into a socket address.
    ///
    /// # Errors
    ///
    /// Fails when `listen_addr` is not a valid `host:port`.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.listen_addr
            .parse()
            .with_context(|| format!("invalid listen address {:?}", self.listen_addr))
    }

    fn validate(&self) -> Result<()> {
        for name in self.webhooks.keys() {
            if !is_valid_route_name(name) {
                anyhow::bail!("webhook name {name:?} is not a valid path segment");
            }
        }
        Ok(())
    }
}

/// A route name must be usable verbatim as a URL path segment.
///
/// Restricted to a conservative charset: the router's path parser assigns
/// meaning to characters like `/`, `{` and `}`, and a name slipping
/// through here would abort route registration instead of failing with a
/// configuration error.
pub(crate) fn is_valid_route_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn default_listen_addr() -> String {
    "0.0.0.0:8085".to_string()
}
