//! Engine configuration.
//!
//! Loaded from a YAML file or from `ORGANIZER_*` environment variables.
//! Only the verifying context is required; everything else has a default.

use std::path::Path;

use organizer_core::Identity;
use organizer_crypto::{PairOrdering, SigningDomain};
use serde::{Deserialize, Serialize};

/// Default cap on payouts per batch.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 256;

/// Signing domain settings. Converted to a [`SigningDomain`] at use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainConfig {
    #[serde(default = "default_domain_name")]
    pub name: String,
    #[serde(default = "default_domain_version")]
    pub version: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    pub verifying_context: Identity,
}

/// Deployment-wide engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub domain: DomainConfig,
    /// Pair-ordering rule shared with every tree builder.
    #[serde(default)]
    pub pair_ordering: PairOrdering,
    /// Identity allowed to pause and unpause execution.
    #[serde(default)]
    pub master_operator: Option<Identity>,
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

fn default_domain_name() -> String {
    "organizer".to_string()
}

fn default_domain_version() -> String {
    "1".to_string()
}

fn default_chain_id() -> u64 {
    1
}

fn default_max_batch_size() -> usize {
    DEFAULT_MAX_BATCH_SIZE
}

impl EngineConfig {
    /// Defaults for everything except the verifying context.
    pub fn new(verifying_context: Identity) -> Self {
        Self {
            domain: DomainConfig {
                name: default_domain_name(),
                version: default_domain_version(),
                chain_id: default_chain_id(),
                verifying_context,
            },
            pair_ordering: PairOrdering::default(),
            master_operator: None,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `ORGANIZER_VERIFYING_CONTEXT` (required, 64 hex chars)
    /// - `ORGANIZER_DOMAIN_NAME` (default: `organizer`)
    /// - `ORGANIZER_DOMAIN_VERSION` (default: `1`)
    /// - `ORGANIZER_CHAIN_ID` (default: 1)
    /// - `ORGANIZER_PAIR_ORDERING` (`sorted` or `positional`, default: `sorted`)
    /// - `ORGANIZER_MASTER_OPERATOR` (optional, 64 hex chars)
    /// - `ORGANIZER_MAX_BATCH_SIZE` (default: 256)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let verifying_context = lookup("ORGANIZER_VERIFYING_CONTEXT")
            .ok_or(ConfigError::Missing("ORGANIZER_VERIFYING_CONTEXT"))
            .and_then(|raw| parse_var("ORGANIZER_VERIFYING_CONTEXT", &raw))?;

        let mut config = Self::new(verifying_context);
        if let Some(name) = lookup("ORGANIZER_DOMAIN_NAME") {
            config.domain.name = name;
        }
        if let Some(version) = lookup("ORGANIZER_DOMAIN_VERSION") {
            config.domain.version = version;
        }
        if let Some(raw) = lookup("ORGANIZER_CHAIN_ID") {
            config.domain.chain_id = parse_var("ORGANIZER_CHAIN_ID", &raw)?;
        }
        if let Some(raw) = lookup("ORGANIZER_PAIR_ORDERING") {
            config.pair_ordering = parse_var("ORGANIZER_PAIR_ORDERING", &raw)?;
        }
        if let Some(raw) = lookup("ORGANIZER_MASTER_OPERATOR") {
            config.master_operator = Some(parse_var("ORGANIZER_MASTER_OPERATOR", &raw)?);
        }
        if let Some(raw) = lookup("ORGANIZER_MAX_BATCH_SIZE") {
            config.max_batch_size = parse_var("ORGANIZER_MAX_BATCH_SIZE", &raw)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// The domain approval signatures are checked under.
    pub fn signing_domain(&self) -> SigningDomain {
        SigningDomain {
            name: self.domain.name.clone(),
            version: self.domain.version.clone(),
            chain_id: self.domain.chain_id,
            verifying_context: self.domain.verifying_context,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_batch_size == 0 {
            return Err(ConfigError::Invalid {
                var: "max_batch_size".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_var<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: String, reason: String },
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config document: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    const CONTEXT: &str = "cccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc";

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_defaults_from_minimal_env() {
        let cfg =
            EngineConfig::from_lookup(lookup(&[("ORGANIZER_VERIFYING_CONTEXT", CONTEXT)])).unwrap();
        assert_eq!(cfg, EngineConfig::new(Identity([0xcc; 32])));
        assert_eq!(cfg.domain.name, "organizer");
        assert_eq!(cfg.domain.chain_id, 1);
        assert_eq!(cfg.pair_ordering, PairOrdering::Sorted);
        assert_eq!(cfg.max_batch_size, 256);
        assert!(cfg.master_operator.is_none());
    }

    #[test]
    fn test_missing_context_rejected() {
        let err = EngineConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("ORGANIZER_VERIFYING_CONTEXT")));
    }

    #[test]
    fn test_overrides_from_env() {
        let operator = "ab".repeat(32);
        let cfg = EngineConfig::from_lookup(lookup(&[
            ("ORGANIZER_VERIFYING_CONTEXT", CONTEXT),
            ("ORGANIZER_DOMAIN_NAME", "payroll"),
            ("ORGANIZER_CHAIN_ID", "31337"),
            ("ORGANIZER_PAIR_ORDERING", "positional"),
            ("ORGANIZER_MASTER_OPERATOR", operator.as_str()),
            ("ORGANIZER_MAX_BATCH_SIZE", "10"),
        ]))
        .unwrap();
        assert_eq!(cfg.domain.name, "payroll");
        assert_eq!(cfg.signing_domain().chain_id, 31337);
        assert_eq!(cfg.pair_ordering, PairOrdering::Positional);
        assert_eq!(cfg.master_operator, Some(Identity([0xab; 32])));
        assert_eq!(cfg.max_batch_size, 10);
    }

    #[test]
    fn test_invalid_value_names_variable() {
        let err = EngineConfig::from_lookup(lookup(&[
            ("ORGANIZER_VERIFYING_CONTEXT", CONTEXT),
            ("ORGANIZER_CHAIN_ID", "mainnet"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("ORGANIZER_CHAIN_ID"), "{err}");

        let err = EngineConfig::from_lookup(lookup(&[
            ("ORGANIZER_VERIFYING_CONTEXT", CONTEXT),
            ("ORGANIZER_MAX_BATCH_SIZE", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_yaml_with_defaults() {
        let yaml = format!("domain:\n  verifying_context: \"{CONTEXT}\"\npair_ordering: positional\n");
        let cfg = EngineConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(cfg.domain.version, "1");
        assert_eq!(cfg.pair_ordering, PairOrdering::Positional);
        assert_eq!(cfg.max_batch_size, DEFAULT_MAX_BATCH_SIZE);
    }

    #[test]
    fn test_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "domain:").unwrap();
        writeln!(file, "  name: staging").unwrap();
        writeln!(file, "  verifying_context: \"{CONTEXT}\"").unwrap();
        writeln!(file, "max_batch_size: 8").unwrap();
        let cfg = EngineConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(cfg.domain.name, "staging");
        assert_eq!(cfg.max_batch_size, 8);

        let missing = EngineConfig::from_yaml_file(Path::new("/nonexistent/organizer.yaml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
