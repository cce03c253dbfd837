//! # organizer-cli — Approver and Batch Builder Tooling
//!
//! Client-side counterparts of the engine's checks, so approvers and batch
//! builders can produce exactly what the executor will verify.
//!
//! ## Subcommands
//!
//! - `identity`: derive an approver identity from a seed, or generate one
//! - `leaf`: encode a payout into its commitment leaf
//! - `tree`: build a commitment tree over a payout list, with proofs
//! - `sign`: sign a commitment root for an organization
//! - `verify`: check an inclusion proof against a root
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers here take parsed
//!   arguments and an output sink, and return an exit code.
//! - Handlers delegate to the library crates. No commitment or signature
//!   logic is implemented here.

use std::path::Path;

use anyhow::{Context, Result};
use organizer_engine::EngineConfig;

pub mod identity;
pub mod leaf;
pub mod signing;
pub mod tree;
pub mod verify;

/// Load engine configuration from `path`, or from the environment when no
/// path is given.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_yaml_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => EngineConfig::from_env().context("failed to load config from environment"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "domain:").unwrap();
        writeln!(file, "  chain_id: 5").unwrap();
        writeln!(file, "  verifying_context: \"{}\"", "01".repeat(32)).unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.domain.chain_id, 5);
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Some(Path::new("/nonexistent/organizer.yaml"))).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/organizer.yaml"));
    }
}
