//! # Sign Subcommand
//!
//! Signs a commitment root for an organization under the configured
//! signing domain and prints the submission-ready signature as JSON.
//!
//! ## Security Invariant
//!
//! The seed is read from a file, never from the command line, so it does
//! not land in shell history or process listings.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use organizer_core::{Hash32, Identity, OrgId};
use organizer_crypto::{sign_root, ApproverKeypair, SigningDomain};

use crate::identity::parse_seed;

#[derive(Args, Debug)]
pub struct SignArgs {
    /// File holding the approver's hex-encoded 32-byte seed.
    #[arg(long)]
    pub seed_file: PathBuf,
    /// Organization (controller identity, 64 hex chars).
    #[arg(long)]
    pub org: String,
    /// Commitment root to sign (64 hex chars).
    #[arg(long)]
    pub root: String,
}

pub fn run_sign(args: &SignArgs, domain: &SigningDomain, out: &mut impl Write) -> Result<u8> {
    let seed = std::fs::read_to_string(&args.seed_file)
        .with_context(|| format!("failed to read seed: {}", args.seed_file.display()))?;
    let key = ApproverKeypair::from_seed(&parse_seed(&seed)?);
    let org = OrgId::new(Identity::from_hex(&args.org).context("invalid --org")?);
    let root = Hash32::from_hex(&args.root).context("invalid --root")?;

    let signature = sign_root(&key, domain, &org, &root)?;
    tracing::info!(org = %org, root = %root, signer = %signature.signer, "root signed");
    serde_json::to_writer_pretty(&mut *out, &signature)?;
    writeln!(out)?;
    Ok(0)
}
