//! # Identity Subcommand
//!
//! Derives an approver identity from a 32-byte seed. Without a seed, a
//! fresh one is generated and printed alongside its identity.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use rand::RngCore;

use organizer_crypto::ApproverKeypair;

#[derive(Args, Debug)]
pub struct IdentityArgs {
    /// Hex-encoded 32-byte seed. Generated when omitted.
    #[arg(long)]
    pub seed: Option<String>,
}

/// Parse a 64-hex-char seed.
pub fn parse_seed(hex: &str) -> Result<[u8; 32]> {
    organizer_core::hex::decode_32(hex).context("seed must be 32 bytes of hex")
}

pub fn run_identity(args: &IdentityArgs, out: &mut impl Write) -> Result<u8> {
    let seed = match &args.seed {
        Some(hex) => parse_seed(hex)?,
        None => {
            let mut seed = [0u8; 32];
            rand::rngs::OsRng.fill_bytes(&mut seed);
            writeln!(out, "seed:     {}", organizer_core::hex::encode(&seed))?;
            seed
        }
    };
    let key = ApproverKeypair::from_seed(&seed);
    writeln!(out, "identity: {}", key.identity())?;
    Ok(0)
}
