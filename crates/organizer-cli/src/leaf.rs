//! # Leaf Subcommand

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use organizer_core::{encode_leaf, AssetId, Identity};

#[derive(Args, Debug)]
pub struct LeafArgs {
    /// Recipient identity (64 hex chars).
    #[arg(long)]
    pub recipient: String,
    /// Asset identifier (64 hex chars).
    #[arg(long)]
    pub asset: String,
    /// Amount in the asset's smallest unit.
    #[arg(long)]
    pub amount: u128,
    #[arg(long)]
    pub nonce: u64,
}

pub fn run_leaf(args: &LeafArgs, out: &mut impl Write) -> Result<u8> {
    let recipient = Identity::from_hex(&args.recipient).context("invalid --recipient")?;
    let asset = AssetId::from_hex(&args.asset).context("invalid --asset")?;
    let leaf = encode_leaf(&recipient, &asset, args.amount, args.nonce);
    tracing::debug!(leaf = %leaf, "leaf encoded");
    writeln!(out, "{leaf}")?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_matches_library() {
        let args = LeafArgs {
            recipient: "11".repeat(32),
            asset: "22".repeat(32),
            amount: 100,
            nonce: 7,
        };
        let mut out = Vec::new();
        assert_eq!(run_leaf(&args, &mut out).unwrap(), 0);
        let expected = encode_leaf(&Identity([0x11; 32]), &AssetId([0x22; 32]), 100, 7);
        assert_eq!(String::from_utf8(out).unwrap().trim(), expected.to_string());
    }

    #[test]
    fn test_bad_recipient_rejected() {
        let args = LeafArgs {
            recipient: "xyz".to_string(),
            asset: "22".repeat(32),
            amount: 1,
            nonce: 0,
        };
        let err = run_leaf(&args, &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("--recipient"));
    }
}
