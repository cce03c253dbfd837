//! # Verify Subcommand
//!
//! Checks an inclusion proof against a root. Prints `true` or `false`;
//! malformed hex anywhere in the input prints `false`.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use organizer_crypto::{verify_membership_hex, PairOrdering, Side};

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Leaf hash (64 hex chars).
    #[arg(long)]
    pub leaf: String,
    /// Commitment root (64 hex chars).
    #[arg(long)]
    pub root: String,
    /// Sibling hashes, leaf level first, comma separated.
    #[arg(long, value_delimiter = ',')]
    pub proof: Vec<String>,
    /// Sibling sides for positional ordering (`left`/`right`), comma separated.
    #[arg(long, value_delimiter = ',', value_parser = parse_side)]
    pub sides: Vec<Side>,
    /// Pair ordering. Defaults to the configured ordering.
    #[arg(long)]
    pub ordering: Option<PairOrdering>,
}

fn parse_side(s: &str) -> Result<Side, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "left" | "l" => Ok(Side::Left),
        "right" | "r" => Ok(Side::Right),
        other => Err(format!("unknown side {other:?}")),
    }
}

/// Exit code 0 when the proof holds, 1 otherwise.
pub fn run_verify(args: &VerifyArgs, ordering: PairOrdering, out: &mut impl Write) -> Result<u8> {
    let siblings: Vec<&str> = args.proof.iter().map(String::as_str).collect();
    let valid = verify_membership_hex(ordering, &args.leaf, &siblings, &args.sides, &args.root);
    writeln!(out, "{valid}")?;
    Ok(if valid { 0 } else { 1 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use organizer_core::{encode_leaf, AssetId, Identity, Leaf};
    use organizer_crypto::MerkleTree;

    fn args_for(ordering: PairOrdering, index: usize) -> VerifyArgs {
        let leaves: Vec<Leaf> = (0..4)
            .map(|n| encode_leaf(&Identity([1; 32]), &AssetId([2; 32]), 10, n))
            .collect();
        let tree = MerkleTree::build(ordering, &leaves).unwrap();
        let proof = tree.proof(index).unwrap();
        VerifyArgs {
            leaf: leaves[index].as_hash().to_hex(),
            root: tree.root().to_hex(),
            proof: proof.siblings.iter().map(|h| h.to_hex()).collect(),
            sides: proof.sides,
            ordering: None,
        }
    }

    #[test]
    fn test_valid_proof_prints_true() {
        for ordering in [PairOrdering::Sorted, PairOrdering::Positional] {
            let mut out = Vec::new();
            let code = run_verify(&args_for(ordering, 3), ordering, &mut out).unwrap();
            assert_eq!(code, 0);
            assert_eq!(String::from_utf8(out).unwrap(), "true\n");
        }
    }

    #[test]
    fn test_malformed_hex_prints_false() {
        let mut args = args_for(PairOrdering::Sorted, 0);
        args.proof[0] = "not-hex".to_string();
        let mut out = Vec::new();
        assert_eq!(run_verify(&args, PairOrdering::Sorted, &mut out).unwrap(), 1);
        assert_eq!(String::from_utf8(out).unwrap(), "false\n");
    }

    #[test]
    fn test_parse_side() {
        assert_eq!(parse_side("Left").unwrap(), Side::Left);
        assert_eq!(parse_side("r").unwrap(), Side::Right);
        assert!(parse_side("up").is_err());
    }
}
