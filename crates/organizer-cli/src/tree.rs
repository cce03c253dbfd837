//! # Tree Subcommand
//!
//! Builds a commitment tree over a JSON array of payouts and prints the
//! root with every payout's leaf and inclusion proof, as JSON:
//!
//! ```text
//! { "ordering": "sorted", "root": "…", "entries": [ { "index", "leaf", "proof" } ] }
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;

use organizer_core::{Hash32, Leaf, Payout};
use organizer_crypto::{MerkleProof, MerkleTree, PairOrdering};

#[derive(Args, Debug)]
pub struct TreeArgs {
    /// JSON file holding an array of payouts.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
    /// Pair ordering. Defaults to the configured ordering.
    #[arg(long)]
    pub ordering: Option<PairOrdering>,
}

#[derive(Debug, Serialize)]
struct TreeEntry {
    index: usize,
    leaf: Leaf,
    proof: MerkleProof,
}

#[derive(Debug, Serialize)]
struct TreeOutput {
    ordering: PairOrdering,
    root: Hash32,
    entries: Vec<TreeEntry>,
}

/// Read a JSON array of payouts.
pub fn read_payouts(path: &Path) -> Result<Vec<Payout>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read payouts: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse payouts: {}", path.display()))
}

pub fn run_tree(args: &TreeArgs, ordering: PairOrdering, out: &mut impl Write) -> Result<u8> {
    let payouts = read_payouts(&args.file)?;
    if payouts.is_empty() {
        bail!("payout list is empty: {}", args.file.display());
    }
    let leaves: Vec<Leaf> = payouts.iter().map(Payout::leaf).collect();
    let tree = MerkleTree::build(ordering, &leaves)?;
    let entries = leaves
        .iter()
        .enumerate()
        .map(|(index, leaf)| -> Result<TreeEntry> {
            Ok(TreeEntry {
                index,
                leaf: *leaf,
                proof: tree.proof(index)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    tracing::info!(leaves = leaves.len(), root = %tree.root(), "tree built");
    let output = TreeOutput {
        ordering,
        root: tree.root(),
        entries,
    };
    serde_json::to_writer_pretty(&mut *out, &output)?;
    writeln!(out)?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use organizer_core::{AssetId, Identity};
    use organizer_crypto::verify_membership;

    fn write_payouts(payouts: &[Payout]) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        serde_json::to_writer(file.as_file(), payouts).unwrap();
        file
    }

    fn payout(nonce: u64) -> Payout {
        Payout {
            recipient: Identity([3; 32]),
            asset: AssetId([4; 32]),
            amount: 25,
            nonce,
        }
    }

    #[test]
    fn test_tree_output_proofs_verify() {
        let payouts: Vec<Payout> = (0..3).map(payout).collect();
        let file = write_payouts(&payouts);
        let args = TreeArgs {
            file: file.path().to_path_buf(),
            ordering: None,
        };
        let mut out = Vec::new();
        run_tree(&args, PairOrdering::Positional, &mut out).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["ordering"], "positional");
        let root: Hash32 = serde_json::from_value(json["root"].clone()).unwrap();
        for (i, entry) in json["entries"].as_array().unwrap().iter().enumerate() {
            let proof: MerkleProof = serde_json::from_value(entry["proof"].clone()).unwrap();
            assert!(verify_membership(
                PairOrdering::Positional,
                &payouts[i].leaf(),
                &proof,
                &root
            ));
        }
    }

    #[test]
    fn test_empty_payout_list_rejected() {
        let file = write_payouts(&[]);
        let args = TreeArgs {
            file: file.path().to_path_buf(),
            ordering: None,
        };
        assert!(run_tree(&args, PairOrdering::Sorted, &mut Vec::new()).is_err());
    }
}
