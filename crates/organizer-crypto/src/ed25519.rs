//! # Ed25519 Approver Keys
//!
//! ## Security Invariant
//!
//! - Signing input MUST be `&CanonicalBytes`. Raw byte slices cannot be
//!   signed, so every approval goes through canonicalization.
//! - Private keys are never serialized or logged. `ApproverKeypair` does
//!   not implement `Serialize` and its `Debug` output is redacted.
//! - Verification uses `verify_strict`, rejecting malleable signatures and
//!   small-order keys. A signature that verifies has exactly one encoding.

use ed25519_dalek::Signer;
use organizer_core::{CanonicalBytes, CryptoError, Identity};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An Ed25519 signature (64 bytes). Serializes as a hex string.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519Signature(pub [u8; 64]);

/// An approver's signing key.
pub struct ApproverKeypair {
    signing_key: ed25519_dalek::SigningKey,
}

impl Ed25519Signature {
    /// The raw 64 bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Lowercase hex, no prefix.
    pub fn to_hex(&self) -> String {
        organizer_core::hex::encode(&self.0)
    }

    /// Parse from 128 hex chars, optionally `0x`-prefixed.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let bytes = organizer_core::hex::decode(hex)?;
        let arr: [u8; 64] = bytes.try_into().map_err(|b: Vec<u8>| {
            CryptoError::VerificationFailed(format!(
                "signature must be 64 bytes, got {}",
                b.len()
            ))
        })?;
        Ok(Self(arr))
    }
}

impl Serialize for Ed25519Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Ed25519Signature({}...)",
            organizer_core::hex::prefix(&self.0)
        )
    }
}

impl std::fmt::Display for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl ApproverKeypair {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut csprng),
        }
    }

    /// Derive a key from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    /// The approver identity (public key) of this key.
    pub fn identity(&self) -> Identity {
        Identity(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign canonical bytes.
    pub fn sign(&self, data: &CanonicalBytes) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(data.as_bytes()).to_bytes())
    }
}

impl std::fmt::Debug for ApproverKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApproverKeypair(<private>)")
    }
}

/// Verify `signature` over `data` as produced by `signer`.
///
/// Fails with `KeyError` if `signer` is not a valid Ed25519 point and with
/// `VerificationFailed` if the signature does not verify.
pub fn verify(
    signer: &Identity,
    data: &CanonicalBytes,
    signature: &Ed25519Signature,
) -> Result<(), CryptoError> {
    let vk = ed25519_dalek::VerifyingKey::from_bytes(signer.as_bytes())
        .map_err(|e| CryptoError::KeyError(format!("invalid approver key {signer}: {e}")))?;
    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    vk.verify_strict(data.as_bytes(), &sig)
        .map_err(|e| CryptoError::VerificationFailed(format!("Ed25519 verification failed: {e}")))
}
