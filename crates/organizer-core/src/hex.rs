//! # Hex Encoding
//!
//! Lowercase hex encoding for fixed-width values. Decoding accepts an
//! optional `0x` prefix and either case, since approvers paste identities
//! and roots from wallet tooling that emits both forms.

use thiserror::Error;

/// Error decoding a hex string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexError {
    /// The decoded value has the wrong number of bytes.
    #[error("expected {expected} hex chars, got {actual}")]
    InvalidLength {
        /// Expected number of hex characters.
        expected: usize,
        /// Actual number of hex characters.
        actual: usize,
    },

    /// A character outside `[0-9a-fA-F]`.
    #[error("invalid hex digit at position {0}")]
    InvalidDigit(usize),

    /// Odd number of hex characters.
    #[error("hex string must have even length")]
    OddLength,
}

/// Encode bytes as lowercase hex without a prefix.
pub fn encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decode a hex string of any even length.
pub fn decode(s: &str) -> Result<Vec<u8>, HexError> {
    let s = strip_prefix(s);
    if s.len() % 2 != 0 {
        return Err(HexError::OddLength);
    }
    s.as_bytes()
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| {
            let hi = nibble(pair[0]).ok_or(HexError::InvalidDigit(i * 2))?;
            let lo = nibble(pair[1]).ok_or(HexError::InvalidDigit(i * 2 + 1))?;
            Ok((hi << 4) | lo)
        })
        .collect()
}

/// Decode exactly 32 bytes (64 hex chars).
pub fn decode_32(s: &str) -> Result<[u8; 32], HexError> {
    let body = strip_prefix(s);
    if body.len() != 64 {
        return Err(HexError::InvalidLength {
            expected: 64,
            actual: body.len(),
        });
    }
    let bytes = decode(body)?;
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// First four bytes as hex, for `Debug` output.
pub fn prefix(bytes: &[u8]) -> String {
    encode(&bytes[..bytes.len().min(4)])
}

fn strip_prefix(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Implement hex accessors, `Display`, `Debug`, `FromStr` and hex-string
/// serde for a `pub struct Name(pub [u8; 32])` newtype.
macro_rules! impl_hex32 {
    ($name:ident) => {
        impl $name {
            /// Wrap raw bytes.
            pub const fn from_bytes(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            /// The raw 32 bytes.
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Lowercase hex, no prefix.
            pub fn to_hex(&self) -> String {
                $crate::hex::encode(&self.0)
            }

            /// Parse from 64 hex chars, optionally `0x`-prefixed.
            pub fn from_hex(s: &str) -> Result<Self, $crate::hex::HexError> {
                $crate::hex::decode_32(s).map(Self)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(
                    f,
                    concat!(stringify!($name), "({}...)"),
                    $crate::hex::prefix(&self.0)
                )
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::hex::HexError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_lowercase() {
        assert_eq!(encode(&[0xab, 0x01, 0xff]), "ab01ff");
    }

    #[test]
    fn test_decode_accepts_prefix_and_uppercase() {
        assert_eq!(decode("0xAB01").unwrap(), vec![0xab, 0x01]);
        assert_eq!(decode("ab01").unwrap(), vec![0xab, 0x01]);
    }

    #[test]
    fn test_decode_rejects_odd_length() {
        assert_eq!(decode("abc"), Err(HexError::OddLength));
    }

    #[test]
    fn test_decode_rejects_bad_digit() {
        assert_eq!(decode("zz"), Err(HexError::InvalidDigit(0)));
        assert_eq!(decode("0g"), Err(HexError::InvalidDigit(1)));
    }

    #[test]
    fn test_decode_32_length_checked() {
        assert!(decode_32(&"11".repeat(32)).is_ok());
        assert_eq!(
            decode_32("aabb"),
            Err(HexError::InvalidLength {
                expected: 64,
                actual: 4
            })
        );
        assert!(decode_32(&format!("0x{}", "00".repeat(32))).is_ok());
    }
}
