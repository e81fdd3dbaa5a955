//! Entropy policy for key generation.
//!
//! A secure request hands generation to each key family's own CSPRNG-backed
//! routine. A deterministic request feeds the family's derivation with bytes
//! from [`expand`], a pure function of a seed index.
//!
//! The deterministic policy can only be selected through
//! [`EntropyRequest::insecure_deterministic`]; the default request is secure.
//!
//! ## Expansion function, version 1
//!
//! `expand(index, len)` writes the big-endian `u64` counter
//! `index + DETERMINISTIC_SEED_BASE` (wrapping) into the first eight bytes and
//! zero-fills the rest up to exactly `len` bytes. Index 0 therefore starts with
//! `00 00 00 00 00 04 25 d4`. Lengths below [`COUNTER_LEN`] are refused, since a
//! truncated counter would repeat across indices. Changing this layout changes
//! every deterministic identity ever minted, so any change must bump
//! [`EXPANSION_VERSION`].

use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

/// Version of the deterministic expansion layout.
pub const EXPANSION_VERSION: u32 = 1;

/// Counter value produced for seed index 0.
pub const DETERMINISTIC_SEED_BASE: u64 = 271_828;

/// Bytes of counter at the head of every expanded seed.
pub const COUNTER_LEN: usize = 8;

/// Where a request's entropy comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntropyMode {
    Secure,
    Deterministic,
}

impl fmt::Display for EntropyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntropyMode::Secure => write!(f, "secure"),
            EntropyMode::Deterministic => write!(f, "deterministic"),
        }
    }
}

/// Entropy policy for a single generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntropyRequest {
    seed_index: Option<u64>,
}

impl EntropyRequest {
    /// Request OS randomness. Use this for anything that will hold value.
    pub const fn secure() -> Self {
        Self { seed_index: None }
    }

    /// Request reproducible key material derived only from `seed_index`.
    ///
    /// Anyone who knows the index can recompute the private key. Meant for
    /// test and development networks.
    ///
    /// The counter wraps, so index `u64::MAX - 271_827` expands to an all-zero
    /// seed. Ed25519, ECDSA and RSA still derive a key from it; secp256k1
    /// rejects the zero scalar with a non-retryable `KeyGeneration` error on
    /// every attempt.
    pub const fn insecure_deterministic(seed_index: u64) -> Self {
        Self {
            seed_index: Some(seed_index),
        }
    }

    pub fn mode(&self) -> EntropyMode {
        if self.seed_index.is_some() {
            EntropyMode::Deterministic
        } else {
            EntropyMode::Secure
        }
    }

    #[inline]
    pub fn is_deterministic(&self) -> bool {
        self.seed_index.is_some()
    }

    /// Returns the seed index for deterministic requests.
    #[inline]
    pub fn seed_index(&self) -> Option<u64> {
        self.seed_index
    }
}

/// Deterministic expansion, version 1. See the module docs for the layout.
///
/// Returns `None` when `len` is shorter than [`COUNTER_LEN`].
pub fn expand(seed_index: u64, len: usize) -> Option<Vec<u8>> {
    if len < COUNTER_LEN {
        return None;
    }
    let counter = seed_index.wrapping_add(DETERMINISTIC_SEED_BASE).to_be_bytes();
    let mut out = vec![0u8; len];
    out[..COUNTER_LEN].copy_from_slice(&counter);
    Some(out)
}

/// Reads `len` bytes from the operating system CSPRNG.
pub(crate) fn secure_bytes(len: usize) -> Result<Zeroizing<Vec<u8>>, rand::Error> {
    let mut out = Zeroizing::new(vec![0u8; len]);
    OsRng.try_fill_bytes(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_expand_index_zero() {
        assert_eq!(
            expand(0, 32).unwrap(),
            hex!("00000000000425d4000000000000000000000000000000000000000000000000")
        );
    }

    #[test]
    fn test_expand_is_exact_length() {
        assert_eq!(expand(7, 40).unwrap().len(), 40);
        assert_eq!(expand(7, COUNTER_LEN).unwrap().len(), COUNTER_LEN);
    }

    #[test]
    fn test_expand_refuses_truncated_counter() {
        assert_eq!(expand(1, 3), None);
        assert_eq!(expand(2, 3), None);
        assert_eq!(expand(7, 0), None);
    }

    #[test]
    fn test_expand_counter_increments() {
        assert_eq!(expand(1, 8).unwrap(), 271_829u64.to_be_bytes());
        assert_ne!(expand(1, 32), expand(2, 32));
    }

    #[test]
    fn test_expand_wraps_to_zero_seed() {
        assert_eq!(
            expand(u64::MAX - (DETERMINISTIC_SEED_BASE - 1), 32).unwrap(),
            vec![0u8; 32]
        );
    }

    #[test]
    fn test_default_request_is_secure() {
        let request = EntropyRequest::default();
        assert_eq!(request.mode(), EntropyMode::Secure);
        assert_eq!(request.seed_index(), None);
        assert!(!request.is_deterministic());
    }

    #[test]
    fn test_deterministic_request() {
        let request = EntropyRequest::insecure_deterministic(5);
        assert_eq!(request.mode(), EntropyMode::Deterministic);
        assert_eq!(request.seed_index(), Some(5));
    }

    #[test]
    fn test_secure_bytes_differ() {
        let a = secure_bytes(32).unwrap();
        let b = secure_bytes(32).unwrap();
        assert_eq!(a.len(), 32);
        assert_ne!(*a, *b);
    }
}
