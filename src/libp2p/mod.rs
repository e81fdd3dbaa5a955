//! Libp2p identity generation for four key families.
//!
//! Each family implements [`KeyFamily`]: build a key either with its own
//! CSPRNG-backed generator or from deterministic seed bytes, then render it as
//! a peer identifier plus hex private key forms. Dispatch happens on the
//! closed [`Family`] enum.

mod ecdsa;
mod ed25519;
mod peer_id;
mod rsa;
mod secp256k1;

pub use self::rsa::{KEY_BITS as RSA_KEY_BITS, MAX_PRIME_CANDIDATES};

use std::fmt;
use std::str::FromStr;

use sec1::der::asn1::ObjectIdentifier;
use sec1::der::Encode;
use zeroize::Zeroizing;

use crate::entropy::{expand, EntropyMode, EntropyRequest};
use crate::error::{ErrorContext, NodeKeyError};
use crate::material::KeyMaterial;

/// Supported libp2p key families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Ed25519,
    Secp256k1,
    /// ECDSA over NIST P-256.
    Ecdsa,
    Rsa,
}

impl Family {
    pub const ALL: [Family; 4] = [
        Family::Ed25519,
        Family::Secp256k1,
        Family::Ecdsa,
        Family::Rsa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Ed25519 => "ed25519",
            Family::Secp256k1 => "secp256k1",
            Family::Ecdsa => "ecdsa",
            Family::Rsa => "rsa",
        }
    }
}

impl FromStr for Family {
    type Err = NodeKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ed25519" => Ok(Family::Ed25519),
            "secp256k1" => Ok(Family::Secp256k1),
            "ecdsa" | "p256" => Ok(Family::Ecdsa),
            "rsa" => Ok(Family::Rsa),
            _ => Err(NodeKeyError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

/// Key type numbers from the libp2p `PublicKey` protobuf.
impl TryFrom<i32> for Family {
    type Error = NodeKeyError;

    fn try_from(key_type: i32) -> Result<Self, Self::Error> {
        match key_type {
            0 => Ok(Family::Rsa),
            1 => Ok(Family::Ed25519),
            2 => Ok(Family::Secp256k1),
            3 => Ok(Family::Ecdsa),
            other => Err(NodeKeyError::UnsupportedAlgorithm(format!(
                "key type {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Generation and encoding for one key family.
pub(crate) trait KeyFamily {
    type Key;

    const FAMILY: Family;

    /// Bytes of entropy consumed by [`KeyFamily::derive`].
    const SEED_LEN: usize;

    /// Generates a key with the family's own secure routine over `OsRng`.
    fn random(ctx: ErrorContext) -> Result<Self::Key, NodeKeyError>;

    /// Builds a key from exactly `SEED_LEN` bytes. Pure in its input.
    fn derive(seed: &[u8], ctx: ErrorContext) -> Result<Self::Key, NodeKeyError>;

    fn encode(key: &Self::Key, ctx: ErrorContext) -> Result<KeyMaterial, NodeKeyError>;

    /// Parses a `fullPrivateKey` structure and returns its peer identifier.
    fn load(full_private_key: &[u8], ctx: ErrorContext) -> Result<String, NodeKeyError>;
}

/// Generates a libp2p identity of `family`, drawing entropy per `request`.
pub fn generate_libp2p_identity(
    family: Family,
    request: &EntropyRequest,
) -> Result<KeyMaterial, NodeKeyError> {
    match family {
        Family::Ed25519 => generate::<ed25519::Ed25519>(request),
        Family::Secp256k1 => generate::<secp256k1::Secp256k1>(request),
        Family::Ecdsa => generate::<ecdsa::Ecdsa>(request),
        Family::Rsa => generate::<rsa::Rsa>(request),
    }
}

/// Loads a hex `fullPrivateKey` with the family's own parser and returns the
/// peer identifier it belongs to.
pub fn peer_id_from_full_private_key(
    family: Family,
    full_private_key: &str,
) -> Result<String, NodeKeyError> {
    // The mode is irrelevant when loading; it only fills the context slot.
    let ctx = ErrorContext::new(family.as_str(), EntropyMode::Secure);
    let bytes = zeroize::Zeroizing::new(
        hex::decode(full_private_key.trim()).map_err(|e| ctx.invalid_key(e))?,
    );

    match family {
        Family::Ed25519 => ed25519::Ed25519::load(&bytes, ctx),
        Family::Secp256k1 => secp256k1::Secp256k1::load(&bytes, ctx),
        Family::Ecdsa => ecdsa::Ecdsa::load(&bytes, ctx),
        Family::Rsa => rsa::Rsa::load(&bytes, ctx),
    }
}

fn generate<F: KeyFamily>(request: &EntropyRequest) -> Result<KeyMaterial, NodeKeyError> {
    let algorithm = F::FAMILY.as_str();
    let ctx = ErrorContext::new(algorithm, request.mode());

    let key = match request.seed_index() {
        Some(index) => {
            let seed = expand(index, F::SEED_LEN)
                .map(Zeroizing::new)
                .ok_or_else(|| ctx.generation("seed length is below the expansion counter"))?;
            F::derive(&seed, ctx)?
        }
        None => F::random(ctx)?,
    };
    let material = F::encode(&key, ctx)?;

    tracing::debug!(
        algorithm,
        mode = %request.mode(),
        seed_index = ?request.seed_index(),
        public_key = material.public_key(),
        "generated node key"
    );
    Ok(material)
}

/// Hex of the first 32 bytes of a DER structure.
///
/// For SEC1 and PKCS#1 keys this covers the ASN.1 header and the start of
/// the private value.
fn leading_hex(der: &[u8]) -> String {
    hex::encode(&der[..der.len().min(32)])
}

/// SEC1 `ECPrivateKey` DER naming `curve` and carrying the uncompressed public point.
fn sec1_der(
    scalar: &[u8],
    curve: ObjectIdentifier,
    public_point: &[u8],
) -> Result<Zeroizing<Vec<u8>>, sec1::der::Error> {
    sec1::EcPrivateKey {
        private_key: scalar,
        parameters: Some(sec1::EcParameters::NamedCurve(curve)),
        public_key: Some(public_point),
    }
    .to_der()
    .map(Zeroizing::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_from_str() {
        assert_eq!("ed25519".parse::<Family>().unwrap(), Family::Ed25519);
        assert_eq!("SECP256K1".parse::<Family>().unwrap(), Family::Secp256k1);
        assert_eq!("p256".parse::<Family>().unwrap(), Family::Ecdsa);
        assert_eq!("rsa".parse::<Family>().unwrap(), Family::Rsa);
        assert!(matches!(
            "dsa".parse::<Family>(),
            Err(NodeKeyError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_family_from_key_type() {
        assert_eq!(Family::try_from(0).unwrap(), Family::Rsa);
        assert_eq!(Family::try_from(3).unwrap(), Family::Ecdsa);
        assert!(matches!(
            Family::try_from(4),
            Err(NodeKeyError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_display_roundtrips_through_from_str() {
        for family in Family::ALL {
            assert_eq!(family.to_string().parse::<Family>().unwrap(), family);
        }
    }

    #[test]
    fn test_leading_hex() {
        assert_eq!(leading_hex(&[0xab; 40]), "ab".repeat(32));
        assert_eq!(leading_hex(&[0x01, 0x02]), "0102");
    }

    #[test]
    fn test_secure_generation_is_fresh() {
        for family in [Family::Ed25519, Family::Secp256k1, Family::Ecdsa] {
            let a = generate_libp2p_identity(family, &EntropyRequest::secure()).unwrap();
            let b = generate_libp2p_identity(family, &EntropyRequest::secure()).unwrap();
            assert_ne!(a.public_key(), b.public_key(), "{} repeated a key", family);
        }
    }

    #[test]
    fn test_load_rejects_bad_hex() {
        assert!(matches!(
            peer_id_from_full_private_key(Family::Ed25519, "zz"),
            Err(NodeKeyError::InvalidKey { .. })
        ));
    }
}
