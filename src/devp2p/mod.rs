//! Devp2p identity generation.
//!
//! Always draws its scalar from the OS CSPRNG; there is no seeded variant.

mod enr;
mod keypair;

pub use enr::{Endpoint, Enr, EnrError, INITIAL_SEQ, MAX_RECORD_SIZE};
pub use keypair::NodeKey;

use crate::entropy::{secure_bytes, EntropyMode};
use crate::error::{ErrorContext, NodeKeyError};
use crate::material::KeyMaterial;

const ALGORITHM: &str = "devp2p-secp256k1";

/// Generates a random devp2p identity with the default endpoint placeholders.
pub fn generate_devp2p_identity() -> Result<KeyMaterial, NodeKeyError> {
    generate_devp2p_identity_with(Endpoint::default())
}

/// Generates a random devp2p identity whose record advertises `endpoint`.
pub fn generate_devp2p_identity_with(endpoint: Endpoint) -> Result<KeyMaterial, NodeKeyError> {
    let ctx = ErrorContext::new(ALGORITHM, EntropyMode::Secure);

    let seed = secure_bytes(32).map_err(|e| ctx.generation(e))?;
    let key = NodeKey::from_secret_key(&seed).map_err(|e| ctx.generation(e))?;
    let enr = key.enr(endpoint).map_err(|e| ctx.encoding(e))?;

    tracing::debug!(algorithm = ALGORITHM, public_key = %key.public_key_hex(), "generated node key");

    Ok(KeyMaterial::devp2p(
        key.public_key_hex(),
        key.private_key_hex(),
        enr.to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_devp2p_identity() {
        let material = generate_devp2p_identity().unwrap();
        assert_eq!(material.public_key().len(), 128);
        assert_eq!(material.private_key().len(), 64);
        assert!(material.enr().unwrap().starts_with("enr:"));
        assert_eq!(material.full_private_key(), None);
    }

    #[test]
    fn test_enr_matches_public_key() {
        let material = generate_devp2p_identity().unwrap();
        let enr = Enr::decode(material.enr().unwrap()).unwrap();

        let uncompressed = enr.public_key().serialize_uncompressed();
        assert_eq!(hex::encode(&uncompressed[1..]), material.public_key());
        assert_eq!(*enr.endpoint(), Endpoint::default());
    }

    #[test]
    fn test_identities_are_random() {
        let a = generate_devp2p_identity().unwrap();
        let b = generate_devp2p_identity().unwrap();
        assert_ne!(a.public_key(), b.public_key());
    }
}
