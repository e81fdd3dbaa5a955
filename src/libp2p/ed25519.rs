use ed25519_dalek::{SigningKey, SECRET_KEY_LENGTH};
use rand::rngs::OsRng;

use super::{peer_id, Family, KeyFamily};
use crate::error::{ErrorContext, NodeKeyError};
use crate::material::KeyMaterial;

pub(super) struct Ed25519;

impl KeyFamily for Ed25519 {
    type Key = SigningKey;

    const FAMILY: Family = Family::Ed25519;
    const SEED_LEN: usize = SECRET_KEY_LENGTH;

    fn random(_ctx: ErrorContext) -> Result<SigningKey, NodeKeyError> {
        Ok(SigningKey::generate(&mut OsRng))
    }

    fn derive(seed: &[u8], ctx: ErrorContext) -> Result<SigningKey, NodeKeyError> {
        let seed: &[u8; SECRET_KEY_LENGTH] = seed
            .try_into()
            .map_err(|_| ctx.generation("seed must be 32 bytes"))?;
        Ok(SigningKey::from_bytes(seed))
    }

    fn encode(key: &SigningKey, ctx: ErrorContext) -> Result<KeyMaterial, NodeKeyError> {
        let public =
            libp2p_identity::ed25519::PublicKey::try_from_bytes(key.verifying_key().as_bytes())
                .map_err(|e| ctx.encoding(e))?;

        Ok(KeyMaterial::libp2p(
            peer_id::to_base58(public),
            hex::encode(key.to_bytes()),
            hex::encode(key.to_keypair_bytes()),
        ))
    }

    fn load(full_private_key: &[u8], ctx: ErrorContext) -> Result<String, NodeKeyError> {
        // Keypair parsing zeroizes its input, so hand it a scratch copy.
        let mut bytes = zeroize::Zeroizing::new(full_private_key.to_vec());
        let keypair = libp2p_identity::ed25519::Keypair::try_from_bytes(&mut bytes)
            .map_err(|e| ctx.invalid_key(e))?;
        Ok(peer_id::to_base58(keypair.public()))
    }
}
