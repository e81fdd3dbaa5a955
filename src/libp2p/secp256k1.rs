use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::pkcs8::AssociatedOid;
use k256::{FieldBytes, NonZeroScalar, Scalar, SecretKey, U256};
use rand::rngs::OsRng;

use super::{peer_id, sec1_der, Family, KeyFamily};
use crate::error::{ErrorContext, NodeKeyError};
use crate::material::KeyMaterial;

pub(super) struct Secp256k1;

impl KeyFamily for Secp256k1 {
    type Key = SecretKey;

    const FAMILY: Family = Family::Secp256k1;
    const SEED_LEN: usize = 32;

    fn random(_ctx: ErrorContext) -> Result<SecretKey, NodeKeyError> {
        Ok(SecretKey::random(&mut OsRng))
    }

    /// Interprets the seed as a big-endian integer reduced modulo the group order.
    fn derive(seed: &[u8], ctx: ErrorContext) -> Result<SecretKey, NodeKeyError> {
        if seed.len() != Self::SEED_LEN {
            return Err(ctx.generation("seed must be 32 bytes"));
        }
        let scalar = <Scalar as Reduce<U256>>::reduce_bytes(FieldBytes::from_slice(seed));
        let scalar = Option::<NonZeroScalar>::from(NonZeroScalar::new(scalar))
            .ok_or_else(|| ctx.generation("seed reduces to the zero scalar"))?;
        Ok(SecretKey::from(scalar))
    }

    fn encode(key: &SecretKey, ctx: ErrorContext) -> Result<KeyMaterial, NodeKeyError> {
        let point = key.public_key().to_encoded_point(false);
        let der = sec1_der(&key.to_bytes(), k256::Secp256k1::OID, point.as_bytes())
            .map_err(|e| ctx.encoding(e))?;

        Ok(KeyMaterial::libp2p(
            public_peer_id(key, ctx)?,
            hex::encode(key.to_bytes()),
            hex::encode(&der[..]),
        ))
    }

    fn load(full_private_key: &[u8], ctx: ErrorContext) -> Result<String, NodeKeyError> {
        let key = SecretKey::from_sec1_der(full_private_key).map_err(|e| ctx.invalid_key(e))?;
        public_peer_id(&key, ctx)
    }
}

fn public_peer_id(key: &SecretKey, ctx: ErrorContext) -> Result<String, NodeKeyError> {
    let point = key.public_key().to_encoded_point(true);
    let public = libp2p_identity::secp256k1::PublicKey::try_from_bytes(point.as_bytes())
        .map_err(|e| ctx.encoding(e))?;
    Ok(peer_id::to_base58(public))
}
