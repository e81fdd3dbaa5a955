use hex_literal::hex;
use num_bigint_dig::BigUint;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::AssociatedOid;
use p256::{NistP256, SecretKey};
use rand::rngs::OsRng;

use super::{leading_hex, peer_id, sec1_der, Family, KeyFamily};
use crate::error::{ErrorContext, NodeKeyError};
use crate::material::KeyMaterial;

/// Order of the P-256 base point.
const ORDER: [u8; 32] = hex!("ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551");

pub(super) struct Ecdsa;

impl KeyFamily for Ecdsa {
    type Key = SecretKey;

    const FAMILY: Family = Family::Ecdsa;
    /// Curve size plus 64 extra bits, so the reduction below is unbiased.
    const SEED_LEN: usize = 256 / 8 + 8;

    fn random(_ctx: ErrorContext) -> Result<SecretKey, NodeKeyError> {
        Ok(SecretKey::random(&mut OsRng))
    }

    /// FIPS 186-4 B.4.1: `d = c mod (n - 1) + 1`.
    fn derive(seed: &[u8], ctx: ErrorContext) -> Result<SecretKey, NodeKeyError> {
        if seed.len() != Self::SEED_LEN {
            return Err(ctx.generation("seed must be 40 bytes"));
        }
        let one = BigUint::from(1u8);
        let n_minus_one = BigUint::from_bytes_be(&ORDER) - &one;
        let d = BigUint::from_bytes_be(seed) % &n_minus_one + &one;

        let d = d.to_bytes_be();
        let mut scalar = zeroize::Zeroizing::new([0u8; 32]);
        scalar[32 - d.len()..].copy_from_slice(&d);
        SecretKey::from_slice(&scalar[..]).map_err(|e| ctx.generation(e))
    }

    fn encode(key: &SecretKey, ctx: ErrorContext) -> Result<KeyMaterial, NodeKeyError> {
        let point = key.public_key().to_encoded_point(false);
        let der = sec1_der(&key.to_bytes(), NistP256::OID, point.as_bytes())
            .map_err(|e| ctx.encoding(e))?;

        Ok(KeyMaterial::libp2p(
            public_peer_id(key, ctx)?,
            leading_hex(&der[..]),
            hex::encode(&der[..]),
        ))
    }

    fn load(full_private_key: &[u8], ctx: ErrorContext) -> Result<String, NodeKeyError> {
        let key = SecretKey::from_sec1_der(full_private_key).map_err(|e| ctx.invalid_key(e))?;
        public_peer_id(&key, ctx)
    }
}

fn public_peer_id(key: &SecretKey, ctx: ErrorContext) -> Result<String, NodeKeyError> {
    let point = key.public_key().to_encoded_point(false);
    let public = libp2p_identity::ecdsa::PublicKey::try_from_bytes(point.as_bytes())
        .map_err(|e| ctx.encoding(e))?;
    Ok(peer_id::to_base58(public))
}
