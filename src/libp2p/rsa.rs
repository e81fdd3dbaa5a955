//! RSA keys.
//!
//! Secure keys come from `RsaPrivateKey::new`. Seeded keys use a bounded,
//! reproducible prime search instead: primes are drawn from a ChaCha20 stream
//! keyed by the seed, so a given seed always yields the same key regardless of
//! how the `rsa` crate generates keys internally. The search gives up after
//! [`MAX_PRIME_CANDIDATES`].

use num_bigint_dig::prime::probably_prime;
use num_bigint_dig::BigUint;
use rand::rngs::OsRng;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::pkcs8::EncodePublicKey;
use rsa::RsaPrivateKey;
use zeroize::Zeroizing;

use super::{leading_hex, peer_id, Family, KeyFamily};
use crate::error::{ErrorContext, NodeKeyError};
use crate::material::KeyMaterial;

/// Modulus size.
pub const KEY_BITS: usize = 2048;

/// Candidates tried per prime before giving up.
pub const MAX_PRIME_CANDIDATES: usize = 100_000;

const PUBLIC_EXPONENT: u32 = 65_537;
const PRIMALITY_ROUNDS: usize = 20;

pub(super) struct Rsa;

impl KeyFamily for Rsa {
    type Key = RsaPrivateKey;

    const FAMILY: Family = Family::Rsa;
    const SEED_LEN: usize = 32;

    fn random(ctx: ErrorContext) -> Result<RsaPrivateKey, NodeKeyError> {
        RsaPrivateKey::new(&mut OsRng, KEY_BITS).map_err(|e| ctx.generation(e))
    }

    fn derive(seed: &[u8], ctx: ErrorContext) -> Result<RsaPrivateKey, NodeKeyError> {
        let seed: [u8; 32] = seed
            .try_into()
            .map_err(|_| ctx.generation("seed must be 32 bytes"))?;
        let mut rng = ChaCha20Rng::from_seed(seed);
        let e = BigUint::from(PUBLIC_EXPONENT);

        let p = random_prime(&mut rng, KEY_BITS / 2, &e)
            .ok_or_else(|| ctx.generation("prime search exhausted"))?;
        let q = random_prime(&mut rng, KEY_BITS / 2, &e)
            .ok_or_else(|| ctx.generation("prime search exhausted"))?;
        // p > q, as OpenSSL and ring expect for the CRT coefficient.
        let (p, q) = if p > q { (p, q) } else { (q, p) };

        let key = RsaPrivateKey::from_p_q(p, q, e).map_err(|err| ctx.generation(err))?;
        key.validate().map_err(|e| ctx.generation(e))?;
        Ok(key)
    }

    fn encode(key: &RsaPrivateKey, ctx: ErrorContext) -> Result<KeyMaterial, NodeKeyError> {
        let der = key.to_pkcs1_der().map_err(|e| ctx.encoding(e))?;

        Ok(KeyMaterial::libp2p(
            public_peer_id(key, ctx)?,
            leading_hex(der.as_bytes()),
            hex::encode(der.as_bytes()),
        ))
    }

    fn load(full_private_key: &[u8], ctx: ErrorContext) -> Result<String, NodeKeyError> {
        let key =
            RsaPrivateKey::from_pkcs1_der(full_private_key).map_err(|e| ctx.invalid_key(e))?;
        public_peer_id(&key, ctx)
    }
}

fn public_peer_id(key: &RsaPrivateKey, ctx: ErrorContext) -> Result<String, NodeKeyError> {
    let spki = key
        .to_public_key()
        .to_public_key_der()
        .map_err(|e| ctx.encoding(e))?;
    let public = libp2p_identity::rsa::PublicKey::try_decode_x509(spki.as_bytes())
        .map_err(|e| ctx.encoding(e))?;
    Ok(peer_id::to_base58(public))
}

/// Draws odd `bits`-bit candidates with the top two bits set until one is
/// prime and `p - 1` is not a multiple of `e`.
fn random_prime<R: RngCore>(rng: &mut R, bits: usize, e: &BigUint) -> Option<BigUint> {
    let one = BigUint::from(1u8);
    let mut bytes = Zeroizing::new(vec![0u8; bits / 8]);
    let last = bytes.len() - 1;

    for _ in 0..MAX_PRIME_CANDIDATES {
        rng.fill_bytes(&mut bytes);
        // Two top bits keep p * q at exactly 2 * bits.
        bytes[0] |= 0xc0;
        bytes[last] |= 0x01;

        let candidate = BigUint::from_bytes_be(&bytes);
        if &candidate % e == one {
            continue;
        }
        if probably_prime(&candidate, PRIMALITY_ROUNDS) {
            return Some(candidate);
        }
    }
    None
}
