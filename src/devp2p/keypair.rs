//! secp256k1 node key for devp2p.

use secp256k1::{PublicKey, Secp256k1, SecretKey};

use super::enr::{Endpoint, Enr, EnrError, INITIAL_SEQ};

/// A devp2p node key (private scalar + derived public point).
#[derive(Debug, Clone)]
pub struct NodeKey {
    secret_key: SecretKey,
    public_key: PublicKey,
}

impl NodeKey {
    /// Builds a node key from a raw 32-byte scalar.
    ///
    /// Fails if the scalar is zero or not below the curve order.
    pub fn from_secret_key(secret_bytes: &[u8]) -> Result<Self, secp256k1::Error> {
        let secp = Secp256k1::signing_only();
        let secret_key = SecretKey::from_slice(secret_bytes)?;
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);

        Ok(Self {
            secret_key,
            public_key,
        })
    }

    /// Returns the private scalar as a hex string (without 0x prefix).
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    /// Returns the uncompressed public point as hex, without the 0x04 tag.
    ///
    /// This is the 64-byte form used in enode URLs and discovery.
    pub fn public_key_hex(&self) -> String {
        hex::encode(&self.public_key.serialize_uncompressed()[1..])
    }

    #[inline]
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Signs a fresh node record for this key.
    pub fn enr(&self, endpoint: Endpoint) -> Result<Enr, EnrError> {
        Enr::sign(&self.secret_key, INITIAL_SEQ, endpoint)
    }
}
