//! Peer identifiers.
//!
//! The public key is wrapped in the libp2p `PublicKey` protobuf and hashed
//! into a multihash (identity up to 42 bytes, SHA-256 above), then base58
//! encoded. Short keys (Ed25519, secp256k1) yield `12D3KooW...`/`16Uiu2...`
//! identifiers, DER-encoded keys yield `Qm...`.

pub(super) fn to_base58(public_key: impl Into<libp2p_identity::PublicKey>) -> String {
    public_key.into().to_peer_id().to_base58()
}
