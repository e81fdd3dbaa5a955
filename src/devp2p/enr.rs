//! Ethereum Node Records (EIP-778), "v4" identity scheme.
//!
//! Record layout: `rlp([signature, seq, k, v, ...])` with keys sorted, where
//! the signature is a 64-byte `r || s` secp256k1 signature over
//! `keccak256(rlp([seq, k, v, ...]))`. The text form is `enr:` followed by
//! unpadded URL-safe base64.

use std::fmt;
use std::net::Ipv4Addr;

use alloy_rlp::{Decodable, Encodable, Header};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use tiny_keccak::{Hasher, Keccak};

/// Upper bound on an encoded record.
pub const MAX_RECORD_SIZE: usize = 300;

/// Sequence number of a freshly minted record.
pub const INITIAL_SEQ: u64 = 1;

const TEXT_PREFIX: &str = "enr:";
const IDENTITY_SCHEME: &[u8] = b"v4";

/// Errors raised while building or parsing a record.
#[derive(Debug, thiserror::Error)]
pub enum EnrError {
    #[error("record is {0} bytes, limit is {MAX_RECORD_SIZE}")]
    TooLarge(usize),
    #[error("missing `enr:` prefix")]
    MissingPrefix,
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid rlp: {0}")]
    Rlp(#[from] alloy_rlp::Error),
    #[error("malformed record: {0}")]
    Malformed(&'static str),
    #[error("unsupported identity scheme")]
    UnsupportedScheme,
    #[error("record has no secp256k1 key")]
    MissingKey,
    #[error("secp256k1: {0}")]
    Secp256k1(#[from] secp256k1::Error),
}

/// Network address placeholders carried in a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub ip: Option<Ipv4Addr>,
    pub tcp: Option<u16>,
    pub udp: Option<u16>,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            ip: Some(Ipv4Addr::UNSPECIFIED),
            tcp: Some(30303),
            udp: Some(30303),
        }
    }
}

/// A signed node record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enr {
    seq: u64,
    public_key: PublicKey,
    endpoint: Endpoint,
    signature: [u8; 64],
}

impl Enr {
    /// Builds and signs a record for `secret_key`.
    pub fn sign(secret_key: &SecretKey, seq: u64, endpoint: Endpoint) -> Result<Self, EnrError> {
        let secp = Secp256k1::signing_only();
        let mut enr = Self {
            seq,
            public_key: PublicKey::from_secret_key(&secp, secret_key),
            endpoint,
            signature: [0u8; 64],
        };

        let digest = keccak256(&rlp_list(&enr.content_payload()));
        enr.signature = secp
            .sign_ecdsa(&Message::from_digest(digest), secret_key)
            .serialize_compact();

        let size = enr.to_rlp().len();
        if size > MAX_RECORD_SIZE {
            return Err(EnrError::TooLarge(size));
        }
        Ok(enr)
    }

    /// Parses a text record and verifies its signature.
    pub fn decode(text: &str) -> Result<Self, EnrError> {
        let encoded = text
            .strip_prefix(TEXT_PREFIX)
            .ok_or(EnrError::MissingPrefix)?;
        let raw = URL_SAFE_NO_PAD.decode(encoded)?;
        if raw.len() > MAX_RECORD_SIZE {
            return Err(EnrError::TooLarge(raw.len()));
        }

        let mut buf = raw.as_slice();
        let header = Header::decode(&mut buf)?;
        if !header.list {
            return Err(EnrError::Malformed("record is not a list"));
        }
        if header.payload_length != buf.len() {
            return Err(EnrError::Malformed("trailing bytes after record"));
        }

        let signature: [u8; 64] = Header::decode_bytes(&mut buf, false)?
            .try_into()
            .map_err(|_| EnrError::Malformed("signature must be 64 bytes"))?;
        let content_payload = buf;

        let seq = u64::decode(&mut buf)?;
        let mut scheme = None;
        let mut public_key = None;
        let mut endpoint = Endpoint {
            ip: None,
            tcp: None,
            udp: None,
        };

        let mut prev_key: Option<&[u8]> = None;
        while !buf.is_empty() {
            let key = Header::decode_bytes(&mut buf, false)?;
            if prev_key.is_some_and(|prev| key <= prev) {
                return Err(EnrError::Malformed("keys must be sorted and unique"));
            }
            prev_key = Some(key);

            match key {
                b"id" => scheme = Some(Header::decode_bytes(&mut buf, false)?),
                b"ip" => {
                    let octets: [u8; 4] = Header::decode_bytes(&mut buf, false)?
                        .try_into()
                        .map_err(|_| EnrError::Malformed("ip must be 4 bytes"))?;
                    endpoint.ip = Some(Ipv4Addr::from(octets));
                }
                b"secp256k1" => {
                    public_key = Some(PublicKey::from_slice(Header::decode_bytes(
                        &mut buf, false,
                    )?)?)
                }
                b"tcp" => endpoint.tcp = Some(u16::decode(&mut buf)?),
                b"udp" => endpoint.udp = Some(u16::decode(&mut buf)?),
                _ => skip_item(&mut buf)?,
            }
        }

        if scheme != Some(IDENTITY_SCHEME) {
            return Err(EnrError::UnsupportedScheme);
        }
        let public_key = public_key.ok_or(EnrError::MissingKey)?;

        let digest = keccak256(&rlp_list(content_payload));
        Secp256k1::verification_only().verify_ecdsa(
            &Message::from_digest(digest),
            &Signature::from_compact(&signature)?,
            &public_key,
        )?;

        Ok(Self {
            seq,
            public_key,
            endpoint,
            signature,
        })
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Node ID under the v4 scheme: keccak256 of the uncompressed point without its tag.
    pub fn node_id(&self) -> [u8; 32] {
        keccak256(&self.public_key.serialize_uncompressed()[1..])
    }

    /// Binary record.
    pub fn to_rlp(&self) -> Vec<u8> {
        let mut payload = Vec::new();
        self.signature[..].encode(&mut payload);
        payload.extend_from_slice(&self.content_payload());
        rlp_list(&payload)
    }

    /// `seq` followed by the sorted key/value pairs, without a list header.
    fn content_payload(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.seq.encode(&mut out);
        encode_pair(&mut out, b"id", IDENTITY_SCHEME);
        if let Some(ip) = self.endpoint.ip {
            encode_pair(&mut out, b"ip", &ip.octets()[..]);
        }
        encode_pair(&mut out, b"secp256k1", &self.public_key.serialize()[..]);
        if let Some(tcp) = self.endpoint.tcp {
            encode_pair(&mut out, b"tcp", &tcp);
        }
        if let Some(udp) = self.endpoint.udp {
            encode_pair(&mut out, b"udp", &udp);
        }
        out
    }
}

impl fmt::Display for Enr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", TEXT_PREFIX, URL_SAFE_NO_PAD.encode(self.to_rlp()))
    }
}

fn encode_pair<V: Encodable + ?Sized>(out: &mut Vec<u8>, key: &[u8], value: &V) {
    key.encode(out);
    value.encode(out);
}

fn rlp_list(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 3);
    Header {
        list: true,
        payload_length: payload.len(),
    }
    .encode(&mut out);
    out.extend_from_slice(payload);
    out
}

fn skip_item(buf: &mut &[u8]) -> Result<(), EnrError> {
    let header = Header::decode(buf)?;
    if buf.len() < header.payload_length {
        return Err(alloy_rlp::Error::InputTooShort.into());
    }
    *buf = &buf[header.payload_length..];
    Ok(())
}

fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut hash = [0u8; 32];
    hasher.finalize(&mut hash);
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    // Example record from EIP-778.
    const EIP778_KEY: [u8; 32] =
        hex!("b71c71a67e1177ad4e901695e1b4b9ee17ae16c6668d313eac2f96dbcda3f291");
    const EIP778_ENR: &str = "enr:-IS4QHCYrYZbAKWCBRlAy5zzaDZXJBGkcnh4MHcBFZntXNFrdvJjX04jRzjzCBOonrkTfj499SZuOh8R33Ls8RRcy5wBgmlkgnY0gmlwhH8AAAGJc2VjcDI1NmsxoQPKY0yuDUmstAHYpMa2_oxVtw0RW_QAdpzBQA8yWM0xOIN1ZHCCdl8";

    fn eip778_endpoint() -> Endpoint {
        Endpoint {
            ip: Some(Ipv4Addr::new(127, 0, 0, 1)),
            tcp: None,
            udp: Some(30303),
        }
    }

    #[test]
    fn test_sign_matches_eip778_vector() {
        let secret = SecretKey::from_slice(&EIP778_KEY).unwrap();
        let enr = Enr::sign(&secret, 1, eip778_endpoint()).unwrap();
        assert_eq!(enr.to_string(), EIP778_ENR);
    }

    #[test]
    fn test_decode_eip778_vector() {
        let enr = Enr::decode(EIP778_ENR).unwrap();
        assert_eq!(enr.seq(), 1);
        assert_eq!(*enr.endpoint(), eip778_endpoint());
        assert_eq!(
            hex::encode(enr.public_key().serialize()),
            "03ca634cae0d49acb401d8a4c6b6fe8c55b70d115bf400769cc1400f3258cd3138"
        );
        assert_eq!(
            hex::encode(enr.node_id()),
            "a448f24c6d18e575453db13171562b71999873db5b286df957af199ec94617f7"
        );
    }

    #[test]
    fn test_roundtrip_default_endpoint() {
        let secret = SecretKey::from_slice(&[0x11; 32]).unwrap();
        let enr = Enr::sign(&secret, INITIAL_SEQ, Endpoint::default()).unwrap();
        let decoded = Enr::decode(&enr.to_string()).unwrap();
        assert_eq!(decoded, enr);
    }

    #[test]
    fn test_rejects_tampered_record() {
        let secret = SecretKey::from_slice(&[0x22; 32]).unwrap();
        let enr = Enr::sign(&secret, 7, Endpoint::default()).unwrap();
        let mut raw = enr.to_rlp();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let tampered = format!("enr:{}", URL_SAFE_NO_PAD.encode(raw));
        assert!(Enr::decode(&tampered).is_err());
    }

    /// Signs `content` (seq and pairs, no list header) as-is, bypassing the
    /// key ordering that [`Enr::sign`] enforces.
    fn sign_raw(secret: &SecretKey, content: &[u8]) -> String {
        let digest = keccak256(&rlp_list(content));
        let signature = Secp256k1::signing_only()
            .sign_ecdsa(&Message::from_digest(digest), secret)
            .serialize_compact();
        let mut payload = Vec::new();
        signature[..].encode(&mut payload);
        payload.extend_from_slice(content);
        format!("{}{}", TEXT_PREFIX, URL_SAFE_NO_PAD.encode(rlp_list(&payload)))
    }

    fn content(pairs: &[(&[u8], &[u8])]) -> Vec<u8> {
        let mut out = Vec::new();
        1u64.encode(&mut out);
        for (key, value) in pairs {
            encode_pair(&mut out, key, *value);
        }
        out
    }

    #[test]
    fn test_key_order_is_enforced() {
        let secret = SecretKey::from_slice(&[0x33; 32]).unwrap();
        let public = PublicKey::from_secret_key(&Secp256k1::signing_only(), &secret).serialize();
        let id: (&[u8], &[u8]) = (b"id", IDENTITY_SCHEME);
        let key: (&[u8], &[u8]) = (b"secp256k1", &public[..]);
        let udp: (&[u8], &[u8]) = (b"udp", &[0x76, 0x5f]);
        let other_udp: (&[u8], &[u8]) = (b"udp", &[0x76, 0x60]);

        let sorted = Enr::decode(&sign_raw(&secret, &content(&[id, key, udp]))).unwrap();
        assert_eq!(sorted.endpoint().udp, Some(30303));

        for pairs in [[key, id, udp], [id, key, key]] {
            let text = sign_raw(&secret, &content(&pairs));
            assert!(matches!(Enr::decode(&text), Err(EnrError::Malformed(_))));
        }
        let repeated = sign_raw(&secret, &content(&[id, key, udp, other_udp]));
        assert!(matches!(Enr::decode(&repeated), Err(EnrError::Malformed(_))));
    }

    #[test]
    fn test_rejects_missing_prefix() {
        let text = EIP778_ENR.trim_start_matches("enr:");
        assert!(matches!(Enr::decode(text), Err(EnrError::MissingPrefix)));
    }
}
