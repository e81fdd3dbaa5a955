//! Flat key-material record handed back to callers.

use serde::Serialize;

/// Text forms of a freshly generated node identity.
///
/// Exactly one of `full_private_key` (libp2p) and `enr` (devp2p) is set; the
/// constructors enforce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMaterial {
    public_key: String,
    private_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    full_private_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    enr: Option<String>,
}

impl KeyMaterial {
    pub(crate) fn libp2p(public_key: String, private_key: String, full_private_key: String) -> Self {
        Self {
            public_key,
            private_key,
            full_private_key: Some(full_private_key),
            enr: None,
        }
    }

    pub(crate) fn devp2p(public_key: String, private_key: String, enr: String) -> Self {
        Self {
            public_key,
            private_key,
            full_private_key: None,
            enr: Some(enr),
        }
    }

    /// Public key (peer identifier for libp2p, raw point hex for devp2p).
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Private scalar or seed, hex encoded.
    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    /// Complete private key structure, hex encoded. Libp2p only.
    pub fn full_private_key(&self) -> Option<&str> {
        self.full_private_key.as_deref()
    }

    /// Signed node record. Devp2p only.
    pub fn enr(&self) -> Option<&str> {
        self.enr.as_deref()
    }
}
