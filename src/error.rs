//! Error taxonomy shared by both generators.

use crate::entropy::EntropyMode;

/// Errors returned by key generation.
///
/// Nothing here is logged by the library; the caller decides how to present it.
#[derive(Debug, thiserror::Error)]
pub enum NodeKeyError {
    /// The requested algorithm family is not one this crate knows about.
    #[error("unsupported key algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The underlying primitive could not produce a key.
    #[error("{algorithm} key generation failed ({mode} mode): {reason}")]
    KeyGeneration {
        algorithm: &'static str,
        mode: EntropyMode,
        reason: String,
    },

    /// A generated key could not be rendered into its text form.
    #[error("{algorithm} key encoding failed ({mode} mode): {reason}")]
    Encoding {
        algorithm: &'static str,
        mode: EntropyMode,
        reason: String,
    },

    /// A serialized key handed back for loading could not be parsed.
    #[error("invalid {algorithm} key: {reason}")]
    InvalidKey {
        algorithm: &'static str,
        reason: String,
    },
}

impl NodeKeyError {
    /// Returns true if calling again may succeed.
    ///
    /// Only secure-mode generation failures qualify: a deterministic request
    /// replays the same seed and fails the same way every time.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            NodeKeyError::KeyGeneration {
                mode: EntropyMode::Secure,
                ..
            }
        )
    }
}

/// Algorithm and mode attached to every error raised while serving one request.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ErrorContext {
    pub algorithm: &'static str,
    pub mode: EntropyMode,
}

impl ErrorContext {
    pub fn new(algorithm: &'static str, mode: EntropyMode) -> Self {
        Self { algorithm, mode }
    }

    pub fn generation(self, reason: impl std::fmt::Display) -> NodeKeyError {
        NodeKeyError::KeyGeneration {
            algorithm: self.algorithm,
            mode: self.mode,
            reason: reason.to_string(),
        }
    }

    pub fn encoding(self, reason: impl std::fmt::Display) -> NodeKeyError {
        NodeKeyError::Encoding {
            algorithm: self.algorithm,
            mode: self.mode,
            reason: reason.to_string(),
        }
    }

    pub fn invalid_key(self, reason: impl std::fmt::Display) -> NodeKeyError {
        NodeKeyError::InvalidKey {
            algorithm: self.algorithm,
            reason: reason.to_string(),
        }
    }
}
