use thiserror::Error;
use crate::crypto_schemes::error::CryptoError;
use super::ledger::LedgerError;
use super::phase::ElectionPhase;

/// Failures of election operations.
///
/// Everything except [`ElectionError::Internal`] is a protocol violation the
/// caller has to correct. `Internal` is an infrastructure failure and may be retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElectionError {
    #[error("election has not started")]
    NotStarted,

    #[error("election has already started")]
    AlreadyStarted,

    #[error("missing input: {0}")]
    MissingInput(String),

    #[error("operation requires the {expected} phase, election is in the {actual} phase")]
    WrongPhase {
        expected: ElectionPhase,
        actual: ElectionPhase,
    },

    #[error("election has already ended")]
    ElectionEnded,

    #[error("vote vector has {actual} components, expected {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("option index {index} is out of range for {length} options")]
    IndexOutOfRange { index: usize, length: usize },

    #[error("key has not been uploaded")]
    KeyNotSet,

    #[error("key has already been uploaded")]
    KeyAlreadySet,

    #[error("private key does not belong to the election public key")]
    KeyMismatch,

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("internal error: {0}")]
    Internal(#[from] LedgerError),
}

impl ElectionError {
    /// Stable identifier reported to remote callers.
    pub fn kind(&self) -> &'static str {
        match self {
            ElectionError::NotStarted => "not_started",
            ElectionError::AlreadyStarted => "already_started",
            ElectionError::MissingInput(_) => "missing_input",
            ElectionError::WrongPhase { .. } => "wrong_phase",
            ElectionError::ElectionEnded => "election_ended",
            ElectionError::ShapeMismatch { .. } => "shape_mismatch",
            ElectionError::IndexOutOfRange { .. } => "index_out_of_range",
            ElectionError::KeyNotSet => "key_not_set",
            ElectionError::KeyAlreadySet => "key_already_set",
            ElectionError::KeyMismatch => "key_mismatch",
            ElectionError::Crypto(CryptoError::InvalidPlaintext) => "invalid_plaintext",
            ElectionError::Crypto(CryptoError::InvalidCiphertext) => "invalid_ciphertext",
            ElectionError::Crypto(CryptoError::DecryptionError) => "decryption_error",
            ElectionError::Crypto(CryptoError::InvalidKey) => "invalid_key",
            ElectionError::Internal(_) => "internal",
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, ElectionError::Internal(_))
    }
}
