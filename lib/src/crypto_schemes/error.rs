use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("plaintext is not in the range [0, n)")]
    InvalidPlaintext,

    #[error("ciphertext is not a unit modulo n^2")]
    InvalidCiphertext,

    #[error("ciphertext was not produced under the matching key")]
    DecryptionError,

    #[error("key material is not a usable Paillier key")]
    InvalidKey,
}
