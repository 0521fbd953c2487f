//! Privacy-preserving vote tallying over the Paillier cryptosystem.
//!
//! Voters submit one-hot vectors of ciphertexts; the authority only ever
//! decrypts their component-wise homomorphic sum.

pub mod configs;
pub mod crypto_schemes;
pub mod data;
pub mod election;
pub mod serialize;
pub mod service;
