pub mod bigint;
pub mod error;
pub mod paillier;
