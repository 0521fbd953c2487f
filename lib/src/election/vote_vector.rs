use num_bigint::BigUint;
use rand::Rng;
use serde::{Deserialize, Serialize};
use num_traits::{One, Zero};
use crate::crypto_schemes::paillier::{Ciphertext, PaillierCipher, PublicKey};
use super::error::ElectionError;

/// One ballot: a ciphertext per option, in option id order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncryptedVote(pub Vec<Ciphertext>);

impl EncryptedVote {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn components(&self) -> &[Ciphertext] {
        &self.0
    }
}

/// What a voter submits: either the chosen option, encrypted on their
/// behalf, or a vector they encrypted themselves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteSubmission {
    Choice(usize),
    Encrypted(EncryptedVote),
}

pub struct VoteVectorCodec;

impl VoteVectorCodec {
    /// `length` zeros with a single one at `chosen_index`.
    pub fn build_plaintext_vector(length: usize, chosen_index: usize) -> Result<Vec<BigUint>, ElectionError> {
        if chosen_index >= length {
            return Err(ElectionError::IndexOutOfRange { index: chosen_index, length });
        }
        Ok((0..length)
            .map(|i| if i == chosen_index { BigUint::one() } else { BigUint::zero() })
            .collect())
    }

    /// Each component gets its own encryption randomness.
    pub fn encrypt_vector<R: Rng>(
        cipher: &mut PaillierCipher<R>,
        public_key: &PublicKey,
        plaintext: &[BigUint],
    ) -> Result<EncryptedVote, ElectionError> {
        let components = plaintext
            .iter()
            .map(|value| cipher.encrypt(public_key, value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(EncryptedVote(components))
    }

    /// Convenience for clients: the encrypted one-hot vector for `chosen_index`.
    pub fn encrypt_choice<R: Rng>(
        cipher: &mut PaillierCipher<R>,
        public_key: &PublicKey,
        length: usize,
        chosen_index: usize,
    ) -> Result<EncryptedVote, ElectionError> {
        let plaintext = Self::build_plaintext_vector(length, chosen_index)?;
        Self::encrypt_vector(cipher, public_key, &plaintext)
    }

    pub fn validate_shape(vote: &EncryptedVote, expected_length: usize) -> bool {
        vote.len() == expected_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plaintext_vector_is_one_hot() {
        for length in 1..6 {
            for chosen in 0..length {
                let vector = VoteVectorCodec::build_plaintext_vector(length, chosen).unwrap();
                assert_eq!(vector.len(), length);
                for (i, value) in vector.iter().enumerate() {
                    let expected = if i == chosen { 1u8 } else { 0u8 };
                    assert_eq!(value, &BigUint::from(expected));
                }
            }
        }
    }

    #[test]
    fn chosen_index_must_be_in_range() {
        assert_eq!(
            VoteVectorCodec::build_plaintext_vector(3, 3),
            Err(ElectionError::IndexOutOfRange { index: 3, length: 3 })
        );
        assert!(VoteVectorCodec::build_plaintext_vector(0, 0).is_err());
    }

    #[test]
    fn encrypted_components_are_distinct() {
        let mut cipher = PaillierCipher::new();
        let keys = cipher.generate(256);
        let vote = VoteVectorCodec::encrypt_choice(&mut cipher, &keys.public_key, 4, 2).unwrap();
        assert!(VoteVectorCodec::validate_shape(&vote, 4));
        assert!(!VoteVectorCodec::validate_shape(&vote, 3));
        assert!(!VoteVectorCodec::validate_shape(&vote, 5));
        // three encryptions of zero, none bit-identical
        let zeros = [&vote.0[0], &vote.0[1], &vote.0[3]];
        assert_ne!(zeros[0], zeros[1]);
        assert_ne!(zeros[1], zeros[2]);
        let decrypted: Vec<BigUint> = vote
            .components()
            .iter()
            .map(|c| PaillierCipher::decrypt(&keys.private_key, c).unwrap())
            .collect();
        assert_eq!(decrypted, VoteVectorCodec::build_plaintext_vector(4, 2).unwrap());
    }

    #[test]
    fn submission_wire_shapes() {
        let choice: VoteSubmission = serde_json::from_str(r#"{"choice": 1}"#).unwrap();
        assert_eq!(choice, VoteSubmission::Choice(1));
        let vector: VoteSubmission = serde_json::from_str(r#"{"encrypted": ["17", "23"]}"#).unwrap();
        let VoteSubmission::Encrypted(vote) = vector else { panic!("expected encrypted vote") };
        assert_eq!(vote.components()[1], Ciphertext(BigUint::from(23u8)));
    }
}
