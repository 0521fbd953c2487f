use log::{debug, info};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use crate::crypto_schemes::bigint::BetterFormattingVec;
use crate::crypto_schemes::error::CryptoError;
use crate::crypto_schemes::paillier::{Ciphertext, PaillierCipher, PublicKey};
use super::error::ElectionError;
use super::manager::Election;
use super::phase::ElectionPhase;
use super::registry::{BallotOption, OptionKind};
use super::vote_vector::EncryptedVote;

pub struct TallyEngine;

impl TallyEngine {
    /// Exact number of ballots per option, in option id order.
    ///
    /// Ballots are summed component-wise under encryption; only the sums are decrypted.
    pub fn tally(election: &Election) -> Result<Vec<u64>, ElectionError> {
        election.phase().require(ElectionPhase::Tallying)?;
        let private_key = election.private_key().ok_or(ElectionError::KeyNotSet)?;
        let length = election.vector_length();
        let votes = election.cast_votes();
        if votes.is_empty() {
            info!("Tally of election {} finished with zero turnout.", election.generation());
            return Ok(vec![0; length]);
        }

        let sums = Self::aggregate(private_key.public_key(), length, votes);
        let counts = sums
            .iter()
            .map(|sum| {
                let count = PaillierCipher::decrypt(private_key, sum)?;
                Self::to_count(&count)
            })
            .collect::<Result<Vec<u64>, ElectionError>>()?;
        debug!("Per-option counts: {:?}", BetterFormattingVec(&counts));
        info!("Tally of election {} finished over {} ballots.", election.generation(), votes.len());
        Ok(counts)
    }

    /// Component-wise homomorphic sum of `votes`, each of which has `length` components.
    pub fn aggregate(public_key: &PublicKey, length: usize, votes: &[EncryptedVote]) -> Vec<Ciphertext> {
        let zero = vec![public_key.encrypted_zero(); length];
        votes.iter().fold(zero, |acc, vote| {
            acc.iter()
                .zip(vote.components())
                .map(|(sum, c)| PaillierCipher::add(public_key, sum, c))
                .collect()
        })
    }

    fn to_count(value: &BigUint) -> Result<u64, ElectionError> {
        u64::try_from(value).map_err(|_| ElectionError::Crypto(CryptoError::DecryptionError))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionResult {
    pub id: usize,
    pub name: String,
    pub kind: OptionKind,
    pub votes: u64,
}

/// Tally paired with the option labels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyReport {
    pub results: Vec<OptionResult>,
    pub total: u64,
}

impl TallyReport {
    pub fn new(options: Vec<BallotOption>, counts: Vec<u64>) -> Self {
        let total = counts.iter().sum();
        let results = options
            .into_iter()
            .zip(counts)
            .map(|(option, votes)| OptionResult {
                id: option.id,
                name: option.name,
                kind: option.kind,
                votes,
            })
            .collect();
        TallyReport { results, total }
    }

    pub fn counts(&self) -> Vec<u64> {
        self.results.iter().map(|r| r.votes).collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::crypto_schemes::paillier::KeyPair;
    use crate::election::manager::ElectionManager;
    use crate::election::registry::NewCandidate;
    use crate::election::vote_vector::{VoteSubmission, VoteVectorCodec};
    use super::*;

    fn voting_election(keys: &KeyPair) -> ElectionManager {
        let manager = ElectionManager::new();
        manager
            .start(
                vec![
                    NewCandidate { name: "A".into(), party: "P".into() },
                    NewCandidate { name: "B".into(), party: "Q".into() },
                ],
                vec![],
                Some(keys.public_key.clone()),
            )
            .unwrap();
        manager.advance_phase().unwrap();
        manager
    }

    #[test]
    fn counts_one_hot_ballots() {
        let keys = PaillierCipher::new().generate(256);
        let manager = voting_election(&keys);
        let mut cipher = PaillierCipher::new();
        for choice in [0, 1, 0] {
            let vote = VoteVectorCodec::encrypt_choice(&mut cipher, &keys.public_key, 2, choice).unwrap();
            manager.cast_vote(VoteSubmission::Encrypted(vote)).unwrap();
        }
        assert!(matches!(manager.tally(), Err(ElectionError::WrongPhase { .. })));
        manager.advance_phase().unwrap();
        assert_eq!(manager.tally(), Err(ElectionError::KeyNotSet));
        manager.upload_private_key(keys.private_key).unwrap();
        assert_eq!(manager.tally(), Ok(vec![2, 1]));
    }

    #[test]
    fn zero_turnout_is_all_zeros() {
        let keys = PaillierCipher::new().generate(256);
        let manager = voting_election(&keys);
        manager.advance_phase().unwrap();
        manager.upload_private_key(keys.private_key).unwrap();
        assert_eq!(manager.tally(), Ok(vec![0, 0]));
    }

    #[test]
    fn aggregate_preserves_component_order() {
        let keys = PaillierCipher::new().generate(256);
        let mut cipher = PaillierCipher::new();
        let votes: Vec<EncryptedVote> = [2usize, 2, 0, 1, 2]
            .iter()
            .map(|&i| VoteVectorCodec::encrypt_choice(&mut cipher, &keys.public_key, 3, i).unwrap())
            .collect();
        let sums = TallyEngine::aggregate(&keys.public_key, 3, &votes);
        let decrypted: Vec<BigUint> = sums
            .iter()
            .map(|c| PaillierCipher::decrypt(&keys.private_key, c).unwrap())
            .collect();
        assert_eq!(decrypted, vec![BigUint::from(1u8), BigUint::from(1u8), BigUint::from(3u8)]);
    }

    #[test]
    fn report_labels_counts() {
        let options = vec![
            BallotOption { id: 0, name: "A".into(), kind: OptionKind::Candidate },
            BallotOption { id: 1, name: "P".into(), kind: OptionKind::Party },
        ];
        let report = TallyReport::new(options, vec![4, 3]);
        assert_eq!(report.total, 7);
        assert_eq!(report.results[1].name, "P");
        assert_eq!(report.counts(), vec![4, 3]);
    }
}
