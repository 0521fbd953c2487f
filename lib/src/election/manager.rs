use std::sync::{Mutex, MutexGuard, PoisonError};
use log::{debug, error, info};
use crate::crypto_schemes::paillier::{PaillierCipher, PrivateKey, PublicKey};
use crate::crypto_schemes::error::CryptoError;
use super::error::ElectionError;
use super::ledger::{InMemoryLedger, Ledger, LedgerEntry};
use super::phase::{ElectionPhase, PhaseMachine};
use super::registry::{BallotOption, Candidate, NewCandidate, NewParty, Party, Registry};
use super::tally::{TallyEngine, TallyReport};
use super::vote_vector::{EncryptedVote, VoteSubmission, VoteVectorCodec};

/// State of the single live election.
#[derive(Clone, Debug)]
pub struct Election {
    generation: u64,
    phase: PhaseMachine,
    registry: Registry,
    public_key: Option<PublicKey>,
    private_key: Option<PrivateKey>,
    cast_votes: Vec<EncryptedVote>,
}

impl Election {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> &PhaseMachine {
        &self.phase
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Required length of every vote vector, fixed at start.
    pub fn vector_length(&self) -> usize {
        self.registry.len()
    }

    pub fn public_key(&self) -> Option<&PublicKey> {
        self.public_key.as_ref()
    }

    pub fn private_key(&self) -> Option<&PrivateKey> {
        self.private_key.as_ref()
    }

    pub fn cast_votes(&self) -> &[EncryptedVote] {
        &self.cast_votes
    }
}

/// Returned by [`ElectionManager::start`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElectionHandle {
    pub generation: u64,
    pub vector_length: usize,
    pub options: Vec<BallotOption>,
}

struct ManagerState<L> {
    election: Option<Election>,
    ledger: L,
    generation: u64,
}

/// Owner of the at most one active election.
///
/// All state sits behind one mutex, so each operation's phase check and
/// its effect are a single atomic step. Share it with `Arc`.
pub struct ElectionManager<L: Ledger = InMemoryLedger> {
    state: Mutex<ManagerState<L>>,
}

impl ElectionManager<InMemoryLedger> {
    pub fn new() -> Self {
        Self::with_ledger(InMemoryLedger::new())
    }
}

impl Default for ElectionManager<InMemoryLedger> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Ledger> ElectionManager<L> {
    pub fn with_ledger(ledger: L) -> Self {
        ElectionManager {
            state: Mutex::new(ManagerState { election: None, ledger, generation: 0 }),
        }
    }

    // Every mutation checks all preconditions before touching state, so a
    // panic elsewhere never leaves a half applied election behind the lock.
    fn lock(&self) -> MutexGuard<'_, ManagerState<L>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn inspect_ledger<T>(&self, f: impl FnOnce(&L) -> T) -> T {
        f(&self.lock().ledger)
    }

    pub fn start(
        &self,
        candidates: Vec<NewCandidate>,
        parties: Vec<NewParty>,
        public_key: Option<PublicKey>,
    ) -> Result<ElectionHandle, ElectionError> {
        let mut state = self.lock();
        if state.election.is_some() {
            return Err(ElectionError::AlreadyStarted);
        }
        let registry = Registry::build(candidates, parties)?;
        if let Some(public_key) = &public_key {
            Self::require_well_formed(public_key)?;
        }
        let generation = state.generation + 1;
        state.ledger.commit(LedgerEntry::ElectionStarted {
            generation,
            candidates: registry.candidates().to_vec(),
            parties: registry.parties().to_vec(),
            public_key: public_key.clone(),
        })?;

        let handle = ElectionHandle {
            generation,
            vector_length: registry.len(),
            options: registry.options(),
        };
        info!(
            "Election {} started with {} candidates and {} parties.",
            generation,
            registry.candidates().len(),
            registry.parties().len()
        );
        state.generation = generation;
        state.election = Some(Election {
            generation,
            phase: PhaseMachine::new(),
            registry,
            public_key,
            private_key: None,
            cast_votes: Vec::new(),
        });
        Ok(handle)
    }

    pub fn upload_public_key(&self, public_key: PublicKey) -> Result<(), ElectionError> {
        let mut state = self.lock();
        let ManagerState { election, ledger, .. } = &mut *state;
        let election = election.as_mut().ok_or(ElectionError::NotStarted)?;
        election.phase.require(ElectionPhase::Registration)?;
        if election.public_key.is_some() {
            return Err(ElectionError::KeyAlreadySet);
        }
        Self::require_well_formed(&public_key)?;
        ledger.commit(LedgerEntry::PublicKeyUploaded { public_key: public_key.clone() })?;
        election.public_key = Some(public_key);
        info!("Public key uploaded.");
        Ok(())
    }

    pub fn advance_phase(&self) -> Result<ElectionPhase, ElectionError> {
        let mut state = self.lock();
        let ManagerState { election, ledger, .. } = &mut *state;
        let election = election.as_mut().ok_or(ElectionError::NotStarted)?;
        let from = election.phase.current();
        let to = election.phase.peek_next()?;
        if to == ElectionPhase::Voting && election.public_key.is_none() {
            return Err(ElectionError::KeyNotSet);
        }
        ledger.commit(LedgerEntry::PhaseAdvanced { from, to })?;
        election.phase.advance()?;
        info!("Election phase advanced from {} to {}.", from, to);
        Ok(to)
    }

    pub fn phase(&self) -> Result<ElectionPhase, ElectionError> {
        self.read(|election| Ok(election.phase.current()))
    }

    pub fn public_key(&self) -> Result<PublicKey, ElectionError> {
        self.read(|election| election.public_key.clone().ok_or(ElectionError::KeyNotSet))
    }

    fn require_well_formed(public_key: &PublicKey) -> Result<(), ElectionError> {
        if public_key.is_well_formed() {
            Ok(())
        } else {
            Err(CryptoError::InvalidKey.into())
        }
    }

    pub fn upload_private_key(&self, private_key: PrivateKey) -> Result<(), ElectionError> {
        let usable = PaillierCipher::new().check_private_key(&private_key).is_ok();
        let mut state = self.lock();
        let ManagerState { election, ledger, .. } = &mut *state;
        let election = election.as_mut().ok_or(ElectionError::NotStarted)?;
        Self::store_private_key(election, ledger, private_key, usable, false)
    }

    // `usable` is the outcome of the key check, which runs before the lock is taken.
    fn store_private_key(
        election: &mut Election,
        ledger: &mut L,
        private_key: PrivateKey,
        usable: bool,
        accept_identical: bool,
    ) -> Result<(), ElectionError> {
        election.phase.require(ElectionPhase::Tallying)?;
        if let Some(existing) = &election.private_key {
            return if accept_identical && existing == &private_key {
                Ok(())
            } else {
                Err(ElectionError::KeyAlreadySet)
            };
        }
        if election.public_key.as_ref() != Some(private_key.public_key()) || !usable {
            return Err(ElectionError::KeyMismatch);
        }
        ledger.commit(LedgerEntry::PrivateKeyPublished { private_key: private_key.clone() })?;
        election.private_key = Some(private_key);
        info!("Private key published.");
        Ok(())
    }

    /// The released decryption key, so anyone can recompute the tally.
    pub fn private_key(&self) -> Result<PrivateKey, ElectionError> {
        self.read(|election| {
            election.phase.require(ElectionPhase::Tallying)?;
            election.private_key.clone().ok_or(ElectionError::KeyNotSet)
        })
    }

    /// Validates and appends a ballot, returning its position.
    ///
    /// A `Choice` is encrypted without holding the lock. The key and vector
    /// length are fixed once voting opens, so only the generation is re-checked.
    pub fn cast_vote(&self, submission: VoteSubmission) -> Result<usize, ElectionError> {
        match submission {
            VoteSubmission::Choice(index) => {
                let (vote, generation) = self.seal_choice(index)?;
                self.append_vote(vote, Some(generation))
            }
            VoteSubmission::Encrypted(vote) => self.append_vote(vote, None),
        }
    }

    fn seal_choice(&self, index: usize) -> Result<(EncryptedVote, u64), ElectionError> {
        let (generation, public_key, length) = self.read(|election| {
            election.phase.require(ElectionPhase::Voting)?;
            let public_key = election.public_key.clone().ok_or(ElectionError::KeyNotSet)?;
            Ok((election.generation, public_key, election.vector_length()))
        })?;
        let vote = VoteVectorCodec::encrypt_choice(&mut PaillierCipher::new(), &public_key, length, index)?;
        Ok((vote, generation))
    }

    fn append_vote(&self, vote: EncryptedVote, sealed_for: Option<u64>) -> Result<usize, ElectionError> {
        let mut state = self.lock();
        let ManagerState { election, ledger, .. } = &mut *state;
        let election = election.as_mut().ok_or(ElectionError::NotStarted)?;
        if sealed_for.is_some_and(|generation| generation != election.generation) {
            return Err(ElectionError::ElectionEnded);
        }
        election.phase.require(ElectionPhase::Voting)?;
        let public_key = election.public_key.as_ref().ok_or(ElectionError::KeyNotSet)?;
        let expected = election.registry.len();
        if !VoteVectorCodec::validate_shape(&vote, expected) {
            return Err(ElectionError::ShapeMismatch { expected, actual: vote.len() });
        }
        if !vote.components().iter().all(|c| public_key.is_valid_ciphertext(c)) {
            return Err(CryptoError::InvalidCiphertext.into());
        }

        let position = election.cast_votes.len();
        ledger.commit(LedgerEntry::VoteCast { position, vote: vote.clone() })?;
        election.cast_votes.push(vote);
        debug!("Vote accepted at position {}.", position);
        Ok(position)
    }

    pub fn candidates(&self) -> Result<Vec<Candidate>, ElectionError> {
        self.read(|election| Ok(election.registry.candidates().to_vec()))
    }

    pub fn parties(&self) -> Result<Vec<Party>, ElectionError> {
        self.read(|election| Ok(election.registry.parties().to_vec()))
    }

    pub fn options(&self) -> Result<Vec<BallotOption>, ElectionError> {
        self.read(|election| Ok(election.registry.options()))
    }

    pub fn vote_count(&self) -> Result<usize, ElectionError> {
        self.read(|election| Ok(election.cast_votes.len()))
    }

    pub fn encrypted_votes(&self) -> Result<Vec<EncryptedVote>, ElectionError> {
        self.read(|election| Ok(election.cast_votes.clone()))
    }

    /// Consistent copy of the live election.
    pub fn snapshot(&self) -> Result<Election, ElectionError> {
        self.read(|election| Ok(election.clone()))
    }

    /// Per-option counts, ordered by option id.
    ///
    /// The sum runs on a snapshot outside the lock. In the tallying phase
    /// no vote can be appended, so the snapshot is the final ballot box.
    pub fn tally(&self) -> Result<Vec<u64>, ElectionError> {
        let election = self.snapshot()?;
        TallyEngine::tally(&election)
    }

    /// Publishes `private_key` if it is not yet known, then tallies.
    pub fn tally_with_key(&self, private_key: PrivateKey) -> Result<Vec<u64>, ElectionError> {
        let usable = PaillierCipher::new().check_private_key(&private_key).is_ok();
        let election = {
            let mut state = self.lock();
            let ManagerState { election, ledger, .. } = &mut *state;
            let election = election.as_mut().ok_or(ElectionError::NotStarted)?;
            Self::store_private_key(election, ledger, private_key, usable, true)?;
            election.clone()
        };
        TallyEngine::tally(&election)
    }

    pub fn results(&self) -> Result<TallyReport, ElectionError> {
        let election = self.snapshot()?;
        let counts = TallyEngine::tally(&election)?;
        Ok(TallyReport::new(election.registry.options(), counts))
    }

    /// Ends the election cycle. Never fails; a ledger failure is only logged.
    pub fn reset(&self) {
        let mut state = self.lock();
        let Some(election) = state.election.take() else { return };
        if let Err(e) = state.ledger.commit(LedgerEntry::Reset { generation: election.generation }) {
            error!("Failed to record reset of election {}: {}", election.generation, e);
        }
        info!("Election {} reset.", election.generation);
    }

    fn read<T>(&self, f: impl FnOnce(&Election) -> Result<T, ElectionError>) -> Result<T, ElectionError> {
        let state = self.lock();
        let election = state.election.as_ref().ok_or(ElectionError::NotStarted)?;
        f(election)
    }
}
