//! Durable record of election mutations.
//!
//! Every mutating [`ElectionManager`](super::manager::ElectionManager)
//! operation is committed as a single [`LedgerEntry`] before it is applied.
//! A failed commit leaves the election untouched.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::crypto_schemes::paillier::{PrivateKey, PublicKey};
use super::phase::ElectionPhase;
use super::registry::{Candidate, Party};
use super::vote_vector::EncryptedVote;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    #[error("ledger rejected entry: {0}")]
    Rejected(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEntry {
    ElectionStarted {
        generation: u64,
        candidates: Vec<Candidate>,
        parties: Vec<Party>,
        public_key: Option<PublicKey>,
    },
    PublicKeyUploaded {
        public_key: PublicKey,
    },
    PhaseAdvanced {
        from: ElectionPhase,
        to: ElectionPhase,
    },
    VoteCast {
        position: usize,
        vote: EncryptedVote,
    },
    PrivateKeyPublished {
        private_key: PrivateKey,
    },
    Reset {
        generation: u64,
    },
}

pub trait Ledger: Send {
    /// Atomically records `entry`. Either the whole entry is durable or nothing is.
    fn commit(&mut self, entry: LedgerEntry) -> Result<(), LedgerError>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub entry: LedgerEntry,
    /// sha256 over the previous digest and this entry.
    pub digest: String,
}

/// Append-only, hash-chained journal kept in memory.
#[derive(Clone, Debug, Default)]
pub struct InMemoryLedger {
    records: Vec<LedgerRecord>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[LedgerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn chain_digest(previous: &str, entry: &LedgerEntry) -> Result<String, LedgerError> {
        let serialized = serde_json::to_string(entry).map_err(|e| LedgerError::Rejected(e.to_string()))?;
        Ok(sha256::digest(format!("{}{}", previous, serialized)))
    }

    /// Recomputes every digest and checks the chain is intact.
    pub fn verify_chain(&self) -> bool {
        let mut previous = String::new();
        for record in &self.records {
            match Self::chain_digest(&previous, &record.entry) {
                Ok(digest) if digest == record.digest => previous = digest,
                _ => return false,
            }
        }
        true
    }
}

impl Ledger for InMemoryLedger {
    fn commit(&mut self, entry: LedgerEntry) -> Result<(), LedgerError> {
        let previous = self.records.last().map(|r| r.digest.as_str()).unwrap_or("");
        let digest = Self::chain_digest(previous, &entry)?;
        self.records.push(LedgerRecord { entry, digest });
        Ok(())
    }
}
