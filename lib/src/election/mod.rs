pub mod error;
pub mod ledger;
pub mod manager;
pub mod phase;
pub mod registry;
pub mod tally;
pub mod vote_vector;

pub use error::ElectionError;
pub use ledger::{InMemoryLedger, Ledger, LedgerEntry, LedgerError};
pub use manager::{Election, ElectionHandle, ElectionManager};
pub use phase::{ElectionPhase, PhaseMachine};
pub use registry::{BallotOption, Candidate, NewCandidate, NewParty, OptionKind, Party};
pub use tally::{TallyEngine, TallyReport};
pub use vote_vector::{EncryptedVote, VoteSubmission, VoteVectorCodec};
