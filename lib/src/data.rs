use serde::{Deserialize, Serialize};
use crate::crypto_schemes::paillier::{PrivateKey, PublicKey};
use crate::election::{
    BallotOption, Candidate, ElectionError, ElectionPhase, EncryptedVote, NewCandidate, NewParty, Party,
    TallyReport, VoteSubmission,
};

/// Sent by the authority or a voter to the voting_server.
///
/// `candidates`/`parties` are optional so that an absent field can be
/// reported as missing input rather than as a malformed message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Request {
    StartElection {
        candidates: Option<Vec<NewCandidate>>,
        parties: Option<Vec<NewParty>>,
        public_key: Option<PublicKey>,
    },
    UploadPublicKey(PublicKey),
    AdvancePhase,
    GetPhase,
    GetPublicKey,
    CastVote(VoteSubmission),
    UploadPrivateKey(PrivateKey),
    GetPrivateKey,
    GetCandidates,
    GetParties,
    GetOptions,
    GetVoteCount,
    GetEncryptedVotes,
    Tally { private_key: Option<PrivateKey> },
    GetResults,
    Reset,
}

/// Sent back by the voting_server, one per request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Response {
    ElectionStarted { generation: u64, vector_length: usize, options: Vec<BallotOption> },
    Phase(ElectionPhase),
    PublicKey(PublicKey),
    PrivateKey(PrivateKey),
    VoteAccepted { position: usize },
    Candidates(Vec<Candidate>),
    Parties(Vec<Party>),
    Options(Vec<BallotOption>),
    VoteCount(usize),
    EncryptedVotes(Vec<EncryptedVote>),
    Tally(Vec<u64>),
    Results(TallyReport),
    Done,
    Error { kind: String, message: String },
}

impl From<ElectionError> for Response {
    fn from(e: ElectionError) -> Self {
        Response::Error { kind: e.kind().to_string(), message: e.to_string() }
    }
}

impl Response {
    pub fn malformed(message: impl Into<String>) -> Self {
        Response::Error { kind: "malformed_request".into(), message: message.into() }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }
}
