use std::fmt;
use serde::{Deserialize, Serialize};
use super::error::ElectionError;

/// States in the election lifecycle, in the only order they can be visited.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ElectionPhase {
    /// Options are fixed and the public key is uploaded.
    Registration,
    /// Encrypted ballots are accepted.
    Voting,
    /// The private key is released and the tally computed. Terminal.
    Tallying,
}

impl ElectionPhase {
    pub fn next(self) -> Option<ElectionPhase> {
        match self {
            ElectionPhase::Registration => Some(ElectionPhase::Voting),
            ElectionPhase::Voting => Some(ElectionPhase::Tallying),
            ElectionPhase::Tallying => None,
        }
    }
}

impl fmt::Display for ElectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElectionPhase::Registration => "registration",
            ElectionPhase::Voting => "voting",
            ElectionPhase::Tallying => "tallying",
        };
        f.write_str(name)
    }
}

/// One-way phase tracker guarding every phase-sensitive operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseMachine {
    current: ElectionPhase,
}

impl PhaseMachine {
    pub fn new() -> Self {
        PhaseMachine { current: ElectionPhase::Registration }
    }

    pub fn current(&self) -> ElectionPhase {
        self.current
    }

    /// The phase `advance` would move to, without moving.
    pub fn peek_next(&self) -> Result<ElectionPhase, ElectionError> {
        self.current.next().ok_or(ElectionError::ElectionEnded)
    }

    pub fn advance(&mut self) -> Result<ElectionPhase, ElectionError> {
        let next = self.peek_next()?;
        self.current = next;
        Ok(next)
    }

    pub fn require(&self, expected: ElectionPhase) -> Result<(), ElectionError> {
        if self.current == expected {
            Ok(())
        } else {
            Err(ElectionError::WrongPhase { expected, actual: self.current })
        }
    }
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self::new()
    }
}
