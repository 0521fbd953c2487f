use serde::{Deserialize, Serialize};
use super::error::ElectionError;

/// Candidate as supplied when the election is started.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCandidate {
    pub name: String,
    pub party: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewParty {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: usize,
    pub name: String,
    pub party: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: usize,
    pub name: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    Candidate,
    Party,
}

/// A votable option. `id` is also its coordinate in every vote vector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotOption {
    pub id: usize,
    pub name: String,
    pub kind: OptionKind,
}

/// Candidates and parties sharing one ordinal id space: candidates take
/// `0..C`, parties take `C..C + P`, each in submission order.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Registry {
    candidates: Vec<Candidate>,
    parties: Vec<Party>,
}

impl Registry {
    pub fn build(candidates: Vec<NewCandidate>, parties: Vec<NewParty>) -> Result<Self, ElectionError> {
        if candidates.is_empty() && parties.is_empty() {
            return Err(ElectionError::MissingInput("at least one candidate or party is required".into()));
        }
        for candidate in &candidates {
            if candidate.name.trim().is_empty() || candidate.party.trim().is_empty() {
                return Err(ElectionError::MissingInput("candidates need a name and a party".into()));
            }
        }
        if parties.iter().any(|party| party.name.trim().is_empty()) {
            return Err(ElectionError::MissingInput("parties need a name".into()));
        }

        let offset = candidates.len();
        let candidates = candidates
            .into_iter()
            .enumerate()
            .map(|(id, c)| Candidate { id, name: c.name, party: c.party })
            .collect();
        let parties = parties
            .into_iter()
            .enumerate()
            .map(|(i, p)| Party { id: offset + i, name: p.name })
            .collect();
        Ok(Registry { candidates, parties })
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn parties(&self) -> &[Party] {
        &self.parties
    }

    /// Number of votable options, the required length of every vote vector.
    pub fn len(&self) -> usize {
        self.candidates.len() + self.parties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All options ordered by id.
    pub fn options(&self) -> Vec<BallotOption> {
        let candidates = self.candidates.iter().map(|c| BallotOption {
            id: c.id,
            name: c.name.clone(),
            kind: OptionKind::Candidate,
        });
        let parties = self.parties.iter().map(|p| BallotOption {
            id: p.id,
            name: p.name.clone(),
            kind: OptionKind::Party,
        });
        candidates.chain(parties).collect()
    }
}
