//! Maps wire requests onto [`ElectionManager`] operations.

use log::{debug, warn};
use serde_json::json;
use crate::data::{Request, Response};
use crate::election::{ElectionError, ElectionManager, Ledger};

pub fn handle_request<L: Ledger>(manager: &ElectionManager<L>, request: Request) -> Response {
    match dispatch(manager, request) {
        Ok(response) => response,
        Err(e) => {
            if e.is_internal() {
                warn!("Request failed on infrastructure: {}", e);
            } else {
                debug!("Request rejected: {}", e);
            }
            e.into()
        }
    }
}

/// Parses one JSON message and answers it with one JSON message.
pub fn handle_message<L: Ledger>(manager: &ElectionManager<L>, message: &str) -> String {
    let response = match serde_json::from_str::<Request>(message) {
        Ok(request) => handle_request(manager, request),
        Err(e) => Response::malformed(e.to_string()),
    };
    serde_json::to_string(&response).unwrap_or_else(|e| internal_error_reply(&e.to_string()))
}

fn internal_error_reply(message: &str) -> String {
    json!({ "Error": { "kind": "internal", "message": message } }).to_string()
}

fn dispatch<L: Ledger>(manager: &ElectionManager<L>, request: Request) -> Result<Response, ElectionError> {
    let response = match request {
        Request::StartElection { candidates, parties, public_key } => {
            let (Some(candidates), Some(parties)) = (candidates, parties) else {
                return Err(ElectionError::MissingInput("candidates and parties are required".into()));
            };
            let handle = manager.start(candidates, parties, public_key)?;
            Response::ElectionStarted {
                generation: handle.generation,
                vector_length: handle.vector_length,
                options: handle.options,
            }
        }
        Request::UploadPublicKey(public_key) => {
            manager.upload_public_key(public_key)?;
            Response::Done
        }
        Request::AdvancePhase => Response::Phase(manager.advance_phase()?),
        Request::GetPhase => Response::Phase(manager.phase()?),
        Request::GetPublicKey => Response::PublicKey(manager.public_key()?),
        Request::CastVote(submission) => Response::VoteAccepted { position: manager.cast_vote(submission)? },
        Request::UploadPrivateKey(private_key) => {
            manager.upload_private_key(private_key)?;
            Response::Done
        }
        Request::GetPrivateKey => Response::PrivateKey(manager.private_key()?),
        Request::GetCandidates => Response::Candidates(manager.candidates()?),
        Request::GetParties => Response::Parties(manager.parties()?),
        Request::GetOptions => Response::Options(manager.options()?),
        Request::GetVoteCount => Response::VoteCount(manager.vote_count()?),
        Request::GetEncryptedVotes => Response::EncryptedVotes(manager.encrypted_votes()?),
        Request::Tally { private_key: Some(private_key) } => Response::Tally(manager.tally_with_key(private_key)?),
        Request::Tally { private_key: None } => Response::Tally(manager.tally()?),
        Request::GetResults => Response::Results(manager.results()?),
        Request::Reset => {
            manager.reset();
            Response::Done
        }
    };
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_lists_are_missing_input() {
        let manager = ElectionManager::new();
        let reply = handle_message(&manager, r#"{"StartElection":{"candidates":[{"name":"A","party":"X"}]}}"#);
        let response: Response = serde_json::from_str(&reply).unwrap();
        let Response::Error { kind, .. } = response else { panic!("expected an error") };
        assert_eq!(kind, "missing_input");
    }

    #[test]
    fn internal_reply_escapes_the_message() {
        let reply = internal_error_reply(r#"key "n" is not a "number""#);
        let response: Response = serde_json::from_str(&reply).unwrap();
        assert_eq!(response, Response::Error {
            kind: "internal".into(),
            message: r#"key "n" is not a "number""#.into(),
        });
    }

    #[test]
    fn garbage_is_malformed() {
        let manager = ElectionManager::new();
        let response: Response = serde_json::from_str(&handle_message(&manager, "{not json")).unwrap();
        assert!(matches!(response, Response::Error { ref kind, .. } if kind == "malformed_request"));
        let response: Response = serde_json::from_str(&handle_message(&manager, r#""GetPhase""#)).unwrap();
        assert!(matches!(response, Response::Error { ref kind, .. } if kind == "not_started"));
    }
}
