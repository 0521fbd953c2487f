// Sends one request to the voting_server and prints the reply.
//
// authority_client <url> <command> [argument]
//   start <setup.json>               start an election from an ElectionSetup file
//   upload-public-key <key.json>
//   advance | phase | public-key | private-key | candidates | parties | options | count | votes
//   vote <option id>                 encrypts the choice locally before sending it
//   upload-private-key <key.json>
//   tally [<key.json>]
//   results | reset

use std::env;
use std::error::Error;
use std::path::Path;
use env_logger::{Builder, Target};
use futures_util::{SinkExt, StreamExt};
use log::{error, info};
use log::LevelFilter::Info;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use private_tally::configs::server::{read_json, ElectionSetup};
use private_tally::crypto_schemes::paillier::{PaillierCipher, PrivateKey, PublicKey};
use private_tally::data::{Request, Response};
use private_tally::election::{VoteSubmission, VoteVectorCodec};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type ClientResult<T> = Result<T, Box<dyn Error>>;

#[tokio::main]
async fn main() {
    let mut builder = Builder::new();
    builder.filter_level(Info);
    builder.parse_default_env();
    builder.target(Target::Stdout);
    builder.init();

    let voting_app_url = env::args().nth(1).unwrap_or_else(|| "ws://127.0.0.1:8002".to_string());
    let command = env::args().nth(2).unwrap_or_else(|| "phase".to_string());
    let argument = env::args().nth(3);

    if let Err(e) = run(&voting_app_url, &command, argument.as_deref()).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(url: &str, command: &str, argument: Option<&str>) -> ClientResult<()> {
    let (mut socket, _) = connect_async(url).await?;
    info!("WebSocket handshake has been successfully completed");

    let response = match command {
        "vote" => cast_encrypted_vote(&mut socket, required(argument)?.parse()?).await?,
        _ => {
            let request = build_request(command, argument)?;
            exchange(&mut socket, &request).await?
        }
    };
    println!("{}", serde_json::to_string_pretty(&response)?);
    let _ = socket.close(None).await;
    if let Response::Error { kind, message } = response {
        return Err(format!("{}: {}", kind, message).into());
    }
    Ok(())
}

fn build_request(command: &str, argument: Option<&str>) -> ClientResult<Request> {
    let request = match command {
        "start" => {
            let setup: ElectionSetup = read_json(Path::new(required(argument)?))?;
            let public_key = setup.load_public_key()?;
            Request::StartElection {
                candidates: Some(setup.candidates),
                parties: Some(setup.parties),
                public_key,
            }
        }
        "upload-public-key" => Request::UploadPublicKey(read_json::<PublicKey>(Path::new(required(argument)?))?),
        "advance" => Request::AdvancePhase,
        "phase" => Request::GetPhase,
        "public-key" => Request::GetPublicKey,
        "private-key" => Request::GetPrivateKey,
        "candidates" => Request::GetCandidates,
        "parties" => Request::GetParties,
        "options" => Request::GetOptions,
        "count" => Request::GetVoteCount,
        "votes" => Request::GetEncryptedVotes,
        "upload-private-key" => Request::UploadPrivateKey(read_json::<PrivateKey>(Path::new(required(argument)?))?),
        "tally" => Request::Tally {
            private_key: argument.map(|path| read_json::<PrivateKey>(Path::new(path))).transpose()?,
        },
        "results" => Request::GetResults,
        "reset" => Request::Reset,
        other => return Err(format!("unknown command: {}", other).into()),
    };
    Ok(request)
}

fn required(argument: Option<&str>) -> ClientResult<&str> {
    argument.ok_or_else(|| "this command needs an argument".into())
}

// The server only ever sees ciphertexts for this ballot.
async fn cast_encrypted_vote(socket: &mut Socket, choice: usize) -> ClientResult<Response> {
    let public_key = match exchange(socket, &Request::GetPublicKey).await? {
        Response::PublicKey(public_key) => public_key,
        other => return Ok(other),
    };
    let length = match exchange(socket, &Request::GetOptions).await? {
        Response::Options(options) => options.len(),
        other => return Ok(other),
    };
    let vote = VoteVectorCodec::encrypt_choice(&mut PaillierCipher::new(), &public_key, length, choice)?;
    info!("Encrypted vote for option {} of {}.", choice, length);
    exchange(socket, &Request::CastVote(VoteSubmission::Encrypted(vote))).await
}

async fn exchange(socket: &mut Socket, request: &Request) -> ClientResult<Response> {
    socket.send(Message::from(serde_json::to_string(request)?)).await?;
    while let Some(message) = socket.next().await {
        let message = message?;
        if message.is_text() || message.is_binary() {
            return Ok(serde_json::from_str(message.to_text()?)?);
        }
    }
    Err("connection closed before a reply arrived".into())
}
