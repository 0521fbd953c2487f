// Creates the key files the authority needs:
// - paillier_public_key.json ---- (uploaded at election start, given to voters)
// - paillier_private_key.json --- (kept offline until the tallying phase)

use std::path::PathBuf;
use std::{env, fs};
use env_logger::{Builder, Target};
use log::{error, info};
use log::LevelFilter::Info;
use private_tally::configs::server::ServerConfig;
use private_tally::crypto_schemes::paillier::PaillierCipher;

fn main() {
    let mut builder = Builder::new();
    builder.filter_level(Info);
    builder.parse_default_env();
    builder.target(Target::Stdout);
    builder.init();

    let key_bits = match env::args().nth(1).map(|arg| arg.parse::<usize>()) {
        Some(Ok(bits)) => bits,
        Some(Err(e)) => {
            error!("Key size must be a number of bits: {}", e);
            std::process::exit(1);
        }
        None => ServerConfig::default().key_bits,
    };
    let out_dir = PathBuf::from(env::args().nth(2).unwrap_or_else(|| ".".to_string()));

    info!("Generating a {} bit Paillier key pair.", key_bits);
    let key_pair = PaillierCipher::new().generate(key_bits);

    let outputs = [
        ("paillier_public_key.json", serde_json::to_string_pretty(&key_pair.public_key)),
        ("paillier_private_key.json", serde_json::to_string_pretty(&key_pair.private_key)),
    ];
    for (file_name, serialized) in outputs {
        let path = out_dir.join(file_name);
        let written = serialized
            .map_err(|e| e.to_string())
            .and_then(|json| fs::write(&path, json).map_err(|e| e.to_string()));
        match written {
            Ok(()) => info!("Wrote {}", path.display()),
            Err(e) => {
                error!("Failed to write {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }
}
