//! Node key generator CLI
//!
//! Usage:
//!   nodekey                                  # Random devp2p key with ENR
//!   nodekey -p libp2p -t secp256k1           # Random libp2p secp256k1 key
//!   nodekey -p libp2p -t ecdsa --insecure-deterministic --seed 3

use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use nodekey::config::Protocol;
use nodekey::{generate_devp2p_identity_with, generate_libp2p_identity, Config};

fn main() {
    init_tracing();

    let config = Config::parse();

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    }

    let result = match config.protocol {
        Protocol::Devp2p => generate_devp2p_identity_with(config.endpoint()),
        Protocol::Libp2p => generate_libp2p_identity(config.key_type, &config.entropy_request()),
    };

    let material = match result {
        Ok(material) => material,
        Err(e) => {
            eprintln!("Key generation failed: {}", e);
            process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&material) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Could not serialize key material: {}", e);
            process::exit(1);
        }
    }
}

/// Logs go to stderr so stdout carries only the JSON result.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
