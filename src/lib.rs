//! # nodekey
//!
//! Node identity keys for peer-to-peer networks.
//!
//! ## Architecture
//!
//! - `entropy`: Secure randomness or the versioned deterministic expansion
//! - `devp2p`: secp256k1 node keys with signed node records (ENR)
//! - `libp2p`: Ed25519, secp256k1, ECDSA and RSA keys with peer identifiers
//! - `config`: Command-line configuration for the `nodekey` binary
//!
//! ```no_run
//! use nodekey::{generate_libp2p_identity, EntropyRequest, Family};
//!
//! let material = generate_libp2p_identity(Family::Ed25519, &EntropyRequest::secure())?;
//! println!("{}", material.public_key());
//! # Ok::<(), nodekey::NodeKeyError>(())
//! ```

pub mod config;
pub mod devp2p;
pub mod entropy;
pub mod error;
pub mod libp2p;
pub mod material;

pub use config::Config;
pub use devp2p::{generate_devp2p_identity, generate_devp2p_identity_with, Endpoint, Enr};
pub use entropy::{EntropyMode, EntropyRequest};
pub use error::NodeKeyError;
pub use libp2p::{generate_libp2p_identity, peer_id_from_full_private_key, Family};
pub use material::KeyMaterial;
