//! Runtime configuration for the `nodekey` binary.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use clap::Parser;

use crate::devp2p::Endpoint;
use crate::entropy::EntropyRequest;
use crate::libp2p::Family;

/// Which network stack the identity is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    #[default]
    Devp2p,
    Libp2p,
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "devp2p" | "eth" => Ok(Protocol::Devp2p),
            "libp2p" => Ok(Protocol::Libp2p),
            _ => Err(format!("Unknown protocol: {}", s)),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Devp2p => write!(f, "devp2p"),
            Protocol::Libp2p => write!(f, "libp2p"),
        }
    }
}

/// Node key generator
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Protocol the key is for: devp2p or libp2p
    #[arg(short = 'p', long, default_value = "devp2p")]
    pub protocol: Protocol,

    /// libp2p key type: ed25519, secp256k1, ecdsa or rsa
    #[arg(short = 't', long, default_value = "ed25519")]
    pub key_type: Family,

    /// Derive the key from --seed instead of OS randomness (anyone who knows the seed knows the key)
    #[arg(long, default_value = "false")]
    pub insecure_deterministic: bool,

    /// Seed index for --insecure-deterministic (default: 0)
    #[arg(long)]
    pub seed: Option<u64>,

    /// IP address placed in the devp2p node record
    #[arg(long, default_value = "0.0.0.0")]
    pub ip: Ipv4Addr,

    /// TCP port placed in the devp2p node record
    #[arg(long, default_value = "30303")]
    pub tcp: u16,

    /// UDP port placed in the devp2p node record
    #[arg(long, default_value = "30303")]
    pub udp: u16,
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seed.is_some() && !self.insecure_deterministic {
            return Err(ConfigError::SeedWithoutDeterministic);
        }

        if self.insecure_deterministic && self.protocol == Protocol::Devp2p {
            return Err(ConfigError::DeterministicDevp2p);
        }

        Ok(())
    }

    /// Translates the flags into an explicit entropy policy.
    pub fn entropy_request(&self) -> EntropyRequest {
        if self.insecure_deterministic {
            EntropyRequest::insecure_deterministic(self.seed.unwrap_or(0))
        } else {
            EntropyRequest::secure()
        }
    }

    /// Endpoint advertised in the devp2p node record.
    pub fn endpoint(&self) -> Endpoint {
        Endpoint {
            ip: Some(self.ip),
            tcp: Some(self.tcp),
            udp: Some(self.udp),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("--seed requires --insecure-deterministic")]
    SeedWithoutDeterministic,
    #[error("devp2p keys are always random; --insecure-deterministic applies to libp2p only")]
    DeterministicDevp2p,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("nodekey").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);
        assert_eq!(config.protocol, Protocol::Devp2p);
        assert_eq!(config.key_type, Family::Ed25519);
        assert!(config.validate().is_ok());
        assert_eq!(config.entropy_request(), EntropyRequest::secure());
        assert_eq!(config.endpoint(), Endpoint::default());
    }

    #[test]
    fn test_deterministic_libp2p() {
        let config = parse(&[
            "-p",
            "libp2p",
            "-t",
            "ecdsa",
            "--insecure-deterministic",
            "--seed",
            "9",
        ]);
        assert!(config.validate().is_ok());
        assert_eq!(config.key_type, Family::Ecdsa);
        assert_eq!(
            config.entropy_request(),
            EntropyRequest::insecure_deterministic(9)
        );
    }

    #[test]
    fn test_seed_requires_flag() {
        let config = parse(&["-p", "libp2p", "--seed", "1"]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SeedWithoutDeterministic)
        ));
    }

    #[test]
    fn test_devp2p_rejects_deterministic() {
        let config = parse(&["--insecure-deterministic"]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DeterministicDevp2p)
        ));
    }

    #[test]
    fn test_unknown_key_type() {
        let args = ["nodekey", "-p", "libp2p", "-t", "dsa"];
        assert!(Config::try_parse_from(args).is_err());
    }
}
