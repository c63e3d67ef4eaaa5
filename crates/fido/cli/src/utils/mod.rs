//! Utility functions and types for the FIDO CLI

pub mod reader;

use clap::Args;
use nexum_fido::{ApplicationParameter, Challenge};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::error::Error;

/// Challenge and application parameters of a U2F request
#[derive(Args, Debug, Clone)]
pub struct ParameterArgs {
    /// Challenge parameter as 32 bytes of hex
    #[arg(long, group = "challenge_source")]
    pub challenge: Option<String>,

    /// Client data to hash into the challenge parameter
    #[arg(long, group = "challenge_source")]
    pub client_data: Option<String>,

    /// Application parameter as 32 bytes of hex
    #[arg(long, group = "application_source")]
    pub app_param: Option<String>,

    /// Application identity (e.g. an origin) to hash into the application parameter
    #[arg(long, group = "application_source")]
    pub app_id: Option<String>,
}

impl ParameterArgs {
    /// Challenge from hex, from hashed client data, or random
    pub fn challenge(&self) -> Result<Challenge, Box<dyn Error>> {
        match (&self.challenge, &self.client_data) {
            (Some(hex), _) => parse_parameter(hex),
            (None, Some(client_data)) => Ok(Sha256::digest(client_data.as_bytes()).into()),
            (None, None) => {
                let mut challenge = [0u8; 32];
                rand::rng().fill(&mut challenge);
                Ok(challenge)
            }
        }
    }

    /// Application parameter from hex, from a hashed app id, or all zeros
    pub fn application(&self) -> Result<ApplicationParameter, Box<dyn Error>> {
        match (&self.app_param, &self.app_id) {
            (Some(hex), _) => parse_parameter(hex),
            (None, Some(app_id)) => Ok(Sha256::digest(app_id.as_bytes()).into()),
            (None, None) => Ok([0u8; 32]),
        }
    }
}

/// Parse a 32-byte parameter from hex
pub fn parse_parameter(value: &str) -> Result<[u8; 32], Box<dyn Error>> {
    let bytes = hex::decode(value.trim())?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| format!("Expected 32 bytes of hex, got {len}").into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ParameterArgs {
        ParameterArgs {
            challenge: None,
            client_data: None,
            app_param: None,
            app_id: None,
        }
    }

    #[test]
    fn test_default_parameters() {
        let params = args();
        assert_eq!(params.application().unwrap(), [0u8; 32]);
        // Random challenges differ between calls
        assert_ne!(params.challenge().unwrap(), params.challenge().unwrap());
    }

    #[test]
    fn test_hashed_parameters() {
        let params = ParameterArgs {
            app_id: Some("abc".to_string()),
            ..args()
        };
        assert_eq!(
            hex::encode(params.application().unwrap()),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_explicit_parameters() {
        let params = ParameterArgs {
            challenge: Some("11".repeat(32)),
            ..args()
        };
        assert_eq!(params.challenge().unwrap(), [0x11; 32]);

        assert!(parse_parameter("1122").is_err());
        assert!(parse_parameter("zz").is_err());
    }
}
