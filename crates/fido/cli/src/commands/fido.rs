//! U2F subcommands

use colored::Colorize;
use nexum_apdu_core::{CardExecutor, ExchangeOptions, ResponseBuffer};
use nexum_apdu_transport_pcsc::PcscTransport;
use nexum_fido::constants::DEFAULT_RESPONSE_CAPACITY;
use nexum_fido::{AuthenticateCommand, AuthenticateMode, AuthenticationOutcome, Fido};
use std::error::Error;
use tracing::{debug, info};

use crate::utils::ParameterArgs;

fn open(transport: PcscTransport, options: ExchangeOptions) -> Fido<PcscTransport> {
    Fido::new(CardExecutor::with_options(transport, options))
}

/// Select the U2F applet and print its version
pub fn info_command(
    transport: PcscTransport,
    options: ExchangeOptions,
) -> Result<(), Box<dyn Error>> {
    let mut fido = open(transport, options);
    let version = fido.version()?;

    if version.is_u2f_v2() {
        println!("{} {}", "U2F applet found:".green(), version);
    } else {
        println!("{} {}", "Unexpected U2F version:".yellow(), version);
    }

    Ok(())
}

/// Register a new credential and print the parsed response
pub fn reg_command(
    transport: PcscTransport,
    options: ExchangeOptions,
    params: &ParameterArgs,
) -> Result<(), Box<dyn Error>> {
    let challenge = params.challenge()?;
    let application = params.application()?;
    debug!(
        challenge = %hex::encode(challenge),
        application = %hex::encode(application),
        "Registration parameters"
    );

    let mut fido = open(transport, options);
    let mut storage = vec![0u8; DEFAULT_RESPONSE_CAPACITY];
    let mut buffer = ResponseBuffer::new(&mut storage);

    info!("Touch the authenticator to register");
    let response = fido.enroll(&challenge, &application, &mut buffer)?;

    println!("{}", "Registration successful".green());
    println!("{response}");
    if !response.is_uncompressed_point() {
        println!("{}", "Warning: public key is not an uncompressed point".yellow());
    }

    Ok(())
}

/// Authenticate with an existing key handle and print the result
pub fn auth_command(
    transport: PcscTransport,
    options: ExchangeOptions,
    key_handle: &str,
    mode: AuthenticateMode,
    params: &ParameterArgs,
) -> Result<(), Box<dyn Error>> {
    let key_handle = hex::decode(key_handle)?;
    let challenge = params.challenge()?;
    let application = params.application()?;
    let command = AuthenticateCommand::new(mode, &challenge, &application, &key_handle)?;

    let mut fido = open(transport, options);
    let mut storage = vec![0u8; DEFAULT_RESPONSE_CAPACITY];
    let mut buffer = ResponseBuffer::new(&mut storage);

    match fido.sign(&command, &mut buffer)? {
        AuthenticationOutcome::KeyHandleValid => {
            println!("{}", "Key handle valid".green());
        }
        AuthenticationOutcome::Signed(response) => {
            println!("{}", "Authentication successful".green());
            println!("{response}");
        }
    }

    Ok(())
}
