use clap::{Parser, Subcommand};
use nexum_apdu_core::ExchangeOptions;
use nexum_apdu_transport_pcsc::{PcscConfig, PcscDeviceManager};
use nexum_fido::AuthenticateMode;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod utils;

use commands::*;
use utils::{ParameterArgs, reader};

#[derive(Parser)]
#[command(version, about = "FIDO U2F over NFC: register and authenticate with a PC/SC reader")]
struct Cli {
    /// Optional reader name to use (will auto-detect if not specified)
    #[arg(short, long)]
    reader: Option<String>,

    /// Debug level output
    #[arg(short, long)]
    verbose: bool,

    /// Log every APDU sent and received
    #[arg(long)]
    apdu: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available readers
    List,

    /// Select the U2F applet and show its version
    Info,

    /// Register a new credential
    Reg {
        #[command(flatten)]
        params: ParameterArgs,
    },

    /// Authenticate with a key handle from an earlier registration
    Auth {
        /// Key handle in hex
        #[arg(required = true)]
        key_handle: String,

        /// Authentication mode
        #[arg(long, value_enum, default_value_t = AuthenticateMode::EnforceUserPresence)]
        mode: AuthenticateMode,

        #[command(flatten)]
        params: ParameterArgs,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose || cli.apdu);

    // Create a PC/SC device manager
    let manager = PcscDeviceManager::new()?;

    if let Commands::List = cli.command {
        reader::list_readers(&manager)?;
        return Ok(());
    }

    // For all other commands, find appropriate reader
    let reader = match &cli.reader {
        Some(reader_name) => reader::find_reader_by_name(&manager, reader_name)?,
        None => reader::find_reader_with_card(&manager)?,
    };

    info!("Using reader: {}", reader.name());

    // The card is connected when the field is activated for selection
    let config = PcscConfig::default().with_connect_on_open(false);
    let transport = manager.open_reader_with_config(reader.name(), config)?;
    let options = ExchangeOptions::new().with_log_apdu(cli.apdu);

    match &cli.command {
        Commands::List => unreachable!(), // Already handled above
        Commands::Info => info_command(transport, options)?,
        Commands::Reg { params } => reg_command(transport, options, params)?,
        Commands::Auth {
            key_handle,
            mode,
            params,
        } => auth_command(transport, options, key_handle, *mode, params)?,
    }

    Ok(())
}

fn setup_logging(verbose: bool) {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, &directives))
        .with_ansi(true)
        .init();
}

/// Filter with `RUST_LOG`-style `directives` layered over the verbosity default
fn log_filter(verbose: bool, directives: &str) -> EnvFilter {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy(directives)
}
