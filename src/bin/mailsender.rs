//! Sends one preformatted message file through the configured relay
//!
//! Exits with 0 once the relay accepted the message, or with the status of the failure
//! category otherwise.

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use mailsender::{
    config::{RelayConfig, DEFAULT_CONFIG_FILE},
    Error, Sender,
};

/// Send a message file through a plain SMTP relay
#[derive(Parser, Debug)]
#[command(name = "mailsender")]
#[command(version, long_about = None)]
struct Cli {
    /// Message file, header block with `From:` and `To:` fields, blank line and body
    file: PathBuf,

    /// Relay settings file, as written by mailsender-config
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Print the SMTP dialogue
    #[arg(short, long)]
    verbose: bool,
}

fn run(cli: &Cli) -> Result<(), Error> {
    let config = RelayConfig::load(&cli.config)?;
    tracing::debug!(?config, "relay settings loaded from {}", cli.config.display());

    let sender = Sender::from_config(&config)?;
    let response = mailsender::send_file(&sender, &cli.file)?;
    tracing::info!("relay replied {}", response);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => {
            println!("{}: sent", cli.file.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            let category = err.category();
            eprintln!("{}: {:?} error: {}", cli.file.display(), category, err);
            ExitCode::from(category.exit_code())
        }
    }
}
