//! Writes the relay settings file read by mailsender
//!
//! Authentication is not supported, the file always says `auth=0`.

use std::{path::PathBuf, process::ExitCode, time::Duration};

use clap::Parser;
use mailsender::config::{RelayConfig, DEFAULT_CONFIG_FILE, DEFAULT_HOST, NO_AUTH};

/// Write the relay settings used by mailsender
#[derive(Parser, Debug)]
#[command(name = "mailsender-config")]
#[command(version, long_about = None)]
struct Cli {
    /// Relay host name
    #[arg(default_value = DEFAULT_HOST)]
    host: String,

    /// Relay port
    #[arg(default_value_t = 25)]
    port: u16,

    /// Deadline in seconds for connecting and for each read or write, 0 to wait forever
    #[arg(short, long, default_value_t = 60)]
    timeout: u64,

    /// Settings file to write
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    output: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = RelayConfig {
        host: cli.host,
        port: cli.port,
        auth_method: NO_AUTH.to_owned(),
        timeout: (cli.timeout > 0).then(|| Duration::from_secs(cli.timeout)),
    };

    match config.save(&cli.output) {
        Ok(()) => {
            tracing::info!("wrote {}", cli.output.display());
            println!("{config}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}: {}", cli.output.display(), err);
            ExitCode::FAILURE
        }
    }
}
