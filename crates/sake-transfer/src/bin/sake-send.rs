//! Initiator binary: prompts for the responder's address, port, a shared
//! password, and a file to send; reports success only once the responder's
//! `TACK` acknowledges receipt (spec.md §6).

use std::fs::File;
use std::process::ExitCode;

use sake_protocol::{Session, SessionConfig};
use sake_transfer::{cli, transport};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run() {
        Ok(()) => {
            println!("transfer acknowledged");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("transfer failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let host = cli::prompt("Server address", Some("127.0.0.1"))?;
    let port = cli::prompt_port("Server port")?;
    let mut password = cli::prompt_password("Password")?;
    let path = cli::prompt("File to send", None)?;

    let file = File::open(&path)?;
    let filename = std::path::Path::new(&path)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("'{path}' has no usable filename"))?
        .to_string();

    let config = SessionConfig::default();
    let stream = transport::connect(&host, port, &config)?;

    let mut session = Session::connect_as_initiator(stream, &mut password, config)
        .map_err(|e| anyhow::anyhow!("handshake failed: {e} (wrong password, or an active machine-in-the-middle)"))?;

    session.send_file(&filename, file)?;
    Ok(())
}
