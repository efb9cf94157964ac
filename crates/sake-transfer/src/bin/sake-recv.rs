//! Responder binary: prompts for a listening port and a shared password,
//! accepts one connection, and writes the received file with a
//! `received_` prefix in the current directory, overwriting any existing
//! file of that name (spec.md §6).

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
        Ok(name) => {
            println!("received {name}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("transfer failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<String> {
    let port = cli::prompt_port("Listen port")?;
    let mut password = cli::prompt_password("Password")?;

    let config = SessionConfig::default();
    let stream = transport::listen_once(port, &config)?;

    let mut session = Session::accept_as_responder(stream, &mut password, config)
        .map_err(|e| anyhow::anyhow!("handshake failed: {e} (wrong password, or an active machine-in-the-middle)"))?;

    let filename = session.receive_filename()?;
    // The filename field is attacker-controlled; take only its final path
    // component so a sender cannot point it outside the current directory.
    let base_name = std::path::Path::new(&filename)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("sender sent an unusable filename"))?;
    let out_name = format!("received_{base_name}");
    let file = File::create(&out_name)?;
    session.receive_body(file)?;

    Ok(out_name)
}
