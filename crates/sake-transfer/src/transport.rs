//! Blocking `TcpStream` wiring with the socket timeouts `SessionConfig`
//! specifies. This is the one place a real socket appears; everything in
//! `sake-protocol` is generic over `Read + Write` (see that crate's
//! `session` module docs for why).

use std::net::{TcpListener, TcpStream};

use anyhow::Context;
use sake_protocol::SessionConfig;
use tracing::info;

/// Connect to `host:port` as the initiator, with read/write timeouts from
/// `config.socket_timeout`.
///
/// `config.filename_timeout` and `config.handshake_timeout` are not applied
/// as separate per-phase socket timeouts here: swapping the read timeout
/// mid-connection is exactly the kind of TCP platform plumbing spec.md §1
/// places out of scope, so this thin wrapper applies one timeout for the
/// life of the connection.
pub fn connect(host: &str, port: u16, config: &SessionConfig) -> anyhow::Result<TcpStream> {
    let stream = TcpStream::connect((host, port)).with_context(|| format!("connecting to {host}:{port}"))?;
    stream.set_read_timeout(Some(config.socket_timeout))?;
    stream.set_write_timeout(Some(config.socket_timeout))?;
    stream.set_nodelay(true)?;
    info!(host, port, "connected");
    Ok(stream)
}

/// Bind `port` and accept exactly one connection, applying the same
/// timeouts as [`connect`] to the accepted stream.
pub fn listen_once(port: u16, config: &SessionConfig) -> anyhow::Result<TcpStream> {
    let listener = TcpListener::bind(("0.0.0.0", port)).with_context(|| format!("binding port {port}"))?;
    info!(port, "listening");
    let (stream, peer) = listener.accept().context("accepting connection")?;
    stream.set_read_timeout(Some(config.socket_timeout))?;
    stream.set_write_timeout(Some(config.socket_timeout))?;
    stream.set_nodelay(true)?;
    info!(%peer, "accepted connection");
    Ok(stream)
}
