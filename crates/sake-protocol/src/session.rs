//! Ties the handshake, record layer, and rekey coordinator together into one
//! owned value per connection.
//!
//! Grounded on spec.md §9's design note ("encapsulate [the KeyChain and
//! transient key buffers] in a session value owned by the main loop ...
//! this eliminates hidden coupling and makes wipe-on-drop trivially
//! correct"), and on `zrc_core::session::SessionHostState` for the shape of
//! a connection-scoped value holding both the crypto state and an I/O
//! handle. `Session` is generic over `Read + Write` rather than pinned to
//! `TcpStream` so the handshake/record/rekey tests in this crate can run
//! over in-memory channel pairs; `sake-transfer` is what actually plugs in
//! a `TcpStream` with `set_read_timeout`/`set_write_timeout` configured
//! from `SessionConfig` (see that crate's `transport` module) — this type
//! itself performs no timeout bookkeeping since it has no portable way to
//! ask an arbitrary `Read + Write` for one.

use std::io::{Read, Write};

use sake_crypto::{wipe, KeyChain, Role};
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::error::ProtocolError;
use crate::handshake::{run_initiator, run_responder};
use crate::record::{
    receive_filename as read_filename_frame, receive_frame, send_eof_and_await_tack, send_filename, send_payload,
    send_tack, Frame,
};
use crate::rekey;
use crate::stats::TransferStats;

/// Fill `buf` completely from `reader`, short only at true EOF. A sender
/// chunk under the configured size would otherwise seal a short, predictable
/// final record size on every `read()` that returns less than requested
/// even though more data is available (pipes and sockets do this routinely).
fn fill_buffer(reader: &mut impl Read, buf: &mut [u8]) -> Result<usize, ProtocolError> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

pub struct Session<S> {
    stream: S,
    chain: KeyChain,
    session_key: [u8; 32],
    config: SessionConfig,
    stats: TransferStats,
    records_since_rekey: u64,
}

impl<S> Drop for Session<S> {
    /// `chain` wipes itself via `KeyChain`'s `ZeroizeOnDrop`; `session_key`
    /// is a bare array so it needs its own wipe here. This runs on every
    /// exit path, not just the explicit `abort()` call below, so an early
    /// return through `?` after a handshake or mid-transfer error still
    /// satisfies spec.md §7's wipe-on-abort requirement.
    fn drop(&mut self) {
        wipe(&mut self.session_key);
    }
}

impl<S: Read + Write> Session<S> {
    /// Run the handshake as the initiator side and return an established
    /// session ready for [`Session::send_file`].
    pub fn connect_as_initiator(mut stream: S, password: &mut [u8], config: SessionConfig) -> Result<Self, ProtocolError> {
        let outcome = run_initiator(&mut stream, password, &config)?;
        info!(role = "initiator", epoch = outcome.chain.epoch, "session established");
        Ok(Session {
            stream,
            chain: outcome.chain,
            session_key: outcome.session_key,
            config,
            stats: TransferStats::new(),
            records_since_rekey: 0,
        })
    }

    /// Run the handshake as the responder side and return an established
    /// session ready for [`Session::receive_file`].
    pub fn accept_as_responder(mut stream: S, password: &mut [u8], config: SessionConfig) -> Result<Self, ProtocolError> {
        let outcome = run_responder(&mut stream, password, &config)?;
        info!(role = "responder", epoch = outcome.chain.epoch, "session established");
        Ok(Session {
            stream,
            chain: outcome.chain,
            session_key: outcome.session_key,
            config,
            stats: TransferStats::new(),
            records_since_rekey: 0,
        })
    }

    pub fn stats(&self) -> TransferStats {
        self.stats
    }

    /// Initiator side: send the filename preamble, then stream `reader` in
    /// `config.chunk_size` chunks, triggering a rekey every
    /// `config.rekey_interval` payload records, finishing with EOF and the
    /// `TACK` handshake.
    pub fn send_file(&mut self, filename: &str, mut reader: impl Read) -> Result<(), ProtocolError> {
        debug_assert_eq!(self.chain.role, Role::Initiator);
        send_filename(&mut self.stream, filename)?;

        let mut buf = vec![0u8; self.config.chunk_size];
        loop {
            let n = fill_buffer(&mut reader, &mut buf)?;
            if n == 0 {
                break;
            }
            send_payload(&mut self.stream, &self.session_key, &buf[..n], &mut self.stats)?;
            self.records_since_rekey += 1;

            if self.records_since_rekey >= self.config.rekey_interval {
                self.trigger_rekey()?;
            }
        }

        send_eof_and_await_tack(&mut self.stream, &self.config)?;
        info!(bytes_sent = self.stats.bytes_sent, rekeys = self.stats.rekeys_performed, "transfer complete");
        Ok(())
    }

    fn trigger_rekey(&mut self) -> Result<(), ProtocolError> {
        crate::wire::write_u32_be(&mut self.stream, rekey::REKEY_BEGIN_MARKER)?;
        let new_key = rekey::initiate(&mut self.stream, &self.chain.master, &mut self.stats)?;
        wipe(&mut self.session_key);
        self.session_key = new_key;
        self.records_since_rekey = 0;
        debug!("rekey applied, counter reset");
        Ok(())
    }

    /// Responder side: read the filename preamble sent by the initiator.
    /// Split out from [`Session::receive_body`] so the caller can open the
    /// destination file (conventionally `received_<name>`) only once the
    /// name is known, rather than requiring a writer up front.
    pub fn receive_filename(&mut self) -> Result<String, ProtocolError> {
        debug_assert_eq!(self.chain.role, Role::Responder);
        read_filename_frame(&mut self.stream)
    }

    /// Responder side: loop receiving frames until EOF, writing payload
    /// plaintext to `writer` and servicing rekey cycles transparently.
    /// Call [`Session::receive_filename`] first.
    pub fn receive_body(&mut self, mut writer: impl Write) -> Result<(), ProtocolError> {
        loop {
            match receive_frame(&mut self.stream, &self.session_key, &mut self.stats)? {
                Frame::Payload(plaintext) => {
                    writer.write_all(&plaintext)?;
                }
                Frame::Eof => {
                    send_tack(&mut self.stream, &self.config)?;
                    break;
                }
                Frame::RekeyBegin => {
                    let new_key = rekey::respond(&mut self.stream, &self.chain.master, &mut self.stats)?;
                    wipe(&mut self.session_key);
                    self.session_key = new_key;
                    debug!("rekey applied");
                }
                Frame::RekeyAck | Frame::RekeyReady | Frame::RekeyValidate => {
                    return Err(ProtocolError::UnexpectedMarker { expected: 0, actual: 0 });
                }
            }
        }

        info!(bytes_received = self.stats.bytes_received, rekeys = self.stats.rekeys_performed, "transfer complete");
        Ok(())
    }

    /// Consume and drop the session, wiping all live key material via
    /// `Drop`. An explicit name for the same effect a dropped `Session`
    /// already has, for call sites where stating intent reads better than
    /// an implicit scope exit (spec.md §7).
    pub fn abort(self) {}
}
