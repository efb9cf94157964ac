//! The in-band rekey coordinator: lock-step nonce re-exchange and mutual
//! validation of a new session key, without advancing the key chain's
//! epoch or dropping the connection.
//!
//! Grounded on the original's `KEY_ROTATION_READY` marker
//! (`examples/original_source/constants.h`), generalized into the full
//! mutual-validation sub-protocol spec.md §4.5 adds, and structured like
//! `zrc_core::dispatch`'s event-dispatch loop — one function per role, each
//! a short straight-line sequence of send/receive steps rather than a
//! generic dispatcher, since the rekey sub-protocol has exactly one message
//! shape per step.

use std::io::{Read, Write};

use sake_crypto::{ct_equal, derive_session, rand_fill, validation_code};
use tracing::{debug, warn};

use crate::error::ProtocolError;
use crate::record::{MARKER_REKEY_ACK, MARKER_REKEY_BEGIN, MARKER_REKEY_READY, MARKER_REKEY_VALIDATE};
use crate::stats::TransferStats;
use crate::wire::{read_exact, read_u32_be, write_all, write_u32_be};

fn expect_marker(stream: &mut impl Read, expected: u32) -> Result<(), ProtocolError> {
    let actual = read_u32_be(stream)?;
    if actual == expected {
        Ok(())
    } else {
        Err(ProtocolError::UnexpectedMarker { expected, actual })
    }
}

/// Drive a rekey cycle as the initiator, having already sent
/// `REKEY_BEGIN` as the record-layer frame that triggered this call.
///
/// Returns the new session key; the caller is responsible for wiping the
/// old one (see `Session::send_file`).
pub fn initiate(
    stream: &mut (impl Read + Write),
    chain_master: &[u8; 32],
    stats: &mut TransferStats,
) -> Result<[u8; 32], ProtocolError> {
    debug!("rekey: awaiting REKEY_ACK");
    expect_marker(stream, MARKER_REKEY_ACK)?;

    let mut new_client_nonce = [0u8; 16];
    rand_fill(&mut new_client_nonce)?;
    write_all(stream, &new_client_nonce)?;

    let mut new_server_nonce = [0u8; 16];
    read_exact(stream, &mut new_server_nonce)?;

    let new_session_key = derive_session(chain_master, &new_client_nonce, &new_server_nonce);

    write_u32_be(stream, MARKER_REKEY_VALIDATE)?;
    let code = validation_code(&new_session_key);
    write_all(stream, &code)?;

    debug!("rekey: awaiting REKEY_READY");
    expect_marker(stream, MARKER_REKEY_READY)?;

    stats.rekey_completed();
    debug!("rekey complete");
    Ok(new_session_key)
}

/// Drive a rekey cycle as the responder, having already classified the
/// incoming `REKEY_BEGIN` frame.
pub fn respond(
    stream: &mut (impl Read + Write),
    chain_master: &[u8; 32],
    stats: &mut TransferStats,
) -> Result<[u8; 32], ProtocolError> {
    write_u32_be(stream, MARKER_REKEY_ACK)?;

    let mut new_client_nonce = [0u8; 16];
    read_exact(stream, &mut new_client_nonce)?;

    let mut new_server_nonce = [0u8; 16];
    rand_fill(&mut new_server_nonce)?;
    write_all(stream, &new_server_nonce)?;

    expect_marker(stream, MARKER_REKEY_VALIDATE)?;
    let mut received_code = [0u8; 16];
    read_exact(stream, &mut received_code)?;

    let new_session_key = derive_session(chain_master, &new_client_nonce, &new_server_nonce);
    let expected_code = validation_code(&new_session_key);

    if !ct_equal(&expected_code, &received_code) {
        warn!("rekey: validation code mismatch, aborting session");
        return Err(ProtocolError::ValidationMismatch);
    }

    write_u32_be(stream, MARKER_REKEY_READY)?;
    stats.rekey_completed();
    debug!("rekey complete");
    Ok(new_session_key)
}

/// Marker the initiator writes to the record stream to trigger a rekey
/// cycle; exported so `Session` can use it alongside `record::send_eof`
/// without reaching into this module's private constants.
pub const REKEY_BEGIN_MARKER: u32 = MARKER_REKEY_BEGIN;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read as StdRead, Write as StdWrite};
    use std::sync::mpsc::{channel, Receiver, Sender};
    use std::thread;

    struct ChannelStream {
        inbox: Receiver<Vec<u8>>,
        outbox: Sender<Vec<u8>>,
        pending: Vec<u8>,
    }

    impl StdRead for ChannelStream {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            while self.pending.is_empty() {
                match self.inbox.recv() {
                    Ok(chunk) => self.pending = chunk,
                    Err(_) => return Ok(0),
                }
            }
            let n = buf.len().min(self.pending.len());
            buf[..n].copy_from_slice(&self.pending[..n]);
            self.pending.drain(..n);
            Ok(n)
        }
    }

    impl StdWrite for ChannelStream {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.outbox.send(buf.to_vec()).map_err(|_| std::io::ErrorKind::BrokenPipe)?;
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn rekey_converges_on_same_session_key() {
        let (a_tx, a_rx) = channel::<Vec<u8>>();
        let (b_tx, b_rx) = channel::<Vec<u8>>();
        let master = [0x21u8; 32];

        let initiator = thread::spawn(move || {
            let mut stream = ChannelStream { inbox: b_rx, outbox: a_tx, pending: Vec::new() };
            let mut stats = TransferStats::new();
            initiate(&mut stream, &master, &mut stats)
        });

        let responder = thread::spawn(move || {
            let mut stream = ChannelStream { inbox: a_rx, outbox: b_tx, pending: Vec::new() };
            let mut stats = TransferStats::new();
            respond(&mut stream, &master, &mut stats)
        });

        let init_result = initiator.join().unwrap();
        let resp_result = responder.join().unwrap();
        assert_eq!(init_result.unwrap(), resp_result.unwrap());
    }

    #[test]
    fn mismatched_master_fails_validation() {
        let (a_tx, a_rx) = channel::<Vec<u8>>();
        let (b_tx, b_rx) = channel::<Vec<u8>>();
        let master_a = [0x21u8; 32];
        let master_b = [0x22u8; 32];

        let initiator = thread::spawn(move || {
            let mut stream = ChannelStream { inbox: b_rx, outbox: a_tx, pending: Vec::new() };
            let mut stats = TransferStats::new();
            initiate(&mut stream, &master_a, &mut stats)
        });

        let responder = thread::spawn(move || {
            let mut stream = ChannelStream { inbox: a_rx, outbox: b_tx, pending: Vec::new() };
            let mut stats = TransferStats::new();
            respond(&mut stream, &master_b, &mut stats)
        });

        assert!(responder.join().unwrap().is_err());
        let _ = initiator.join().unwrap();
    }
}
