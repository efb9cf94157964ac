//! The authenticated handshake: salt transfer, nonce/challenge/response,
//! verdict, and first session-key derivation.
//!
//! Wire order and byte contents are driven straight through in one function
//! per role — no event loop or state enum drives transitions, because
//! spec.md §5 makes the ordering strictly sequential with no branching
//! except into `Aborted`; a direct sequence of blocking calls *is* that
//! state machine. [`HandshakeState`] exists only to name the current step
//! in logs and error messages, the way `zrc_core::session::SessionHostState`
//! names steps of a pairing flow it drives with an explicit `match`, minus
//! the `match` because this protocol has no alternate edges to dispatch on.
//!
//! Grounded on `examples/original_source/siete.c`
//! (`send_ready_signal`/`receive_salt`/`send_key_acknowledgment`) for the
//! literal wire bytes, and `examples/original_source/sake.c`
//! (`generate_challenge`/`compute_response`/`verify_response`) for the hash
//! construction.

use std::io::{Read, Write};

use sake_crypto::{chain_advance, chain_init, ct_equal, derive_master, derive_session, hash32, rand_fill, KeyChain, Role};
use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::error::ProtocolError;
use crate::wire::{read_exact, read_literal, write_all, write_literal};

const READY: &[u8] = b"READY";
const KEYOK: &[u8] = b"KEYOK";
const VERDICT_SUCCESS: u8 = 0x01;
const VERDICT_FAILURE: u8 = 0x00;

/// Named steps of the handshake, used only for logging (see module docs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    Hello,
    SaltExchange,
    NonceChallenge,
    Response,
    Verdict,
    Establish,
    Established,
    Aborted,
}

/// Everything a completed handshake hands off to the record layer.
pub struct HandshakeOutcome {
    pub chain: KeyChain,
    pub session_key: [u8; 32],
    pub client_nonce: [u8; 16],
    pub server_nonce: [u8; 16],
}

/// Run the handshake as the initiator (sender) side.
///
/// `password` is zeroized by [`sake_crypto::derive_master`] before this
/// function returns on any path.
pub fn run_initiator(
    stream: &mut (impl Read + Write),
    password: &mut [u8],
    _config: &SessionConfig,
) -> Result<HandshakeOutcome, ProtocolError> {
    debug!(state = ?HandshakeState::Hello, "waiting for responder ready signal");
    read_literal(stream, READY)?;

    debug!(state = ?HandshakeState::SaltExchange, "sending salt");
    let mut salt = [0u8; 16];
    rand_fill(&mut salt)?;
    write_all(stream, &salt)?;
    let master = derive_master(password, &salt)?;
    let mut chain = chain_init(master, Role::Initiator);
    read_literal(stream, KEYOK)?;

    debug!(state = ?HandshakeState::NonceChallenge, "exchanging nonces");
    let mut client_nonce = [0u8; 16];
    rand_fill(&mut client_nonce)?;
    write_all(stream, &client_nonce)?;

    let mut server_nonce = [0u8; 16];
    read_exact(stream, &mut server_nonce)?;
    let mut challenge = [0u8; 32];
    read_exact(stream, &mut challenge)?;

    debug!(state = ?HandshakeState::Response, "sending response");
    let response = hash32(&[&chain.auth_curr, &challenge, &server_nonce]);
    write_all(stream, &response)?;

    debug!(state = ?HandshakeState::Verdict, "awaiting verdict");
    let mut verdict = [0u8; 1];
    read_exact(stream, &mut verdict)?;
    if verdict[0] != VERDICT_SUCCESS {
        warn!(state = ?HandshakeState::Aborted, "responder rejected the handshake (wrong password or active MITM)");
        return Err(ProtocolError::AuthenticationFailed);
    }

    debug!(state = ?HandshakeState::Establish, "deriving session key");
    let session_key = derive_session(&chain.master, &client_nonce, &server_nonce);
    chain_advance(&mut chain);
    debug!(state = ?HandshakeState::Established, epoch = chain.epoch, "handshake complete");

    Ok(HandshakeOutcome { chain, session_key, client_nonce, server_nonce })
}

/// Run the handshake as the responder (receiver) side.
///
/// `password` is zeroized by [`sake_crypto::derive_master`] before this
/// function returns on any path.
pub fn run_responder(
    stream: &mut (impl Read + Write),
    password: &mut [u8],
    _config: &SessionConfig,
) -> Result<HandshakeOutcome, ProtocolError> {
    debug!(state = ?HandshakeState::Hello, "sending ready signal");
    write_literal(stream, READY)?;

    debug!(state = ?HandshakeState::SaltExchange, "awaiting salt");
    let mut salt = [0u8; 16];
    read_exact(stream, &mut salt)?;
    let master = derive_master(password, &salt)?;
    let mut chain = chain_init(master, Role::Responder);
    write_literal(stream, KEYOK)?;

    debug!(state = ?HandshakeState::NonceChallenge, "exchanging nonces");
    let mut client_nonce = [0u8; 16];
    read_exact(stream, &mut client_nonce)?;

    let mut server_nonce = [0u8; 16];
    rand_fill(&mut server_nonce)?;
    let challenge = hash32(&[&chain.auth_curr, &client_nonce, &server_nonce]);
    write_all(stream, &server_nonce)?;
    write_all(stream, &challenge)?;

    debug!(state = ?HandshakeState::Response, "awaiting response");
    let mut response = [0u8; 32];
    read_exact(stream, &mut response)?;

    debug!(state = ?HandshakeState::Verdict, "verifying response");
    let expected = hash32(&[&chain.auth_curr, &challenge, &server_nonce]);
    if !ct_equal(&expected, &response) {
        write_all(stream, &[VERDICT_FAILURE])?;
        warn!(state = ?HandshakeState::Aborted, "response did not match (wrong password or active MITM)");
        return Err(ProtocolError::AuthenticationFailed);
    }
    write_all(stream, &[VERDICT_SUCCESS])?;

    debug!(state = ?HandshakeState::Establish, "deriving session key");
    let session_key = derive_session(&chain.master, &client_nonce, &server_nonce);
    chain_advance(&mut chain);
    debug!(state = ?HandshakeState::Established, epoch = chain.epoch, "handshake complete");

    Ok(HandshakeOutcome { chain, session_key, client_nonce, server_nonce })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// An in-memory duplex pair so both sides of the handshake can run
    /// against each other without a real socket.
    struct Duplex {
        read: Cursor<Vec<u8>>,
        write: Vec<u8>,
    }

    impl Read for Duplex {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.read.read(buf)
        }
    }

    impl Write for Duplex {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.write.write(buf)
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Run a full handshake between an in-process initiator and responder
    /// by shuttling bytes through two `Vec<u8>` pipes, since a real
    /// `TcpStream` pair would need a listener thread this test doesn't need.
    fn run_pair(init_password: &[u8], resp_password: &[u8]) -> (Result<HandshakeOutcome, ProtocolError>, Result<HandshakeOutcome, ProtocolError>) {
        use std::sync::mpsc::channel;
        use std::thread;

        let (to_responder_tx, to_responder_rx) = channel::<Vec<u8>>();
        let (to_initiator_tx, to_initiator_rx) = channel::<Vec<u8>>();

        struct ChannelStream {
            inbox: std::sync::mpsc::Receiver<Vec<u8>>,
            outbox: std::sync::mpsc::Sender<Vec<u8>>,
            pending: Vec<u8>,
        }

        impl Read for ChannelStream {
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

        impl Write for ChannelStream {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.outbox.send(buf.to_vec()).map_err(|_| std::io::ErrorKind::BrokenPipe)?;
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let init_password = init_password.to_vec();
        let resp_password = resp_password.to_vec();
        let config = SessionConfig::default();

        let initiator = thread::spawn(move || {
            let mut stream = ChannelStream { inbox: to_initiator_rx, outbox: to_responder_tx, pending: Vec::new() };
            let mut password = init_password;
            run_initiator(&mut stream, &mut password, &config)
        });

        let responder = thread::spawn(move || {
            let mut stream = ChannelStream { inbox: to_responder_rx, outbox: to_initiator_tx, pending: Vec::new() };
            let mut password = resp_password;
            run_responder(&mut stream, &mut password, &SessionConfig::default())
        });

        (initiator.join().unwrap(), responder.join().unwrap())
    }

    #[test]
    fn matching_password_completes_handshake_with_equal_session_keys() {
        let (init, resp) = run_pair(b"correct horse battery staple", b"correct horse battery staple");
        let init = init.unwrap();
        let resp = resp.unwrap();
        assert_eq!(init.session_key, resp.session_key);
        assert_eq!(init.chain.epoch, 1);
        assert_eq!(resp.chain.epoch, 1);
        assert_eq!(init.chain.auth_curr, resp.chain.auth_curr);
    }

    #[test]
    fn mismatched_password_fails_at_verdict() {
        let (init, resp) = run_pair(b"correct horse battery staple", b"wrong password");
        assert!(matches!(init.unwrap_err(), ProtocolError::AuthenticationFailed));
        assert!(matches!(resp.unwrap_err(), ProtocolError::AuthenticationFailed));
    }
}
