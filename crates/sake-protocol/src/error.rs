use std::io;

use sake_crypto::CryptoError;
use thiserror::Error;

/// Errors surfaced by the handshake, record, and rekey state machines.
///
/// Grounded on `zrc_core::errors`'s layered error enums, collapsed into one
/// type per spec.md §7's error kinds (Protocol, Authentication, Transport)
/// rather than one enum per layer, since every variant here is already fatal
/// to the session and there is no cross-layer routing decision that would
/// benefit from keeping them apart. The Resource kind (KDF allocation
/// failure) is not a separate variant: it arrives as `CryptoError::KdfAllocation`
/// through the `Crypto` variant below, since `sake-crypto` is where that
/// failure actually originates.
#[derive(Debug, Error)]
pub enum ProtocolError {
    // --- Protocol kind ---
    #[error("expected marker {expected:#010x}, got {actual:#010x}")]
    UnexpectedMarker { expected: u32, actual: u32 },

    #[error("record length {0} is outside the accepted range")]
    UnexpectedLength(u32),

    #[error("filename was not null-terminated within {0} bytes")]
    MalformedFilename(usize),

    #[error("expected literal {expected:?}, got {actual:?}")]
    UnexpectedLiteral { expected: &'static [u8], actual: Vec<u8> },

    // --- Authentication kind ---
    #[error("handshake response did not match the expected value")]
    AuthenticationFailed,

    #[error("rekey validation code did not match")]
    ValidationMismatch,

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    // --- Transport kind ---
    #[error("i/o error: {0}")]
    Io(io::Error),

    #[error("timed out waiting for the peer")]
    Timeout,

    #[error("connection closed by peer")]
    ConnectionClosed,
}

impl From<io::Error> for ProtocolError {
    /// `io::ErrorKind::TimedOut`/`UnexpectedEof` get their own variants so
    /// callers can tell a dropped connection from a slow one; everything
    /// else falls back to the opaque `Io` wrapper.
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => ProtocolError::Timeout,
            io::ErrorKind::UnexpectedEof | io::ErrorKind::ConnectionReset | io::ErrorKind::BrokenPipe => {
                ProtocolError::ConnectionClosed
            }
            _ => ProtocolError::Io(e),
        }
    }
}

impl ProtocolError {
    /// Collapse an error down to the language spec.md §7 asks for when
    /// reporting authentication failure to a user: the check for "wrong
    /// password" and "active MITM" is the same comparison, so the two causes
    /// are indistinguishable by design and must be reported as one message.
    pub fn is_authentication_kind(&self) -> bool {
        matches!(self, ProtocolError::AuthenticationFailed | ProtocolError::ValidationMismatch)
    }
}
