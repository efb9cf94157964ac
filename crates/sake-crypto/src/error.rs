use thiserror::Error;

/// Errors raised by the primitives and key-schedule layers.
///
/// These never carry the secret material that caused them; callers that
/// need to report a cryptographic failure to a remote peer or a log should
/// use the variant name only (see `sake-protocol`'s wire-safe error
/// mapping).
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("AEAD authentication failed")]
    AuthenticationFailed,

    #[error("AEAD encryption failed")]
    EncryptionFailed,

    #[error("password KDF allocation failed (insufficient memory for Argon2 working set)")]
    KdfAllocation,

    #[error("random number generator failed")]
    RngFailure,
}
