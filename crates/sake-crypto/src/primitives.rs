//! Primitives layer: AEAD, hashing, password KDF, randomness, constant-time
//! equality, and secure wipe.
//!
//! Grounded on `zrc-crypto::session_crypto` (AEAD wrapping),
//! `zrc-crypto::hash` (tagged hashing), and `zrc-crypto::utils`
//! (constant-time comparison), generalized from SHA-256/ChaCha20Poly1305 to
//! BLAKE2b/XChaCha20-Poly1305 and Argon2i per the SAKE wire format.

use argon2::{Algorithm, Argon2, Params, Version};
use blake2::digest::{Update, VariableOutput};
use blake2::Blake2bVar;
use chacha20poly1305::aead::{Aead, Payload};
use chacha20poly1305::{KeyInit, XChaCha20Poly1305, XNonce};
use constant_time_eq::constant_time_eq;
use zeroize::Zeroize;

use crate::error::CryptoError;

/// Argon2i parameters fixed by the SAKE wire format: 64 MiB memory, 3
/// iterations, 1 lane, 32-byte output.
const ARGON2_MEMORY_KIB: u32 = 65_536;
const ARGON2_ITERATIONS: u32 = 3;
const ARGON2_LANES: u32 = 1;
const ARGON2_OUTPUT_LEN: usize = 32;

/// Seal `plaintext` under `key`/`nonce` with empty associated data.
///
/// Returns `(ciphertext, tag)` where `ciphertext.len() == plaintext.len()`
/// and `tag.len() == 16`, matching the SAKE record layer's separate wire
/// fields.
pub fn aead_seal(key: &[u8; 32], nonce: &[u8; 24], plaintext: &[u8]) -> Result<(Vec<u8>, [u8; 16]), CryptoError> {
    let cipher = XChaCha20Poly1305::new(key.into());
    let mut sealed = cipher
        .encrypt(XNonce::from_slice(nonce), Payload { msg: plaintext, aad: b"" })
        .map_err(|_| CryptoError::EncryptionFailed)?;

    let tag_start = sealed.len() - 16;
    let ciphertext = sealed[..tag_start].to_vec();
    let mut tag = [0u8; 16];
    tag.copy_from_slice(&sealed[tag_start..]);
    sealed.zeroize();
    Ok((ciphertext, tag))
}

/// Open a record sealed by [`aead_seal`]. Returns `AuthenticationFailed`
/// without distinguishing *why* the tag didn't verify.
pub fn aead_open(
    key: &[u8; 32],
    nonce: &[u8; 24],
    ciphertext: &[u8],
    tag: &[u8; 16],
) -> Result<Vec<u8>, CryptoError> {
    let mut combined = Vec::with_capacity(ciphertext.len() + 16);
    combined.extend_from_slice(ciphertext);
    combined.extend_from_slice(tag);

    let cipher = XChaCha20Poly1305::new(key.into());
    let result = cipher
        .decrypt(XNonce::from_slice(nonce), Payload { msg: &combined, aad: b"" })
        .map_err(|_| CryptoError::AuthenticationFailed);
    combined.zeroize();
    result
}

/// Incremental BLAKE2b hash over any number of parts, truncated/keyed to
/// `outlen` bytes (16 or 32 per the SAKE wire format).
pub fn hash(outlen: usize, parts: &[&[u8]]) -> Vec<u8> {
    let mut hasher = Blake2bVar::new(outlen).expect("outlen must be 1..=64 for BLAKE2b");
    for part in parts {
        hasher.update(part);
    }
    let mut out = vec![0u8; outlen];
    hasher
        .finalize_variable(&mut out)
        .expect("output buffer matches requested length");
    out
}

/// `hash` specialized to a fixed-size 32-byte output, the common case for
/// master/auth/session key derivation.
pub fn hash32(parts: &[&[u8]]) -> [u8; 32] {
    let v = hash(32, parts);
    let mut out = [0u8; 32];
    out.copy_from_slice(&v);
    out
}

/// `hash` specialized to a fixed-size 16-byte output (challenge/response
/// sizes aside, used for validation codes).
pub fn hash16(parts: &[&[u8]]) -> [u8; 16] {
    let v = hash(16, parts);
    let mut out = [0u8; 16];
    out.copy_from_slice(&v);
    out
}

/// Derive a 32-byte key from a password and 16-byte salt via Argon2i with
/// the fixed parameters above. The caller is responsible for wiping
/// `password` after this call returns (see `chain::derive_master`).
pub fn kdf_password(password: &[u8], salt: &[u8; 16]) -> Result<[u8; 32], CryptoError> {
    let params = Params::new(ARGON2_MEMORY_KIB, ARGON2_ITERATIONS, ARGON2_LANES, Some(ARGON2_OUTPUT_LEN))
        .map_err(|_| CryptoError::KdfAllocation)?;
    let argon2 = Argon2::new(Algorithm::Argon2i, Version::V0x13, params);

    let mut out = [0u8; 32];
    argon2
        .hash_password_into(password, salt, &mut out)
        .map_err(|_| CryptoError::KdfAllocation)?;
    Ok(out)
}

/// Fill `buf` with CSPRNG output.
pub fn rand_fill(buf: &mut [u8]) -> Result<(), CryptoError> {
    getrandom::getrandom(buf).map_err(|_| CryptoError::RngFailure)
}

/// Constant-time equality; never short-circuits on the first mismatching
/// byte, and returns `false` (not a panic) on length mismatch.
pub fn ct_equal(a: &[u8], b: &[u8]) -> bool {
    constant_time_eq(a, b)
}

/// Best-effort volatile overwrite. `Zeroize` is used throughout this crate
/// (not raw loops) so the compiler cannot prove the write is dead and elide
/// it, matching `zrc-crypto::identity`'s `#[derive(Zeroize, ZeroizeOnDrop)]`
/// pattern.
pub fn wipe(buf: &mut [u8]) {
    buf.zeroize();
}
