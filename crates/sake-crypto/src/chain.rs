//! The SAKE key schedule: password-derived master key, the evolving
//! authentication-key chain, session-key derivation, and validation codes.
//!
//! Grounded on `examples/original_source/sake.c` (`derive_authentication_key`,
//! `derive_session_key`, `evolve_keys`) and `crypto_utils.c`'s password KDF
//! wrappers, restructured as an owned `KeyChain` value instead of C globals
//! per spec.md §9's design note, the way `zrc-crypto::identity::Identity`
//! owns its key material with `#[derive(Zeroize, ZeroizeOnDrop)]`.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;
use crate::primitives::{hash16, hash32, kdf_password};

const TAG_MASTER: &[u8] = b"SAKE_K";
const TAG_AUTH: &[u8] = b"SAKE_K_AUTH";
const TAG_SESSION: &[u8] = b"SAKE_SESSION";

/// Which end of the connection a [`KeyChain`] belongs to.
///
/// Only the Initiator precomputes `auth_next`; the Responder mirrors
/// `auth_curr` into `auth_prev`/`auth_next` so the same struct shape serves
/// both roles (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Initiator,
    Responder,
}

/// Evolving per-party key material for one SAKE session.
///
/// `auth_prev`/`auth_curr`/`auth_next` are only all distinct for the
/// Initiator; the Responder keeps them mirrored to `auth_curr`. Dropping a
/// `KeyChain` zeroizes every field.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KeyChain {
    pub master: [u8; 32],
    pub auth_prev: [u8; 32],
    pub auth_curr: [u8; 32],
    pub auth_next: [u8; 32],
    #[zeroize(skip)]
    pub epoch: u64,
    #[zeroize(skip)]
    pub role: Role,
}

/// Run the password KDF and wipe the password buffer before returning.
///
/// `password` is taken as `&mut [u8]` (not `&[u8]`) so the caller's buffer
/// can be wiped here rather than relying on the caller to remember to do it
/// — the one place in this crate where wiping a caller-owned buffer is the
/// primitive's job, because spec.md §3 requires the password exist in
/// memory only until KDF completion.
pub fn derive_master(password: &mut [u8], salt: &[u8; 16]) -> Result<[u8; 32], CryptoError> {
    let result = kdf_password(password, salt);
    password.zeroize();
    result
}

fn auth_from_master(master: &[u8; 32]) -> [u8; 32] {
    hash32(&[master, TAG_AUTH])
}

fn advance_master(master: &[u8; 32], target_epoch: u64) -> [u8; 32] {
    hash32(&[master, &target_epoch.to_le_bytes(), TAG_MASTER])
}

/// Build the initial `KeyChain` at epoch 0 from a freshly derived master key.
pub fn chain_init(master: [u8; 32], role: Role) -> KeyChain {
    let auth_curr = auth_from_master(&master);

    match role {
        Role::Initiator => {
            let master_next = advance_master(&master, 1);
            let auth_next = auth_from_master(&master_next);
            KeyChain {
                master,
                auth_prev: auth_curr,
                auth_curr,
                auth_next,
                epoch: 0,
                role,
            }
        }
        Role::Responder => KeyChain {
            master,
            auth_prev: auth_curr,
            auth_curr,
            auth_next: auth_curr,
            epoch: 0,
            role,
        },
    }
}

/// Advance the chain by one epoch.
///
/// Epoch arithmetic resolves spec.md §4.2's Open Question: every master
/// transition hashes in the *target* epoch number (`master_j = H(master_{j-1}
/// ‖ LE64(j) ‖ "SAKE_K")`), consistently for both the real chain advance and
/// the Initiator's one-step lookahead. This is the only choice of the two
/// candidate orderings under which both parties land on the same
/// `auth_curr` at the same epoch — the authoritative requirement spec.md
/// states — so it is what both `Role::Initiator` and `Role::Responder`
/// below implement.
pub fn chain_advance(chain: &mut KeyChain) {
    let e = chain.epoch;

    match chain.role {
        Role::Initiator => {
            let master_e1 = advance_master(&chain.master, e + 1);
            chain.auth_prev = chain.auth_curr;
            chain.auth_curr = chain.auth_next;

            let master_e2 = advance_master(&master_e1, e + 2);
            chain.auth_next = auth_from_master(&master_e2);

            chain.master.zeroize();
            chain.master = master_e1;
        }
        Role::Responder => {
            let master_e1 = advance_master(&chain.master, e + 1);
            chain.master.zeroize();
            chain.master = master_e1;
            chain.auth_curr = auth_from_master(&chain.master);
            chain.auth_prev = chain.auth_curr;
            chain.auth_next = chain.auth_curr;
        }
    }

    chain.epoch = e + 1;
}

/// Derive the per-session AEAD key from the chain's current master and the
/// two handshake nonces.
pub fn derive_session(master: &[u8; 32], client_nonce: &[u8; 16], server_nonce: &[u8; 16]) -> [u8; 32] {
    hash32(&[master, client_nonce, server_nonce, TAG_SESSION])
}

/// Short hash of a session key, exchanged during rekey so both parties
/// confirm they derived the same key before it is enabled.
pub fn validation_code(session_key: &[u8; 32]) -> [u8; 16] {
    hash16(&[session_key])
}
