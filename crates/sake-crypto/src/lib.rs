//! Cryptographic primitives and key schedule for the SAKE symmetric
//! authenticated key exchange.
//!
//! This crate has no networking or I/O of its own; `sake-protocol` builds
//! the handshake/record/rekey state machines on top of it.

#![forbid(unsafe_code)]

pub mod chain;
pub mod error;
pub mod primitives;

#[cfg(test)]
mod proptests;

pub use chain::{chain_advance, chain_init, derive_master, derive_session, validation_code, KeyChain, Role};
pub use error::CryptoError;
pub use primitives::{aead_open, aead_seal, ct_equal, hash, hash16, hash32, kdf_password, rand_fill, wipe};
