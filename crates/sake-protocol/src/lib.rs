//! Handshake, record, and rekey state machines bound to one session value.
//!
//! Builds on `sake-crypto`'s primitives and key schedule; owns no transport
//! of its own beyond a `Read + Write` bound, so the binaries in
//! `sake-transfer` are the only place a real `TcpStream` appears.

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod handshake;
pub mod record;
pub mod rekey;
pub mod session;
pub mod stats;
pub mod wire;

pub use config::SessionConfig;
pub use error::ProtocolError;
pub use session::Session;
pub use stats::TransferStats;
