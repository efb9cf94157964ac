//! Thin composition root over `sake-protocol`: TCP transport wiring and CLI
//! prompts. Everything here is explicitly out of scope for the protocol
//! itself (spec.md §1's Non-goals) but still routes through
//! `sake-protocol`'s typed errors and `tracing` logging rather than ad-hoc
//! prints, matching how the teacher's `zrc-demo` binary is a thin
//! composition root over `zrc-core`/`zrc-crypto` library crates.

pub mod cli;
pub mod transport;
