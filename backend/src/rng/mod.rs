//! Deterministic random number generation
//!
//! A single xorshift64* stream drives every stochastic draw of a run:
//! inter-event times and the selection of the firing infection.
//! All randomness in the simulator MUST go through this module, otherwise
//! snapshot/restore cannot reproduce a trajectory.

mod xorshift;

pub use xorshift::RngManager;
