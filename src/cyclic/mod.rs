//! Modular index arithmetic and windowed reassembly
//!
//! - [`CyclicNumber`] - integer confined to `[0, modulus)` with wrap-around
//!   arithmetic and directional distances
//! - [`Reassembler`] - sliding window that admits out-of-order arrivals keyed
//!   by a modular index and releases them in order
//! - [`BlockingReassembler`] - the same window shared between a producer and a
//!   consumer thread

pub mod number;
pub mod reassembler;

pub use number::CyclicNumber;
pub use reassembler::{ Reassembler, BlockingReassembler };
