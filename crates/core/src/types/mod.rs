//! Core type definitions for SafeCross.
//!
//! Broken down into submodules: positions and signal locations in `geo`,
//! utterances and synthesized audio in `speech`.

pub mod geo;
pub mod speech;

pub use geo::*;
pub use speech::*;
