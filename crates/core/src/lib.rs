#![deny(unused)]
//! Core types, traits, and error definitions for SafeCross.
//!
//! This crate provides the building blocks shared by the proximity monitor
//! and the speech gateway.

pub mod config;
pub mod error;
pub mod mocks;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::*;
pub use types::*;
