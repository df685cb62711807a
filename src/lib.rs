//! Rewind - Transport-level HTTP record-replay interception
//!
//! Stands in for a real HTTP client connection so tests can run against
//! previously captured exchanges instead of live servers.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::cargo)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_panics_doc
)]

pub mod cassette;
pub mod error;
pub mod headers;
pub mod patch;
pub mod request;
pub mod response;
pub mod transport;

pub use error::{Result, RewindError};
