//! Cassette contract consumed by the connection proxy

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::request::Request;
use crate::response::RecordedResponse;

/// Recording policy of a cassette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordMode {
    /// Record when the cassette does not exist yet, replay afterwards
    Once,
    /// Replay known exchanges, record unknown ones
    NewEpisodes,
    /// Replay only; never record
    None,
    /// Always re-record
    All,
}

impl fmt::Display for RecordMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Once => "once",
            Self::NewEpisodes => "new_episodes",
            Self::None => "none",
            Self::All => "all",
        };
        f.write_str(name)
    }
}

/// Store and policy for matching and persisting recorded exchanges.
///
/// Shared process-wide; implementations serialize their own mutation so
/// that `append` is atomic with respect to concurrent `can_play` queries.
pub trait Cassette {
    /// True if a recording can satisfy `request`
    fn can_play(&self, request: &Request) -> bool;

    /// Return the recording for `request`.
    ///
    /// Only called after [`Cassette::can_play`] returned true for the
    /// same request.
    fn play(&self, request: &Request) -> RecordedResponse;

    /// Persist one new exchange
    fn append(&self, request: &Request, response: &RecordedResponse);

    /// True if `request` is one the recording policy would normally accept
    fn filter(&self, request: &Request) -> bool;

    /// True when new recordings are disallowed
    fn write_protected(&self) -> bool;

    /// Active record mode, for diagnostics
    fn record_mode(&self) -> RecordMode;

    /// Cassette identity (its path), used only in fault messages
    fn identity(&self) -> &str;
}
