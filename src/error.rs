// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `EcoStream` library.
//!
//! The hierarchy mirrors the failure categories of the device link:
//! establishing a connection, moving frames over an established one,
//! decoding what the unit sends, and validating values before they are
//! turned into commands.
//!
//! Every error is `Clone` so that a single refresh outcome can be handed to
//! all callers that were waiting on the same fetch.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// The connection to the unit could not be established.
    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// An established connection failed while sending or receiving.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A message could not be decoded or a payload could not be encoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A value was rejected before it reached the unit.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// No device address has been recorded yet.
    #[error("device is not connected")]
    NotConnected,

    /// The refresh coordinator has been shut down.
    #[error("refresh coordinator has been shut down")]
    ShutDown,
}

impl Error {
    /// Returns `true` if the error means the connection dropped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_closed())
    }
}

/// Errors raised while establishing a connection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectionError {
    /// The configured host could not be turned into a device address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The transport refused or failed the connection attempt.
    #[error("failed to connect to {address}: {message}")]
    Failed {
        /// The address that was dialled.
        address: String,
        /// Description of the failure.
        message: String,
    },

    /// The connection attempt did not complete in time.
    #[error("connecting to {address} timed out after {ms} ms")]
    Timeout {
        /// The address that was dialled.
        address: String,
        /// The timeout that elapsed, in milliseconds.
        ms: u64,
    },
}

/// Errors raised on an established connection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The peer closed the connection or it was reset.
    #[error("connection closed")]
    Closed,

    /// Any other I/O or framing failure.
    #[error("I/O error: {0}")]
    Io(String),

    /// No frame arrived within the receive timeout.
    #[error("receive timed out after {0} ms")]
    Timeout(u64),
}

impl TransportError {
    /// Returns `true` for the transient closed condition that the link
    /// recovers from with a single reconnect.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Errors related to the JSON wire format.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The message is not valid JSON.
    #[error("JSON parse error: {0}")]
    Json(String),

    /// The message is valid JSON but not an object.
    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    /// A known section is present but is not an object.
    #[error("section {section} must be an object, found {found}")]
    InvalidSection {
        /// The offending section key.
        section: String,
        /// JSON kind that was found instead.
        found: &'static str,
    },

    /// An outbound payload addresses a section the unit does not know.
    #[error("unknown section: {0}")]
    UnknownSection(String),

    /// An outbound payload carries no fields.
    #[error("payload is empty")]
    EmptyPayload,

    /// A payload could not be serialized.
    #[error("failed to encode payload: {0}")]
    Encode(String),
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Errors related to value validation and constraints.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: i64,
        /// Maximum allowed value.
        max: i64,
        /// The actual value that was provided.
        actual: i64,
    },

    /// A preset name is not one of `low`, `mid` or `high`.
    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    /// A field needed to derive a value has not been reported yet.
    #[error("missing field: {0}")]
    MissingField(String),

    /// A configuration value is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
