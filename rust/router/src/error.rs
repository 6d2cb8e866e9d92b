// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for router configuration and input validation.
//!
//! Routing itself never fails: unplaceable risers, branches and trunks are
//! recovered locally and reported on [`crate::RouteOutcome`]. These errors
//! only surface where external data enters the crate.

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading configuration or validating inputs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configuration value is out of range.
    #[error("invalid router configuration: {0}")]
    InvalidConfig(String),

    /// The configuration document could not be parsed.
    #[error("configuration parse error: {0}")]
    Config(#[from] serde_json::Error),

    /// A geometry helper rejected its input.
    #[error("geometry error: {0}")]
    Geometry(#[from] pipenet_geometry::Error),

    /// A riser point carries unusable values.
    #[error("invalid riser #{index}: {reason}")]
    InvalidRiser { index: usize, reason: String },
}
