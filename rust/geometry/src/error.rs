// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in geometry helpers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Degenerate bounds: {0}")]
    DegenerateBounds(String),

    #[error("Invalid radius: {0}")]
    InvalidRadius(f64),

    #[error("Invalid merge exponent {0}: must be finite and > 1")]
    InvalidExponent(f64),

    #[error("Empty mesh: {0}")]
    EmptyMesh(String),
}
