// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grid error types.

use thiserror::Error;

/// Errors reported by grid construction and consistency checks.
///
/// Steady-state mutations and queries never fail: unknown handles are no-ops
/// and malformed query bounds resolve to the smallest footprint.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// The configured cell size is zero, negative, or not finite.
    #[error("grid cell size must be finite and strictly positive")]
    InvalidCellSize,

    /// The cell map and the object records disagree.
    #[error("grid invariant violated: {0}")]
    InvariantViolated(&'static str),
}

/// Result type for grid operations.
pub type GridResult<T> = Result<T, GridError>;
