// Copyright 2025 the Quadrille Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grid-level contract errors.

use thiserror::Error;

/// Contract violations raised by [`SpatialHashGrid`][crate::SpatialHashGrid]
/// operations.
///
/// These are programming errors, not recoverable runtime conditions: the grid
/// never retries and never degrades. Callers are expected to fix the call
/// site, not to handle these at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    /// A box with non-positive width or height was supplied. A degenerate box
    /// can never collide and indicates a caller bug.
    #[error("bounds have non-positive width or height")]
    InvalidBounds,
    /// `insert` was called with a key the grid already tracks. Remove first,
    /// or use `update`.
    #[error("key is already tracked by the grid")]
    DuplicateKey,
    /// `update` or `remove` was called with a key the grid does not track.
    #[error("key is not tracked by the grid")]
    NotFound,
}
