// Copyright 2025 the Quadrille Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Manager-level contract errors.

use quadrille_grid::GridError;
use thiserror::Error;

/// Contract violations raised by
/// [`CollisionManager`][crate::CollisionManager] operations.
///
/// Like [`GridError`], these are programming errors and propagate to the
/// caller synchronously. The single documented exception to "fail loudly" is
/// [`CollisionManager::remove_object`][crate::CollisionManager::remove_object],
/// which downgrades an unknown id to a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CollisionError {
    /// An error surfaced from the underlying grid.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// `update_dynamic_object` was called on an id registered as static.
    /// Static objects are indexed once and never re-bucketed; a moving wall
    /// is a bug worth catching.
    #[error("cannot update an object registered as static")]
    StaticUpdate,
}
