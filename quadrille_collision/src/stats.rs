// Copyright 2025 the Quadrille Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diagnostic snapshot types.

/// Assumed bookkeeping footprint of one non-empty cell, in bytes.
pub const CELL_FOOTPRINT: usize = 64;
/// Assumed bookkeeping footprint of one tracked object, in bytes.
pub const OBJECT_FOOTPRINT: usize = 32;

/// Read-only diagnostic snapshot of the collision index.
///
/// Produced by [`CollisionManager::stats`][crate::CollisionManager::stats];
/// purely informational (overlay readouts, logging) and never affects
/// collision results.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionStats {
    /// Total tracked objects.
    pub object_count: usize,
    /// Objects registered as static.
    pub static_count: usize,
    /// Objects registered as dynamic.
    pub dynamic_count: usize,
    /// Non-empty grid cells.
    pub cell_count: usize,
    /// Total cell memberships divided by `cell_count`; 0 if there are no
    /// cells.
    pub avg_objects_per_cell: f64,
    /// `cell_count * CELL_FOOTPRINT + object_count * OBJECT_FOOTPRINT`.
    ///
    /// A deterministic function of the counts, not a profiled measurement,
    /// so known inputs yield exact values.
    pub memory_estimate: usize,
    /// The grid's cell size in world units.
    pub cell_size: f64,
}
