// Copyright 2025 the Quadrille Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quadrille Grid: a uniform spatial hash over 2D AABBs.
//!
//! Quadrille Grid is the broad-phase building block of the Quadrille
//! collision stack. It partitions the world into fixed-size square cells and
//! tracks, for each caller-supplied key, the set of cells its axis-aligned
//! box overlaps.
//!
//! - Insert, update, and remove boxes keyed by an opaque `Copy` key.
//! - Query by point or rectangle; results are deduplicated candidate
//!   *supersets* (cell overlap, not exact overlap).
//! - The forward (cell → keys) and reverse (key → span) maps are kept as
//!   mutual inverses by every operation, so the broad phase never produces
//!   false negatives.
//!
//! The grid is generic over the scalar type (`f32`, `f64`, `i64`) and has no
//! geometry-crate dependency. Higher layers own entity semantics and apply
//! the exact narrow-phase test to the candidates.
//!
//! Contract violations (duplicate insert, unknown key, degenerate bounds)
//! surface as [`GridError`] and are programming errors: fix the call site
//! rather than handling them at runtime.
//!
//! # Example
//!
//! ```rust
//! use quadrille_grid::{Aabb2D, GridF64};
//!
//! // A grid with 64-unit cells, keyed by entity ids.
//! let mut grid: GridF64<u64> = GridF64::new(64.0);
//! grid.insert(1, Aabb2D::from_xywh(100.0, 100.0, 50.0, 50.0))?;
//! grid.insert(2, Aabb2D::from_xywh(120.0, 120.0, 20.0, 20.0))?;
//!
//! // Broad-phase candidates for a region.
//! let mut hits = grid.query_rect(&Aabb2D::from_xywh(110.0, 110.0, 40.0, 40.0))?;
//! hits.sort_unstable();
//! assert_eq!(hits, vec![1, 2]);
//!
//! // Moving an object re-buckets it.
//! grid.update(2, Aabb2D::from_xywh(500.0, 500.0, 20.0, 20.0))?;
//! assert_eq!(grid.query_point(510.0, 510.0), vec![2]);
//! # Ok::<(), quadrille_grid::GridError>(())
//! ```
//!
//! ## Choosing a cell size
//!
//! Cell size trades indexing overhead against candidate-set bloat: cells much
//! smaller than typical objects make every object span many cells, cells much
//! larger make unrelated objects share cells and queries regress toward a
//! linear scan. A good default is 2–4x the average object dimension.
//! `cell_size` is immutable after construction; to retune, build a new grid
//! and re-insert the tracked objects.
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates. Debug builds
//! may assert.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod error;
mod grid;
mod types;

pub use error::GridError;
pub use grid::{CellSpan, GridF32, GridF64, GridI64, SpatialHashGrid};
pub use types::{Aabb2D, GridScalar};

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn insert_move_query_across_cells() {
        let mut grid: GridF64<u32> = GridF64::new(64.0);
        grid.insert(1, Aabb2D::from_xywh(100.0, 100.0, 50.0, 50.0)).unwrap();
        grid.insert(2, Aabb2D::from_xywh(120.0, 120.0, 20.0, 20.0)).unwrap();

        let mut hits = grid.query_rect(&Aabb2D::from_xywh(120.0, 120.0, 20.0, 20.0)).unwrap();
        hits.sort_unstable();
        assert_eq!(hits, vec![1, 2]);

        grid.update(2, Aabb2D::from_xywh(500.0, 500.0, 20.0, 20.0)).unwrap();
        let hits = grid.query_rect(&Aabb2D::from_xywh(500.0, 500.0, 20.0, 20.0)).unwrap();
        assert_eq!(hits, vec![2]);
        assert_eq!(grid.object_count(), 2);
    }

    #[test]
    fn point_query_returns_cell_occupants() {
        let mut grid: GridI64<u32> = GridI64::new(100);
        grid.insert(1, Aabb2D::new(0, 0, 10, 10)).unwrap();
        // Same cell: surfaced as a candidate even though the point is
        // outside its exact bounds.
        assert_eq!(grid.query_point(90, 90), vec![1]);
        assert!(grid.query_point(150, 150).is_empty());
    }
}
