// Copyright 2025 the Quadrille Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quadrille Collision: the game-facing layer of the Quadrille collision
//! stack.
//!
//! A game world mixes stationary colliders (terrain, walls) with objects
//! that move every frame (player, enemies, projectiles, pickups). This crate
//! wraps [`quadrille_grid`]'s broad-phase spatial hash with the semantics a
//! frame loop needs:
//!
//! - Register objects as **static** (indexed once) or **dynamic**
//!   (re-bucketed on every bounds change), with an optional caller-defined
//!   tag returned alongside query results.
//! - Query true overlaps: candidates from the grid are narrowed with exact
//!   half-open rectangle tests, so edge-touching boxes are not collisions.
//! - Probe intended movement before committing it, hit-test points, and
//!   snapshot diagnostics.
//!
//! The per-frame flow: move your entities, call
//! [`CollisionManager::update_dynamic_object`] for each one that moved, then
//! ask [`CollisionManager::collisions`] for the entities that need collision
//! resolution. Queries always reflect the updates already applied — nothing
//! is deferred or batched.
//!
//! # Example
//!
//! ```rust
//! use kurbo::{Rect, Vec2};
//! use quadrille_collision::{CategoryFilter, CollisionManager};
//!
//! // Tag objects with their gameplay kind.
//! let mut world: CollisionManager<u64, &str> = CollisionManager::new(64.0);
//! world.add_static_object(1, Rect::new(100.0, 100.0, 150.0, 150.0), Some("wall"))?;
//! world.add_dynamic_object(2, Rect::new(120.0, 120.0, 140.0, 140.0), Some("player"))?;
//!
//! // The player overlaps the wall.
//! let hits = world.collisions(2, Rect::new(120.0, 120.0, 140.0, 140.0))?;
//! assert_eq!(hits, vec![(1, Some("wall"))]);
//!
//! // Would a step right still collide with something solid?
//! let blocked = world.probe_move(2, Vec2::new(1.0, 0.0), CategoryFilter::STATIC)?;
//! assert!(!blocked.is_empty());
//! # Ok::<(), quadrille_collision::CollisionError>(())
//! ```
//!
//! ## What this is not
//!
//! This is detection, not physics: no continuous collision detection, no
//! response forces, no rotated or polygonal shapes. Axis-aligned rectangles
//! only, single-threaded, synchronous.
//!
//! This crate is `no_std` and uses `alloc`. Enable the `std` feature
//! (default) or `libm` for kurbo's float support.

#![no_std]

extern crate alloc;

mod error;
mod filter;
mod manager;
mod stats;
mod util;

pub use error::CollisionError;
pub use filter::{Category, CategoryFilter};
pub use manager::CollisionManager;
pub use stats::{CELL_FOOTPRINT, CollisionStats, OBJECT_FOOTPRINT};
