// Copyright 2025 the Quadrille Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The game-facing collision manager.

use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashMap;
use kurbo::{Point, Rect, Vec2};
use quadrille_grid::{GridError, GridF64};

use crate::error::CollisionError;
use crate::filter::{Category, CategoryFilter};
use crate::stats::{CELL_FOOTPRINT, CollisionStats, OBJECT_FOOTPRINT};
use crate::util::{rect_contains_point, rect_to_aabb, rects_overlap};

#[derive(Copy, Clone, Debug)]
struct ObjectRecord<Tag> {
    bounds: Rect,
    category: Category,
    tag: Option<Tag>,
}

/// Broad-phase plus narrow-phase collision queries over registered objects.
///
/// Objects are registered once as [static][Category::Static] or
/// [dynamic][Category::Dynamic] with world-space bounds and an optional
/// caller-defined tag, moved via [`update_dynamic_object`][Self::update_dynamic_object],
/// and queried with [`collisions`][Self::collisions] and friends. The manager
/// narrows the grid's candidate supersets with exact half-open rectangle
/// tests, so results contain true overlaps only: two boxes that merely share
/// an edge are not colliding.
///
/// The manager stores ids and copies of bounds/tags; it never inspects or
/// owns the underlying entities. Callers must remove despawned entities —
/// dropping an entity without [`remove_object`][Self::remove_object] leaves a
/// phantom collider behind.
///
/// Single-threaded by design: queries reflect exactly the updates already
/// applied this frame, and nothing is deferred or batched. Sharing a manager
/// across threads requires external synchronization.
///
/// ## Example
///
/// ```
/// use kurbo::Rect;
/// use quadrille_collision::CollisionManager;
///
/// let mut manager: CollisionManager<&str> = CollisionManager::new(64.0);
/// manager.add_static_object("wall", Rect::new(100.0, 100.0, 150.0, 150.0), None)?;
/// manager.add_dynamic_object("player", Rect::new(120.0, 120.0, 140.0, 140.0), None)?;
///
/// let hits = manager.collisions("player", Rect::new(120.0, 120.0, 140.0, 140.0))?;
/// assert_eq!(hits, vec![("wall", None)]);
///
/// // Moving away clears the overlap.
/// manager.update_dynamic_object("player", Rect::new(500.0, 500.0, 520.0, 520.0))?;
/// let hits = manager.collisions("player", Rect::new(500.0, 500.0, 520.0, 520.0))?;
/// assert!(hits.is_empty());
/// # Ok::<(), quadrille_collision::CollisionError>(())
/// ```
pub struct CollisionManager<K, Tag = ()> {
    grid: GridF64<K>,
    objects: HashMap<K, ObjectRecord<Tag>>,
    checks: Cell<u64>,
    hits: Cell<u64>,
}

impl<K, Tag> Debug for CollisionManager<K, Tag> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CollisionManager")
            .field("objects", &self.objects.len())
            .field("grid", &self.grid)
            .field("checks", &self.checks.get())
            .field("hits", &self.hits.get())
            .finish_non_exhaustive()
    }
}

impl<K, Tag> CollisionManager<K, Tag>
where
    K: Copy + Eq + Hash + Debug,
    Tag: Copy + Debug,
{
    /// Create a manager with the given grid cell size (world units).
    ///
    /// Guideline: 2–4x the average object dimension. The cell size is
    /// immutable afterward; see [`rebuild`][Self::rebuild] to retune.
    pub fn new(cell_size: f64) -> Self {
        Self {
            grid: GridF64::new(cell_size),
            objects: HashMap::new(),
            checks: Cell::new(0),
            hits: Cell::new(0),
        }
    }

    /// The grid cell size in world units.
    #[inline]
    pub fn cell_size(&self) -> f64 {
        self.grid.cell_size()
    }

    /// Register an object whose bounds never change (terrain, walls).
    ///
    /// # Errors
    ///
    /// Propagates [`GridError::InvalidBounds`] and
    /// [`GridError::DuplicateKey`].
    pub fn add_static_object(
        &mut self,
        id: K,
        bounds: Rect,
        tag: Option<Tag>,
    ) -> Result<(), CollisionError> {
        self.grid.insert(id, rect_to_aabb(bounds))?;
        self.objects.insert(
            id,
            ObjectRecord {
                bounds,
                category: Category::Static,
                tag,
            },
        );
        Ok(())
    }

    /// Register a batch of static objects, stopping at the first error.
    ///
    /// The level-load path: walls and terrain come out of the map in bulk.
    /// Objects registered before a failing entry stay registered.
    pub fn add_static_objects<I>(&mut self, objects: I) -> Result<(), CollisionError>
    where
        I: IntoIterator<Item = (K, Rect, Option<Tag>)>,
    {
        for (id, bounds, tag) in objects {
            self.add_static_object(id, bounds, tag)?;
        }
        Ok(())
    }

    /// Register an object whose bounds may change every frame.
    ///
    /// # Errors
    ///
    /// Propagates [`GridError::InvalidBounds`] and
    /// [`GridError::DuplicateKey`].
    pub fn add_dynamic_object(
        &mut self,
        id: K,
        bounds: Rect,
        tag: Option<Tag>,
    ) -> Result<(), CollisionError> {
        self.grid.insert(id, rect_to_aabb(bounds))?;
        self.objects.insert(
            id,
            ObjectRecord {
                bounds,
                category: Category::Dynamic,
                tag,
            },
        );
        Ok(())
    }

    /// Move a dynamic object to new bounds, re-bucketing it in the grid.
    ///
    /// If the bounds are unchanged from the last known value the grid is not
    /// touched at all, so a stationary entity that calls this every frame
    /// costs a rectangle comparison and nothing else.
    ///
    /// # Errors
    ///
    /// [`CollisionError::StaticUpdate`] if the id was registered static;
    /// propagates [`GridError::NotFound`] and [`GridError::InvalidBounds`].
    pub fn update_dynamic_object(&mut self, id: K, bounds: Rect) -> Result<(), CollisionError> {
        let record = self
            .objects
            .get_mut(&id)
            .ok_or(GridError::NotFound)?;
        if record.category == Category::Static {
            return Err(CollisionError::StaticUpdate);
        }
        if record.bounds == bounds {
            return Ok(());
        }
        self.grid.update(id, rect_to_aabb(bounds))?;
        record.bounds = bounds;
        Ok(())
    }

    /// Remove an object from the index.
    ///
    /// Removing an id that is not (or no longer) registered is a no-op:
    /// game code commonly despawns an entity from two paths in the same
    /// frame, and that race is benign. The grid itself stays strict; the
    /// downgrade happens only here.
    pub fn remove_object(&mut self, id: K) {
        match self.grid.remove(id) {
            Ok(()) => {
                self.objects.remove(&id);
            }
            // Only NotFound can come out of remove.
            Err(_) => log::trace!("remove_object: id {id:?} is not tracked, ignoring"),
        }
    }

    /// Visit every object whose stored bounds truly overlap `bounds`,
    /// excluding `id` itself and objects rejected by `filter`.
    ///
    /// # Errors
    ///
    /// Propagates [`GridError::InvalidBounds`] for empty query rectangles.
    pub fn visit_collisions<F>(
        &self,
        id: K,
        bounds: Rect,
        filter: CategoryFilter,
        mut f: F,
    ) -> Result<(), CollisionError>
    where
        F: FnMut(K, Option<Tag>),
    {
        self.checks.set(self.checks.get() + 1);
        let mut any = false;
        self.grid.visit_rect(&rect_to_aabb(bounds), |candidate| {
            if candidate == id {
                return;
            }
            let record = self
                .objects
                .get(&candidate)
                .expect("manager invariant violated: grid tracks an unregistered id");
            if filter.matches(record.category) && rects_overlap(&record.bounds, &bounds) {
                any = true;
                f(candidate, record.tag);
            }
        })?;
        if any {
            self.hits.set(self.hits.get() + 1);
        }
        Ok(())
    }

    /// All objects truly overlapping `bounds`, excluding `id` itself.
    ///
    /// Broad phase narrows to the cells `bounds` touches; the half-open
    /// exact test then drops phantom candidates. Edge-touching boxes are not
    /// collisions.
    ///
    /// # Errors
    ///
    /// Propagates [`GridError::InvalidBounds`] for empty query rectangles.
    pub fn collisions(&self, id: K, bounds: Rect) -> Result<Vec<(K, Option<Tag>)>, CollisionError> {
        self.collisions_filtered(id, bounds, CategoryFilter::default())
    }

    /// Like [`collisions`][Self::collisions], restricted to the categories in
    /// `filter`.
    ///
    /// # Errors
    ///
    /// Propagates [`GridError::InvalidBounds`] for empty query rectangles.
    pub fn collisions_filtered(
        &self,
        id: K,
        bounds: Rect,
        filter: CategoryFilter,
    ) -> Result<Vec<(K, Option<Tag>)>, CollisionError> {
        let mut out = Vec::new();
        self.visit_collisions(id, bounds, filter, |k, tag| out.push((k, tag)))?;
        Ok(out)
    }

    /// The collisions the registered object would have after translating its
    /// stored bounds by `delta`.
    ///
    /// The movement pre-check: probe with the intended motion before
    /// committing it, and block or slide when something static comes back.
    ///
    /// # Errors
    ///
    /// [`GridError::NotFound`] if `id` is not registered.
    pub fn probe_move(
        &self,
        id: K,
        delta: Vec2,
        filter: CategoryFilter,
    ) -> Result<Vec<(K, Option<Tag>)>, CollisionError> {
        let record = self.objects.get(&id).ok_or(GridError::NotFound)?;
        self.collisions_filtered(id, record.bounds + delta, filter)
    }

    /// All objects whose bounds contain the point.
    ///
    /// The point is a zero-area query: it runs the same candidate-then-exact
    /// pipeline with a half-open point-in-rect test, so a point on a box's
    /// max edge does not hit it.
    pub fn hit_test_point(&self, p: Point) -> Vec<(K, Option<Tag>)> {
        let mut out = Vec::new();
        self.grid.visit_point(p.x, p.y, |candidate| {
            let record = self
                .objects
                .get(&candidate)
                .expect("manager invariant violated: grid tracks an unregistered id");
            if rect_contains_point(&record.bounds, p) {
                out.push((candidate, record.tag));
            }
        });
        out
    }

    /// Whether `id` is registered.
    #[inline]
    pub fn contains(&self, id: K) -> bool {
        self.objects.contains_key(&id)
    }

    /// The last known bounds of `id`, if registered.
    pub fn bounds_of(&self, id: K) -> Option<Rect> {
        self.objects.get(&id).map(|r| r.bounds)
    }

    /// The registration category of `id`, if registered.
    pub fn category_of(&self, id: K) -> Option<Category> {
        self.objects.get(&id).map(|r| r.category)
    }

    /// The tag registered for `id`, if any.
    pub fn tag_of(&self, id: K) -> Option<Tag> {
        self.objects.get(&id).and_then(|r| r.tag)
    }

    /// Total registered objects.
    #[inline]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Number of rectangle collision queries served since construction or
    /// the last [`reset_counters`][Self::reset_counters].
    #[inline]
    pub fn collision_checks(&self) -> u64 {
        self.checks.get()
    }

    /// Number of those queries that returned at least one collision.
    #[inline]
    pub fn collision_hits(&self) -> u64 {
        self.hits.get()
    }

    /// Zero the query counters.
    pub fn reset_counters(&self) {
        self.checks.set(0);
        self.hits.set(0);
    }

    /// Read-only diagnostic snapshot. Never affects collision results.
    pub fn stats(&self) -> CollisionStats {
        let cell_count = self.grid.cell_count();
        let occupancy = self.grid.occupancy();
        let avg_objects_per_cell = if cell_count == 0 {
            0.0
        } else {
            occupancy as f64 / cell_count as f64
        };
        let static_count = self
            .objects
            .values()
            .filter(|r| r.category == Category::Static)
            .count();
        CollisionStats {
            object_count: self.objects.len(),
            static_count,
            dynamic_count: self.objects.len() - static_count,
            cell_count,
            avg_objects_per_cell,
            memory_estimate: cell_count * CELL_FOOTPRINT + self.objects.len() * OBJECT_FOOTPRINT,
            cell_size: self.grid.cell_size(),
        }
    }

    /// Drop every registered object, keeping the cell size and counters.
    pub fn clear(&mut self) {
        self.grid.clear();
        self.objects.clear();
    }

    /// Rebuild the index with a new cell size, re-inserting every object.
    ///
    /// Cell size cannot be mutated in place (every stored span would go
    /// stale), so retuning reconstructs the grid from the registered
    /// records. Registrations, bounds, categories, and tags all survive.
    pub fn rebuild(&mut self, cell_size: f64) {
        log::debug!(
            "rebuilding collision grid: cell_size {} -> {}, {} objects",
            self.grid.cell_size(),
            cell_size,
            self.objects.len()
        );
        let mut grid = GridF64::new(cell_size);
        for (&id, record) in &self.objects {
            grid.insert(id, rect_to_aabb(record.bounds))
                .expect("manager invariant violated: tracked records must re-insert cleanly");
        }
        self.grid = grid;
    }
}
