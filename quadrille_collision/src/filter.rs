// Copyright 2025 the Quadrille Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Object categories and query filtering.

/// Registration category of a managed object.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// Indexed once at registration and never re-bucketed (terrain, walls).
    Static,
    /// Re-indexed whenever its bounds change (player, enemies, projectiles).
    Dynamic,
}

bitflags::bitflags! {
    /// Restricts collision queries to object categories.
    ///
    /// Movement code typically collides against [`CategoryFilter::STATIC`]
    /// only, while combat and pickup code wants [`CategoryFilter::DYNAMIC`]
    /// or everything.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CategoryFilter: u8 {
        /// Match objects registered as static.
        const STATIC = 0b0000_0001;
        /// Match objects registered as dynamic.
        const DYNAMIC = 0b0000_0010;
    }
}

impl Default for CategoryFilter {
    fn default() -> Self {
        Self::STATIC | Self::DYNAMIC
    }
}

impl CategoryFilter {
    /// Check whether a category passes this filter.
    pub fn matches(&self, category: Category) -> bool {
        match category {
            Category::Static => self.contains(Self::STATIC),
            Category::Dynamic => self.contains(Self::DYNAMIC),
        }
    }
}
