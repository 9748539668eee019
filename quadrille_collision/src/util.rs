// Copyright 2025 the Quadrille Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Rect};
use quadrille_grid::Aabb2D;

pub(crate) fn rect_to_aabb(r: Rect) -> Aabb2D<f64> {
    Aabb2D::new(r.x0, r.y0, r.x1, r.y1)
}

/// Half-open rectangle intersection: boxes that merely share an edge do not
/// overlap.
#[inline]
pub(crate) fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}

/// Half-open point containment: min edges belong to the box, max edges do
/// not.
#[inline]
pub(crate) fn rect_contains_point(r: &Rect, p: Point) -> bool {
    r.x0 <= p.x && p.x < r.x1 && r.y0 <= p.y && p.y < r.y1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_is_half_open() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!rects_overlap(&a, &Rect::new(10.0, 0.0, 20.0, 10.0)));
        assert!(rects_overlap(&a, &Rect::new(9.0, 0.0, 19.0, 10.0)));
    }

    #[test]
    fn point_containment_is_half_open() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect_contains_point(&r, Point::new(0.0, 0.0)));
        assert!(!rect_contains_point(&r, Point::new(10.0, 0.0)));
        assert!(!rect_contains_point(&r, Point::new(5.0, 10.0)));
    }
}
