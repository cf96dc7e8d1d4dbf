// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`kurbo`] interop for `f64` grids.
//!
//! Conversions between [`kurbo::Rect`] and [`Aabb2D`], shape-typed query
//! entry points, and small narrow-phase predicates callers can apply to the
//! grid's broad-phase candidates.

use alloc::vec::Vec;
use core::hash::Hash;

use kurbo::{Circle, Point, Rect};

use crate::grid::HashGrid;
use crate::types::Aabb2D;

impl From<Rect> for Aabb2D<f64> {
    fn from(rect: Rect) -> Self {
        let r = rect.abs();
        Self::new(r.x0, r.y0, r.x1, r.y1)
    }
}

impl From<Aabb2D<f64>> for Rect {
    fn from(aabb: Aabb2D<f64>) -> Self {
        Self::new(aabb.min_x, aabb.min_y, aabb.max_x, aabb.max_y)
    }
}

impl<H: Copy + Eq + Hash> HashGrid<f64, H> {
    /// Broad-phase candidates for a rectangle, such as a view's visible bounds.
    pub fn query_rect_shape(&self, rect: Rect) -> Vec<H> {
        self.query_region(rect.into())
    }

    /// Broad-phase candidates for a circle, such as an interaction radius.
    pub fn query_circle_shape(&self, circle: Circle) -> Vec<H> {
        self.query_circle(circle.center.x, circle.center.y, circle.radius)
    }
}

/// Whether `circle` touches `aabb`, edges included.
///
/// An inverted box is tested as its normalized counterpart, matching the
/// cells the grid indexes it under.
pub fn circle_overlaps_aabb(circle: &Circle, aabb: &Aabb2D<f64>) -> bool {
    let aabb = aabb.normalized();
    let nearest = Point::new(
        circle.center.x.clamp(aabb.min_x, aabb.max_x),
        circle.center.y.clamp(aabb.min_y, aabb.max_y),
    );
    circle.center.distance_squared(nearest) <= circle.radius * circle.radius
}

/// Whether `point` lies within `radius` of `center`.
pub fn within_radius(center: Point, radius: f64, point: Point) -> bool {
    center.distance_squared(point) <= radius * radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_conversion_normalizes() {
        let aabb: Aabb2D<f64> = Rect::new(10.0, 20.0, 0.0, 5.0).into();
        assert_eq!(aabb, Aabb2D::new(0.0, 5.0, 10.0, 20.0));
        let back: Rect = aabb.into();
        assert_eq!(back, Rect::new(0.0, 5.0, 10.0, 20.0));
    }

    #[test]
    fn circle_narrow_phase_filters_corners() {
        let mut grid = HashGrid::<f64, u32>::new(64.0).unwrap();
        let near = Aabb2D::new(95.0, 95.0, 105.0, 105.0);
        let corner = Aabb2D::new(0.0, 0.0, 2.0, 2.0);
        grid.insert(1, near);
        grid.insert(2, corner);

        let circle = Circle::new((100.0, 100.0), 90.0);
        let mut candidates = grid.query_circle_shape(circle);
        candidates.sort_unstable();
        assert_eq!(candidates, [1, 2]);

        let boxes = [(1, near), (2, corner)];
        let exact: Vec<u32> = boxes
            .iter()
            .filter(|(h, b)| candidates.contains(h) && circle_overlaps_aabb(&circle, b))
            .map(|&(h, _)| h)
            .collect();
        assert_eq!(exact, [1]);
    }

    #[test]
    fn inverted_boxes_are_tested_normalized() {
        let mut grid = HashGrid::<f64, u32>::new(64.0).unwrap();
        grid.insert(1, Aabb2D::new(10.0, 10.0, 0.0, 0.0));

        let circle = Circle::new((5.0, 5.0), 20.0);
        assert_eq!(grid.query_circle_shape(circle), [1]);
        let stored = grid.bounds(1).unwrap();
        assert!(circle_overlaps_aabb(&circle, &stored));
        assert!(!circle_overlaps_aabb(&Circle::new((50.0, 5.0), 20.0), &stored));
    }

    #[test]
    fn rect_shape_query_matches_region_query() {
        let mut grid = HashGrid::<f64, u32>::new(32.0).unwrap();
        grid.insert(1, Aabb2D::new(40.0, 40.0, 50.0, 50.0));
        let view = Rect::new(0.0, 0.0, 100.0, 60.0);
        assert_eq!(grid.query_rect_shape(view), grid.query_region(view.into()));
    }

    #[test]
    fn within_radius_is_inclusive() {
        let c = Point::new(0.0, 0.0);
        assert!(within_radius(c, 5.0, Point::new(3.0, 4.0)));
        assert!(!within_radius(c, 5.0, Point::new(3.0, 4.1)));
    }
}
