// Copyright 2025 the Plotfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared geometric predicates.
//!
//! All placers reason about axis-aligned boxes. Discs are reduced to their
//! bounding box for label collision tests, while the packers use exact
//! circle–circle lens areas.

use core::f64::consts::PI;

use kurbo::{Circle, Point, Rect, Size};

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

/// Tolerance used when comparing edges, so that touching boxes do not count as
/// overlapping after floating point round-off.
pub(crate) const EPSILON: f64 = 1e-9;

/// A fixed region that a label must avoid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Obstacle {
    /// A disc, e.g. a scatter marker or a packed bubble.
    Disc(Circle),
    /// A box, e.g. an icon or another label.
    Box(Rect),
}

impl Obstacle {
    /// Creates a disc obstacle.
    pub fn disc(center: impl Into<Point>, radius: f64) -> Self {
        Self::Disc(Circle::new(center, radius.max(0.0)))
    }

    /// Creates a box obstacle from its origin and size.
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::Box(Rect::new(x, y, x + width.max(0.0), y + height.max(0.0)))
    }

    /// The axis-aligned box used for collision tests.
    pub fn bounding_box(&self) -> Rect {
        match *self {
            Self::Disc(c) => Rect::from_center_size(c.center, Size::new(2.0 * c.radius, 2.0 * c.radius)),
            Self::Box(r) => r.abs(),
        }
    }

    /// The center of the obstacle.
    pub fn center(&self) -> Point {
        match *self {
            Self::Disc(c) => c.center,
            Self::Box(r) => r.center(),
        }
    }

    /// Half of the obstacle's larger dimension.
    pub fn radius(&self) -> f64 {
        match *self {
            Self::Disc(c) => c.radius,
            Self::Box(r) => 0.5 * r.width().abs().max(r.height().abs()),
        }
    }

    /// Whether `rect` overlaps this obstacle's bounding box.
    pub fn overlaps_rect(&self, rect: Rect) -> bool {
        rects_overlap(self.bounding_box(), rect)
    }
}

impl From<Circle> for Obstacle {
    fn from(value: Circle) -> Self {
        Self::Disc(value)
    }
}

impl From<Rect> for Obstacle {
    fn from(value: Rect) -> Self {
        Self::Box(value)
    }
}

/// Whether two boxes overlap with positive area. Touching edges do not overlap.
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    let (a, b) = (a.abs(), b.abs());
    a.x0 < b.x1 - EPSILON && b.x0 < a.x1 - EPSILON && a.y0 < b.y1 - EPSILON && b.y0 < a.y1 - EPSILON
}

/// The area of overlap between two boxes (zero when disjoint).
pub(crate) fn rect_overlap_area(a: Rect, b: Rect) -> f64 {
    let i = a.abs().intersect(b.abs());
    (i.width().max(0.0)) * (i.height().max(0.0))
}

/// Whether `inner` lies entirely inside `outer`, within [`EPSILON`].
pub(crate) fn rect_within(inner: Rect, outer: Rect) -> bool {
    inner.x0 >= outer.x0 - EPSILON
        && inner.y0 >= outer.y0 - EPSILON
        && inner.x1 <= outer.x1 + EPSILON
        && inner.y1 <= outer.y1 + EPSILON
}

/// The area of the lens where two circles intersect.
pub fn circle_intersection_area(a: Circle, b: Circle) -> f64 {
    let (r0, r1) = (a.radius.max(0.0), b.radius.max(0.0));
    let d = a.center.distance(b.center);
    if d >= r0 + r1 {
        return 0.0;
    }
    if d <= (r0 - r1).abs() {
        let r = r0.min(r1);
        return PI * r * r;
    }
    let alpha = ((d * d + r0 * r0 - r1 * r1) / (2.0 * d * r0)).clamp(-1.0, 1.0).acos();
    let beta = ((d * d + r1 * r1 - r0 * r0) / (2.0 * d * r1)).clamp(-1.0, 1.0).acos();
    let kite = (-d + r0 + r1) * (d + r0 - r1) * (d - r0 + r1) * (d + r0 + r1);
    r0 * r0 * alpha + r1 * r1 * beta - 0.5 * kite.max(0.0).sqrt()
}

/// Area of a circle.
pub(crate) fn circle_area(radius: f64) -> f64 {
    PI * radius * radius
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn touching_boxes_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 20.0, 10.0);
        assert!(!rects_overlap(a, b), "shared edge is not an overlap");
        assert!(
            rects_overlap(a, Rect::new(9.0, 9.0, 12.0, 12.0)),
            "corner overlap"
        );
    }

    #[test]
    fn disc_obstacle_uses_its_bounding_box() {
        let o = Obstacle::disc((50.0, 50.0), 10.0);
        assert_eq!(o.bounding_box(), Rect::new(40.0, 40.0, 60.0, 60.0));
        assert!(o.overlaps_rect(Rect::new(58.0, 58.0, 70.0, 70.0)), "box corner");
        assert!(!o.overlaps_rect(Rect::new(60.0, 40.0, 70.0, 60.0)), "adjacent");
    }

    #[test]
    fn lens_area_matches_known_cases() {
        let a = Circle::new((0.0, 0.0), 1.0);
        assert_eq!(
            circle_intersection_area(a, Circle::new((3.0, 0.0), 1.0)),
            0.0
        );
        let contained = circle_intersection_area(a, Circle::new((0.1, 0.0), 0.5));
        assert!((contained - PI * 0.25).abs() < 1e-12, "{contained}");
        // Two unit circles one radius apart: 2π/3 − √3/2.
        let lens = circle_intersection_area(a, Circle::new((1.0, 0.0), 1.0));
        let expected = 2.0 * PI / 3.0 - 3.0_f64.sqrt() / 2.0;
        assert!((lens - expected).abs() < 1e-9, "{lens} vs {expected}");
    }

    #[test]
    fn overlap_area_of_boxes() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(rect_overlap_area(a, Rect::new(5.0, 5.0, 15.0, 15.0)), 25.0);
        assert_eq!(rect_overlap_area(a, Rect::new(20.0, 0.0, 30.0, 5.0)), 0.0);
        assert!(rect_within(Rect::new(1.0, 1.0, 9.0, 9.0), a), "inside");
    }
}
