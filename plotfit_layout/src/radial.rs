// Copyright 2025 the Plotfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Label placement inside a pie or donut segment.
//!
//! A label normally sits at the segment's mid-angle, halfway through the label
//! band. When that box hits the segment's obstacle (usually an icon), a small
//! grid of angle offsets and radius variants is searched and the clear
//! candidate closest to the default wins. If nothing is clear the label is
//! pushed outward along the mid-angle, which always produces a position.
//!
//! Angles are in radians and follow the y-down convention: a point at angle
//! `a` and radius `r` is `center + r * (cos a, sin a)`. A segment runs from its
//! start angle in increasing angle to its end angle, so an end below the start
//! wraps past `TAU` (e.g. 350° to 20° spans 30°). Reported angles stay in the
//! start angle's frame and may exceed `TAU`.

use core::f64::consts::TAU;

use kurbo::{Point, Rect, Size, Vec2};

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use crate::error::{LayoutError, Result, require_non_negative};
use crate::geometry::{EPSILON, Obstacle, rect_overlap_area};

/// One segment's label problem.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadialLabelSpec {
    /// Center of the pie.
    pub center: Point,
    /// Segment start angle.
    pub start_angle: f64,
    /// Segment end angle; below `start_angle` means the segment crosses zero.
    pub end_angle: f64,
    /// Inner edge of the label band.
    pub inner_radius: f64,
    /// Outer edge of the label band.
    pub outer_radius: f64,
    /// Estimated label box size.
    pub label_size: Size,
    /// The region to keep clear of.
    pub obstacle: Obstacle,
}

/// Search grid settings for [`RadialLabelSearch`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadialSearchOptions {
    /// Angles sampled across the segment.
    pub angle_steps: usize,
    /// Radii sampled across the (expanded) band.
    pub radius_steps: usize,
    /// How far the band is widened on each side, as a fraction of its width.
    pub band_expansion: f64,
    /// Angle kept free at both ends of the segment.
    pub angular_margin: f64,
}

impl Default for RadialSearchOptions {
    fn default() -> Self {
        Self {
            angle_steps: 7,
            radius_steps: 5,
            band_expansion: 0.15,
            angular_margin: 0.0,
        }
    }
}

/// How a [`RadialPlacement`] was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RadialStrategy {
    /// Mid-angle, mid-band.
    Default,
    /// Best clear grid candidate.
    Searched,
    /// Pushed outward along the mid-angle.
    PushedOut,
}

/// The chosen label position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadialPlacement {
    /// Center of the label box.
    pub center: Point,
    /// The label box.
    pub bounds: Rect,
    /// Angle of `center` around the pie center.
    pub angle: f64,
    /// Distance of `center` from the pie center.
    pub radius: f64,
    /// How the placement was found.
    pub strategy: RadialStrategy,
    /// Whether `bounds` avoids the obstacle.
    pub clear: bool,
}

/// Finds a clear spot for a segment label.
#[derive(Clone, Copy, Debug, Default)]
pub struct RadialLabelSearch {
    options: RadialSearchOptions,
}

impl RadialLabelSearch {
    /// Creates a search after validating `options`.
    pub fn new(options: RadialSearchOptions) -> Result<Self> {
        if options.angle_steps == 0 || options.radius_steps == 0 {
            return Err(LayoutError::InvalidOption {
                name: "angle_steps",
                reason: "the search grid needs at least one angle and one radius",
            });
        }
        require_non_negative("band_expansion", options.band_expansion)?;
        require_non_negative("angular_margin", options.angular_margin)?;
        Ok(Self { options })
    }

    /// The validated options.
    pub fn options(&self) -> &RadialSearchOptions {
        &self.options
    }

    /// Places the label for one segment. Always returns a position.
    pub fn place(&self, spec: &RadialLabelSpec) -> RadialPlacement {
        let (start, end) = angular_span(spec.start_angle, spec.end_angle);
        let (inner, outer) = ordered(spec.inner_radius.max(0.0), spec.outer_radius.max(0.0));
        let mid_angle = 0.5 * (start + end);
        let mid_radius = 0.5 * (inner + outer);
        let at = |angle: f64, radius: f64, strategy| {
            let center = spec.center + Vec2::from_angle(angle) * radius;
            let bounds = Rect::from_center_size(center, spec.label_size);
            RadialPlacement {
                center,
                bounds,
                angle,
                radius,
                strategy,
                clear: !spec.obstacle.overlaps_rect(bounds),
            }
        };

        let default = at(mid_angle, mid_radius, RadialStrategy::Default);
        if default.clear {
            return default;
        }

        let margin = self.options.angular_margin.min(0.5 * (end - start));
        let (lo, hi) = (start + margin, end - margin);
        let expand = self.options.band_expansion * (outer - inner);
        let (r_lo, r_hi) = ((inner - expand).max(0.0), outer + expand);
        let half_span = (0.5 * (end - start)).max(EPSILON);
        let band = (r_hi - r_lo).max(EPSILON);

        let mut best: Option<(f64, RadialPlacement)> = None;
        for i in 0..self.options.angle_steps {
            let angle = lerp(lo, hi, i, self.options.angle_steps);
            for j in 0..self.options.radius_steps {
                let radius = lerp(r_lo, r_hi, j, self.options.radius_steps);
                let candidate = at(angle, radius, RadialStrategy::Searched);
                if !candidate.clear {
                    continue;
                }
                let score = (angle - mid_angle).abs() / half_span + (radius - mid_radius).abs() / band;
                if best.is_none_or(|(s, _)| score < s) {
                    best = Some((score, candidate));
                }
            }
        }
        if let Some((_, placement)) = best {
            return placement;
        }

        let label_area = spec.label_size.width * spec.label_size.height;
        let overlap_ratio = if label_area > 0.0 {
            (rect_overlap_area(default.bounds, spec.obstacle.bounding_box()) / label_area).min(1.0)
        } else {
            1.0
        };
        let obstacle_radius = spec.obstacle.radius();
        let extra = overlap_ratio
            * (spec.label_size.width.max(spec.label_size.height) + 2.0 * obstacle_radius);
        let pushed = at(
            mid_angle,
            mid_radius + 0.5 * obstacle_radius + extra,
            RadialStrategy::PushedOut,
        );
        #[cfg(feature = "tracing")]
        tracing::debug!(
            angle = mid_angle,
            radius = pushed.radius,
            clear = pushed.clear,
            "no clear radial candidate, pushing label outward"
        );
        pushed
    }
}

/// `(start, end)` with `end` unwrapped by whole turns so that `end >= start`.
fn angular_span(start: f64, end: f64) -> (f64, f64) {
    if end < start {
        (start, end + TAU * ((start - end) / TAU).ceil())
    } else {
        (start, end)
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

/// The `i`th of `n` evenly spaced samples over `[lo, hi]`; the midpoint when `n == 1`.
fn lerp(lo: f64, hi: f64, i: usize, n: usize) -> f64 {
    if n <= 1 {
        0.5 * (lo + hi)
    } else {
        lo + (hi - lo) * i as f64 / (n - 1) as f64
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use core::f64::consts::PI;

    use super::*;

    fn segment(obstacle: Obstacle) -> RadialLabelSpec {
        RadialLabelSpec {
            center: Point::new(200.0, 200.0),
            start_angle: -PI / 12.0,
            end_angle: PI / 12.0,
            inner_radius: 60.0,
            outer_radius: 120.0,
            label_size: Size::new(60.0, 14.0),
            obstacle,
        }
    }

    #[test]
    fn unobstructed_labels_use_the_default() {
        let search = RadialLabelSearch::default();
        let p = search.place(&segment(Obstacle::disc((0.0, 0.0), 5.0)));
        assert_eq!(p.strategy, RadialStrategy::Default);
        assert!(p.clear, "{p:?}");
        assert!((p.center - Point::new(290.0, 200.0)).hypot() < 1e-9, "{p:?}");
    }

    #[test]
    fn segments_crossing_zero_keep_their_short_side() {
        let spec = RadialLabelSpec {
            start_angle: 350_f64.to_radians(),
            end_angle: 20_f64.to_radians(),
            ..segment(Obstacle::disc((0.0, 0.0), 5.0))
        };
        let p = RadialLabelSearch::default().place(&spec);
        assert_eq!(p.strategy, RadialStrategy::Default);
        let mid = 5_f64.to_radians();
        assert!(
            (p.angle - (mid + TAU)).abs() < 1e-9,
            "expected the 5 degree mid-angle, got {} degrees",
            p.angle.to_degrees()
        );
        let expected = Point::new(200.0 + 90.0 * mid.cos(), 200.0 + 90.0 * mid.sin());
        assert!((p.center - expected).hypot() < 1e-9, "{p:?}");
    }

    #[test]
    fn search_moves_the_label_off_the_obstacle() {
        let obstacle = Obstacle::disc((300.0, 200.0), 10.0);
        let search = RadialLabelSearch::new(RadialSearchOptions::default()).unwrap();
        let p = search.place(&segment(obstacle));
        assert_eq!(p.strategy, RadialStrategy::Searched);
        assert!(p.clear, "{p:?}");
        assert!(!obstacle.overlaps_rect(p.bounds), "{p:?}");
        assert!(
            p.angle >= -PI / 12.0 - 1e-9 && p.angle <= PI / 12.0 + 1e-9,
            "angle {} leaves the segment",
            p.angle
        );
    }

    #[test]
    fn blocked_segments_push_the_label_outward() {
        let obstacle = Obstacle::disc((290.0, 200.0), 60.0);
        let search = RadialLabelSearch::default();
        let p = search.place(&segment(obstacle));
        assert_eq!(p.strategy, RadialStrategy::PushedOut);
        assert!(p.radius > 90.0, "{p:?}");
        assert!(p.angle.abs() < 1e-12, "pushed along the mid-angle: {p:?}");
        // Full overlap: 90 + 30 + (60 + 120).
        assert!((p.radius - 300.0).abs() < 1e-9, "{p:?}");
        assert!(p.clear, "{p:?}");
    }

    #[test]
    fn empty_search_grid_is_rejected() {
        let options = RadialSearchOptions {
            angle_steps: 0,
            ..RadialSearchOptions::default()
        };
        assert!(RadialLabelSearch::new(options).is_err(), "zero angle steps");
    }
}
