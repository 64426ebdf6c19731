// Copyright 2025 the Plotfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic circle packing with bounded overlap.
//!
//! Circles are placed largest first. The first circle goes to a seed point;
//! every later circle is tried at positions tangent to the circles already
//! placed, sampled at a fixed angular step. A candidate is accepted when its
//! intersection with every placed circle stays within the overlap tolerance,
//! measured against the area of *both* circles. Dead ends backtrack
//! depth-first.
//!
//! The search is worst-case exponential, so it is bounded twice: each attempt
//! may expand at most `max_expanded_nodes` candidates, and a failed attempt
//! drops the smallest remaining circle and restarts, at most
//! `max_drop_retries` times. When every attempt fails the packing is empty.
//! This is an approximation with no optimality guarantee; the overlap bound is
//! the only invariant.

extern crate alloc;

use alloc::vec::Vec;
use core::f64::consts::TAU;

use kurbo::{Circle, Point, Size, Vec2};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use smallvec::{SmallVec, smallvec};

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use crate::error::{LayoutError, Result, require_non_negative, require_positive};
use crate::geometry::{EPSILON, circle_area, circle_intersection_area};
use crate::radius::RadiusScale;
use crate::shape::{PackedShape, ShapeInput};
use crate::z_order;

/// Most tangent directions one sweep may try, which bounds how small
/// [`BacktrackOptions::angle_step`] can be.
pub const MAX_DIRECTIONS: usize = 4096;

/// Order in which candidate positions are tried.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanOrder {
    /// Smallest `y` first, then smallest `x`.
    TopLeft,
    /// Closest to the canvas center first.
    CenterDistance,
    /// A seeded shuffle; the same seed gives the same packing.
    Shuffled {
        /// Random seed.
        seed: u64,
    },
}

/// Where the first (largest) circle may go.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedPoint {
    /// Tucked into the top-left corner, inset by the padding.
    InsetCorner,
    /// The canvas center.
    Center,
}

/// Tuning for [`BacktrackingPacker`].
#[derive(Clone, Debug, PartialEq)]
pub struct BacktrackOptions {
    /// Value → radius mapping.
    pub radius: RadiusScale,
    /// Largest allowed intersection area as a fraction of each circle's area.
    pub overlap_tolerance: f64,
    /// Angular step between tangent candidates, in radians.
    ///
    /// Must lie in `[TAU / MAX_DIRECTIONS, PI]`.
    pub angle_step: f64,
    /// Gap added to the tangent distance.
    pub padding: f64,
    /// How many times the smallest circle may be dropped before giving up.
    pub max_drop_retries: usize,
    /// Candidate evaluations allowed per attempt.
    pub max_expanded_nodes: usize,
    /// Candidate scan order.
    pub scan: ScanOrder,
    /// Seed points for the first circle, tried in order.
    pub seeds: SmallVec<[SeedPoint; 2]>,
}

impl Default for BacktrackOptions {
    fn default() -> Self {
        Self {
            radius: RadiusScale::default(),
            overlap_tolerance: 0.12,
            angle_step: core::f64::consts::PI / 24.0,
            padding: 2.0,
            max_drop_retries: 3,
            max_expanded_nodes: 20_000,
            scan: ScanOrder::TopLeft,
            seeds: smallvec![SeedPoint::InsetCorner, SeedPoint::Center],
        }
    }
}

impl BacktrackOptions {
    /// Sets the radius mapping.
    pub fn with_radius(mut self, radius: RadiusScale) -> Self {
        self.radius = radius;
        self
    }

    /// Sets the overlap tolerance.
    pub fn with_overlap_tolerance(mut self, tolerance: f64) -> Self {
        self.overlap_tolerance = tolerance;
        self
    }

    /// Sets the padding between tangent circles.
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    /// Sets the scan order.
    pub fn with_scan(mut self, scan: ScanOrder) -> Self {
        self.scan = scan;
        self
    }

    /// Sets the seed points for the first circle.
    pub fn with_seeds(mut self, seeds: &[SeedPoint]) -> Self {
        self.seeds = SmallVec::from_slice(seeds);
        self
    }

    /// Sets the retry and node budgets.
    pub fn with_budget(mut self, max_drop_retries: usize, max_expanded_nodes: usize) -> Self {
        self.max_drop_retries = max_drop_retries;
        self.max_expanded_nodes = max_expanded_nodes;
        self
    }
}

/// A packed circle with its paint order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PackedCircle {
    /// The positioned shape.
    pub shape: PackedShape,
    /// Paint order; later (smaller) placements draw above earlier ones.
    pub z_index: i32,
}

/// The result of [`BacktrackingPacker::pack`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Packing {
    /// Placed circles in placement order (largest first).
    pub circles: Vec<PackedCircle>,
    /// Ids of the shapes dropped to make the packing feasible.
    pub dropped: Vec<u64>,
    /// Search attempts made.
    pub attempts: usize,
    /// Candidates evaluated across all attempts.
    pub nodes_expanded: usize,
}

impl Packing {
    /// Whether nothing could be placed.
    pub fn is_empty(&self) -> bool {
        self.circles.is_empty()
    }

    /// The placed shapes, without paint order.
    pub fn shapes(&self) -> impl Iterator<Item = &PackedShape> + '_ {
        self.circles.iter().map(|c| &c.shape)
    }
}

/// One DFS level: the candidates for a circle and the next one to try.
#[derive(Debug)]
struct Frame {
    candidates: Vec<Point>,
    next: usize,
}

/// Depth-first circle packer with drop-and-retry.
#[derive(Clone, Debug)]
pub struct BacktrackingPacker {
    options: BacktrackOptions,
    directions: Vec<Vec2>,
}

impl BacktrackingPacker {
    /// Creates a packer after validating `options`.
    pub fn new(options: BacktrackOptions) -> Result<Self> {
        options.radius.validate()?;
        require_non_negative("overlap_tolerance", options.overlap_tolerance)?;
        require_positive("angle_step", options.angle_step)?;
        require_non_negative("padding", options.padding)?;
        if options.overlap_tolerance > 1.0 {
            return Err(LayoutError::InvalidOption {
                name: "overlap_tolerance",
                reason: "must be at most 1",
            });
        }
        if options.angle_step > core::f64::consts::PI {
            return Err(LayoutError::InvalidOption {
                name: "angle_step",
                reason: "must be at most pi",
            });
        }
        if TAU / options.angle_step > MAX_DIRECTIONS as f64 {
            return Err(LayoutError::InvalidOption {
                name: "angle_step",
                reason: "too small; the sweep would exceed MAX_DIRECTIONS",
            });
        }
        if options.max_expanded_nodes == 0 {
            return Err(LayoutError::InvalidOption {
                name: "max_expanded_nodes",
                reason: "must be greater than zero",
            });
        }
        if options.seeds.is_empty() {
            return Err(LayoutError::InvalidOption {
                name: "seeds",
                reason: "at least one seed point is required",
            });
        }

        #[allow(
            clippy::cast_possible_truncation,
            reason = "bounded by MAX_DIRECTIONS above"
        )]
        let steps = (TAU / options.angle_step).ceil() as usize;
        let directions = (0..steps)
            .map(|k| {
                let angle = k as f64 * options.angle_step;
                Vec2::new(angle.cos(), angle.sin())
            })
            .collect();
        Ok(Self {
            options,
            directions,
        })
    }

    /// The validated options.
    pub fn options(&self) -> &BacktrackOptions {
        &self.options
    }

    /// Packs `shapes` into a canvas spanning `(0, 0)` to `canvas`.
    ///
    /// Returns an empty packing for empty input, a degenerate canvas, or when
    /// no attempt succeeds within the retry budget.
    pub fn pack(&self, shapes: &[ShapeInput], canvas: Size) -> Packing {
        let mut packing = Packing::default();
        if shapes.is_empty() || !(canvas.width > 0.0 && canvas.height > 0.0) {
            return packing;
        }

        let values: Vec<f64> = shapes.iter().map(|s| s.value).collect();
        let radii = self.options.radius.radii(&values, canvas);
        let mut active: Vec<usize> = (0..shapes.len()).collect();
        active.sort_by(|&a, &b| {
            radii[b]
                .total_cmp(&radii[a])
                .then(shapes[b].value.total_cmp(&shapes[a].value))
                .then(a.cmp(&b))
        });

        for _ in 0..=self.options.max_drop_retries {
            if active.is_empty() {
                break;
            }
            packing.attempts += 1;
            let (result, expanded) = self.search(&active, &radii, canvas);
            packing.nodes_expanded += expanded;

            if let Some(centers) = result {
                packing.circles = active
                    .iter()
                    .zip(centers)
                    .enumerate()
                    .map(|(order, (&i, center))| PackedCircle {
                        shape: PackedShape {
                            id: shapes[i].id,
                            center,
                            radius: radii[i],
                            value: shapes[i].value,
                            group: shapes[i].group,
                            fixed: false,
                        },
                        z_index: z_order::PACKED_SHAPES
                            + i32::try_from(order).unwrap_or(i32::MAX - z_order::PACKED_SHAPES),
                    })
                    .collect();
                #[cfg(feature = "tracing")]
                tracing::trace!(
                    placed = packing.circles.len(),
                    attempts = packing.attempts,
                    nodes = packing.nodes_expanded,
                    "backtracking packing succeeded"
                );
                return packing;
            }

            if let Some(smallest) = active.pop() {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    id = shapes[smallest].id,
                    radius = radii[smallest],
                    remaining = active.len(),
                    "packing failed, dropping smallest shape and retrying"
                );
                packing.dropped.push(shapes[smallest].id);
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            attempts = packing.attempts,
            nodes = packing.nodes_expanded,
            "packing infeasible within retry budget, returning empty result"
        );
        packing.circles.clear();
        packing
    }

    /// Depth-first search over `active` (largest first). Returns the centers on
    /// success and the number of candidates evaluated.
    fn search(&self, active: &[usize], radii: &[f64], canvas: Size) -> (Option<Vec<Point>>, usize) {
        let mut placed: Vec<Circle> = Vec::with_capacity(active.len());
        let mut stack = alloc::vec![Frame {
            candidates: self.candidates(&placed, radii[active[0]], canvas),
            next: 0,
        }];
        let mut expanded = 0;

        while let Some(depth) = stack.len().checked_sub(1) {
            let radius = radii[active[depth]];
            let frame = &mut stack[depth];
            let mut accepted = None;
            while frame.next < frame.candidates.len() {
                let center = frame.candidates[frame.next];
                frame.next += 1;
                expanded += 1;
                if expanded > self.options.max_expanded_nodes {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        depth,
                        expanded,
                        "backtracking search hit its node budget"
                    );
                    return (None, expanded);
                }
                let circle = Circle::new(center, radius);
                if placed.iter().all(|p| self.within_tolerance(circle, *p)) {
                    accepted = Some(circle);
                    break;
                }
            }

            match accepted {
                Some(circle) => {
                    placed.push(circle);
                    if placed.len() == active.len() {
                        return (Some(placed.iter().map(|c| c.center).collect()), expanded);
                    }
                    let candidates = self.candidates(&placed, radii[active[placed.len()]], canvas);
                    stack.push(Frame {
                        candidates,
                        next: 0,
                    });
                }
                None => {
                    // Dead end: unplace the previous circle so it tries its next candidate.
                    stack.pop();
                    placed.pop();
                }
            }
        }
        (None, expanded)
    }

    fn candidates(&self, placed: &[Circle], radius: f64, canvas: Size) -> Vec<Point> {
        let inside = |p: &Point| {
            p.x >= radius - EPSILON
                && p.x <= canvas.width - radius + EPSILON
                && p.y >= radius - EPSILON
                && p.y <= canvas.height - radius + EPSILON
        };

        if placed.is_empty() {
            let inset = radius + self.options.padding;
            return self
                .options
                .seeds
                .iter()
                .map(|seed| match seed {
                    SeedPoint::InsetCorner => Point::new(inset, inset),
                    SeedPoint::Center => Point::new(0.5 * canvas.width, 0.5 * canvas.height),
                })
                .filter(inside)
                .collect();
        }

        let mut out: Vec<Point> = placed
            .iter()
            .flat_map(|other| {
                let distance = radius + other.radius + self.options.padding;
                self.directions
                    .iter()
                    .map(move |dir| other.center + *dir * distance)
            })
            .filter(inside)
            .collect();

        match self.options.scan {
            ScanOrder::TopLeft => {
                out.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));
            }
            ScanOrder::CenterDistance => {
                let c = Point::new(0.5 * canvas.width, 0.5 * canvas.height);
                out.sort_by(|a, b| a.distance_squared(c).total_cmp(&b.distance_squared(c)));
            }
            ScanOrder::Shuffled { seed } => {
                let mut rng = SmallRng::seed_from_u64(seed ^ placed.len() as u64);
                out.shuffle(&mut rng);
            }
        }
        out
    }

    fn within_tolerance(&self, a: Circle, b: Circle) -> bool {
        let shared = circle_intersection_area(a, b);
        if shared <= 0.0 {
            return true;
        }
        let tol = self.options.overlap_tolerance;
        shared <= tol * circle_area(a.radius) + EPSILON && shared <= tol * circle_area(b.radius) + EPSILON
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    fn fixed_radius(r: f64) -> RadiusScale {
        RadiusScale::default().with_radius_range(r, r)
    }

    fn assert_within_tolerance(packing: &Packing, tol: f64) {
        for (i, a) in packing.circles.iter().enumerate() {
            for b in &packing.circles[i + 1..] {
                let shared = circle_intersection_area(a.shape.circle(), b.shape.circle());
                assert!(
                    shared <= tol * circle_area(a.shape.radius) + 1e-6
                        && shared <= tol * circle_area(b.shape.radius) + 1e-6,
                    "{a:?} and {b:?} overlap by {shared}"
                );
            }
        }
    }

    #[test]
    fn empty_inputs_give_empty_packings() {
        let packer = BacktrackingPacker::new(BacktrackOptions::default()).unwrap();
        assert!(packer.pack(&[], Size::new(100.0, 100.0)).is_empty(), "no shapes");
        assert!(
            packer.pack(&[ShapeInput::new(1, 1.0)], Size::new(100.0, 0.0)).is_empty(),
            "zero-height canvas"
        );
    }

    #[test]
    fn circles_stay_in_bounds_and_within_tolerance() {
        let shapes: Vec<ShapeInput> = (0..9).map(|i| ShapeInput::new(i, 1.0 + i as f64)).collect();
        let canvas = Size::new(400.0, 300.0);
        for scan in [
            ScanOrder::TopLeft,
            ScanOrder::CenterDistance,
            ScanOrder::Shuffled { seed: 7 },
        ] {
            let packer = BacktrackingPacker::new(
                BacktrackOptions::default()
                    .with_radius(RadiusScale::default().with_max_area_fraction(0.35))
                    .with_scan(scan),
            )
            .unwrap();
            let packing = packer.pack(&shapes, canvas);
            assert!(!packing.is_empty(), "{scan:?} should pack");
            assert_within_tolerance(&packing, 0.12);
            for s in packing.shapes() {
                assert!(
                    s.center.x >= s.radius - 1e-6
                        && s.center.x <= canvas.width - s.radius + 1e-6
                        && s.center.y >= s.radius - 1e-6
                        && s.center.y <= canvas.height - s.radius + 1e-6,
                    "{s:?} escapes the canvas"
                );
            }
        }
    }

    #[test]
    fn later_placements_draw_above_earlier_ones() {
        let shapes = [ShapeInput::new(1, 1.0), ShapeInput::new(2, 9.0), ShapeInput::new(3, 4.0)];
        let packer = BacktrackingPacker::new(BacktrackOptions::default()).unwrap();
        let packing = packer.pack(&shapes, Size::new(500.0, 500.0));
        let ids: Vec<u64> = packing.shapes().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 3, 1], "largest first");
        let z: Vec<i32> = packing.circles.iter().map(|c| c.z_index).collect();
        assert!(z.windows(2).all(|w| w[0] < w[1]), "{z:?}");
    }

    #[test]
    fn drops_the_smallest_shape_until_feasible() {
        // Only two circles of radius 40 fit in a 100 x 170 canvas.
        let shapes = [ShapeInput::new(10, 3.0), ShapeInput::new(11, 2.0), ShapeInput::new(12, 1.0)];
        let packer = BacktrackingPacker::new(BacktrackOptions::default().with_radius(fixed_radius(40.0))).unwrap();
        let packing = packer.pack(&shapes, Size::new(100.0, 170.0));
        assert_eq!(packing.circles.len(), 2, "{packing:?}");
        assert_eq!(packing.dropped, vec![12]);
        assert_eq!(packing.attempts, 2);
        assert_within_tolerance(&packing, 0.12);
    }

    #[test]
    fn gives_up_with_an_empty_packing() {
        let shapes: Vec<ShapeInput> = (0..6).map(|i| ShapeInput::new(i, 1.0)).collect();
        let packer = BacktrackingPacker::new(
            BacktrackOptions::default()
                .with_radius(fixed_radius(40.0))
                .with_budget(2, 20_000),
        )
        .unwrap();
        let packing = packer.pack(&shapes, Size::new(100.0, 100.0));
        assert!(packing.is_empty(), "{packing:?}");
        assert_eq!(packing.attempts, 3);
        assert_eq!(packing.dropped.len(), 3);
    }

    #[test]
    fn node_budget_bounds_the_search() {
        let shapes: Vec<ShapeInput> = (0..6).map(|i| ShapeInput::new(i, 1.0)).collect();
        let packer = BacktrackingPacker::new(
            BacktrackOptions::default()
                .with_radius(fixed_radius(40.0))
                .with_budget(0, 5),
        )
        .unwrap();
        let packing = packer.pack(&shapes, Size::new(100.0, 100.0));
        assert!(packing.is_empty(), "{packing:?}");
        assert!(packing.nodes_expanded <= 6, "{packing:?}");
    }

    #[test]
    fn shuffled_scan_is_reproducible() {
        let shapes: Vec<ShapeInput> = (0..6).map(|i| ShapeInput::new(i, 2.0 + i as f64)).collect();
        let packer = BacktrackingPacker::new(
            BacktrackOptions::default().with_scan(ScanOrder::Shuffled { seed: 42 }),
        )
        .unwrap();
        let a = packer.pack(&shapes, Size::new(400.0, 400.0));
        let b = packer.pack(&shapes, Size::new(400.0, 400.0));
        assert_eq!(a, b, "same seed, same packing");
    }

    #[test]
    fn invalid_options_are_rejected() {
        let bad = [
            BacktrackOptions::default().with_overlap_tolerance(-0.1),
            BacktrackOptions::default().with_overlap_tolerance(1.5),
            BacktrackOptions {
                angle_step: 0.0,
                ..BacktrackOptions::default()
            },
            BacktrackOptions::default().with_seeds(&[]),
            BacktrackOptions::default().with_budget(1, 0),
        ];
        for options in bad {
            assert!(BacktrackingPacker::new(options.clone()).is_err(), "{options:?}");
        }
    }

    #[test]
    fn angle_steps_finer_than_the_direction_cap_are_rejected() {
        let err = BacktrackingPacker::new(BacktrackOptions {
            angle_step: 1e-300,
            ..BacktrackOptions::default()
        })
        .unwrap_err();
        assert!(
            matches!(err, LayoutError::InvalidOption { name: "angle_step", .. }),
            "unexpected error {err:?}"
        );

        let finest = BacktrackingPacker::new(BacktrackOptions {
            angle_step: TAU / MAX_DIRECTIONS as f64,
            ..BacktrackOptions::default()
        })
        .unwrap();
        assert!(
            finest.directions.len() <= MAX_DIRECTIONS,
            "{} directions",
            finest.directions.len()
        );
    }
}
