// Copyright 2025 the Plotfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Force-directed relaxation for bubble charts.
//!
//! This is a small, deterministic cousin of d3-force: many-body repulsion,
//! pairwise collision, attraction to a center and optional per-group
//! clustering, integrated with velocity decay and a cooling `alpha`.
//!
//! The simulation always runs a fixed iteration budget. There is no
//! convergence check, so residual overlap is possible and accepted; callers
//! needing a hard overlap bound should use
//! [`BacktrackingPacker`](crate::BacktrackingPacker) instead.

extern crate alloc;

use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::{Point, Size, Vec2};

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use crate::error::{LayoutError, Result, require_non_negative, require_positive};
use crate::radius::RadiusScale;
use crate::shape::{PackedShape, ShapeInput};

/// Angle between consecutive seeds on the initial spiral.
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// Tuning for [`ForceLayout`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceLayoutOptions {
    /// Value → radius mapping.
    pub radius: RadiusScale,
    /// Main simulation iterations.
    pub iterations: usize,
    /// Extra iterations after the pinned shape is released.
    pub settle_iterations: usize,
    /// Minimum gap between circles enforced by collision.
    pub padding: f64,
    /// Pull toward the global center.
    pub center_strength: f64,
    /// Inverse-distance repulsion between every pair.
    pub many_body_strength: f64,
    /// Fraction of each overlap resolved per iteration, in `[0, 1]`.
    pub collision_strength: f64,
    /// Pull toward each shape's group center. Zero disables clustering.
    pub cluster_strength: f64,
    /// Repulsion multiplier for pairs from different groups.
    pub cross_group_repulsion: f64,
    /// Fraction of velocity lost per iteration, in `[0, 1)`.
    pub velocity_decay: f64,
    /// `alpha` reached at the end of the main iterations.
    pub alpha_min: f64,
    /// Unpin the largest shape after the main iterations.
    pub release_pinned: bool,
}

impl Default for ForceLayoutOptions {
    fn default() -> Self {
        Self {
            radius: RadiusScale::default(),
            iterations: 200,
            settle_iterations: 40,
            padding: 2.0,
            center_strength: 0.04,
            many_body_strength: 30.0,
            collision_strength: 0.7,
            cluster_strength: 0.12,
            cross_group_repulsion: 2.0,
            velocity_decay: 0.4,
            alpha_min: 0.001,
            release_pinned: true,
        }
    }
}

impl ForceLayoutOptions {
    /// Sets the radius mapping.
    pub fn with_radius(mut self, radius: RadiusScale) -> Self {
        self.radius = radius;
        self
    }

    /// Sets the main and settle iteration budgets.
    pub fn with_iterations(mut self, iterations: usize, settle_iterations: usize) -> Self {
        self.iterations = iterations;
        self.settle_iterations = settle_iterations;
        self
    }

    /// Sets the collision padding.
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    /// Sets the clustering strength.
    pub fn with_cluster_strength(mut self, cluster_strength: f64) -> Self {
        self.cluster_strength = cluster_strength;
        self
    }

    /// Sets whether the initially pinned shape is released for a settle pass.
    pub fn with_release_pinned(mut self, release_pinned: bool) -> Self {
        self.release_pinned = release_pinned;
        self
    }
}

/// Attraction targets for [`ForceLayout::layout`].
#[derive(Clone, Debug, Default)]
pub struct ForceTargets {
    /// Global center; defaults to the canvas center.
    pub center: Option<Point>,
    /// Per-group centers. Groups without an entry are pulled toward their
    /// current centroid instead.
    pub groups: HashMap<u32, Point>,
}

#[derive(Clone, Copy, Debug)]
struct Node {
    pos: Point,
    vel: Vec2,
    radius: f64,
    group: Option<u32>,
    pinned: bool,
}

/// Approximate non-overlapping placement of variable-radius circles.
#[derive(Clone, Debug)]
pub struct ForceLayout {
    options: ForceLayoutOptions,
}

impl ForceLayout {
    /// Creates a layout after validating `options`.
    pub fn new(options: ForceLayoutOptions) -> Result<Self> {
        options.radius.validate()?;
        require_non_negative("padding", options.padding)?;
        require_non_negative("center_strength", options.center_strength)?;
        require_non_negative("many_body_strength", options.many_body_strength)?;
        require_non_negative("collision_strength", options.collision_strength)?;
        require_non_negative("cluster_strength", options.cluster_strength)?;
        require_non_negative("cross_group_repulsion", options.cross_group_repulsion)?;
        require_non_negative("velocity_decay", options.velocity_decay)?;
        require_positive("alpha_min", options.alpha_min)?;
        if options.collision_strength > 1.0 || options.velocity_decay >= 1.0 || options.alpha_min >= 1.0 {
            return Err(LayoutError::InvalidOption {
                name: "collision_strength/velocity_decay/alpha_min",
                reason: "must be below 1",
            });
        }
        Ok(Self { options })
    }

    /// The validated options.
    pub fn options(&self) -> &ForceLayoutOptions {
        &self.options
    }

    /// Positions `shapes` inside a canvas spanning `(0, 0)` to `canvas`.
    ///
    /// Output is in input order. Every shape that is not pinned at the end has
    /// its center inside `[radius, extent - radius]` on both axes.
    pub fn layout(&self, shapes: &[ShapeInput], canvas: Size, targets: &ForceTargets) -> Vec<PackedShape> {
        if shapes.is_empty() || !(canvas.width > 0.0 && canvas.height > 0.0) {
            return Vec::new();
        }

        let values: Vec<f64> = shapes.iter().map(|s| s.value).collect();
        let radii = self.options.radius.radii(&values, canvas);
        let center = targets
            .center
            .unwrap_or(Point::new(0.5 * canvas.width, 0.5 * canvas.height));
        let mut nodes = self.seed(shapes, &radii, center, canvas);

        let opts = &self.options;
        let mut alpha = 1.0;
        let decay = if opts.iterations > 0 {
            1.0 - opts.alpha_min.powf(1.0 / opts.iterations as f64)
        } else {
            0.0
        };
        for _ in 0..opts.iterations {
            alpha -= alpha * decay;
            self.tick(&mut nodes, alpha, center, targets, canvas);
        }

        if opts.release_pinned && opts.settle_iterations > 0 {
            for n in &mut nodes {
                n.pinned = false;
            }
            let mut alpha = 0.1_f64.max(alpha);
            for _ in 0..opts.settle_iterations {
                alpha *= 0.9;
                self.tick(&mut nodes, alpha, center, targets, canvas);
            }
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(
            shapes = nodes.len(),
            iterations = opts.iterations,
            settle_iterations = opts.settle_iterations,
            "force layout finished"
        );

        shapes
            .iter()
            .zip(&nodes)
            .map(|(s, n)| PackedShape {
                id: s.id,
                center: n.pos,
                radius: n.radius,
                value: s.value,
                group: s.group,
                fixed: n.pinned,
            })
            .collect()
    }

    /// Pins the largest shape at the center and lays the rest out on an
    /// expanding spiral around it, largest first.
    fn seed(&self, shapes: &[ShapeInput], radii: &[f64], center: Point, canvas: Size) -> Vec<Node> {
        let mut nodes: Vec<Node> = shapes
            .iter()
            .zip(radii)
            .map(|(s, &radius)| Node {
                pos: center,
                vel: Vec2::ZERO,
                radius,
                group: s.group,
                pinned: false,
            })
            .collect();

        let mut order: Vec<usize> = (0..nodes.len()).collect();
        order.sort_by(|&a, &b| radii[b].total_cmp(&radii[a]).then(a.cmp(&b)));

        let largest = order[0];
        let anchor_radius = radii[largest];
        nodes[largest].pinned = true;
        nodes[largest].pos = clamp_center(center, anchor_radius, canvas);

        let spacing = radii.iter().sum::<f64>() / radii.len() as f64;
        for (k, &i) in order.iter().enumerate().skip(1) {
            let distance = anchor_radius
                + radii[i]
                + self.options.padding
                + spacing * (k as f64).sqrt();
            let angle = k as f64 * GOLDEN_ANGLE;
            let p = nodes[largest].pos + Vec2::new(angle.cos(), angle.sin()) * distance;
            nodes[i].pos = clamp_center(p, radii[i], canvas);
        }
        nodes
    }

    fn tick(&self, nodes: &mut [Node], alpha: f64, center: Point, targets: &ForceTargets, canvas: Size) {
        let opts = &self.options;
        let n = nodes.len();

        // Many-body repulsion, stronger across groups.
        for i in 0..n {
            for j in (i + 1)..n {
                let (dir, d) = separation(nodes[i].pos, nodes[j].pos, i, j);
                let mut strength = opts.many_body_strength;
                if let (Some(a), Some(b)) = (nodes[i].group, nodes[j].group)
                    && a != b
                {
                    strength *= opts.cross_group_repulsion;
                }
                let push = dir * (strength * alpha / d.max(1.0));
                nodes[i].vel -= push;
                nodes[j].vel += push;
            }
        }

        // Center and cluster attraction.
        let centroids = if opts.cluster_strength > 0.0 {
            group_centroids(nodes)
        } else {
            HashMap::new()
        };
        for node in nodes.iter_mut() {
            node.vel += (center - node.pos) * (opts.center_strength * alpha);
            if let Some(g) = node.group {
                let target = targets.groups.get(&g).or_else(|| centroids.get(&g)).copied();
                if let Some(t) = target {
                    node.vel += (t - node.pos) * (opts.cluster_strength * alpha);
                }
            }
        }

        for node in nodes.iter_mut() {
            if node.pinned {
                node.vel = Vec2::ZERO;
                continue;
            }
            node.vel *= 1.0 - opts.velocity_decay;
            node.pos += node.vel;
        }

        // Collision: push overlapping pairs apart, larger circles move less.
        for i in 0..n {
            for j in (i + 1)..n {
                let min_gap = nodes[i].radius + nodes[j].radius + opts.padding;
                let (dir, d) = separation(nodes[i].pos, nodes[j].pos, i, j);
                if d >= min_gap || (nodes[i].pinned && nodes[j].pinned) {
                    continue;
                }
                let overlap = (min_gap - d) * opts.collision_strength;
                let (ri, rj) = (nodes[i].radius, nodes[j].radius);
                let (ri2, rj2) = (ri * ri, rj * rj);
                let (wi, wj) = match (nodes[i].pinned, nodes[j].pinned) {
                    (true, _) => (0.0, 1.0),
                    (_, true) => (1.0, 0.0),
                    _ if ri2 + rj2 > 0.0 => (rj2 / (ri2 + rj2), ri2 / (ri2 + rj2)),
                    _ => (0.5, 0.5),
                };
                nodes[i].pos -= dir * (overlap * wi);
                nodes[j].pos += dir * (overlap * wj);
            }
        }

        for node in nodes.iter_mut().filter(|n| !n.pinned) {
            node.pos = clamp_center(node.pos, node.radius, canvas);
        }
    }
}

/// Unit vector from `a` to `b` and the distance between them. Coincident
/// points get a direction derived from their indices so they still separate.
fn separation(a: Point, b: Point, i: usize, j: usize) -> (Vec2, f64) {
    let delta = b - a;
    let d = delta.hypot();
    if d > 1e-9 {
        (delta / d, d)
    } else {
        let angle = (i * 31 + j * 17) as f64 * GOLDEN_ANGLE;
        (Vec2::new(angle.cos(), angle.sin()), 0.0)
    }
}

fn group_centroids(nodes: &[Node]) -> HashMap<u32, Point> {
    let mut sums: HashMap<u32, (Vec2, f64)> = HashMap::new();
    for node in nodes {
        if let Some(g) = node.group {
            let e = sums.entry(g).or_insert((Vec2::ZERO, 0.0));
            e.0 += node.pos.to_vec2();
            e.1 += 1.0;
        }
    }
    sums.into_iter()
        .map(|(g, (sum, count))| (g, (sum / count).to_point()))
        .collect()
}

/// Clamps a circle center into `[radius, extent - radius]` on both axes.
pub(crate) fn clamp_center(p: Point, radius: f64, canvas: Size) -> Point {
    let clamp = |v: f64, extent: f64| {
        let (lo, hi) = (radius, extent - radius);
        if lo <= hi { v.clamp(lo, hi) } else { 0.5 * extent }
    };
    Point::new(clamp(p.x, canvas.width), clamp(p.y, canvas.height))
}
