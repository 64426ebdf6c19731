// Copyright 2025 the Plotfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Same-height labels along one axis, placed by dynamic programming.
//!
//! Typical use is the column of series labels at the end of a line chart: each
//! label wants to sit centered on its line's last value, labels must not
//! overlap each other, and some bands (tick marks, an annotation) are off
//! limits.
//!
//! The usable extent is discretized into cells of `grid_size`. Label tops snap
//! to cell boundaries, and consecutive labels keep at least
//! `ceil(label_height / grid_size)` cells between their tops, so accepted slots
//! never overlap. Among all such assignments the placer picks the one with the
//! smallest total absolute displacement from the desired tops.
//!
//! When no assignment exists (too many labels for the strip, or obstacles in
//! the way) the placer falls back to `position + fallback_offset`, clamped to
//! the extent, and reports `feasible = false`. Those slots may overlap.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use crate::error::{LayoutError, Result, require_positive};
use crate::geometry::EPSILON;

/// Most grid cells a placer will allocate for one layout.
pub const MAX_GRID_CELLS: usize = 1 << 20;

/// Inputs shared by every label in one sequential layout.
#[derive(Clone, Debug, PartialEq)]
pub struct SequentialLabelSpec {
    /// Height of every label.
    pub label_height: f64,
    /// Cell size of the placement grid.
    pub grid_size: f64,
    /// Usable `(start, end)` range along the axis.
    pub extent: (f64, f64),
    /// `(start, end)` bands no label may overlap.
    pub forbidden: Vec<(f64, f64)>,
    /// Offset from the point to the label top in the greedy fallback.
    ///
    /// `None` centers the label on its point.
    pub fallback_offset: Option<f64>,
}

impl SequentialLabelSpec {
    /// Creates a spec with no forbidden bands.
    pub fn new(label_height: f64, grid_size: f64, extent: (f64, f64)) -> Self {
        Self {
            label_height,
            grid_size,
            extent,
            forbidden: Vec::new(),
            fallback_offset: None,
        }
    }

    /// Adds a band no label may overlap.
    pub fn with_forbidden(mut self, start: f64, end: f64) -> Self {
        self.forbidden.push((start.min(end), start.max(end)));
        self
    }

    /// Sets the greedy fallback offset.
    pub fn with_fallback_offset(mut self, offset: f64) -> Self {
        self.fallback_offset = Some(offset);
        self
    }
}

/// Where one label ended up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelSlot {
    /// Top edge of the label.
    pub top: f64,
    /// `top` minus the desired top.
    pub displacement: f64,
}

impl LabelSlot {
    /// The `(top, bottom)` span of a label of `height`.
    pub fn span(&self, height: f64) -> (f64, f64) {
        (self.top, self.top + height)
    }
}

/// Result of [`SequentialLabelPlacer::place`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SequentialLayout {
    /// One slot per input position, in input order.
    pub slots: Vec<LabelSlot>,
    /// Sum of absolute displacements.
    pub cost: f64,
    /// Whether the slots came from the non-overlapping assignment.
    pub feasible: bool,
}

/// Places same-height labels along one axis.
#[derive(Clone, Debug)]
pub struct SequentialLabelPlacer {
    spec: SequentialLabelSpec,
}

impl SequentialLabelPlacer {
    /// Creates a placer after validating `spec`.
    pub fn new(spec: SequentialLabelSpec) -> Result<Self> {
        require_positive("label_height", spec.label_height)?;
        require_positive("grid_size", spec.grid_size)?;
        let (start, end) = spec.extent;
        if !(start.is_finite() && end.is_finite() && start <= end) {
            return Err(LayoutError::InvalidOption {
                name: "extent",
                reason: "must be a finite range with start <= end",
            });
        }
        if spec
            .forbidden
            .iter()
            .any(|(a, b)| !(a.is_finite() && b.is_finite()))
        {
            return Err(LayoutError::InvalidOption {
                name: "forbidden",
                reason: "bands must be finite",
            });
        }
        if spec.fallback_offset.is_some_and(|o| !o.is_finite()) {
            return Err(LayoutError::InvalidOption {
                name: "fallback_offset",
                reason: "must be finite",
            });
        }
        if (end - start) / spec.grid_size >= MAX_GRID_CELLS as f64 {
            return Err(LayoutError::InvalidOption {
                name: "grid_size",
                reason: "too small for the extent; the grid would exceed MAX_GRID_CELLS",
            });
        }
        Ok(Self { spec })
    }

    /// The validated spec.
    pub fn spec(&self) -> &SequentialLabelSpec {
        &self.spec
    }

    /// Places one label per entry of `positions` (the point each label belongs to).
    pub fn place(&self, positions: &[f64]) -> SequentialLayout {
        if positions.is_empty() {
            return SequentialLayout {
                feasible: true,
                ..SequentialLayout::default()
            };
        }

        let (start, _) = self.spec.extent;
        let half = 0.5 * self.spec.label_height;
        let mut order: Vec<usize> = (0..positions.len()).collect();
        let position = |i: usize| {
            let p = positions[i];
            if p.is_finite() { p } else { start + half }
        };
        order.sort_by(|&a, &b| position(a).total_cmp(&position(b)).then(a.cmp(&b)));
        let desired: Vec<f64> = order.iter().map(|&i| position(i) - half).collect();

        match self.solve(&desired) {
            Some(cells) => {
                let mut slots = vec![
                    LabelSlot {
                        top: 0.0,
                        displacement: 0.0,
                    };
                    positions.len()
                ];
                let mut cost = 0.0;
                for (k, &i) in order.iter().enumerate() {
                    let top = self.cell_top(cells[k]);
                    let displacement = top - desired[k];
                    cost += displacement.abs();
                    slots[i] = LabelSlot { top, displacement };
                }
                #[cfg(feature = "tracing")]
                tracing::trace!(labels = positions.len(), cost, "sequential labels placed");
                SequentialLayout {
                    slots,
                    cost,
                    feasible: true,
                }
            }
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    labels = positions.len(),
                    "no non-overlapping label assignment, falling back to greedy placement"
                );
                self.greedy(positions, &position)
            }
        }
    }

    fn cell_top(&self, cell: usize) -> f64 {
        self.spec.extent.0 + cell as f64 * self.spec.grid_size
    }

    fn cell_count(&self) -> usize {
        let (start, end) = self.spec.extent;
        let room = end - start - self.spec.label_height;
        if room < -EPSILON {
            return 0;
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "non-negative and floored; saturates for absurd grids"
        )]
        let cells = ((room.max(0.0) + EPSILON) / self.spec.grid_size).floor() as usize;
        cells.saturating_add(1)
    }

    fn blocked(&self, top: f64) -> bool {
        let bottom = top + self.spec.label_height;
        self.spec
            .forbidden
            .iter()
            .any(|&(a, b)| top < b - EPSILON && a < bottom - EPSILON)
    }

    /// Minimum-cost cell per label (in sorted order), or `None` when infeasible.
    fn solve(&self, desired: &[f64]) -> Option<Vec<usize>> {
        let cells = self.cell_count();
        let n = desired.len();
        #[allow(
            clippy::cast_possible_truncation,
            reason = "positive and rounded up; saturates for absurd grids"
        )]
        let clearance = ((self.spec.label_height - EPSILON) / self.spec.grid_size)
            .ceil()
            .max(1.0) as usize;
        if cells == 0 || (n - 1).saturating_mul(clearance) >= cells {
            return None;
        }

        let open: Vec<bool> = (0..cells).map(|c| !self.blocked(self.cell_top(c))).collect();
        let mut cost: Vec<f64> = (0..cells)
            .map(|c| {
                if open[c] {
                    (self.cell_top(c) - desired[0]).abs()
                } else {
                    f64::INFINITY
                }
            })
            .collect();
        // parents[i - 1][c]: best cell for label i - 1 when label i sits at c.
        let mut parents: Vec<Vec<usize>> = Vec::with_capacity(n.saturating_sub(1));

        for &want in &desired[1..] {
            // Running minimum of the previous row over cells 0..=c.
            let mut best = Vec::with_capacity(cells);
            let mut running = (f64::INFINITY, 0);
            for (c, &v) in cost.iter().enumerate() {
                if v < running.0 {
                    running = (v, c);
                }
                best.push(running);
            }

            let mut next = vec![f64::INFINITY; cells];
            let mut parent = vec![0; cells];
            for c in clearance..cells {
                if !open[c] {
                    continue;
                }
                let (prev, from) = best[c - clearance];
                if prev.is_finite() {
                    next[c] = prev + (self.cell_top(c) - want).abs();
                    parent[c] = from;
                }
            }
            parents.push(parent);
            cost = next;
        }

        let (mut cell, total) = cost
            .iter()
            .enumerate()
            .fold((0, f64::INFINITY), |acc, (c, &v)| if v < acc.1 { (c, v) } else { acc });
        if !total.is_finite() {
            return None;
        }

        let mut cells_out = vec![0; n];
        cells_out[n - 1] = cell;
        for i in (1..n).rev() {
            cell = parents[i - 1][cell];
            cells_out[i - 1] = cell;
        }
        Some(cells_out)
    }

    fn greedy(&self, positions: &[f64], position: &impl Fn(usize) -> f64) -> SequentialLayout {
        let (start, end) = self.spec.extent;
        let h = self.spec.label_height;
        let offset = self.spec.fallback_offset.unwrap_or(-0.5 * h);
        let last_top = (end - h).max(start);
        let mut cost = 0.0;
        let slots = (0..positions.len())
            .map(|i| {
                let p = position(i);
                let top = (p + offset).clamp(start, last_top);
                let displacement = top - (p - 0.5 * h);
                cost += displacement.abs();
                LabelSlot { top, displacement }
            })
            .collect();
        SequentialLayout {
            slots,
            cost,
            feasible: false,
        }
    }
}
