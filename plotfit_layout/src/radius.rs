// Copyright 2025 the Plotfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Area-preserving value → radius mapping for packed shapes.

extern crate alloc;

use alloc::vec::Vec;
use core::f64::consts::PI;

use kurbo::Size;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use crate::error::{LayoutError, Result, require_non_negative, require_positive};

/// Maps values to circle radii so that area is proportional to value.
///
/// Radii start as `sqrt(value / max_value) * max_radius`. If the circles would
/// cover more than `max_area_fraction` of the canvas, every radius is scaled by
/// the same factor to bring the total back under budget. Finally radii are
/// clamped to `[min_radius, max_radius]`, with the upper bound also capped at
/// half the canvas's shorter side so any circle fits the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadiusScale {
    /// Smallest radius handed out, so tiny values stay visible.
    pub min_radius: f64,
    /// Radius of the largest value before area rescaling.
    pub max_radius: f64,
    /// Upper bound on the fraction of the canvas the circles may cover.
    pub max_area_fraction: f64,
}

impl Default for RadiusScale {
    fn default() -> Self {
        Self {
            min_radius: 4.0,
            max_radius: 120.0,
            max_area_fraction: 0.5,
        }
    }
}

impl RadiusScale {
    /// Sets the radius bounds.
    pub fn with_radius_range(mut self, min_radius: f64, max_radius: f64) -> Self {
        self.min_radius = min_radius;
        self.max_radius = max_radius;
        self
    }

    /// Sets the area budget as a fraction of the canvas.
    pub fn with_max_area_fraction(mut self, fraction: f64) -> Self {
        self.max_area_fraction = fraction;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        require_non_negative("min_radius", self.min_radius)?;
        require_positive("max_radius", self.max_radius)?;
        require_positive("max_area_fraction", self.max_area_fraction)?;
        if self.min_radius > self.max_radius {
            return Err(LayoutError::InvalidOption {
                name: "min_radius",
                reason: "must not exceed max_radius",
            });
        }
        if self.max_area_fraction > 1.0 {
            return Err(LayoutError::InvalidOption {
                name: "max_area_fraction",
                reason: "must be at most 1",
            });
        }
        Ok(())
    }

    /// The largest radius any circle may have on `canvas`.
    pub fn radius_cap(&self, canvas: Size) -> f64 {
        self.max_radius
            .min(0.5 * canvas.width.min(canvas.height))
            .max(0.0)
    }

    /// Computes one radius per value.
    ///
    /// Non-finite or non-positive values get `min_radius`.
    pub fn radii(&self, values: &[f64], canvas: Size) -> Vec<f64> {
        let max_value = values
            .iter()
            .copied()
            .filter(|v| v.is_finite() && *v > 0.0)
            .fold(0.0, f64::max);
        let mut radii: Vec<f64> = values
            .iter()
            .map(|&v| {
                if max_value > 0.0 && v.is_finite() && v > 0.0 {
                    (v / max_value).sqrt() * self.max_radius
                } else {
                    0.0
                }
            })
            .collect();

        let budget = self.max_area_fraction * canvas.width.max(0.0) * canvas.height.max(0.0);
        let total: f64 = radii.iter().map(|r| PI * r * r).sum();
        if total > budget && total > 0.0 {
            let k = (budget / total).sqrt();
            for r in &mut radii {
                *r *= k;
            }
        }

        let cap = self.radius_cap(canvas);
        let floor = self.min_radius.min(cap);
        for r in &mut radii {
            *r = r.clamp(floor, cap);
        }
        radii
    }
}
