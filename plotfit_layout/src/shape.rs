// Copyright 2025 the Plotfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Packer inputs and outputs.

use kurbo::{Circle, Point};

use crate::geometry::Obstacle;

/// One data row to be drawn as a circle whose area encodes `value`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeInput {
    /// Caller-chosen identifier, carried through to the output.
    pub id: u64,
    /// The encoded value.
    pub value: f64,
    /// Optional cluster key.
    pub group: Option<u32>,
}

impl ShapeInput {
    /// Creates an ungrouped shape.
    pub fn new(id: u64, value: f64) -> Self {
        Self {
            id,
            value,
            group: None,
        }
    }

    /// Assigns the shape to a cluster.
    pub fn with_group(mut self, group: u32) -> Self {
        self.group = Some(group);
        self
    }
}

/// A circle positioned by one of the packers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PackedShape {
    /// Identifier from the matching [`ShapeInput`].
    pub id: u64,
    /// Circle center.
    pub center: Point,
    /// Circle radius.
    pub radius: f64,
    /// The encoded value.
    pub value: f64,
    /// Cluster key from the input.
    pub group: Option<u32>,
    /// Whether the shape was pinned when layout finished.
    pub fixed: bool,
}

impl PackedShape {
    /// The shape as a circle.
    pub fn circle(&self) -> Circle {
        Circle::new(self.center, self.radius)
    }

    /// The shape as a label obstacle.
    pub fn as_obstacle(&self) -> Obstacle {
        Obstacle::Disc(self.circle())
    }
}
