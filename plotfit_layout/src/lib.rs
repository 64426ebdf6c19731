// Copyright 2025 the Plotfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adaptive label layout and proportional circle packing for charts.
//!
//! This crate is the geometry engine underneath chart assembly. It does not
//! draw anything; it answers "where does this go?" for the parts of a chart
//! that are hard to place by hand:
//! - **Text fitting** ([`TextFitter`]): shrink, truncate and wrap text against
//!   an injected [`TextMeasurer`](plotfit_text::TextMeasurer).
//! - **Label placement**: same-height labels along an axis
//!   ([`SequentialLabelPlacer`]), labels inside pie/donut segments
//!   ([`RadialLabelSearch`]), and labels around scatter points
//!   ([`PointLabelPlacer`]).
//! - **Circle packing**: circles whose area encodes a value, either relaxed by
//!   a force simulation ([`ForceLayout`]) or placed deterministically with a
//!   bounded overlap guarantee ([`BacktrackingPacker`]).
//!
//! Packer output converts into [`Obstacle`]s so labels can avoid it.
//!
//! Everything here is synchronous and pure. Separate renders may run on
//! separate threads as long as each one owns its own text measurer.
//!
//! ## Features
//!
//! - `std`: use the standard library's float math.
//! - `libm` (default): use `libm` for float math in `no_std` builds.
//! - `tracing`: emit `tracing` events when a placer falls back or a packer
//!   drops shapes.

#![no_std]

extern crate alloc;

mod backtrack;
mod error;
#[cfg(not(feature = "std"))]
mod float;
mod force;
mod geometry;
mod label;
mod point_label;
mod radial;
mod radius;
mod sequential;
mod shape;
mod text_fit;
pub mod z_order;

pub use backtrack::{
    BacktrackOptions, BacktrackingPacker, MAX_DIRECTIONS, PackedCircle, Packing, ScanOrder, SeedPoint,
};
pub use error::{LayoutError, Result};
pub use force::{ForceLayout, ForceLayoutOptions, ForceTargets};
pub use geometry::{Obstacle, circle_intersection_area, rects_overlap};
pub use label::{PlacedLabel, TextAnchor, TextBaseline, label_rect};
pub use point_label::{LabelCandidate, PointLabelOptions, PointLabelPlacer, ScatterPoint};
pub use radial::{
    RadialLabelSearch, RadialLabelSpec, RadialPlacement, RadialSearchOptions, RadialStrategy,
};
pub use radius::RadiusScale;
pub use sequential::{
    LabelSlot, MAX_GRID_CELLS, SequentialLabelPlacer, SequentialLabelSpec, SequentialLayout,
};
pub use shape::{PackedShape, ShapeInput};
pub use text_fit::{ELLIPSIS, TextBox, TextFitter};
