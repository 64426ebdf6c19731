// Copyright 2025 the Plotfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Placed label records handed to renderers.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Rect, Size};

/// Horizontal text anchor, in SVG `text-anchor` terms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextAnchor {
    /// `position.x` is the left edge of the text.
    Start,
    /// `position.x` is the horizontal center of the text.
    Middle,
    /// `position.x` is the right edge of the text.
    End,
}

/// Vertical alignment of the text block relative to `position.y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextBaseline {
    /// `position.y` is the top of the block.
    Top,
    /// `position.y` is the vertical center of the block.
    Middle,
    /// `position.y` is the bottom of the block.
    Bottom,
}

/// The box covered by a block of `size` anchored at `position`.
pub fn label_rect(position: Point, size: Size, anchor: TextAnchor, baseline: TextBaseline) -> Rect {
    let x0 = match anchor {
        TextAnchor::Start => position.x,
        TextAnchor::Middle => position.x - 0.5 * size.width,
        TextAnchor::End => position.x - size.width,
    };
    let y0 = match baseline {
        TextBaseline::Top => position.y,
        TextBaseline::Middle => position.y - 0.5 * size.height,
        TextBaseline::Bottom => position.y - size.height,
    };
    Rect::new(x0, y0, x0 + size.width, y0 + size.height)
}

/// A label with its final position.
///
/// When `can_show` is false the placement is a best-effort fallback that may
/// overlap other content; callers decide whether to hide, dim, or keep it.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedLabel {
    /// Anchor position.
    pub position: Point,
    /// Horizontal anchor at `position`.
    pub anchor: TextAnchor,
    /// Vertical alignment at `position`.
    pub baseline: TextBaseline,
    /// Font size the lines were fitted at.
    pub font_size_px: f64,
    /// The source text.
    pub text: String,
    /// The lines to draw, top to bottom.
    pub lines: Vec<String>,
    /// The box the label covers.
    pub bounds: Rect,
    /// Whether the placement is free of overlaps.
    pub can_show: bool,
}
