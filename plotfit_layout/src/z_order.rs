// Copyright 2025 the Plotfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Suggested z-order conventions for engine output.
//!
//! The packers stamp a `z_index` on their circles, and renderers sort by
//! `(z_index, id)` for a deterministic tie-break. Packed circles count up from
//! [`PACKED_SHAPES`] in placement order, so keep the other layers well above
//! the number of circles you expect to draw.

/// Packed circles. The `n`th placed circle gets `PACKED_SHAPES + n`.
pub const PACKED_SHAPES: i32 = 0;

/// Icons and other fixed obstacles inside segments or bubbles.
pub const OBSTACLES: i32 = 10_000;

/// Labels placed as a best-effort fallback (`can_show == false`).
pub const FALLBACK_LABELS: i32 = 20_000;

/// Labels placed without overlap.
pub const LABELS: i32 = 30_000;

/// The z-index a renderer should use for a label.
pub fn label_z(can_show: bool) -> i32 {
    if can_show { LABELS } else { FALLBACK_LABELS }
}
