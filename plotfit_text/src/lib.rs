// Copyright 2025 the Plotfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The text measurement capability used by plotfit layout.
//!
//! Label fitting and placement need one thing from the host: the extent of a
//! single line of text in a given font. Plotfit never reaches for a rendering
//! surface itself. Instead every layout entry point takes a [`TextMeasurer`],
//! which can be backed by:
//! - a heuristic ([`HeuristicTextMeasurer`], deterministic and font-free),
//! - a shaping engine (see `plotfit_text_parley`), or
//! - web platform text measurement (see `plotfit_text_web`).
//!
//! Measurers are expected to be pure: identical `(text, font)` inputs must
//! produce identical extents for the lifetime of a render.

#![no_std]

extern crate alloc;

use alloc::boxed::Box;
use alloc::sync::Arc;

/// Measures single lines of text.
///
/// Backends are not required to be `Sync`. Many of them wrap a shaping context
/// or a canvas that cannot be shared, so concurrent renders should each own
/// their own measurer.
pub trait TextMeasurer {
    /// Measure a single line of text.
    ///
    /// `text` is treated as a single line; callers split on `\n` themselves.
    fn measure(&self, text: &str, font: &FontSpec) -> TextExtent;
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for &T {
    fn measure(&self, text: &str, font: &FontSpec) -> TextExtent {
        (**self).measure(text, font)
    }
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for Box<T> {
    fn measure(&self, text: &str, font: &FontSpec) -> TextExtent {
        (**self).measure(text, font)
    }
}

/// A font descriptor: family, pixel size and weight.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    /// The preferred font family.
    pub family: FontFamily,
    /// Font size in the layout's coordinate system (typically pixels).
    pub size_px: f64,
    /// Font weight (e.g. `400` for normal, `700` for bold).
    pub weight: FontWeight,
}

impl FontSpec {
    /// Creates a sans-serif, normal-weight font of the given size.
    #[must_use]
    pub fn new(size_px: f64) -> Self {
        Self {
            family: FontFamily::SansSerif,
            size_px,
            weight: FontWeight::NORMAL,
        }
    }

    /// Returns a copy of this font at a different size.
    #[must_use]
    pub fn with_size(&self, size_px: f64) -> Self {
        Self {
            size_px,
            ..self.clone()
        }
    }

    /// Sets the font family.
    #[must_use]
    pub fn with_family(mut self, family: FontFamily) -> Self {
        self.family = family;
        self
    }

    /// Sets the font weight.
    #[must_use]
    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::new(12.0)
    }
}

/// Font family selection for measurement.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FontFamily {
    /// A generic serif family (CSS `serif`).
    Serif,
    /// A generic sans-serif family (CSS `sans-serif`).
    SansSerif,
    /// A generic monospace family (CSS `monospace`).
    Monospace,
    /// A named family (e.g. `"Inter"`, `"Helvetica Neue"`).
    Named(Arc<str>),
}

impl FontFamily {
    /// Returns the font family string for CSS-style font declarations.
    #[must_use]
    pub fn as_css_family(&self) -> &str {
        match self {
            Self::Serif => "serif",
            Self::SansSerif => "sans-serif",
            Self::Monospace => "monospace",
            Self::Named(name) => name,
        }
    }
}

/// CSS-style font weights.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontWeight(pub u16);

impl FontWeight {
    /// Normal weight (`400`).
    pub const NORMAL: Self = Self(400);
    /// Bold weight (`700`).
    pub const BOLD: Self = Self(700);
}

/// The measured extent of a single line of text.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextExtent {
    /// Advance width.
    pub width: f64,
    /// Line height.
    pub height: f64,
}

impl TextExtent {
    /// The empty extent.
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    /// Creates an extent.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether both dimensions are finite and non-negative.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }
}

/// A tiny heuristic text measurer suitable for tests, demos and headless layout.
///
/// Every character advances by `char_width_factor` em and lines are
/// `line_height_factor` em tall. The weight widens glyphs slightly so that bold
/// labels fit less text, as they would with a real font.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeuristicTextMeasurer {
    /// Average glyph advance, in em.
    pub char_width_factor: f64,
    /// Line height, in em.
    pub line_height_factor: f64,
}

impl Default for HeuristicTextMeasurer {
    fn default() -> Self {
        Self {
            char_width_factor: 0.6,
            line_height_factor: 1.2,
        }
    }
}

impl TextMeasurer for HeuristicTextMeasurer {
    fn measure(&self, text: &str, font: &FontSpec) -> TextExtent {
        let size = font.size_px.max(0.0);
        let line = text.split('\n').next().unwrap_or("");
        let weight_scale = if font.weight >= FontWeight::BOLD {
            1.1
        } else {
            1.0
        };
        let width = self.char_width_factor * weight_scale * size * line.chars().count() as f64;
        TextExtent::new(width, self.line_height_factor * size)
    }
}
