// Copyright 2025 the Plotfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parley-backed text measurement.
//!
//! [`ParleyTextMeasurer`] implements [`plotfit_text::TextMeasurer`] with real
//! shaping, so fitted and placed labels match what a Parley-based renderer will
//! draw. Extents are in logical units: layout happens at scale `1.0` with
//! unquantized coordinates.

#![no_std]

extern crate alloc;

use alloc::borrow::Cow;
use core::cell::RefCell;

use parley::style::{FontFamily as ParleyFamily, FontStack, GenericFamily, StyleProperty};
use parley::{Alignment, AlignmentOptions, FontContext, FontWeight, Layout, LayoutContext};
use plotfit_text::{FontFamily, FontSpec, TextExtent, TextMeasurer};

/// Shaping contexts reused across measurements.
struct Contexts {
    fonts: FontContext,
    layouts: LayoutContext<()>,
}

/// A [`TextMeasurer`] backed by Parley.
///
/// Shaping state lives in a `RefCell`, so a measurer is neither `Sync` nor
/// reentrant. Give each concurrent render its own instance.
pub struct ParleyTextMeasurer {
    contexts: RefCell<Contexts>,
}

impl core::fmt::Debug for ParleyTextMeasurer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("ParleyTextMeasurer { .. }")
    }
}

impl Default for ParleyTextMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

impl ParleyTextMeasurer {
    /// Measures with Parley's default (system) font collection.
    #[must_use]
    pub fn new() -> Self {
        Self::with_font_context(FontContext::new())
    }

    /// Measures with the fonts registered in `fonts`, e.g. fonts bundled by
    /// the embedder.
    #[must_use]
    pub fn with_font_context(fonts: FontContext) -> Self {
        Self {
            contexts: RefCell::new(Contexts {
                fonts,
                layouts: LayoutContext::new(),
            }),
        }
    }
}

fn font_stack(family: &FontFamily) -> FontStack<'_> {
    let family = match family {
        FontFamily::Serif => ParleyFamily::Generic(GenericFamily::Serif),
        FontFamily::SansSerif => ParleyFamily::Generic(GenericFamily::SansSerif),
        FontFamily::Monospace => ParleyFamily::Generic(GenericFamily::Monospace),
        FontFamily::Named(name) => ParleyFamily::Named(Cow::Borrowed(&**name)),
    };
    FontStack::from(family)
}

/// Font size as Parley wants it; `None` for sizes that cannot be shaped.
fn shaping_size(size_px: f64) -> Option<f32> {
    if !(size_px.is_finite() && size_px > 0.0) {
        return None;
    }
    #[allow(
        clippy::cast_possible_truncation,
        reason = "clamped to the f32 range first"
    )]
    let size = size_px.min(f64::from(f32::MAX)) as f32;
    Some(size)
}

impl TextMeasurer for ParleyTextMeasurer {
    fn measure(&self, text: &str, font: &FontSpec) -> TextExtent {
        let line = text.lines().next().unwrap_or_default();
        let Some(size) = shaping_size(font.size_px) else {
            return TextExtent::ZERO;
        };
        if line.is_empty() {
            return TextExtent::ZERO;
        }

        let mut cx = self.contexts.borrow_mut();
        let Contexts { fonts, layouts } = &mut *cx;
        let mut builder = layouts.ranged_builder(fonts, line, 1.0, false);
        builder.push_default(StyleProperty::FontSize(size));
        builder.push_default(StyleProperty::FontStack(font_stack(&font.family)));
        builder.push_default(StyleProperty::FontWeight(FontWeight::new(f32::from(font.weight.0))));

        let mut layout: Layout<()> = builder.build(line);
        layout.break_all_lines(None);
        layout.align(None, Alignment::Start, AlignmentOptions::default());

        layout.lines().next().map_or(TextExtent::ZERO, |first| {
            let metrics = first.metrics();
            TextExtent::new(
                f64::from(metrics.advance),
                f64::from(metrics.ascent + metrics.descent + metrics.leading),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn shaped_text_has_an_extent() {
        let extent = ParleyTextMeasurer::new().measure("Hello", &FontSpec::new(12.0));
        assert!(
            extent.width > 0.0 && extent.height > 0.0,
            "expected a positive extent, got {extent:?}"
        );
    }

    #[test]
    fn empty_text_and_bad_sizes_measure_zero() {
        let measurer = ParleyTextMeasurer::default();
        assert_eq!(measurer.measure("", &FontSpec::new(12.0)), TextExtent::ZERO);
        assert_eq!(measurer.measure("Hello", &FontSpec::new(0.0)), TextExtent::ZERO);
        assert_eq!(measurer.measure("Hello", &FontSpec::new(f64::NAN)), TextExtent::ZERO);
    }

    #[test]
    fn only_the_first_line_is_measured() {
        let measurer = ParleyTextMeasurer::new();
        let font = FontSpec::new(14.0);
        assert_eq!(
            measurer.measure("Revenue\nper quarter", &font),
            measurer.measure("Revenue", &font),
            "text after a newline is ignored"
        );
    }

    #[test]
    fn bigger_fonts_are_wider() {
        let measurer = ParleyTextMeasurer::new();
        let small = measurer.measure("Revenue", &FontSpec::new(10.0));
        let large = measurer.measure("Revenue", &FontSpec::new(20.0));
        assert!(large.width > small.width, "{large:?} should exceed {small:?}");
    }
}
