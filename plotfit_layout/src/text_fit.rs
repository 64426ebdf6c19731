// Copyright 2025 the Plotfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fitting text into constrained regions.
//!
//! [`TextFitter`] wraps an injected [`TextMeasurer`] and provides the three
//! strategies chart labels need:
//! - **shrink-to-fit** ([`TextFitter::fit_to_width`]): reduce the font size in
//!   small steps, then truncate with an ellipsis as a last resort,
//! - **wrap** ([`TextFitter::wrap`]): greedy word wrap with a grapheme-level
//!   fallback for tokens wider than the line, and
//! - **block fit** ([`TextFitter::fit_block`]): shrink until the wrapped block
//!   fits a width *and* a height, e.g. a label inside a bubble.
//!
//! All measurements go through the measurer; the fitter assumes only that
//! measured width grows with text length.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Size;
use plotfit_text::{FontSpec, TextExtent, TextMeasurer};
use unicode_segmentation::UnicodeSegmentation;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use crate::error::{LayoutError, Result, require_positive};

/// Appended to truncated text.
pub const ELLIPSIS: &str = "...";

/// Text used to probe line height. Includes an ascender and a descender.
const LINE_PROBE: &str = "Mg";

/// A fitted block of text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextBox {
    /// The source text.
    pub text: String,
    /// Width of the widest line.
    pub width: f64,
    /// Total height of all lines.
    pub height: f64,
    /// Lines to draw, top to bottom.
    pub lines: Vec<String>,
    /// The font size the lines were fitted at.
    pub font_size_px: f64,
    /// Whether text was dropped (ellipsis appended).
    pub truncated: bool,
}

impl TextBox {
    fn empty(text: &str, font_size_px: f64) -> Self {
        Self {
            text: String::from(text),
            font_size_px,
            ..Self::default()
        }
    }

    /// Whether the box has nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The block size.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Shrink, truncate and wrap text using an injected measurer.
#[derive(Clone, Debug)]
pub struct TextFitter<M> {
    measurer: M,
    shrink_step: f64,
}

impl<M: TextMeasurer> TextFitter<M> {
    /// Creates a fitter after checking that `measurer` produces usable extents.
    ///
    /// A measurer that reports non-finite, negative, or zero extents for
    /// ordinary text would make every fit degenerate, so it is rejected here,
    /// before any layout work begins.
    pub fn new(measurer: M) -> Result<Self> {
        let font = FontSpec::default();
        for probe in [LINE_PROBE, ELLIPSIS] {
            let e = measurer.measure(probe, &font);
            if !e.is_valid() || e.width <= 0.0 || e.height <= 0.0 {
                return Err(LayoutError::InvalidTextMeasurer {
                    probe,
                    width: e.width,
                    height: e.height,
                });
            }
        }
        Ok(Self {
            measurer,
            shrink_step: 1.0,
        })
    }

    /// Sets the font size decrement used while shrinking (default `1.0`).
    pub fn with_shrink_step(mut self, shrink_step: f64) -> Result<Self> {
        require_positive("shrink_step", shrink_step)?;
        self.shrink_step = shrink_step;
        Ok(self)
    }

    /// The injected measurer.
    pub fn measurer(&self) -> &M {
        &self.measurer
    }

    /// Measures a single line.
    pub fn measure(&self, text: &str, font: &FontSpec) -> TextExtent {
        self.measurer.measure(text, font)
    }

    /// Height of one line in `font`.
    pub fn line_height(&self, font: &FontSpec) -> f64 {
        self.measure(LINE_PROBE, font).height
    }

    /// Extent of a block of lines: widest line by stacked line heights.
    pub fn measure_lines(&self, lines: &[String], font: &FontSpec) -> Size {
        let width = lines
            .iter()
            .map(|l| self.measure(l, font).width)
            .fold(0.0, f64::max);
        Size::new(width, lines.len() as f64 * self.line_height(font))
    }

    /// Shrinks `text` until it fits `max_width`, then truncates if needed.
    ///
    /// The font size decreases by the shrink step while the text is too wide,
    /// never going below `min_size_px`. If the text still does not fit, the
    /// longest grapheme prefix that fits together with [`ELLIPSIS`] is kept.
    /// Empty text or a non-positive `max_width` yields an empty box.
    pub fn fit_to_width(
        &self,
        text: &str,
        font: &FontSpec,
        max_width: f64,
        min_size_px: f64,
    ) -> TextBox {
        if text.is_empty() || !(max_width > 0.0) {
            return TextBox::empty(text, font.size_px);
        }

        let floor = min_size_px.min(font.size_px).max(0.0);
        let mut size = font.size_px;
        let mut current = font.clone();
        while self.measure(text, &current).width > max_width && size > floor {
            size = self.shrink(size, floor);
            current = font.with_size(size);
        }

        let (line, truncated) = if self.measure(text, &current).width > max_width {
            (self.truncate(text, &current, max_width), true)
        } else {
            (String::from(text), false)
        };
        if line.is_empty() {
            return TextBox::empty(text, size);
        }

        let extent = self.measure(&line, &current);
        TextBox {
            text: String::from(text),
            width: extent.width,
            height: self.line_height(&current).max(extent.height),
            lines: alloc::vec![line],
            font_size_px: size,
            truncated,
        }
    }

    /// Truncates `text` with [`ELLIPSIS`] so that it fits `max_width`.
    ///
    /// Text that already fits is returned unchanged. When not even the ellipsis
    /// fits, the longest fitting prefix is returned without one, which may be
    /// empty.
    pub fn truncate(&self, text: &str, font: &FontSpec, max_width: f64) -> String {
        if self.measure(text, font).width <= max_width {
            return String::from(text);
        }
        match self.longest_prefix(text, font, max_width, ELLIPSIS) {
            Some(end) => {
                let mut out = String::from(text[..end].trim_end());
                out.push_str(ELLIPSIS);
                out
            }
            None => {
                let end = self.longest_prefix(text, font, max_width, "").unwrap_or(0);
                String::from(text[..end].trim_end())
            }
        }
    }

    /// Greedy word wrap into at most `max_lines` lines of `max_width`.
    ///
    /// Words are appended to the current line while it fits. A word wider than
    /// `max_width` on its own is broken at grapheme boundaries. Explicit `\n`
    /// starts a new line. Lines beyond `max_lines` are dropped and the last kept
    /// line ends with [`ELLIPSIS`].
    pub fn wrap(&self, text: &str, font: &FontSpec, max_width: f64, max_lines: usize) -> TextBox {
        if text.trim().is_empty() || !(max_width > 0.0) || max_lines == 0 {
            return TextBox::empty(text, font.size_px);
        }

        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            self.wrap_paragraph(paragraph, font, max_width, &mut lines);
        }

        let truncated = lines.len() > max_lines;
        if truncated {
            lines.truncate(max_lines);
            if let Some(last) = lines.last_mut() {
                let mut with_ellipsis = String::from(last.trim_end());
                with_ellipsis.push_str(ELLIPSIS);
                *last = if self.measure(&with_ellipsis, font).width <= max_width {
                    with_ellipsis
                } else {
                    self.truncate(&with_ellipsis, font, max_width)
                };
            }
        }

        let size = self.measure_lines(&lines, font);
        TextBox {
            text: String::from(text),
            width: size.width,
            height: size.height,
            lines,
            font_size_px: font.size_px,
            truncated,
        }
    }

    /// Shrinks and wraps `text` until the block fits `max_width` x `max_height`.
    ///
    /// At `min_size_px` the best wrap that fits the height is returned with an
    /// ellipsis. If not even one line fits the height, the box is empty.
    pub fn fit_block(
        &self,
        text: &str,
        font: &FontSpec,
        max_width: f64,
        max_height: f64,
        min_size_px: f64,
    ) -> TextBox {
        if text.trim().is_empty() || !(max_width > 0.0) || !(max_height > 0.0) {
            return TextBox::empty(text, font.size_px);
        }

        let floor = min_size_px.min(font.size_px).max(0.0);
        let mut size = font.size_px;
        loop {
            let current = font.with_size(size);
            let line_height = self.line_height(&current);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "floored line count; saturates for huge boxes"
            )]
            let max_lines = if line_height > 0.0 {
                (max_height / line_height).floor() as usize
            } else {
                1
            };
            if max_lines > 0 {
                let fitted = self.wrap(text, &current, max_width, max_lines);
                if !fitted.truncated || size <= floor {
                    return fitted;
                }
            } else if size <= floor {
                return TextBox::empty(text, size);
            }
            size = self.shrink(size, floor);
        }
    }

    /// One shrink step, never below `floor`. Jumps straight to `floor` when the
    /// step is lost to rounding at `size`.
    fn shrink(&self, size: f64, floor: f64) -> f64 {
        let next = (size - self.shrink_step).max(floor);
        if next < size { next } else { floor }
    }

    fn wrap_paragraph(&self, paragraph: &str, font: &FontSpec, max_width: f64, lines: &mut Vec<String>) {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if !current.is_empty() {
                let mut candidate = current.clone();
                candidate.push(' ');
                candidate.push_str(word);
                if self.measure(&candidate, font).width <= max_width {
                    current = candidate;
                    continue;
                }
                lines.push(core::mem::take(&mut current));
            }

            if self.measure(word, font).width <= max_width {
                current.push_str(word);
                continue;
            }

            // Too wide for any line: break at grapheme boundaries.
            let mut rest = word;
            while !rest.is_empty() {
                let end = match self.longest_prefix(rest, font, max_width, "") {
                    Some(end) if end > 0 => end,
                    _ => rest.graphemes(true).next().map_or(rest.len(), str::len),
                };
                if end == rest.len() {
                    current.push_str(rest);
                    break;
                }
                lines.push(String::from(&rest[..end]));
                rest = &rest[end..];
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    /// Byte end of the longest grapheme prefix of `text` that fits together
    /// with `suffix`, or `None` when not even the bare suffix fits.
    fn longest_prefix(&self, text: &str, font: &FontSpec, max_width: f64, suffix: &str) -> Option<usize> {
        let fits = |end: usize| {
            let mut s = String::from(text[..end].trim_end());
            s.push_str(suffix);
            self.measure(&s, font).width <= max_width
        };
        if !fits(0) {
            return None;
        }

        let ends: Vec<usize> = core::iter::once(0)
            .chain(text.grapheme_indices(true).map(|(i, g)| i + g.len()))
            .collect();
        let (mut lo, mut hi) = (0, ends.len() - 1);
        while lo < hi {
            let mid = (lo + hi).div_ceil(2);
            if fits(ends[mid]) {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        Some(ends[lo])
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use plotfit_text::HeuristicTextMeasurer;

    use super::*;

    /// 10px font: 6px per char, 12px lines.
    fn fitter() -> TextFitter<HeuristicTextMeasurer> {
        TextFitter::new(HeuristicTextMeasurer::default()).unwrap()
    }

    #[derive(Debug)]
    struct BrokenMeasurer;

    impl TextMeasurer for BrokenMeasurer {
        fn measure(&self, _text: &str, _font: &FontSpec) -> TextExtent {
            TextExtent::new(f64::NAN, 10.0)
        }
    }

    #[test]
    fn invalid_measurer_is_rejected_up_front() {
        let err = TextFitter::new(BrokenMeasurer).unwrap_err();
        assert!(
            matches!(err, LayoutError::InvalidTextMeasurer { probe: "Mg", .. }),
            "{err:?}"
        );
        assert!(
            fitter().with_shrink_step(0.0).is_err(),
            "zero shrink step must be rejected"
        );
    }

    #[test]
    fn text_that_fits_is_untouched() {
        let b = fitter().fit_to_width("Revenue", &FontSpec::new(10.0), 100.0, 6.0);
        assert_eq!(b.lines, vec![String::from("Revenue")]);
        assert_eq!(b.font_size_px, 10.0);
        assert!(!b.truncated, "no truncation expected");
        assert!((b.width - 42.0).abs() < 1e-9, "{b:?}");
    }

    #[test]
    fn shrinks_before_truncating() {
        // 10 chars: 60px at 10px, 48px at 8px.
        let b = fitter().fit_to_width("abcdefghij", &FontSpec::new(10.0), 50.0, 6.0);
        assert_eq!(b.font_size_px, 8.0);
        assert_eq!(b.lines, vec![String::from("abcdefghij")]);
        assert!(b.width <= 50.0, "{b:?}");
    }

    #[test]
    fn truncates_at_min_size() {
        // At 10px min size: 6px/char, ellipsis is 18px, so 5 chars + "..." = 48px.
        let b = fitter().fit_to_width("abcdefghijkl", &FontSpec::new(12.0), 50.0, 10.0);
        assert_eq!(b.font_size_px, 10.0);
        assert_eq!(b.lines, vec![String::from("abcde...")]);
        assert!(b.truncated, "should be truncated");
        assert!(b.width <= 50.0, "{b:?}");
    }

    #[test]
    fn empty_inputs_yield_empty_boxes() {
        let f = fitter();
        assert!(f.fit_to_width("", &FontSpec::new(10.0), 50.0, 6.0).is_empty(), "empty text");
        assert!(f.fit_to_width("abc", &FontSpec::new(10.0), 0.0, 6.0).is_empty(), "zero width");
        assert!(f.wrap("abc", &FontSpec::new(10.0), 50.0, 0).is_empty(), "zero lines");
    }

    #[test]
    fn truncate_without_room_for_ellipsis() {
        let f = fitter();
        // Ellipsis needs 18px; 12px only fits two chars.
        assert_eq!(f.truncate("abcdef", &FontSpec::new(10.0), 12.0), "ab");
        assert_eq!(f.truncate("abc", &FontSpec::new(10.0), 100.0), "abc");
    }

    #[test]
    fn wraps_words_greedily() {
        // 60px fits 10 chars.
        let b = fitter().wrap("the quick brown fox jumps", &FontSpec::new(10.0), 60.0, 5);
        assert_eq!(b.lines, vec!["the quick", "brown fox", "jumps"]);
        assert!((b.height - 36.0).abs() < 1e-9, "{b:?}");
        assert!(!b.truncated, "all lines kept");
    }

    #[test]
    fn long_tokens_fall_back_to_graphemes() {
        let b = fitter().wrap("a supercalifragilistic b", &FontSpec::new(10.0), 30.0, 10);
        assert_eq!(b.lines, vec!["a", "super", "calif", "ragil", "istic", "b"]);
        assert!(b.width <= 30.0, "{b:?}");
    }

    #[test]
    fn wrap_drops_extra_lines_with_ellipsis() {
        let b = fitter().wrap("one two three four five", &FontSpec::new(10.0), 60.0, 2);
        assert_eq!(b.lines.len(), 2);
        assert!(b.truncated, "lines were dropped");
        assert!(b.lines[1].ends_with(ELLIPSIS), "{:?}", b.lines);
        assert!(b.width <= 60.0, "{b:?}");
    }

    #[test]
    fn wrap_honors_explicit_newlines() {
        let b = fitter().wrap("ab\ncd", &FontSpec::new(10.0), 100.0, 4);
        assert_eq!(b.lines, vec!["ab", "cd"]);
    }

    #[test]
    fn block_fit_shrinks_until_wrap_fits_height() {
        // At 10px: lines of 12px, 2 lines fit 24px but the text needs 3.
        let b = fitter().fit_block("alpha beta gamma", &FontSpec::new(10.0), 40.0, 24.0, 4.0);
        assert!(!b.truncated, "{b:?}");
        assert!(b.font_size_px < 10.0, "{b:?}");
        assert!(b.width <= 40.0 && b.height <= 24.0, "{b:?}");
    }

    #[test]
    fn steps_lost_to_rounding_still_terminate() {
        let f = fitter().with_shrink_step(1e-300).unwrap();
        let font = FontSpec::new(12.0);

        let line = f.fit_to_width("abcdefghijklmnop", &font, 20.0, 6.0);
        assert_eq!(line.font_size_px, 6.0, "fell through to the minimum size");
        assert!(line.truncated && line.width <= 20.0, "{line:?}");

        let block = f.fit_block("abcdefghijklmnop qrstuvwx", &font, 20.0, 8.0, 6.0);
        assert_eq!(block.font_size_px, 6.0, "fell through to the minimum size");
    }

    #[test]
    fn block_fit_gives_up_when_no_line_fits() {
        let b = fitter().fit_block("alpha", &FontSpec::new(10.0), 40.0, 3.0, 8.0);
        assert!(b.is_empty(), "{b:?}");
    }
}
