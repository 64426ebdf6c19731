// Copyright 2025 the Plotfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web/WASM text measurement.
//!
//! [`WebTextMeasurer`] measures with HTML Canvas `measureText` on `wasm32`
//! targets. The measurer owns one 2D context, created once, rather than creating
//! a detached element per measurement. The context is not shareable, so each
//! concurrent render should construct its own measurer.
//!
//! Non-`wasm32` builds fall back to [`HeuristicTextMeasurer`], which keeps the
//! crate usable in native tests of web-targeted code.

#![no_std]

extern crate alloc;

#[cfg(target_arch = "wasm32")]
use alloc::{format, string::String};
use plotfit_text::{FontSpec, HeuristicTextMeasurer, TextExtent, TextMeasurer};

/// Line height used when the canvas reports no vertical metrics, in em.
const FALLBACK_LINE_HEIGHT: f64 = 1.2;

/// A `wasm32` measurer backed by HTML Canvas 2D text metrics.
///
/// On non-`wasm32` targets, this type is still available but always measures
/// with [`HeuristicTextMeasurer`].
#[derive(Clone, Debug)]
pub struct WebTextMeasurer {
    #[cfg(target_arch = "wasm32")]
    ctx: web_sys::CanvasRenderingContext2d,
    fallback: HeuristicTextMeasurer,
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for WebTextMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

impl WebTextMeasurer {
    #[cfg(target_arch = "wasm32")]
    fn css_font(font: &FontSpec) -> String {
        format!(
            "normal {} {}px {}",
            font.weight.0,
            font.size_px,
            font.family.as_css_family()
        )
    }

    /// Creates a measurer using a fresh offscreen canvas.
    ///
    /// This requires a browser-like environment with `window` and `document`.
    #[cfg(target_arch = "wasm32")]
    pub fn new() -> Result<Self, wasm_bindgen::JsValue> {
        use wasm_bindgen::JsCast as _;

        let missing = |what: &str| {
            wasm_bindgen::JsValue::from_str(&format!("plotfit_text_web: missing {what}"))
        };
        let document = web_sys::window()
            .ok_or_else(|| missing("window"))?
            .document()
            .ok_or_else(|| missing("document"))?;
        let canvas = document
            .create_element("canvas")?
            .dyn_into::<web_sys::HtmlCanvasElement>()?;
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| missing("2d context"))?
            .dyn_into::<web_sys::CanvasRenderingContext2d>()?;
        Ok(Self::from_canvas_context(ctx))
    }

    /// Creates a measurer around an existing canvas 2D context.
    #[cfg(target_arch = "wasm32")]
    #[must_use]
    pub fn from_canvas_context(ctx: web_sys::CanvasRenderingContext2d) -> Self {
        Self {
            ctx,
            fallback: HeuristicTextMeasurer::default(),
        }
    }

    /// Creates a non-web measurer that always falls back to heuristics.
    #[cfg(not(target_arch = "wasm32"))]
    #[must_use]
    pub fn new() -> Self {
        Self {
            fallback: HeuristicTextMeasurer::default(),
        }
    }
}

impl TextMeasurer for WebTextMeasurer {
    fn measure(&self, text: &str, font: &FontSpec) -> TextExtent {
        #[cfg(target_arch = "wasm32")]
        {
            self.ctx.set_font(&Self::css_font(font));
            let Ok(metrics) = self.ctx.measure_text(text) else {
                return self.fallback.measure(text, font);
            };

            // Older engines report zero font bounding boxes; treat that as unknown.
            let height = metrics.font_bounding_box_ascent() + metrics.font_bounding_box_descent();
            let height = if height > 0.0 {
                height
            } else {
                FALLBACK_LINE_HEIGHT * font.size_px
            };
            TextExtent::new(metrics.width(), height)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let extent = self.fallback.measure(text, font);
            TextExtent::new(extent.width, FALLBACK_LINE_HEIGHT * font.size_px.max(0.0))
        }
    }
}
