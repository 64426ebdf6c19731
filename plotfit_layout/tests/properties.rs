// Copyright 2025 the Plotfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for the layout invariants.

use std::f64::consts::PI;

use kurbo::Size;
use plotfit_layout::{
    BacktrackOptions, BacktrackingPacker, ForceLayout, ForceLayoutOptions, ForceTargets,
    SequentialLabelPlacer, SequentialLabelSpec, ShapeInput, TextFitter, circle_intersection_area,
};
use plotfit_text::{FontSpec, HeuristicTextMeasurer, TextMeasurer};
use proptest::prelude::*;

fn fitter() -> TextFitter<HeuristicTextMeasurer> {
    TextFitter::new(HeuristicTextMeasurer::default()).unwrap()
}

fn letters(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace() && *c != '.').collect()
}

proptest! {
    #[test]
    fn fitted_text_never_exceeds_max_width(
        text in "[a-zA-Z ]{0,40}",
        max_width in 1.0..300.0_f64,
        size in 8.0..24.0_f64,
    ) {
        let fitter = fitter();
        let font = FontSpec::new(size);
        let fitted = fitter.fit_to_width(&text, &font, max_width, 6.0);
        let used = font.with_size(fitted.font_size_px);
        for line in &fitted.lines {
            let width = fitter.measurer().measure(line, &used).width;
            prop_assert!(width <= max_width + 1e-9, "{line:?} is {width} wide, max {max_width}");
        }
        prop_assert!(fitted.lines.len() <= 1, "single line: {:?}", fitted.lines);
    }

    #[test]
    fn wrapped_lines_keep_word_order(
        text in "[a-z]{1,12}( [a-z]{1,12}){0,12}",
        max_width in 20.0..200.0_f64,
        max_lines in 1..6_usize,
    ) {
        let fitted = fitter().wrap(&text, &FontSpec::default(), max_width, max_lines);
        prop_assert!(fitted.lines.len() <= max_lines, "{} lines, max {max_lines}", fitted.lines.len());

        let original = letters(&text);
        let kept = letters(&fitted.lines.concat());
        if fitted.truncated {
            prop_assert_eq!(fitted.lines.len(), max_lines);
            prop_assert!(original.starts_with(&kept), "{kept:?} is not a prefix of {original:?}");
        } else {
            prop_assert_eq!(kept, original);
        }
    }

    #[test]
    fn feasible_sequential_layouts_do_not_overlap(
        mut positions in prop::collection::vec(0.0..300.0_f64, 1..12),
        height in 5.0..20.0_f64,
        grid in 1.0..5.0_f64,
    ) {
        let placer = SequentialLabelPlacer::new(SequentialLabelSpec::new(height, grid, (0.0, 320.0))).unwrap();
        let layout = placer.place(&positions);
        prop_assert_eq!(layout.slots.len(), positions.len());

        if layout.feasible {
            let mut spans: Vec<(f64, f64)> = layout.slots.iter().map(|s| s.span(height)).collect();
            spans.sort_by(|a, b| a.0.total_cmp(&b.0));
            for w in spans.windows(2) {
                prop_assert!(w[0].1 <= w[1].0 + 1e-9, "{:?} overlaps {:?}", w[0], w[1]);
            }
        }

        // Snapping every label to its nearest cell is one candidate assignment;
        // when it is valid the optimum can only be cheaper.
        positions.sort_by(f64::total_cmp);
        let cells = ((320.0 - height + 1e-9) / grid).floor() as i64 + 1;
        let clearance = ((height - 1e-9) / grid).ceil().max(1.0) as i64;
        let snapped: Vec<i64> = positions
            .iter()
            .map(|p| (((p - 0.5 * height) / grid).round() as i64).clamp(0, cells - 1))
            .collect();
        if snapped.windows(2).all(|w| w[1] - w[0] >= clearance) {
            let naive: f64 = snapped
                .iter()
                .zip(&positions)
                .map(|(&c, p)| (c as f64 * grid - (p - 0.5 * height)).abs())
                .sum();
            prop_assert!(layout.feasible, "snapped assignment exists");
            prop_assert!(layout.cost <= naive + 1e-6, "cost {} exceeds naive {naive}", layout.cost);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn force_layout_keeps_free_shapes_in_bounds(
        values in prop::collection::vec(1.0..100.0_f64, 1..20),
        width in 100.0..600.0_f64,
        height in 100.0..600.0_f64,
        release in any::<bool>(),
    ) {
        let shapes: Vec<ShapeInput> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| ShapeInput::new(i as u64, v).with_group((i % 3) as u32))
            .collect();
        let layout = ForceLayout::new(ForceLayoutOptions::default().with_release_pinned(release)).unwrap();
        let out = layout.layout(&shapes, Size::new(width, height), &ForceTargets::default());
        prop_assert_eq!(out.len(), shapes.len());
        for s in out.iter().filter(|s| !s.fixed) {
            prop_assert!(
                s.center.x >= s.radius - 1e-6
                    && s.center.x <= width - s.radius + 1e-6
                    && s.center.y >= s.radius - 1e-6
                    && s.center.y <= height - s.radius + 1e-6,
                "{s:?} escapes {width} x {height}"
            );
        }
    }

    #[test]
    fn backtracking_respects_the_overlap_tolerance(
        values in prop::collection::vec(1.0..50.0_f64, 1..8),
        side in 200.0..500.0_f64,
        tolerance in 0.0..0.3_f64,
    ) {
        let shapes: Vec<ShapeInput> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| ShapeInput::new(i as u64, v))
            .collect();
        let packer = BacktrackingPacker::new(BacktrackOptions::default().with_overlap_tolerance(tolerance)).unwrap();
        let packing = packer.pack(&shapes, Size::new(side, side));
        prop_assert!(
            packing.circles.len() + packing.dropped.len() <= shapes.len(),
            "{packing:?}"
        );

        let circles: Vec<_> = packing.shapes().map(|s| s.circle()).collect();
        for (i, a) in circles.iter().enumerate() {
            for b in &circles[i + 1..] {
                let shared = circle_intersection_area(*a, *b);
                prop_assert!(
                    shared <= tolerance * PI * a.radius * a.radius + 1e-6
                        && shared <= tolerance * PI * b.radius * b.radius + 1e-6,
                    "{a:?} and {b:?} share {shared}"
                );
            }
        }
    }
}
