// Copyright 2025 the Plotfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Greedy first-fit labels around scatter points.
//!
//! Each label tries its candidate offsets in priority order and takes the
//! first one whose box stays inside the drawing bounds and clears every
//! point's marker, every label placed before it, and any extra obstacles.
//! When no candidate clears, the top-priority candidate is returned with
//! `can_show = false`.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Rect, Vec2};
use plotfit_text::{FontSpec, TextMeasurer};
use smallvec::{SmallVec, smallvec};

use crate::error::{LayoutError, Result, require_non_negative};
use crate::geometry::{Obstacle, rect_within, rects_overlap};
use crate::label::{PlacedLabel, TextAnchor, TextBaseline, label_rect};
use crate::text_fit::{TextBox, TextFitter};

/// One attempt at placing a label relative to its point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelCandidate {
    /// Offset from the point to the label anchor.
    pub offset: Vec2,
    /// Horizontal anchor at the offset position.
    pub anchor: TextAnchor,
    /// Vertical alignment at the offset position.
    pub baseline: TextBaseline,
    /// Lower values are tried first.
    pub priority: u8,
}

impl LabelCandidate {
    /// Creates a candidate.
    pub fn new(offset: Vec2, anchor: TextAnchor, baseline: TextBaseline, priority: u8) -> Self {
        Self {
            offset,
            anchor,
            baseline,
            priority,
        }
    }

    /// Right, above, left, below, each `distance` away from the point.
    pub fn cardinal(distance: f64) -> SmallVec<[Self; 4]> {
        smallvec![
            Self::new(Vec2::new(distance, 0.0), TextAnchor::Start, TextBaseline::Middle, 0),
            Self::new(Vec2::new(0.0, -distance), TextAnchor::Middle, TextBaseline::Bottom, 1),
            Self::new(Vec2::new(-distance, 0.0), TextAnchor::End, TextBaseline::Middle, 2),
            Self::new(Vec2::new(0.0, distance), TextAnchor::Middle, TextBaseline::Top, 3),
        ]
    }
}

/// A point and the radius of its marker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatterPoint {
    /// Point position.
    pub position: Point,
    /// Marker footprint radius.
    pub radius: f64,
}

impl ScatterPoint {
    /// Creates a point.
    pub fn new(position: impl Into<Point>, radius: f64) -> Self {
        Self {
            position: position.into(),
            radius: radius.max(0.0),
        }
    }

    fn footprint(&self) -> Obstacle {
        Obstacle::disc(self.position, self.radius)
    }
}

/// Settings for [`PointLabelPlacer`].
#[derive(Clone, Debug, PartialEq)]
pub struct PointLabelOptions {
    /// Labels must stay inside this box.
    pub bounds: Rect,
    /// Space between the marker edge and the label.
    pub gap: f64,
    /// Label font.
    pub font: FontSpec,
    /// Labels wider than this are shrunk, then truncated.
    pub max_width: Option<f64>,
    /// Smallest font size used while shrinking.
    pub min_font_size_px: f64,
    /// Fixed regions labels must avoid, e.g. icons or packed circles.
    pub obstacles: Vec<Obstacle>,
}

impl PointLabelOptions {
    /// Options for labels inside `bounds`.
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            gap: 4.0,
            font: FontSpec::default(),
            max_width: None,
            min_font_size_px: 8.0,
            obstacles: Vec::new(),
        }
    }

    /// Sets the marker-to-label gap.
    pub fn with_gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }

    /// Sets the label font.
    pub fn with_font(mut self, font: FontSpec) -> Self {
        self.font = font;
        self
    }

    /// Limits label width.
    pub fn with_max_width(mut self, max_width: f64) -> Self {
        self.max_width = Some(max_width);
        self
    }

    /// Adds a fixed obstacle.
    pub fn with_obstacle(mut self, obstacle: impl Into<Obstacle>) -> Self {
        self.obstacles.push(obstacle.into());
        self
    }
}

/// Places labels next to scatter points.
#[derive(Clone, Debug)]
pub struct PointLabelPlacer<M> {
    fitter: TextFitter<M>,
    options: PointLabelOptions,
}

impl<M: TextMeasurer> PointLabelPlacer<M> {
    /// Creates a placer after validating `options`.
    pub fn new(fitter: TextFitter<M>, options: PointLabelOptions) -> Result<Self> {
        require_non_negative("gap", options.gap)?;
        require_non_negative("min_font_size_px", options.min_font_size_px)?;
        if options.max_width.is_some_and(|w| !(w > 0.0)) {
            return Err(LayoutError::InvalidOption {
                name: "max_width",
                reason: "must be positive",
            });
        }
        Ok(Self { fitter, options })
    }

    /// The validated options.
    pub fn options(&self) -> &PointLabelOptions {
        &self.options
    }

    /// The default candidates for `point`: the four sides, clear of its marker.
    pub fn candidates_for(&self, point: &ScatterPoint) -> SmallVec<[LabelCandidate; 4]> {
        LabelCandidate::cardinal(point.radius + self.options.gap)
    }

    /// Places the label for `point`.
    ///
    /// `points` is the full point set (including `point`); `placed` are the
    /// boxes of labels already accepted for earlier points.
    pub fn place(
        &self,
        point: &ScatterPoint,
        text: &str,
        candidates: &[LabelCandidate],
        points: &[ScatterPoint],
        placed: &[Rect],
    ) -> PlacedLabel {
        let fitted = self.fit(text);
        let mut ordered: SmallVec<[&LabelCandidate; 4]> = candidates.iter().collect();
        ordered.sort_by_key(|c| c.priority);

        let Some(first) = ordered.first().copied() else {
            return self.label(point, &CENTERED, &fitted, false);
        };
        for candidate in &ordered {
            let label = self.label(point, candidate, &fitted, true);
            if self.is_clear(label.bounds, points, placed) {
                return label;
            }
        }
        self.label(point, first, &fitted, false)
    }

    /// Places one label per point, in input order, feeding accepted labels
    /// forward as obstacles for later ones.
    ///
    /// Extra texts or points beyond the shorter of the two slices are ignored.
    pub fn place_all<T: AsRef<str>>(&self, points: &[ScatterPoint], texts: &[T]) -> Vec<PlacedLabel> {
        let mut accepted: Vec<Rect> = Vec::with_capacity(points.len());
        let labels: Vec<PlacedLabel> = points
            .iter()
            .zip(texts)
            .map(|(point, text)| {
                let candidates = self.candidates_for(point);
                let label = self.place(point, text.as_ref(), &candidates, points, &accepted);
                if label.can_show {
                    accepted.push(label.bounds);
                }
                label
            })
            .collect();
        #[cfg(feature = "tracing")]
        tracing::trace!(
            labels = labels.len(),
            shown = accepted.len(),
            "point labels placed"
        );
        labels
    }

    fn fit(&self, text: &str) -> TextBox {
        let font = &self.options.font;
        match self.options.max_width {
            Some(w) => self.fitter.fit_to_width(text, font, w, self.options.min_font_size_px),
            None => self.fitter.fit_to_width(text, font, f64::INFINITY, font.size_px),
        }
    }

    fn label(&self, point: &ScatterPoint, candidate: &LabelCandidate, fitted: &TextBox, can_show: bool) -> PlacedLabel {
        let position = point.position + candidate.offset;
        PlacedLabel {
            position,
            anchor: candidate.anchor,
            baseline: candidate.baseline,
            font_size_px: fitted.font_size_px,
            text: String::from(fitted.text.as_str()),
            lines: fitted.lines.clone(),
            bounds: label_rect(position, fitted.size(), candidate.anchor, candidate.baseline),
            can_show,
        }
    }

    fn is_clear(&self, bounds: Rect, points: &[ScatterPoint], placed: &[Rect]) -> bool {
        rect_within(bounds, self.options.bounds)
            && !points.iter().any(|p| p.footprint().overlaps_rect(bounds))
            && !placed.iter().any(|r| rects_overlap(*r, bounds))
            && !self.options.obstacles.iter().any(|o| o.overlaps_rect(bounds))
    }
}

/// Used when the caller passes no candidates.
const CENTERED: LabelCandidate = LabelCandidate {
    offset: Vec2::ZERO,
    anchor: TextAnchor::Middle,
    baseline: TextBaseline::Middle,
    priority: 0,
};

#[cfg(test)]
mod tests {
    extern crate std;

    use plotfit_text::HeuristicTextMeasurer;

    use super::*;

    fn placer(bounds: Rect) -> PointLabelPlacer<HeuristicTextMeasurer> {
        placer_with(PointLabelOptions::new(bounds))
    }

    fn placer_with(options: PointLabelOptions) -> PointLabelPlacer<HeuristicTextMeasurer> {
        let fitter = TextFitter::new(HeuristicTextMeasurer::default()).unwrap();
        PointLabelPlacer::new(fitter, options).unwrap()
    }

    #[test]
    fn isolated_points_get_the_first_candidate() {
        let placer = placer(Rect::new(0.0, 0.0, 300.0, 300.0));
        let p = ScatterPoint::new((100.0, 100.0), 3.0);
        let label = placer.place(&p, "abc", &placer.candidates_for(&p), &[p], &[]);
        assert!(label.can_show, "{label:?}");
        assert_eq!(label.anchor, TextAnchor::Start);
        assert_eq!(label.position, Point::new(107.0, 100.0));
        assert!((label.bounds.width() - 21.6).abs() < 1e-9, "{label:?}");
    }

    #[test]
    fn neighbors_push_the_label_to_the_next_side() {
        let placer = placer(Rect::new(0.0, 0.0, 300.0, 300.0));
        let p = ScatterPoint::new((100.0, 100.0), 3.0);
        let points = [p, ScatterPoint::new((118.0, 100.0), 3.0)];
        let label = placer.place(&p, "abc", &placer.candidates_for(&p), &points, &[]);
        assert!(label.can_show, "{label:?}");
        assert_eq!(label.anchor, TextAnchor::Middle);
        assert_eq!(label.baseline, TextBaseline::Bottom, "placed above");
    }

    #[test]
    fn candidates_are_tried_by_priority() {
        let placer = placer(Rect::new(0.0, 0.0, 300.0, 300.0));
        let p = ScatterPoint::new((100.0, 100.0), 3.0);
        let mut candidates = placer.candidates_for(&p);
        candidates.reverse();
        let label = placer.place(&p, "abc", &candidates, &[p], &[]);
        assert_eq!(label.anchor, TextAnchor::Start, "priority 0 wins regardless of order");
    }

    #[test]
    fn blocked_labels_fall_back_to_the_top_candidate() {
        let placer = placer(Rect::new(0.0, 0.0, 20.0, 20.0));
        let p = ScatterPoint::new((10.0, 10.0), 3.0);
        let label = placer.place(&p, "a long label", &placer.candidates_for(&p), &[p], &[]);
        assert!(!label.can_show, "nothing fits a 20px canvas");
        assert_eq!(label.anchor, TextAnchor::Start);
        assert_eq!(label.position, Point::new(17.0, 10.0));
    }

    #[test]
    fn accepted_labels_become_obstacles() {
        let placer = placer(Rect::new(0.0, 0.0, 300.0, 300.0));
        let points = [
            ScatterPoint::new((100.0, 100.0), 3.0),
            ScatterPoint::new((100.0, 112.0), 3.0),
        ];
        let labels = placer.place_all(&points, &["abc", "abc"]);
        assert!(labels.iter().all(|l| l.can_show), "{labels:?}");
        assert_eq!(labels[0].anchor, TextAnchor::Start);
        assert_eq!(labels[1].anchor, TextAnchor::End, "right is taken, above hits a marker");
        assert!(
            !rects_overlap(labels[0].bounds, labels[1].bounds),
            "{labels:?}"
        );
    }

    #[test]
    fn extra_obstacles_are_avoided() {
        let options = PointLabelOptions::new(Rect::new(0.0, 0.0, 300.0, 300.0))
            .with_obstacle(Rect::new(105.0, 90.0, 140.0, 110.0));
        let placer = placer_with(options);
        let p = ScatterPoint::new((100.0, 100.0), 3.0);
        let label = placer.place(&p, "abc", &placer.candidates_for(&p), &[p], &[]);
        assert!(label.can_show, "{label:?}");
        assert_ne!(label.anchor, TextAnchor::Start, "right side is covered");
    }

    #[test]
    fn long_labels_shrink_to_max_width() {
        let options = PointLabelOptions::new(Rect::new(0.0, 0.0, 300.0, 300.0)).with_max_width(40.0);
        let placer = placer_with(options);
        let p = ScatterPoint::new((100.0, 100.0), 3.0);
        let label = placer.place(&p, "a rather long label", &placer.candidates_for(&p), &[p], &[]);
        assert!(label.bounds.width() <= 40.0 + 1e-9, "{label:?}");
        assert_eq!(label.lines.len(), 1);
        assert_eq!(label.text, "a rather long label");
    }

    #[test]
    fn no_candidates_center_on_the_point() {
        let placer = placer(Rect::new(0.0, 0.0, 300.0, 300.0));
        let p = ScatterPoint::new((100.0, 100.0), 3.0);
        let label = placer.place(&p, "abc", &[], &[p], &[]);
        assert!(!label.can_show, "{label:?}");
        assert_eq!(label.position, p.position);
    }
}
