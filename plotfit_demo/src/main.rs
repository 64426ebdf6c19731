// Copyright 2025 the Plotfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Label layout and circle packing demos for `plotfit_layout`.
//!
//! Writes `plotfit_demo.html` with one SVG figure per engine component.
mod html;
mod svg;

use std::f64::consts::{PI, SQRT_2, TAU};

use kurbo::{BezPath, Circle, Point, Rect, Shape, Size, Vec2};
use peniko::Color;
use peniko::color::palette::css;
use plotfit_layout::{
    BacktrackOptions, BacktrackingPacker, ForceLayout, ForceLayoutOptions, ForceTargets,
    LayoutError, Obstacle, PlacedLabel, PointLabelOptions, PointLabelPlacer, RadialLabelSearch,
    RadialLabelSpec, RadiusScale, ScanOrder, ScatterPoint, SeedPoint, SequentialLabelPlacer,
    SequentialLabelSpec, ShapeInput, TextAnchor, TextBaseline, TextFitter, label_rect, z_order,
};
use plotfit_text::{FontSpec, FontWeight, TextMeasurer};

use crate::html::HtmlSection;
use crate::svg::SvgScene;

type Fitter = TextFitter<Box<dyn TextMeasurer>>;

const PALETTE: [Color; 6] = [
    css::CORNFLOWER_BLUE,
    css::TOMATO,
    css::GOLD,
    css::MEDIUM_SEA_GREEN,
    css::ORCHID,
    css::SLATE_GRAY,
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let fitter = TextFitter::new(demo_measurer())?;
    let sections = vec![
        bubble_demo(&fitter)?,
        force_demo()?,
        donut_demo(&fitter)?,
        scatter_demo()?,
        line_end_demo(&fitter)?,
    ];

    let html = html::render_report("plotfit demo", &sections);
    std::fs::write("plotfit_demo.html", html)?;
    println!("wrote plotfit_demo.html");
    Ok(())
}

fn demo_measurer() -> Box<dyn TextMeasurer> {
    #[cfg(feature = "parley")]
    {
        Box::new(plotfit_text_parley::ParleyTextMeasurer::new())
    }

    #[cfg(not(feature = "parley"))]
    {
        Box::new(plotfit_text::HeuristicTextMeasurer::default())
    }
}

fn canvas_rect(canvas: Size) -> Rect {
    Rect::from_origin_size(Point::ORIGIN, canvas)
}

fn centered_label(center: Point, font_size_px: f64, text: &str, lines: Vec<String>, size: Size) -> PlacedLabel {
    PlacedLabel {
        position: center,
        anchor: TextAnchor::Middle,
        baseline: TextBaseline::Middle,
        font_size_px,
        text: text.to_string(),
        lines,
        bounds: label_rect(center, size, TextAnchor::Middle, TextBaseline::Middle),
        can_show: true,
    }
}

fn bubble_demo(fitter: &Fitter) -> Result<HtmlSection, LayoutError> {
    // Bubble pack with names fitted inside each circle's inscribed square.
    let canvas = Size::new(520.0, 380.0);
    let rows = [
        ("Rust", 40.0),
        ("Go", 25.0),
        ("Python", 20.0),
        ("TypeScript", 10.0),
        ("Kotlin", 5.0),
        ("Zig", 3.0),
        ("Haskell", 2.0),
        ("OCaml", 1.5),
        ("Elixir", 1.0),
    ];
    let shapes: Vec<ShapeInput> = rows
        .iter()
        .enumerate()
        .map(|(i, (_, v))| ShapeInput::new(i as u64, *v))
        .collect();

    let packer = BacktrackingPacker::new(
        BacktrackOptions::default()
            .with_scan(ScanOrder::CenterDistance)
            .with_seeds(&[SeedPoint::Center, SeedPoint::InsetCorner]),
    )?;
    let packing = packer.pack(&shapes, canvas);

    let mut scene = SvgScene::new(canvas_rect(canvas));
    let font = FontSpec::new(16.0).with_weight(FontWeight::BOLD);
    for packed in &packing.circles {
        let s = &packed.shape;
        let color = PALETTE[s.id as usize % PALETTE.len()];
        scene.circle(packed.z_index, s.circle(), color.with_alpha(0.85));

        let (name, _) = rows[s.id as usize];
        let side = s.radius * SQRT_2;
        let fitted = fitter.fit_block(name, &font, side, side, 7.0);
        if fitted.is_empty() {
            continue;
        }
        let label = centered_label(s.center, fitted.font_size_px, name, fitted.lines.clone(), fitted.size());
        scene.label(z_order::LABELS, &label, css::BLACK);
    }

    Ok(HtmlSection::new("Backtracking bubble pack", scene.to_svg_string())
        .with_note(format!(
            "{} circles placed in {} attempt(s), {} candidates evaluated",
            packing.circles.len(),
            packing.attempts,
            packing.nodes_expanded
        ))
        .with_note(format!("dropped ids: {:?}", packing.dropped)))
}

fn force_demo() -> Result<HtmlSection, LayoutError> {
    // Three clusters pulled toward their own column of the canvas.
    let canvas = Size::new(520.0, 320.0);
    let shapes: Vec<ShapeInput> = (0..30_u64)
        .map(|i| ShapeInput::new(i, 1.0 + ((i * 37) % 17) as f64).with_group((i % 3) as u32))
        .collect();

    let mut targets = ForceTargets::default();
    for (group, x) in [(0, 130.0), (1, 260.0), (2, 390.0)] {
        targets.groups.insert(group, Point::new(x, 160.0));
    }
    let layout = ForceLayout::new(
        ForceLayoutOptions::default()
            .with_radius(RadiusScale::default().with_radius_range(4.0, 34.0))
            .with_cluster_strength(0.2),
    )?;
    let placed = layout.layout(&shapes, canvas, &targets);

    let mut scene = SvgScene::new(canvas_rect(canvas));
    for (i, s) in placed.iter().enumerate() {
        let color = PALETTE[s.group.unwrap_or(0) as usize % PALETTE.len()];
        scene.circle(z_order::PACKED_SHAPES + i as i32, s.circle(), color.with_alpha(0.8));
    }

    let mut overlap = 0.0;
    for (i, a) in placed.iter().enumerate() {
        for b in &placed[i + 1..] {
            overlap += plotfit_layout::circle_intersection_area(a.circle(), b.circle());
        }
    }
    Ok(HtmlSection::new("Clustered force layout", scene.to_svg_string())
        .with_note(format!("{} shapes in 3 groups", placed.len()))
        .with_note(format!("residual pairwise overlap area: {overlap:.1}")))
}

fn donut_demo(fitter: &Fitter) -> Result<HtmlSection, LayoutError> {
    // Donut with an icon at the outer edge of every segment; labels steer around it.
    let canvas = Size::new(420.0, 420.0);
    let center = Point::new(210.0, 210.0);
    let (inner, outer) = (70.0, 150.0);
    let rows = [
        ("Alpha", 30.0),
        ("Beta", 22.0),
        ("Gamma", 14.0),
        ("Delta", 9.0),
        ("Epsilon", 5.0),
    ];
    let total: f64 = rows.iter().map(|(_, v)| v).sum();
    let font = FontSpec::new(12.0);
    let search = RadialLabelSearch::default();

    let mut scene = SvgScene::new(canvas_rect(canvas));
    let mut notes = Vec::new();
    let mut start = -0.5 * PI;
    for (i, (name, value)) in rows.iter().enumerate() {
        let sweep = value / total * TAU;
        let end = start + sweep;
        let color = PALETTE[i % PALETTE.len()];
        let path: BezPath = Circle::new(center, outer)
            .segment(inner, start, sweep)
            .path_elements(0.1)
            .collect();
        scene.path(z_order::PACKED_SHAPES, path, color, Some((css::WHITE.into(), 1.5)));

        let mid = 0.5 * (start + end);
        let icon = center + Vec2::from_angle(mid) * outer;
        let obstacle = Obstacle::rect(icon.x - 10.0, icon.y - 10.0, 20.0, 20.0);
        scene.rect(z_order::OBSTACLES, obstacle.bounding_box(), css::DARK_SLATE_GRAY);

        let text = format!("{name} {:.0}%", value / total * 100.0);
        let extent = fitter.measure(&text, &font);
        let placement = search.place(&RadialLabelSpec {
            center,
            start_angle: start,
            end_angle: end,
            inner_radius: inner,
            outer_radius: outer,
            label_size: Size::new(extent.width, extent.height),
            obstacle,
        });
        let mut label = centered_label(
            placement.center,
            font.size_px,
            &text,
            vec![text.clone()],
            placement.bounds.size(),
        );
        label.can_show = placement.clear;
        scene.label(z_order::label_z(label.can_show), &label, css::BLACK);
        notes.push(format!("{name}: {:?} (clear: {})", placement.strategy, placement.clear));

        start = end;
    }

    let mut section = HtmlSection::new("Donut labels around icons", scene.to_svg_string());
    for note in notes {
        section = section.with_note(note);
    }
    Ok(section)
}

fn scatter_demo() -> Result<HtmlSection, LayoutError> {
    // Quasi-random points; labels try right, above, left, below.
    let canvas = Size::new(480.0, 320.0);
    let points: Vec<ScatterPoint> = (1..=40)
        .map(|i| {
            let t = f64::from(i);
            let x = 20.0 + 440.0 * (t * 0.618_033_988_75).fract();
            let y = 20.0 + 280.0 * (t * 0.754_877_666_25).fract();
            ScatterPoint::new((x, y), 3.0)
        })
        .collect();
    let names: Vec<String> = (1..=points.len()).map(|i| format!("P{i:02}")).collect();

    let placer = PointLabelPlacer::new(
        TextFitter::new(demo_measurer())?,
        PointLabelOptions::new(canvas_rect(canvas))
            .with_font(FontSpec::new(10.0))
            .with_max_width(60.0),
    )?;
    let labels = placer.place_all(&points, &names);

    let mut scene = SvgScene::new(canvas_rect(canvas));
    for p in &points {
        scene.circle(z_order::PACKED_SHAPES, Circle::new(p.position, p.radius), css::STEEL_BLUE);
    }
    for label in &labels {
        let fill = if label.can_show {
            css::BLACK
        } else {
            css::BLACK.with_alpha(0.3)
        };
        scene.label(z_order::label_z(label.can_show), label, fill);
    }

    let shown = labels.iter().filter(|l| l.can_show).count();
    Ok(HtmlSection::new("Scatter point labels", scene.to_svg_string())
        .with_note(format!("{shown} of {} labels placed without overlap", labels.len()))
        .with_note("fallback labels are drawn faded"))
}

fn line_end_demo(fitter: &Fitter) -> Result<HtmlSection, LayoutError> {
    // Series labels stacked at the right edge, kept off the target band.
    let canvas = Size::new(480.0, 320.0);
    let plot = Rect::new(20.0, 20.0, 360.0, 300.0);
    let band = (196.0, 206.0);
    let font = FontSpec::new(11.0);
    let line_height = fitter.line_height(&font);

    let series: Vec<(String, Vec<f64>)> = (0..8)
        .map(|s| {
            let s = f64::from(s);
            let ys = (0..=12)
                .map(|k| {
                    let t = f64::from(k) / 12.0;
                    60.0 + 180.0 * (0.5 + 0.45 * (t * (1.5 + 0.3 * s) + s).sin())
                })
                .collect();
            (format!("Series {}", s as u32 + 1), ys)
        })
        .collect();
    let ends: Vec<f64> = series
        .iter()
        .map(|(_, ys)| ys.last().copied().unwrap_or(plot.y0))
        .collect();

    let placer = SequentialLabelPlacer::new(
        SequentialLabelSpec::new(line_height, 2.0, (plot.y0, plot.y1)).with_forbidden(band.0, band.1),
    )?;
    let layout = placer.place(&ends);

    let mut scene = SvgScene::new(canvas_rect(canvas));
    scene.rect(
        z_order::OBSTACLES,
        Rect::new(plot.x1 + 4.0, band.0, canvas.width, band.1),
        css::LIGHT_GRAY,
    );
    for (i, ((name, ys), slot)) in series.iter().zip(&layout.slots).enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let mut path = BezPath::new();
        for (k, y) in ys.iter().enumerate() {
            let x = plot.x0 + plot.width() * k as f64 / (ys.len() - 1) as f64;
            if k == 0 {
                path.move_to((x, *y));
            } else {
                path.line_to((x, *y));
            }
        }
        scene.path(z_order::PACKED_SHAPES, path, Color::TRANSPARENT, Some((color.into(), 2.0)));

        let position = Point::new(plot.x1 + 12.0, slot.top);
        let size = fitter.measure_lines(std::slice::from_ref(name), &font);
        let label = PlacedLabel {
            position,
            anchor: TextAnchor::Start,
            baseline: TextBaseline::Top,
            font_size_px: font.size_px,
            text: name.clone(),
            lines: vec![name.clone()],
            bounds: label_rect(position, size, TextAnchor::Start, TextBaseline::Top),
            can_show: layout.feasible,
        };
        scene.line(
            z_order::OBSTACLES,
            Point::new(plot.x1, ends[i]),
            Point::new(plot.x1 + 10.0, slot.top + 0.5 * line_height),
            color,
            1.0,
        );
        scene.label(z_order::label_z(label.can_show), &label, color);
    }

    Ok(HtmlSection::new("Line-end labels", scene.to_svg_string())
        .with_note(format!(
            "feasible: {}, total displacement {:.1}px",
            layout.feasible, layout.cost
        ))
        .with_note("the grey band is reserved and never covered by a label"))
}
