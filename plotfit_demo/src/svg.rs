// Copyright 2025 the Plotfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal SVG dump utilities for `plotfit_demo`.

use kurbo::{BezPath, Circle, Point, Rect};
use peniko::Brush;
use plotfit_layout::{PlacedLabel, TextAnchor};

#[derive(Debug)]
enum Item {
    Circle(Circle),
    Rect(Rect),
    Path(BezPath),
    Text {
        pos: Point,
        font_size: f64,
        anchor: TextAnchor,
        text: String,
    },
}

#[derive(Debug)]
struct Entry {
    z_index: i32,
    item: Item,
    fill: Brush,
    stroke: Option<(Brush, f64)>,
}

/// A flat list of z-ordered primitives.
#[derive(Debug)]
pub(crate) struct SvgScene {
    entries: Vec<Entry>,
    view_box: Rect,
}

impl SvgScene {
    pub(crate) fn new(view_box: Rect) -> Self {
        Self {
            entries: Vec::new(),
            view_box,
        }
    }

    pub(crate) fn circle(&mut self, z_index: i32, circle: Circle, fill: impl Into<Brush>) {
        self.push(z_index, Item::Circle(circle), fill.into(), None);
    }

    pub(crate) fn rect(&mut self, z_index: i32, rect: Rect, fill: impl Into<Brush>) {
        self.push(z_index, Item::Rect(rect), fill.into(), None);
    }

    pub(crate) fn path(
        &mut self,
        z_index: i32,
        path: BezPath,
        fill: impl Into<Brush>,
        stroke: Option<(Brush, f64)>,
    ) {
        self.push(z_index, Item::Path(path), fill.into(), stroke);
    }

    pub(crate) fn line(&mut self, z_index: i32, from: Point, to: Point, stroke: impl Into<Brush>, width: f64) {
        let mut path = BezPath::new();
        path.move_to(from);
        path.line_to(to);
        self.push(
            z_index,
            Item::Path(path),
            Brush::Solid(peniko::Color::TRANSPARENT),
            Some((stroke.into(), width)),
        );
    }

    /// One `<text>` per line, vertically centered within the label bounds.
    pub(crate) fn label(&mut self, z_index: i32, label: &PlacedLabel, fill: impl Into<Brush>) {
        let fill = fill.into();
        let b = label.bounds;
        let count = label.lines.len().max(1) as f64;
        let line_height = b.height() / count;
        let x = match label.anchor {
            TextAnchor::Start => b.x0,
            TextAnchor::Middle => 0.5 * (b.x0 + b.x1),
            TextAnchor::End => b.x1,
        };
        for (i, line) in label.lines.iter().enumerate() {
            let y = b.y0 + (i as f64 + 0.5) * line_height;
            self.push(
                z_index,
                Item::Text {
                    pos: Point::new(x, y),
                    font_size: label.font_size_px,
                    anchor: label.anchor,
                    text: line.clone(),
                },
                fill.clone(),
                None,
            );
        }
    }

    fn push(&mut self, z_index: i32, item: Item, fill: Brush, stroke: Option<(Brush, f64)>) {
        self.entries.push(Entry {
            z_index,
            item,
            fill,
            stroke,
        });
    }

    pub(crate) fn to_svg_string(&self) -> String {
        let v = self.view_box;
        let mut out = String::new();
        out.push_str(r#"<svg xmlns="http://www.w3.org/2000/svg" "#);
        out.push_str(&format!(
            r#"viewBox="{} {} {} {}" width="{}" height="{}" preserveAspectRatio="xMinYMin meet">"#,
            v.x0,
            v.y0,
            v.width(),
            v.height(),
            v.width(),
            v.height()
        ));
        out.push('\n');

        // Stable sort: insertion order breaks z ties.
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by_key(|&i| self.entries[i].z_index);

        for i in order {
            let entry = &self.entries[i];
            match &entry.item {
                Item::Circle(c) => {
                    out.push_str(&format!(
                        r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}""#,
                        c.center.x, c.center.y, c.radius
                    ));
                }
                Item::Rect(r) => {
                    out.push_str(&format!(
                        r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}""#,
                        r.x0,
                        r.y0,
                        r.width(),
                        r.height()
                    ));
                }
                Item::Path(p) => {
                    out.push_str(&format!(r#"<path d="{}""#, p.to_svg()));
                }
                Item::Text {
                    pos,
                    font_size,
                    anchor,
                    text,
                } => {
                    out.push_str(&format!(
                        r#"<text x="{:.2}" y="{:.2}" font-size="{font_size:.1}" font-family="sans-serif" dominant-baseline="middle""#,
                        pos.x, pos.y
                    ));
                    out.push_str(match anchor {
                        TextAnchor::Start => r#" text-anchor="start""#,
                        TextAnchor::Middle => r#" text-anchor="middle""#,
                        TextAnchor::End => r#" text-anchor="end""#,
                    });
                    write_paint_attr(&mut out, "fill", &entry.fill);
                    out.push('>');
                    out.push_str(&escape_xml(text));
                    out.push_str("</text>\n");
                    continue;
                }
            }
            write_paint_attr(&mut out, "fill", &entry.fill);
            if let Some((stroke, width)) = &entry.stroke {
                write_paint_attr(&mut out, "stroke", stroke);
                out.push_str(&format!(r#" stroke-width="{width}""#));
            }
            out.push_str("/>\n");
        }

        out.push_str("</svg>\n");
        out
    }
}

fn svg_paint(brush: &Brush) -> (String, Option<f64>) {
    match brush {
        Brush::Solid(color) => {
            let rgba = color.to_rgba8();
            if rgba.a == 0 {
                return ("none".to_string(), None);
            }
            let fill = format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b);
            let opacity = if rgba.a == 255 {
                None
            } else {
                Some(f64::from(rgba.a) / 255.0)
            };
            (fill, opacity)
        }
        _ => ("none".to_string(), None),
    }
}

fn write_paint_attr(out: &mut String, name: &str, brush: &Brush) {
    let (value, opacity) = svg_paint(brush);
    out.push_str(&format!(r#" {name}="{value}""#));
    if let Some(o) = opacity {
        out.push_str(&format!(r#" {name}-opacity="{o:.3}""#));
    }
}

pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use peniko::color::palette::css;

    use super::*;

    #[test]
    fn entries_are_emitted_in_z_order() {
        let mut scene = SvgScene::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        scene.rect(5, Rect::new(0.0, 0.0, 1.0, 1.0), css::TOMATO);
        scene.circle(1, Circle::new((5.0, 5.0), 2.0), css::GOLD);
        let svg = scene.to_svg_string();
        let circle = svg.find("<circle").unwrap();
        let rect = svg.find("<rect").unwrap();
        assert!(circle < rect, "lower z first:\n{svg}");
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(escape_xml("a<b & 'c'"), "a&lt;b &amp; &apos;c&apos;");
    }
}
