// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal SVG dump utilities for `tabula_charts_demo`.

use std::fmt::Write as _;

use kurbo::{Affine, BezPath, Rect, Shape};
use peniko::Color;
use peniko::color::palette::css;
use tabula_core::{Scene, Value, attr, mark_path};

#[derive(Debug)]
struct PathItem {
    path: BezPath,
    fill: Color,
    opacity: f64,
}

#[derive(Debug)]
struct TitleItem {
    frame: Rect,
    text: String,
}

#[derive(Debug, Default)]
pub(crate) struct SvgScene {
    frames: Vec<Rect>,
    titles: Vec<TitleItem>,
    paths: Vec<PathItem>,
    view_box: Option<Rect>,
}

impl SvgScene {
    pub(crate) fn set_view_box(&mut self, view_box: Rect) {
        self.view_box = Some(view_box);
    }

    /// Outlines a component frame.
    pub(crate) fn add_frame(&mut self, frame: Rect) {
        self.frames.push(frame);
    }

    /// Centers `text` in `frame`.
    pub(crate) fn add_title(&mut self, frame: Rect, text: impl Into<String>) {
        self.titles.push(TitleItem {
            frame,
            text: text.into(),
        });
    }

    /// Snapshots every element of `scene` at the scene's current time.
    pub(crate) fn apply_scene(&mut self, scene: &Scene) {
        let now = scene.now();
        for layer in scene.layers() {
            let transform = Affine::translate(layer.translate);
            for element in layer.elements() {
                let attrs = element.attrs_at(now);
                let fill = attrs
                    .get(attr::FILL)
                    .and_then(Value::as_color)
                    .unwrap_or(css::BLACK);
                let opacity = attrs
                    .get(attr::OPACITY)
                    .and_then(Value::as_f64)
                    .unwrap_or(1.0);
                self.paths.push(PathItem {
                    path: transform * mark_path(layer.kind(), &attrs),
                    fill,
                    opacity,
                });
            }
        }
    }

    pub(crate) fn to_svg_string(&self) -> String {
        let view_box = match (self.view_box, self.view_box()) {
            (Some(a), Some(b)) => Some(a.union(b)),
            (a, b) => a.or(b),
        };
        let view_box = view_box.unwrap_or_else(|| Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut out = String::new();

        out.push_str(r#"<svg xmlns="http://www.w3.org/2000/svg" "#);
        let _ = writeln!(
            out,
            r#"viewBox="{} {} {} {}" width="{}" height="{}" preserveAspectRatio="xMinYMin meet">"#,
            view_box.x0,
            view_box.y0,
            view_box.width(),
            view_box.height(),
            view_box.width(),
            view_box.height()
        );

        for r in &self.frames {
            let _ = writeln!(
                out,
                r##"<rect x="{}" y="{}" width="{}" height="{}" fill="none" stroke="#d0d0d0"/>"##,
                r.x0,
                r.y0,
                r.width(),
                r.height(),
            );
        }

        for t in &self.titles {
            let center = t.frame.center();
            let _ = writeln!(
                out,
                r#"<text x="{}" y="{}" font-size="16" dominant-baseline="middle" text-anchor="middle">{}</text>"#,
                center.x,
                center.y,
                escape_xml(&t.text)
            );
        }

        for p in &self.paths {
            let _ = write!(out, r#"<path d="{}""#, p.path.to_svg());
            write_paint_attr(&mut out, "fill", p.fill, p.opacity);
            out.push_str("/>\n");
        }

        out.push_str("</svg>\n");
        out
    }

    fn view_box(&self) -> Option<Rect> {
        let rect = self
            .paths
            .iter()
            .map(|p| p.path.bounding_box())
            .chain(self.frames.iter().copied())
            .reduce(|a, b| a.union(b));

        rect.map(|r| {
            // Add a small padding margin.
            r.inflate(10.0, 10.0)
        })
    }
}

fn svg_paint(color: Color, opacity: f64) -> (String, Option<f64>) {
    let rgba = color.to_rgba8();
    let fill = format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b);
    let alpha = f64::from(rgba.a) / 255.0 * opacity.clamp(0.0, 1.0);
    let fill_opacity = if alpha >= 1.0 { None } else { Some(alpha) };
    (fill, fill_opacity)
}

fn write_paint_attr(out: &mut String, name: &str, color: Color, opacity: f64) {
    let (value, opacity) = svg_paint(color, opacity);
    let _ = write!(out, r#" {name}="{value}""#);
    if let Some(o) = opacity {
        let _ = write!(out, r#" {name}-opacity="{o}""#);
    }
}

fn escape_xml(s: &str) -> String {
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
