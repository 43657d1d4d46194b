// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Symbol helpers for point-like marks.

use kurbo::{BezPath, Circle, Rect, Shape};

/// A small set of symbol shapes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// A circle.
    #[default]
    Circle,
    /// A square (axis-aligned).
    Square,
    /// A plus sign with arms one third of the size thick.
    Cross,
    /// A square rotated by 45 degrees.
    Diamond,
    /// A triangle pointing up.
    TriangleUp,
    /// A triangle pointing down.
    TriangleDown,
}

impl Symbol {
    /// All symbols, in a stable order suitable for categorical assignment.
    pub const ALL: [Self; 6] = [
        Self::Circle,
        Self::Square,
        Self::Cross,
        Self::Diamond,
        Self::TriangleUp,
        Self::TriangleDown,
    ];

    /// Returns a path for this symbol centered at `cx, cy`, using `size` as the diameter/side.
    pub fn path(self, cx: f64, cy: f64, size: f64) -> BezPath {
        let size = size.max(0.0);
        match self {
            Self::Circle => circle_path(cx, cy, size),
            Self::Square => square_path(cx, cy, size),
            Self::Cross => cross_path(cx, cy, size),
            Self::Diamond => polygon(&[
                (cx, cy - size * 0.5),
                (cx + size * 0.5, cy),
                (cx, cy + size * 0.5),
                (cx - size * 0.5, cy),
            ]),
            Self::TriangleUp => polygon(&[
                (cx, cy - size * 0.5),
                (cx + size * 0.5, cy + size * 0.5),
                (cx - size * 0.5, cy + size * 0.5),
            ]),
            Self::TriangleDown => polygon(&[
                (cx - size * 0.5, cy - size * 0.5),
                (cx + size * 0.5, cy - size * 0.5),
                (cx, cy + size * 0.5),
            ]),
        }
    }

    /// Returns the axis-aligned bounds of the symbol.
    ///
    /// Every symbol fits the `size x size` square centered at `cx, cy`.
    pub fn bounds(self, cx: f64, cy: f64, size: f64) -> Rect {
        let half = size.max(0.0) * 0.5;
        Rect::new(cx - half, cy - half, cx + half, cy + half)
    }
}

fn square_path(cx: f64, cy: f64, size: f64) -> BezPath {
    let half = size * 0.5;
    polygon(&[
        (cx - half, cy - half),
        (cx + half, cy - half),
        (cx + half, cy + half),
        (cx - half, cy + half),
    ])
}

fn cross_path(cx: f64, cy: f64, size: f64) -> BezPath {
    let h = size * 0.5;
    let t = size / 6.0;
    polygon(&[
        (cx - t, cy - h),
        (cx + t, cy - h),
        (cx + t, cy - t),
        (cx + h, cy - t),
        (cx + h, cy + t),
        (cx + t, cy + t),
        (cx + t, cy + h),
        (cx - t, cy + h),
        (cx - t, cy + t),
        (cx - h, cy + t),
        (cx - h, cy - t),
        (cx - t, cy - t),
    ])
}

fn circle_path(cx: f64, cy: f64, size: f64) -> BezPath {
    let circle = Circle::new((cx, cy), size * 0.5);
    // Renderers usually pick the tolerance from the device pixel size.
    let tolerance = 0.1;
    circle.path_elements(tolerance).collect()
}

fn polygon(points: &[(f64, f64)]) -> BezPath {
    let mut p = BezPath::new();
    let mut iter = points.iter().copied();
    if let Some(first) = iter.next() {
        p.move_to(first);
        for pt in iter {
            p.line_to(pt);
        }
        p.close_path();
    }
    p
}
