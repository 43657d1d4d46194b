// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tiny scale utilities.
//!
//! Plots treat scales as opaque `Value -> Value` maps whose output range they resize on
//! layout. Two concrete scales cover what the built-in plots need: a linear scale for
//! positions and radii, and a categorical color scale for fills.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use peniko::Color;
use tabula_core::{Dataset, Value};

/// Maps data values to visual values.
pub trait Scale: fmt::Debug {
    /// Maps a value from domain space into range space.
    fn map(&self, value: &Value) -> Value;

    /// Replaces the output range. Categorical scales may ignore it.
    fn set_range(&mut self, range: (f64, f64));
}

/// A linear mapping from a continuous domain to a continuous range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleLinear {
    domain: (f64, f64),
    range: (f64, f64),
}

impl ScaleLinear {
    /// Creates a new scale mapping `domain` values to `range` values.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Creates a scale over `domain` with a unit range, to be resized by layout.
    pub fn with_domain(domain: (f64, f64)) -> Self {
        Self::new(domain, (0.0, 1.0))
    }

    /// Maps a number from domain space into range space.
    pub fn map_f64(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let denom = d1 - d0;
        if denom == 0.0 {
            return r0;
        }
        let t = (x - d0) / denom;
        r0 + t * (r1 - r0)
    }

    /// Returns the domain.
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    /// Returns the range.
    pub fn range(&self) -> (f64, f64) {
        self.range
    }
}

impl Scale for ScaleLinear {
    fn map(&self, value: &Value) -> Value {
        match value.as_f64() {
            Some(x) => Value::Number(self.map_f64(x)),
            None => Value::Null,
        }
    }

    fn set_range(&mut self, range: (f64, f64)) {
        self.range = range;
    }
}

/// The default categorical palette.
pub const CATEGORY_COLORS: [Color; 10] = [
    Color::from_rgb8(0x52, 0x79, 0xc7),
    Color::from_rgb8(0xfd, 0x37, 0x3e),
    Color::from_rgb8(0x63, 0xc2, 0x61),
    Color::from_rgb8(0xfa, 0xd4, 0x19),
    Color::from_rgb8(0x2c, 0x2b, 0x6f),
    Color::from_rgb8(0xff, 0x79, 0x39),
    Color::from_rgb8(0xdb, 0x27, 0x10),
    Color::from_rgb8(0x99, 0xce, 0x50),
    Color::from_rgb8(0x96, 0x2a, 0x6b),
    Color::from_rgb8(0x55, 0x55, 0x55),
];

/// A categorical color scale.
///
/// Numbers are treated as category indices; strings are looked up in the domain, and
/// unknown strings map to [`Value::Null`]. Indices wrap around the palette.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleColor {
    domain: Vec<String>,
    palette: Vec<Color>,
}

impl Default for ScaleColor {
    fn default() -> Self {
        Self {
            domain: Vec::new(),
            palette: CATEGORY_COLORS.to_vec(),
        }
    }
}

impl ScaleColor {
    /// Creates a scale over the default palette.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the category names, in palette order.
    pub fn with_domain<S: Into<String>>(mut self, domain: impl IntoIterator<Item = S>) -> Self {
        self.domain = domain.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the palette. An empty palette is ignored.
    pub fn with_palette(mut self, palette: impl IntoIterator<Item = Color>) -> Self {
        let palette: Vec<Color> = palette.into_iter().collect();
        if !palette.is_empty() {
            self.palette = palette;
        }
        self
    }

    /// Returns the color for a category index.
    pub fn color(&self, index: usize) -> Color {
        self.palette[index % self.palette.len()]
    }
}

impl Scale for ScaleColor {
    fn map(&self, value: &Value) -> Value {
        match value {
            Value::Number(x) if x.is_finite() && *x >= 0.0 => {
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    reason = "checked finite and non-negative; category indices are small"
                )]
                let index = *x as usize;
                Value::Color(self.color(index))
            }
            Value::Text(s) => match self.domain.iter().position(|d| d == s) {
                Some(index) => Value::Color(self.color(index)),
                None => Value::Null,
            },
            _ => Value::Null,
        }
    }

    fn set_range(&mut self, _range: (f64, f64)) {}
}

/// Infer a `(min, max)` domain for a numeric field.
///
/// Non-finite and non-numeric values are ignored. Returns `None` if no finite values
/// are present.
pub fn infer_domain_f64(data: &Dataset, field: &str) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for datum in data.iter() {
        let Some(v) = datum.f64(field) else {
            continue;
        };
        if !v.is_finite() {
            continue;
        }
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() {
        Some((min, max))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn linear_scale_maps_endpoints_and_tracks_range() {
        let mut s = ScaleLinear::with_domain((0.0, 10.0));
        s.set_range((100.0, 0.0));
        assert_eq!(s.map(&Value::from(0.0)), Value::Number(100.0));
        assert_eq!(s.map(&Value::from(5.0)), Value::Number(50.0));
        assert!(s.map(&Value::from("x")).is_null());
        assert_eq!(ScaleLinear::new((1.0, 1.0), (3.0, 4.0)).map_f64(7.0), 3.0);
    }

    #[test]
    fn color_scale_wraps_indices_and_looks_up_names() {
        let s = ScaleColor::new().with_domain(["a", "b"]);
        assert_eq!(s.map(&Value::from(0.0)), Value::Color(CATEGORY_COLORS[0]));
        assert_eq!(s.map(&Value::from(10.0)), Value::Color(CATEGORY_COLORS[0]));
        assert_eq!(s.map(&Value::from("b")), Value::Color(CATEGORY_COLORS[1]));
        assert!(s.map(&Value::from("z")).is_null());
        assert!(s.map(&Value::from(-1.0)).is_null());
    }

    #[test]
    fn domain_inference_skips_missing_values() {
        let ds = Dataset::new("d", ["v"]).with_rows([
            alloc::vec![Value::from(3.0)],
            alloc::vec![Value::Null],
            alloc::vec![Value::from(-2.0)],
            alloc::vec![Value::from(f64::NAN)],
        ]);
        assert_eq!(infer_domain_f64(&ds, "v"), Some((-2.0, 3.0)));
        assert_eq!(infer_domain_f64(&ds, "missing"), None);
    }
}
