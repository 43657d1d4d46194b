// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dynamically typed values flowing from data through accessors into visual attributes.

use alloc::string::String;

use peniko::Color;

use crate::Symbol;

/// A raw datum field or a projected visual attribute.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Missing value.
    #[default]
    Null,
    /// A number (positions, sizes, radii, opacities, raw quantities).
    Number(f64),
    /// A string (categories, labels).
    Text(String),
    /// A paint color.
    Color(Color),
    /// A point glyph shape.
    Symbol(Symbol),
}

impl Value {
    /// Returns the number, if this is [`Value::Number`].
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string, if this is [`Value::Text`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the color, if this is [`Value::Color`].
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// Returns the symbol, if this is [`Value::Symbol`].
    pub fn as_symbol(&self) -> Option<Symbol> {
        match self {
            Self::Symbol(s) => Some(*s),
            _ => None,
        }
    }

    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Interpolates from `self` towards `to` at progress `t` in `[0, 1]`.
    ///
    /// Numbers and colors interpolate; any other pair switches to `to` immediately.
    /// At `t >= 1` the result is exactly `to`.
    pub fn lerp(&self, to: &Self, t: f64) -> Self {
        if t >= 1.0 {
            return to.clone();
        }
        match (self, to) {
            (Self::Number(a), Self::Number(b)) => Self::Number(a + (b - a) * t),
            (Self::Color(a), Self::Color(b)) => {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "interpolation progress only needs f32 precision"
                )]
                let t = t as f32;
                let mut c = [0.0_f32; 4];
                for (i, out) in c.iter_mut().enumerate() {
                    let x = a.components[i];
                    *out = x + (b.components[i] - x) * t;
                }
                Self::Color(Color::new(c))
            }
            _ => to.clone(),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Color> for Value {
    fn from(value: Color) -> Self {
        Self::Color(value)
    }
}

impl From<Symbol> for Value {
    fn from(value: Symbol) -> Self {
        Self::Symbol(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use peniko::color::palette::css;

    use super::*;

    #[test]
    fn numbers_interpolate_and_land_exactly() {
        let a = Value::from(0.0);
        let b = Value::from(10.0);
        assert_eq!(a.lerp(&b, 0.25), Value::Number(2.5));
        assert_eq!(a.lerp(&b, 1.0), b);
    }

    #[test]
    fn non_numeric_values_switch_immediately() {
        let a = Value::from(Symbol::Square);
        let b = Value::from(Symbol::Circle);
        assert_eq!(a.lerp(&b, 0.0), b);
        assert_eq!(Value::Null.lerp(&Value::from(3.0), 0.5), Value::Number(3.0));
    }

    #[test]
    fn colors_interpolate_per_component() {
        let a = Value::from(css::BLACK);
        let b = Value::from(css::WHITE);
        let mid = a.lerp(&b, 0.5).as_color().expect("color");
        assert!((mid.components[0] - 0.5).abs() < 1e-6);
        assert!((mid.components[3] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn options_map_none_to_null() {
        assert!(Value::from(None::<f64>).is_null());
        assert_eq!(Value::from(Some("a")).as_str(), Some("a"));
    }
}
