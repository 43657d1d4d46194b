// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Value formatters for labels.

extern crate alloc;

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use core::fmt;

use tabula_core::Value;

/// Turns a value into label text.
pub trait Formatter: fmt::Debug {
    /// Number of decimal places to show.
    fn precision(&self) -> usize;

    /// Formats `value`.
    fn format(&self, value: &Value) -> String;
}

/// Errors raised while building a formatter.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// [`CustomFormatterBuilder::build`] was called without a format function.
    #[error("custom formatters require a formatting function")]
    MissingFormatFunction,
}

/// Fixed-precision number formatting.
///
/// Text passes through unchanged; other non-numeric values format as empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedFormatter {
    /// Decimal places.
    pub precision: usize,
    /// If set, numbers that would be changed by rounding format as empty.
    pub only_show_unchanged: bool,
}

impl FixedFormatter {
    /// Creates a formatter with `precision` decimal places.
    pub fn new(precision: usize) -> Self {
        Self {
            precision,
            only_show_unchanged: false,
        }
    }

    /// Hides numbers that rounding would change.
    pub fn with_only_show_unchanged(mut self, only_show_unchanged: bool) -> Self {
        self.only_show_unchanged = only_show_unchanged;
        self
    }
}

impl Formatter for FixedFormatter {
    fn precision(&self) -> usize {
        self.precision
    }

    fn format(&self, value: &Value) -> String {
        match value {
            Value::Number(v) => {
                let text = format!("{:.*}", self.precision, v);
                if self.only_show_unchanged && text.parse::<f64>().ok() != Some(*v) {
                    return String::new();
                }
                text
            }
            Value::Text(s) => s.clone(),
            _ => String::new(),
        }
    }
}

type FormatFn = dyn Fn(&Value, &CustomFormatter) -> String;

/// Formatting delegated to a user function.
///
/// The function receives the value and the formatter itself, so it can honor
/// [`Formatter::precision`].
pub struct CustomFormatter {
    precision: usize,
    format_fn: Box<FormatFn>,
}

impl fmt::Debug for CustomFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomFormatter")
            .field("precision", &self.precision)
            .finish_non_exhaustive()
    }
}

impl CustomFormatter {
    /// Starts a builder with precision 0 and no function.
    pub fn builder() -> CustomFormatterBuilder {
        CustomFormatterBuilder::default()
    }
}

impl Formatter for CustomFormatter {
    fn precision(&self) -> usize {
        self.precision
    }

    fn format(&self, value: &Value) -> String {
        (self.format_fn)(value, self)
    }
}

/// Builder for [`CustomFormatter`].
#[derive(Default)]
pub struct CustomFormatterBuilder {
    precision: usize,
    format_fn: Option<Box<FormatFn>>,
}

impl fmt::Debug for CustomFormatterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomFormatterBuilder")
            .field("precision", &self.precision)
            .field("has_format_fn", &self.format_fn.is_some())
            .finish()
    }
}

impl CustomFormatterBuilder {
    /// Sets the precision passed along to the format function.
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Sets the format function.
    pub fn format_fn(
        mut self,
        format_fn: impl Fn(&Value, &CustomFormatter) -> String + 'static,
    ) -> Self {
        self.format_fn = Some(Box::new(format_fn));
        self
    }

    /// Builds the formatter, failing if no format function was given.
    pub fn build(self) -> Result<CustomFormatter, ConfigurationError> {
        let format_fn = self
            .format_fn
            .ok_or(ConfigurationError::MissingFormatFunction)?;
        Ok(CustomFormatter {
            precision: self.precision,
            format_fn,
        })
    }
}
