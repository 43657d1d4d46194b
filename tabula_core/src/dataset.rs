// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named tabular datasets.

use alloc::string::String;
use alloc::vec::Vec;

use crate::Value;

/// A named table of rows, addressed by field name.
///
/// Every row has exactly one value per field; short rows are padded with
/// [`Value::Null`] and long rows truncated on insertion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    name: String,
    fields: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Creates an empty dataset with the given field names.
    pub fn new<S: Into<String>>(name: impl Into<String>, fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Creates a single-field dataset from a list of values.
    pub fn from_values<V: Into<Value>>(
        name: impl Into<String>,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let field: String = field.into();
        let mut out = Self::new(name, [field]);
        for v in values {
            out.push_row(alloc::vec![v.into()]);
        }
        out
    }

    /// Appends rows.
    pub fn with_rows(mut self, rows: impl IntoIterator<Item = Vec<Value>>) -> Self {
        for row in rows {
            self.push_row(row);
        }
        self
    }

    /// Appends a row, normalizing its length to the field count.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.fields.len(), Value::Null);
        self.rows.push(row);
    }

    /// Removes all rows.
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Returns the dataset name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the field names.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Returns the column index for a field name.
    pub fn field_index(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field)
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns a view of row `index`.
    pub fn datum(&self, index: usize) -> Option<Datum<'_>> {
        (index < self.rows.len()).then_some(Datum {
            dataset: self,
            index,
        })
    }

    /// Iterates rows in order.
    pub fn iter(&self) -> impl Iterator<Item = Datum<'_>> + '_ {
        (0..self.rows.len()).map(move |index| Datum {
            dataset: self,
            index,
        })
    }
}

/// A borrowed row of a [`Dataset`].
#[derive(Clone, Copy, Debug)]
pub struct Datum<'a> {
    dataset: &'a Dataset,
    index: usize,
}

impl<'a> Datum<'a> {
    /// Row index within the dataset.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The owning dataset.
    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// All values of this row, aligned with [`Dataset::fields`].
    pub fn values(&self) -> &'a [Value] {
        &self.dataset.rows[self.index]
    }

    /// Looks up a field by name.
    pub fn get(&self, field: &str) -> Option<&'a Value> {
        let col = self.dataset.field_index(field)?;
        self.values().get(col)
    }

    /// Looks up a numeric field by name.
    pub fn f64(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(Value::as_f64)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    #[test]
    fn rows_are_normalized_to_field_count() {
        let ds = Dataset::new("d", ["a", "b"])
            .with_rows([vec![Value::from(1.0)], vec![1.0.into(), 2.0.into(), 3.0.into()]]);
        assert_eq!(ds.len(), 2);
        let d0 = ds.datum(0).expect("row 0");
        assert_eq!(d0.values().len(), 2);
        assert!(d0.get("b").expect("field b").is_null());
        assert_eq!(ds.datum(1).and_then(|d| d.f64("b")), Some(2.0));
        assert!(ds.datum(2).is_none());
    }

    #[test]
    fn clear_keeps_fields() {
        let mut ds = Dataset::from_values("d", "v", [1.0, 2.0]);
        ds.clear();
        assert!(ds.is_empty());
        assert_eq!(ds.field_index("v"), Some(0));
        ds.push_row(alloc::vec![Value::from(3.0)]);
        assert_eq!(ds.datum(0).and_then(|d| d.f64("v")), Some(3.0));
    }
}
