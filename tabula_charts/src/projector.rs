// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compiling property bindings into per-datum projectors.

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::String;

use hashbrown::HashMap;
use tabula_core::{AttrMap, Dataset, Datum, Value};

use crate::PropertyBindings;

/// Computes one visual attribute for a datum.
pub type Projector<'a> = Box<dyn Fn(Datum<'_>, usize, &Dataset) -> Value + 'a>;

/// Attribute key -> projector.
pub type AttrToProjector<'a> = HashMap<String, Projector<'a>>;

/// Boxes a closure as a [`Projector`].
pub fn projector<'a>(f: impl Fn(Datum<'_>, usize, &Dataset) -> Value + 'a) -> Projector<'a> {
    Box::new(f)
}

/// A projector returning `value` for every datum.
pub fn constant<'a>(value: impl Into<Value>) -> Projector<'a> {
    let value = value.into();
    projector(move |_, _, _| value.clone())
}

/// Layout facts available to default projectors.
///
/// Defaults that depend on the plot's size read them from here rather than from the
/// plot itself.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProjectionContext {
    /// Plot width.
    pub width: f64,
    /// Plot height.
    pub height: f64,
}

impl ProjectionContext {
    /// Creates a context for a plot of the given size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Compiles every binding into a projector: `scale(accessor(..))`, or the bare accessor.
pub fn generate_attr_to_projector(bindings: &PropertyBindings) -> AttrToProjector<'_> {
    bindings
        .iter()
        .map(|(key, binding)| {
            let p = projector(move |d, i, ds| binding.project(d, i, ds));
            (String::from(key), p)
        })
        .collect()
}

/// Inserts `projector` for `key` unless the key is already projected.
pub fn insert_default<'a>(map: &mut AttrToProjector<'a>, key: &str, projector: Projector<'a>) {
    if !map.contains_key(key) {
        map.insert(key.into(), projector);
    }
}

/// Evaluates every projector for one datum.
pub fn project_datum(map: &AttrToProjector<'_>, datum: Datum<'_>, dataset: &Dataset) -> AttrMap {
    map.iter()
        .map(|(key, p)| (key.clone(), p(datum, datum.index(), dataset)))
        .collect()
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;
    use crate::{Accessor, ScaleLinear};

    #[test]
    fn bindings_compile_and_defaults_never_override() {
        let ds = Dataset::new("d", ["v"]).with_rows([vec![Value::from(1.0)]]);
        let mut bindings = PropertyBindings::new();
        bindings.set_scaled("x", Accessor::field("v"), ScaleLinear::new((0.0, 2.0), (0.0, 10.0)));
        bindings.set_value("size", 3.0);

        let mut map = generate_attr_to_projector(&bindings);
        insert_default(&mut map, "size", constant(6.0));
        insert_default(&mut map, "opacity", constant(0.6));

        let d = ds.datum(0).expect("row");
        let attrs = project_datum(&map, d, &ds);
        assert_eq!(attrs.len(), 3);
        assert_eq!(attrs["x"], Value::from(5.0));
        assert_eq!(attrs["size"], Value::from(3.0));
        assert_eq!(attrs["opacity"], Value::from(0.6));
    }
}
