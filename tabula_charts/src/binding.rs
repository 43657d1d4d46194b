// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property bindings: named visual attributes bound to data.
//!
//! A binding pairs an [`Accessor`] that reads a raw value from a datum with an optional
//! [`Scale`] that turns it into a visual value. Plots keep one binding per attribute key
//! and fill in defaults for keys the user never bound.

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use hashbrown::HashMap;
use peniko::Color;
use tabula_core::{Dataset, Datum, Symbol, Value};

use crate::Scale;

type AccessorFn = dyn Fn(Datum<'_>, usize, &Dataset) -> Value;

/// Reads a raw value for one datum.
///
/// Accessors receive the datum, its index, and the dataset it belongs to.
pub struct Accessor(Box<AccessorFn>);

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Accessor").finish_non_exhaustive()
    }
}

impl Accessor {
    /// Wraps a closure.
    pub fn new(f: impl Fn(Datum<'_>, usize, &Dataset) -> Value + 'static) -> Self {
        Self(Box::new(f))
    }

    /// An accessor returning the same value for every datum.
    pub fn constant(value: impl Into<Value>) -> Self {
        let value = value.into();
        Self::new(move |_, _, _| value.clone())
    }

    /// An accessor reading a field by name; missing fields read as [`Value::Null`].
    pub fn field(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(move |d, _, _| d.get(&name).cloned().unwrap_or_default())
    }

    /// An accessor returning the datum's index as a number.
    pub fn index() -> Self {
        Self::new(|_, i, _| Value::Number(i as f64))
    }

    /// Evaluates the accessor.
    pub fn call(&self, datum: Datum<'_>, index: usize, dataset: &Dataset) -> Value {
        (self.0)(datum, index, dataset)
    }
}

/// What a binding reads from: a constant or an accessor.
#[derive(Debug)]
pub enum BindingSource {
    /// A constant, wrapped into a constant accessor.
    Value(Value),
    /// A per-datum accessor, stored as is.
    Accessor(Accessor),
}

impl BindingSource {
    fn into_accessor(self) -> Accessor {
        match self {
            Self::Value(v) => Accessor::constant(v),
            Self::Accessor(a) => a,
        }
    }
}

impl From<Accessor> for BindingSource {
    fn from(value: Accessor) -> Self {
        Self::Accessor(value)
    }
}

impl From<Value> for BindingSource {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<f64> for BindingSource {
    fn from(value: f64) -> Self {
        Self::Value(value.into())
    }
}

impl From<&str> for BindingSource {
    fn from(value: &str) -> Self {
        Self::Value(value.into())
    }
}

impl From<Color> for BindingSource {
    fn from(value: Color) -> Self {
        Self::Value(value.into())
    }
}

impl From<Symbol> for BindingSource {
    fn from(value: Symbol) -> Self {
        Self::Value(value.into())
    }
}

/// An accessor plus an optional scale.
#[derive(Debug)]
pub struct PropertyBinding {
    /// Reads the raw value.
    pub accessor: Accessor,
    /// Maps the raw value; `None` passes it through.
    pub scale: Option<Box<dyn Scale>>,
}

impl PropertyBinding {
    /// Evaluates the binding for one datum.
    pub fn project(&self, datum: Datum<'_>, index: usize, dataset: &Dataset) -> Value {
        let raw = self.accessor.call(datum, index, dataset);
        match &self.scale {
            Some(scale) => scale.map(&raw),
            None => raw,
        }
    }
}

/// Attribute key -> binding.
#[derive(Debug, Default)]
pub struct PropertyBindings {
    bindings: HashMap<String, PropertyBinding>,
}

impl PropertyBindings {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `key`, replacing any previous binding.
    pub fn bind(
        &mut self,
        key: impl Into<String>,
        source: impl Into<BindingSource>,
        scale: Option<Box<dyn Scale>>,
    ) {
        let binding = PropertyBinding {
            accessor: source.into().into_accessor(),
            scale,
        };
        self.bindings.insert(key.into(), binding);
    }

    /// Returns the binding for `key`, if bound.
    pub fn get(&self, key: &str) -> Option<&PropertyBinding> {
        self.bindings.get(key)
    }

    /// Returns the binding for `key` mutably, if bound.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut PropertyBinding> {
        self.bindings.get_mut(key)
    }

    /// Binds `key` to a constant or accessor with no scale.
    pub fn set_value(&mut self, key: impl Into<String>, source: impl Into<BindingSource>) {
        self.bind(key, source, None);
    }

    /// Binds `key` to an accessor piped through `scale`.
    pub fn set_scaled(
        &mut self,
        key: impl Into<String>,
        source: impl Into<BindingSource>,
        scale: impl Scale + 'static,
    ) {
        self.bind(key, source, Some(Box::new(scale)));
    }

    /// Removes a binding, returning it.
    pub fn unbind(&mut self, key: &str) -> Option<PropertyBinding> {
        self.bindings.remove(key)
    }

    /// Returns `true` if `key` is bound.
    pub fn contains(&self, key: &str) -> bool {
        self.bindings.contains_key(key)
    }

    /// Sets the output range of the scale bound to `key`, if any.
    pub fn set_scale_range(&mut self, key: &str, range: (f64, f64)) {
        if let Some(scale) = self.bindings.get_mut(key).and_then(|b| b.scale.as_mut()) {
            scale.set_range(range);
        }
    }

    /// Iterates bindings in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyBinding)> + '_ {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;
    use crate::ScaleLinear;

    fn data() -> Dataset {
        Dataset::new("d", ["a"]).with_rows([vec![Value::from(2.0)], vec![Value::from(4.0)]])
    }

    #[test]
    fn constants_become_constant_accessors() {
        let ds = data();
        let mut b = PropertyBindings::new();
        b.set_value("fill", "red");
        let binding = b.get("fill").expect("bound");
        assert!(binding.scale.is_none());
        for d in ds.iter() {
            assert_eq!(binding.project(d, d.index(), &ds), Value::from("red"));
        }
    }

    #[test]
    fn scaled_bindings_map_accessor_output() {
        let ds = data();
        let mut b = PropertyBindings::new();
        b.set_scaled("x", Accessor::field("a"), ScaleLinear::new((0.0, 4.0), (0.0, 100.0)));
        let d = ds.datum(0).expect("row");
        assert_eq!(b.get("x").expect("bound").project(d, 0, &ds), Value::from(50.0));

        b.set_scale_range("x", (0.0, 200.0));
        assert_eq!(b.get("x").expect("bound").project(d, 0, &ds), Value::from(100.0));
    }

    #[test]
    fn rebinding_replaces_and_unbound_keys_are_absent() {
        let ds = data();
        let mut b = PropertyBindings::new();
        assert!(b.get("size").is_none());
        b.set_value("size", 3.0);
        b.set_value("size", Accessor::index());
        let d = ds.datum(1).expect("row");
        assert_eq!(b.get("size").expect("bound").project(d, 1, &ds), Value::from(1.0));
        assert!(b.unbind("size").is_some());
        assert!(!b.contains("size"));
    }

    #[test]
    fn missing_fields_read_as_null() {
        let ds = data();
        let d = ds.datum(0).expect("row");
        assert!(Accessor::field("nope").call(d, 0, &ds).is_null());
    }
}
