// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drawing surface: named layers of attribute-driven elements.
//!
//! A [`Layer`] plays the role of a "drawer": it owns the visual elements for one
//! dataset of one plot, positioned by a layer translate. Each [`Element`] carries a
//! committed attribute map plus a queue of scheduled [`Transition`]s; the value of
//! any attribute can be sampled at an arbitrary scene time.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::f64::consts::FRAC_PI_2;

use hashbrown::HashMap;
use kurbo::{BezPath, Circle, Point, Rect, Shape, Vec2};
use smallvec::SmallVec;

use crate::animator::Easing;
use crate::{Symbol, Value};

/// Attribute name -> value.
pub type AttrMap = HashMap<String, Value>;

/// Well-known attribute names read by the surface geometry.
pub mod attr {
    /// Horizontal center of a symbol.
    pub const X: &str = "x";
    /// Vertical center of a symbol.
    pub const Y: &str = "y";
    /// Symbol diameter/side.
    pub const SIZE: &str = "size";
    /// Symbol shape.
    pub const SYMBOL: &str = "symbol";
    /// Fill color.
    pub const FILL: &str = "fill";
    /// Fill opacity in `[0, 1]`.
    pub const OPACITY: &str = "opacity";
    /// Arc inner radius.
    pub const INNER_RADIUS: &str = "inner-radius";
    /// Arc outer radius.
    pub const OUTER_RADIUS: &str = "outer-radius";
    /// Raw quantity an arc's angular extent is derived from.
    pub const SECTOR_VALUE: &str = "sector-value";
    /// Arc start angle, radians clockwise from 12 o'clock.
    pub const START_ANGLE: &str = "start-angle";
    /// Arc end angle, radians clockwise from 12 o'clock.
    pub const END_ANGLE: &str = "end-angle";
}

/// The geometry an element's attributes describe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarkKind {
    /// A point glyph at (`x`, `y`) with `size` and `symbol`.
    Symbol,
    /// An annular sector around the layer origin.
    Arc,
}

/// A scheduled change of attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    /// Values at `start` (sampled when the transition was scheduled).
    pub from: AttrMap,
    /// Target values.
    pub to: AttrMap,
    /// Scene time at which the transition begins.
    pub start: f64,
    /// Length in milliseconds; zero means instant.
    pub duration: f64,
    /// Easing applied to progress.
    pub easing: Easing,
}

impl Transition {
    /// Scene time at which the target values are reached.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    fn apply(&self, state: &mut AttrMap, time: f64) {
        let p = if self.duration <= 0.0 {
            1.0
        } else {
            self.easing.apply((time - self.start) / self.duration)
        };
        for (key, to) in &self.to {
            let v = match self.from.get(key) {
                Some(from) => from.lerp(to, p),
                None => to.clone(),
            };
            state.insert(key.clone(), v);
        }
    }
}

/// A single visual element.
#[derive(Clone, Debug, Default)]
pub struct Element {
    attrs: AttrMap,
    transitions: SmallVec<[Transition; 2]>,
}

impl Element {
    /// Creates an element with no attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the committed attributes (ignoring pending transitions).
    pub fn attrs(&self) -> &AttrMap {
        &self.attrs
    }

    /// Returns pending transitions, ordered by start time.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Samples all attributes at scene time `time`.
    pub fn attrs_at(&self, time: f64) -> AttrMap {
        let mut state = self.attrs.clone();
        for t in &self.transitions {
            if time < t.start {
                break;
            }
            t.apply(&mut state, time);
        }
        state
    }

    /// Samples one attribute at scene time `time`.
    pub fn attr_at(&self, key: &str, time: f64) -> Option<Value> {
        self.attrs_at(time).remove(key)
    }

    /// Returns `true` if a transition is still running (or pending) at `time`.
    pub fn is_animating(&self, time: f64) -> bool {
        self.transitions.iter().any(|t| t.end() > time)
    }

    /// Schedules a transition towards `to` beginning at `start`.
    pub fn schedule(&mut self, to: AttrMap, start: f64, duration: f64, easing: Easing) {
        let from = self.attrs_at(start);
        let at = self.transitions.partition_point(|t| t.start <= start);
        self.transitions.insert(
            at,
            Transition {
                from,
                to,
                start,
                duration: duration.max(0.0),
                easing,
            },
        );
    }

    /// Freezes the element at `time`, dropping every pending transition.
    pub fn interrupt(&mut self, time: f64) {
        if !self.transitions.is_empty() {
            self.attrs = self.attrs_at(time);
            self.transitions.clear();
        }
    }

    /// Folds transitions that have fully completed by `time` into the committed state.
    fn compact(&mut self, time: f64) {
        let done = self
            .transitions
            .iter()
            .take_while(|t| t.end() <= time)
            .count();
        if done == 0 {
            return;
        }
        for t in self.transitions.drain(..done) {
            t.apply(&mut self.attrs, t.end());
        }
    }
}

/// Builds the outline of an element described by `attrs`.
///
/// Missing numeric attributes default to zero; a missing symbol is a circle.
pub fn mark_path(kind: MarkKind, attrs: &AttrMap) -> BezPath {
    let num = |k: &str| attrs.get(k).and_then(Value::as_f64).unwrap_or(0.0);
    match kind {
        MarkKind::Symbol => {
            let symbol = attrs
                .get(attr::SYMBOL)
                .and_then(Value::as_symbol)
                .unwrap_or_default();
            symbol.path(num(attr::X), num(attr::Y), num(attr::SIZE))
        }
        MarkKind::Arc => arc_segment(attrs).to_path(0.1),
    }
}

fn arc_segment(attrs: &AttrMap) -> kurbo::CircleSegment {
    let num = |k: &str| attrs.get(k).and_then(Value::as_f64).unwrap_or(0.0);
    let start = num(attr::START_ANGLE);
    let end = num(attr::END_ANGLE);
    Circle::new(Point::ZERO, num(attr::OUTER_RADIUS).max(0.0)).segment(
        num(attr::INNER_RADIUS).max(0.0),
        start - FRAC_PI_2,
        end - start,
    )
}

fn mark_bounds(kind: MarkKind, attrs: &AttrMap) -> Rect {
    match kind {
        MarkKind::Symbol => {
            let num = |k: &str| attrs.get(k).and_then(Value::as_f64).unwrap_or(0.0);
            let symbol = attrs
                .get(attr::SYMBOL)
                .and_then(Value::as_symbol)
                .unwrap_or(Symbol::Circle);
            symbol.bounds(num(attr::X), num(attr::Y), num(attr::SIZE))
        }
        // `CircleSegment::bounding_box` covers the whole circle; use the sector outline.
        MarkKind::Arc => arc_segment(attrs).to_path(0.1).bounding_box(),
    }
}

/// A named collection of elements of one kind.
#[derive(Clone, Debug)]
pub struct Layer {
    key: String,
    kind: MarkKind,
    /// Offset applied to every element.
    pub translate: Vec2,
    elements: Vec<Element>,
}

impl Layer {
    /// Creates an empty layer.
    pub fn new(key: impl Into<String>, kind: MarkKind) -> Self {
        Self {
            key: key.into(),
            kind,
            translate: Vec2::ZERO,
            elements: Vec::new(),
        }
    }

    /// Returns the layer key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the element geometry kind.
    pub fn kind(&self) -> MarkKind {
        self.kind
    }

    /// Returns the elements.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Returns the elements mutably.
    pub fn elements_mut(&mut self) -> &mut [Element] {
        &mut self.elements
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the layer has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Resizes to `len` elements: surplus elements exit, new ones enter with no attributes.
    pub fn sync_len(&mut self, len: usize) {
        self.elements.resize_with(len, Element::new);
    }

    /// Freezes every element at `time`.
    pub fn interrupt(&mut self, time: f64) {
        for e in &mut self.elements {
            e.interrupt(time);
        }
    }

    /// Bounds of element `index` at `time`, in layer coordinates.
    pub fn element_bounds(&self, index: usize, time: f64) -> Option<Rect> {
        let element = self.elements.get(index)?;
        Some(mark_bounds(self.kind, &element.attrs_at(time)))
    }

    /// Bounds of element `index` at `time`, including the layer translate.
    pub fn world_bounds(&self, index: usize, time: f64) -> Option<Rect> {
        self.element_bounds(index, time).map(|r| r + self.translate)
    }

    /// Whether element `index` covers `point` (in scene coordinates) at `time`.
    ///
    /// Symbols hit on their bounds; arcs hit only inside the sector outline.
    pub fn contains(&self, index: usize, time: f64, point: Point) -> bool {
        let Some(element) = self.elements.get(index) else {
            return false;
        };
        let attrs = element.attrs_at(time);
        let local = point - self.translate;
        let bounds = mark_bounds(self.kind, &attrs);
        let in_bounds = bounds.x0 <= local.x
            && local.x <= bounds.x1
            && bounds.y0 <= local.y
            && local.y <= bounds.y1;
        match self.kind {
            MarkKind::Symbol => in_bounds,
            MarkKind::Arc => in_bounds && arc_segment(&attrs).to_path(0.1).contains(local),
        }
    }
}

/// A hit-test result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hit {
    /// Key of the layer containing the element.
    pub layer: String,
    /// Element index within the layer.
    pub index: usize,
}

/// The drawing surface: layers plus a clock in milliseconds.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    now: f64,
    layers: Vec<Layer>,
}

impl Scene {
    /// Creates an empty scene at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current scene time in milliseconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Advances the clock and folds finished transitions.
    pub fn advance(&mut self, dt: f64) {
        self.now += dt.max(0.0);
        let now = self.now;
        for layer in &mut self.layers {
            for e in &mut layer.elements {
                e.compact(now);
            }
        }
    }

    /// Advances the clock until every transition has completed.
    pub fn finish(&mut self) {
        let end = self
            .layers
            .iter()
            .flat_map(|l| l.elements.iter())
            .flat_map(|e| e.transitions.iter())
            .map(Transition::end)
            .fold(self.now, f64::max);
        self.advance(end - self.now);
    }

    /// Returns `true` if no element is animating.
    pub fn is_idle(&self) -> bool {
        let now = self.now;
        self.layers
            .iter()
            .all(|l| l.elements.iter().all(|e| !e.is_animating(now)))
    }

    /// Returns the layers in paint order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Looks up a layer.
    pub fn layer(&self, key: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.key == key)
    }

    /// Looks up a layer mutably.
    pub fn layer_mut(&mut self, key: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.key == key)
    }

    /// Returns the layer for `key`, creating it (or replacing one of another kind).
    pub fn layer_entry(&mut self, key: &str, kind: MarkKind) -> &mut Layer {
        let idx = match self.layers.iter().position(|l| l.key == key) {
            Some(i) => {
                if self.layers[i].kind != kind {
                    log::warn!(
                        "layer {key:?} switched from {:?} to {kind:?}; its elements are dropped",
                        self.layers[i].kind
                    );
                    self.layers[i] = Layer::new(key, kind);
                }
                i
            }
            None => {
                self.layers.push(Layer::new(key, kind));
                self.layers.len() - 1
            }
        };
        &mut self.layers[idx]
    }

    /// Removes a layer.
    pub fn remove_layer(&mut self, key: &str) -> Option<Layer> {
        let i = self.layers.iter().position(|l| l.key == key)?;
        Some(self.layers.remove(i))
    }

    /// Returns elements covering `point`, topmost first.
    pub fn hit_test(&self, point: Point) -> Vec<Hit> {
        let mut out = Vec::new();
        for layer in self.layers.iter().rev() {
            for index in (0..layer.elements.len()).rev() {
                if layer.contains(index, self.now, point) {
                    out.push(Hit {
                        layer: layer.key.clone(),
                        index,
                    });
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use core::f64::consts::PI;

    use super::*;
    use crate::{Animator, EasingAnimator, NullAnimator};

    fn symbol_at(x: f64, y: f64, size: f64) -> AttrMap {
        let mut m = AttrMap::new();
        m.insert(attr::X.into(), x.into());
        m.insert(attr::Y.into(), y.into());
        m.insert(attr::SIZE.into(), size.into());
        m.insert(attr::SYMBOL.into(), Symbol::Square.into());
        m
    }

    #[test]
    fn hit_test_respects_layer_translate() {
        let mut scene = Scene::new();
        let layer = scene.layer_entry("points", MarkKind::Symbol);
        layer.translate = Vec2::new(100.0, 0.0);
        layer.sync_len(2);
        NullAnimator.animate(
            layer.elements_mut(),
            vec![symbol_at(0.0, 0.0, 10.0), symbol_at(50.0, 50.0, 10.0)],
            0.0,
        );

        assert_eq!(
            scene.hit_test(Point::new(102.0, 3.0)),
            vec![Hit {
                layer: "points".into(),
                index: 0
            }]
        );
        assert!(scene.hit_test(Point::new(2.0, 3.0)).is_empty());
        assert_eq!(scene.hit_test(Point::new(150.0, 50.0)).len(), 1);
    }

    #[test]
    fn interrupt_freezes_in_flight_values() {
        let mut scene = Scene::new();
        let layer = scene.layer_entry("points", MarkKind::Symbol);
        layer.sync_len(1);
        NullAnimator.animate(layer.elements_mut(), vec![symbol_at(0.0, 0.0, 0.0)], 0.0);
        let animator = EasingAnimator::new()
            .with_duration(100.0)
            .with_easing(Easing::Linear);
        animator.animate(layer.elements_mut(), vec![symbol_at(0.0, 0.0, 10.0)], 0.0);

        scene.advance(50.0);
        assert!(!scene.is_idle());
        let now = scene.now();
        let layer = scene.layer_mut("points").expect("layer");
        layer.interrupt(now);
        assert_eq!(
            layer.elements()[0].attr_at(attr::SIZE, 1000.0),
            Some(Value::from(5.0))
        );
        assert!(scene.is_idle());
    }

    #[test]
    fn finish_runs_all_transitions_to_completion() {
        let mut scene = Scene::new();
        let layer = scene.layer_entry("points", MarkKind::Symbol);
        layer.sync_len(3);
        let animator = EasingAnimator::new().with_iterative_delay(20.0);
        animator.animate(
            layer.elements_mut(),
            vec![
                symbol_at(1.0, 1.0, 4.0),
                symbol_at(2.0, 2.0, 4.0),
                symbol_at(3.0, 3.0, 4.0),
            ],
            0.0,
        );
        scene.finish();
        assert_eq!(scene.now(), 340.0);
        assert!(scene.is_idle());
        let layer = scene.layer("points").expect("layer");
        assert!(layer.elements()[2].transitions().is_empty());
        assert_eq!(layer.elements()[2].attrs()[attr::X], Value::from(3.0));
    }

    #[test]
    fn layer_entry_replaces_kind_mismatch() {
        let mut scene = Scene::new();
        scene.layer_entry("a", MarkKind::Symbol).sync_len(4);
        assert_eq!(scene.layer_entry("a", MarkKind::Arc).len(), 0);
        assert_eq!(scene.layers().len(), 1);
        assert!(scene.remove_layer("a").is_some());
        assert!(scene.layer("a").is_none());
    }

    #[test]
    fn quarter_arc_bounds() {
        let mut m = AttrMap::new();
        m.insert(attr::INNER_RADIUS.into(), 0.0.into());
        m.insert(attr::OUTER_RADIUS.into(), 10.0.into());
        m.insert(attr::START_ANGLE.into(), 0.0.into());
        m.insert(attr::END_ANGLE.into(), FRAC_PI_2.into());
        let b = mark_bounds(MarkKind::Arc, &m);
        // 12 o'clock to 3 o'clock: the upper-right quadrant in y-down coordinates.
        assert!(b.x0.abs() < 1e-3 && (b.x1 - 10.0).abs() < 1e-3, "{b:?}");
        assert!((b.y0 + 10.0).abs() < 1e-3 && b.y1.abs() < 1e-3, "{b:?}");
    }

    fn arc(start: f64, end: f64, outer: f64) -> AttrMap {
        let mut m = AttrMap::new();
        m.insert(attr::INNER_RADIUS.into(), 0.0.into());
        m.insert(attr::OUTER_RADIUS.into(), outer.into());
        m.insert(attr::START_ANGLE.into(), start.into());
        m.insert(attr::END_ANGLE.into(), end.into());
        m
    }

    #[test]
    fn half_arc_bounds_cover_only_the_sector() {
        let mut scene = Scene::new();
        let layer = scene.layer_entry("pie", MarkKind::Arc);
        layer.sync_len(1);
        NullAnimator.animate(layer.elements_mut(), vec![arc(PI, 2.0 * PI, 100.0)], 0.0);

        // 6 o'clock back round to 12 o'clock: the left half of the disc.
        let b = scene.layer("pie").and_then(|l| l.element_bounds(0, 0.0)).expect("bounds");
        assert!((b.x0 + 100.0).abs() < 1e-3 && b.x1.abs() < 1e-3, "{b:?}");
        assert!((b.y0 + 100.0).abs() < 1e-3 && (b.y1 - 100.0).abs() < 1e-3, "{b:?}");
    }

    #[test]
    fn hit_test_picks_the_sector_under_the_point() {
        let mut scene = Scene::new();
        let layer = scene.layer_entry("pie", MarkKind::Arc);
        layer.translate = Vec2::new(100.0, 100.0);
        layer.sync_len(2);
        NullAnimator.animate(
            layer.elements_mut(),
            vec![arc(0.0, PI, 100.0), arc(PI, 2.0 * PI, 100.0)],
            0.0,
        );

        assert_eq!(
            scene.hit_test(Point::new(190.0, 100.0)),
            vec![Hit {
                layer: "pie".into(),
                index: 0
            }]
        );
        assert_eq!(scene.hit_test(Point::new(10.0, 100.0))[0].index, 1);
        // Inside the right sector's bounds but outside the disc.
        assert!(scene.hit_test(Point::new(195.0, 5.0)).is_empty());
    }
}
