// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! State and capabilities shared by plots.
//!
//! A plot is a [`crate::Component`] that renders one layer per dataset. The pieces every
//! plot needs (datasets, bindings, animators, the assigned frame) live in [`PlotCore`];
//! the capability traits expose them uniformly so callers need not know the plot type.

extern crate alloc;

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::{Point, Rect, Size};
use tabula_core::{Animator, Dataset, NullAnimator, Scene};

use crate::component::Placement;
use crate::projector::{AttrToProjector, ProjectionContext};
use crate::{PropertyBindings, SpaceRequest};

/// A plot that draws datasets.
pub trait HasDatasets {
    /// Datasets in drawing order.
    fn datasets(&self) -> &[Dataset];

    /// Adds a dataset. Returns `false` (leaving the plot unchanged) if it was rejected.
    fn add_dataset(&mut self, dataset: Dataset) -> bool;

    /// Removes the dataset named `name`.
    fn remove_dataset(&mut self, name: &str) -> Option<Dataset>;
}

/// A plot whose visual attributes are driven by property bindings.
pub trait HasPropertyBindings {
    /// The binding registry.
    fn property_bindings(&self) -> &PropertyBindings;

    /// The binding registry, mutably.
    fn property_bindings_mut(&mut self) -> &mut PropertyBindings;

    /// Compiles bindings to projectors and fills in this plot's defaults.
    fn generate_attr_to_projector(&self, ctx: ProjectionContext) -> AttrToProjector<'_>;
}

/// A plot with named animators.
pub trait HasAnimators {
    /// Returns the animator for `key`, or an instant one if absent or if animation is off.
    fn animator(&self, key: &str) -> &dyn Animator;

    /// Registers an animator.
    fn set_animator(&mut self, key: &str, animator: Box<dyn Animator>);

    /// Turns animation on or off.
    fn set_animated(&mut self, animated: bool);

    /// Returns `true` if animation is on.
    fn is_animated(&self) -> bool;
}

/// Identifies one rendered element of a plot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlotEntity {
    /// Name of the dataset the element was drawn from.
    pub dataset: String,
    /// Index of the datum (and element).
    pub index: usize,
}

/// Rendered entities and their positions, in plot coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlotData {
    /// The entities, in dataset then datum order.
    pub entities: Vec<PlotEntity>,
    /// One position per entity.
    pub pixel_points: Vec<Point>,
}

impl PlotData {
    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if there are no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub(crate) fn push(&mut self, entity: PlotEntity, point: Point) {
        self.entities.push(entity);
        self.pixel_points.push(point);
    }
}

/// State shared by every plot.
#[derive(Debug)]
pub struct PlotCore {
    name: String,
    datasets: Vec<Dataset>,
    bindings: PropertyBindings,
    animators: HashMap<String, Box<dyn Animator>>,
    animated: bool,
    data_changed: bool,
    stale_layers: Vec<String>,
    placement: Placement,
}

impl PlotCore {
    /// Creates an empty core. Animation is on.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            datasets: Vec::new(),
            bindings: PropertyBindings::new(),
            animators: HashMap::new(),
            animated: true,
            data_changed: false,
            stale_layers: Vec::new(),
            placement: Placement::new(),
        }
    }

    /// The plot name, used to prefix layer keys.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the plot. Existing layers are dropped on the next render.
    pub fn set_name(&mut self, name: impl Into<String>) {
        let keys: Vec<String> = self.datasets.iter().map(|d| self.layer_key(d)).collect();
        self.stale_layers.extend(keys);
        self.name = name.into();
        self.data_changed = true;
    }

    /// Layer key for a dataset.
    pub fn layer_key(&self, dataset: &Dataset) -> String {
        format!("{}/{}", self.name, dataset.name())
    }

    /// Datasets in drawing order.
    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    /// Returns a dataset for mutation; the next render treats the data as changed.
    pub fn dataset_mut(&mut self, name: &str) -> Option<&mut Dataset> {
        let dataset = self.datasets.iter_mut().find(|d| d.name() == name)?;
        self.data_changed = true;
        Some(dataset)
    }

    /// Appends a dataset. A dataset with the same name is replaced in place.
    pub fn add_dataset(&mut self, dataset: Dataset) {
        match self.datasets.iter_mut().find(|d| d.name() == dataset.name()) {
            Some(existing) => *existing = dataset,
            None => self.datasets.push(dataset),
        }
        self.data_changed = true;
    }

    /// Removes a dataset by name.
    pub fn remove_dataset(&mut self, name: &str) -> Option<Dataset> {
        let i = self.datasets.iter().position(|d| d.name() == name)?;
        let dataset = self.datasets.remove(i);
        let key = self.layer_key(&dataset);
        self.stale_layers.push(key);
        self.data_changed = true;
        Some(dataset)
    }

    /// Returns `true` if data changed since the last render.
    pub fn data_changed(&self) -> bool {
        self.data_changed
    }

    /// The binding registry.
    pub fn bindings(&self) -> &PropertyBindings {
        &self.bindings
    }

    /// The binding registry, mutably.
    pub fn bindings_mut(&mut self) -> &mut PropertyBindings {
        &mut self.bindings
    }

    /// Returns the animator for `key`, or an instant one if absent or if animation is off.
    pub fn animator(&self, key: &str) -> &dyn Animator {
        match self.animators.get(key) {
            Some(animator) if self.animated => animator.as_ref(),
            _ => &NullAnimator,
        }
    }

    /// Registers an animator.
    pub fn set_animator(&mut self, key: impl Into<String>, animator: Box<dyn Animator>) {
        self.animators.insert(key.into(), animator);
    }

    /// Turns animation on or off.
    pub fn set_animated(&mut self, animated: bool) {
        self.animated = animated;
    }

    /// Returns `true` if animation is on.
    pub fn is_animated(&self) -> bool {
        self.animated
    }

    /// Alignment and frame.
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// The frame assigned by the last layout.
    pub fn frame(&self) -> Rect {
        self.placement.frame()
    }

    /// Projection context for the current frame.
    pub fn projection_context(&self) -> ProjectionContext {
        let frame = self.frame();
        ProjectionContext::new(frame.width(), frame.height())
    }

    /// Plots fill their cell and never ask for space.
    pub(crate) fn requested_space(&self) -> SpaceRequest {
        SpaceRequest::NONE
    }

    pub(crate) fn place(&mut self, origin: Point, available: Size) -> Rect {
        self.placement
            .place(origin, available, SpaceRequest::NONE, false, false)
    }

    /// Drops layers of removed datasets and clears the data-changed flag.
    pub(crate) fn finish_render(&mut self, scene: &mut Scene) {
        for key in self.stale_layers.drain(..) {
            scene.remove_layer(&key);
        }
        self.data_changed = false;
    }

    /// Removes the layers of every dataset, current or removed, from `scene`.
    ///
    /// The next render redraws from scratch.
    pub(crate) fn clear_layers(&mut self, scene: &mut Scene) {
        for dataset in &self.datasets {
            scene.remove_layer(&self.layer_key(dataset));
        }
        for key in self.stale_layers.drain(..) {
            scene.remove_layer(&key);
        }
        self.data_changed = true;
    }
}
