// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pie plots: one arc per datum, sized by `sector-value`.

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::String;

use kurbo::{Point, Rect, Size, Vec2};
use tabula_core::{Animator, Dataset, EasingAnimator, MarkKind, Scene, Value, attr};

use crate::draw_step::{DrawStep, DrawSteps, draw};
#[cfg(not(feature = "std"))]
use crate::float::FloatExt;
use crate::plot::{HasAnimators, HasDatasets, HasPropertyBindings, PlotCore, PlotData, PlotEntity};
use crate::projector::{
    AttrToProjector, ProjectionContext, constant, generate_attr_to_projector, insert_default,
    projector,
};
use crate::{
    BindingSource, Component, PropertyBinding, PropertyBindings, Scale, ScaleColor, SpaceRequest,
};

/// Animator key for the sector step.
pub const MAIN_ANIMATOR: &str = "main";

/// A pie (or donut) plot over a single dataset.
///
/// Sectors run clockwise from 12 o'clock in data order. Unbound radii default to a full
/// pie filling the smaller side of the plot; unbound fills cycle through the category
/// palette by index.
#[derive(Debug)]
pub struct Pie {
    core: PlotCore,
}

impl Default for Pie {
    fn default() -> Self {
        Self::new()
    }
}

impl Pie {
    /// Creates an empty pie plot.
    pub fn new() -> Self {
        let mut core = PlotCore::new("pie");
        core.set_animator(MAIN_ANIMATOR, Box::new(EasingAnimator::new()));
        Self { core }
    }

    /// Sets the plot name (the prefix of its layer key).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.core.set_name(name);
        self
    }

    /// Shared plot state.
    pub fn core(&self) -> &PlotCore {
        &self.core
    }

    /// Shared plot state, mutably.
    pub fn core_mut(&mut self) -> &mut PlotCore {
        &mut self.core
    }

    /// The `inner-radius` binding, if bound.
    pub fn inner_radius(&self) -> Option<&PropertyBinding> {
        self.core.bindings().get(attr::INNER_RADIUS)
    }

    /// Binds `inner-radius` to a constant or accessor.
    pub fn set_inner_radius(&mut self, source: impl Into<BindingSource>) {
        self.core.bindings_mut().set_value(attr::INNER_RADIUS, source);
    }

    /// Binds `inner-radius` through a scale whose range layout keeps at `[0, radius]`.
    pub fn set_inner_radius_scaled(
        &mut self,
        source: impl Into<BindingSource>,
        scale: impl Scale + 'static,
    ) {
        self.core
            .bindings_mut()
            .set_scaled(attr::INNER_RADIUS, source, scale);
    }

    /// The `outer-radius` binding, if bound.
    pub fn outer_radius(&self) -> Option<&PropertyBinding> {
        self.core.bindings().get(attr::OUTER_RADIUS)
    }

    /// Binds `outer-radius` to a constant or accessor.
    pub fn set_outer_radius(&mut self, source: impl Into<BindingSource>) {
        self.core.bindings_mut().set_value(attr::OUTER_RADIUS, source);
    }

    /// Binds `outer-radius` through a scale whose range layout keeps at `[0, radius]`.
    pub fn set_outer_radius_scaled(
        &mut self,
        source: impl Into<BindingSource>,
        scale: impl Scale + 'static,
    ) {
        self.core
            .bindings_mut()
            .set_scaled(attr::OUTER_RADIUS, source, scale);
    }

    /// The `sector-value` binding, if bound.
    pub fn sector_value(&self) -> Option<&PropertyBinding> {
        self.core.bindings().get(attr::SECTOR_VALUE)
    }

    /// Binds `sector-value` to a constant or accessor.
    pub fn set_sector_value(&mut self, source: impl Into<BindingSource>) {
        self.core.bindings_mut().set_value(attr::SECTOR_VALUE, source);
    }

    /// Binds `sector-value` through a scale.
    pub fn set_sector_value_scaled(
        &mut self,
        source: impl Into<BindingSource>,
        scale: impl Scale + 'static,
    ) {
        self.core
            .bindings_mut()
            .set_scaled(attr::SECTOR_VALUE, source, scale);
    }

    /// Builds the draw steps for the next render.
    pub fn generate_draw_steps(&self, ctx: ProjectionContext) -> DrawSteps<'_> {
        let mut steps = DrawSteps::new();
        steps.push(DrawStep {
            attr_to_projector: self.generate_attr_to_projector(ctx),
            animator: self.core.animator(MAIN_ANIMATOR),
        });
        steps
    }

    /// Sector centroids currently drawn in `scene`, in plot coordinates.
    pub fn plot_data(&self, scene: &Scene) -> PlotData {
        let now = scene.now();
        let center = self.center();
        let mut out = PlotData::default();
        for dataset in self.core.datasets() {
            let Some(layer) = scene.layer(&self.core.layer_key(dataset)) else {
                continue;
            };
            for (index, element) in layer.elements().iter().enumerate() {
                let attrs = element.attrs_at(now);
                let num = |k: &str| attrs.get(k).and_then(Value::as_f64).unwrap_or(0.0);
                let angle = (num(attr::START_ANGLE) + num(attr::END_ANGLE)) / 2.0;
                let r = (num(attr::INNER_RADIUS) + num(attr::OUTER_RADIUS)) / 2.0;
                let centroid = Vec2::new(r * angle.sin(), -r * angle.cos());
                out.push(
                    PlotEntity {
                        dataset: dataset.name().into(),
                        index,
                    },
                    center + centroid,
                );
            }
        }
        out
    }

    fn center(&self) -> Point {
        let frame = self.core.frame();
        Point::new(frame.width() / 2.0, frame.height() / 2.0)
    }
}

impl HasDatasets for Pie {
    fn datasets(&self) -> &[Dataset] {
        self.core.datasets()
    }

    fn add_dataset(&mut self, dataset: Dataset) -> bool {
        if !self.core.datasets().is_empty() {
            log::warn!(
                "Only one dataset is supported in Pie plots; ignoring {:?}",
                dataset.name()
            );
            return false;
        }
        self.core.add_dataset(dataset);
        true
    }

    fn remove_dataset(&mut self, name: &str) -> Option<Dataset> {
        self.core.remove_dataset(name)
    }
}

impl HasPropertyBindings for Pie {
    fn property_bindings(&self) -> &PropertyBindings {
        self.core.bindings()
    }

    fn property_bindings_mut(&mut self) -> &mut PropertyBindings {
        self.core.bindings_mut()
    }

    fn generate_attr_to_projector(&self, ctx: ProjectionContext) -> AttrToProjector<'_> {
        let mut map = generate_attr_to_projector(self.core.bindings());
        insert_default(&mut map, attr::INNER_RADIUS, constant(0.0));
        insert_default(
            &mut map,
            attr::OUTER_RADIUS,
            constant(ctx.width.min(ctx.height) / 2.0),
        );
        insert_default(&mut map, attr::SECTOR_VALUE, constant(Value::Null));
        let colors = ScaleColor::new();
        insert_default(
            &mut map,
            attr::FILL,
            projector(move |_, i, _| colors.color(i).into()),
        );
        map
    }
}

impl HasAnimators for Pie {
    fn animator(&self, key: &str) -> &dyn Animator {
        self.core.animator(key)
    }

    fn set_animator(&mut self, key: &str, animator: Box<dyn Animator>) {
        self.core.set_animator(key, animator);
    }

    fn set_animated(&mut self, animated: bool) {
        self.core.set_animated(animated);
    }

    fn is_animated(&self) -> bool {
        self.core.is_animated()
    }
}

impl Component for Pie {
    fn requested_space(&self, _offered_width: f64, _offered_height: f64) -> SpaceRequest {
        self.core.requested_space()
    }

    fn compute_layout(&mut self, origin: Point, available: Size) {
        let frame = self.core.place(origin, available);
        let radius = frame.width().min(frame.height()) / 2.0;
        let bindings = self.core.bindings_mut();
        bindings.set_scale_range(attr::INNER_RADIUS, (0.0, radius));
        bindings.set_scale_range(attr::OUTER_RADIUS, (0.0, radius));
    }

    fn frame(&self) -> Rect {
        self.core.frame()
    }

    fn render(&mut self, scene: &mut Scene) {
        let now = scene.now();
        let translate = self.core.frame().origin().to_vec2() + self.center().to_vec2();
        let steps = self.generate_draw_steps(self.core.projection_context());
        for dataset in self.core.datasets() {
            let layer = scene.layer_entry(&self.core.layer_key(dataset), MarkKind::Arc);
            layer.translate = translate;
            let total = draw(layer, dataset, &steps, now);
            log::trace!("pie {:?} drew {:?} for {total}ms", self.core.name(), dataset.name());
        }
        drop(steps);
        self.core.finish_render(scene);
    }

    fn clear_rendered(&mut self, scene: &mut Scene) {
        self.core.clear_layers(scene);
    }
}
