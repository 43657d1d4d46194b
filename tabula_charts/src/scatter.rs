// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scatter plots: one symbol per datum at scaled (`x`, `y`).

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::String;

use kurbo::{Point, Rect, Size};
use tabula_core::{
    Animator, Dataset, EasingAnimator, MarkKind, NullAnimator, Scene, Symbol, Value, attr,
};

use crate::draw_step::{DrawStep, DrawSteps, draw};
use crate::plot::{HasAnimators, HasDatasets, HasPropertyBindings, PlotCore, PlotData, PlotEntity};
use crate::projector::{
    AttrToProjector, ProjectionContext, constant, generate_attr_to_projector, insert_default,
};
use crate::scale::CATEGORY_COLORS;
use crate::{
    Accessor, BindingSource, Component, PropertyBinding, PropertyBindings, Scale, SpaceRequest,
};

/// Animator key for the step that collapses symbols before new data animates in.
pub const SYMBOLS_RESET_ANIMATOR: &str = "symbols-reset";
/// Animator key for the main symbol step.
pub const SYMBOLS_ANIMATOR: &str = "symbols";

/// A scatter plot.
///
/// Bindings: `x` and `y` (bound at construction to the `x`/`y` fields through the given
/// scales), `size` (default 6), `symbol` (default circle), `fill` (default first palette
/// color) and `opacity` (default 0.6).
#[derive(Debug)]
pub struct Scatter {
    core: PlotCore,
}

impl Scatter {
    /// Creates a scatter plot reading the `x` and `y` fields through the given scales.
    pub fn new(x_scale: impl Scale + 'static, y_scale: impl Scale + 'static) -> Self {
        let mut core = PlotCore::new("scatter");
        let bindings = core.bindings_mut();
        bindings.set_scaled(attr::X, Accessor::field("x"), x_scale);
        bindings.set_scaled(attr::Y, Accessor::field("y"), y_scale);
        core.set_animator(SYMBOLS_RESET_ANIMATOR, Box::new(NullAnimator));
        core.set_animator(
            SYMBOLS_ANIMATOR,
            Box::new(
                EasingAnimator::new()
                    .with_duration(250.0)
                    .with_iterative_delay(5.0),
            ),
        );
        Self { core }
    }

    /// Sets the plot name (the prefix of its layer keys).
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

    /// The `x` binding.
    pub fn x(&self) -> Option<&PropertyBinding> {
        self.core.bindings().get(attr::X)
    }

    /// Binds `x` through `scale`.
    pub fn set_x(&mut self, source: impl Into<BindingSource>, scale: impl Scale + 'static) {
        self.core.bindings_mut().set_scaled(attr::X, source, scale);
    }

    /// The `y` binding.
    pub fn y(&self) -> Option<&PropertyBinding> {
        self.core.bindings().get(attr::Y)
    }

    /// Binds `y` through `scale`.
    pub fn set_y(&mut self, source: impl Into<BindingSource>, scale: impl Scale + 'static) {
        self.core.bindings_mut().set_scaled(attr::Y, source, scale);
    }

    /// The `size` binding, if bound.
    pub fn size(&self) -> Option<&PropertyBinding> {
        self.core.bindings().get(attr::SIZE)
    }

    /// Binds `size` to a constant or accessor.
    pub fn set_size(&mut self, source: impl Into<BindingSource>) {
        self.core.bindings_mut().set_value(attr::SIZE, source);
    }

    /// Binds `size` through a scale.
    pub fn set_size_scaled(&mut self, source: impl Into<BindingSource>, scale: impl Scale + 'static) {
        self.core.bindings_mut().set_scaled(attr::SIZE, source, scale);
    }

    /// The `symbol` binding, if bound.
    pub fn symbol(&self) -> Option<&PropertyBinding> {
        self.core.bindings().get(attr::SYMBOL)
    }

    /// Binds `symbol` to an accessor.
    pub fn set_symbol(&mut self, accessor: Accessor) {
        self.core.bindings_mut().set_value(attr::SYMBOL, accessor);
    }

    /// Builds the draw steps for the next render.
    ///
    /// When data changed and animation is on, symbols first collapse to size 0 instantly
    /// and then grow to their projected values.
    pub fn generate_draw_steps(&self, ctx: ProjectionContext) -> DrawSteps<'_> {
        let mut steps = DrawSteps::new();
        if self.core.data_changed() && self.core.is_animated() {
            let mut reset = self.generate_attr_to_projector(ctx);
            reset.insert(attr::SIZE.into(), constant(0.0));
            steps.push(DrawStep {
                attr_to_projector: reset,
                animator: self.core.animator(SYMBOLS_RESET_ANIMATOR),
            });
        }
        steps.push(DrawStep {
            attr_to_projector: self.generate_attr_to_projector(ctx),
            animator: self.core.animator(SYMBOLS_ANIMATOR),
        });
        steps
    }

    /// Returns `true` if `bbox` (in plot coordinates) intersects the plot area.
    pub fn is_visible_on_plot(&self, bbox: Rect) -> bool {
        let frame = self.core.frame();
        bbox.x1 >= 0.0 && bbox.x0 <= frame.width() && bbox.y1 >= 0.0 && bbox.y0 <= frame.height()
    }

    /// Entities and symbol centers currently drawn in `scene`.
    pub fn plot_data(&self, scene: &Scene) -> PlotData {
        self.collect_plot_data(scene, |_| true)
    }

    /// Like [`Scatter::plot_data`], keeping only symbols that overlap the plot area.
    pub fn visible_plot_data(&self, scene: &Scene) -> PlotData {
        self.collect_plot_data(scene, |bbox| self.is_visible_on_plot(bbox))
    }

    fn collect_plot_data(&self, scene: &Scene, keep: impl Fn(Rect) -> bool) -> PlotData {
        let now = scene.now();
        let mut out = PlotData::default();
        for dataset in self.core.datasets() {
            let Some(layer) = scene.layer(&self.core.layer_key(dataset)) else {
                continue;
            };
            for (index, element) in layer.elements().iter().enumerate() {
                let Some(bbox) = layer.element_bounds(index, now) else {
                    continue;
                };
                if !keep(bbox) {
                    continue;
                }
                let attrs = element.attrs_at(now);
                let num = |k: &str| attrs.get(k).and_then(Value::as_f64).unwrap_or(0.0);
                out.push(
                    PlotEntity {
                        dataset: dataset.name().into(),
                        index,
                    },
                    Point::new(num(attr::X), num(attr::Y)),
                );
            }
        }
        out
    }
}

impl HasDatasets for Scatter {
    fn datasets(&self) -> &[Dataset] {
        self.core.datasets()
    }

    fn add_dataset(&mut self, dataset: Dataset) -> bool {
        self.core.add_dataset(dataset);
        true
    }

    fn remove_dataset(&mut self, name: &str) -> Option<Dataset> {
        self.core.remove_dataset(name)
    }
}

impl HasPropertyBindings for Scatter {
    fn property_bindings(&self) -> &PropertyBindings {
        self.core.bindings()
    }

    fn property_bindings_mut(&mut self) -> &mut PropertyBindings {
        self.core.bindings_mut()
    }

    fn generate_attr_to_projector(&self, _ctx: ProjectionContext) -> AttrToProjector<'_> {
        let mut map = generate_attr_to_projector(self.core.bindings());
        insert_default(&mut map, attr::SIZE, constant(6.0));
        insert_default(&mut map, attr::OPACITY, constant(0.6));
        insert_default(&mut map, attr::FILL, constant(CATEGORY_COLORS[0]));
        insert_default(&mut map, attr::SYMBOL, constant(Symbol::Circle));
        map
    }
}

impl HasAnimators for Scatter {
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

impl Component for Scatter {
    fn requested_space(&self, _offered_width: f64, _offered_height: f64) -> SpaceRequest {
        self.core.requested_space()
    }

    fn compute_layout(&mut self, origin: Point, available: Size) {
        let frame = self.core.place(origin, available);
        let bindings = self.core.bindings_mut();
        bindings.set_scale_range(attr::X, (0.0, frame.width()));
        bindings.set_scale_range(attr::Y, (frame.height(), 0.0));
    }

    fn frame(&self) -> Rect {
        self.core.frame()
    }

    fn render(&mut self, scene: &mut Scene) {
        let now = scene.now();
        let translate = self.core.frame().origin().to_vec2();
        let steps = self.generate_draw_steps(self.core.projection_context());
        for dataset in self.core.datasets() {
            let layer = scene.layer_entry(&self.core.layer_key(dataset), MarkKind::Symbol);
            layer.translate = translate;
            let total = draw(layer, dataset, &steps, now);
            log::trace!("scatter {:?} drew {:?} for {total}ms", self.core.name(), dataset.name());
        }
        drop(steps);
        self.core.finish_render(scene);
    }

    fn clear_rendered(&mut self, scene: &mut Scene) {
        self.core.clear_layers(scene);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;
    use crate::ScaleLinear;

    fn points() -> Dataset {
        Dataset::new("pts", ["x", "y"]).with_rows([
            vec![Value::from(0.0), Value::from(0.0)],
            vec![Value::from(10.0), Value::from(10.0)],
            vec![Value::from(20.0), Value::from(5.0)],
        ])
    }

    fn scatter() -> Scatter {
        Scatter::new(
            ScaleLinear::with_domain((0.0, 10.0)),
            ScaleLinear::with_domain((0.0, 10.0)),
        )
    }

    fn project(plot: &Scatter, key: &str) -> Value {
        let ds = points();
        let map = plot.generate_attr_to_projector(ProjectionContext::default());
        let d = ds.datum(0).expect("row");
        map[key](d, 0, &ds)
    }

    #[test]
    fn unbound_attributes_use_defaults() {
        let plot = scatter();
        assert_eq!(project(&plot, attr::SIZE), Value::from(6.0));
        assert_eq!(project(&plot, attr::OPACITY), Value::from(0.6));
        assert_eq!(project(&plot, attr::FILL), Value::from(CATEGORY_COLORS[0]));
        assert_eq!(project(&plot, attr::SYMBOL), Value::from(Symbol::Circle));
        assert!(plot.size().is_none());
    }

    #[test]
    fn explicit_bindings_beat_defaults() {
        let mut plot = scatter();
        plot.set_size(Accessor::new(|d, _, _| d.get("y").cloned().unwrap_or_default()));
        plot.set_symbol(Accessor::constant(Symbol::Diamond));
        assert_eq!(project(&plot, attr::SIZE), Value::from(0.0));
        assert_eq!(project(&plot, attr::SYMBOL), Value::from(Symbol::Diamond));
        assert!(plot.size().is_some());
    }

    #[test]
    fn reset_step_only_when_data_changed_and_animated() {
        let mut plot = scatter();
        plot.add_dataset(points());
        let ctx = ProjectionContext::new(100.0, 100.0);

        let steps = plot.generate_draw_steps(ctx);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].animator.total_time(3), 0.0);
        assert_eq!(steps[1].animator.total_time(3), 260.0);
        let ds = points();
        let d = ds.datum(1).expect("row");
        assert_eq!(steps[0].attr_to_projector[attr::SIZE](d, 1, &ds), Value::from(0.0));
        assert_eq!(steps[1].attr_to_projector[attr::SIZE](d, 1, &ds), Value::from(6.0));
        drop(steps);

        plot.set_animated(false);
        let steps = plot.generate_draw_steps(ctx);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].animator.total_time(3), 0.0);
        drop(steps);

        plot.set_animated(true);
        let mut scene = Scene::new();
        plot.render(&mut scene);
        assert_eq!(plot.generate_draw_steps(ctx).len(), 1);
    }

    #[test]
    fn layout_sets_scale_ranges_and_layer_offset() {
        let mut plot = scatter();
        plot.add_dataset(points());
        plot.compute_layout(Point::new(10.0, 20.0), Size::new(100.0, 50.0));
        let mut scene = Scene::new();
        plot.render(&mut scene);
        assert!(!scene.is_idle());
        scene.finish();

        let data = plot.plot_data(&scene);
        assert_eq!(data.len(), 3);
        assert_eq!(data.pixel_points[0], Point::new(0.0, 50.0));
        assert_eq!(data.pixel_points[1], Point::new(100.0, 0.0));
        assert_eq!(
            data.entities[2],
            PlotEntity {
                dataset: "pts".into(),
                index: 2
            }
        );

        let layer = scene.layer("scatter/pts").expect("layer");
        assert_eq!(layer.translate, kurbo::Vec2::new(10.0, 20.0));
        let hits = scene.hit_test(Point::new(110.0, 20.0));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].index, 1);
    }

    #[test]
    fn off_plot_symbols_are_not_visible() {
        let mut plot = scatter();
        plot.add_dataset(points());
        plot.compute_layout(Point::ZERO, Size::new(100.0, 50.0));
        let mut scene = Scene::new();
        plot.render(&mut scene);
        scene.finish();

        let visible = plot.visible_plot_data(&scene);
        assert_eq!(visible.len(), 2);
        assert!(visible.entities.iter().all(|e| e.index != 2));
        assert!(plot.is_visible_on_plot(Rect::new(-3.0, -3.0, 3.0, 3.0)));
        assert!(!plot.is_visible_on_plot(Rect::new(101.0, 0.0, 110.0, 10.0)));
    }

    #[test]
    fn removing_a_dataset_removes_its_layer() {
        let mut plot = scatter().with_name("s");
        plot.add_dataset(points());
        let mut scene = Scene::new();
        plot.render(&mut scene);
        assert!(scene.layer("s/pts").is_some());
        assert!(plot.remove_dataset("pts").is_some());
        plot.render(&mut scene);
        assert!(scene.layer("s/pts").is_none());
    }
}
