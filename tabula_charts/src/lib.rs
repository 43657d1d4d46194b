// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Table layout, property bindings and animated plots for `tabula_core`.
//!
//! This crate sits between user data and the `tabula_core` drawing surface:
//! - **Layout**: [`Component`]s answer [`SpaceRequest`]s and are placed by a [`Table`],
//!   which sizes its rows and columns by a bounded fixed-point iteration.
//! - **Bindings**: plots keep [`PropertyBindings`] from attribute keys to an
//!   [`Accessor`] plus an optional [`Scale`].
//! - **Projection**: bindings compile into per-datum projectors
//!   ([`generate_attr_to_projector`]), overlaid with plot defaults.
//! - **Drawing**: each render is a short list of [`DrawStep`]s run in order against a
//!   scene layer, each with its own [`tabula_core::Animator`].
//!
//! [`Scatter`] and [`Pie`] are the two concrete plots.
//!
//! ```
//! use kurbo::{Point, Size};
//! use tabula_charts::{Component, HasDatasets, Scatter, ScaleLinear, Table};
//! use tabula_core::{Dataset, Scene, Value};
//!
//! let data = Dataset::new("points", ["x", "y"]).with_rows([
//!     vec![Value::from(1.0), Value::from(2.0)],
//!     vec![Value::from(3.0), Value::from(4.0)],
//! ]);
//! let mut scatter = Scatter::new(
//!     ScaleLinear::with_domain((0.0, 5.0)),
//!     ScaleLinear::with_domain((0.0, 5.0)),
//! );
//! scatter.add_dataset(data);
//!
//! let mut table = Table::new();
//! table.add_component(0, 0, scatter).unwrap();
//! table.compute_layout(Point::ZERO, Size::new(400.0, 300.0));
//!
//! let mut scene = Scene::new();
//! table.render(&mut scene);
//! scene.finish();
//! assert_eq!(scene.layer("scatter/points").map(|l| l.len()), Some(2));
//! ```

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod binding;
mod component;
mod draw_step;
#[cfg(not(feature = "std"))]
mod float;
mod format;
mod pie;
mod plot;
mod projector;
mod scale;
mod scatter;
mod space;
mod table;

pub use binding::{Accessor, BindingSource, PropertyBinding, PropertyBindings};
pub use component::{BasicComponent, Component, FixedComponent, Placement, XAlign, YAlign};
pub use draw_step::{DrawStep, DrawSteps, draw, sector_angles};
pub use format::{
    ConfigurationError, CustomFormatter, CustomFormatterBuilder, FixedFormatter, Formatter,
};
pub use pie::{MAIN_ANIMATOR, Pie};
pub use plot::{HasAnimators, HasDatasets, HasPropertyBindings, PlotCore, PlotData, PlotEntity};
pub use projector::{
    AttrToProjector, ProjectionContext, Projector, constant, generate_attr_to_projector,
    insert_default, project_datum, projector,
};
pub use scale::{CATEGORY_COLORS, Scale, ScaleColor, ScaleLinear, infer_domain_f64};
pub use scatter::{SYMBOLS_ANIMATOR, SYMBOLS_RESET_ANIMATOR, Scatter};
pub use space::SpaceRequest;
pub use table::{ComponentId, LayoutResult, Table, TableError};
