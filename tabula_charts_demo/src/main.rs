// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Table layout and plot demo for `tabula_charts`.
//!
//! Lays out a title row above a scatter plot and a pie plot, runs the entry animations to
//! completion on a 60 fps clock, and writes the settled scene to `tabula_charts_demo.svg`.

mod svg;

use std::error::Error;

use kurbo::{Point, Rect, Size};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use tabula_charts::{
    Accessor, Component, CustomFormatter, FixedComponent, Formatter, HasDatasets, Pie,
    ScaleLinear, Scatter, Table, XAlign, YAlign, infer_domain_f64,
};
use tabula_core::{Dataset, Scene, Symbol, Value};

const FRAME_MS: f64 = 1000.0 / 60.0;

fn main() -> Result<(), Box<dyn Error>> {
    TermLogger::init(
        LevelFilter::Debug,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    let points = sample_points(40);
    let shares = Dataset::new("shares", ["label", "share"]).with_rows([
        vec![Value::from("rust"), Value::from(45.0)],
        vec![Value::from("c++"), Value::from(25.0)],
        vec![Value::from("go"), Value::from(18.0)],
        vec![Value::from("other"), Value::from(12.0)],
    ]);

    let x_domain = infer_domain_f64(&points, "x").unwrap_or((0.0, 1.0));
    let y_domain = infer_domain_f64(&points, "y").unwrap_or((0.0, 1.0));
    let mut scatter = Scatter::new(
        ScaleLinear::with_domain(x_domain),
        ScaleLinear::with_domain(y_domain),
    );
    scatter.set_size_scaled(Accessor::field("weight"), ScaleLinear::new((0.0, 1.0), (4.0, 14.0)));
    scatter.set_symbol(Accessor::new(|_, i, _| {
        Symbol::ALL[i % Symbol::ALL.len()].into()
    }));
    scatter.add_dataset(points);

    let mut pie = Pie::new();
    pie.set_sector_value(Accessor::field("share"));
    pie.set_inner_radius(30.0);
    pie.add_dataset(shares.clone());
    // Pies draw a single dataset; this one is logged and ignored.
    pie.add_dataset(Dataset::from_values("extra", "share", [1.0]));

    let mut table = Table::new().with_padding(10.0, 10.0);
    let title_id = table.add_component(
        0,
        0,
        FixedComponent::new(None, Some(40.0)).with_align(XAlign::Center, YAlign::Top),
    )?;
    let scatter_id = table.add_component(1, 0, scatter)?;
    let pie_id = table.add_component(1, 1, pie)?;
    table.set_col_weight(1, Some(0.6));

    let bounds = Size::new(900.0, 480.0);
    let layout = table.iterate_layout(bounds.width, bounds.height);
    log::info!(
        "columns {:?}, rows {:?}",
        layout.col_widths(),
        layout.row_heights()
    );
    table.compute_layout(Point::ZERO, bounds);

    let mut scene = Scene::new();
    table.render(&mut scene);
    let mut frames = 0_u32;
    while !scene.is_idle() {
        scene.advance(FRAME_MS);
        frames += 1;
    }
    log::info!("animations settled after {frames} frames ({} ms)", scene.now());

    let percent = CustomFormatter::builder()
        .precision(1)
        .format_fn(|v, f| match v.as_f64() {
            Some(share) => format!("{:.*}%", f.precision(), share),
            None => String::from("-"),
        })
        .build()?;
    let total: f64 = shares.iter().filter_map(|d| d.f64("share")).sum();
    for d in shares.iter() {
        let label = d.get("label").and_then(Value::as_str).unwrap_or("?");
        let share = d.f64("share").map(|s| s / total * 100.0);
        log::info!("{label}: {}", percent.format(&share.into()));
    }

    let mut svg = svg::SvgScene::default();
    svg.set_view_box(Rect::from_origin_size(Point::ZERO, bounds));
    if let Some(title) = table.component(title_id) {
        svg.add_title(title.frame(), "Tabula demo");
    }
    for id in [scatter_id, pie_id] {
        if let Some(plot) = table.component(id) {
            svg.add_frame(plot.frame());
        }
    }
    svg.apply_scene(&scene);

    if let Some(scatter) = table.get::<Scatter>(scatter_id) {
        let data = scatter.visible_plot_data(&scene);
        let origin = scatter.frame().origin().to_vec2();
        if let Some(first) = data.pixel_points.first() {
            let hits = scene.hit_test(*first + origin);
            log::debug!("{} visible points; first point hits {hits:?}", data.len());
        }
    }
    if let Some(pie) = table.get::<Pie>(pie_id) {
        log::debug!("pie centroids {:?}", pie.plot_data(&scene).pixel_points);
    }

    std::fs::write("tabula_charts_demo.svg", svg.to_svg_string())?;
    println!("wrote tabula_charts_demo.svg");
    Ok(())
}

/// A deterministic noisy wave with a per-point weight in `[0, 1]`.
fn sample_points(n: usize) -> Dataset {
    let rows = (0..n).map(|i| {
        let x = i as f64 / 2.0;
        let noise = ((i * 7919) % 13) as f64 / 13.0 - 0.5;
        let y = (x / 3.0).sin() * 10.0 + noise * 3.0;
        let weight = ((i * 31) % 17) as f64 / 16.0;
        vec![Value::from(x), Value::from(y), Value::from(weight)]
    });
    Dataset::new("wave", ["x", "y", "weight"]).with_rows(rows)
}
