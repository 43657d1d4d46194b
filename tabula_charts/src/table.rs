// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A grid container that sizes rows and columns by negotiating with its children.
//!
//! Each row and column receives a *guaranteed* size (the largest request of the
//! components in it) plus a share of the leftover *proportional* space. Guarantees depend
//! on the offers, and the offers depend on the guarantees, so [`Table::iterate_layout`]
//! runs a bounded fixed-point iteration:
//!
//! 1. Offer each cell its row/column guarantee plus proportional share.
//! 2. Take the per-column max width and per-row max height as new guarantees.
//! 3. Hand free space to the columns/rows that still want more.
//!
//! Fixed rows/columns (every component fixed along that axis) get no share of the
//! proportional space unless given an explicit weight.

extern crate alloc;

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::any::Any;

use kurbo::{Point, Rect, Size};
use tabula_core::Scene;

use crate::component::Placement;
use crate::{Component, SpaceRequest};

/// Handle to a component owned by a [`Table`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ComponentId(usize);

/// Errors raised while editing a [`Table`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// The target cell already holds a component.
    #[error("table cell ({row}, {col}) already holds a component")]
    SlotOccupied {
        /// Row of the occupied cell.
        row: usize,
        /// Column of the occupied cell.
        col: usize,
    },
}

/// Output of [`Table::iterate_layout`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutResult {
    /// Proportional space per column.
    pub col_proportional_space: Vec<f64>,
    /// Proportional space per row.
    pub row_proportional_space: Vec<f64>,
    /// Guaranteed width per column.
    pub guaranteed_widths: Vec<f64>,
    /// Guaranteed height per row.
    pub guaranteed_heights: Vec<f64>,
    /// `true` if some column still wants more width.
    pub wants_width: bool,
    /// `true` if some row still wants more height.
    pub wants_height: bool,
}

impl LayoutResult {
    /// Final column widths (guarantee plus proportional share).
    pub fn col_widths(&self) -> Vec<f64> {
        sum_pairwise(&self.guaranteed_widths, &self.col_proportional_space)
    }

    /// Final row heights (guarantee plus proportional share).
    pub fn row_heights(&self) -> Vec<f64> {
        sum_pairwise(&self.guaranteed_heights, &self.row_proportional_space)
    }
}

#[derive(Debug)]
struct Guarantees {
    widths: Vec<f64>,
    heights: Vec<f64>,
    wants_width: Vec<bool>,
    wants_height: Vec<bool>,
}

/// A grid of optional components.
///
/// The grid is always rectangular; empty cells hold `None`.
#[derive(Debug, Default)]
pub struct Table {
    components: Vec<Option<Box<dyn Component>>>,
    rows: Vec<Vec<Option<ComponentId>>>,
    row_padding: f64,
    col_padding: f64,
    row_weights: Vec<Option<f64>>,
    col_weights: Vec<Option<f64>>,
    placement: Placement,
    layout_dirty: bool,
}

impl Table {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table from rows of optional components. Short rows are padded.
    pub fn from_rows(rows: Vec<Vec<Option<Box<dyn Component>>>>) -> Self {
        let mut table = Self::new();
        let n_cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        table.pad_to_size(rows.len(), n_cols);
        for (r, row) in rows.into_iter().enumerate() {
            for (c, component) in row.into_iter().enumerate() {
                if let Some(component) = component {
                    let id = table.push(component);
                    table.rows[r][c] = Some(id);
                }
            }
        }
        table
    }

    /// Sets the gutters between rows and between columns.
    pub fn with_padding(mut self, row_padding: f64, col_padding: f64) -> Self {
        self.set_padding(row_padding, col_padding);
        self
    }

    /// Sets the gutters between rows and between columns.
    pub fn set_padding(&mut self, row_padding: f64, col_padding: f64) {
        self.row_padding = row_padding.max(0.0);
        self.col_padding = col_padding.max(0.0);
        self.layout_dirty = true;
    }

    /// Overrides the weight of a row, or restores the default with `None`.
    pub fn set_row_weight(&mut self, row: usize, weight: Option<f64>) {
        self.pad_to_size(row + 1, self.n_cols());
        self.row_weights[row] = weight.map(|w| w.max(0.0));
        self.layout_dirty = true;
    }

    /// Overrides the weight of a column, or restores the default with `None`.
    pub fn set_col_weight(&mut self, col: usize, weight: Option<f64>) {
        self.pad_to_size(self.n_rows(), col + 1);
        self.col_weights[col] = weight.map(|w| w.max(0.0));
        self.layout_dirty = true;
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// The grid of component handles.
    pub fn rows(&self) -> &[Vec<Option<ComponentId>>] {
        &self.rows
    }

    /// Grows the grid to at least `n_rows x n_cols`, filling new cells with `None`.
    pub fn pad_to_size(&mut self, n_rows: usize, n_cols: usize) {
        let n_cols = n_cols.max(self.n_cols());
        for row in &mut self.rows {
            row.resize(n_cols, None);
        }
        while self.rows.len() < n_rows {
            self.rows.push(vec![None; n_cols]);
        }
        let n_rows = self.rows.len();
        self.row_weights.resize(n_rows, None);
        self.col_weights.resize(n_cols, None);
    }

    /// Adds a component at `(row, col)`, growing the grid as needed.
    ///
    /// Fails without touching the cell if it is already occupied.
    pub fn add_component<C: Component>(
        &mut self,
        row: usize,
        col: usize,
        component: C,
    ) -> Result<ComponentId, TableError> {
        self.add_boxed(row, col, Box::new(component))
    }

    /// Like [`Table::add_component`], for an already boxed component.
    pub fn add_boxed(
        &mut self,
        row: usize,
        col: usize,
        component: Box<dyn Component>,
    ) -> Result<ComponentId, TableError> {
        self.pad_to_size(row + 1, col + 1);
        if self.rows[row][col].is_some() {
            return Err(TableError::SlotOccupied { row, col });
        }
        let id = self.push(component);
        self.rows[row][col] = Some(id);
        self.layout_dirty = true;
        Ok(id)
    }

    /// Removes and returns the component at `(row, col)`. The grid keeps its size.
    ///
    /// Anything the component already rendered stays in the scene; use
    /// [`remove_rendered`](Self::remove_rendered) to take that out as well.
    pub fn remove(&mut self, row: usize, col: usize) -> Option<Box<dyn Component>> {
        let id = self.rows.get_mut(row)?.get_mut(col)?.take()?;
        self.layout_dirty = true;
        self.components.get_mut(id.0)?.take()
    }

    /// Removes the component at `(row, col)` together with its layers in `scene`.
    pub fn remove_rendered(
        &mut self,
        row: usize,
        col: usize,
        scene: &mut Scene,
    ) -> Option<Box<dyn Component>> {
        let mut component = self.remove(row, col)?;
        component.clear_rendered(scene);
        Some(component)
    }

    /// Returns the handle stored at `(row, col)`.
    pub fn component_at(&self, row: usize, col: usize) -> Option<ComponentId> {
        *self.rows.get(row)?.get(col)?
    }

    /// Returns a component.
    pub fn component(&self, id: ComponentId) -> Option<&dyn Component> {
        self.components.get(id.0)?.as_deref()
    }

    /// Returns a component downcast to its concrete type.
    pub fn get<T: Component>(&self, id: ComponentId) -> Option<&T> {
        let component: &dyn Any = self.components.get(id.0)?.as_deref()?;
        component.downcast_ref()
    }

    /// Returns a component downcast to its concrete type, mutably.
    ///
    /// Marks the layout stale, since the component may change its requests.
    pub fn get_mut<T: Component>(&mut self, id: ComponentId) -> Option<&mut T> {
        self.layout_dirty = true;
        let component: &mut dyn Any = self.components.get_mut(id.0)?.as_deref_mut()?;
        component.downcast_mut()
    }

    /// Returns `true` if the grid changed since the last [`Component::compute_layout`].
    pub fn needs_layout(&self) -> bool {
        self.layout_dirty
    }

    /// Sets how the table is aligned when it is fixed along an axis.
    pub fn set_align(&mut self, x_align: crate::XAlign, y_align: crate::YAlign) {
        self.placement.x_align = x_align;
        self.placement.y_align = y_align;
    }

    /// Solves row and column sizes for an offer.
    pub fn iterate_layout(&self, offered_width: f64, offered_height: f64) -> LayoutResult {
        let n_rows = self.n_rows();
        let n_cols = self.n_cols();
        let avail_width = available(offered_width, self.col_padding, n_cols);
        let avail_height = available(offered_height, self.row_padding, n_rows);

        let col_weights = self.col_weights();
        let row_weights = self.row_weights();

        // Fixed rows/columns still need something to answer requests with on the
        // first pass.
        let heuristic = |w: &f64| if *w == 0.0 { 0.5 } else { *w };
        let col_heuristic: Vec<f64> = col_weights.iter().map(heuristic).collect();
        let row_heuristic: Vec<f64> = row_weights.iter().map(heuristic).collect();
        let mut col_prop = proportional_space(&col_heuristic, avail_width);
        let mut row_prop = proportional_space(&row_heuristic, avail_height);

        let mut guarantees = Guarantees {
            widths: vec![0.0; n_cols],
            heights: vec![0.0; n_rows],
            wants_width: vec![false; n_cols],
            wants_height: vec![false; n_rows],
        };
        let mut last_free_width: Option<f64> = None;
        let mut last_free_height: Option<f64> = None;
        let max_passes = (2 * (n_rows + n_cols)).max(6);
        let mut passes = 0;

        loop {
            passes += 1;
            let offered_cols = sum_pairwise(&guarantees.widths, &col_prop);
            let offered_rows = sum_pairwise(&guarantees.heights, &row_prop);
            guarantees = self.determine_guarantees(&offered_cols, &offered_rows);

            let free_width = avail_width - guarantees.widths.iter().sum::<f64>();
            let free_height = avail_height - guarantees.heights.iter().sum::<f64>();
            let any_wants_width = guarantees.wants_width.iter().any(|w| *w);
            let any_wants_height = guarantees.wants_height.iter().any(|w| *w);

            col_prop = if any_wants_width {
                proportional_space(&wanting(&guarantees.wants_width), free_width)
            } else {
                proportional_space(&col_weights, free_width)
            };
            row_prop = if any_wants_height {
                proportional_space(&wanting(&guarantees.wants_height), free_height)
            } else {
                proportional_space(&row_weights, free_height)
            };

            log::trace!(
                "table layout pass {passes}: widths {:?} free {free_width}, heights {:?} free {free_height}",
                guarantees.widths,
                guarantees.heights,
            );

            let can_improve_width =
                free_width > 0.0 && any_wants_width && last_free_width != Some(free_width);
            let can_improve_height =
                free_height > 0.0 && any_wants_height && last_free_height != Some(free_height);
            last_free_width = Some(free_width);
            last_free_height = Some(free_height);

            if !(can_improve_width || can_improve_height) {
                break;
            }
            if passes >= max_passes {
                log::debug!(
                    "table layout did not settle after {passes} passes for {offered_width}x{offered_height}"
                );
                break;
            }
        }

        let free_width = avail_width - guarantees.widths.iter().sum::<f64>();
        let free_height = avail_height - guarantees.heights.iter().sum::<f64>();
        LayoutResult {
            col_proportional_space: proportional_space(&col_weights, free_width),
            row_proportional_space: proportional_space(&row_weights, free_height),
            wants_width: guarantees.wants_width.iter().any(|w| *w),
            wants_height: guarantees.wants_height.iter().any(|w| *w),
            guaranteed_widths: guarantees.widths,
            guaranteed_heights: guarantees.heights,
        }
    }

    fn push(&mut self, component: Box<dyn Component>) -> ComponentId {
        self.components.push(Some(component));
        ComponentId(self.components.len() - 1)
    }

    fn cells(&self) -> impl Iterator<Item = (usize, usize, &dyn Component)> + '_ {
        self.rows.iter().enumerate().flat_map(move |(r, row)| {
            row.iter().enumerate().filter_map(move |(c, cell)| {
                let id = (*cell)?;
                let component = self.components.get(id.0)?.as_deref()?;
                Some((r, c, component))
            })
        })
    }

    fn col_weights(&self) -> Vec<f64> {
        let mut fixed = vec![true; self.n_cols()];
        for (_, c, component) in self.cells() {
            fixed[c] &= component.is_fixed_width();
        }
        resolve_weights(&self.col_weights, &fixed)
    }

    fn row_weights(&self) -> Vec<f64> {
        let mut fixed = vec![true; self.n_rows()];
        for (r, _, component) in self.cells() {
            fixed[r] &= component.is_fixed_height();
        }
        resolve_weights(&self.row_weights, &fixed)
    }

    fn determine_guarantees(&self, offered_cols: &[f64], offered_rows: &[f64]) -> Guarantees {
        let mut out = Guarantees {
            widths: vec![0.0; offered_cols.len()],
            heights: vec![0.0; offered_rows.len()],
            wants_width: vec![false; offered_cols.len()],
            wants_height: vec![false; offered_rows.len()],
        };
        for (r, c, component) in self.cells() {
            let (ow, oh) = (offered_cols[c], offered_rows[r]);
            let request = component.requested_space(ow, oh).clamp_to(ow, oh);
            out.widths[c] = out.widths[c].max(request.width);
            out.heights[r] = out.heights[r].max(request.height);
            out.wants_width[c] |= request.wants_width;
            out.wants_height[r] |= request.wants_height;
        }
        out
    }
}

impl Component for Table {
    fn requested_space(&self, offered_width: f64, offered_height: f64) -> SpaceRequest {
        let layout = self.iterate_layout(offered_width, offered_height);
        let gutters = |padding: f64, n: usize| padding * n.saturating_sub(1) as f64;
        SpaceRequest {
            width: (layout.guaranteed_widths.iter().sum::<f64>()
                + gutters(self.col_padding, self.n_cols()))
            .min(offered_width),
            height: (layout.guaranteed_heights.iter().sum::<f64>()
                + gutters(self.row_padding, self.n_rows()))
            .min(offered_height),
            wants_width: layout.wants_width,
            wants_height: layout.wants_height,
        }
    }

    fn is_fixed_width(&self) -> bool {
        self.cells().all(|(_, _, c)| c.is_fixed_width())
    }

    fn is_fixed_height(&self) -> bool {
        self.cells().all(|(_, _, c)| c.is_fixed_height())
    }

    fn compute_layout(&mut self, origin: Point, available: Size) {
        let request = self.requested_space(available.width.max(0.0), available.height.max(0.0));
        let (fixed_width, fixed_height) = (self.is_fixed_width(), self.is_fixed_height());
        let frame = self
            .placement
            .place(origin, available, request, fixed_width, fixed_height);

        let layout = self.iterate_layout(frame.width(), frame.height());
        let col_widths = layout.col_widths();
        let row_heights = layout.row_heights();

        let mut y = frame.y0;
        for (r, row) in self.rows.iter().enumerate() {
            let mut x = frame.x0;
            for (c, cell) in row.iter().enumerate() {
                if let Some(component) = cell.and_then(|id| self.components[id.0].as_mut()) {
                    component.compute_layout(Point::new(x, y), Size::new(col_widths[c], row_heights[r]));
                }
                x += col_widths[c] + self.col_padding;
            }
            y += row_heights[r] + self.row_padding;
        }
        self.layout_dirty = false;
    }

    fn frame(&self) -> Rect {
        self.placement.frame()
    }

    fn render(&mut self, scene: &mut Scene) {
        for component in self.components.iter_mut().flatten() {
            component.render(scene);
        }
    }

    fn clear_rendered(&mut self, scene: &mut Scene) {
        for component in self.components.iter_mut().flatten() {
            component.clear_rendered(scene);
        }
    }
}

fn available(offered: f64, padding: f64, n: usize) -> f64 {
    (offered - padding * n.saturating_sub(1) as f64).max(0.0)
}

fn resolve_weights(explicit: &[Option<f64>], fixed: &[bool]) -> Vec<f64> {
    fixed
        .iter()
        .enumerate()
        .map(|(i, fixed)| {
            explicit
                .get(i)
                .copied()
                .flatten()
                .unwrap_or(if *fixed { 0.0 } else { 1.0 })
        })
        .collect()
}

fn wanting(wants: &[bool]) -> Vec<f64> {
    wants.iter().map(|w| if *w { 1.0 } else { 0.0 }).collect()
}

fn sum_pairwise(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(a, b)| a + b).collect()
}

/// Splits `free` across `weights`; weights summing to zero split evenly.
fn proportional_space(weights: &[f64], free: f64) -> Vec<f64> {
    let free = free.max(0.0);
    let total: f64 = weights.iter().sum();
    if total == 0.0 {
        let n = weights.len() as f64;
        return weights.iter().map(|_| free / n).collect();
    }
    weights
        .iter()
        .map(|w| if *w == 0.0 { 0.0 } else { free * w / total })
        .collect()
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::{BasicComponent, FixedComponent};

    #[test]
    fn proportional_space_splits_by_weight() {
        assert_eq!(proportional_space(&[1.0, 3.0], 100.0), vec![25.0, 75.0]);
        assert_eq!(proportional_space(&[0.0, 0.0], 20.0), vec![10.0, 10.0]);
        assert_eq!(proportional_space(&[0.0, 1.0], f64::INFINITY), vec![0.0, f64::INFINITY]);
        assert!(proportional_space(&[], 20.0).is_empty());
    }

    #[test]
    fn pad_to_size_keeps_existing_cells() {
        let mut t = Table::new();
        assert!(t.rows().is_empty());
        t.pad_to_size(1, 1);
        assert_eq!(t.rows(), &[vec![None]]);
        let id = t.add_component(0, 0, BasicComponent::new()).expect("empty cell");
        t.pad_to_size(5, 2);
        assert_eq!(t.n_rows(), 5);
        assert!(t.rows().iter().all(|r| r.len() == 2));
        assert_eq!(t.component_at(0, 0), Some(id));
    }

    #[test]
    fn from_rows_pads_ragged_input() {
        let basic: Box<dyn Component> = Box::new(BasicComponent::new());
        let fixed: Box<dyn Component> = Box::new(FixedComponent::new(Some(1.0), None));
        let t = Table::from_rows(vec![vec![None, Some(basic)], vec![Some(fixed)]]);
        assert_eq!((t.n_rows(), t.n_cols()), (2, 2));
        assert!(t.component_at(0, 0).is_none());
        assert!(t.component_at(0, 1).is_some());
        assert!(t.component_at(1, 1).is_none());
        let id = t.component_at(1, 0).expect("fixed component");
        assert!(t.get::<FixedComponent>(id).is_some());
        assert!(t.get::<BasicComponent>(id).is_none());
    }

    #[test]
    fn occupied_slot_is_rejected() {
        let mut t = Table::new();
        t.add_component(0, 2, Table::new()).expect("empty cell");
        let first = t.add_component(0, 0, Table::new()).expect("empty cell");
        let before = t.rows().to_vec();
        assert_eq!(
            t.add_component(0, 2, BasicComponent::new()),
            Err(TableError::SlotOccupied { row: 0, col: 2 })
        );
        assert_eq!(t.rows(), &before[..]);
        assert_eq!(t.component_at(0, 0), Some(first));
    }

    #[test]
    fn remove_frees_the_slot() {
        let mut t = Table::new();
        t.add_component(1, 1, BasicComponent::new()).expect("empty cell");
        assert!(t.remove(1, 1).is_some());
        assert!(t.remove(1, 1).is_none());
        assert_eq!((t.n_rows(), t.n_cols()), (2, 2));
        t.add_component(1, 1, BasicComponent::new()).expect("freed cell");
    }

    #[test]
    fn empty_table_requests_nothing() {
        let t = Table::new();
        assert_eq!(t.requested_space(100.0, 100.0), SpaceRequest::NONE);
        let layout = t.iterate_layout(100.0, 100.0);
        assert!(layout.col_proportional_space.is_empty());
        assert!(!layout.wants_width && !layout.wants_height);
    }

    #[test]
    fn explicit_weights_override_fixity() {
        let mut t = Table::new();
        t.add_component(0, 0, BasicComponent::new()).expect("empty cell");
        t.add_component(0, 1, BasicComponent::new()).expect("empty cell");
        t.set_col_weight(1, Some(3.0));
        let layout = t.iterate_layout(400.0, 100.0);
        assert_eq!(layout.col_proportional_space, vec![100.0, 300.0]);
    }

    #[test]
    fn layout_marks_table_clean() {
        let mut t = Table::new();
        t.add_component(0, 0, BasicComponent::new()).expect("empty cell");
        assert!(t.needs_layout());
        t.compute_layout(Point::ZERO, Size::new(10.0, 10.0));
        assert!(!t.needs_layout());
        t.set_padding(2.0, 2.0);
        assert!(t.needs_layout());
    }
}
