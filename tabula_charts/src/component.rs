// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout participants.
//!
//! Layout is a two-phase protocol, measured top-down:
//! - **Request**: a parent offers space and the child answers with a [`SpaceRequest`].
//! - **Place**: the parent hands the child an origin and a cell size; the child records
//!   its frame within that cell.
//!
//! A component that is *fixed* along an axis uses only what it requested along that axis
//! and is aligned inside the cell; a flexible component fills the cell.

use core::any::Any;
use core::fmt;

use kurbo::{Point, Rect, Size};
use tabula_core::Scene;

use crate::SpaceRequest;

/// Something that can be sized, placed and rendered by a layout container.
pub trait Component: Any + fmt::Debug {
    /// Answers an offer of space. Must not mutate state: equal offers give equal answers.
    fn requested_space(&self, offered_width: f64, offered_height: f64) -> SpaceRequest;

    /// Returns `true` if the component's width does not grow with the offer.
    fn is_fixed_width(&self) -> bool {
        false
    }

    /// Returns `true` if the component's height does not grow with the offer.
    fn is_fixed_height(&self) -> bool {
        false
    }

    /// Places the component inside the cell at `origin` with size `available`.
    fn compute_layout(&mut self, origin: Point, available: Size);

    /// Returns the frame assigned by the last [`Component::compute_layout`].
    fn frame(&self) -> Rect;

    /// Draws the component into `scene`.
    fn render(&mut self, scene: &mut Scene) {
        let _ = scene;
    }

    /// Removes everything [`render`](Self::render) put into `scene`.
    fn clear_rendered(&mut self, scene: &mut Scene) {
        let _ = scene;
    }
}

/// Horizontal alignment of a fixed-width component inside a wider cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum XAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
}

impl XAlign {
    /// Share of the slack placed before the component.
    pub fn proportion(self) -> f64 {
        match self {
            Self::Left => 0.0,
            Self::Center => 0.5,
            Self::Right => 1.0,
        }
    }
}

/// Vertical alignment of a fixed-height component inside a taller cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum YAlign {
    /// Flush top.
    #[default]
    Top,
    /// Centered.
    Center,
    /// Flush bottom.
    Bottom,
}

impl YAlign {
    /// Share of the slack placed above the component.
    pub fn proportion(self) -> f64 {
        match self {
            Self::Top => 0.0,
            Self::Center => 0.5,
            Self::Bottom => 1.0,
        }
    }
}

/// Alignment plus the frame assigned by the last layout pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Placement {
    /// Horizontal alignment.
    pub x_align: XAlign,
    /// Vertical alignment.
    pub y_align: YAlign,
    frame: Rect,
}

impl Placement {
    /// Creates a top-left aligned placement with an empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current frame.
    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// Computes and stores the frame for a cell.
    pub fn place(
        &mut self,
        origin: Point,
        available: Size,
        request: SpaceRequest,
        fixed_width: bool,
        fixed_height: bool,
    ) -> Rect {
        let aw = available.width.max(0.0);
        let ah = available.height.max(0.0);
        let (x, w) = if fixed_width {
            let w = request.width.clamp(0.0, aw);
            (origin.x + (aw - w) * self.x_align.proportion(), w)
        } else {
            (origin.x, aw)
        };
        let (y, h) = if fixed_height {
            let h = request.height.clamp(0.0, ah);
            (origin.y + (ah - h) * self.y_align.proportion(), h)
        } else {
            (origin.y, ah)
        };
        self.frame = Rect::new(x, y, x + w, y + h);
        self.frame
    }
}

/// A flexible component that requests nothing and fills its cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BasicComponent {
    placement: Placement,
}

impl BasicComponent {
    /// Creates a new basic component.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for BasicComponent {
    fn requested_space(&self, _offered_width: f64, _offered_height: f64) -> SpaceRequest {
        SpaceRequest::NONE
    }

    fn compute_layout(&mut self, origin: Point, available: Size) {
        self.placement
            .place(origin, available, SpaceRequest::NONE, false, false);
    }

    fn frame(&self) -> Rect {
        self.placement.frame()
    }
}

/// A component with an optional fixed width and/or height.
///
/// A `None` axis behaves like a [`BasicComponent`] along that axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FixedComponent {
    width: Option<f64>,
    height: Option<f64>,
    placement: Placement,
}

impl FixedComponent {
    /// Creates a component fixed to the given sizes.
    pub fn new(width: Option<f64>, height: Option<f64>) -> Self {
        Self {
            width: width.map(|w| w.max(0.0)),
            height: height.map(|h| h.max(0.0)),
            placement: Placement::new(),
        }
    }

    /// Sets the alignment used when the cell is larger than the fixed size.
    pub fn with_align(mut self, x_align: XAlign, y_align: YAlign) -> Self {
        self.placement.x_align = x_align;
        self.placement.y_align = y_align;
        self
    }

    /// Replaces the fixed sizes.
    pub fn set_fixed_size(&mut self, width: Option<f64>, height: Option<f64>) {
        self.width = width.map(|w| w.max(0.0));
        self.height = height.map(|h| h.max(0.0));
    }
}

impl Component for FixedComponent {
    fn requested_space(&self, offered_width: f64, offered_height: f64) -> SpaceRequest {
        SpaceRequest::new(self.width.unwrap_or(0.0), self.height.unwrap_or(0.0))
            .clamp_to(offered_width, offered_height)
    }

    fn is_fixed_width(&self) -> bool {
        self.width.is_some()
    }

    fn is_fixed_height(&self) -> bool {
        self.height.is_some()
    }

    fn compute_layout(&mut self, origin: Point, available: Size) {
        let request = self.requested_space(available.width, available.height);
        self.placement.place(
            origin,
            available,
            request,
            self.is_fixed_width(),
            self.is_fixed_height(),
        );
    }

    fn frame(&self) -> Rect {
        self.placement.frame()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn fixed_component_reports_clamped_size_and_wants() {
        let c = FixedComponent::new(Some(50.0), None);
        assert_eq!(
            c.requested_space(30.0, 30.0),
            SpaceRequest {
                width: 30.0,
                height: 0.0,
                wants_width: true,
                wants_height: false,
            }
        );
        assert_eq!(c.requested_space(80.0, 80.0), SpaceRequest::new(50.0, 0.0));
        assert_eq!(c.requested_space(80.0, 80.0), c.requested_space(80.0, 80.0));
        assert!(c.is_fixed_width());
        assert!(!c.is_fixed_height());
    }

    #[test]
    fn fixed_axis_is_aligned_and_flexible_axis_fills() {
        let mut c = FixedComponent::new(Some(20.0), None).with_align(XAlign::Center, YAlign::Bottom);
        c.compute_layout(Point::new(10.0, 10.0), Size::new(100.0, 50.0));
        assert_eq!(c.frame(), Rect::new(50.0, 10.0, 70.0, 60.0));

        let mut c = FixedComponent::new(Some(20.0), Some(20.0)).with_align(XAlign::Right, YAlign::Bottom);
        c.compute_layout(Point::ZERO, Size::new(100.0, 50.0));
        assert_eq!(c.frame(), Rect::new(80.0, 30.0, 100.0, 50.0));
    }

    #[test]
    fn fixed_component_shrinks_into_small_cells() {
        let mut c = FixedComponent::new(Some(200.0), Some(10.0));
        c.compute_layout(Point::ZERO, Size::new(50.0, 50.0));
        assert_eq!(c.frame(), Rect::new(0.0, 0.0, 50.0, 10.0));
    }

    #[test]
    fn basic_component_fills_its_cell() {
        let mut c = BasicComponent::new();
        c.compute_layout(Point::new(5.0, 6.0), Size::new(7.0, 8.0));
        assert_eq!(c.frame(), Rect::new(5.0, 6.0, 12.0, 14.0));
        assert_eq!(c.requested_space(100.0, 100.0), SpaceRequest::NONE);
    }
}
