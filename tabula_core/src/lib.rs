// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal drawing-surface runtime for Tabula.
//!
//! This crate holds the pieces that plots render *into*:
//! - **Data**: [`Dataset`] rows of [`Value`]s, borrowed per row as a [`Datum`].
//! - **Surface**: a [`Scene`] of named [`Layer`]s, each a list of [`Element`]s whose
//!   attributes ([`AttrMap`]) describe a symbol or an arc.
//! - **Animation**: [`Animator`] strategies that schedule [`Transition`]s on elements
//!   against the scene clock.
//!
//! Layout, scales and property bindings live in `tabula_charts`.

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod animator;
mod dataset;
#[cfg(not(feature = "std"))]
mod float;
mod scene;
mod symbol;
mod value;

pub use animator::{Animator, Easing, EasingAnimator, NullAnimator};
pub use dataset::{Dataset, Datum};
pub use scene::{AttrMap, Element, Hit, Layer, MarkKind, Scene, Transition, attr, mark_path};
pub use symbol::Symbol;
pub use value::Value;
