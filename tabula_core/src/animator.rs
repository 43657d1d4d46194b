// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animation strategies.
//!
//! An [`Animator`] receives the final attribute values for a selection of elements and
//! decides *when* each element reaches them, by scheduling [`crate::Transition`]s that
//! start at a given scene time. Animators only govern the timing of one step; the order
//! of steps is the caller's.

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;
use crate::scene::{AttrMap, Element};

/// Easing curves applied to transition progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    /// Constant speed.
    Linear,
    /// Cubic ease-in-out.
    CubicInOut,
    /// Exponential ease-out: fast start, slow landing.
    #[default]
    ExpOut,
}

impl Easing {
    /// Maps linear progress `t` in `[0, 1]` to eased progress.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = 2.0 * t - 2.0;
                    0.5 * u * u * u + 1.0
                }
            }
            Self::ExpOut => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2.0_f64.powf(-10.0 * t)
                }
            }
        }
    }
}

/// Applies attribute values to elements, possibly over time.
pub trait Animator: fmt::Debug {
    /// Schedules `values[i]` onto `elements[i]`, beginning at scene time `start`.
    ///
    /// Returns the total time in milliseconds the selection needs to settle, which is
    /// where the next draw step should begin.
    fn animate(&self, elements: &mut [Element], values: Vec<AttrMap>, start: f64) -> f64;

    /// Returns the time needed to animate `count` elements.
    fn total_time(&self, count: usize) -> f64;
}

/// Applies attributes instantly with no transition.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullAnimator;

impl Animator for NullAnimator {
    fn animate(&self, elements: &mut [Element], values: Vec<AttrMap>, start: f64) -> f64 {
        for (element, to) in elements.iter_mut().zip(values) {
            element.schedule(to, start, 0.0, Easing::Linear);
        }
        0.0
    }

    fn total_time(&self, _count: usize) -> f64 {
        0.0
    }
}

/// A timed animator with an optional per-element stagger.
///
/// Element `i` starts at `start + delay + i * iterative_delay` and runs for `duration`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EasingAnimator {
    /// Transition length in milliseconds.
    pub duration: f64,
    /// Delay before the first element starts, in milliseconds.
    pub delay: f64,
    /// Additional delay per element index, in milliseconds.
    pub iterative_delay: f64,
    /// Easing curve.
    pub easing: Easing,
}

impl Default for EasingAnimator {
    fn default() -> Self {
        Self {
            duration: 300.0,
            delay: 0.0,
            iterative_delay: 0.0,
            easing: Easing::ExpOut,
        }
    }
}

impl EasingAnimator {
    /// Creates an animator with a 300ms exponential ease-out and no delays.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the transition duration.
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration.max(0.0);
        self
    }

    /// Sets the start delay.
    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    /// Sets the per-element stagger.
    pub fn with_iterative_delay(mut self, iterative_delay: f64) -> Self {
        self.iterative_delay = iterative_delay.max(0.0);
        self
    }

    /// Sets the easing curve.
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

impl Animator for EasingAnimator {
    fn animate(&self, elements: &mut [Element], values: Vec<AttrMap>, start: f64) -> f64 {
        let mut count = 0;
        for (i, (element, to)) in elements.iter_mut().zip(values).enumerate() {
            let begin = start + self.delay + self.iterative_delay * i as f64;
            element.schedule(to, begin, self.duration, self.easing);
            count += 1;
        }
        self.total_time(count)
    }

    fn total_time(&self, count: usize) -> f64 {
        self.delay + self.duration + self.iterative_delay * count.saturating_sub(1) as f64
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;
    use crate::Value;

    fn attrs(size: f64) -> AttrMap {
        let mut m = AttrMap::new();
        m.insert("size".into(), Value::from(size));
        m
    }

    #[test]
    fn easings_hit_their_endpoints() {
        for easing in [Easing::Linear, Easing::CubicInOut, Easing::ExpOut] {
            assert!(easing.apply(0.0).abs() < 1e-12, "{easing:?}");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-12, "{easing:?}");
        }
    }

    #[test]
    fn null_animator_applies_immediately() {
        let mut elements = vec![Element::new()];
        let t = NullAnimator.animate(&mut elements, vec![attrs(4.0)], 10.0);
        assert_eq!(t, 0.0);
        assert_eq!(elements[0].attr_at("size", 10.0), Some(Value::from(4.0)));
    }

    #[test]
    fn stagger_offsets_each_element() {
        let animator = EasingAnimator::new()
            .with_duration(100.0)
            .with_iterative_delay(10.0)
            .with_easing(Easing::Linear);
        let mut elements = vec![Element::new(), Element::new(), Element::new()];
        let total = animator.animate(
            &mut elements,
            vec![attrs(0.0), attrs(0.0), attrs(0.0)],
            0.0,
        );
        assert_eq!(total, 120.0);
        assert_eq!(animator.total_time(0), 100.0);

        let mut from = vec![Element::new()];
        NullAnimator.animate(&mut from, vec![attrs(0.0)], 0.0);
        animator.animate(&mut from, vec![attrs(10.0)], 0.0);
        assert_eq!(from[0].attr_at("size", 50.0), Some(Value::from(5.0)));
        assert_eq!(from[0].attr_at("size", 100.0), Some(Value::from(10.0)));
    }
}
