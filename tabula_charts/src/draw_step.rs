// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered draw steps executed against a layer.
//!
//! A plot renders a dataset as a short list of steps, each a set of projectors plus the
//! animator that moves elements to the projected values. Step `n + 1` starts when step
//! `n`'s animator says its selection has settled.

extern crate alloc;

use alloc::vec::Vec;
use core::f64::consts::TAU;
use core::fmt;

use smallvec::SmallVec;
use tabula_core::{Animator, AttrMap, Dataset, Layer, MarkKind, Value, attr};

use crate::projector::{AttrToProjector, project_datum};

/// One projector set and the animator that applies it.
pub struct DrawStep<'a> {
    /// Attribute key -> projector.
    pub attr_to_projector: AttrToProjector<'a>,
    /// Timing for this step.
    pub animator: &'a dyn Animator,
}

impl fmt::Debug for DrawStep<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.attr_to_projector.keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        f.debug_struct("DrawStep")
            .field("attr_to_projector", &keys)
            .field("animator", &self.animator)
            .finish()
    }
}

/// The steps for one render, usually one or two.
pub type DrawSteps<'a> = SmallVec<[DrawStep<'a>; 2]>;

/// Runs `steps` in order on `layer` for every datum of `dataset`, starting at `now`.
///
/// In-flight transitions are settled at `now` first, and the layer is resized to one
/// element per datum. Arc layers get start/end angles derived from `sector-value`.
/// Returns the total time until the last step settles.
pub fn draw(layer: &mut Layer, dataset: &Dataset, steps: &[DrawStep<'_>], now: f64) -> f64 {
    layer.interrupt(now);
    layer.sync_len(dataset.len());
    let arcs = layer.kind() == MarkKind::Arc;
    let mut start = now;
    for step in steps {
        let mut values: Vec<AttrMap> = dataset
            .iter()
            .map(|d| project_datum(&step.attr_to_projector, d, dataset))
            .collect();
        if arcs {
            assign_sector_angles(&mut values);
        }
        log::trace!(
            "draw step on layer {:?}: {} elements from t={start}",
            layer.key(),
            values.len()
        );
        start += step.animator.animate(layer.elements_mut(), values, start);
    }
    start - now
}

/// Splits a full turn across `values`, clockwise from 12 o'clock, in order.
///
/// Negative and non-finite values count as zero. If nothing is positive every sector
/// is empty.
pub fn sector_angles(values: &[f64]) -> Vec<(f64, f64)> {
    let clean = |v: &f64| if v.is_finite() && *v > 0.0 { *v } else { 0.0 };
    let total: f64 = values.iter().map(clean).sum();
    if total <= 0.0 {
        return values.iter().map(|_| (0.0, 0.0)).collect();
    }
    let mut acc = 0.0;
    values
        .iter()
        .map(|v| {
            let start = acc / total * TAU;
            acc += clean(v);
            (start, acc / total * TAU)
        })
        .collect()
}

fn assign_sector_angles(values: &mut [AttrMap]) {
    let raw: Vec<f64> = values
        .iter()
        .map(|m| {
            m.get(attr::SECTOR_VALUE)
                .and_then(Value::as_f64)
                .unwrap_or(0.0)
        })
        .collect();
    for (m, (start, end)) in values.iter_mut().zip(sector_angles(&raw)) {
        m.insert(attr::START_ANGLE.into(), start.into());
        m.insert(attr::END_ANGLE.into(), end.into());
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use tabula_core::{EasingAnimator, NullAnimator, Scene};

    use super::*;
    use crate::projector::{constant, projector};

    fn steps<'a>(animators: &'a [&'a dyn Animator]) -> DrawSteps<'a> {
        animators
            .iter()
            .enumerate()
            .map(|(n, animator)| {
                let mut attr_to_projector = AttrToProjector::new();
                attr_to_projector.insert(attr::SIZE.into(), constant(n as f64 * 10.0));
                DrawStep {
                    attr_to_projector,
                    animator: *animator,
                }
            })
            .collect()
    }

    #[test]
    fn sector_angles_cover_a_full_turn_in_order() {
        let angles = sector_angles(&[1.0, -3.0, f64::NAN, 3.0]);
        assert_eq!(angles[0], (0.0, TAU / 4.0));
        assert_eq!(angles[1], (TAU / 4.0, TAU / 4.0));
        assert_eq!(angles[2], (TAU / 4.0, TAU / 4.0));
        assert_eq!(angles[3], (TAU / 4.0, TAU));
        assert_eq!(sector_angles(&[0.0, 0.0]), vec![(0.0, 0.0), (0.0, 0.0)]);
    }

    #[test]
    fn steps_run_back_to_back() {
        let ds = Dataset::from_values("d", "v", [1.0, 2.0]);
        let mut scene = Scene::new();
        let layer = scene.layer_entry("d", MarkKind::Symbol);
        let timed = EasingAnimator::new().with_duration(100.0);
        let animators: [&dyn Animator; 2] = [&NullAnimator, &timed];
        let total = draw(layer, &ds, &steps(&animators), 0.0);
        assert_eq!(total, 100.0);
        assert_eq!(layer.len(), 2);
        assert_eq!(layer.elements()[1].attr_at(attr::SIZE, 0.0), Some(Value::from(0.0)));
        assert_eq!(layer.elements()[1].attr_at(attr::SIZE, 100.0), Some(Value::from(10.0)));
    }

    #[test]
    fn redraw_resizes_and_restarts_from_current_values() {
        let mut scene = Scene::new();
        let layer = scene.layer_entry("d", MarkKind::Symbol);
        let timed = EasingAnimator::new().with_duration(100.0);
        let animators: [&dyn Animator; 2] = [&NullAnimator, &timed];

        draw(layer, &Dataset::from_values("d", "v", [1.0, 2.0, 3.0]), &steps(&animators), 0.0);
        let ds = Dataset::from_values("d", "v", [1.0]);
        draw(layer, &ds, &steps(&animators[1..]), 50.0);
        assert_eq!(layer.len(), 1);
        assert_eq!(layer.elements()[0].transitions().len(), 1);
    }

    #[test]
    fn arc_layers_receive_angles() {
        let ds = Dataset::from_values("d", "v", [1.0, 1.0]);
        let mut scene = Scene::new();
        let layer = scene.layer_entry("pie", MarkKind::Arc);
        let mut attr_to_projector = AttrToProjector::new();
        attr_to_projector.insert(
            attr::SECTOR_VALUE.into(),
            projector(|d, _, _| d.get("v").cloned().unwrap_or_default()),
        );
        let steps = [DrawStep {
            attr_to_projector,
            animator: &NullAnimator,
        }];
        draw(layer, &ds, &steps, 0.0);
        let second = layer.elements()[1].attrs_at(0.0);
        assert_eq!(second[attr::START_ANGLE], Value::from(TAU / 2.0));
        assert_eq!(second[attr::END_ANGLE], Value::from(TAU));
    }
}
