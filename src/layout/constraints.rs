// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Responsive constraint inference
//!
//! Rules per axis, first match wins:
//! 1. size > 80% of the container -> stretch
//! 2. near/far margins differ by less than 10% of the container -> center
//! 3. near margin is the smaller one and under 10% -> min
//! 4. far margin is the smaller one and under 10% -> max
//! 5. otherwise -> scale

use crate::types::{AxisConstraints, Constraint, ElementLayout, RecognizedElement};

/// Fraction of the container above which an element stretches
pub const STRETCH_RATIO: f32 = 0.8;

/// Fraction of the container used as the edge-snapping threshold
pub const EDGE_RATIO: f32 = 0.1;

/// Constraint for one axis
pub fn infer_axis_constraint(position: f32, size: f32, container_size: f32) -> Constraint {
    if container_size <= 0.0 {
        return Constraint::Scale;
    }

    let near = position;
    let far = container_size - (position + size);
    let threshold = container_size * EDGE_RATIO;

    if size > container_size * STRETCH_RATIO {
        Constraint::Stretch
    } else if (near - far).abs() < threshold {
        Constraint::Center
    } else if near < far && near < threshold {
        Constraint::Min
    } else if far < near && far < threshold {
        Constraint::Max
    } else {
        Constraint::Scale
    }
}

/// Constraints for both axes of one element
pub fn infer_constraints(
    element: &RecognizedElement,
    container_width: f32,
    container_height: f32,
) -> AxisConstraints {
    AxisConstraints {
        horizontal: infer_axis_constraint(element.x, element.width, container_width),
        vertical: infer_axis_constraint(element.y, element.height, container_height),
    }
}

/// Copies of `elements` with constraints in their layout metadata
///
/// Existing row/column membership is preserved. Re-running on the output yields
/// the same constraints.
pub fn generate_all_constraints(
    elements: &[RecognizedElement],
    container_width: f32,
    container_height: f32,
) -> Vec<RecognizedElement> {
    elements
        .iter()
        .map(|element| {
            let mut copy = element.clone();
            let layout = copy.layout.get_or_insert_with(ElementLayout::default);
            layout.constraints = Some(infer_constraints(element, container_width, container_height));
            copy
        })
        .collect()
}
