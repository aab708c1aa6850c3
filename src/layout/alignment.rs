// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Edge/center alignment and spacing detection

use serde::{Deserialize, Serialize};

use super::grouping::LayoutStructure;
use super::LayoutConfig;
use crate::types::RecognizedElement;

/// Which coordinate an alignment group shares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlignmentKind {
    Left,
    Right,
    Top,
    Bottom,
    CenterX,
    CenterY,
}

impl AlignmentKind {
    pub const ALL: [AlignmentKind; 6] = [
        AlignmentKind::Left,
        AlignmentKind::Right,
        AlignmentKind::Top,
        AlignmentKind::Bottom,
        AlignmentKind::CenterX,
        AlignmentKind::CenterY,
    ];

    pub fn coordinate(&self, element: &RecognizedElement) -> f32 {
        match self {
            AlignmentKind::Left => element.x,
            AlignmentKind::Right => element.right(),
            AlignmentKind::Top => element.y,
            AlignmentKind::Bottom => element.bottom(),
            AlignmentKind::CenterX => element.center_x(),
            AlignmentKind::CenterY => element.center_y(),
        }
    }
}

/// Elements sharing one coordinate within the alignment threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentGroup {
    pub kind: AlignmentKind,
    /// Mean coordinate of the members
    pub value: f32,
    pub members: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Gaps between consecutive members of one row or column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpacingInfo {
    /// Horizontal for rows, vertical for columns
    pub axis: Axis,
    /// Index into `LayoutStructure::rows` or `columns`
    pub group: usize,
    pub gaps: Vec<f32>,
    pub average: f32,
    /// Spread of the gaps is within the alignment threshold
    pub uniform: bool,
}

/// Alignment groups for every kind, in `AlignmentKind::ALL` order
///
/// Each group is anchored at its smallest coordinate and accepts members within
/// `alignment_threshold` of that anchor, so two members never differ by more
/// than the threshold.
pub fn detect_alignments(elements: &[RecognizedElement], config: &LayoutConfig) -> Vec<AlignmentGroup> {
    let mut groups = Vec::new();

    for kind in AlignmentKind::ALL {
        let mut keyed: Vec<(usize, f32)> = elements
            .iter()
            .map(|e| kind.coordinate(e))
            .enumerate()
            .collect();
        keyed.sort_by(|a, b| a.1.total_cmp(&b.1));

        let mut clusters: Vec<(f32, Vec<(usize, f32)>)> = Vec::new();
        for (index, value) in keyed {
            let within = clusters
                .last()
                .map_or(false, |(anchor, _)| value - *anchor <= config.alignment_threshold);
            match clusters.last_mut() {
                Some((_, members)) if within => members.push((index, value)),
                _ => clusters.push((value, vec![(index, value)])),
            }
        }

        for (_, members) in clusters {
            if members.len() < config.min_group_size {
                continue;
            }
            let value = members.iter().map(|(_, v)| v).sum::<f32>() / members.len() as f32;
            let mut indices: Vec<usize> = members.into_iter().map(|(i, _)| i).collect();
            indices.sort_unstable();
            groups.push(AlignmentGroup {
                kind,
                value,
                members: indices,
            });
        }
    }

    groups
}

fn spacing_for(
    elements: &[RecognizedElement],
    members: &[usize],
    axis: Axis,
    group: usize,
    threshold: f32,
) -> Option<SpacingInfo> {
    let (near, far) = match axis {
        Axis::Horizontal => (AlignmentKind::Left, AlignmentKind::Right),
        Axis::Vertical => (AlignmentKind::Top, AlignmentKind::Bottom),
    };

    let mut ordered: Vec<&RecognizedElement> = members.iter().map(|&i| &elements[i]).collect();
    ordered.sort_by(|a, b| near.coordinate(a).total_cmp(&near.coordinate(b)));

    let gaps: Vec<f32> = ordered
        .windows(2)
        .map(|w| near.coordinate(w[1]) - far.coordinate(w[0]))
        .collect();
    if gaps.is_empty() {
        return None;
    }

    let average = gaps.iter().sum::<f32>() / gaps.len() as f32;
    let (min, max) = gaps
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), &g| (lo.min(g), hi.max(g)));

    Some(SpacingInfo {
        axis,
        group,
        gaps,
        average,
        uniform: max - min <= threshold,
    })
}

/// Spacing along each detected row (horizontal) and column (vertical)
pub fn detect_spacing(
    elements: &[RecognizedElement],
    structure: &LayoutStructure,
    config: &LayoutConfig,
) -> Vec<SpacingInfo> {
    let rows = structure.rows.iter().enumerate().filter_map(|(i, row)| {
        spacing_for(elements, &row.members, Axis::Horizontal, i, config.alignment_threshold)
    });
    let columns = structure.columns.iter().enumerate().filter_map(|(i, column)| {
        spacing_for(elements, &column.members, Axis::Vertical, i, config.alignment_threshold)
    });
    rows.chain(columns).collect()
}
