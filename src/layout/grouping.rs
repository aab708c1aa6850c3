// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Row, column and grid detection

use serde::{Deserialize, Serialize};

use super::LayoutConfig;
use crate::types::RecognizedElement;

/// A run of elements sharing a row or column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutGroup {
    /// Smallest near edge among members
    pub start: f32,
    /// Largest far edge among members
    pub end: f32,
    /// Indices into the analyzed element list, ascending
    pub members: Vec<usize>,
}

/// Grid implied by the detected rows and columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridInfo {
    pub rows: usize,
    pub columns: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_gap: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_gap: Option<f32>,
}

/// Spatial groupings derived from element geometry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutStructure {
    pub rows: Vec<LayoutGroup>,
    pub columns: Vec<LayoutGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridInfo>,
}

/// Single-linkage clustering on one coordinate
///
/// Sorted by key; a new cluster opens whenever the step from the previous key
/// exceeds `threshold`.
fn cluster_by(
    elements: &[RecognizedElement],
    key: impl Fn(&RecognizedElement) -> f32,
    threshold: f32,
) -> Vec<Vec<usize>> {
    let mut keyed: Vec<(usize, f32)> = elements.iter().map(&key).enumerate().collect();
    keyed.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut clusters: Vec<Vec<usize>> = Vec::new();
    let mut previous: Option<f32> = None;
    for (index, value) in keyed {
        match previous {
            Some(prev) if value - prev <= threshold => {
                if let Some(current) = clusters.last_mut() {
                    current.push(index);
                }
            }
            _ => clusters.push(vec![index]),
        }
        previous = Some(value);
    }
    clusters
}

fn build_groups(
    elements: &[RecognizedElement],
    clusters: Vec<Vec<usize>>,
    min_group_size: usize,
    span: impl Fn(&RecognizedElement) -> (f32, f32),
) -> Vec<LayoutGroup> {
    clusters
        .into_iter()
        .filter(|members| members.len() >= min_group_size)
        .map(|mut members| {
            members.sort_unstable();
            let (start, end) = members.iter().fold((f32::MAX, f32::MIN), |(lo, hi), &i| {
                let (near, far) = span(&elements[i]);
                (lo.min(near), hi.max(far))
            });
            LayoutGroup {
                start,
                end,
                members,
            }
        })
        .collect()
}

/// Elements whose vertical centers line up, top to bottom
pub fn detect_rows(elements: &[RecognizedElement], config: &LayoutConfig) -> Vec<LayoutGroup> {
    let clusters = cluster_by(elements, |e| e.center_y(), config.alignment_threshold * 2.0);
    build_groups(elements, clusters, config.min_group_size, |e| (e.y, e.bottom()))
}

/// Elements whose horizontal centers line up, left to right
pub fn detect_columns(elements: &[RecognizedElement], config: &LayoutConfig) -> Vec<LayoutGroup> {
    let clusters = cluster_by(elements, |e| e.center_x(), config.alignment_threshold * 2.0);
    build_groups(elements, clusters, config.min_group_size, |e| (e.x, e.right()))
}

/// Most frequent rounded gap between consecutive groups; ties keep the first seen
fn modal_gap(groups: &[LayoutGroup]) -> Option<f32> {
    let mut counts: Vec<(f32, usize)> = Vec::new();
    for pair in groups.windows(2) {
        let gap = (pair[1].start - pair[0].end).round();
        match counts.iter_mut().find(|(value, _)| *value == gap) {
            Some((_, count)) => *count += 1,
            None => counts.push((gap, 1)),
        }
    }

    let mut best: Option<(f32, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

/// Grid estimate, present when either axis has at least two groups
pub fn infer_grid(rows: &[LayoutGroup], columns: &[LayoutGroup]) -> Option<GridInfo> {
    if rows.len() < 2 && columns.len() < 2 {
        return None;
    }

    Some(GridInfo {
        rows: rows.len().max(1),
        columns: columns.len().max(1),
        row_gap: modal_gap(rows),
        column_gap: modal_gap(columns),
    })
}

/// Rows, columns and the implied grid
pub fn detect_layout_structure(
    elements: &[RecognizedElement],
    config: &LayoutConfig,
) -> LayoutStructure {
    let rows = detect_rows(elements, config);
    let columns = detect_columns(elements, config);
    let grid = infer_grid(&rows, &columns);
    LayoutStructure {
        rows,
        columns,
        grid,
    }
}
