// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Layout reconstruction from element geometry
//!
//! Works on recognized elements from either the local segmenter or a remote
//! vision provider:
//! - Row/column clustering and grid inference
//! - Edge and center alignment groups, spacing between neighbours
//! - Per-axis responsive constraints (min/center/max/stretch/scale)

pub mod alignment;
pub mod analyzer;
pub mod constraints;
pub mod grouping;

use serde::{Deserialize, Serialize};

pub use alignment::{detect_alignments, detect_spacing, AlignmentGroup, AlignmentKind, Axis, SpacingInfo};
pub use analyzer::{LayoutAnalysis, LayoutAnalyzer};
pub use constraints::{generate_all_constraints, infer_axis_constraint, infer_constraints};
pub use grouping::{detect_layout_structure, GridInfo, LayoutGroup, LayoutStructure};

/// Thresholds for layout analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Coordinates within this distance count as aligned; rows and columns use twice this
    pub alignment_threshold: f32,
    /// Smaller groups are discarded
    pub min_group_size: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            alignment_threshold: 5.0,
            min_group_size: 2,
        }
    }
}
