// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Layout analysis pass over recognized elements

use tracing::debug;

use super::alignment::{detect_alignments, detect_spacing, AlignmentGroup, SpacingInfo};
use super::constraints::generate_all_constraints;
use super::grouping::{detect_layout_structure, LayoutStructure};
use super::LayoutConfig;
use crate::types::{ElementLayout, RecognizedElement};

/// Everything the layout pass derives from one element list
#[derive(Debug, Clone)]
pub struct LayoutAnalysis {
    pub structure: LayoutStructure,
    /// Copies of the input with constraints and row/column membership
    pub elements: Vec<RecognizedElement>,
    pub alignments: Vec<AlignmentGroup>,
    pub spacing: Vec<SpacingInfo>,
}

/// Infers rows, columns, grid, alignment and responsive constraints
#[derive(Debug, Clone, Default)]
pub struct LayoutAnalyzer {
    config: LayoutConfig,
}

impl LayoutAnalyzer {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn detect_structure(&self, elements: &[RecognizedElement]) -> LayoutStructure {
        detect_layout_structure(elements, &self.config)
    }

    pub fn detect_alignments(&self, elements: &[RecognizedElement]) -> Vec<AlignmentGroup> {
        detect_alignments(elements, &self.config)
    }

    /// Run the full pass; `elements` is left untouched
    pub fn analyze(
        &self,
        elements: &[RecognizedElement],
        container_width: f32,
        container_height: f32,
    ) -> LayoutAnalysis {
        let structure = self.detect_structure(elements);
        let mut constrained = generate_all_constraints(elements, container_width, container_height);

        for (row_index, row) in structure.rows.iter().enumerate() {
            for &member in &row.members {
                constrained[member]
                    .layout
                    .get_or_insert_with(ElementLayout::default)
                    .row = Some(row_index);
            }
        }
        for (column_index, column) in structure.columns.iter().enumerate() {
            for &member in &column.members {
                constrained[member]
                    .layout
                    .get_or_insert_with(ElementLayout::default)
                    .column = Some(column_index);
            }
        }

        let alignments = self.detect_alignments(elements);
        let spacing = detect_spacing(elements, &structure, &self.config);

        debug!(
            "Layout analysis: {} rows, {} columns, grid={}, {} alignment groups",
            structure.rows.len(),
            structure.columns.len(),
            structure.grid.is_some(),
            alignments.len()
        );

        LayoutAnalysis {
            structure,
            elements: constrained,
            alignments,
            spacing,
        }
    }
}
