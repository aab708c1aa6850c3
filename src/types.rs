// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types for screenshot recognition

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorKind, RecognitionError};
use crate::layout::{AlignmentGroup, LayoutStructure, SpacingInfo};

/// An RGB color with normalized [0, 1] channels and optional alpha
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<f32>,
}

impl Color {
    /// Fallback for colors that fail to parse
    pub const GRAY: Color = Color {
        r: 0.5,
        g: 0.5,
        b: 0.5,
        a: None,
    };

    /// Create a color, clamping each channel into [0, 1]
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
            a: None,
        }
    }

    /// Create a color from 8-bit channels
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Parse `#RGB`, `RGB`, `#RRGGBB` or `RRGGBB`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        // from_str_radix alone would accept a sign such as "+F"
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let expanded = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect::<String>(),
            6 => digits.to_string(),
            _ => return None,
        };

        let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
        Some(Self::from_rgb8(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Parse a hex color, degrading to gray when malformed
    pub fn from_hex_or_gray(hex: &str) -> Self {
        Self::from_hex(hex).unwrap_or(Self::GRAY)
    }

    /// Channels scaled back to 0-255
    pub fn to_rgb8(&self) -> [u8; 3] {
        [
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
        ]
    }

    /// Render as `#RRGGBB`
    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    }
}

/// Kind of design primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Rectangle,
    Circle,
    Text,
    Image,
    Frame,
    Line,
}

/// How an element reacts when its container is resized along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Constraint {
    Min,
    Center,
    Max,
    Stretch,
    Scale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisConstraints {
    pub horizontal: Constraint,
    pub vertical: Constraint,
}

/// Layout metadata attached by the layout analyzer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementLayout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<AxisConstraints>,
    /// Index into `LayoutStructure::rows`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    /// Index into `LayoutStructure::columns`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

/// A typed, positioned design primitive
///
/// Coordinates are relative to the analyzed image's top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizedElement {
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RecognizedElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<ElementLayout>,
}

impl RecognizedElement {
    /// Create an element; negative sizes are clamped to zero
    pub fn new(element_type: ElementType, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            element_type,
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
            color: None,
            text: None,
            font_size: None,
            children: Vec::new(),
            layout: None,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = Some(font_size);
        self
    }

    pub fn with_children(mut self, children: Vec<RecognizedElement>) -> Self {
        self.children = children;
        self
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

/// Which path produced an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    Local,
    Remote,
}

/// Optional container dimensions for the layout pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerHints {
    pub width: Option<f32>,
    pub height: Option<f32>,
}

/// Outcome of one analysis, handed to the host unchanged
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub width: u32,
    pub height: u32,
    /// Detection order, not z-order
    pub elements: Vec<RecognizedElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dominant_colors: Option<Vec<Color>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutStructure>,
    /// Edge and center alignment groups from the layout pass
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alignments: Vec<AlignmentGroup>,
    /// Gaps along each detected row and column
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub spacing: Vec<SpacingInfo>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<AnalysisSource>,
}

impl AnalysisResult {
    /// Create a successful result
    pub fn new(
        width: u32,
        height: u32,
        elements: Vec<RecognizedElement>,
        source: AnalysisSource,
    ) -> Self {
        Self {
            width,
            height,
            elements,
            dominant_colors: None,
            layout: None,
            alignments: Vec::new(),
            spacing: Vec::new(),
            success: true,
            error: None,
            error_kind: None,
            source: Some(source),
        }
    }

    /// Create a failed result carrying the error kind and message
    pub fn failed(err: &RecognitionError) -> Self {
        Self {
            width: 0,
            height: 0,
            elements: Vec::new(),
            dominant_colors: None,
            layout: None,
            alignments: Vec::new(),
            spacing: Vec::new(),
            success: false,
            error: Some(err.to_string()),
            error_kind: Some(err.kind()),
            source: None,
        }
    }
}
