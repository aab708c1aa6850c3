// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Grid-based region segmentation
//!
//! Overlays a square grid on the image, averages each cell's color, then merges
//! adjacent cells of similar color into rectangular regions. The result is a
//! coarse approximation of visually distinct blocks, not object detection.

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use super::image_utils::{decode_rgba, DecodedImage};
use super::palette::{extract_dominant_colors, PALETTE_SIZE};
use crate::errors::RecognitionError;
use crate::types::{AnalysisResult, AnalysisSource, Color, ElementType, RecognizedElement};

/// Smallest grid cell edge in pixels
const MIN_CELL_SIZE: u32 = 20;

/// Cells per shorter image edge
const CELLS_PER_EDGE: u32 = 20;

/// Largest gap (pixels) still treated as touching
const ADJACENCY_TOLERANCE: i64 = 5;

/// Thresholds for local segmentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Per-channel color tolerance (0-255 scale)
    pub color_threshold: f32,
    /// Cells with fewer pixels are discarded
    pub min_region_size: u32,
    /// Scanning stops after this many grid cells
    pub max_regions: usize,
    /// Compute a dominant-color palette alongside the regions
    pub extract_palette: bool,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            color_threshold: 30.0,
            min_region_size: 100,
            max_regions: 1000,
            extract_palette: true,
        }
    }
}

/// A rectangular block of near-uniform color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Average RGB on a 0-255 scale
    pub color: [f32; 3],
    pub pixel_count: u64,
}

impl Region {
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Summed absolute per-channel difference (0-255 scale)
    pub fn color_distance(&self, other: &Region) -> f32 {
        self.color
            .iter()
            .zip(other.color.iter())
            .map(|(a, b)| (a - b).abs())
            .sum()
    }

    /// Horizontal gap to `other`; negative when the spans overlap
    fn gap_x(&self, other: &Region) -> i64 {
        self.x.max(other.x) as i64 - self.right().min(other.right()) as i64
    }

    /// Vertical gap to `other`; negative when the spans overlap
    fn gap_y(&self, other: &Region) -> i64 {
        self.y.max(other.y) as i64 - self.bottom().min(other.bottom()) as i64
    }

    /// Touching (within tolerance) on one axis while overlapping on the other
    pub fn is_adjacent(&self, other: &Region) -> bool {
        let gap_x = self.gap_x(other);
        let gap_y = self.gap_y(other);
        (gap_x <= ADJACENCY_TOLERANCE && gap_y < 0) || (gap_y <= ADJACENCY_TOLERANCE && gap_x < 0)
    }

    /// Bounding-box union with a pixel-count-weighted color
    pub fn merge(&self, other: &Region) -> Region {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());

        let pixel_count = self.pixel_count + other.pixel_count;
        let (w1, w2) = if pixel_count == 0 {
            (0.5, 0.5)
        } else {
            (
                self.pixel_count as f32 / pixel_count as f32,
                other.pixel_count as f32 / pixel_count as f32,
            )
        };

        Region {
            x,
            y,
            width: right - x,
            height: bottom - y,
            color: [
                self.color[0] * w1 + other.color[0] * w2,
                self.color[1] * w1 + other.color[1] * w2,
                self.color[2] * w1 + other.color[2] * w2,
            ],
            pixel_count,
        }
    }

    pub fn to_element(&self) -> RecognizedElement {
        RecognizedElement::new(
            ElementType::Rectangle,
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
        )
        .with_color(Color::new(
            self.color[0] / 255.0,
            self.color[1] / 255.0,
            self.color[2] / 255.0,
        ))
    }
}

/// Local heuristic recognizer
#[derive(Debug, Clone, Default)]
pub struct RegionSegmenter {
    config: SegmentationConfig,
}

impl RegionSegmenter {
    pub fn new(config: SegmentationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    /// Grid cell edge for an image of the given size
    pub fn cell_size(width: u32, height: u32) -> u32 {
        (width.min(height) / CELLS_PER_EDGE).max(MIN_CELL_SIZE)
    }

    /// Decode `bytes` and segment them
    pub fn analyze(&self, bytes: &[u8]) -> Result<AnalysisResult, RecognitionError> {
        let image = decode_rgba(bytes)?;
        self.analyze_pixels(&image)
    }

    /// Segment an already-decoded RGBA buffer
    pub fn analyze_pixels(&self, image: &DecodedImage) -> Result<AnalysisResult, RecognitionError> {
        let expected = image.width as usize * image.height as usize * 4;
        if image.pixels.len() < expected {
            return Err(RecognitionError::DecodeUnavailable(format!(
                "pixel buffer holds {} bytes, expected {} for {}x{} RGBA",
                image.pixels.len(),
                expected,
                image.width,
                image.height
            )));
        }

        let start = Instant::now();
        let regions = self.segment(image);
        if regions.is_empty() {
            return Err(RecognitionError::AnalysisFailed(format!(
                "no regions of at least {} pixels found in {}x{} image",
                self.config.min_region_size, image.width, image.height
            )));
        }

        let elements = regions.iter().map(Region::to_element).collect();
        let mut result = AnalysisResult::new(image.width, image.height, elements, AnalysisSource::Local);

        if self.config.extract_palette {
            result.dominant_colors = Some(extract_dominant_colors(image, PALETTE_SIZE));
        }

        info!(
            "Local segmentation complete: {} regions from {}x{} image in {}ms",
            regions.len(),
            image.width,
            image.height,
            start.elapsed().as_millis()
        );

        Ok(result)
    }

    /// Scan the grid and merge similar neighbours
    pub fn segment(&self, image: &DecodedImage) -> Vec<Region> {
        let cells = self.scan_cells(image);
        let scanned = cells.len();
        let merged = self.merge_regions(cells);
        debug!("Merged {} grid cells into {} regions", scanned, merged.len());
        merged
    }

    /// Average color per grid cell, row-major
    pub fn scan_cells(&self, image: &DecodedImage) -> Vec<Region> {
        let cell = Self::cell_size(image.width, image.height);
        let row_stride = image.width as usize * 4;
        let mut regions = Vec::new();
        let mut scanned = 0usize;

        'scan: for cell_y in (0..image.height).step_by(cell as usize) {
            for cell_x in (0..image.width).step_by(cell as usize) {
                if scanned >= self.config.max_regions {
                    debug!("Stopping scan after {} cells", scanned);
                    break 'scan;
                }
                scanned += 1;

                let width = cell.min(image.width - cell_x);
                let height = cell.min(image.height - cell_y);
                let pixel_count = width as u64 * height as u64;
                if pixel_count < self.config.min_region_size as u64 {
                    continue;
                }

                let mut sum = [0u64; 3];
                for y in cell_y..cell_y + height {
                    let row = y as usize * row_stride;
                    for x in cell_x..cell_x + width {
                        let idx = row + x as usize * 4;
                        sum[0] += image.pixels[idx] as u64;
                        sum[1] += image.pixels[idx + 1] as u64;
                        sum[2] += image.pixels[idx + 2] as u64;
                    }
                }

                regions.push(Region {
                    x: cell_x,
                    y: cell_y,
                    width,
                    height,
                    color: [
                        sum[0] as f32 / pixel_count as f32,
                        sum[1] as f32 / pixel_count as f32,
                        sum[2] as f32 / pixel_count as f32,
                    ],
                    pixel_count,
                });
            }
        }

        regions
    }

    /// Single left-to-right merge pass
    ///
    /// Each unused region absorbs every later unused region that is similar to
    /// and adjacent to the growing accumulator. Not repeated to a fixpoint, so
    /// long chains may stay split.
    pub fn merge_regions(&self, regions: Vec<Region>) -> Vec<Region> {
        let max_distance = self.config.color_threshold * 3.0;
        let mut used = vec![false; regions.len()];
        let mut merged = Vec::new();

        for i in 0..regions.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            let mut current = regions[i];

            for j in (i + 1)..regions.len() {
                if used[j] {
                    continue;
                }
                let candidate = &regions[j];
                if current.color_distance(candidate) <= max_distance && current.is_adjacent(candidate) {
                    current = current.merge(candidate);
                    used[j] = true;
                }
            }

            merged.push(current);
        }

        merged
    }
}
