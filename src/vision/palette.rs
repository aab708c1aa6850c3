// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Dominant-color extraction by bucket quantization

use std::collections::HashMap;

use super::image_utils::DecodedImage;
use crate::types::Color;

/// Number of colors reported in a palette
pub const PALETTE_SIZE: usize = 5;

/// Channel values are floored to multiples of this step
const QUANTIZATION_STEP: u8 = 32;

/// Pixels below this alpha do not contribute
const MIN_ALPHA: u8 = 128;

/// Sample every n-th pixel, growing with image size
pub fn sample_stride(total_pixels: usize) -> usize {
    (total_pixels / 100_000).max(4)
}

fn quantize(value: u8) -> u8 {
    value / QUANTIZATION_STEP * QUANTIZATION_STEP
}

/// Most frequent quantized colors, ties broken by first appearance
pub fn extract_dominant_colors(image: &DecodedImage, max_colors: usize) -> Vec<Color> {
    let total_pixels = image.width as usize * image.height as usize;
    let stride = sample_stride(total_pixels);

    // bucket -> (count, first seen)
    let mut buckets: HashMap<[u8; 3], (usize, usize)> = HashMap::new();
    for (order, pixel) in (0..total_pixels)
        .step_by(stride)
        .filter_map(|i| image.pixels.get(i * 4..i * 4 + 4))
        .enumerate()
    {
        if pixel[3] < MIN_ALPHA {
            continue;
        }
        let key = [quantize(pixel[0]), quantize(pixel[1]), quantize(pixel[2])];
        buckets.entry(key).or_insert((0, order)).0 += 1;
    }

    let mut ranked: Vec<([u8; 3], (usize, usize))> = buckets.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));

    ranked
        .into_iter()
        .take(max_colors)
        .map(|(rgb, _)| Color::from_rgb8(rgb[0], rgb[1], rgb[2]))
        .collect()
}
