// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Synthetic screenshots for recognition tests

use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

pub const RED: [u8; 4] = [220, 30, 30, 255];
pub const BLUE: [u8; 4] = [30, 60, 220, 255];

pub fn encode_png(image: &RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("PNG encoding should succeed");
    bytes
}

/// Single-color image
pub fn solid_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    encode_png(&RgbaImage::from_pixel(width, height, Rgba(rgba)))
}

/// Left half `left`, right half `right`
pub fn split_png(width: u32, height: u32, left: [u8; 4], right: [u8; 4]) -> Vec<u8> {
    let image = RgbaImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgba(left)
        } else {
            Rgba(right)
        }
    });
    encode_png(&image)
}
