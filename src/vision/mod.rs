// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Local image analysis
//!
//! This module provides:
//! - Image intake (format sniffing, RGBA decoding, data URLs)
//! - Grid-based region segmentation
//! - Dominant-color palette extraction
//!
//! Everything here is synchronous CPU work with no I/O.

pub mod image_utils;
pub mod palette;
pub mod segmenter;

pub use image_utils::{decode_rgba, detect_format, encode_data_url, DecodedImage, EncodedImage, ImageError};
pub use palette::extract_dominant_colors;
pub use segmenter::{Region, RegionSegmenter, SegmentationConfig};
