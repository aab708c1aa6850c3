// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Instruction sent alongside the screenshot

/// Describes the exact reply schema the parser expects
pub const ANALYSIS_PROMPT: &str = r##"You are a UI design analyzer. Analyze this screenshot and describe every visible design element.

Respond with ONLY a JSON object in exactly this format, with no other text:
{
  "width": <image width in pixels>,
  "height": <image height in pixels>,
  "elements": [
    {
      "type": "rectangle" | "circle" | "text" | "image" | "frame" | "line",
      "x": <left edge in pixels>,
      "y": <top edge in pixels>,
      "width": <width in pixels>,
      "height": <height in pixels>,
      "color": "#RRGGBB",
      "text": "<text content, only for text elements>",
      "fontSize": <font size in pixels, only for text elements>
    }
  ]
}

Coordinates are measured from the top-left corner of the image. List background shapes before the elements drawn on top of them."##;

/// Upper bound on reply length
pub const MAX_REPLY_TOKENS: u32 = 4096;

/// Low temperature keeps the reply close to the schema
pub const TEMPERATURE: f32 = 0.1;
