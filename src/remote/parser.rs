// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Recovery of structured analyses from free-form model replies
//!
//! Strategies run in order and the first payload with an `elements` array wins:
//! 1. `direct` - the whole reply is JSON
//! 2. `fenced` - JSON inside a ``` code block
//! 3. `embedded` - the first balanced object around an `"elements": [` key

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::errors::RecognitionError;
use crate::types::{AnalysisResult, AnalysisSource, Color, ElementType, RecognizedElement};

type ParseStrategy = fn(&str) -> Option<Value>;

const STRATEGIES: [(&str, ParseStrategy); 3] = [
    ("direct", parse_direct),
    ("fenced", parse_fenced),
    ("embedded", parse_embedded),
];

fn fence_pattern() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"(?s)```[A-Za-z]*[ \t]*\r?\n?(.*?)```").expect("fence pattern is valid"))
}

fn elements_key_pattern() -> &'static Regex {
    static ELEMENTS: OnceLock<Regex> = OnceLock::new();
    ELEMENTS.get_or_init(|| Regex::new(r#""elements"\s*:\s*\["#).expect("elements pattern is valid"))
}

fn has_elements(value: &Value) -> bool {
    value.get("elements").map_or(false, Value::is_array)
}

fn parse_candidate(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text.trim())
        .ok()
        .filter(has_elements)
}

/// The whole reply is the payload
pub fn parse_direct(reply: &str) -> Option<Value> {
    parse_candidate(reply)
}

/// The payload sits in a fenced code block
pub fn parse_fenced(reply: &str) -> Option<Value> {
    fence_pattern()
        .captures_iter(reply)
        .filter_map(|caps| caps.get(1))
        .find_map(|inner| parse_candidate(inner.as_str()))
}

/// End (exclusive) of the object opening at `start`, skipping braces in strings
fn balanced_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in text.as_bytes()[start..].iter().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// The payload is embedded in surrounding prose
pub fn parse_embedded(reply: &str) -> Option<Value> {
    elements_key_pattern().find_iter(reply).find_map(|key| {
        // Try enclosing objects nearest-first
        reply[..key.start()]
            .rmatch_indices('{')
            .filter_map(|(open, _)| {
                let close = balanced_end(reply, open)?;
                (close > key.end()).then(|| &reply[open..close])
            })
            .find_map(parse_candidate)
    })
}

/// Map a free-form element type onto the supported primitives
pub fn normalize_element_type(raw: &str) -> ElementType {
    match raw.trim().to_lowercase().as_str() {
        "rectangle" | "rect" | "box" | "button" | "card" | "container" | "input" | "textfield"
        | "shape" | "background" | "div" => ElementType::Rectangle,
        "circle" | "ellipse" | "oval" | "dot" | "avatar" => ElementType::Circle,
        "text" | "label" | "heading" | "title" | "paragraph" | "caption" | "link" | "span" => {
            ElementType::Text
        }
        "image" | "img" | "picture" | "photo" | "icon" | "logo" => ElementType::Image,
        "frame" | "group" | "section" | "panel" | "header" | "footer" | "navbar" | "view" => {
            ElementType::Frame
        }
        "line" | "divider" | "separator" | "hr" | "rule" => ElementType::Line,
        other => {
            warn!("Unknown element type '{}', using rectangle", other);
            ElementType::Rectangle
        }
    }
}

/// Numbers may arrive as JSON numbers or strings such as "120" or "120px"
fn number(value: Option<&Value>) -> Option<f32> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64().map(|v| v as f32),
        Value::String(s) => s.trim().trim_end_matches("px").trim().parse::<f32>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn convert_element(value: &Value) -> Option<RecognizedElement> {
    let object = value.as_object()?;
    let element_type = object
        .get("type")
        .and_then(Value::as_str)
        .map(normalize_element_type)
        .unwrap_or(ElementType::Rectangle);

    let mut element = RecognizedElement::new(
        element_type,
        number(object.get("x")).unwrap_or(0.0),
        number(object.get("y")).unwrap_or(0.0),
        number(object.get("width")).unwrap_or(0.0),
        number(object.get("height")).unwrap_or(0.0),
    );

    if let Some(color) = object.get("color").and_then(Value::as_str) {
        element.color = Some(Color::from_hex_or_gray(color));
    }
    match object.get("text") {
        Some(Value::String(text)) => element.text = Some(text.clone()),
        Some(Value::Number(n)) => element.text = Some(n.to_string()),
        _ => {}
    }
    element.font_size = number(object.get("fontSize").or_else(|| object.get("font_size")));
    if let Some(children) = object.get("children").and_then(Value::as_array) {
        element.children = children.iter().filter_map(convert_element).collect();
    }

    Some(element)
}

/// A structured reply recovered from the model
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReply {
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub elements: Vec<RecognizedElement>,
}

impl ParsedReply {
    fn from_value(value: &Value) -> Self {
        let elements: Vec<RecognizedElement> = value
            .get("elements")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        let element = convert_element(item);
                        if element.is_none() {
                            warn!("Skipping non-object entry in elements: {}", item);
                        }
                        element
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            width: number(value.get("width")),
            height: number(value.get("height")),
            elements,
        }
    }

    /// Reported dimensions, falling back to the element extents
    pub fn into_result(self) -> AnalysisResult {
        let extent_x = self.elements.iter().map(|e| e.right()).fold(0.0_f32, f32::max);
        let extent_y = self.elements.iter().map(|e| e.bottom()).fold(0.0_f32, f32::max);
        let width = self.width.unwrap_or(extent_x).max(0.0).round() as u32;
        let height = self.height.unwrap_or(extent_y).max(0.0).round() as u32;
        AnalysisResult::new(width, height, self.elements, AnalysisSource::Remote)
    }
}

/// Run the strategy chain over a model reply
pub fn parse_reply(reply: &str) -> Result<ParsedReply, RecognitionError> {
    for (name, strategy) in STRATEGIES {
        if let Some(value) = strategy(reply) {
            debug!("Vision reply parsed with {} strategy", name);
            return Ok(ParsedReply::from_value(&value));
        }
    }

    let preview: String = reply.chars().take(120).collect();
    Err(RecognitionError::ResponseParseFailed(format!(
        "no JSON object with an elements array found in reply: {:?}",
        preview
    )))
}
