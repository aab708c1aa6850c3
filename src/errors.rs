// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for screenshot recognition
//!
//! Every stage returns a typed result instead of panicking:
//! - Local intake errors (undecodable image, empty segmentation)
//! - Remote provider errors (missing credentials, connectivity, HTTP, parsing)
//! - Timeouts on the remote call

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::vision::image_utils::ImageError;

/// Serializable tag for a recognition failure, carried in `AnalysisResult`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    DecodeUnavailable,
    AnalysisFailed,
    ServiceUnconfigured,
    ServiceUnavailable,
    RequestFailed,
    ResponseParseFailed,
    Timeout,
}

/// Errors that can occur while recognizing design elements
#[derive(Error, Debug)]
pub enum RecognitionError {
    /// The image could not be decoded locally (expected in sandboxed hosts)
    #[error("Local image decoding unavailable: {0}")]
    DecodeUnavailable(String),

    /// Segmentation ran but produced no usable regions
    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    /// Remote path selected without the credentials it needs
    #[error("No API key configured for {provider}")]
    ServiceUnconfigured { provider: String },

    /// Provider could not be reached
    #[error("Provider unavailable: {provider} ({message})")]
    ServiceUnavailable { provider: String, message: String },

    /// Non-2xx status or an undecodable response envelope
    #[error("Vision API error: {status} - {message}")]
    RequestFailed { status: u16, message: String },

    /// No recovery strategy found a structured payload in the reply
    #[error("Failed to parse vision response: {0}")]
    ResponseParseFailed(String),

    /// Remote call exceeded the configured timeout and was cancelled
    #[error("Vision request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

impl From<ImageError> for RecognitionError {
    fn from(err: ImageError) -> Self {
        RecognitionError::DecodeUnavailable(err.to_string())
    }
}

impl RecognitionError {
    /// Tag for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RecognitionError::DecodeUnavailable(_) => ErrorKind::DecodeUnavailable,
            RecognitionError::AnalysisFailed(_) => ErrorKind::AnalysisFailed,
            RecognitionError::ServiceUnconfigured { .. } => ErrorKind::ServiceUnconfigured,
            RecognitionError::ServiceUnavailable { .. } => ErrorKind::ServiceUnavailable,
            RecognitionError::RequestFailed { .. } => ErrorKind::RequestFailed,
            RecognitionError::ResponseParseFailed(_) => ErrorKind::ResponseParseFailed,
            RecognitionError::Timeout { .. } => ErrorKind::Timeout,
        }
    }

    /// Get error code for logging
    pub fn error_code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::DecodeUnavailable => "DECODE_UNAVAILABLE",
            ErrorKind::AnalysisFailed => "ANALYSIS_FAILED",
            ErrorKind::ServiceUnconfigured => "SERVICE_UNCONFIGURED",
            ErrorKind::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorKind::RequestFailed => "REQUEST_FAILED",
            ErrorKind::ResponseParseFailed => "RESPONSE_PARSE_FAILED",
            ErrorKind::Timeout => "TIMEOUT",
        }
    }

    /// Whether the failure came from the remote vision path
    pub fn is_remote(&self) -> bool {
        !matches!(
            self,
            RecognitionError::DecodeUnavailable(_) | RecognitionError::AnalysisFailed(_)
        )
    }
}
