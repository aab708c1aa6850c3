// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision provider trait definition

use async_trait::async_trait;

use crate::errors::RecognitionError;
use crate::types::AnalysisResult;
use crate::vision::image_utils::EncodedImage;

/// Trait for remote services that turn a screenshot into design elements
///
/// The orchestrator holds at most one provider and falls back to local
/// segmentation when it fails.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Analyze one encoded image
    ///
    /// # Returns
    /// A successful `AnalysisResult` with `source: Remote`, or a typed error
    async fn analyze(&self, image: &EncodedImage) -> Result<AnalysisResult, RecognitionError>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Whether a request can be attempted (credentials, endpoint, model)
    fn is_configured(&self) -> bool;

    /// Check that the provider is reachable
    async fn health_check(&self) -> Result<(), RecognitionError>;
}
