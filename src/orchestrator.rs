// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Recognition orchestration
//!
//! Chooses between the remote vision provider and local segmentation, falls
//! back to local when the remote path fails, then runs the layout pass.

use futures::future::join_all;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{RecognitionConfig, ServicePreference};
use crate::errors::RecognitionError;
use crate::layout::LayoutAnalyzer;
use crate::remote::{VisionClient, VisionProvider};
use crate::types::{AnalysisResult, ContainerHints};
use crate::vision::image_utils::{encode_data_url, format_to_mime};
use crate::vision::segmenter::RegionSegmenter;

/// Turns screenshots into design elements
///
/// Holds only immutable configuration, so one instance can be shared across
/// tasks behind an `Arc`.
pub struct RecognitionService {
    config: RecognitionConfig,
    provider: Option<Box<dyn VisionProvider>>,
    segmenter: RegionSegmenter,
    layout: LayoutAnalyzer,
}

impl RecognitionService {
    /// Create a service, building the remote client from the configuration
    ///
    /// The remote path is present only when a provider or endpoint is set.
    pub fn new(config: RecognitionConfig) -> Result<Self, RecognitionError> {
        let provider = match config.provider_config() {
            Some(provider_config) => {
                let client = VisionClient::new(provider_config)?;
                debug!("Remote vision provider enabled: {}", client.name());
                Some(Box::new(client) as Box<dyn VisionProvider>)
            }
            None => {
                debug!("No remote vision provider configured, local segmentation only");
                None
            }
        };

        Ok(Self::with_provider(config, provider))
    }

    /// Create a service with an explicit provider
    pub fn with_provider(config: RecognitionConfig, provider: Option<Box<dyn VisionProvider>>) -> Self {
        let segmenter = RegionSegmenter::new(config.segmentation.clone());
        let layout = LayoutAnalyzer::new(config.layout.clone());

        Self {
            config,
            provider,
            segmenter,
            layout,
        }
    }

    pub fn config(&self) -> &RecognitionConfig {
        &self.config
    }

    /// Whether a remote provider is attached (configured or not)
    pub fn has_remote_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Analyze a screenshot, encoding any failure in the result
    pub async fn analyze(&self, bytes: &[u8], hints: Option<ContainerHints>) -> AnalysisResult {
        match self.try_analyze(bytes, hints).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Recognition failed [{}]: {}", e.error_code(), e);
                AnalysisResult::failed(&e)
            }
        }
    }

    /// Analyze a screenshot
    ///
    /// # Arguments
    /// * `bytes` - Encoded image data (PNG, JPEG, WebP, GIF, BMP or TIFF)
    /// * `hints` - Container size for constraint inference; defaults to the image size
    pub async fn try_analyze(
        &self,
        bytes: &[u8],
        hints: Option<ContainerHints>,
    ) -> Result<AnalysisResult, RecognitionError> {
        let start = Instant::now();

        let mut result = match (self.config.preferred_service, &self.provider) {
            (ServicePreference::Remote, Some(provider)) => {
                match self.analyze_remote(&**provider, bytes).await {
                    Ok(result) => result,
                    Err(e) if self.config.enable_local_fallback => {
                        warn!(
                            "Remote provider {} failed [{}]: {}, falling back to local segmentation",
                            provider.name(),
                            e.error_code(),
                            e
                        );
                        self.analyze_local(bytes).await?
                    }
                    Err(e) => return Err(e),
                }
            }
            _ => self.analyze_local(bytes).await?,
        };

        if self.config.enable_layout_analysis && !result.elements.is_empty() {
            self.apply_layout(&mut result, hints);
        }

        info!(
            "Recognition complete: {} elements ({:?}) in {}ms",
            result.elements.len(),
            result.source,
            start.elapsed().as_millis()
        );
        Ok(result)
    }

    async fn analyze_remote(
        &self,
        provider: &dyn VisionProvider,
        bytes: &[u8],
    ) -> Result<AnalysisResult, RecognitionError> {
        if !provider.is_configured() {
            return Err(RecognitionError::ServiceUnconfigured {
                provider: provider.name().to_string(),
            });
        }

        let image = encode_data_url(bytes)?;
        debug!("Sending {} image to {}", format_to_mime(image.format), provider.name());
        provider.analyze(&image).await
    }

    /// Segmentation is CPU-bound and has no await points, so it runs on the
    /// blocking pool instead of the caller's executor thread
    async fn analyze_local(&self, bytes: &[u8]) -> Result<AnalysisResult, RecognitionError> {
        let segmenter = self.segmenter.clone();
        let bytes = bytes.to_vec();
        tokio::task::spawn_blocking(move || segmenter.analyze(&bytes))
            .await
            .map_err(|e| RecognitionError::AnalysisFailed(format!("Segmentation task failed: {}", e)))?
    }

    fn apply_layout(&self, result: &mut AnalysisResult, hints: Option<ContainerHints>) {
        let hints = hints.unwrap_or_default();
        let container_width = hints.width.unwrap_or(result.width as f32);
        let container_height = hints.height.unwrap_or(result.height as f32);

        let analysis = self
            .layout
            .analyze(&result.elements, container_width, container_height);
        result.elements = analysis.elements;
        result.layout = Some(analysis.structure);
        result.alignments = analysis.alignments;
        result.spacing = analysis.spacing;
    }

    /// Analyze several screenshots concurrently; results keep input order
    ///
    /// Remote calls overlap on the network and local segmentation runs on
    /// tokio's blocking pool.
    pub async fn analyze_batch(&self, images: &[&[u8]], hints: Option<ContainerHints>) -> Vec<AnalysisResult> {
        join_all(images.iter().map(|bytes| self.analyze(bytes, hints))).await
    }

    /// Probe the remote provider
    pub async fn check_remote_availability(&self) -> Result<(), RecognitionError> {
        match &self.provider {
            Some(provider) if !provider.is_configured() => Err(RecognitionError::ServiceUnconfigured {
                provider: provider.name().to_string(),
            }),
            Some(provider) => provider.health_check().await,
            None => Err(RecognitionError::ServiceUnconfigured {
                provider: "none".to_string(),
            }),
        }
    }
}
