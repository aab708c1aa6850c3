// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for screenshot recognition

pub mod provider;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::layout::LayoutConfig;
use crate::vision::SegmentationConfig;

pub use provider::{ProviderConfig, ProviderKind};

/// Which path the orchestrator tries first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServicePreference {
    Local,
    Remote,
}

impl fmt::Display for ServicePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServicePreference::Local => f.write_str("local"),
            ServicePreference::Remote => f.write_str("remote"),
        }
    }
}

impl FromStr for ServicePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(ServicePreference::Local),
            "remote" | "ai" => Ok(ServicePreference::Remote),
            other => Err(format!("unknown service preference '{}'", other)),
        }
    }
}

/// Static configuration for a `RecognitionService`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Remote provider preset
    pub provider: Option<ProviderKind>,
    /// Chat-completions URL, overrides the preset
    pub endpoint: Option<String>,
    /// Bearer token for the remote provider
    pub api_key: Option<String>,
    /// Model name, overrides the preset
    pub model: Option<String>,
    pub preferred_service: ServicePreference,
    /// Run local segmentation when the remote path fails
    pub enable_local_fallback: bool,
    /// Run the layout analyzer on successful results
    pub enable_layout_analysis: bool,
    /// Remote request timeout in milliseconds
    pub request_timeout_ms: u64,
    pub segmentation: SegmentationConfig,
    pub layout: LayoutConfig,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            provider: None,
            endpoint: None,
            api_key: None,
            model: None,
            preferred_service: ServicePreference::Remote,
            enable_local_fallback: true,
            enable_layout_analysis: true,
            request_timeout_ms: 30000,
            segmentation: SegmentationConfig::default(),
            layout: LayoutConfig::default(),
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| !matches!(v.trim().to_lowercase().as_str(), "false" | "0" | "no"))
        .unwrap_or(default)
}

impl RecognitionConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            provider: env_parse("DESIGN_VISION_PROVIDER"),
            endpoint: env::var("DESIGN_VISION_ENDPOINT").ok(),
            api_key: env::var("DESIGN_VISION_API_KEY").ok(),
            model: env::var("DESIGN_VISION_MODEL").ok(),
            preferred_service: env_parse("DESIGN_PREFERRED_SERVICE")
                .unwrap_or(defaults.preferred_service),
            enable_local_fallback: env_flag("DESIGN_LOCAL_FALLBACK", defaults.enable_local_fallback),
            enable_layout_analysis: env_flag(
                "DESIGN_LAYOUT_ANALYSIS",
                defaults.enable_layout_analysis,
            ),
            request_timeout_ms: env_parse("DESIGN_REQUEST_TIMEOUT_MS")
                .unwrap_or(defaults.request_timeout_ms),
            segmentation: SegmentationConfig {
                color_threshold: env_parse("DESIGN_COLOR_THRESHOLD")
                    .unwrap_or(defaults.segmentation.color_threshold),
                min_region_size: env_parse("DESIGN_MIN_REGION_SIZE")
                    .unwrap_or(defaults.segmentation.min_region_size),
                max_regions: env_parse("DESIGN_MAX_REGIONS")
                    .unwrap_or(defaults.segmentation.max_regions),
                ..defaults.segmentation
            },
            layout: defaults.layout,
        }
    }

    /// Load configuration from a TOML file; missing keys take defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: RecognitionConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let threshold = self.segmentation.color_threshold;
        if !threshold.is_finite() || !(0.0..=255.0).contains(&threshold) {
            return Err("Color threshold must be between 0 and 255".to_string());
        }
        if self.segmentation.max_regions == 0 {
            return Err("Max regions must be greater than 0".to_string());
        }
        if self.request_timeout_ms == 0 {
            return Err("Request timeout must be greater than 0".to_string());
        }
        if !self.layout.alignment_threshold.is_finite() || self.layout.alignment_threshold < 0.0 {
            return Err("Alignment threshold must be a non-negative number".to_string());
        }
        if self.layout.min_group_size == 0 {
            return Err("Minimum group size must be greater than 0".to_string());
        }
        if let Some(ref endpoint) = self.endpoint {
            let parsed =
                url::Url::parse(endpoint).map_err(|e| format!("Invalid endpoint '{}': {}", endpoint, e))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(format!("Endpoint must use http or https: {}", endpoint));
            }
        }
        Ok(())
    }

    /// Resolved remote provider settings, if any remote provider is set up
    ///
    /// A provider or endpoint makes the remote path present even when the API
    /// key is missing; the orchestrator reports that as unconfigured.
    pub fn provider_config(&self) -> Option<ProviderConfig> {
        if self.provider.is_none() && self.endpoint.is_none() {
            return None;
        }
        let kind = self.provider.unwrap_or(ProviderKind::Custom);

        Some(ProviderConfig {
            kind,
            endpoint: self
                .endpoint
                .clone()
                .or_else(|| kind.default_endpoint().map(str::to_string))
                .unwrap_or_default(),
            api_key: self.api_key.clone().unwrap_or_default(),
            model: self
                .model
                .clone()
                .or_else(|| kind.default_model().map(str::to_string))
                .unwrap_or_default(),
            timeout_ms: self.request_timeout_ms,
        })
    }
}
