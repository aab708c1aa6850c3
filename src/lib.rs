// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod config;
pub mod errors;
pub mod layout;
pub mod orchestrator;
pub mod remote;
pub mod types;
pub mod vision;

// Re-export main types
pub use config::{ProviderConfig, ProviderKind, RecognitionConfig, ServicePreference};
pub use errors::{ErrorKind, RecognitionError};
pub use layout::{LayoutAnalysis, LayoutAnalyzer, LayoutConfig, LayoutStructure};
pub use orchestrator::RecognitionService;
pub use remote::{VisionClient, VisionProvider};
pub use types::{
    AnalysisResult, AnalysisSource, AxisConstraints, Color, Constraint, ContainerHints,
    ElementLayout, ElementType, RecognizedElement,
};
pub use vision::{RegionSegmenter, SegmentationConfig};
