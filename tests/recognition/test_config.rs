// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Configuration loading and service construction

use fabstir_design_recognizer::{ProviderKind, RecognitionConfig, RecognitionService, ServicePreference};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_load_toml_config() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
provider = "groq"
api_key = "gsk-test"
preferred_service = "remote"
enable_local_fallback = false
request_timeout_ms = 15000

[segmentation]
color_threshold = 20.0
max_regions = 400

[layout]
alignment_threshold = 8.0
"#
    )
    .unwrap();

    let config = RecognitionConfig::from_file(file.path()).unwrap();
    assert_eq!(config.provider, Some(ProviderKind::Groq));
    assert_eq!(config.preferred_service, ServicePreference::Remote);
    assert!(!config.enable_local_fallback);
    assert!(config.enable_layout_analysis);
    assert_eq!(config.request_timeout_ms, 15000);
    assert_eq!(config.segmentation.color_threshold, 20.0);
    assert_eq!(config.segmentation.max_regions, 400);
    assert_eq!(config.segmentation.min_region_size, 100);
    assert_eq!(config.layout.alignment_threshold, 8.0);
    assert_eq!(config.layout.min_group_size, 2);
    assert!(config.validate().is_ok());

    let provider = config.provider_config().unwrap();
    assert_eq!(provider.endpoint, "https://api.groq.com/openai/v1/chat/completions");
    assert_eq!(provider.timeout_ms, 15000);
    assert!(provider.is_configured());
}

#[test]
fn test_missing_config_file() {
    let err = RecognitionConfig::from_file("/nonexistent/design-recognizer.toml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_invalid_config_values() {
    let config = RecognitionConfig {
        endpoint: Some("ftp://example.com/v1/chat/completions".to_string()),
        ..RecognitionConfig::default()
    };
    assert!(config.validate().is_err());

    let mut config = RecognitionConfig::default();
    config.segmentation.max_regions = 0;
    assert!(config.validate().is_err());
}

#[tokio::test]
async fn test_service_from_loaded_config() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "preferred_service = \"local\"").unwrap();

    let config = RecognitionConfig::from_file(file.path()).unwrap();
    let service = RecognitionService::new(config).unwrap();
    assert!(!service.has_remote_provider());
    assert_eq!(service.config().preferred_service, ServicePreference::Local);
}
