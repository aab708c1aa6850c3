// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// End-to-end recognition: provider selection, fallback and layout

use fabstir_design_recognizer::layout::{AlignmentKind, Axis};
use fabstir_design_recognizer::{
    AnalysisSource, Constraint, ContainerHints, ErrorKind, ProviderKind, RecognitionConfig,
    RecognitionService, ServicePreference,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::fixtures::{solid_png, split_png, BLUE, RED};
use super::mock_server::{self, corner_boxes_reply, MockReply, API_KEY};

fn remote_config(endpoint: &str) -> RecognitionConfig {
    RecognitionConfig {
        provider: Some(ProviderKind::Custom),
        endpoint: Some(endpoint.to_string()),
        api_key: Some(API_KEY.to_string()),
        model: Some("mock-vision".to_string()),
        request_timeout_ms: 5000,
        ..RecognitionConfig::default()
    }
}

#[tokio::test]
async fn test_remote_analysis_with_layout() {
    let server = mock_server::spawn(MockReply::Content(corner_boxes_reply())).await;
    let service = RecognitionService::new(remote_config(&server.endpoint)).unwrap();

    let result = service.analyze(&solid_png(40, 30, RED), None).await;
    assert!(result.success);
    assert_eq!(result.source, Some(AnalysisSource::Remote));

    // Container defaults to the reported 400x300 canvas
    let left = result.elements[0].layout.as_ref().unwrap();
    let right = result.elements[1].layout.as_ref().unwrap();
    assert_eq!(left.constraints.unwrap().horizontal, Constraint::Min);
    assert_eq!(right.constraints.unwrap().horizontal, Constraint::Max);
    assert_eq!(left.row, Some(0));

    assert_eq!(result.spacing.len(), 1);
    assert_eq!(result.spacing[0].axis, Axis::Horizontal);
    assert_eq!(result.spacing[0].gaps, vec![200.0]);
    assert!(result
        .alignments
        .iter()
        .any(|g| g.kind == AlignmentKind::CenterY && g.members == vec![0, 1]));

    let json = serde_json::to_value(&result).unwrap();
    assert!(json["alignments"].is_array());
    assert_eq!(json["spacing"][0]["gaps"][0], 200.0);

    let layout = result.layout.expect("layout structure");
    assert_eq!(layout.rows.len(), 1);
}

#[tokio::test]
async fn test_container_hints_override_size() {
    let server = mock_server::spawn(MockReply::Content(corner_boxes_reply())).await;
    let service = RecognitionService::new(remote_config(&server.endpoint)).unwrap();

    let hints = ContainerHints {
        width: Some(1200.0),
        height: None,
    };
    let result = service.analyze(&solid_png(40, 30, RED), Some(hints)).await;

    // Box at x=300 is nowhere near the right edge of a 1200-wide container
    let right = result.elements[1].layout.as_ref().unwrap().constraints.unwrap();
    assert_eq!(right.horizontal, Constraint::Scale);
}

#[tokio::test]
async fn test_empty_key_falls_back_to_local() {
    let config = RecognitionConfig {
        provider: Some(ProviderKind::OpenAi),
        api_key: Some(String::new()),
        ..RecognitionConfig::default()
    };
    let service = RecognitionService::new(config).unwrap();
    assert!(service.has_remote_provider());

    let result = service.analyze(&split_png(200, 100, RED, BLUE), None).await;
    assert!(result.success);
    assert_eq!(result.source, Some(AnalysisSource::Local));
    assert_eq!(result.elements.len(), 2);

    let left = result.elements[0].layout.as_ref().unwrap().constraints.unwrap();
    assert_eq!(left.horizontal, Constraint::Min);
    assert_eq!(left.vertical, Constraint::Stretch);
}

#[tokio::test]
async fn test_empty_key_without_fallback() {
    let config = RecognitionConfig {
        provider: Some(ProviderKind::OpenAi),
        enable_local_fallback: false,
        ..RecognitionConfig::default()
    };
    let service = RecognitionService::new(config).unwrap();

    let result = service.analyze(&solid_png(40, 40, RED), None).await;
    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::ServiceUnconfigured));
    assert!(result.elements.is_empty());
}

#[tokio::test]
async fn test_server_error_falls_back() {
    let server = mock_server::spawn(MockReply::Status(503)).await;
    let service = RecognitionService::new(remote_config(&server.endpoint)).unwrap();

    let result = service.analyze(&solid_png(60, 60, BLUE), None).await;
    assert!(result.success);
    assert_eq!(result.source, Some(AnalysisSource::Local));
    assert_eq!(server.calls(), 1);
}

#[tokio::test]
async fn test_server_error_without_fallback() {
    let server = mock_server::spawn(MockReply::Status(500)).await;
    let config = RecognitionConfig {
        enable_local_fallback: false,
        ..remote_config(&server.endpoint)
    };
    let service = RecognitionService::new(config).unwrap();

    let result = service.analyze(&solid_png(60, 60, BLUE), None).await;
    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::RequestFailed));
    // No retry
    assert_eq!(server.calls(), 1);
}

#[tokio::test]
async fn test_timeout_falls_back() {
    let server = mock_server::spawn(MockReply::Delayed(
        Duration::from_secs(3),
        corner_boxes_reply(),
    ))
    .await;
    let config = RecognitionConfig {
        request_timeout_ms: 200,
        ..remote_config(&server.endpoint)
    };
    let service = RecognitionService::new(config).unwrap();

    let result = service.analyze(&solid_png(60, 60, BLUE), None).await;
    assert!(result.success);
    assert_eq!(result.source, Some(AnalysisSource::Local));
}

#[tokio::test]
async fn test_local_preference_never_calls_remote() {
    let server = mock_server::spawn(MockReply::Content(corner_boxes_reply())).await;
    let config = RecognitionConfig {
        preferred_service: ServicePreference::Local,
        ..remote_config(&server.endpoint)
    };
    let service = RecognitionService::new(config).unwrap();

    let result = service.analyze(&solid_png(60, 60, BLUE), None).await;
    assert_eq!(result.source, Some(AnalysisSource::Local));
    assert_eq!(server.calls(), 0);
}

#[tokio::test]
async fn test_local_failure_is_terminal() {
    let service = RecognitionService::new(RecognitionConfig::default()).unwrap();
    let result = service.analyze(&solid_png(5, 5, RED), None).await;
    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::AnalysisFailed));
}

#[tokio::test]
async fn test_analyze_batch_keeps_order() {
    let service = RecognitionService::new(RecognitionConfig::default()).unwrap();
    let uniform = solid_png(60, 40, RED);
    let split = split_png(200, 100, RED, BLUE);
    let garbage = b"garbage".to_vec();

    let results = service
        .analyze_batch(&[uniform.as_slice(), split.as_slice(), garbage.as_slice()], None)
        .await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].elements.len(), 1);
    assert_eq!(results[1].elements.len(), 2);
    assert_eq!(results[2].error_kind, Some(ErrorKind::DecodeUnavailable));
}

#[tokio::test(flavor = "current_thread")]
async fn test_local_batch_does_not_block_executor() {
    let service = RecognitionService::new(RecognitionConfig::default()).unwrap();
    let images: Vec<Vec<u8>> = (0..4).map(|_| split_png(600, 400, RED, BLUE)).collect();
    let slices: Vec<&[u8]> = images.iter().map(Vec::as_slice).collect();

    // Only gets polled while the batch is waiting on segmentation
    let ticks = Arc::new(AtomicUsize::new(0));
    let ticker = {
        let ticks = ticks.clone();
        tokio::spawn(async move {
            loop {
                ticks.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
            }
        })
    };

    let results = service.analyze_batch(&slices, None).await;
    ticker.abort();

    assert!(results.iter().all(|r| r.success && r.elements.len() == 2));
    assert!(ticks.load(Ordering::SeqCst) > 0);
}

#[tokio::test]
async fn test_shared_service_across_tasks() {
    let server = mock_server::spawn(MockReply::Content(corner_boxes_reply())).await;
    let service = Arc::new(RecognitionService::new(remote_config(&server.endpoint)).unwrap());

    let mut handles = Vec::new();
    for _ in 0..4 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.analyze(&solid_png(40, 30, RED), None).await
        }));
    }
    for handle in handles {
        let result = handle.await.unwrap();
        assert_eq!(result.source, Some(AnalysisSource::Remote));
    }
    assert_eq!(server.calls(), 4);
}

#[tokio::test]
async fn test_check_remote_availability() {
    let server = mock_server::spawn(MockReply::Content(corner_boxes_reply())).await;
    let service = RecognitionService::new(remote_config(&server.endpoint)).unwrap();
    assert!(service.check_remote_availability().await.is_ok());

    let local_only = RecognitionService::new(RecognitionConfig::default()).unwrap();
    assert!(local_only.check_remote_availability().await.is_err());
}

#[tokio::test]
async fn test_result_serializes_for_host() {
    let service = RecognitionService::new(RecognitionConfig::default()).unwrap();
    let result = service.analyze(&solid_png(60, 40, RED), None).await;

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["source"], "local");
    assert_eq!(json["elements"][0]["type"], "rectangle");
    assert!(json["dominantColors"].is_array());
    assert_eq!(json["elements"][0]["layout"]["constraints"]["horizontal"], "stretch");
}
