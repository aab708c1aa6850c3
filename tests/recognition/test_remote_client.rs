// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Vision client against a mock chat-completions sidecar

use fabstir_design_recognizer::errors::RecognitionError;
use fabstir_design_recognizer::vision::encode_data_url;
use fabstir_design_recognizer::{
    AnalysisSource, Color, ElementType, ProviderConfig, ProviderKind, VisionClient, VisionProvider,
};
use std::time::Duration;

use super::fixtures::{solid_png, RED};
use super::mock_server::{self, corner_boxes_reply, MockReply, API_KEY};

fn client_for(endpoint: &str, api_key: &str, timeout_ms: u64) -> VisionClient {
    VisionClient::new(ProviderConfig {
        kind: ProviderKind::Custom,
        endpoint: endpoint.to_string(),
        api_key: api_key.to_string(),
        model: "mock-vision".to_string(),
        timeout_ms,
    })
    .unwrap()
}

#[tokio::test]
async fn test_fenced_reply() {
    let server = mock_server::spawn(MockReply::Content(corner_boxes_reply())).await;
    let client = client_for(&server.endpoint, API_KEY, 5000);
    let image = encode_data_url(&solid_png(40, 30, RED)).unwrap();

    let result = client.analyze(&image).await.unwrap();
    assert!(result.success);
    assert_eq!(result.source, Some(AnalysisSource::Remote));
    assert_eq!((result.width, result.height), (400, 300));
    assert_eq!(result.elements.len(), 2);

    let label = &result.elements[1];
    assert_eq!(label.element_type, ElementType::Text);
    assert_eq!(label.text.as_deref(), Some("Hi"));
    assert_eq!(label.font_size, Some(16.0));
    assert_eq!(label.color.unwrap().to_hex(), "#0000FF");
    assert_eq!(server.calls(), 1);
}

#[tokio::test]
async fn test_usage_without_total_tokens() {
    let server = mock_server::spawn(MockReply::PartialUsage(corner_boxes_reply())).await;
    let client = client_for(&server.endpoint, API_KEY, 5000);
    let image = encode_data_url(&solid_png(40, 30, RED)).unwrap();

    let result = client.analyze(&image).await.unwrap();
    assert!(result.success);
    assert_eq!(result.elements.len(), 2);
}

#[tokio::test]
async fn test_embedded_reply_with_bad_color() {
    let reply = r##"I looked at the screenshot. {"elements": [{"type": "divider", "x": 0, "y": 50, "width": 200, "height": 1, "color": "#ZZZ"}]} That is all."##;
    let server = mock_server::spawn(MockReply::Content(reply.to_string())).await;
    let client = client_for(&server.endpoint, API_KEY, 5000);
    let image = encode_data_url(&solid_png(40, 30, RED)).unwrap();

    let result = client.analyze(&image).await.unwrap();
    assert!(result.success);
    assert_eq!(result.elements[0].element_type, ElementType::Line);
    assert_eq!(result.elements[0].color, Some(Color::GRAY));
    // No reported size: derived from element extents
    assert_eq!((result.width, result.height), (200, 51));
}

#[tokio::test]
async fn test_unparseable_reply() {
    let server = mock_server::spawn(MockReply::Content("I can't help with that.".to_string())).await;
    let client = client_for(&server.endpoint, API_KEY, 5000);
    let image = encode_data_url(&solid_png(40, 30, RED)).unwrap();

    let err = client.analyze(&image).await.unwrap_err();
    assert!(matches!(err, RecognitionError::ResponseParseFailed(_)));
}

#[tokio::test]
async fn test_server_error_status() {
    let server = mock_server::spawn(MockReply::Status(500)).await;
    let client = client_for(&server.endpoint, API_KEY, 5000);
    let image = encode_data_url(&solid_png(40, 30, RED)).unwrap();

    match client.analyze(&image).await.unwrap_err() {
        RecognitionError::RequestFailed { status, message } => {
            assert_eq!(status, 500);
            assert!(message.contains("upstream model crashed"));
        }
        other => panic!("expected RequestFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_wrong_key_is_request_failed() {
    let server = mock_server::spawn(MockReply::Content(corner_boxes_reply())).await;
    let client = client_for(&server.endpoint, "wrong-key", 5000);
    let image = encode_data_url(&solid_png(40, 30, RED)).unwrap();

    let err = client.analyze(&image).await.unwrap_err();
    assert!(matches!(err, RecognitionError::RequestFailed { status: 401, .. }));
}

#[tokio::test]
async fn test_malformed_envelope() {
    let server = mock_server::spawn(MockReply::Garbage).await;
    let client = client_for(&server.endpoint, API_KEY, 5000);
    let image = encode_data_url(&solid_png(40, 30, RED)).unwrap();

    let err = client.analyze(&image).await.unwrap_err();
    assert!(matches!(err, RecognitionError::RequestFailed { status: 0, .. }));
}

#[tokio::test]
async fn test_timeout() {
    let server = mock_server::spawn(MockReply::Delayed(
        Duration::from_secs(3),
        corner_boxes_reply(),
    ))
    .await;
    let client = client_for(&server.endpoint, API_KEY, 200);
    let image = encode_data_url(&solid_png(40, 30, RED)).unwrap();

    let err = client.analyze(&image).await.unwrap_err();
    assert!(matches!(err, RecognitionError::Timeout { timeout_ms: 200 }));
    assert_eq!(err.to_string(), "Vision request timeout after 200ms");
}

#[tokio::test]
async fn test_health_check() {
    let server = mock_server::spawn(MockReply::Content(corner_boxes_reply())).await;
    let client = client_for(&server.endpoint, API_KEY, 5000);
    assert!(client.health_check().await.is_ok());
    // Probing does not touch the completions route
    assert_eq!(server.calls(), 0);
}
