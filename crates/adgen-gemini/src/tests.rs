//! HTTP-level tests for the Gemini client against a mock server

#[cfg(test)]
mod gateway_tests {
    use crate::{GeminiClient, GeminiConfig};
    use adgen_core::{AdObjective, AiGateway, Error, PollPolicy};
    use insta::assert_yaml_snapshot;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ANALYZE_PATH: &str = "/models/gemini-3-pro-preview:generateContent";
    const IMAGE_PATH: &str = "/models/gemini-2.5-flash-image:generateContent";
    const VIDEO_PATH: &str = "/models/veo-3.1-fast-generate-preview:predictLongRunning";
    const OPERATION_PATH: &str = "/operations/op-123";

    fn client_for(server: &MockServer, max_attempts: u32) -> GeminiClient {
        let config = GeminiConfig::new("test-key")
            .with_api_url(server.uri())
            .with_poll(PollPolicy::fixed(Duration::from_millis(5), max_attempts));
        GeminiClient::new(config).unwrap()
    }

    fn analysis_text() -> String {
        json!({
            "copy": {
                "headline": "Drive Today",
                "primaryText": "Certified SUVs ready for delivery.",
                "description": "Financing from 3.9%",
                "callToAction": "Get Quote"
            },
            "strategy": {
                "audienceName": "Local Car Buyers",
                "ageRange": "25-45",
                "interests": ["SUVs"]
            },
            "visualPrompt": "red SUV on highway"
        })
        .to_string()
    }

    async fn count_requests(server: &MockServer, verb: &str, route: &str) -> usize {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.method.as_str() == verb && r.url.path() == route)
            .count()
    }

    #[tokio::test]
    async fn test_analyze_without_grounding_has_no_sources() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ANALYZE_PATH))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "tools": [{ "googleSearch": {} }],
                "generationConfig": { "responseMimeType": "application/json" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": analysis_text() }] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, 3);
        let analysis = client
            .analyze("https://example-dealer.test", AdObjective::Leads)
            .await
            .unwrap();

        assert!(analysis.sources.is_empty());
        assert_eq!(analysis.copy.headline, "Drive Today");
        assert_eq!(analysis.strategy.audience_name, "Local Car Buyers");
        assert_eq!(analysis.strategy.interests, vec!["SUVs".to_string()]);
        assert_eq!(analysis.visual_prompt, "red SUV on highway");
    }

    #[tokio::test]
    async fn test_analyze_maps_grounding_chunks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ANALYZE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": format!("```json\n{}\n```", analysis_text()) }] },
                    "groundingMetadata": { "groundingChunks": [
                        { "web": { "title": "Dealer Stock", "uri": "https://dealer.test/stock" } },
                        { "web": { "uri": "https://dealer.test/about" } },
                        { "web": { "title": "No link", "uri": "" } },
                        { "retrievedContext": {} }
                    ] }
                }]
            })))
            .mount(&server)
            .await;

        let analysis = client_for(&server, 3)
            .analyze("https://dealer.test", AdObjective::Clicks)
            .await
            .unwrap();

        assert_yaml_snapshot!(analysis.sources, @r###"
        ---
        - title: Dealer Stock
          uri: "https://dealer.test/stock"
        - title: Source
          uri: "https://dealer.test/about"
        "###);
    }

    #[tokio::test]
    async fn test_analyze_malformed_json_is_analysis_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ANALYZE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "{\"copy\": " }] } }]
            })))
            .mount(&server)
            .await;

        let err = client_for(&server, 3)
            .analyze("https://dealer.test", AdObjective::Leads)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Analysis(_)));
    }

    #[tokio::test]
    async fn test_analyze_server_error_is_analysis_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ANALYZE_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client_for(&server, 3)
            .analyze("https://dealer.test", AdObjective::Leads)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Analysis(msg) if msg.contains("500")));
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_any_request() {
        let server = MockServer::start().await;
        let config = GeminiConfig::default().with_api_url(server.uri());
        let client = GeminiClient::new(config).unwrap();

        let err = client
            .analyze("https://dealer.test", AdObjective::Leads)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));

        let err = client.generate_image("red SUV").await.unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));

        assert_eq!(server.received_requests().await.unwrap_or_default().len(), 0);
    }

    #[tokio::test]
    async fn test_rejected_key_is_authentication_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(IMAGE_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let err = client_for(&server, 3).generate_image("red SUV").await.unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
    }

    #[tokio::test]
    async fn test_generate_image_decodes_inline_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(IMAGE_PATH))
            .and(body_partial_json(json!({
                "contents": [{ "parts": [{
                    "text": "Professional Meta Ad: red SUV. Cinematic lighting, commercial quality."
                }] }],
                "generationConfig": { "imageConfig": { "aspectRatio": "1:1" } }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [
                    { "text": "Here is your banner" },
                    { "inlineData": { "mimeType": "image/png", "data": "iVBORw0KGgo=" } }
                ] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let media = client_for(&server, 3).generate_image("red SUV").await.unwrap();
        assert_eq!(media.mime_type, "image/png");
        assert_eq!(media.bytes, vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }

    #[tokio::test]
    async fn test_generate_image_without_payload_is_generation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(IMAGE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "I cannot draw that" }] } }]
            })))
            .mount(&server)
            .await;

        let err = client_for(&server, 3).generate_image("red SUV").await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }

    async fn mount_video_submit(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path(VIDEO_PATH))
            .and(body_partial_json(json!({
                "instances": [{ "prompt": "Ad video: red SUV. High engagement, 4k." }],
                "parameters": { "sampleCount": 1, "resolution": "720p", "aspectRatio": "9:16" }
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "name": "operations/op-123", "done": false })),
            )
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_generate_video_polls_until_done_then_downloads() {
        let server = MockServer::start().await;
        mount_video_submit(&server).await;

        Mock::given(method("GET"))
            .and(path(OPERATION_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "name": "operations/op-123", "done": false })),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;

        let download = format!("{}/files/clip.mp4", server.uri());
        Mock::given(method("GET"))
            .and(path(OPERATION_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "operations/op-123",
                "done": true,
                "response": { "generateVideoResponse": { "generatedSamples": [
                    { "video": { "uri": download } }
                ] } }
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/files/clip.mp4"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "video/mp4")
                    .set_body_bytes(b"fake-mp4-bytes".to_vec()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let media = client_for(&server, 10).generate_video("red SUV").await.unwrap();

        assert_eq!(media.mime_type, "video/mp4");
        assert_eq!(media.bytes, b"fake-mp4-bytes".to_vec());
        assert_eq!(count_requests(&server, "GET", OPERATION_PATH).await, 2);

        let leaked = server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .any(|r| r.url.query().unwrap_or_default().contains("test-key"));
        assert!(!leaked);
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_poll_waits_ten_seconds_between_checks() {
        let server = MockServer::start().await;
        mount_video_submit(&server).await;
        Mock::given(method("GET"))
            .and(path(OPERATION_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "name": "operations/op-123", "done": false })),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        let download = format!("{}/files/clip.mp4", server.uri());
        Mock::given(method("GET"))
            .and(path(OPERATION_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "operations/op-123",
                "done": true,
                "response": { "generatedVideos": [{ "video": { "uri": download } }] }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/files/clip.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"clip".to_vec()))
            .mount(&server)
            .await;

        // Paused clock; a request timeout would fire while waiting on the socket
        let mut config = GeminiConfig::new("test-key").with_api_url(server.uri());
        config.request_timeout = Duration::ZERO;
        assert_eq!(config.poll, PollPolicy::default());
        let client = GeminiClient::new(config).unwrap();

        let started = tokio::time::Instant::now();
        let media = client.generate_video("red SUV").await.unwrap();

        assert_eq!(media.bytes, b"clip".to_vec());
        assert_eq!(count_requests(&server, "GET", OPERATION_PATH).await, 2);
        assert!(started.elapsed() >= Duration::from_secs(20));
    }

    #[tokio::test]
    async fn test_generate_video_stalls_after_poll_budget() {
        let server = MockServer::start().await;
        mount_video_submit(&server).await;
        Mock::given(method("GET"))
            .and(path(OPERATION_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "name": "operations/op-123", "done": false })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server, 2).generate_video("red SUV").await.unwrap_err();

        assert!(matches!(err, Error::Stall(_)));
        assert_eq!(count_requests(&server, "GET", OPERATION_PATH).await, 2);
    }

    #[tokio::test]
    async fn test_generate_video_operation_error_is_generation_error() {
        let server = MockServer::start().await;
        mount_video_submit(&server).await;
        Mock::given(method("GET"))
            .and(path(OPERATION_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "operations/op-123",
                "done": true,
                "error": { "code": 3, "message": "prompt blocked" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server, 3).generate_video("red SUV").await.unwrap_err();
        assert!(matches!(err, Error::Generation(msg) if msg.contains("prompt blocked")));
    }

    #[tokio::test]
    async fn test_generate_video_without_link_is_generation_error() {
        let server = MockServer::start().await;
        mount_video_submit(&server).await;
        Mock::given(method("GET"))
            .and(path(OPERATION_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "name": "operations/op-123", "done": true })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server, 3).generate_video("red SUV").await.unwrap_err();
        assert!(matches!(err, Error::Generation(msg) if msg.contains("download link")));
    }

    #[tokio::test]
    async fn test_generate_video_failed_download_is_generation_error() {
        let server = MockServer::start().await;
        let download = format!("{}/files/missing.mp4", server.uri());
        Mock::given(method("POST"))
            .and(path(VIDEO_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "operations/op-123",
                "done": true,
                "response": { "generatedVideos": [{ "video": { "uri": download } }] }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/files/missing.mp4"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server, 3).generate_video("red SUV").await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
        assert_eq!(count_requests(&server, "GET", OPERATION_PATH).await, 0);
    }

    #[test]
    fn test_set_api_key() {
        let client = GeminiClient::new(GeminiConfig::default()).unwrap();
        assert!(!client.has_api_key());
        client.set_api_key("  ");
        assert!(!client.has_api_key());
        client.set_api_key("abc");
        assert!(client.has_api_key());
    }

    #[test]
    fn test_fixed_creative_parameters() {
        assert_eq!(GeminiClient::IMAGE_ASPECT_RATIO, "1:1");
        assert_eq!(GeminiClient::VIDEO_ASPECT_RATIO, "9:16");
        assert_eq!(GeminiClient::VIDEO_RESOLUTION, "720p");
    }
}
