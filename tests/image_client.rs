use pixelforge::{
    compose_prompt, GenerationController, GenerationError, GenerationRequest, GenerationSettings,
    GenerationState, GeneratorConfig, ImageClient,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

fn client_for(server: &MockServer) -> ImageClient {
    let config = GeneratorConfig::new()
        .with_endpoint(format!("{}/chat/completions", server.uri()))
        .with_model("test/model")
        .with_credentials("secret-key")
        .with_timeout(Duration::from_secs(5));
    ImageClient::new(config).unwrap()
}

fn fox() -> GenerationRequest {
    GenerationRequest::new("a red fox", GenerationSettings::default())
}

#[tokio::test]
async fn test_generate_extracts_url_and_sends_composed_prompt() {
    let server = MockServer::start().await;
    let expected_prompt = compose_prompt("a red fox", &GenerationSettings::default(), None);

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer secret-key"))
        .and(body_partial_json(json!({
            "model": "test/model",
            "messages": [{ "role": "user", "content": expected_prompt }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "Here is your image: https://cdn.example.com/out.png enjoy!",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client_for(&server).generate(&fox()).await.unwrap();
    assert_eq!(outcome.image_url, "https://cdn.example.com/out.png");
}

#[tokio::test]
async fn test_customer_id_header_is_sent_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("customerId", "cus_123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion("https://a.b/c.webp")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = GeneratorConfig::new()
        .with_endpoint(format!("{}/chat/completions", server.uri()))
        .with_customer_id("cus_123");
    let outcome = ImageClient::new(config).unwrap().generate(&fox()).await.unwrap();
    assert_eq!(outcome.image_url, "https://a.b/c.webp");
}

#[tokio::test]
async fn test_blank_prompt_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    for prompt in ["", "  \n "] {
        let request = GenerationRequest::new(prompt, GenerationSettings::default());
        let err = client.generate(&request).await.unwrap_err();
        assert!(matches!(err, GenerationError::InvalidInput(_)));
    }

    let bad_steps = GenerationRequest::new("x", GenerationSettings::new().with_steps(Some(500)));
    assert!(matches!(
        client.generate(&bad_steps).await,
        Err(GenerationError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_upstream_status_classification() {
    let cases: [(u16, fn(&GenerationError) -> bool); 4] = [
        (429, |e| matches!(e, GenerationError::RateLimited)),
        (503, |e| matches!(e, GenerationError::ServiceUnavailable)),
        (500, |e| matches!(e, GenerationError::GenerationFailed(_))),
        (401, |e| matches!(e, GenerationError::GenerationFailed(_))),
    ];

    for (status, check) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status).set_body_string("upstream said no"))
            .mount(&server)
            .await;

        let err = client_for(&server).generate(&fox()).await.unwrap_err();
        assert!(check(&err), "status {} gave {:?}", status, err);
    }
}

#[tokio::test]
async fn test_response_without_image_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("Sorry, I can only describe the image in words.")),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).generate(&fox()).await.unwrap_err();
    assert!(matches!(err, GenerationError::NoImageInResponse));
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("https://cdn.example.com/late.png"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let config = GeneratorConfig::new()
        .with_endpoint(format!("{}/chat/completions", server.uri()))
        .with_timeout(Duration::from_millis(200));
    let err = ImageClient::new(config).unwrap().generate(&fox()).await.unwrap_err();
    assert!(matches!(err, GenerationError::Timeout));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() {
    let config = GeneratorConfig::new()
        .with_endpoint("http://127.0.0.1:1/chat/completions")
        .with_timeout(Duration::from_secs(5));
    let err = ImageClient::new(config).unwrap().generate(&fox()).await.unwrap_err();
    assert!(matches!(err, GenerationError::NetworkError(_)), "{:?}", err);
}

#[tokio::test]
async fn test_controller_end_to_end_with_download() {
    let server = MockServer::start().await;
    let image_url = format!("{}/images/out.png", server.uri());

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion(&format!("Done! {} (1024x1024)", image_url))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/images/out.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\x89PNG fake".to_vec()))
        .mount(&server)
        .await;

    let controller = GenerationController::new(Arc::new(client_for(&server)));
    let image = controller.submit("a red fox").await.unwrap();

    assert_eq!(image.url, image_url);
    assert_eq!(image.settings, GenerationSettings::default());
    assert_eq!(controller.state(), GenerationState::Idle);
    assert_eq!(controller.images().len(), 1);

    let dir = tempfile::tempdir().unwrap();
    let saved = controller.download_image(&image.id, dir.path()).await.unwrap();
    assert_eq!(
        saved.file_name().and_then(|n| n.to_str()),
        Some(format!("generated-image-{}.png", image.id).as_str())
    );
    assert_eq!(std::fs::read(&saved).unwrap(), b"\x89PNG fake");
}
