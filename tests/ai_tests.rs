mod test_utils;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::StatusCode;
use serde_json::{json, Value};
use test_fixtures::{png_bytes, FAKE_AUDIO, FAKE_CAPTION};
use test_utils::*;

#[actix_rt::test]
async fn describe_accepts_data_urls() {
    let app = TestApp::spawn().await;
    let encoded = format!("data:image/png;base64,{}", STANDARD.encode(png_bytes(1600, 1200)));

    let response = app
        .client
        .post(app.url("/api/v1/ai/describe"))
        .json(&json!({"imageBase64": encoded, "mimeType": "image/png"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["description"], FAKE_CAPTION);
}

#[actix_rt::test]
async fn describe_rejects_garbage() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/api/v1/ai/describe"))
        .json(&json!({"imageBase64": "%%% not base64 %%%"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn translate_defaults_to_spanish() {
    let app = TestApp::spawn().await;

    let body: Value = app
        .client
        .post(app.url("/api/v1/ai/translate"))
        .json(&json!({"text": "Golden hour"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["translatedText"], "[Spanish] Golden hour");
}

#[actix_rt::test]
async fn narrate_returns_mpeg_bytes() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/api/v1/ai/narrate"))
        .json(&json!({"text": "A quiet morning", "voiceId": "custom-voice"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.headers()["content-type"], "audio/mpeg");
    assert_eq!(response.bytes().await.unwrap().as_ref(), FAKE_AUDIO);
}

#[actix_rt::test]
async fn unconfigured_vendors_answer_503() {
    let app = TestApp::spawn_with(TestOptions { with_vendors: false, ..Default::default() }).await;

    let translate = app
        .client
        .post(app.url("/api/v1/ai/translate"))
        .json(&json!({"text": "Golden hour"}))
        .send()
        .await
        .unwrap();
    assert_eq!(translate.status(), StatusCode::SERVICE_UNAVAILABLE);

    let contact = app
        .client
        .post(app.url("/api/v1/contact"))
        .json(&json!({"name": "Ana", "email": "ana@example.com", "message": "Hello"}))
        .send()
        .await
        .unwrap();
    assert_eq!(contact.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_rt::test]
async fn ai_endpoints_are_rate_limited_per_client() {
    let app = TestApp::spawn_with(TestOptions { ai_per_minute: 2, ..Default::default() }).await;

    let mut statuses = Vec::new();
    for _ in 0..3 {
        let response = app
            .client
            .post(app.url("/api/v1/ai/translate"))
            .json(&json!({"text": "Dusk"}))
            .send()
            .await
            .unwrap();
        statuses.push(response.status());
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            assert!(response.headers().contains_key("retry-after"));
        }
    }

    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::OK, StatusCode::TOO_MANY_REQUESTS]);
}

#[actix_rt::test]
async fn contact_message_is_relayed_escaped() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/api/v1/contact"))
        .json(&json!({
            "name": "Ana",
            "email": "ana@example.com",
            "message": "<script>alert(1)</script>"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);

    let sent = app.mailer.sent.lock();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["studio@example.com".to_string()]);
    assert_eq!(sent[0].reply_to, "ana@example.com");
    assert!(!sent[0].html.contains("<script>"));
}

#[actix_rt::test]
async fn contact_validates_email() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/api/v1/contact"))
        .json(&json!({"name": "Ana", "email": "not-an-email", "message": "Hi"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.mailer.sent.lock().is_empty());
}

#[actix_rt::test]
async fn malformed_json_is_reported_as_json_error() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/api/v1/ai/translate"))
        .header("Content-Type", "application/json")
        .body("{\"text\": ")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("JSON payload error"));
}
