mod test_utils;

use gallery_backend::repositories::storage::ObjectStorage;
use reqwest::StatusCode;
use serde_json::{json, Value};
use test_fixtures::{png_bytes, FAKE_CAPTION};
use test_utils::*;

#[actix_rt::test]
async fn admin_routes_reject_missing_and_foreign_tokens() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    app.seed_categories(&token).await;

    let (status, _) = app.get_json("/api/v1/admin/images", None).await;
    assert_eq!(status, 401);

    let (status, _) = app.get_json("/api/v1/admin/images", Some("not-a-jwt")).await;
    assert_eq!(status, 401);

    let unlocked: Value = app
        .client
        .post(app.url("/api/v1/categories/artistic/unlock"))
        .json(&json!({"password": GALLERY_PASSWORD}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let (status, _) = app
        .get_json("/api/v1/admin/images", unlocked["accessToken"].as_str())
        .await;
    assert_eq!(status, 403);
}

#[actix_rt::test]
async fn login_rejects_wrong_password_and_refresh_issues_new_tokens() {
    let app = TestApp::spawn().await;

    let wrong = app
        .client
        .post(app.url("/api/v1/auth/login"))
        .json(&json!({"email": ADMIN_EMAIL, "password": "nope"}))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let login: Value = app
        .client
        .post(app.url("/api/v1/auth/login"))
        .json(&json!({"email": "ADMIN@example.com", "password": ADMIN_PASSWORD}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let refreshed = app
        .client
        .post(app.url("/api/v1/auth/refresh"))
        .json(&json!({"refreshToken": login["refreshToken"]}))
        .send()
        .await
        .unwrap();
    assert_eq!(refreshed.status(), StatusCode::OK);

    // An access token is not a refresh token
    let misuse = app
        .client
        .post(app.url("/api/v1/auth/refresh"))
        .json(&json!({"refreshToken": login["accessToken"]}))
        .send()
        .await
        .unwrap();
    assert_eq!(misuse.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn uploaded_image_is_served_from_media() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    app.seed_categories(&token).await;
    let bytes = png_bytes(1200, 900);

    let response = app.upload(&token, "nature", "Fern at dawn", "fern shot.png", &bytes).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let uploaded: Value = response.json().await.unwrap();

    let url = uploaded["url"].as_str().unwrap();
    assert!(url.starts_with(&format!("{}/media/gallery/nature/", app.address)));
    let media = app.client.get(url).send().await.unwrap();
    assert_eq!(media.status(), StatusCode::OK);
    assert_eq!(media.headers()["content-type"], "image/png");
    assert_eq!(media.bytes().await.unwrap().as_ref(), bytes.as_slice());

    let thumbnail = app
        .client
        .get(uploaded["thumbnailUrl"].as_str().unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(thumbnail.headers()["content-type"], "image/jpeg");

    let (_, listed) = app.get_json("/api/v1/images?category=nature", None).await;
    assert_eq!(listed[0]["description"], "Fern at dawn");
    assert_eq!(listed[0]["needsReview"], false);
}

#[actix_rt::test]
async fn upload_rejects_non_images_and_unknown_categories() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    app.seed_categories(&token).await;

    let text = app.upload(&token, "nature", "Notes", "notes.png", b"definitely not a picture").await;
    assert_eq!(text.status(), StatusCode::BAD_REQUEST);

    let unknown = app.upload(&token, "macro", "Bug", "bug.png", &png_bytes(8, 8)).await;
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);

    assert!(app.images.all().is_empty());
    assert!(app.storage.list("gallery", true).await.unwrap().is_empty());
}

fn oversized_png(len: usize) -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.resize(len, 0);
    bytes
}

#[actix_rt::test]
async fn upload_limit_follows_configuration() {
    let app = TestApp::spawn_with(TestOptions {
        upload_max_bytes: Some(40 * 1024 * 1024),
        ..Default::default()
    })
    .await;
    let token = app.admin_token().await;
    app.seed_categories(&token).await;

    let bytes = oversized_png(26 * 1024 * 1024);
    let response = app.upload(&token, "nature", "Panorama", "panorama.png", &bytes).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let uploaded: Value = response.json().await.unwrap();
    assert_eq!(uploaded["thumbnailUrl"], Value::Null);
    assert_eq!(app.images.all()[0].size, bytes.len() as i64);
}

#[actix_rt::test]
async fn upload_over_configured_limit_is_rejected() {
    let app = TestApp::spawn_with(TestOptions {
        upload_max_bytes: Some(1024 * 1024),
        ..Default::default()
    })
    .await;
    let token = app.admin_token().await;
    app.seed_categories(&token).await;

    let response = app
        .upload(&token, "nature", "Panorama", "panorama.png", &oversized_png(1024 * 1024 + 4096))
        .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    assert!(app.images.all().is_empty());
    assert!(app.storage.list("gallery", true).await.unwrap().is_empty());
}

#[actix_rt::test]
async fn renamed_category_sends_images_to_review() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    app.seed_categories(&token).await;
    let id = app.images.seed("https://cdn.example/crowd.jpg", "street", "Crowd");

    let (_, categories) = app.get_json("/api/v1/categories", None).await;
    let street = categories
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["slug"] == "street")
        .unwrap();
    let renamed = app
        .client
        .patch(app.url(&format!("/api/v1/admin/categories/{}", street["id"].as_str().unwrap())))
        .bearer_auth(&token)
        .json(&json!({"name": "City Life"}))
        .send()
        .await
        .unwrap();
    assert_eq!(renamed.status(), StatusCode::OK);

    let (_, queue) = app.get_json("/api/v1/admin/images/review", Some(&token)).await;
    assert_eq!(queue[0]["id"], id.to_string());

    let (_, summary) = app.get_json("/api/v1/admin/images/summary", Some(&token)).await;
    let uncategorized = summary["categories"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["slug"] == "uncategorized")
        .unwrap();
    assert_eq!(uncategorized["count"], 1);
    assert_eq!(summary["total"], 1);

    let reviewed: Value = app
        .client
        .post(app.url(&format!("/api/v1/admin/images/{id}/review")))
        .bearer_auth(&token)
        .json(&json!({"category": "city-life", "description": "Crowd at noon"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reviewed["category"], "city-life");
    assert_eq!(reviewed["needsReview"], false);

    let (_, queue) = app.get_json("/api/v1/admin/images/review", Some(&token)).await;
    assert!(queue.as_array().unwrap().is_empty());
}

#[actix_rt::test]
async fn edit_keeps_untouched_fields_and_clears_null_ones() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    app.seed_categories(&token).await;
    let id = app.images.seed("https://cdn.example/lake.jpg", "nature", "Lake");

    let translated: Value = app
        .client
        .post(app.url(&format!("/api/v1/admin/images/{id}/translate")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(translated["descriptionEs"], "[Spanish] Lake");

    let edited: Value = app
        .client
        .patch(app.url(&format!("/api/v1/admin/images/{id}")))
        .bearer_auth(&token)
        .json(&json!({"descriptionEs": null}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(edited["description"], "Lake");
    assert_eq!(edited["descriptionEs"], Value::Null);

    let rethumbed: Value = app
        .client
        .patch(app.url(&format!("/api/v1/admin/images/{id}")))
        .bearer_auth(&token)
        .json(&json!({"thumbnailUrl": "https://cdn.example/lake-small.jpg"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(rethumbed["thumbnailUrl"], "https://cdn.example/lake-small.jpg");
    assert_eq!(rethumbed["description"], "Lake");

    let relabeled: Value = app
        .client
        .put(app.url(&format!("/api/v1/admin/images/{id}/category")))
        .bearer_auth(&token)
        .json(&json!({"category": "events"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(relabeled["category"], "events");
}

#[actix_rt::test]
async fn describe_suggests_a_caption_without_saving_it() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    app.seed_categories(&token).await;
    let uploaded: Value = app
        .upload(&token, "portraits", "Studio", "studio.png", &png_bytes(64, 64))
        .await
        .json()
        .await
        .unwrap();
    let id = uploaded["id"].as_str().unwrap();

    let suggestion: Value = app
        .client
        .post(app.url(&format!("/api/v1/admin/images/{id}/describe")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(suggestion["text"], FAKE_CAPTION);
    assert_eq!(app.images.all()[0].description.as_deref(), Some("Studio"));
}

#[actix_rt::test]
async fn purge_removes_stored_objects() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    app.seed_categories(&token).await;
    let uploaded: Value = app
        .upload(&token, "events", "Stage", "stage.png", &png_bytes(32, 32))
        .await
        .json()
        .await
        .unwrap();
    let id = uploaded["id"].as_str().unwrap();

    let deleted = app
        .client
        .delete(app.url(&format!("/api/v1/admin/images/{id}?purge=true")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    assert!(app.images.all().is_empty());
    assert!(app.storage.list("gallery", true).await.unwrap().is_empty());
    assert!(app.storage.list("thumbnails", true).await.unwrap().is_empty());

    let media = app.client.get(uploaded["url"].as_str().unwrap()).send().await.unwrap();
    assert_eq!(media.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn delete_without_purge_keeps_the_object() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    app.seed_categories(&token).await;
    let uploaded: Value = app
        .upload(&token, "events", "Stage", "stage.png", &png_bytes(32, 32))
        .await
        .json()
        .await
        .unwrap();

    app.client
        .delete(app.url(&format!("/api/v1/admin/images/{}", uploaded["id"].as_str().unwrap())))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    let media = app.client.get(uploaded["url"].as_str().unwrap()).send().await.unwrap();
    assert_eq!(media.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn duplicate_category_slug_conflicts() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    app.seed_categories(&token).await;

    let response = app
        .client
        .post(app.url("/api/v1/admin/categories"))
        .bearer_auth(&token)
        .json(&json!({"name": "Nature"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[actix_rt::test]
async fn protected_upload_is_hidden_but_its_media_url_is_public() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    app.seed_categories(&token).await;

    let response = app.upload(&token, "artistic", "Long exposure", "trails.png", &png_bytes(16, 16)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let uploaded: Value = response.json().await.unwrap();
    let id = uploaded["id"].as_str().unwrap();

    let (status, _) = app.get_json(&format!("/api/v1/images/{id}"), None).await;
    assert_eq!(status, 403);

    let media = app.client.get(uploaded["url"].as_str().unwrap()).send().await.unwrap();
    assert_eq!(media.status(), StatusCode::OK);
    assert_eq!(media.headers()["content-type"], "image/png");
}
