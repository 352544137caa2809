use crate::helpers::{gallery_ids, png_bytes, save_image, save_image_id, spawn_app, spawn_app_with};

// ===========================================================================
// Save & list
// ===========================================================================

#[tokio::test]
async fn save_image_prepends_to_the_gallery() {
    let app = spawn_app().await;

    save_image(&app, "first prompt").await;
    let body = save_image(&app, "second prompt").await;

    let images = body["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0]["prompt"], "second prompt");
    assert_eq!(images[1]["prompt"], "first prompt");
    assert_eq!(body["persisted"], true);
}

#[tokio::test]
async fn saved_image_view_carries_url_not_bytes() {
    let app = spawn_app().await;
    let body = save_image(&app, "a red bicycle").await;

    let image = &body["images"][0];
    let id = image["id"].as_str().unwrap();
    assert_eq!(
        image["image_url"],
        format!("/api/v1/gallery/{id}/image").as_str()
    );
    assert!(image.get("image_data").is_none());
    assert_eq!(image["is_favorite"], false);
    assert!(image["created_at"].as_str().is_some());
}

#[tokio::test]
async fn save_image_rejects_empty_prompt() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(app.api_url("/gallery"))
        .json(&serde_json::json!({ "prompt": "   ", "image": "AQID" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn save_image_rejects_undecodable_payload() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(app.api_url("/gallery"))
        .json(&serde_json::json!({ "prompt": "a red bicycle", "image": "not base64!!!" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn save_image_accepts_data_url_and_keeps_content_type() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    use base64::Engine;
    let encoded = base64::engine::general_purpose::STANDARD.encode(png_bytes());
    let data_url = format!("data:image/jpeg;base64,{encoded}");

    let response = client
        .post(app.api_url("/gallery"))
        .json(&serde_json::json!({ "prompt": "a red bicycle", "image": data_url }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 201);

    let body: serde_json::Value = response.json().await.unwrap();
    let id = body["images"][0]["id"].as_str().unwrap();

    let response = client
        .get(app.api_url(&format!("/gallery/{id}/image")))
        .send()
        .await
        .expect("Failed to fetch image bytes");

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers().get("content-type").unwrap(), "image/jpeg");
}

// ===========================================================================
// Image bytes
// ===========================================================================

#[tokio::test]
async fn get_image_returns_stored_bytes_with_download_filename() {
    let app = spawn_app().await;
    let id = save_image_id(&app, "a red bicycle").await;

    let client = reqwest::Client::new();
    let response = client
        .get(app.api_url(&format!("/gallery/{id}/image")))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers().get("content-type").unwrap(), "image/png");

    let disposition = response
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .expect("content-disposition expected");
    assert!(disposition.contains("ai-generated-"));
    assert!(disposition.ends_with(".png\""));

    let body = response.bytes().await.expect("Failed to read body");
    assert_eq!(body.to_vec(), png_bytes());
}

#[tokio::test]
async fn get_image_unknown_id_returns_404() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(app.api_url("/gallery/nonexistent/image"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 404);
}

// ===========================================================================
// Delete & clear
// ===========================================================================

#[tokio::test]
async fn insert_then_delete_restores_prior_sequence() {
    let app = spawn_app().await;
    save_image(&app, "keep one").await;
    save_image(&app, "keep two").await;
    let before = gallery_ids(&app).await;

    let transient = save_image_id(&app, "transient").await;

    let client = reqwest::Client::new();
    let response = client
        .delete(app.api_url(&format!("/gallery/{transient}")))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);

    assert_eq!(gallery_ids(&app).await, before);
}

#[tokio::test]
async fn delete_unknown_id_is_a_noop() {
    let app = spawn_app().await;
    save_image(&app, "kept").await;

    let client = reqwest::Client::new();
    let response = client
        .delete(app.api_url("/gallery/nonexistent"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    assert_eq!(gallery_ids(&app).await.len(), 1);
}

#[tokio::test]
async fn clear_empties_the_gallery() {
    let app = spawn_app().await;
    save_image(&app, "one").await;
    save_image(&app, "two").await;

    let client = reqwest::Client::new();
    let response = client
        .delete(app.api_url("/gallery"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    assert!(gallery_ids(&app).await.is_empty());
}

#[tokio::test]
async fn clear_does_not_forget_favorites() {
    let app = spawn_app().await;
    let id = save_image_id(&app, "favorited").await;

    let client = reqwest::Client::new();
    client
        .post(app.api_url(&format!("/gallery/{id}/favorite")))
        .send()
        .await
        .expect("Failed to toggle favorite");

    client
        .delete(app.api_url("/gallery"))
        .send()
        .await
        .expect("Failed to clear gallery");

    // Re-saving under a new id yields a non-favorite entry; the old favorite
    // id simply no longer matches anything, which is acceptable.
    let body = save_image(&app, "fresh").await;
    assert_eq!(body["images"][0]["is_favorite"], false);
}

// ===========================================================================
// Reorder
// ===========================================================================

#[tokio::test]
async fn reorder_applies_the_new_permutation() {
    let app = spawn_app().await;
    save_image(&app, "a").await;
    save_image(&app, "b").await;
    save_image(&app, "c").await;

    let mut ids = gallery_ids(&app).await;
    ids.reverse();

    let client = reqwest::Client::new();
    let response = client
        .put(app.api_url("/gallery/order"))
        .json(&serde_json::json!({ "ids": ids }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["changed"], true);

    assert_eq!(gallery_ids(&app).await, ids);
}

#[tokio::test]
async fn reorder_with_identical_order_reports_unchanged() {
    let app = spawn_app().await;
    save_image(&app, "a").await;
    save_image(&app, "b").await;

    let ids = gallery_ids(&app).await;

    let client = reqwest::Client::new();
    let response = client
        .put(app.api_url("/gallery/order"))
        .json(&serde_json::json!({ "ids": ids }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["changed"], false);
    assert_eq!(body["persisted"], true);
}

#[tokio::test]
async fn reorder_rejects_a_mismatched_id_set() {
    let app = spawn_app().await;
    save_image(&app, "a").await;

    let client = reqwest::Client::new();
    let response = client
        .put(app.api_url("/gallery/order"))
        .json(&serde_json::json!({ "ids": ["bogus"] }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);
}

// ===========================================================================
// Favorites
// ===========================================================================

#[tokio::test]
async fn toggle_favorite_twice_is_the_identity() {
    let app = spawn_app().await;
    let id = save_image_id(&app, "a red bicycle").await;

    let client = reqwest::Client::new();

    let response = client
        .post(app.api_url(&format!("/gallery/{id}/favorite")))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["is_favorite"], true);

    let response = client
        .post(app.api_url(&format!("/gallery/{id}/favorite")))
        .send()
        .await
        .expect("Failed to execute request");
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["is_favorite"], false);
}

#[tokio::test]
async fn toggle_favorite_unknown_id_returns_404() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(app.api_url("/gallery/nonexistent/favorite"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 404);
}

// ===========================================================================
// Filter & sort views
// ===========================================================================

#[tokio::test]
async fn query_filters_prompts_case_insensitively() {
    let app = spawn_app().await;
    save_image(&app, "A Red Bicycle").await;
    save_image(&app, "blue car").await;
    save_image(&app, "the red door").await;

    let client = reqwest::Client::new();
    let body: serde_json::Value = client
        .get(app.api_url("/gallery?q=RED"))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();

    let prompts: Vec<&str> = body["images"]
        .as_array()
        .unwrap()
        .iter()
        .map(|image| image["prompt"].as_str().unwrap())
        .collect();

    assert_eq!(prompts, vec!["the red door", "A Red Bicycle"]);
}

#[tokio::test]
async fn favorites_sort_composes_with_query() {
    let app = spawn_app().await;
    let cat_hat = save_image_id(&app, "a cat in a hat").await;
    save_image(&app, "a cat on a mat").await;
    let dog_hat = save_image_id(&app, "a dog in a hat").await;

    let client = reqwest::Client::new();
    for id in [&cat_hat, &dog_hat] {
        client
            .post(app.api_url(&format!("/gallery/{id}/favorite")))
            .send()
            .await
            .expect("Failed to toggle favorite");
    }

    let body: serde_json::Value = client
        .get(app.api_url("/gallery?q=cat&sort=favorites"))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();

    let images = body["images"].as_array().unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0]["id"], cat_hat.as_str());
    assert_eq!(images[0]["is_favorite"], true);
}

#[tokio::test]
async fn sorted_views_do_not_disturb_the_manual_order() {
    let app = spawn_app().await;
    save_image(&app, "alpha").await;
    save_image(&app, "beta").await;
    save_image(&app, "gamma").await;

    // Move the middle entry to the front: manual order != chronological
    let ids = gallery_ids(&app).await;
    let manual = vec![ids[1].clone(), ids[0].clone(), ids[2].clone()];

    let client = reqwest::Client::new();
    client
        .put(app.api_url("/gallery/order"))
        .json(&serde_json::json!({ "ids": manual }))
        .send()
        .await
        .expect("Failed to reorder");

    let body: serde_json::Value = client
        .get(app.api_url("/gallery?sort=oldest"))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();

    let prompts: Vec<&str> = body["images"]
        .as_array()
        .unwrap()
        .iter()
        .map(|image| image["prompt"].as_str().unwrap())
        .collect();
    assert_eq!(prompts, vec!["alpha", "beta", "gamma"]);

    // The default view still reflects the manual order
    assert_eq!(gallery_ids(&app).await, manual);
}

#[tokio::test]
async fn newest_sort_orders_by_creation_time_descending() {
    let app = spawn_app().await;
    save_image(&app, "alpha").await;
    save_image(&app, "beta").await;

    // Manual order happens to be newest-first already; flip it first
    let mut ids = gallery_ids(&app).await;
    ids.reverse();
    let client = reqwest::Client::new();
    client
        .put(app.api_url("/gallery/order"))
        .json(&serde_json::json!({ "ids": ids }))
        .send()
        .await
        .expect("Failed to reorder");

    let body: serde_json::Value = client
        .get(app.api_url("/gallery?sort=newest"))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();

    let prompts: Vec<&str> = body["images"]
        .as_array()
        .unwrap()
        .iter()
        .map(|image| image["prompt"].as_str().unwrap())
        .collect();
    assert_eq!(prompts, vec!["beta", "alpha"]);
}

#[tokio::test]
async fn unknown_sort_criterion_is_rejected() {
    let app = spawn_app().await;

    let client = reqwest::Client::new();
    let response = client
        .get(app.api_url("/gallery?sort=alphabetical"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);
}

// ===========================================================================
// Durability
// ===========================================================================

#[tokio::test]
async fn gallery_survives_a_restart_on_a_file_backed_database() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let database_url = format!(
        "sqlite:{}?mode=rwc",
        dir.path().join("easel-test.db").display()
    );

    let first = spawn_app_with(&database_url, "test-key").await;
    let id = save_image_id(&first, "persisted prompt").await;

    let client = reqwest::Client::new();
    client
        .post(first.api_url(&format!("/gallery/{id}/favorite")))
        .send()
        .await
        .expect("Failed to toggle favorite");
    drop(first);

    let second = spawn_app_with(&database_url, "test-key").await;
    let body: serde_json::Value = client
        .get(second.api_url("/gallery"))
        .send()
        .await
        .expect("Failed to list gallery")
        .json()
        .await
        .unwrap();

    let images = body["images"].as_array().unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0]["prompt"], "persisted prompt");
    assert_eq!(images[0]["is_favorite"], true);

    let response = client
        .get(second.api_url(&format!("/gallery/{id}/image")))
        .send()
        .await
        .expect("Failed to fetch image bytes");
    assert_eq!(response.status(), 200);
    assert_eq!(response.bytes().await.unwrap().to_vec(), png_bytes());
}
