use crate::helpers::{spawn_app, spawn_app_without_credential};

#[tokio::test]
async fn status_reports_unconfigured_without_any_credential() {
    let app = spawn_app_without_credential().await;
    let client = reqwest::Client::new();

    let body: serde_json::Value = client
        .get(app.api_url("/credential"))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();

    assert_eq!(body, serde_json::json!({ "configured": false }));
}

#[tokio::test]
async fn status_reports_configured_with_operator_default() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let body: serde_json::Value = client
        .get(app.api_url("/credential"))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();

    assert_eq!(body["configured"], true);
}

#[tokio::test]
async fn stored_credential_flips_status_and_is_never_echoed() {
    let app = spawn_app_without_credential().await;
    let client = reqwest::Client::new();

    let response = client
        .put(app.api_url("/credential"))
        .json(&serde_json::json!({ "credential": "hf_secret_value" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 204);

    let response = client
        .get(app.api_url("/credential"))
        .send()
        .await
        .expect("Failed to execute request");
    let text = response.text().await.unwrap();

    assert!(text.contains("\"configured\":true"));
    assert!(!text.contains("hf_secret_value"), "secret must not be echoed");
}

#[tokio::test]
async fn empty_credential_clears_the_stored_value() {
    let app = spawn_app_without_credential().await;
    let client = reqwest::Client::new();

    client
        .put(app.api_url("/credential"))
        .json(&serde_json::json!({ "credential": "hf_secret_value" }))
        .send()
        .await
        .expect("Failed to store credential");

    client
        .put(app.api_url("/credential"))
        .json(&serde_json::json!({ "credential": "" }))
        .send()
        .await
        .expect("Failed to clear credential");

    let body: serde_json::Value = client
        .get(app.api_url("/credential"))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();

    assert_eq!(body["configured"], false);
}
