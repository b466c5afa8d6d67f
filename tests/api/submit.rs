use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::task::JoinSet;
use waitlist::{config::WaitlistConfig, model::WaitlistStore};

use crate::helpers::{error_message, TestApp};

#[tokio::test]
async fn submit_fresh_email_created() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .post_submit(&json!({"email": "a@x.com", "name": "A"}))
        .await?;

    assert_eq!(
        res.status(),
        StatusCode::CREATED,
        "Wrong response StatusCode: {}",
        res.status()
    );
    let body: Value = res.json().await?;
    assert_eq!(json!({"message": "Form submitted successfully"}), body);

    let entry = app
        .store
        .find_by_email("a@x.com")
        .await?
        .ok_or_else(|| anyhow::anyhow!("entry was not stored"))?;
    assert_eq!("a@x.com", entry.email);
    assert_eq!(Some("A".to_string()), entry.name);
    assert_eq!(1, app.store.count().await?);

    Ok(())
}

#[tokio::test]
async fn submit_same_email_twice_conflicts() -> Result<()> {
    let app = TestApp::spawn().await?;
    let body = json!({"email": "a@x.com", "name": "A"});

    let res = app.post_submit(&body).await?;
    assert_eq!(StatusCode::CREATED, res.status());

    let res = app.post_submit(&body).await?;
    assert_eq!(StatusCode::CONFLICT, res.status());
    assert_eq!(
        "Email already registered for waiting list",
        error_message(res).await?
    );

    assert_eq!(1, app.store.count().await?);

    Ok(())
}

#[tokio::test]
async fn submit_duplicate_with_other_name_leaves_original_untouched() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .post_submit(&json!({"email": "a@x.com", "name": "Original"}))
        .await?;
    assert_eq!(StatusCode::CREATED, res.status());
    let original = app.store.find_by_email("a@x.com").await?;

    let res = app
        .post_submit(&json!({"email": "a@x.com", "name": "Impostor"}))
        .await?;
    assert_eq!(StatusCode::CONFLICT, res.status());

    assert_eq!(original, app.store.find_by_email("a@x.com").await?);
    assert_eq!(1, app.store.count().await?);

    Ok(())
}

#[tokio::test]
async fn submit_missing_email_400() -> Result<()> {
    let app = TestApp::spawn().await?;

    let cases = [
        (json!({"email": ""}), "Empty email"),
        (json!({"email": "   ", "name": "A"}), "Blank email"),
        (json!({"name": "A"}), "Missing email"),
        (json!({"email": null}), "Null email"),
        (json!({}), "Empty json"),
    ];

    for (body, description) in cases {
        let res = app.post_submit(&body).await?;
        assert_eq!(
            StatusCode::BAD_REQUEST,
            res.status(),
            "The API did not return a 400 BAD REQUEST for: {description}"
        );
        assert_eq!("Email is required", error_message(res).await?);
    }

    assert_eq!(0, app.store.count().await?);

    Ok(())
}

#[tokio::test]
async fn submit_malformed_body_400() -> Result<()> {
    let app = TestApp::spawn().await?;

    let cases = [
        ("{\"email\": ", "Truncated json"),
        ("not json at all", "Plain text"),
        ("{\"email\": 42}", "Wrong field type"),
        ("\"a@x.com\"", "String instead of object"),
    ];

    for (body, description) in cases {
        let res = app.post_submit_raw(body).await?;
        assert_eq!(
            StatusCode::BAD_REQUEST,
            res.status(),
            "The API did not return a 400 BAD REQUEST for: {description}"
        );
        assert_eq!("Invalid Input", error_message(res).await?);
    }

    assert_eq!(0, app.store.count().await?);

    Ok(())
}

#[tokio::test]
async fn submit_without_json_content_type_created() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .http_client
        .post(format!("http://{}/submit", app.addr))
        .body(r#"{"email": "a@x.com"}"#)
        .send()
        .await?;
    assert_eq!(StatusCode::CREATED, res.status());

    let res = app
        .http_client
        .post(format!("http://{}/submit", app.addr))
        .header("content-type", "text/plain;charset=UTF-8")
        .body(r#"{"email": "b@x.com"}"#)
        .send()
        .await?;
    assert_eq!(StatusCode::CREATED, res.status());

    assert_eq!(2, app.store.count().await?);

    Ok(())
}

#[tokio::test]
async fn submit_requires_name_when_configured() -> Result<()> {
    let app = TestApp::spawn_with(WaitlistConfig {
        require_name: true,
        ..Default::default()
    })
    .await?;

    let res = app.post_submit(&json!({"email": "a@x.com"})).await?;
    assert_eq!(StatusCode::BAD_REQUEST, res.status());
    assert_eq!("Name is required", error_message(res).await?);

    let res = app.post_submit(&json!({})).await?;
    assert_eq!(StatusCode::BAD_REQUEST, res.status());
    assert_eq!("Name and email are required", error_message(res).await?);

    let res = app
        .post_submit(&json!({"email": "a@x.com", "name": "A"}))
        .await?;
    assert_eq!(StatusCode::CREATED, res.status());

    Ok(())
}

#[tokio::test]
async fn submit_store_failure_500() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.store.set_unavailable(true);

    let res = app.post_submit(&json!({"email": "a@x.com"})).await?;
    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, res.status());
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!("Failed to save data", error_message(res).await?);

    app.store.set_unavailable(false);
    assert_eq!(0, app.store.count().await?);

    Ok(())
}

#[tokio::test]
async fn submit_concurrent_same_email_stores_one_entry() -> Result<()> {
    let app = TestApp::spawn().await?;
    let body = json!({"email": "race@x.com", "name": "Racer"});

    let mut requests = JoinSet::new();
    for _ in 0..20 {
        let http_client = app.http_client.clone();
        let url = format!("http://{}/submit", app.addr);
        let body = body.clone();
        requests.spawn(async move { http_client.post(url).json(&body).send().await });
    }

    let (mut created, mut conflicts) = (0, 0);
    while let Some(res) = requests.join_next().await {
        match res??.status() {
            StatusCode::CREATED => created += 1,
            StatusCode::CONFLICT => conflicts += 1,
            other => anyhow::bail!("unexpected status: {other}"),
        }
    }

    assert_eq!(1, created);
    assert_eq!(19, conflicts);
    assert_eq!(1, app.store.count().await?);

    Ok(())
}
