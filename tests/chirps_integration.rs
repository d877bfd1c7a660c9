mod common;

use common::{spawn_app, TestApp};
use serde_json::{json, Value};

async fn post_chirp(app: &TestApp, token: &str, body: &str) -> reqwest::Response {
    app.client
        .post(app.url("/api/chirps"))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "body": body }))
        .send()
        .await
        .expect("Failed to execute request.")
}

async fn list(app: &TestApp, query: &str) -> reqwest::Response {
    app.client
        .get(app.url(&format!("/api/chirps{}", query)))
        .send()
        .await
        .expect("Failed to execute request.")
}

#[tokio::test]
async fn create_chirp_returns_201_and_filters_profanity() {
    let app = spawn_app().await;
    let user = app.signed_in_user("walt@breakingbad.com").await;

    let response = post_chirp(&app, &user.token, "What a Kerfuffle this is, sharbert!").await;

    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["body"], "What a **** this is, sharbert!");
    assert_eq!(body["user_id"], user.id.as_str());
}

#[tokio::test]
async fn create_chirp_requires_access_token() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/api/chirps"))
        .json(&json!({ "body": "I am the one who knocks" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn create_chirp_rejects_long_or_empty_body() {
    let app = spawn_app().await;
    let user = app.signed_in_user("walt@breakingbad.com").await;

    let exact = "a".repeat(140);
    assert_eq!(201, post_chirp(&app, &user.token, &exact).await.status().as_u16());

    for body in ["a".repeat(141), String::new(), "   ".to_string()] {
        let response = post_chirp(&app, &user.token, &body).await;
        assert_eq!(400, response.status().as_u16(), "body of length {}", body.len());
    }
}

#[tokio::test]
async fn list_chirps_filters_by_author_and_sorts() {
    let app = spawn_app().await;
    let walt = app.signed_in_user("walt@breakingbad.com").await;
    let jesse = app.signed_in_user("jesse@breakingbad.com").await;

    post_chirp(&app, &walt.token, "first").await;
    post_chirp(&app, &jesse.token, "yo").await;
    post_chirp(&app, &walt.token, "second").await;

    let all: Vec<Value> = list(&app, "").await.json().await.unwrap();
    assert_eq!(3, all.len());

    let walts: Vec<Value> = list(&app, &format!("?author_id={}", walt.id))
        .await
        .json()
        .await
        .unwrap();
    let bodies: Vec<&str> = walts.iter().map(|c| c["body"].as_str().unwrap()).collect();
    assert_eq!(bodies, vec!["first", "second"]);

    let walts_desc: Vec<Value> = list(&app, &format!("?author_id={}&sort=desc", walt.id))
        .await
        .json()
        .await
        .unwrap();
    let bodies: Vec<&str> = walts_desc.iter().map(|c| c["body"].as_str().unwrap()).collect();
    assert_eq!(bodies, vec!["second", "first"]);
}

#[tokio::test]
async fn list_chirps_rejects_bad_query() {
    let app = spawn_app().await;

    assert_eq!(400, list(&app, "?author_id=not-a-uuid").await.status().as_u16());
    assert_eq!(400, list(&app, "?sort=sideways").await.status().as_u16());
}

#[tokio::test]
async fn get_chirp_by_id() {
    let app = spawn_app().await;
    let user = app.signed_in_user("walt@breakingbad.com").await;
    let created: Value = post_chirp(&app, &user.token, "Say my name.")
        .await
        .json()
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap();

    let response = list(&app, &format!("/{}", id)).await;
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["body"], "Say my name.");

    let response = list(&app, &format!("/{}", uuid::Uuid::new_v4())).await;
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn delete_chirp_only_by_author() {
    let app = spawn_app().await;
    let walt = app.signed_in_user("walt@breakingbad.com").await;
    let jesse = app.signed_in_user("jesse@breakingbad.com").await;
    let created: Value = post_chirp(&app, &walt.token, "Say my name.")
        .await
        .json()
        .await
        .unwrap();
    let path = format!("/api/chirps/{}", created["id"].as_str().unwrap());

    let delete = |token: String| {
        let request = app
            .client
            .delete(app.url(&path))
            .header("Authorization", format!("Bearer {}", token));
        async move { request.send().await.expect("Failed to execute request.") }
    };

    assert_eq!(403, delete(jesse.token.clone()).await.status().as_u16());
    assert_eq!(204, delete(walt.token.clone()).await.status().as_u16());
    assert_eq!(404, delete(walt.token.clone()).await.status().as_u16());
}
