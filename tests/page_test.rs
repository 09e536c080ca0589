mod common;

use linkbio::models::{page, Page};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait, PaginatorTrait};
use serde_json::{json, Value};

async fn check_slug(app: &common::TestApp, token: &str, body: Value) -> reqwest::Response {
    app.client
        .post(app.url("/check-slug"))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn check_slug_requires_auth() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/check-slug"))
        .json(&json!({ "slug": "alice" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn check_slug_rejects_bad_input() {
    let app = common::spawn_app().await;
    let (_, token) = common::login_user(&app, "alice@example.com").await;

    for body in [
        json!({}),
        json!({ "slug": 42 }),
        json!({ "slug": "   " }),
        json!({ "slug": "Admin" }),
        json!({ "slug": "500" }),
        json!([]),
        json!("alice"),
    ] {
        let resp = check_slug(&app, &token, body.clone()).await;
        assert_eq!(resp.status(), 400, "{body}");
        let body: Value = resp.json().await.unwrap();
        assert!(body["error"].is_string());
    }

    for (content_type, raw) in [
        ("application/json", "{not json"),
        ("text/plain", r#"{"slug":"alice"}"#),
    ] {
        let resp = app
            .client
            .post(app.url("/check-slug"))
            .bearer_auth(&token)
            .header("Content-Type", content_type)
            .body(raw)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400, "{content_type} / {raw}");
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "Invalid slug");
    }
}

#[tokio::test]
async fn check_slug_reports_availability() {
    let app = common::spawn_app().await;
    let (_, alice) = common::login_user(&app, "alice@example.com").await;
    let (_, bob) = common::login_user(&app, "bob@example.com").await;

    let resp = check_slug(&app, &bob, json!({ "slug": "  Alice " })).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"], json!({ "available": true, "slug": "alice" }));

    let resp = common::save_page(
        &app,
        &alice,
        json!({ "slug": "alice", "config": common::page_config("Alice", 1) }),
    )
    .await;
    assert_eq!(resp.status(), 200);

    // Taken for everyone, the owner included.
    for token in [&alice, &bob] {
        let body: Value = check_slug(&app, token, json!({ "slug": "ALICE" }))
            .await
            .json()
            .await
            .unwrap();
        assert_eq!(body["data"]["available"], false);
    }
}

#[tokio::test]
async fn save_creates_then_updates_in_place() {
    let app = common::spawn_app().await;
    let (user_id, token) = common::login_user(&app, "alice@example.com").await;

    let resp = common::save_page(
        &app,
        &token,
        json!({
            "slug": "Alice Smith!",
            "title": "",
            "config": common::page_config("Alice", 2)
        }),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["slug"], "alice-smith");
    assert_eq!(body["data"]["is_published"], true);
    assert!(body["data"]["title"].is_null());
    let page_id = body["data"]["id"].as_i64().unwrap();

    let resp = common::save_page(
        &app,
        &token,
        json!({
            "slug": "alice-smith",
            "title": "My links",
            "description": "Everything I do",
            "config": common::page_config("Alice S.", 3)
        }),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["id"].as_i64().unwrap(), page_id);
    assert_eq!(body["data"]["title"], "My links");

    assert_eq!(Page::find().count(&app.db).await.unwrap(), 1);
    let stored = Page::find_by_id(page_id as i32)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.user_id, user_id);
    assert_eq!(stored.config["profile"]["name"], "Alice S.");
    assert_eq!(stored.config["components"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn saving_republishes_a_hidden_page() {
    let app = common::spawn_app().await;
    let (_, token) = common::login_user(&app, "alice@example.com").await;

    common::save_page(
        &app,
        &token,
        json!({ "slug": "alice", "config": common::page_config("Alice", 1) }),
    )
    .await;

    let stored = Page::find().one(&app.db).await.unwrap().unwrap();
    let mut active: page::ActiveModel = stored.into();
    active.is_published = Set(false);
    active.update(&app.db).await.unwrap();

    let resp = app.client.get(app.url("/pages/alice")).send().await.unwrap();
    assert_eq!(resp.status(), 404);

    common::save_page(
        &app,
        &token,
        json!({ "slug": "alice", "config": common::page_config("Alice", 1) }),
    )
    .await;
    let resp = app.client.get(app.url("/pages/alice")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn slug_owned_by_another_user_conflicts() {
    let app = common::spawn_app().await;
    let (_, alice) = common::login_user(&app, "alice@example.com").await;
    let (_, bob) = common::login_user(&app, "bob@example.com").await;

    let resp = common::save_page(
        &app,
        &alice,
        json!({ "slug": "links", "config": common::page_config("Alice", 1) }),
    )
    .await;
    assert_eq!(resp.status(), 200);

    let resp = common::save_page(
        &app,
        &bob,
        json!({ "slug": "Links", "config": common::page_config("Bob", 1) }),
    )
    .await;
    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Slug is already taken");

    // Alice's page is untouched.
    let body: Value = app
        .client
        .get(app.url("/pages/links"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["config"]["profile"]["name"], "Alice");
}

#[tokio::test]
async fn save_rejects_invalid_documents() {
    let app = common::spawn_app().await;
    let (_, token) = common::login_user(&app, "alice@example.com").await;

    let too_many = common::save_page(
        &app,
        &token,
        json!({ "slug": "alice", "config": common::page_config("Alice", 4) }),
    )
    .await;
    assert_eq!(too_many.status(), 400);

    let reserved = common::save_page(
        &app,
        &token,
        json!({ "slug": "dashboard", "config": common::page_config("Alice", 1) }),
    )
    .await;
    assert_eq!(reserved.status(), 400);

    let no_letters = common::save_page(
        &app,
        &token,
        json!({ "slug": "--!!--", "config": common::page_config("Alice", 1) }),
    )
    .await;
    assert_eq!(no_letters.status(), 400);

    assert_eq!(Page::find().count(&app.db).await.unwrap(), 0);
}

#[tokio::test]
async fn save_requires_auth() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .put(app.url("/pages"))
        .json(&json!({ "slug": "alice", "config": common::page_config("Alice", 1) }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn public_page_is_ordered_and_themed() {
    let app = common::spawn_app().await;
    let (user_id, token) = common::login_user(&app, "alice@example.com").await;

    let config = json!({
        "profile": { "name": "Alice" },
        "components": [
            { "id": "b", "order": 2, "type": "text", "content": "Hi", "size": "large" },
            { "id": "a", "order": 0, "type": "social", "platform": "github", "username": "alice" },
            { "id": "c", "order": 1, "type": "button", "text": "Go", "url": "https://x.com", "variant": "outline" }
        ],
        "theme": { "backgroundColor": "bg-black" }
    });
    let resp = common::save_page(&app, &token, json!({ "slug": "alice", "config": config })).await;
    assert_eq!(resp.status(), 200);

    let resp = app.client.get(app.url("/pages/Alice")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let data = &body["data"];

    let ids: Vec<&str> = data["config"]["components"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["a", "c", "b"]);

    assert_eq!(data["theme"]["backgroundColor"], "bg-black");
    assert_eq!(data["theme"]["textColor"], "text-foreground");
    assert_eq!(data["theme"]["fontFamily"], "inherit");

    assert_eq!(data["owner"]["id"].as_i64().unwrap() as i32, user_id);
    assert_eq!(data["owner"]["name"], "alice");
    assert_eq!(data["meta"]["title"], "alice's Page");
    assert_eq!(data["meta"]["description"], "Visit alice's link in bio page");
}

#[tokio::test]
async fn unknown_page_is_not_found() {
    let app = common::spawn_app().await;

    let resp = app.client.get(app.url("/pages/ghost")).send().await.unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn dashboard_lists_only_own_pages() {
    let app = common::spawn_app().await;
    let (_, alice) = common::login_user(&app, "alice@example.com").await;
    let (_, bob) = common::login_user(&app, "bob@example.com").await;

    for slug in ["first", "second"] {
        common::save_page(
            &app,
            &alice,
            json!({ "slug": slug, "config": common::page_config("Alice", 0) }),
        )
        .await;
    }
    common::save_page(
        &app,
        &bob,
        json!({ "slug": "bobs", "config": common::page_config("Bob", 0) }),
    )
    .await;

    let resp = app
        .client
        .get(app.url("/pages"))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let slugs: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, ["second", "first"]);
}

#[tokio::test]
async fn unreadable_stored_config_fails_without_details() {
    let app = common::spawn_app().await;
    let (_, token) = common::login_user(&app, "alice@example.com").await;
    common::save_page(
        &app,
        &token,
        json!({ "slug": "alice", "config": common::page_config("Alice", 1) }),
    )
    .await;

    let stored = Page::find().one(&app.db).await.unwrap().unwrap();
    let mut active: page::ActiveModel = stored.into();
    active.config = Set(json!({ "components": "not a list" }));
    active.update(&app.db).await.unwrap();

    let resp = app.client.get(app.url("/pages/alice")).send().await.unwrap();
    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Internal server error" }));
}
