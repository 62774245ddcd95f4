use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Duration;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use server::auth_client::LocalTokenVerifier;
use server::routes::build_content_router;
use server::state::ContentState;
use service::article::repository::mock::MockArticleRepository;
use service::article::ArticleService;
use service::auth::TokenManager;
use service::cache::memory::MemoryCache;
use service::cache::ContentCache;
use service::events::{EventBus, RecordingPublisher, TOPIC_ARTICLES, TOPIC_PROJECTS};
use service::pagination::MAX_PAGE;
use service::portfolio::repository::mock::MockPortfolioRepository;
use service::portfolio::PortfolioService;
use service::project::repository::mock::MockProjectRepository;
use service::project::ProjectService;

struct Harness {
    app: Router,
    events: Arc<RecordingPublisher>,
    admin_id: Uuid,
    admin_token: String,
    user_token: String,
}

fn harness() -> Harness {
    let tokens = TokenManager::new("content-secret", Duration::minutes(15), Duration::hours(168));
    let admin_id = Uuid::new_v4();
    let admin_token = tokens.issue_access(admin_id, "admin").unwrap();
    let user_token = tokens.issue_access(Uuid::new_v4(), "user").unwrap();

    let cache: Arc<dyn ContentCache> = Arc::new(MemoryCache::default());
    let events = Arc::new(RecordingPublisher::default());
    let bus = EventBus::new(events.clone(), "backend");

    let state = ContentState {
        articles: Arc::new(ArticleService::new(Arc::new(MockArticleRepository::default()), cache.clone(), bus.clone())),
        projects: Arc::new(ProjectService::new(Arc::new(MockProjectRepository::default()), cache, bus)),
        portfolio: Arc::new(PortfolioService::new(Arc::new(MockPortfolioRepository::default()))),
        verifier: Arc::new(LocalTokenVerifier::new(tokens)),
    };
    Harness { app: build_content_router(state), events, admin_id, admin_token, user_token }
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>, bearer: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = bearer {
        builder = builder.header("authorization", format!("Bearer {t}"));
    }
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&b).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn article(slug: &str, published: bool) -> Value {
    json!({
        "title": format!("Article {slug}"),
        "slug": slug,
        "excerpt": "short",
        "content": "body text",
        "published": published,
    })
}

#[tokio::test]
async fn admin_gate_rejects_missing_malformed_and_non_admin_tokens() {
    let h = harness();
    let uri = "/api/v1/admin/articles";

    let (status, body) = call(&h.app, "POST", uri, Some(article("a", true)), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "authorization header required");

    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", "Token abc")
        .header("content-type", "application/json")
        .body(Body::from(article("a", true).to_string()))
        .unwrap();
    let resp = h.app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let (status, body) = call(&h.app, "POST", uri, Some(article("a", true)), Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid token");

    let (status, body) = call(&h.app, "POST", uri, Some(article("a", true)), Some(&h.user_token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "admin role required");

    assert!(h.events.events().is_empty());
}

#[tokio::test]
async fn article_lifecycle_through_admin_and_public_routes() {
    let h = harness();
    let admin = Some(h.admin_token.as_str());

    let (status, created) = call(&h.app, "POST", "/api/v1/admin/articles", Some(article("first-post", true)), admin).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["author_id"], h.admin_id.to_string());
    assert!(created["published_at"].is_string());
    let id = created["id"].as_str().unwrap().to_string();

    let (status, list) = call(&h.app, "GET", "/api/v1/articles", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["pagination"]["total"], 1);
    assert_eq!(list["data"][0]["slug"], "first-post");
    assert!(list["data"][0].get("content").is_none());

    let (status, by_slug) = call(&h.app, "GET", "/api/v1/articles/slug/first-post", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_slug["id"], id.as_str());

    let (status, updated) = call(&h.app, "PUT", &format!("/api/v1/admin/articles/{id}"),
        Some(json!({"title": "Renamed"})), admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Renamed");
    assert_eq!(updated["content"], "body text");

    let (status, fetched) = call(&h.app, "GET", &format!("/api/v1/articles/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Renamed");

    let (status, body) = call(&h.app, "DELETE", &format!("/api/v1/admin/articles/{id}"), None, admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Article deleted successfully");

    assert_eq!(call(&h.app, "GET", &format!("/api/v1/articles/{id}"), None, None).await.0, StatusCode::NOT_FOUND);
    assert_eq!(call(&h.app, "GET", "/api/v1/articles/slug/first-post", None, None).await.0, StatusCode::NOT_FOUND);
    let (_, list) = call(&h.app, "GET", "/api/v1/articles", None, None).await;
    assert_eq!(list["pagination"]["total"], 0);

    let recorded: Vec<(String, String)> = h
        .events
        .events()
        .into_iter()
        .map(|(topic, e)| (topic, e.event_type))
        .collect();
    assert_eq!(
        recorded,
        vec![
            (TOPIC_ARTICLES.to_string(), "article.created".to_string()),
            (TOPIC_ARTICLES.to_string(), "article.updated".to_string()),
            (TOPIC_ARTICLES.to_string(), "article.deleted".to_string()),
        ]
    );
}

#[tokio::test]
async fn article_validation_and_missing_rows() {
    let h = harness();
    let admin = Some(h.admin_token.as_str());

    let (status, _) = call(&h.app, "POST", "/api/v1/admin/articles", Some(article("Bad Slug", true)), admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(call(&h.app, "POST", "/api/v1/admin/articles", Some(article("taken", false)), admin).await.0, StatusCode::CREATED);
    let (status, body) = call(&h.app, "POST", "/api/v1/admin/articles", Some(article("taken", false)), admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "slug already exists");

    // drafts stay out of public listings and slug lookups
    let (_, list) = call(&h.app, "GET", "/api/v1/articles", None, None).await;
    assert_eq!(list["pagination"]["total"], 0);
    assert_eq!(call(&h.app, "GET", "/api/v1/articles/slug/taken", None, None).await.0, StatusCode::NOT_FOUND);

    assert_eq!(call(&h.app, "GET", "/api/v1/articles/not-a-uuid", None, None).await.0, StatusCode::BAD_REQUEST);
    let missing = Uuid::new_v4();
    assert_eq!(call(&h.app, "GET", &format!("/api/v1/articles/{missing}"), None, None).await.0, StatusCode::NOT_FOUND);
    assert_eq!(
        call(&h.app, "PUT", &format!("/api/v1/admin/articles/{missing}"), Some(json!({"title": "x"})), admin).await.0,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        call(&h.app, "DELETE", &format!("/api/v1/admin/articles/{missing}"), None, admin).await.0,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn list_pagination_is_clamped() {
    let h = harness();
    let admin = Some(h.admin_token.as_str());
    for i in 0..3 {
        let slug = format!("post-{i}");
        assert_eq!(call(&h.app, "POST", "/api/v1/admin/articles", Some(article(&slug, true)), admin).await.0, StatusCode::CREATED);
    }

    let (status, page) = call(&h.app, "GET", "/api/v1/articles?page=2&limit=2", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["data"].as_array().unwrap().len(), 1);
    assert_eq!(page["pagination"], json!({"page": 2, "limit": 2, "total": 3, "total_pages": 2}));

    let (_, page) = call(&h.app, "GET", "/api/v1/articles?page=-3&limit=1000", None, None).await;
    assert_eq!(page["pagination"]["page"], 1);
    assert_eq!(page["pagination"]["limit"], 100);

    let (_, page) = call(&h.app, "GET", "/api/v1/articles", None, None).await;
    assert_eq!(page["pagination"]["limit"], 10);
}

#[tokio::test]
async fn malformed_pagination_falls_back_instead_of_rejecting() {
    let h = harness();
    let admin = Some(h.admin_token.as_str());
    assert_eq!(call(&h.app, "POST", "/api/v1/admin/articles", Some(article("only-post", true)), admin).await.0, StatusCode::CREATED);

    for (uri, page, limit) in [
        ("/api/v1/articles?limit=99999999999999999999", 1, 100),
        ("/api/v1/articles?limit=", 1, 10),
        ("/api/v1/articles?limit=abc", 1, 10),
        ("/api/v1/articles?page=abc&limit=5", 1, 5),
        ("/api/v1/articles?page=&limit=-1", 1, 1),
        ("/api/v1/projects?page=99999999999999999999&limit=zz", MAX_PAGE, 10),
    ] {
        let (status, body) = call(&h.app, "GET", uri, None, None).await;
        assert_eq!(status, StatusCode::OK, "{uri}: {body}");
        assert_eq!(body["pagination"]["page"], page, "{uri}");
        assert_eq!(body["pagination"]["limit"], limit, "{uri}");
    }
}

#[tokio::test]
async fn projects_crud_and_featured_filter() {
    let h = harness();
    let admin = Some(h.admin_token.as_str());

    let (status, featured) = call(&h.app, "POST", "/api/v1/admin/projects", Some(json!({
        "name": "Gateway",
        "description": "API gateway",
        "github_url": "https://github.com/me/gateway",
        "technologies": ["Rust", "Axum"],
        "featured": true,
    })), admin).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(featured["technologies"], json!(["Rust", "Axum"]));
    let id = featured["id"].as_str().unwrap().to_string();

    assert_eq!(call(&h.app, "POST", "/api/v1/admin/projects", Some(json!({"name": "Side"})), admin).await.0, StatusCode::CREATED);
    let (status, _) = call(&h.app, "POST", "/api/v1/admin/projects",
        Some(json!({"name": "Broken", "live_url": "ftp://nope"})), admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, all) = call(&h.app, "GET", "/api/v1/projects", None, None).await;
    assert_eq!(all["pagination"]["total"], 2);
    let (_, only) = call(&h.app, "GET", "/api/v1/projects?featured=true", None, None).await;
    assert_eq!(only["pagination"]["total"], 1);
    assert_eq!(only["data"][0]["name"], "Gateway");

    let (status, updated) = call(&h.app, "PUT", &format!("/api/v1/admin/projects/{id}"),
        Some(json!({"featured": false})), admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["featured"], false);
    assert_eq!(updated["name"], "Gateway");
    let (_, only) = call(&h.app, "GET", "/api/v1/projects?featured=true", None, None).await;
    assert_eq!(only["pagination"]["total"], 0);

    let (status, body) = call(&h.app, "DELETE", &format!("/api/v1/admin/projects/{id}"), None, admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Project deleted successfully");
    assert_eq!(call(&h.app, "GET", &format!("/api/v1/projects/{id}"), None, None).await.0, StatusCode::NOT_FOUND);

    let topics: Vec<String> = h.events.events().into_iter().map(|(t, _)| t).collect();
    assert!(topics.iter().all(|t| t == TOPIC_PROJECTS));
    assert_eq!(h.events.event_types().last().map(String::as_str), Some("project.deleted"));
}

#[tokio::test]
async fn portfolio_upsert_then_read() {
    let h = harness();
    let admin = Some(h.admin_token.as_str());

    assert_eq!(call(&h.app, "GET", "/api/v1/portfolio", None, None).await.0, StatusCode::NOT_FOUND);

    let payload = json!({
        "name": "Jane Doe",
        "title": "Backend Engineer",
        "bio": "Builds services",
        "email": "jane@example.com",
        "social_links": {"github": "https://github.com/jane"},
    });
    assert_eq!(call(&h.app, "PUT", "/api/v1/admin/portfolio", Some(payload.clone()), None).await.0, StatusCode::UNAUTHORIZED);
    let (status, saved) = call(&h.app, "PUT", "/api/v1/admin/portfolio", Some(payload), admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["name"], "Jane Doe");

    let (status, fetched) = call(&h.app, "GET", "/api/v1/portfolio", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], saved["id"]);
    assert_eq!(fetched["social_links"]["github"], "https://github.com/jane");

    let (status, _) = call(&h.app, "PUT", "/api/v1/admin/portfolio", Some(json!({
        "name": "Jane Doe", "title": "t", "bio": "b", "email": "jane@example.com", "settings": [1, 2],
    })), admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn content_router_serves_health_and_docs() {
    let h = harness();
    let (status, body) = call(&h.app, "GET", "/healthz", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, doc) = call(&h.app, "GET", "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/v1/articles"].is_object());
    assert!(doc["paths"]["/api/v1/admin/portfolio"].is_object());
}
