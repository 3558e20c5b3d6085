use super::*;
use axum::{
    extract::Path,
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

async fn spawn_server(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn api_for(server_url: &str, endpoint: DetailEndpoint) -> HttpCatalogApi {
    let mut config = ClientConfig::default().with_base_url(server_url);
    config.detail_endpoint = endpoint;
    let base_url = config.base_url.clone().expect("base url");
    HttpCatalogApi::new(base_url, &config).expect("http client")
}

async fn page_handler(Path(index): Path<u32>) -> Json<Value> {
    if index == 5 {
        return Json(json!({ "users": [], "time_taken": 0.01 }));
    }
    Json(json!({
        "users": [
            { "id": 1, "name": "Ada", "email": "ada@example.com", "role": "Admin" },
            { "id": "b2", "name": "Brian", "email": "brian@example.com", "role": "User", "bio": "hi" }
        ],
        "time_taken": 0.1234
    }))
}

#[tokio::test]
async fn fetch_page_decodes_users_and_latency() {
    let app = Router::new().route("/users/page/:index", get(page_handler));
    let api = api_for(&spawn_server(app).await, DetailEndpoint::Root);

    let page = api.fetch_page(2).await.expect("page");

    assert_eq!(page.index, 2);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].id, UserId::new("1"));
    assert_eq!(page.items[1].bio.as_deref(), Some("hi"));
    assert!((page.server_latency_ms - 0.1234).abs() < f64::EPSILON);
}

#[tokio::test]
async fn empty_page_is_success() {
    let app = Router::new().route("/users/page/:index", get(page_handler));
    let api = api_for(&spawn_server(app).await, DetailEndpoint::Root);

    let page = api.fetch_page(5).await.expect("empty page");

    assert!(page.is_empty());
    assert!((page.server_latency_ms - 0.01).abs() < f64::EPSILON);
}

#[tokio::test]
async fn page_error_status_is_service_rejection() {
    let app = Router::new().route(
        "/users/page/:index",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let api = api_for(&spawn_server(app).await, DetailEndpoint::Root);

    let err = api.fetch_page(1).await.expect_err("must fail");

    assert_eq!(
        err,
        ClientError::rejected(Some(500), "Internal Server Error")
    );
}

#[tokio::test]
async fn unreachable_service_is_network_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let api = api_for(&format!("http://{addr}"), DetailEndpoint::Root);

    let err = api.fetch_page(1).await.expect_err("must fail");

    assert!(matches!(err, ClientError::Network(_)), "unexpected: {err:?}");
    assert!(err.is_connectivity());
}

async fn user_handler(Path(id): Path<String>) -> (StatusCode, Json<Value>) {
    match id.as_str() {
        "1" => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "user": { "id": 1, "name": "Ada", "email": "ada@example.com", "role": "Admin" },
                "time_ms": 0.05
            })),
        ),
        "ghost" => (StatusCode::OK, Json(json!({ "success": false }))),
        _ => (StatusCode::NOT_FOUND, Json(json!({ "success": false }))),
    }
}

#[tokio::test]
async fn fetch_user_from_root_path() {
    let app = Router::new().route("/:id", get(user_handler));
    let api = api_for(&spawn_server(app).await, DetailEndpoint::Root);

    let loaded = api.fetch_user(&UserId::new("1")).await.expect("user");

    assert_eq!(loaded.user.name, "Ada");
    assert!((loaded.server_latency_ms - 0.05).abs() < f64::EPSILON);
}

#[tokio::test]
async fn fetch_user_from_users_path() {
    let app = Router::new().route("/users/:id", get(user_handler));
    let api = api_for(&spawn_server(app).await, DetailEndpoint::Users);

    let loaded = api.fetch_user(&UserId::new("1")).await.expect("user");

    assert_eq!(loaded.user.id, UserId::new("1"));
}

#[tokio::test]
async fn unsuccessful_or_missing_user_is_not_found() {
    let app = Router::new().route("/:id", get(user_handler));
    let api = api_for(&spawn_server(app).await, DetailEndpoint::Root);

    let soft = api.fetch_user(&UserId::new("ghost")).await;
    let hard = api.fetch_user(&UserId::new("404")).await;

    assert_eq!(soft, Err(ClientError::NotFound("ghost".into())));
    assert_eq!(hard, Err(ClientError::NotFound("404".into())));
}

async fn create_handler(Json(draft): Json<NewUser>) -> (StatusCode, Json<Value>) {
    if draft.name == "reject" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "msg": "duplicate email" })),
        );
    }
    (
        StatusCode::CREATED,
        Json(json!({
            "user": {
                "id": "srv-7",
                "name": draft.name.to_uppercase(),
                "email": draft.email,
                "role": "User"
            },
            "time_taken": 0.42
        })),
    )
}

#[tokio::test]
async fn create_user_returns_service_entity() {
    let app = Router::new().route("/users", post(create_handler));
    let api = api_for(&spawn_server(app).await, DetailEndpoint::Root);

    let outcome = api
        .create_user(&NewUser {
            name: "neo".into(),
            email: "neo@example.com".into(),
        })
        .await
        .expect("create");

    assert_eq!(outcome.entity.id, UserId::new("srv-7"));
    assert_eq!(outcome.entity.name, "NEO");
    assert!((outcome.server_latency_ms - 0.42).abs() < f64::EPSILON);
}

#[tokio::test]
async fn create_user_rejection_carries_service_message() {
    let app = Router::new().route("/users", post(create_handler));
    let api = api_for(&spawn_server(app).await, DetailEndpoint::Root);

    let err = api
        .create_user(&NewUser {
            name: "reject".into(),
            email: "x@example.com".into(),
        })
        .await
        .expect_err("must fail");

    assert_eq!(err, ClientError::rejected(Some(400), "duplicate email"));
}

async fn delete_handler(Path(id): Path<String>) -> (StatusCode, Json<Value>) {
    match id.as_str() {
        "locked" => (
            StatusCode::OK,
            Json(json!({ "success": false, "msg": "locked" })),
        ),
        "gone" => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "msg": "no such user" })),
        ),
        _ => (StatusCode::OK, Json(json!({ "success": true }))),
    }
}

#[tokio::test]
async fn delete_user_success_and_rejections() {
    let app = Router::new().route("/users/:id", delete(delete_handler));
    let api = api_for(&spawn_server(app).await, DetailEndpoint::Root);

    api.delete_user(&UserId::new("9")).await.expect("delete");

    let locked = api.delete_user(&UserId::new("locked")).await;
    assert_eq!(locked, Err(ClientError::rejected(Some(200), "locked")));

    let gone = api.delete_user(&UserId::new("gone")).await;
    assert_eq!(gone, Err(ClientError::rejected(Some(404), "no such user")));
}

#[tokio::test]
async fn bodiless_delete_success_counts_as_removed() {
    let app = Router::new()
        .route("/users/no-content", delete(|| async { StatusCode::NO_CONTENT }))
        .route("/users/plain", delete(|| async { (StatusCode::OK, "deleted") }));
    let api = api_for(&spawn_server(app).await, DetailEndpoint::Root);

    assert_eq!(api.delete_user(&UserId::new("no-content")).await, Ok(()));
    assert_eq!(api.delete_user(&UserId::new("plain")).await, Ok(()));
}

#[tokio::test]
async fn missing_catalog_api_reports_config_missing() {
    let api = connect(&ClientConfig::default());

    assert_eq!(api.fetch_page(1).await, Err(ClientError::ConfigMissing));
    assert_eq!(
        api.fetch_user(&UserId::new("1")).await,
        Err(ClientError::ConfigMissing)
    );
    assert_eq!(
        api.delete_user(&UserId::new("1")).await,
        Err(ClientError::ConfigMissing)
    );
}
