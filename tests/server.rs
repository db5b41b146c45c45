//! End-to-end tests against a live server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, StatusCode};
use futures_util::FutureExt;
use serde_json::{json, Value};

use pistachio::config::parse_config;
use pistachio::error::PistachioError;
use pistachio::pipeline::{from_fn, Middleware, MiddlewareFuture, Next};
use pistachio::routing::{HandlerSpec, MethodHandler};
use pistachio::{action, sync_action, Capabilities, Outcome, PistachioConfig, Reply, Request, Response};

mod common;

fn users_config() -> PistachioConfig {
    parse_config(
        r#"
        [routes]
        "/users" = { get = "listUsers", post = ["requireName", "createUser"] }
        "/users/:id" = "getUser"
        "/users/:id/raw" = "rawUser"
        "/search" = "search"
        "/ghost" = "notRegistered"
        "/teapot" = "brew"
        "/weird" = "weird"
        "#,
    )
    .unwrap()
}

fn users_capabilities() -> Capabilities {
    Capabilities::new()
        .with_action(
            "listUsers",
            sync_action(|_, _| Ok(Reply::new(json!([{"id": "1"}, {"id": "2"}])).into())),
        )
        .with_action(
            "requireName",
            sync_action(|req, _| {
                let body: Value = req.body.json().unwrap_or(Value::Null);
                Ok(body.get("name").is_some().into())
            }),
        )
        .with_action(
            "createUser",
            action(|req: Arc<Request>, _| async move {
                let body: Value = req.body.json().map_err(|_| PistachioError::BadRequest)?;
                Ok::<Outcome, PistachioError>(
                    Reply::new(json!({ "name": body["name"] }))
                        .code(201)
                        .header("location", "/users/3")
                        .into(),
                )
            }),
        )
        .with_action(
            "getUser",
            sync_action(|req, _| Ok(Reply::new(json!({ "id": req.param("id") })).into())),
        )
        .with_action(
            "rawUser",
            sync_action(|req, _| Ok(json!({ "id": req.param("id"), "code": 202 }).into())),
        )
        .with_action(
            "search",
            sync_action(|req, _| Ok(Reply::new(json!(req.query)).into())),
        )
        .with_action("brew", sync_action(|_, _| Err(PistachioError::raise("Teapot"))))
        .with_action("weird", sync_action(|_, _| Err(PistachioError::raise("SomethingOdd"))))
}

async fn get_json(server: &common::TestServer, path: &str) -> (StatusCode, Value) {
    let response = server.client.get(server.url(path)).send().await.unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_builtin_routes() {
    let server = common::spawn(PistachioConfig::default(), Capabilities::new()).await;

    for (path, message) in [("/health", "HEALTH"), ("/info", "INFO"), ("/map", "MAP")] {
        let response = server.client.delete(server.url(path)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{path}");
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(response.headers()["content-type"], "application/json");
        let body: Value = response.json().await.unwrap();
        assert_eq!(
            body,
            json!({"data": [{"message": message}], "errors": [], "meta": {}})
        );
    }

    server.running.stop(|| {}).await.unwrap();
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let server = common::spawn(PistachioConfig::default(), Capabilities::new()).await;
    let response = server
        .client
        .get(server.url("/health"))
        .header("x-request-id", "abc-123")
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");
    server.running.stop(|| {}).await.unwrap();
}

#[tokio::test]
async fn test_crud_routes() {
    let server = common::spawn(users_config(), users_capabilities()).await;

    let (status, body) = get_json(&server, "/users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([{"id": "1"}, {"id": "2"}]));

    let (status, body) = get_json(&server, "/users/42").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({"id": "42"}));

    let (status, body) = get_json(&server, "/users/42/raw").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({"id": "42", "code": 202}));

    let response = server
        .client
        .post(server.url("/users"))
        .json(&json!({"name": "ada"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.headers()["location"], "/users/3");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"], json!({"name": "ada"}));

    let response = server
        .client
        .post(server.url("/users"))
        .json(&json!({"nickname": "ada"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    server.running.stop(|| {}).await.unwrap();
}

#[tokio::test]
async fn test_query_string() {
    let server = common::spawn(users_config(), users_capabilities()).await;
    let (_, body) = get_json(&server, "/search?q=a&q=b&flag").await;
    assert_eq!(body["data"], json!({"q": "b", "flag": null}));
    server.running.stop(|| {}).await.unwrap();
}

#[tokio::test]
async fn test_error_paths() {
    let server = common::spawn(users_config(), users_capabilities()).await;

    let (status, body) = get_json(&server, "/nowhere").await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(body, json!({"data": [], "errors": ["Not Implemented"], "meta": {}}));

    let (status, _) = get_json(&server, "/ghost").await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);

    let response = server.client.put(server.url("/users")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);

    let (status, body) = get_json(&server, "/teapot").await;
    assert_eq!(status, StatusCode::IM_A_TEAPOT);
    assert_eq!(body["errors"], json!(["I'm a teapot"]));

    let (status, body) = get_json(&server, "/weird").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["errors"], json!(["Bad Gateway"]));

    server.running.stop(|| {}).await.unwrap();
}

#[tokio::test]
async fn test_catch_all_wins_over_method() {
    let mut config = PistachioConfig::default();
    config.routes.insert(
        "/things",
        HandlerSpec::any(MethodHandler::from("anything")).on("get", MethodHandler::from("getOnly")),
    );
    let caps = Capabilities::new()
        .with_action("anything", sync_action(|_, _| Ok(Reply::new("any").into())))
        .with_action("getOnly", sync_action(|_, _| Ok(Reply::new("get").into())));
    let server = common::spawn(config, caps).await;

    let (_, body) = get_json(&server, "/things").await;
    assert_eq!(body["data"], "any");

    server.running.stop(|| {}).await.unwrap();
}

struct Timing;

impl Middleware for Timing {
    fn handle(&self, response: Response, next: Next) -> MiddlewareFuture {
        async move {
            tokio::task::yield_now().await;
            response.insert_header("x-timed", HeaderValue::from_static("1"));
            next.proceed();
            Ok(())
        }
        .boxed()
    }
}

#[tokio::test]
async fn test_middleware_chain() {
    #[derive(Clone)]
    struct Tenant(String);

    let mut config = PistachioConfig::default();
    config.routes.insert("/tenant", HandlerSpec::single("tenant"));
    let caps = Capabilities::new()
        .with_middleware(Arc::new(Timing))
        .with_middleware(from_fn(|req, _| {
            let tenant = req.header("x-tenant").unwrap_or("public").to_string();
            req.extensions.insert(Tenant(tenant));
            Ok(())
        }))
        .with_middleware(from_fn(|req, _| match req.header("x-tenant") {
            Some("banned") => Err(PistachioError::raise("Forbidden")),
            _ => Ok(()),
        }))
        .with_action(
            "tenant",
            sync_action(|req, _| {
                let tenant = req.extensions.get::<Tenant>().map(|t| t.0.clone());
                Ok(Reply::new(json!({ "tenant": tenant })).into())
            }),
        );
    let server = common::spawn(config, caps).await;

    let response = server
        .client
        .get(server.url("/tenant"))
        .header("x-tenant", "acme")
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers()["x-timed"], "1");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"], json!({"tenant": "acme"}));

    let response = server
        .client
        .get(server.url("/tenant"))
        .header("x-tenant", "banned")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(response.headers()["x-timed"], "1");

    server.running.stop(|| {}).await.unwrap();
}

#[tokio::test]
async fn test_custom_answer_renderer() {
    let mut config = PistachioConfig::default();
    config.content_type = "text/plain".into();
    config.answers.insert("/health", "text".to_string());
    let caps = Capabilities::new().with_renderer(
        "text",
        Arc::new(|data: &Value, errors: &[String], _: &Value| -> Result<String, PistachioError> {
            Ok(format!("{} {}", data, errors.len()))
        }),
    );
    let server = common::spawn(config, caps).await;

    let response = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(response.headers()["content-type"], "text/plain");
    assert_eq!(response.text().await.unwrap(), r#"[{"message":"HEALTH"}] 0"#);

    let response = server.client.get(server.url("/info")).send().await.unwrap();
    let body: Value = serde_json::from_str(&response.text().await.unwrap()).unwrap();
    assert_eq!(body["data"], json!([{"message": "INFO"}]));

    server.running.stop(|| {}).await.unwrap();
}

#[tokio::test]
async fn test_leftover_actions_run_after_response() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut config = PistachioConfig::default();
    config.routes.insert("/audit", HandlerSpec::list(["answer", "audit"]));
    let audit = {
        let counter = Arc::clone(&counter);
        sync_action(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Outcome::Continue)
        })
    };
    let caps = Capabilities::new()
        .with_action("answer", sync_action(|_, _| Ok(Reply::new("ok").into())))
        .with_action("audit", audit);
    let server = common::spawn(config, caps).await;

    let (status, body) = get_json(&server, "/audit").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], "ok");

    tokio::time::timeout(Duration::from_secs(2), async {
        while counter.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();

    server.running.stop(|| {}).await.unwrap();
}

#[tokio::test]
async fn test_stop_invokes_callback_and_closes_listener() {
    let server = common::spawn(PistachioConfig::default(), Capabilities::new()).await;
    let url = server.url("/health");
    let stopped = Arc::new(AtomicUsize::new(0));

    let flag = Arc::clone(&stopped);
    server
        .running
        .stop(move || {
            flag.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();

    assert_eq!(stopped.load(Ordering::SeqCst), 1);
    assert!(server.client.get(url).send().await.is_err());
}

struct AuditLog(Arc<AtomicUsize>);

impl Middleware for AuditLog {
    fn handle(&self, _response: Response, next: Next) -> MiddlewareFuture {
        let entries = Arc::clone(&self.0);
        async move {
            next.proceed();
            tokio::time::sleep(Duration::from_millis(20)).await;
            entries.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        .boxed()
    }
}

#[tokio::test]
async fn test_middleware_work_after_next_completes() {
    let entries = Arc::new(AtomicUsize::new(0));
    let caps = Capabilities::new().with_middleware(Arc::new(AuditLog(Arc::clone(&entries))));
    let server = common::spawn(PistachioConfig::default(), caps).await;

    let (status, _) = get_json(&server, "/health").await;
    assert_eq!(status, StatusCode::OK);

    tokio::time::timeout(Duration::from_secs(2), async {
        while entries.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();

    server.running.stop(|| {}).await.unwrap();
}
