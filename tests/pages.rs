//! End-to-end tests: register page modules on a router and drive requests
//! through it.

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{header::CONTENT_TYPE, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use magnet_metal::{
    is_page_module, register, register_all, Layout, LoadedModule, MagnetContext, PageComponent,
    PageError, RegisterError, ResponseCommitted,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

struct Home {
    loads: Arc<AtomicUsize>,
}

#[async_trait]
impl PageComponent for Home {
    fn name(&self) -> &str {
        "Home"
    }

    fn render(&self, state: &Value) -> Result<String, PageError> {
        Ok(format!("<div>count is {}</div>", state["count"]))
    }

    async fn initial_state(&self, _req: &Parts) -> Result<Option<Value>, PageError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Some(json!({"count": 1})))
    }
}

/// Page with no state loader and no custom layout.
struct Plain;

#[async_trait]
impl PageComponent for Plain {
    fn name(&self) -> &str {
        "Plain"
    }

    fn render(&self, _state: &Value) -> Result<String, PageError> {
        Ok("<p>static</p>".to_string())
    }
}

struct CustomLayout;

#[async_trait]
impl PageComponent for CustomLayout {
    fn name(&self) -> &str {
        "CustomLayout"
    }

    fn render(&self, _state: &Value) -> Result<String, PageError> {
        Ok("<main>inner</main>".to_string())
    }

    async fn render_layout(
        &self,
        _req: &Parts,
        content: &str,
        _state: &Value,
    ) -> Result<Layout, PageError> {
        Ok(Layout::Html(format!("<html><body id=\"custom\">{}</body></html>", content)))
    }
}

struct BadLayout;

#[async_trait]
impl PageComponent for BadLayout {
    fn name(&self) -> &str {
        "BadLayout"
    }

    fn render(&self, _state: &Value) -> Result<String, PageError> {
        Ok(String::new())
    }

    async fn render_layout(
        &self,
        _req: &Parts,
        _content: &str,
        _state: &Value,
    ) -> Result<Layout, PageError> {
        Ok(Layout::Value(json!(42)))
    }
}

struct FailingLoader;

#[async_trait]
impl PageComponent for FailingLoader {
    fn name(&self) -> &str {
        "FailingLoader"
    }

    fn render(&self, _state: &Value) -> Result<String, PageError> {
        Ok(String::new())
    }

    async fn initial_state(&self, _req: &Parts) -> Result<Option<Value>, PageError> {
        Err(PageError::upstream("backend unavailable"))
    }
}

fn ctx() -> MagnetContext {
    MagnetContext::new("/dist", "/dist/assets")
}

fn page_module(file: &str, route: Value, component: Arc<dyn PageComponent>) -> LoadedModule {
    LoadedModule::new(file, Some(route), Some(component))
}

fn home_module(loads: &Arc<AtomicUsize>) -> LoadedModule {
    page_module(
        "/dist/pages/home.js",
        json!({"path": "/home"}),
        Arc::new(Home {
            loads: loads.clone(),
        }),
    )
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str) -> Request {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_json(uri: &str) -> Request {
    Request::builder()
        .uri(uri)
        .header(CONTENT_TYPE, "Application/JSON; charset=utf-8")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn html_response_has_doctype_scripts_and_bootstrap() {
    let loads = Arc::new(AtomicUsize::new(0));
    let app = register(&home_module(&loads), &ctx(), Router::new()).unwrap();

    let response = app.oneshot(get("/home")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[CONTENT_TYPE].to_str().unwrap(),
        "text/html; charset=utf-8"
    );

    let body = body_string(response).await;
    assert!(body.starts_with("<!DOCTYPE html>"));
    assert!(body.contains("<div>count is 1</div>"));
    assert_eq!(body.matches("<script src=").count(), 3);

    let common = body.find("<script src=\"/.metal/common.js\"></script>").unwrap();
    let render = body.find("<script src=\"/.metal/render.js\"></script>").unwrap();
    let bundle = body.find("<script src=\"/.metal/pages/home.js\"></script>").unwrap();
    let inline = body.find("__MAGNET_METAL_PAGE__ = 'Home';").unwrap();
    assert!(common < render && render < bundle && bundle < inline);
    assert!(body.contains("__MAGNET_METAL_STATE__ = {\"count\":1};"));
    assert!(body.contains("__MAGNET_METAL_RENDER__(__MAGNET_METAL_PAGE__, __MAGNET_METAL_STATE__);"));
}

#[tokio::test]
async fn json_request_gets_state_without_markup() {
    let loads = Arc::new(AtomicUsize::new(0));
    let app = register(&home_module(&loads), &ctx(), Router::new()).unwrap();

    let response = app.oneshot(get_json("/home")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert_eq!(body, "{\"count\":1}");
}

#[tokio::test]
async fn page_without_loader_serves_null_state() {
    let module = page_module("/dist/plain.js", json!({"path": "/plain"}), Arc::new(Plain));
    let app = register(&module, &ctx(), Router::new()).unwrap();

    let body = body_string(app.clone().oneshot(get_json("/plain")).await.unwrap()).await;
    assert_eq!(body, "null");

    let body = body_string(app.oneshot(get("/plain")).await.unwrap()).await;
    assert!(body.contains("__MAGNET_METAL_STATE__ = null;"));
    assert!(body.contains("<p>static</p>"));
}

#[tokio::test]
async fn custom_layout_replaces_builtin_shell() {
    let module = page_module(
        "/dist/custom.js",
        json!({"path": "/custom"}),
        Arc::new(CustomLayout),
    );
    let app = register(&module, &ctx(), Router::new()).unwrap();

    let body = body_string(app.oneshot(get("/custom")).await.unwrap()).await;
    assert!(body.contains("<body id=\"custom\"><main>inner</main></body>"));
    assert!(!body.contains("<meta charset=\"UTF-8\"/>"));
}

#[tokio::test]
async fn unsupported_layout_is_forwarded_not_fatal() {
    let module = page_module("/dist/bad.js", json!({"path": "/bad"}), Arc::new(BadLayout));
    let app = register(&module, &ctx(), Router::new()).unwrap();

    let response = app.clone().oneshot(get("/bad")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_string(response).await;
    assert!(body.contains("only string or markup-tree layouts"));

    // The route keeps serving after a failed request.
    let response = app.oneshot(get("/bad")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn state_loader_errors_reach_the_error_pipeline() {
    let module = page_module(
        "/dist/fail.js",
        json!({"path": "/fail"}),
        Arc::new(FailingLoader),
    );
    let app = register(&module, &ctx(), Router::new()).unwrap();

    let response = app.oneshot(get("/fail")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_string(response).await;
    assert!(body.contains("backend unavailable"));
}

#[tokio::test]
async fn committed_requests_do_no_work() {
    let loads = Arc::new(AtomicUsize::new(0));
    let app = register(&home_module(&loads), &ctx(), Router::new()).unwrap();

    let mut request = get("/home");
    request.extensions_mut().insert(ResponseCommitted);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(loads.load(Ordering::SeqCst), 0);
    assert_eq!(body_string(response).await, "");
}

#[tokio::test]
async fn descriptor_method_picks_the_route_verb() {
    let module = page_module(
        "/dist/submit.js",
        json!({"path": "/submit", "method": "POST"}),
        Arc::new(Plain),
    );
    let app = register(&module, &ctx(), Router::new()).unwrap();

    let response = app.clone().oneshot(get("/submit")).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let request = Request::builder()
        .method("POST")
        .uri("/submit")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_path_fails_registration_with_file() {
    let module = page_module(
        "/dist/pages/broken.js",
        json!({"method": "get"}),
        Arc::new(Plain),
    );
    let err = register(&module, &ctx(), Router::new()).unwrap_err();
    assert!(matches!(err, RegisterError::MissingPath { .. }));
    assert!(err.to_string().contains("/pages/broken.js"));
}

#[tokio::test]
async fn register_all_skips_bad_modules_and_keeps_good_ones() {
    let loads = Arc::new(AtomicUsize::new(0));
    let modules = vec![
        // Not a page: no route export. Filtered out, not an error.
        LoadedModule::new("/dist/util.js", None, Some(Arc::new(Plain) as _)),
        // Page with a broken descriptor: collected as an error.
        page_module("/dist/broken.js", json!({"path": null}), Arc::new(Plain)),
        home_module(&loads),
    ];
    assert!(!is_page_module(&modules[0]));

    let (app, errors) = register_all(&modules, &ctx(), Router::new());
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], RegisterError::MissingPath { .. }));

    let response = app.clone().oneshot(get("/home")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/util")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn relative_path_fails_registration_instead_of_panicking() {
    let module = page_module(
        "/dist/pages/home.js",
        json!({"path": "home"}),
        Arc::new(Plain),
    );
    let err = register(&module, &ctx(), Router::new()).unwrap_err();
    assert!(matches!(err, RegisterError::PathNotAbsolute { .. }));
    assert!(err.to_string().contains("/pages/home.js"));
}

#[tokio::test]
async fn register_all_survives_relative_paths_and_duplicate_routes() {
    let loads = Arc::new(AtomicUsize::new(0));
    let modules = vec![
        // Relative path: collected, must not panic the batch.
        page_module("/dist/rel.js", json!({"path": "rel"}), Arc::new(Plain)),
        home_module(&loads),
        // Same path and method as the module above: collected, not a panic.
        page_module("/dist/dup.js", json!({"path": "/home"}), Arc::new(Plain)),
        // Same path, different method: a legal second route.
        page_module(
            "/dist/submit.js",
            json!({"path": "/home", "method": "post"}),
            Arc::new(Plain),
        ),
    ];

    let (app, errors) = register_all(&modules, &ctx(), Router::new());
    assert_eq!(errors.len(), 2);
    assert!(matches!(errors[0], RegisterError::PathNotAbsolute { .. }));
    assert!(matches!(errors[1], RegisterError::DuplicateRoute { .. }));
    assert!(errors[1].to_string().contains("/dup.js"));

    let response = app.clone().oneshot(get("/home")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("__MAGNET_METAL_PAGE__ = 'Home';"));

    let request = Request::builder()
        .method("POST")
        .uri("/home")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
