//! Example host: a small app that builds assets and serves two pages
//! through magnet-metal.
//!
//! Run from repo root: `cargo run -p example-consumer`

use async_trait::async_trait;
use axum::http::request::Parts;
use axum::Router;
use magnet_metal::{
    build, is_page_module, register_all, AssetBuild, BoxError, Layout, LoadedModule,
    MagnetContext, PageComponent, PageError,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

struct Home;

#[async_trait]
impl PageComponent for Home {
    fn name(&self) -> &str {
        "Home"
    }

    fn render(&self, state: &Value) -> Result<String, PageError> {
        Ok(format!("<h1>Hello, visitor #{}</h1>", state["visits"]))
    }

    async fn initial_state(&self, req: &Parts) -> Result<Option<Value>, PageError> {
        Ok(Some(json!({
            "visits": 1,
            "path": req.uri.path(),
        })))
    }
}

struct About;

#[async_trait]
impl PageComponent for About {
    fn name(&self) -> &str {
        "About"
    }

    fn render(&self, _state: &Value) -> Result<String, PageError> {
        Ok("<p>A magnet-metal demo.</p>".to_string())
    }

    async fn render_layout(
        &self,
        _req: &Parts,
        content: &str,
        _state: &Value,
    ) -> Result<Layout, PageError> {
        Ok(Layout::Html(format!(
            "<html><head><title>About</title></head><body>{}</body></html>",
            content
        )))
    }
}

/// Stand-in build steps; a real host compiles templates and bundles here.
struct LogOnly(&'static str);

#[async_trait]
impl AssetBuild for LogOnly {
    async fn run(&self, ctx: &MagnetContext) -> Result<(), BoxError> {
        tracing::info!(step = self.0, assets = %ctx.assets_dir.display(), "build step");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("magnet_metal=debug,example_consumer=info")),
        )
        .init();

    let ctx = MagnetContext::new("/app/dist", "/app/dist/assets");
    let steps = magnet_metal::BuildSteps {
        templates: Box::new(LogOnly("templates")),
        client: Box::new(LogOnly("client")),
    };
    build(&steps, &ctx).await?;

    let modules = vec![
        LoadedModule::new(
            "/app/dist/pages/home.js",
            Some(json!({"path": "/"})),
            Some(Arc::new(Home) as Arc<dyn PageComponent>),
        ),
        LoadedModule::new(
            "/app/dist/pages/about.js",
            Some(json!({"path": "/about"})),
            Some(Arc::new(About) as Arc<dyn PageComponent>),
        ),
        // Not a page; register_all skips it.
        LoadedModule::new("/app/dist/util.js", None, None),
    ];
    tracing::info!(
        pages = modules.iter().filter(|m| is_page_module(m)).count(),
        "discovered page modules"
    );

    let (app, errors) = register_all(&modules, &ctx, Router::new());
    for err in &errors {
        tracing::warn!(error = %err, "route not registered");
    }

    let listener = TcpListener::bind("127.0.0.1:3000").await?;
    tracing::info!("example consumer listening on http://127.0.0.1:3000");
    axum::serve(listener, app).await?;
    Ok(())
}
