//! Page modules: the component trait and the loaded-module shape handed over
//! by the host during startup discovery.

use crate::error::PageError;
use crate::layout::{default_layout, Layout};
use async_trait::async_trait;
use axum::http::request::Parts;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

/// One page's component: a name, a server renderer, and two optional hooks.
///
/// `initial_state` is the per-request state loader; the default means "no
/// loader defined". `render_layout` wraps the rendered content in a document;
/// the default is a bare shell with only a UTF-8 charset meta tag.
#[async_trait]
pub trait PageComponent: Send + Sync {
    /// Component name, echoed to the client bootstrap script.
    fn name(&self) -> &str;

    /// Renders the component with the resolved state to a markup string.
    fn render(&self, state: &Value) -> Result<String, PageError>;

    async fn initial_state(&self, _req: &Parts) -> Result<Option<Value>, PageError> {
        Ok(None)
    }

    async fn render_layout(
        &self,
        _req: &Parts,
        content: &str,
        _state: &Value,
    ) -> Result<Layout, PageError> {
        Ok(Layout::Html(default_layout(content)))
    }
}

/// A candidate module as loaded by the host. `route` is the raw `route`
/// export, any shape; `component` is present only when the component
/// framework recognized the default export.
#[derive(Clone)]
pub struct LoadedModule {
    pub file: PathBuf,
    pub route: Option<Value>,
    pub component: Option<Arc<dyn PageComponent>>,
}

impl LoadedModule {
    pub fn new(
        file: impl Into<PathBuf>,
        route: Option<Value>,
        component: Option<Arc<dyn PageComponent>>,
    ) -> Self {
        LoadedModule {
            file: file.into(),
            route,
            component,
        }
    }
}

/// Whether a loaded module qualifies as a routable page: an object-valued
/// `route` export plus a recognized component. Non-pages are skipped by
/// registration, never errors.
pub fn is_page_module(module: &LoadedModule) -> bool {
    matches!(module.route, Some(Value::Object(_))) && module.component.is_some()
}
