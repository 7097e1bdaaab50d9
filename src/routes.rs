//! Route registration and the per-request page handler.

use crate::context::MagnetContext;
use crate::descriptor::RouteDescriptor;
use crate::error::{PageError, RegisterError};
use crate::layout::resolve_layout;
use crate::module::{is_page_module, LoadedModule, PageComponent};
use crate::response::{content_type_for, render_document};
use axum::{
    body::Body,
    extract::Request,
    http::{header::CONTENT_TYPE, HeaderMap},
    response::{IntoResponse, Response},
    routing::on,
    Json, Router,
};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// Request extension inserted by middleware that has already produced a
/// response for this request; the page handler backs off without doing any
/// work when it is present.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResponseCommitted;

struct PageRoute {
    component: Arc<dyn PageComponent>,
    content_type: String,
    file_short: String,
}

/// Registers one validated page module on the host router.
///
/// Descriptor violations fail here, at registration time, naming the module
/// file relative to the dist directory; they never surface per request.
pub fn register(
    module: &LoadedModule,
    ctx: &MagnetContext,
    router: Router,
) -> Result<Router, RegisterError> {
    let file = ctx.file_short(&module.file);
    let component = module
        .component
        .clone()
        .ok_or_else(|| RegisterError::MissingComponent { file: file.clone() })?;
    let route = module
        .route
        .as_ref()
        .ok_or_else(|| RegisterError::MissingRoute { file: file.clone() })?;

    let descriptor = RouteDescriptor::from_export(route, &file)?;
    let filter = descriptor.method_filter(&file)?;

    let page = Arc::new(PageRoute {
        component,
        content_type: content_type_for(&descriptor.response_type),
        file_short: file,
    });
    tracing::debug!(
        path = %descriptor.path,
        method = %descriptor.method.to_ascii_lowercase(),
        file = %page.file_short,
        "register page route"
    );

    let handler = move |req: Request| {
        let page = Arc::clone(&page);
        async move { page.handle(req).await }
    };
    Ok(router.route(&descriptor.path, on(filter, handler)))
}

/// Registers every qualifying page module, skipping non-pages and collecting
/// per-module registration errors so one bad descriptor does not take down
/// the rest.
pub fn register_all(
    modules: &[LoadedModule],
    ctx: &MagnetContext,
    mut router: Router,
) -> (Router, Vec<RegisterError>) {
    let mut errors = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();
    for module in modules.iter().filter(|m| is_page_module(m)) {
        // The router panics on overlapping method routes; detect collisions
        // up front so the duplicate stays a per-module error. Descriptor
        // parse failures fall through to `register`, which reports them.
        let file = ctx.file_short(&module.file);
        let descriptor = module
            .route
            .as_ref()
            .and_then(|route| RouteDescriptor::from_export(route, &file).ok());
        if let Some(descriptor) = descriptor {
            let key = (
                descriptor.method.to_ascii_lowercase(),
                descriptor.path.clone(),
            );
            if !seen.insert(key) {
                let err = RegisterError::DuplicateRoute {
                    method: descriptor.method.to_ascii_lowercase(),
                    path: descriptor.path,
                    file,
                };
                tracing::warn!(error = %err, "skipping page route");
                errors.push(err);
                continue;
            }
        }
        match register(module, ctx, router.clone()) {
            Ok(next) => router = next,
            Err(err) => {
                tracing::warn!(error = %err, "skipping page route");
                errors.push(err);
            }
        }
    }
    (router, errors)
}

impl PageRoute {
    async fn handle(&self, req: Request) -> Result<Response, PageError> {
        // The body stays with the host; state loaders and layouts see the
        // request head only.
        let (parts, _body) = req.into_parts();

        if parts.extensions.get::<ResponseCommitted>().is_some() {
            return Ok(Response::new(Body::empty()));
        }

        let state = self
            .component
            .initial_state(&parts)
            .await?
            .unwrap_or(Value::Null);

        if is_content_type_json(&parts.headers) {
            return Ok(Json(state).into_response());
        }

        let content = self.component.render(&state)?;
        let layout = self
            .component
            .render_layout(&parts, &content, &state)
            .await?;
        let shell = resolve_layout(layout)?;
        let document = render_document(
            &shell,
            &self.file_short,
            self.component.name(),
            &state,
        )?;
        Ok(([(CONTENT_TYPE, self.content_type.clone())], document).into_response())
    }
}

/// Case-insensitive prefix match on the request `content-type`, absent
/// headers reading as empty.
fn is_content_type_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase()
        .starts_with("application/json")
}
