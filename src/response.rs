//! HTML document assembly: layout, asset script tags, client bootstrap.
//!
//! The three bootstrap identifiers are a fixed wire contract with the client
//! runtime; keep them in lockstep with the render bundle.

use crate::error::PageError;
use serde_json::Value;

/// Public root under which built client assets are served.
pub const ASSET_ROOT: &str = "/.metal";
/// Shared framework bundle, loaded first.
pub const COMMON_BUNDLE: &str = "common.js";
/// Client render runtime, defines the render entry point.
pub const RENDER_BUNDLE: &str = "render.js";

pub const PAGE_GLOBAL: &str = "__MAGNET_METAL_PAGE__";
pub const STATE_GLOBAL: &str = "__MAGNET_METAL_STATE__";
pub const RENDER_ENTRY: &str = "__MAGNET_METAL_RENDER__";

/// Per-route client bundle path: the fixed asset root joined with the
/// module's dist-relative path.
pub fn bundle_src(file_short: &str) -> String {
    format!("{}/{}", ASSET_ROOT, file_short.trim_start_matches('/'))
}

/// Full mime type for a descriptor `type` value. Shorthands follow the
/// host's response `type` semantics; values containing a slash pass through.
pub fn content_type_for(response_type: &str) -> String {
    if response_type.contains('/') {
        return response_type.to_string();
    }
    match response_type {
        "html" => "text/html; charset=utf-8".to_string(),
        "json" => "application/json".to_string(),
        "txt" | "text" => "text/plain; charset=utf-8".to_string(),
        other => format!("text/{}", other),
    }
}

/// Assembles the final HTML document: doctype, resolved layout, the three
/// asset script tags in fixed order, then the inline bootstrap script.
pub fn render_document(
    layout: &str,
    file_short: &str,
    page_name: &str,
    state: &Value,
) -> Result<String, PageError> {
    let state_json = script_safe_json(state)?;
    let page_name = script_safe_name(page_name);
    Ok(format!(
        "<!DOCTYPE html>{layout}\
         <script src=\"{root}/{common}\"></script>\
         <script src=\"{root}/{render}\"></script>\
         <script src=\"{bundle}\"></script>\
         <script>{page_var} = '{name}';{state_var} = {state};{entry}({page_var}, {state_var});</script>",
        layout = layout,
        root = ASSET_ROOT,
        common = COMMON_BUNDLE,
        render = RENDER_BUNDLE,
        bundle = bundle_src(file_short),
        page_var = PAGE_GLOBAL,
        name = page_name,
        state_var = STATE_GLOBAL,
        state = state_json,
        entry = RENDER_ENTRY,
    ))
}

/// State JSON embedded inside a `<script>` element. `</` is escaped so state
/// strings cannot terminate the script tag early.
fn script_safe_json(state: &Value) -> Result<String, PageError> {
    Ok(serde_json::to_string(state)?.replace("</", "<\\/"))
}

/// Page name embedded in a single-quoted script literal. Backslashes and
/// quotes are escaped, and `</` so the name cannot terminate the script tag.
fn script_safe_name(name: &str) -> String {
    name.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace("</", "<\\/")
}
