//! Magnet-Metal: server-rendered page routes for axum hosts.
//!
//! The host discovers candidate modules at startup, filters them with
//! [`is_page_module`], and registers the survivors with [`register`] (or all
//! at once with [`register_all`]). Each registered route resolves per-request
//! initial state, renders its component, and answers JSON or a full HTML
//! document with the client bootstrap script. [`build`] runs the two asset
//! builds ahead of serving.

pub mod build;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod layout;
pub mod module;
pub mod response;
pub mod routes;

pub use build::{build, AssetBuild, BuildSteps};
pub use context::MagnetContext;
pub use descriptor::RouteDescriptor;
pub use error::{BoxError, BuildError, PageError, RegisterError};
pub use layout::{default_layout, resolve_layout, Layout, MarkupChild, MarkupNode};
pub use module::{is_page_module, LoadedModule, PageComponent};
pub use routes::{register, register_all, ResponseCommitted};
