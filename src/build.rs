//! Build delegation: templates/styles first, then the client bundle.

use crate::context::MagnetContext;
use crate::error::{BoxError, BuildError};
use async_trait::async_trait;

/// One asset build step. Implementations materialize their artifacts under
/// the context's assets directory before returning.
#[async_trait]
pub trait AssetBuild: Send + Sync {
    async fn run(&self, ctx: &MagnetContext) -> Result<(), BoxError>;
}

/// The two builds a project runs per build pass.
pub struct BuildSteps {
    pub templates: Box<dyn AssetBuild>,
    pub client: Box<dyn AssetBuild>,
}

/// Runs the template build, then the client-bundle build, sequentially.
/// The first failure aborts the pass; the second step is never attempted
/// after the first fails.
pub async fn build(steps: &BuildSteps, ctx: &MagnetContext) -> Result<(), BuildError> {
    tracing::debug!("template build");
    steps.templates.run(ctx).await.map_err(BuildError::Templates)?;
    tracing::debug!("client bundle build");
    steps.client.run(ctx).await.map_err(BuildError::Client)?;
    Ok(())
}
