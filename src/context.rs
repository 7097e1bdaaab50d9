//! Host project layout shared by registration and builds.

use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct MagnetContext {
    /// Compiled server modules live here; module file paths are shortened
    /// against it in registration error messages.
    pub server_dist_dir: PathBuf,
    /// Build output directory for client assets, served under the public
    /// asset root.
    pub assets_dir: PathBuf,
}

impl MagnetContext {
    pub fn new(server_dist_dir: impl Into<PathBuf>, assets_dir: impl Into<PathBuf>) -> Self {
        MagnetContext {
            server_dist_dir: server_dist_dir.into(),
            assets_dir: assets_dir.into(),
        }
    }

    /// Module path relative to the dist directory, for error messages and
    /// per-route bundle paths.
    pub fn file_short(&self, file: &Path) -> String {
        let file = file.to_string_lossy();
        let root = self.server_dist_dir.to_string_lossy();
        file.strip_prefix(root.as_ref()).unwrap_or(&file).to_string()
    }
}
