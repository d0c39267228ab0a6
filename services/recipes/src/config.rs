use std::path::PathBuf;

use serde::Deserialize;

use foodgram_core::config::Config;

/// Recipes service configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipesConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port for the HTTP server (default 8000). Env var: `RECIPES_PORT`.
    #[serde(default = "default_port")]
    pub recipes_port: u16,
    /// Directory uploaded images are written to.
    #[serde(default = "default_media_root")]
    pub media_root: PathBuf,
    /// Path (or absolute URL) media files are served under.
    #[serde(default = "default_media_url")]
    pub media_url: String,
    /// Externally visible origin, used for pagination and share links.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

fn default_port() -> u16 {
    8000
}

fn default_media_root() -> PathBuf {
    PathBuf::from("./media")
}

fn default_media_url() -> String {
    "/media".to_owned()
}

fn default_public_base_url() -> String {
    "http://localhost:8000".to_owned()
}

impl Config for RecipesConfig {}

impl RecipesConfig {
    /// Absolute base URL for media files.
    pub fn media_base_url(&self) -> String {
        if self.media_url.starts_with("http://") || self.media_url.starts_with("https://") {
            return self.media_url.trim_end_matches('/').to_owned();
        }
        format!(
            "{}/{}",
            self.public_base_url.trim_end_matches('/'),
            self.media_url.trim_matches('/')
        )
    }

    /// Router path to serve media from, when media is served locally.
    pub fn media_mount_path(&self) -> Option<String> {
        let path = self.media_url.trim_matches('/');
        if self.media_url.contains("://") || path.is_empty() {
            return None;
        }
        Some(format!("/{path}"))
    }
}
