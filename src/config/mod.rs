//! Configuration types and loading for relay.
//!
//! Settings come from, in increasing precedence: built-in defaults, the
//! global TOML file (`~/.config/relay/config.toml`), a project `relay.toml`,
//! environment variables, and command-line flags. The result is built once
//! at startup and passed by reference; nothing reads the environment later.

mod loader;
mod paths;
mod resolve;
mod types;

pub use types::{Config, GitLabConfig, Overrides};

use anyhow::Result;

impl Config {
    /// Load config with precedence: env > project > global > defaults.
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project(&std::env::current_dir()?)?;
        let config = Self::from_layers(global, project, |name| std::env::var(name).ok())?;
        tracing::debug!(model = %config.model, base_url = %config.base_url, "configuration resolved");
        Ok(config)
    }
}
