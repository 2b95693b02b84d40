//! Global context for CLI commands

use anyhow::Result;
use std::env;
use std::path::Path;
use stencil_core::config::Settings;
use stencil_core::template::Template;

/// Settings shared by all commands
pub struct Context {
    pub settings: Settings,
    pub verbose: bool,
}

impl Context {
    /// Load settings from `config`, or discover stencil.toml from the current directory
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub fn new(config: Option<&Path>, verbose: bool) -> Result<Self> {
        let settings = match config {
            Some(path) => Settings::load(path)?,
            None => Settings::discover(&env::current_dir()?)?,
        };
        Ok(Self { settings, verbose })
    }

    /// Resolve and compile a template by name
    pub fn load_template(&self, name: &str) -> Result<Template> {
        Ok(self.settings.load_template(name)?)
    }
}
