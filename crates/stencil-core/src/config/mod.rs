//! stencil.toml loading and path resolution

mod model;

pub use model::{Config, DataConfig, RenderConfig, TemplatesConfig};

use std::fs;
use std::path::{Path, PathBuf};

use crate::data::load_data_files;
use crate::error::{Result, StencilError};
use crate::template::{
    BlockRegistry, CallableRegistry, ModifierRegistry, Template, TemplateContext,
};

/// Config file name searched for in the current and parent directories
pub const CONFIG_FILE_NAME: &str = "stencil.toml";

impl Config {
    /// Parse a config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigReadError` or `ConfigParseError`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| StencilError::ConfigReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| StencilError::ConfigParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.templates.extension.starts_with('.') {
            return Err(StencilError::ConfigInvalidValue {
                field: "templates.extension".to_string(),
                reason: "must not start with '.'".to_string(),
            });
        }
        Ok(())
    }
}

/// Find stencil.toml in `start` or one of its ancestors
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// A config together with the directory its relative paths resolve against
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_dir: PathBuf,
    pub config: Config,
}

impl Settings {
    /// Defaults, resolving paths against `base_dir`
    pub fn defaults(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            config: Config::default(),
        }
    }

    /// Load the config file at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let config = Config::from_file(path)?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        tracing::debug!(config = %path.display(), "loaded config");
        Ok(Self { base_dir, config })
    }

    /// Load the config found from `start`, or defaults rooted at `start`
    pub fn discover(start: &Path) -> Result<Self> {
        match find_config_file(start) {
            Some(path) => Self::load(&path),
            None => Ok(Self::defaults(start.to_path_buf())),
        }
    }

    /// Directory template names resolve against
    pub fn templates_dir(&self) -> PathBuf {
        self.base_dir.join(&self.config.templates.root)
    }

    /// Resolve a template name to a file path
    ///
    /// Existing paths are used as given. Otherwise the name is resolved in the
    /// templates directory, with the configured extension appended when the
    /// name has none.
    pub fn template_path(&self, name: &str) -> PathBuf {
        let direct = PathBuf::from(name);
        if direct.is_file() {
            return direct;
        }
        let mut path = self.templates_dir().join(name);
        if path.extension().is_none() {
            path.set_extension(&self.config.templates.extension);
        }
        path
    }

    /// Resolve a template name and compile the file
    ///
    /// # Errors
    ///
    /// Returns `StencilError::Template` when the file cannot be read or compiled.
    pub fn load_template(&self, name: &str) -> Result<Template> {
        Ok(Template::from_file(&self.template_path(name))?)
    }

    /// Render with the configured modifiers and no callables
    pub fn render(
        &self,
        template: &Template,
        context: &TemplateContext,
        blocks: Option<&BlockRegistry>,
    ) -> Result<String> {
        let modifiers = self.modifiers();
        Ok(template.render(context, &modifiers, &CallableRegistry::new(), blocks)?)
    }

    /// Context built from the configured data files and inline vars
    pub fn base_context(&self) -> Result<TemplateContext> {
        let paths: Vec<PathBuf> = self
            .config
            .data
            .files
            .iter()
            .map(|file| self.base_dir.join(file))
            .collect();
        let mut context = load_data_files(&paths)?;
        context.merge(TemplateContext::from_toml(self.config.vars.clone()));
        Ok(context)
    }

    /// Modifier registry per the render settings
    pub fn modifiers(&self) -> ModifierRegistry {
        if self.config.render.builtin_modifiers {
            ModifierRegistry::with_builtins()
        } else {
            ModifierRegistry::new()
        }
    }
}
