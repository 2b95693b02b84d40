use serde::{Deserialize, Serialize};

/// stencil.toml schema
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub templates: TemplatesConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub data: DataConfig,
    /// Inline variables, merged after the data files
    #[serde(default)]
    pub vars: toml::Table,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TemplatesConfig {
    /// Directory template names resolve against, relative to the config file
    #[serde(default = "default_templates_root")]
    pub root: String,
    /// Extension appended to template names that have none
    #[serde(default = "default_templates_extension")]
    pub extension: String,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            root: default_templates_root(),
            extension: default_templates_extension(),
        }
    }
}

fn default_templates_root() -> String {
    ".".to_string()
}

fn default_templates_extension() -> String {
    "tmpl".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    #[serde(default = "default_true")]
    pub builtin_modifiers: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            builtin_modifiers: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    /// Data files (relative to the config file), merged in order
    #[serde(default)]
    pub files: Vec<String>,
}
