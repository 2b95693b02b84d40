use std::path::PathBuf;
use thiserror::Error;

use crate::template::{RenderError, TemplateError};

#[derive(Error, Debug)]
pub enum StencilError {
    // Config errors
    #[error("CONFIG_READ_ERROR: failed to read '{}': {reason}", path.display())]
    ConfigReadError { path: PathBuf, reason: String },

    #[error("CONFIG_PARSE_ERROR: failed to parse '{}': {reason}", path.display())]
    ConfigParseError { path: PathBuf, reason: String },

    #[error("CONFIG_INVALID_VALUE: {field}: {reason}")]
    ConfigInvalidValue { field: String, reason: String },

    // Data errors
    #[error("DATA_READ_ERROR: failed to read '{}': {reason}", path.display())]
    DataReadError { path: PathBuf, reason: String },

    #[error("DATA_PARSE_ERROR: failed to parse '{}': {reason}", path.display())]
    DataParseError { path: PathBuf, reason: String },

    #[error("DATA_UNSUPPORTED_FORMAT: '{}' is neither .toml nor .json", path.display())]
    DataUnsupportedFormat { path: PathBuf },

    // Template errors
    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl From<RenderError> for StencilError {
    fn from(err: RenderError) -> Self {
        StencilError::Template(TemplateError::Render(err))
    }
}

pub type Result<T> = std::result::Result<T, StencilError>;
