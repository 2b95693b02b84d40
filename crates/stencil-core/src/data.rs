//! Loading render data from TOML and JSON files

use std::fs;
use std::path::Path;

use crate::error::{Result, StencilError};
use crate::template::TemplateContext;

/// Load a `.toml` or `.json` file into a context
///
/// # Errors
///
/// Returns an error if the file cannot be read, has another extension, or
/// does not contain a table/object at the top level.
pub fn load_data_file(path: &Path) -> Result<TemplateContext> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let read = || {
        fs::read_to_string(path).map_err(|e| StencilError::DataReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    };
    let parse_error = |reason: String| StencilError::DataParseError {
        path: path.to_path_buf(),
        reason,
    };

    match extension.as_deref() {
        Some("toml") => {
            let table: toml::Table = toml::from_str(&read()?).map_err(|e| parse_error(e.to_string()))?;
            Ok(TemplateContext::from_toml(table))
        }
        Some("json") => {
            let value: serde_json::Value =
                serde_json::from_str(&read()?).map_err(|e| parse_error(e.to_string()))?;
            TemplateContext::from_json(value)
                .ok_or_else(|| parse_error("top-level value must be an object".to_string()))
        }
        _ => Err(StencilError::DataUnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Load several data files, later files overriding earlier ones
pub fn load_data_files<P: AsRef<Path>>(paths: &[P]) -> Result<TemplateContext> {
    let mut context = TemplateContext::new();
    for path in paths {
        context.merge(load_data_file(path.as_ref())?);
    }
    Ok(context)
}

/// Parse a `key=value` assignment from the command line
///
/// The value is interpreted as a TOML literal when possible (`3`, `true`,
/// `[1, 2]`), otherwise it is taken as a plain string. Dotted keys build
/// nested tables.
pub fn parse_assignment(assignment: &str) -> Result<TemplateContext> {
    let (key, raw) = assignment
        .split_once('=')
        .ok_or_else(|| StencilError::ConfigInvalidValue {
            field: assignment.to_string(),
            reason: "expected KEY=VALUE".to_string(),
        })?;
    let key = key.trim();
    if key.is_empty() || key.split('.').any(|part| part.trim().is_empty()) {
        return Err(StencilError::ConfigInvalidValue {
            field: assignment.to_string(),
            reason: "empty key".to_string(),
        });
    }

    let value = parse_literal(raw.trim());
    let mut parts: Vec<&str> = key.split('.').map(str::trim).collect();
    let Some(last) = parts.pop() else {
        return Ok(TemplateContext::new());
    };

    let mut nested = toml::Table::new();
    nested.insert(last.to_string(), value);
    while let Some(part) = parts.pop() {
        let mut outer = toml::Table::new();
        outer.insert(part.to_string(), toml::Value::Table(nested));
        nested = outer;
    }
    Ok(TemplateContext::from_toml(nested))
}

fn parse_literal(raw: &str) -> toml::Value {
    toml::from_str::<toml::Table>(&format!("v = {}", raw))
        .ok()
        .and_then(|mut table| table.remove("v"))
        .unwrap_or_else(|| toml::Value::String(raw.to_string()))
}
