//! Configuration templates embedded at compile time.

use include_dir::{include_dir, Dir};

use crate::error::{Result, TagcheckError};

/// Embedded templates directory.
static TEMPLATES_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/templates");

/// Names of the available templates.
pub fn template_names() -> Vec<&'static str> {
    let mut names: Vec<&str> = TEMPLATES_DIR
        .files()
        .filter_map(|f| f.path().file_stem().and_then(|s| s.to_str()))
        .collect();
    names.sort_unstable();
    names
}

/// Contents of the template called `name`.
pub fn config_template(name: &str) -> Result<&'static str> {
    let path = format!("{}.yml", name);
    let file = TEMPLATES_DIR
        .get_file(&path)
        .ok_or_else(|| TagcheckError::ConfigNotFound {
            path: format!("templates/{}", path).into(),
        })?;

    file.contents_utf8()
        .ok_or_else(|| TagcheckError::ConfigParseError {
            path: file.path().to_path_buf(),
            message: "Invalid UTF-8".to_string(),
        })
}
