//! Configuration file discovery and loading.
//!
//! A configuration document may inherit from other documents, either by
//! relative path (`inherit_from`) or from a file shipped inside a package
//! (`inherit_package`). Ancestors are loaded recursively and the inheriting
//! document is deep-merged on top of them.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use crate::config::merger::merge_mappings;
use crate::error::{Result, TagcheckError};

/// Name of the primary configuration file.
pub const CONFIG_FILE_NAME: &str = ".tagcheck.yml";

/// Inheritance directive naming files relative to the declaring document.
pub const INHERIT_FROM_KEY: &str = "inherit_from";

/// Inheritance directive naming files inside packages.
pub const INHERIT_PACKAGE_KEY: &str = "inherit_package";

/// Environment variable holding extra package search directories.
pub const PACKAGE_PATH_ENV: &str = "TAGCHECK_PACKAGE_PATH";

/// A fully merged configuration document.
///
/// Inheritance directives have already been resolved and removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawConfig {
    document: Mapping,
    sources: Vec<PathBuf>,
}

impl RawConfig {
    /// Wrap an already-merged document.
    pub fn new(document: Mapping) -> Self {
        Self {
            document,
            sources: Vec::new(),
        }
    }

    /// Parse a YAML string as a standalone document (no inheritance).
    pub fn from_yaml(content: &str) -> Result<Self> {
        let document = parse_document(content, Path::new("<inline>"))?;
        Ok(Self::new(strip_directives(document)))
    }

    /// The merged document.
    pub fn document(&self) -> &Mapping {
        &self.document
    }

    /// Files that contributed to this document, in merge order.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Look up a top-level key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.document.get(key)
    }
}

/// Resolves a package name to the directory it is installed in.
pub trait PackageLocator {
    /// Root directory of the package, if it can be found.
    fn locate(&self, package: &str) -> Option<PathBuf>;
}

/// Looks for `<dir>/<package>` in an ordered list of search directories.
#[derive(Debug, Clone, Default)]
pub struct SearchPathLocator {
    dirs: Vec<PathBuf>,
}

impl SearchPathLocator {
    /// Create a locator over explicit search directories.
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Search `TAGCHECK_PACKAGE_PATH` first, then `<project>/vendor/packages`.
    pub fn from_env(project_root: &Path) -> Self {
        let mut dirs: Vec<PathBuf> = env::var_os(PACKAGE_PATH_ENV)
            .map(|v| env::split_paths(&v).collect())
            .unwrap_or_default();
        dirs.push(project_root.join("vendor").join("packages"));
        Self { dirs }
    }

    /// The configured search directories.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl PackageLocator for SearchPathLocator {
    fn locate(&self, package: &str) -> Option<PathBuf> {
        self.dirs
            .iter()
            .map(|dir| dir.join(package))
            .find(|candidate| candidate.is_dir())
    }
}

/// Loads configuration documents and resolves their inheritance chain.
pub struct ConfigLoader {
    locator: Box<dyn PackageLocator>,
    skipped: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader using the given package locator.
    pub fn new(locator: impl PackageLocator + 'static) -> Self {
        Self {
            locator: Box::new(locator),
            skipped: Vec::new(),
        }
    }

    /// Treat these inherited documents as missing.
    pub fn skipping(mut self, paths: &[PathBuf]) -> Self {
        self.skipped = paths
            .iter()
            .filter_map(|p| fs::canonicalize(p).ok())
            .collect();
        self
    }

    fn is_skipped(&self, path: &Path) -> bool {
        fs::canonicalize(path).is_ok_and(|c| self.skipped.contains(&c))
    }

    /// Load `path` and everything it inherits.
    ///
    /// # Errors
    ///
    /// Returns `ConfigNotFound` if `path` itself does not exist,
    /// `ConfigParseError` for malformed documents and `CircularInheritance`
    /// if the chain refers back to a document that is still being loaded.
    /// Missing ancestors are skipped.
    pub fn load(&self, path: &Path) -> Result<RawConfig> {
        if !path.is_file() {
            return Err(TagcheckError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let mut in_flight = Vec::new();
        let mut sources = Vec::new();
        let document = self.load_recursive(path, &mut in_flight, &mut sources)?;

        Ok(RawConfig { document, sources })
    }

    fn load_recursive(
        &self,
        path: &Path,
        in_flight: &mut Vec<PathBuf>,
        sources: &mut Vec<PathBuf>,
    ) -> Result<Mapping> {
        let canonical = fs::canonicalize(path)?;

        if let Some(start) = in_flight.iter().position(|p| p == &canonical) {
            let cycle = in_flight[start..]
                .iter()
                .chain(std::iter::once(&canonical))
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(TagcheckError::CircularInheritance { cycle });
        }

        let content = fs::read_to_string(&canonical)?;
        let document = parse_document(&content, &canonical)?;
        let base_dir = canonical
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let packages = package_directives(&document, &canonical)?;
        let files = inherit_from_directives(&document, &canonical)?;

        in_flight.push(canonical.clone());

        let mut merged = Mapping::new();

        for (package, relative) in packages {
            let Some(root) = self.locator.locate(&package) else {
                tracing::debug!("Package '{}' not found, skipping inheritance", package);
                continue;
            };
            let ancestor = root.join(&relative);
            if !ancestor.is_file() {
                tracing::debug!(
                    "Inherited config {} not found, skipping",
                    ancestor.display()
                );
                continue;
            }
            let inherited = self.load_recursive(&ancestor, in_flight, sources)?;
            merged = merge_mappings(&merged, &inherited);
        }

        for relative in files {
            let ancestor = base_dir.join(&relative);
            if self.is_skipped(&ancestor) {
                tracing::debug!("Ignoring inherited config {}", ancestor.display());
                continue;
            }
            if !ancestor.is_file() {
                tracing::debug!(
                    "Inherited config {} not found, skipping",
                    ancestor.display()
                );
                continue;
            }
            let inherited = self.load_recursive(&ancestor, in_flight, sources)?;
            merged = merge_mappings(&merged, &inherited);
        }

        in_flight.pop();

        merged = merge_mappings(&merged, &strip_directives(document));
        sources.push(canonical);

        Ok(merged)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(SearchPathLocator::default())
    }
}

/// Parse YAML content into a top-level mapping.
///
/// An empty document is an empty mapping.
pub fn parse_document(content: &str, source_path: &Path) -> Result<Mapping> {
    let value: Value =
        serde_yaml::from_str(content).map_err(|e| TagcheckError::ConfigParseError {
            path: source_path.to_path_buf(),
            message: e.to_string(),
        })?;

    match value {
        Value::Null => Ok(Mapping::new()),
        Value::Mapping(m) => Ok(m),
        other => Err(TagcheckError::ConfigParseError {
            path: source_path.to_path_buf(),
            message: format!(
                "top level must be a mapping, got {}",
                super::schema::type_name(&other)
            ),
        }),
    }
}

fn strip_directives(mut document: Mapping) -> Mapping {
    document.remove(INHERIT_FROM_KEY);
    document.remove(INHERIT_PACKAGE_KEY);
    document
}

/// Read `inherit_from` as a list of relative paths.
pub fn inherit_from_directives(document: &Mapping, path: &Path) -> Result<Vec<String>> {
    match document.get(INHERIT_FROM_KEY) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => string_list(value).ok_or_else(|| TagcheckError::ConfigParseError {
            path: path.to_path_buf(),
            message: format!("'{}' must be a string or a list of strings", INHERIT_FROM_KEY),
        }),
    }
}

fn package_directives(document: &Mapping, path: &Path) -> Result<Vec<(String, String)>> {
    let invalid = || TagcheckError::ConfigParseError {
        path: path.to_path_buf(),
        message: format!(
            "'{}' must map package names to a path or list of paths",
            INHERIT_PACKAGE_KEY
        ),
    };

    let mapping = match document.get(INHERIT_PACKAGE_KEY) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Mapping(m)) => m,
        Some(_) => return Err(invalid()),
    };

    let mut directives = Vec::new();
    for (package, files) in mapping {
        let package = package.as_str().ok_or_else(invalid)?;
        for file in string_list(files).ok_or_else(invalid)? {
            directives.push((package.to_string(), file));
        }
    }
    Ok(directives)
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(s) => Some(vec![s.clone()]),
        Value::Sequence(items) => items
            .iter()
            .map(|i| i.as_str().map(str::to_string))
            .collect(),
        _ => None,
    }
}

/// Find the configuration file by walking up from `start`.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load the configuration for a project.
///
/// An explicit path must exist. Without one, the nearest `.tagcheck.yml`
/// above `project_root` is used; if there is none the built-in defaults
/// apply and an empty document is returned.
pub fn load_config(
    project_root: &Path,
    explicit: Option<&Path>,
) -> Result<(RawConfig, Option<PathBuf>)> {
    load_config_skipping(project_root, explicit, &[])
}

/// Like [`load_config`], but documents in `skip` are not inherited.
pub fn load_config_skipping(
    project_root: &Path,
    explicit: Option<&Path>,
    skip: &[PathBuf],
) -> Result<(RawConfig, Option<PathBuf>)> {
    let loader = ConfigLoader::new(SearchPathLocator::from_env(project_root)).skipping(skip);

    let path = match explicit {
        Some(p) if p.is_absolute() => Some(p.to_path_buf()),
        Some(p) => Some(project_root.join(p)),
        None => find_config(project_root),
    };

    match path {
        Some(path) => {
            let config = loader.load(&path)?;
            tracing::debug!("Loaded configuration from {:?}", config.sources());
            Ok((config, Some(path)))
        }
        None => {
            tracing::debug!("No {} found, using defaults", CONFIG_FILE_NAME);
            Ok((RawConfig::default(), None))
        }
    }
}
