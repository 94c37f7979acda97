//! Configuration loading, validation and resolution.
//!
//! - File discovery, inheritance and cycle detection in [`loader`]
//! - Deep merging in [`merger`]
//! - Keys and value types in [`schema`]
//! - Validation with suggestions in [`validator`] and [`suggest`]
//! - Per-validator setting resolution in [`store`]
//!
//! # Example
//!
//! ```
//! use tagcheck::config::{ConfigStore, RawConfig};
//! use tagcheck::validators::{builtin, Severity};
//!
//! let raw = RawConfig::from_yaml("Tags/Order:\n  Enabled: true\n").unwrap();
//! let store = ConfigStore::new(&raw, builtin(), &[]).unwrap();
//! assert_eq!(store.severity("Tags/Order"), Severity::Convention);
//! ```

pub mod loader;
pub mod merger;
pub mod schema;
pub mod store;
pub mod suggest;
pub mod validator;

pub use loader::{
    find_config, load_config, load_config_skipping, ConfigLoader, PackageLocator, RawConfig,
    SearchPathLocator, CONFIG_FILE_NAME, INHERIT_FROM_KEY,
};
pub use merger::{deep_merge, merge_configs};
pub use store::{ConfigStore, Resolved, SettingSource, ValidatorSettings};
pub use validator::{validate_config, validate_only};
