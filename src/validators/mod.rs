//! Validators and their registry.
//!
//! Validators are grouped by category:
//!
//! - `Documentation/*` - missing documentation
//! - `Tags/*` - tag order, types and usage
//! - `Warnings/*` - problems reported by the extraction engine
//! - `Style/*` - external style tools

pub mod documentation;
pub mod registry;
pub mod rule;
pub mod style;
pub mod tags;
pub mod types;
pub mod warnings;

pub use registry::{builtin, RegistryBuilder, ValidatorRegistry};
pub use rule::{
    query_line, Execution, QueryContext, QueryFn, Severity, ValidatorId, ValidatorSpec,
};
