//! Dataset schema registry.
//!
//! This crate provides:
//!
//! - **Field tables** for every reportable dataset, embedded at compile time
//! - **Profile resolution** of the "empty when flagged" relaxations
//! - **[`SchemaRegistry`]**: read-only lookup of `(dataset, profile)` schemas
//!
//! # Standards Directory Structure
//!
//! ```text
//! standards/
//! ├── datasets.csv   # dataset_id, name, description, unique_key (a|b|c)
//! └── fields.csv     # one row per field, in declaration order
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use evc_model::ValidationProfile;
//! use evc_standards::SchemaRegistry;
//!
//! let registry = SchemaRegistry::global()?;
//! let schema = registry.get_schema("sessions", ValidationProfile::RelaxedNulls)?;
//! println!("key: {:?}", schema.unique_key_fields());
//! ```

pub mod embedded;
pub mod error;
pub mod loader;
pub mod registry;

pub use error::{Result, StandardsError};
pub use loader::{DatasetInfo, DatasetSpec, FieldSpec, FlagRelaxation, parse_tables};
pub use registry::{STANDARDS_ENV_VAR, SchemaRegistry};
