//! Data model for submission batch validation.
//!
//! Plain types shared by the registry, ingest and validation crates:
//!
//! - [`FieldDefinition`] and [`DatasetSchema`]: what a dataset accepts
//! - [`ValidationProfile`]: which null relaxations are active
//! - [`Condition`]: a single finding, the primary output of validation
//! - [`ValidationVerdict`] and [`SubmissionStatus`]: batch-level outcome

pub mod condition;
pub mod field;
pub mod options;
pub mod profile;
pub mod schema;
pub mod verdict;

pub use condition::{Condition, ConditionKind, KeyComponent, Severity};
pub use field::{Datatype, FieldDefinition, TimestampFormat};
pub use options::{AllEmptyKeyPolicy, ValidationOptions};
pub use profile::ValidationProfile;
pub use schema::DatasetSchema;
pub use verdict::{SubmissionStatus, ValidationVerdict};
