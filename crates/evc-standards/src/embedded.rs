//! Embedded field tables.
//!
//! The shipped dataset catalog is compiled in with `include_str!()` so the
//! registry needs no runtime file access unless a directory override is used.

/// Dataset catalog: id, display name, description and composite key.
pub const DATASETS: &str = include_str!("../data/datasets.csv");

/// Field table for every dataset, in declaration order.
pub const FIELDS: &str = include_str!("../data/fields.csv");

/// File name of the dataset catalog inside a standards directory.
pub const DATASETS_FILE: &str = "datasets.csv";

/// File name of the field table inside a standards directory.
pub const FIELDS_FILE: &str = "fields.csv";
