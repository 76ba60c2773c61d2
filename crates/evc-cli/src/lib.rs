//! Library components of the `evc` command-line validator.

pub mod config;
pub mod logging;
pub mod store;
