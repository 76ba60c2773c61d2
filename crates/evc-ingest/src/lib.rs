//! Submission batch ingestion.
//!
//! This crate turns submitted bytes into a [`RawBatch`]: a rectangular table of
//! raw string cells under a header row. Anything that cannot be decoded fails
//! fast with an [`IngestError`] before validation starts.
//!
//! # Example
//!
//! ```ignore
//! use evc_ingest::{read_batch, RECORD_FLAG_COLUMN};
//!
//! let batch = read_batch(body)?;
//! let flags = batch.record_flags();
//! ```

mod batch;
mod csv;
mod error;

// === Error Types ===
pub use error::{IngestError, Result};

// === Raw Batches ===
pub use batch::{RECORD_FLAG_COLUMN, RawBatch};

// === Decoding ===
pub use crate::csv::{
    MAX_BATCH_FILE_SIZE, content_fingerprint, normalize_header, normalize_headers, read_batch,
    read_batch_file, read_batch_file_with_limit, read_bytes_with_limit,
};
