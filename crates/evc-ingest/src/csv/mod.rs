//! Comma-delimited body decoding.

mod header;
mod reader;

pub use header::{normalize_header, normalize_headers};
pub use reader::{
    MAX_BATCH_FILE_SIZE, content_fingerprint, read_batch, read_batch_file,
    read_batch_file_with_limit, read_bytes_with_limit,
};
