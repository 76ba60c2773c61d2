//! Decoding submitted bytes into a [`RawBatch`].

use std::path::Path;

use csv::{ReaderBuilder, Trim};
use encoding_rs::{Encoding, UTF_8};
use sha2::Digest;

use crate::batch::RawBatch;
use crate::error::{IngestError, Result};

use super::header::normalize_headers;

/// Maximum file size for batch loading (100 MB default).
pub const MAX_BATCH_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Decode a submitted body into a raw batch.
///
/// Fails fast on anything that is not UTF-8 comma-delimited text with a
/// header row. Cells are kept verbatim; empty lines are skipped.
pub fn read_batch(bytes: &[u8]) -> Result<RawBatch> {
    let text = decode_utf8(bytes)?;
    if text.trim().is_empty() {
        return Err(IngestError::EmptyBody);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::None)
        .from_reader(text.as_bytes());

    let headers = normalize_headers(reader.headers()?.iter())?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(String::from).collect());
    }

    tracing::debug!(
        columns = headers.len(),
        rows = rows.len(),
        "decoded submission body"
    );
    RawBatch::new(headers, rows)
}

/// Read a batch from disk, enforcing [`MAX_BATCH_FILE_SIZE`].
pub fn read_batch_file(path: &Path) -> Result<RawBatch> {
    read_batch_file_with_limit(path, MAX_BATCH_FILE_SIZE)
}

/// Read a batch from disk with a custom size limit.
pub fn read_batch_file_with_limit(path: &Path, max_size: u64) -> Result<RawBatch> {
    let bytes = read_bytes_with_limit(path, max_size)?;
    read_batch(&bytes)
}

/// Read raw bytes from disk with a size limit.
pub fn read_bytes_with_limit(path: &Path, max_size: u64) -> Result<Vec<u8>> {
    let metadata = std::fs::metadata(path).map_err(|e| file_error(path, e))?;
    if metadata.len() > max_size {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size,
        });
    }
    std::fs::read(path).map_err(|e| file_error(path, e))
}

/// Hex SHA-256 of a submission body, usable as a content-derived batch id.
pub fn content_fingerprint(bytes: &[u8]) -> String {
    hex::encode(sha2::Sha256::digest(bytes))
}

fn file_error(path: &Path, err: std::io::Error) -> IngestError {
    if err.kind() == std::io::ErrorKind::NotFound {
        IngestError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else {
        IngestError::FileRead {
            path: path.to_path_buf(),
            source: err,
        }
    }
}

/// Strict UTF-8 decoding with BOM sniffing.
///
/// A UTF-8 BOM is dropped; UTF-16 BOMs are rejected rather than transcoded.
fn decode_utf8(bytes: &[u8]) -> Result<std::borrow::Cow<'_, str>> {
    let body = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) if encoding == UTF_8 => &bytes[bom_len..],
        Some((encoding, _)) => {
            return Err(IngestError::UnsupportedEncoding {
                encoding: encoding.name(),
            });
        }
        None => bytes,
    };
    UTF_8
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or(IngestError::InvalidUtf8)
}
