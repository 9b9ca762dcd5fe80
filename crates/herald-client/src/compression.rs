//! Request body compression.

use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;

/// Gzip-compress `data` at the default level.
pub fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
