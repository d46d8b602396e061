//! Zip assembly for captured images.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::executor::CapturedImage;
use super::{CaptureError, Result};

/// Folder every image is placed under inside the archive.
pub const DEFAULT_ARCHIVE_FOLDER: &str = "renders";

/// Suggested download name for the finished archive.
pub const DEFAULT_ARCHIVE_NAME: &str = "model-renders.zip";

/// Pack `entries` into a deflate-compressed zip under `folder/`, keeping the
/// given order.
///
/// A repeated file name is rejected with [`CaptureError::ArchiveConflict`]
/// rather than overwriting the earlier entry.
pub fn assemble(entries: &[CapturedImage], folder: &str) -> Result<Vec<u8>> {
    let folder = folder.trim_matches('/');

    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        if !seen.insert(entry.filename.as_str()) {
            return Err(CaptureError::ArchiveConflict(entry.filename.clone()));
        }
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    if !folder.is_empty() {
        zip.add_directory(format!("{}/", folder), options)?;
    }

    for entry in entries {
        let path = if folder.is_empty() {
            entry.filename.clone()
        } else {
            format!("{}/{}", folder, entry.filename)
        };
        zip.start_file(path, options)?;
        zip.write_all(&entry.bytes)?;
    }

    let bytes = zip.finish()?.into_inner();
    info!(
        images = entries.len(),
        bytes = bytes.len(),
        "Assembled capture archive"
    );
    Ok(bytes)
}
