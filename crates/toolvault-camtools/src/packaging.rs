//! Archive packaging
//!
//! The CAM application imports a zip archive holding a single JSON entry,
//! not the raw document.

use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{ExportError, ExportResult};
use crate::library_document::LibraryDocument;

/// Name of the single archive entry
pub const DEFAULT_ENTRY_NAME: &str = "tools.json";

/// Encode a document as JSON
pub fn encode_library(document: &LibraryDocument, pretty: bool) -> ExportResult<Vec<u8>> {
    let bytes = if pretty {
        serde_json::to_vec_pretty(document)?
    } else {
        serde_json::to_vec(document)?
    };
    Ok(bytes)
}

/// Package a document into an in-memory zip archive with one deflated entry
pub fn package_library(
    document: &LibraryDocument,
    entry_name: &str,
    pretty: bool,
) -> ExportResult<Vec<u8>> {
    let json = encode_library(document, pretty)?;

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    writer.start_file(entry_name, options)?;
    writer.write_all(&json)?;
    let cursor = writer.finish()?;

    Ok(cursor.into_inner())
}

/// Package a document and write the archive to `path`
pub fn write_library_archive<P: AsRef<Path>>(
    path: P,
    document: &LibraryDocument,
    entry_name: &str,
    pretty: bool,
) -> ExportResult<()> {
    let bytes = package_library(document, entry_name, pretty)?;
    write_archive(path.as_ref(), &bytes, document.data.len())
}

pub(crate) fn write_archive(path: &Path, bytes: &[u8], tools: usize) -> ExportResult<()> {
    std::fs::write(path, bytes)?;
    info!(
        path = %path.display(),
        bytes = bytes.len(),
        tools,
        "Wrote tool library archive"
    );
    Ok(())
}

/// Read a library document from a `.json` file or a packaged archive.
///
/// Archives are searched for `tools.json` first, then for the first entry
/// ending in `.json`.
pub fn read_library<P: AsRef<Path>>(path: P) -> ExportResult<LibraryDocument> {
    let path = path.as_ref();
    let is_archive = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"));

    if !is_archive {
        let content = std::fs::read_to_string(path)?;
        return Ok(serde_json::from_str(&content)?);
    }

    let mut archive = ZipArchive::new(File::open(path)?)?;
    let name = if archive.index_for_name(DEFAULT_ENTRY_NAME).is_some() {
        DEFAULT_ENTRY_NAME.to_string()
    } else {
        archive
            .file_names()
            .find(|n| n.ends_with(".json"))
            .map(str::to_string)
            .ok_or(ExportError::Archive(zip::result::ZipError::FileNotFound))?
    };

    let mut contents = String::new();
    archive.by_name(&name)?.read_to_string(&mut contents)?;
    Ok(serde_json::from_str(&contents)?)
}
