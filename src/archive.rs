use crate::error::{Result, StudypackError};
use std::io::{Cursor, Write};
use std::path::Path;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// True when the output directory holds at least one deliverable.
pub async fn has_artifacts(output_dir: &Path) -> bool {
    let mut entries = match tokio::fs::read_dir(output_dir).await {
        Ok(entries) => entries,
        Err(_) => return false,
    };
    matches!(entries.next_entry().await, Ok(Some(_)))
}

/// Pack every file in the output directory into an in-memory zip.
///
/// Entries are added in name order, so the same artifacts always produce
/// the same archive layout. Compression runs on the blocking pool.
pub async fn build_archive(output_dir: &Path) -> Result<Vec<u8>> {
    let dir = output_dir.to_path_buf();
    let bytes = tokio::task::spawn_blocking(move || build_archive_sync(&dir))
        .await
        .map_err(|e| StudypackError::Packaging(format!("archive task failed: {e}")))??;

    info!("Packed archive: {} bytes", bytes.len());
    Ok(bytes)
}

fn build_archive_sync(output_dir: &Path) -> Result<Vec<u8>> {
    let mut names: Vec<String> = Vec::new();
    for entry in std::fs::read_dir(output_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }
    names.sort();

    debug!("Archiving {} files", names.len());

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for name in &names {
        writer
            .start_file(name.as_str(), options)
            .map_err(|e| StudypackError::Packaging(format!("zip entry {name}: {e}")))?;
        let contents = std::fs::read(output_dir.join(name))?;
        writer.write_all(&contents)?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| StudypackError::Packaging(format!("zip finalize: {e}")))?;

    Ok(cursor.into_inner())
}
