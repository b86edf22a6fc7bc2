use std::fs::File;
use std::path::Path;

use tracing::{debug, info};
use zip::ZipArchive;

use crate::domain::InstallError;

/// Expand a zip archive into `destination`, creating it if absent.
///
/// Existing files with the same name are overwritten. Entries that would
/// escape `destination` are skipped. Nothing is cleaned up on failure.
/// Returns the number of files written.
pub fn extract(archive_path: &Path, destination: &Path) -> Result<usize, InstallError> {
    info!(archive = %archive_path.display(), target = %destination.display(), "extracting");

    std::fs::create_dir_all(destination)
        .map_err(|e| InstallError::filesystem("Failed to create target directory", e))?;

    let file = File::open(archive_path)
        .map_err(|e| InstallError::Archive(format!("{}: {}", archive_path.display(), e)))?;
    let mut archive = ZipArchive::new(file).map_err(|e| InstallError::Archive(e.to_string()))?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| InstallError::Archive(e.to_string()))?;
        let outpath = match entry.enclosed_name() {
            Some(path) => destination.join(path),
            None => {
                debug!(name = entry.name(), "skipping unsafe entry");
                continue;
            }
        };

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath)
                .map_err(|e| InstallError::filesystem("Failed to create directory", e))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| InstallError::filesystem("Failed to create directory", e))?;
        }
        let mut outfile = File::create(&outpath)
            .map_err(|e| InstallError::filesystem("Failed to create file", e))?;
        std::io::copy(&mut entry, &mut outfile)
            .map_err(|e| InstallError::Archive(format!("{}: {}", entry.name(), e)))?;
        written += 1;
    }

    info!(files = written, "extraction complete");
    Ok(written)
}
