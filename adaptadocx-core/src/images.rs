use std::fs;
use std::path::PathBuf;

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::Locale;
use crate::error::BuildError;
use crate::exports::ExportLocation;

/// Image folder name on both sides of the copy.
pub const IMAGES_DIR: &str = "_images";

/// Where the renderer expects images for an export index.
pub fn images_destination(export: &ExportLocation, locale: Locale, version: &str) -> Option<PathBuf> {
    export
        .index
        .parent()
        .map(|dir| dir.join(locale.code()).join(version).join(IMAGES_DIR))
}

/// Copy the layout's images next to the export index, flattening subfolders.
///
/// Files already at the destination are overwritten and symlinks are
/// followed. Without a source image directory this is a no-op. Returns the number of files copied.
pub fn materialize_images(
    export: &ExportLocation,
    locale: Locale,
    version: &str,
) -> Result<usize, BuildError> {
    let source = export.base.join(IMAGES_DIR);
    if !source.is_dir() {
        debug!(path = %source.display(), "No images to materialize");
        return Ok(0);
    }
    let Some(destination) = images_destination(export, locale, version) else {
        return Ok(0);
    };
    fs::create_dir_all(&destination).map_err(|e| BuildError::io(&destination, e))?;

    let mut copied = 0;
    for entry in WalkDir::new(&source).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| BuildError::Walk {
            path: source.clone(),
            source: e,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let target = destination.join(entry.file_name());
        fs::copy(entry.path(), &target).map_err(|e| BuildError::io(entry.path(), e))?;
        copied += 1;
    }

    info!(
        locale = %locale,
        version = version,
        files = copied,
        destination = %destination.display(),
        "Materialized images"
    );
    Ok(copied)
}
