use std::fs;

use tracing::debug;

use crate::config::{BuildScope, Locale};
use crate::error::BuildError;
use crate::layout::ProjectLayout;

/// Rolling aliases that a local build always includes.
pub const ROLLING_ALIASES: [&str; 2] = ["current", "main"];

/// Versions the site generator produced for `locale`, sorted by name.
///
/// Each immediate subdirectory of the locale's site root is one version; plain
/// files and directories whose names are not UTF-8 are ignored. A missing site root yields an empty list.
pub fn list_versions(layout: &ProjectLayout, locale: Locale) -> Result<Vec<String>, BuildError> {
    let root = layout.locale_site_dir(locale);
    if !root.exists() {
        debug!(locale = %locale, path = %root.display(), "No site output for locale");
        return Ok(Vec::new());
    }

    let mut versions = Vec::new();
    for entry in fs::read_dir(&root).map_err(|e| BuildError::io(&root, e))? {
        let entry = entry.map_err(|e| BuildError::io(&root, e))?;
        if !entry.path().is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => versions.push(name),
            Err(raw) => debug!(locale = %locale, name = ?raw, "Skipping non UTF-8 version directory"),
        }
    }
    versions.sort();
    Ok(versions)
}

/// Whether `version` belongs to a build of the given scope.
pub fn version_allowed(version: &str, scope: BuildScope, reference: &str) -> bool {
    match scope {
        BuildScope::Tags => true,
        BuildScope::Local => version == reference || ROLLING_ALIASES.contains(&version),
    }
}

/// Enumerate and filter in one step, keeping enumeration order.
pub fn selected_versions(
    layout: &ProjectLayout,
    locale: Locale,
    scope: BuildScope,
    reference: &str,
) -> Result<Vec<String>, BuildError> {
    Ok(list_versions(layout, locale)?
        .into_iter()
        .filter(|v| version_allowed(v, scope, reference))
        .collect())
}
