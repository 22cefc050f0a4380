//! Locating the export index a single-file render starts from.
//!
//! Depending on the site generator's assembler configuration the export index
//! lands in one of several layouts under the assembly root. They are probed in
//! a fixed priority order and the first existing file wins.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::Locale;
use crate::layout::ProjectLayout;

/// File name of the export index inside an `_exports` directory.
pub const EXPORT_INDEX: &str = "index.adoc";
/// Directory name the assembler writes exports to.
pub const EXPORTS_DIR: &str = "_exports";

/// A resolved export index and the base directory of its layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportLocation {
    pub index: PathBuf,
    /// Grandparent of the index file; holds the layout's `_images`.
    pub base: PathBuf,
}

/// One candidate layout: a name for diagnostics and a path builder.
pub struct ExportStrategy {
    pub name: &'static str,
    build: fn(&Path, &str, &str) -> PathBuf,
}

impl ExportStrategy {
    pub fn candidate(&self, asm: &Path, locale: Locale, version: &str) -> PathBuf {
        (self.build)(asm, locale.code(), version)
    }
}

fn nested_by_version(asm: &Path, locale: &str, version: &str) -> PathBuf {
    asm.join(locale)
        .join(version)
        .join(EXPORTS_DIR)
        .join(EXPORT_INDEX)
}

fn locale_only(asm: &Path, locale: &str, _version: &str) -> PathBuf {
    asm.join(locale).join(EXPORTS_DIR).join(EXPORT_INDEX)
}

fn alternate_nested_by_version(asm: &Path, locale: &str, version: &str) -> PathBuf {
    asm.join(EXPORTS_DIR)
        .join(locale)
        .join(version)
        .join(EXPORT_INDEX)
}

fn alternate_locale_only(asm: &Path, locale: &str, _version: &str) -> PathBuf {
    asm.join(EXPORTS_DIR).join(locale).join(EXPORT_INDEX)
}

/// Candidate layouts in priority order.
pub const STRATEGIES: [ExportStrategy; 4] = [
    ExportStrategy {
        name: "nested-by-version",
        build: nested_by_version,
    },
    ExportStrategy {
        name: "locale-only",
        build: locale_only,
    },
    ExportStrategy {
        name: "alternate-root-nested-by-version",
        build: alternate_nested_by_version,
    },
    ExportStrategy {
        name: "alternate-root-locale-only",
        build: alternate_locale_only,
    },
];

/// First existing export index for (locale, version), if any.
///
/// `None` is the ordinary "nothing to render" outcome, not an error.
pub fn locate_export(layout: &ProjectLayout, locale: Locale, version: &str) -> Option<ExportLocation> {
    let asm = layout.asm_dir();
    for strategy in &STRATEGIES {
        let index = strategy.candidate(&asm, locale, version);
        if !index.is_file() {
            continue;
        }
        let base = index
            .parent()
            .and_then(Path::parent)
            .map(Path::to_path_buf)?;
        debug!(
            locale = %locale,
            version = version,
            layout = strategy.name,
            index = %index.display(),
            "Resolved export index"
        );
        return Some(ExportLocation { index, base });
    }
    debug!(locale = %locale, version = version, "No export index found");
    None
}
