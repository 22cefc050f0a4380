//! Repository scan for banned text patterns.
//!
//! Patterns come from `security/banned-patterns.txt`, one regular expression
//! per line. Scripts and Markdown sources are searched; vendored, minified
//! and built files are not.

use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::BuildError;
use crate::layout::ProjectLayout;

const INCLUDE: &[&str] = &["**/*.{js,ts,tsx,jsx,md}"];
const EXCLUDE: &[&str] = &["node_modules/**", "**/*.min.*", "**/dist/**"];

/// One banned pattern found in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannedHit {
    /// Path relative to the project root.
    pub file: PathBuf,
    pub pattern: String,
}

impl BannedHit {
    pub fn render(&self) -> String {
        format!("BANNED {} → {}", self.pattern, self.file.display())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub files_scanned: usize,
    pub hits: Vec<BannedHit>,
}

/// Parse the patterns file: blank lines and `#` comments are skipped.
pub fn parse_patterns(text: &str) -> Result<Vec<(String, Regex)>, BuildError> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            Regex::new(line)
                .map(|re| (line.to_string(), re))
                .map_err(|e| BuildError::InvalidPattern {
                    pattern: line.to_string(),
                    source: e,
                })
        })
        .collect()
}

fn globset(patterns: &[&str]) -> Result<GlobSet, BuildError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| BuildError::Other(e.to_string()))?;
        builder.add(glob);
    }
    builder.build().map_err(|e| BuildError::Other(e.to_string()))
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// Search the project for banned patterns without failing on hits.
pub fn scan(layout: &ProjectLayout) -> Result<ScanReport, BuildError> {
    let patterns_file = layout.banned_patterns();
    if !patterns_file.is_file() {
        return Err(BuildError::BannedPatternsMissing {
            path: patterns_file,
        });
    }
    let text = fs::read_to_string(&patterns_file).map_err(|e| BuildError::io(&patterns_file, e))?;
    let patterns = parse_patterns(&text)?;
    debug!(count = patterns.len(), "Loaded banned patterns");

    let include = globset(INCLUDE)?;
    let exclude = globset(EXCLUDE)?;
    let root = layout.root();

    let mut report = ScanReport::default();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e));
    for entry in walker {
        let entry = entry.map_err(|e| BuildError::Walk {
            path: root.to_path_buf(),
            source: e,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if !include.is_match(relative) || exclude.is_match(relative) {
            continue;
        }

        let content = fs::read(entry.path()).map_err(|e| BuildError::io(entry.path(), e))?;
        let content = String::from_utf8_lossy(&content);
        report.files_scanned += 1;
        for (source, regex) in &patterns {
            if regex.is_match(&content) {
                report.hits.push(BannedHit {
                    file: relative.to_path_buf(),
                    pattern: source.clone(),
                });
            }
        }
    }
    info!(
        files = report.files_scanned,
        hits = report.hits.len(),
        "Banned pattern scan finished"
    );
    Ok(report)
}

/// Scan, print every hit, and fail when anything was found.
///
/// On hits the report is also written to `reports/banned-patterns-report.txt`.
pub fn enforce(layout: &ProjectLayout) -> Result<ScanReport, BuildError> {
    let report = scan(layout)?;
    if report.hits.is_empty() {
        println!("No banned patterns found");
        return Ok(report);
    }

    for hit in &report.hits {
        println!("{}", hit.render());
    }
    let target = layout.banned_report();
    write_report(&target, &report.hits)?;
    warn!(hits = report.hits.len(), report = %target.display(), "Banned patterns found");
    Err(BuildError::BannedPatternsFound {
        count: report.hits.len(),
        report: target,
    })
}

fn write_report(target: &Path, hits: &[BannedHit]) -> Result<(), BuildError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
    }
    let body = hits
        .iter()
        .map(BannedHit::render)
        .collect::<Vec<_>>()
        .join("\n");
    fs::write(target, body).map_err(|e| BuildError::io(target, e))
}
