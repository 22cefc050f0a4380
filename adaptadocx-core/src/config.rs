use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

use crate::layout::ProjectLayout;

/// Which versions a build covers and whether playbooks get patched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildScope {
    /// Only the working reference plus the `current`/`main` aliases.
    #[default]
    Local,
    /// The full historical multi-version set.
    Tags,
}

impl BuildScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildScope::Local => "local",
            BuildScope::Tags => "tags",
        }
    }
}

impl fmt::Display for BuildScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(BuildScope::Local),
            "tags" => Ok(BuildScope::Tags),
            other => Err(format!(
                "invalid build scope '{other}' (expected 'local' or 'tags')"
            )),
        }
    }
}

/// Supported documentation locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Ru,
    En,
}

impl Locale {
    /// Default processing order.
    pub const ALL: [Locale; 2] = [Locale::Ru, Locale::En];

    pub fn code(&self) -> &'static str {
        match self {
            Locale::Ru => "ru",
            Locale::En => "en",
        }
    }

    /// Table-of-contents heading passed to the PDF renderer.
    pub fn toc_title(&self) -> &'static str {
        match self {
            Locale::Ru => "Содержание",
            Locale::En => "Contents",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Attributes handed to asciidoctor-pdf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfSettings {
    pub theme: String,
    pub fonts_dir: String,
}

impl Default for PdfSettings {
    fn default() -> Self {
        Self {
            theme: "config/default-theme.yml".to_string(),
            fonts_dir: "/usr/share/fonts/truetype/dejavu".to_string(),
        }
    }
}

/// Fully resolved build configuration.
///
/// Environment defaults are folded in once by the CLI; nothing below this
/// value reads process environment again.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub scope: BuildScope,
    pub reference: String,
    pub locales: Vec<Locale>,
    pub layout: ProjectLayout,
    pub pdf: PdfSettings,
}

impl BuildConfig {
    pub fn new(layout: ProjectLayout, scope: BuildScope, reference: impl Into<String>) -> Self {
        Self {
            scope,
            reference: reference.into(),
            locales: Locale::ALL.to_vec(),
            layout,
            pdf: PdfSettings::default(),
        }
    }

    pub fn trace_loaded(&self) {
        info!(
            root = %self.layout.root().display(),
            scope = %self.scope,
            reference = %self.reference,
            locales = self.locales.len(),
            "Loaded BuildConfig"
        );
        debug!(?self, "BuildConfig loaded (full debug)");
    }
}
