//! Directory-tree conventions shared by every target.
//!
//! All paths are pure functions of the project root and the
//! (locale, version, format) triple, so a rebuild overwrites earlier output
//! instead of accumulating next to it.

use std::path::{Path, PathBuf};

use crate::config::Locale;

/// Final artifact kinds written per (locale, version).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Pdf,
    Docx,
}

impl ArtifactFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactFormat::Pdf => "pdf",
            ArtifactFormat::Docx => "docx",
        }
    }
}

/// Identifies one output artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    pub locale: Locale,
    pub version: String,
    pub format: ArtifactFormat,
}

impl ArtifactDescriptor {
    pub fn new(locale: Locale, version: impl Into<String>, format: ArtifactFormat) -> Self {
        Self {
            locale,
            version: version.into(),
            format,
        }
    }

    /// `adaptadocx-<locale>.<ext>`
    pub fn file_name(&self) -> String {
        format!("adaptadocx-{}.{}", self.locale, self.format.extension())
    }
}

/// Root-relative locations of sources, intermediates and outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn build_dir(&self) -> PathBuf {
        self.root.join("build")
    }

    pub fn site_dir(&self) -> PathBuf {
        self.build_dir().join("site")
    }

    pub fn asm_dir(&self) -> PathBuf {
        self.build_dir().join("asm")
    }

    pub fn pdf_dir(&self) -> PathBuf {
        self.build_dir().join("pdf")
    }

    pub fn docx_dir(&self) -> PathBuf {
        self.build_dir().join("docx")
    }

    pub fn locale_site_dir(&self, locale: Locale) -> PathBuf {
        self.site_dir().join(locale.code())
    }

    pub fn downloads_dir(&self, locale: Locale, version: &str) -> PathBuf {
        self.locale_site_dir(locale).join(version).join("_downloads")
    }

    /// Directory holding the artifact in its format-specific output tree.
    pub fn output_dir(&self, artifact: &ArtifactDescriptor) -> PathBuf {
        let base = match artifact.format {
            ArtifactFormat::Pdf => self.pdf_dir(),
            ArtifactFormat::Docx => self.docx_dir(),
        };
        base.join(artifact.locale.code()).join(&artifact.version)
    }

    pub fn output_path(&self, artifact: &ArtifactDescriptor) -> PathBuf {
        self.output_dir(artifact).join(artifact.file_name())
    }

    pub fn download_path(&self, artifact: &ArtifactDescriptor) -> PathBuf {
        self.downloads_dir(artifact.locale, &artifact.version)
            .join(artifact.file_name())
    }

    pub fn playbook(&self, locale: Locale) -> PathBuf {
        self.root.join(format!("antora-playbook-{locale}.yml"))
    }

    pub fn pandoc_reference(&self) -> PathBuf {
        self.root.join("docx").join("reference.docx")
    }

    pub fn cover_filter(&self) -> PathBuf {
        self.root.join("docx").join("coverpage.lua")
    }

    pub fn svg_filter(&self) -> PathBuf {
        self.root.join("docx").join("svg2png.lua")
    }

    pub fn collapsible_extension(&self) -> PathBuf {
        self.root
            .join("extensions")
            .join("collapsible_tree_processor.rb")
    }

    pub fn metadata_template(&self, locale: Locale) -> PathBuf {
        self.root.join("config").join(format!("meta-{locale}.yml"))
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.root.join("scripts")
    }

    pub fn banned_patterns(&self) -> PathBuf {
        self.root.join("security").join("banned-patterns.txt")
    }

    pub fn banned_report(&self) -> PathBuf {
        self.root
            .join("reports")
            .join("banned-patterns-report.txt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_paths_depend_only_on_the_triple() {
        let layout = ProjectLayout::new("/proj");
        let pdf = ArtifactDescriptor::new(Locale::En, "main", ArtifactFormat::Pdf);
        assert_eq!(
            layout.output_path(&pdf),
            PathBuf::from("/proj/build/pdf/en/main/adaptadocx-en.pdf")
        );
        assert_eq!(
            layout.download_path(&pdf),
            PathBuf::from("/proj/build/site/en/main/_downloads/adaptadocx-en.pdf")
        );

        let docx = ArtifactDescriptor::new(Locale::Ru, "v1.0", ArtifactFormat::Docx);
        assert_eq!(
            layout.output_path(&docx),
            PathBuf::from("/proj/build/docx/ru/v1.0/adaptadocx-ru.docx")
        );
    }
}
