//! High-level build targets: site, PDF, DOCX, full site, clean and test.
//!
//! Each target is a free function over a [`BuildConfig`] and a
//! [`CommandRunner`]. Work is strictly sequential: locales in configured
//! order, versions in enumeration order, one external program at a time.
//!
//! # Rebuild semantics
//! - PDF and DOCX always rebuild the HTML site first instead of checking
//!   whether it is stale, so `build_site` renders HTML three times.
//! - Every output path is derived from (locale, version, format), so a rerun
//!   overwrites the previous artifact.
//!
//! # Error Handling
//! The first failure stops everything: there is no per-version isolation.
//! A (locale, version) pair without an export index is skipped silently.
//! Temporary files (patched playbooks, DocBook intermediates, per-version
//! metadata) are held in [`TempPath`] guards and removed on every exit path.

use std::fs;
use std::path::PathBuf;

use tempfile::TempPath;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{BuildConfig, BuildScope, Locale};
use crate::contract::CommandRunner;
use crate::error::BuildError;
use crate::exports::{locate_export, EXPORT_INDEX};
use crate::images::materialize_images;
use crate::layout::{ArtifactDescriptor, ArtifactFormat, ProjectLayout};
use crate::playbook::write_patched_playbook;
use crate::tools;
use crate::validate::validate_docbook;
use crate::versions::selected_versions;

/// Placeholder in the DOCX metadata template replaced by the version.
pub const VERSION_PLACEHOLDER: &str = "{page-version}";

/// Completed unit of work, reported in completion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Html,
    Pdf,
    Docx,
    Site,
    Clean,
    Test,
}

impl Target {
    pub fn name(&self) -> &'static str {
        match self {
            Target::Html => "html",
            Target::Pdf => "pdf",
            Target::Docx => "docx",
            Target::Site => "site",
            Target::Clean => "clean",
            Target::Test => "test",
        }
    }
}

/// What a target run completed and which artifacts it published.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub targets: Vec<Target>,
    /// Copies placed in the site's `_downloads` folders.
    pub artifacts: Vec<PathBuf>,
}

impl BuildReport {
    fn absorb(&mut self, other: BuildReport) {
        self.targets.extend(other.targets);
        self.artifacts.extend(other.artifacts);
    }

    fn completed(mut self, target: Target) -> Self {
        self.targets.push(target);
        self
    }
}

/// Build the HTML site for every configured locale.
///
/// In local scope each playbook is patched to the working reference first;
/// the patched copy is deleted whether or not the generator succeeds.
pub async fn build_html<R>(config: &BuildConfig, runner: &R) -> Result<BuildReport, BuildError>
where
    R: CommandRunner,
{
    info!(scope = %config.scope, reference = %config.reference, "[HTML] start");
    for &locale in &config.locales {
        let playbook = config.layout.playbook(locale);
        match config.scope {
            BuildScope::Tags => {
                runner
                    .run(&tools::site_build(&config.layout, &playbook))
                    .await?;
            }
            BuildScope::Local => {
                let patched = write_patched_playbook(&playbook, &config.reference)?;
                runner
                    .run(&tools::site_build(&config.layout, &patched))
                    .await?;
            }
        }
        info!(locale = %locale, "[HTML] Site generated");
    }
    info!("[HTML] done");
    Ok(BuildReport::default().completed(Target::Html))
}

/// Rebuild HTML, then render one PDF per selected (locale, version).
pub async fn build_pdf<R>(config: &BuildConfig, runner: &R) -> Result<BuildReport, BuildError>
where
    R: CommandRunner,
{
    let mut report = build_html(config, runner).await?;
    let layout = &config.layout;

    for &locale in &config.locales {
        for version in selected_versions(layout, locale, config.scope, &config.reference)? {
            let Some(export) = locate_export(layout, locale, &version) else {
                continue;
            };
            materialize_images(&export, locale, &version)?;

            let artifact = ArtifactDescriptor::new(locale, &version, ArtifactFormat::Pdf);
            let outfile = prepare_output(layout, &artifact)?;
            info!(locale = %locale, version = %version, "[PDF] Rendering");
            runner
                .run(&tools::pdf_render(
                    config,
                    locale,
                    &version,
                    &export.index,
                    &outfile,
                ))
                .await?;
            report.artifacts.push(publish(layout, &artifact)?);
        }
    }
    Ok(report.completed(Target::Pdf))
}

/// Rebuild HTML, then produce one DOCX per selected (locale, version).
///
/// Each export is rendered to DocBook, checked for well-formedness and only
/// then handed to Pandoc together with the locale's metadata template.
pub async fn build_docx<R>(config: &BuildConfig, runner: &R) -> Result<BuildReport, BuildError>
where
    R: CommandRunner,
{
    let mut report = build_html(config, runner).await?;
    let layout = &config.layout;

    let svg_filter = runner
        .is_available(tools::SVG_RASTERIZER)
        .then(|| layout.svg_filter());
    let extension = Some(layout.collapsible_extension()).filter(|p| p.is_file());
    debug!(
        svg_filter = svg_filter.is_some(),
        extension = extension.is_some(),
        "[DOCX] Optional toolchain pieces"
    );

    for &locale in &config.locales {
        for version in selected_versions(layout, locale, config.scope, &config.reference)? {
            let Some(export) = locate_export(layout, locale, &version) else {
                continue;
            };
            materialize_images(&export, locale, &version)?;

            let artifact = ArtifactDescriptor::new(locale, &version, ArtifactFormat::Docx);
            let outfile = prepare_output(layout, &artifact)?;
            let exports_dir = export.index.parent().ok_or_else(|| {
                BuildError::Other(format!(
                    "export index has no parent directory: {}",
                    export.index.display()
                ))
            })?;

            let docbook = tempfile::Builder::new()
                .suffix(".xml")
                .tempfile_in(exports_dir)
                .map_err(|e| BuildError::io(exports_dir, e))?
                .into_temp_path();

            info!(locale = %locale, version = %version, "[DOCX] Rendering DocBook");
            runner
                .run(&tools::docbook_render(
                    exports_dir,
                    EXPORT_INDEX,
                    extension.as_deref(),
                    &docbook,
                ))
                .await?;
            validate_docbook(&docbook)?;

            let metadata = write_metadata(layout, locale, &version, &artifact)?;
            info!(locale = %locale, version = %version, "[DOCX] Converting");
            runner
                .run(&tools::docx_convert(
                    layout,
                    &metadata,
                    svg_filter.as_deref(),
                    &docbook,
                    &outfile,
                ))
                .await?;
            drop(metadata);
            drop(docbook);

            report.artifacts.push(publish(layout, &artifact)?);
        }
    }
    Ok(report.completed(Target::Docx))
}

/// HTML, then PDF, then DOCX.
pub async fn build_site<R>(config: &BuildConfig, runner: &R) -> Result<BuildReport, BuildError>
where
    R: CommandRunner,
{
    let mut report = build_html(config, runner).await?;
    report.absorb(build_pdf(config, runner).await?);
    report.absorb(build_docx(config, runner).await?);
    Ok(report.completed(Target::Site))
}

/// Remove the whole build tree. A missing tree is not an error.
pub fn clean(layout: &ProjectLayout) -> BuildReport {
    let build = layout.build_dir();
    match fs::remove_dir_all(&build) {
        Ok(()) => info!(path = %build.display(), "Removed build tree"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %build.display(), "Nothing to clean")
        }
        Err(e) => warn!(error = %e, path = %build.display(), "Failed to remove build tree"),
    }
    BuildReport::default().completed(Target::Clean)
}

/// Link check (if a site exists), prose lint, then shell lint per script.
pub async fn test<R>(layout: &ProjectLayout, runner: &R) -> Result<BuildReport, BuildError>
where
    R: CommandRunner,
{
    if layout.site_dir().exists() {
        runner.run(&tools::link_check(layout)).await?;
    } else {
        println!("[test] Skipping htmltest - no site built");
        info!("[TEST] No site directory, link check skipped");
    }

    runner.run(&tools::prose_lint(layout)).await?;

    for script in shell_scripts(layout)? {
        runner.run(&tools::shell_lint(layout, &script)).await?;
    }
    Ok(BuildReport::default().completed(Target::Test))
}

/// Every `*.sh` below the scripts directory, in walk order.
pub fn shell_scripts(layout: &ProjectLayout) -> Result<Vec<PathBuf>, BuildError> {
    let dir = layout.scripts_dir();
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut scripts = Vec::new();
    for entry in WalkDir::new(&dir).sort_by_file_name() {
        let entry = entry.map_err(|e| BuildError::Walk {
            path: dir.clone(),
            source: e,
        })?;
        let is_script = entry.path().extension().is_some_and(|ext| ext == "sh");
        if entry.file_type().is_file() && is_script {
            scripts.push(entry.into_path());
        }
    }
    Ok(scripts)
}

/// Create the artifact's output directory and return its output file path.
fn prepare_output(layout: &ProjectLayout, artifact: &ArtifactDescriptor) -> Result<PathBuf, BuildError> {
    let outdir = layout.output_dir(artifact);
    fs::create_dir_all(&outdir).map_err(|e| BuildError::io(&outdir, e))?;
    Ok(layout.output_path(artifact))
}

/// Copy a finished artifact into the site's per-version download folder.
fn publish(layout: &ProjectLayout, artifact: &ArtifactDescriptor) -> Result<PathBuf, BuildError> {
    let source = layout.output_path(artifact);
    let downloads = layout.downloads_dir(artifact.locale, &artifact.version);
    fs::create_dir_all(&downloads).map_err(|e| BuildError::io(&downloads, e))?;

    let target = layout.download_path(artifact);
    fs::copy(&source, &target).map_err(|e| BuildError::io(&source, e))?;
    info!(
        locale = %artifact.locale,
        version = %artifact.version,
        path = %target.display(),
        "Published artifact"
    );
    Ok(target)
}

/// Per-version copy of the locale's metadata template.
fn write_metadata(
    layout: &ProjectLayout,
    locale: Locale,
    version: &str,
    artifact: &ArtifactDescriptor,
) -> Result<TempPath, BuildError> {
    let template = layout.metadata_template(locale);
    if !template.is_file() {
        return Err(BuildError::MissingMetadataTemplate { path: template });
    }
    let source = fs::read_to_string(&template).map_err(|e| BuildError::io(&template, e))?;

    let target = metadata_path(layout, artifact);
    fs::write(&target, render_metadata(&source, version))
        .map_err(|e| BuildError::io(&target, e))?;
    Ok(TempPath::from_path(target))
}

fn metadata_path(layout: &ProjectLayout, artifact: &ArtifactDescriptor) -> PathBuf {
    layout
        .output_dir(artifact)
        .join(format!("meta-{}-{}.yml", artifact.locale, artifact.version))
}

/// Substitute every version placeholder in a metadata template.
pub fn render_metadata(template: &str, version: &str) -> String {
    template.replace(VERSION_PLACEHOLDER, version)
}
