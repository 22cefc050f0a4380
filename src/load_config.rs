//! `load_config` module: resolves CLI flags, environment defaults and the optional
//! project file into the single immutable [`BuildConfig`] the core crate consumes.
//!
//! # Responsibilities
//! - Read `BUILD_SCOPE` and `BUILD_REF` exactly once; nothing in the core crate
//!   touches the environment again.
//! - Parse the optional `adaptadocx.yml` project file (serde_yaml) and map it
//!   onto core types.
//! - Precedence per setting: CLI flag, then environment, then built-in default.
//!
//! # Errors
//! All errors use `anyhow::Error` and surface at the CLI boundary.

use adaptadocx_core::config::{BuildConfig, BuildScope, Locale};
use adaptadocx_core::layout::ProjectLayout;
use anyhow::{bail, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const SCOPE_ENV: &str = "BUILD_SCOPE";
pub const REF_ENV: &str = "BUILD_REF";
pub const DEFAULT_REF: &str = "HEAD";
/// Project file picked up from the root when `--config` is not given.
pub const PROJECT_FILE: &str = "adaptadocx.yml";

/// Optional project file schema.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProjectFile {
    #[serde(default)]
    pub locales: Option<Vec<Locale>>,
    #[serde(default)]
    pub pdf: Option<PdfSection>,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PdfSection {
    pub theme: Option<String>,
    pub fonts_dir: Option<String>,
}

/// Values taken from the command line; `None` defers to the environment.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub root: PathBuf,
    pub config: Option<PathBuf>,
    pub scope: Option<BuildScope>,
    pub reference: Option<String>,
}

/// Scope and reference after applying environment defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDefaults {
    pub scope: BuildScope,
    pub reference: String,
}

/// Fold raw environment values into defaults.
pub fn resolve_defaults(scope: Option<&str>, reference: Option<&str>) -> Result<BuildDefaults> {
    let scope = match scope {
        None | Some("") => BuildScope::default(),
        Some(raw) => match raw.parse::<BuildScope>() {
            Ok(scope) => scope,
            Err(e) => {
                error!(var = SCOPE_ENV, value = raw, "Invalid build scope in environment");
                bail!("{SCOPE_ENV}: {e}");
            }
        },
    };
    let reference = match reference {
        None | Some("") => DEFAULT_REF.to_string(),
        Some(raw) => raw.to_string(),
    };
    Ok(BuildDefaults { scope, reference })
}

/// Parse project file text.
pub fn parse_project_file(text: &str) -> Result<ProjectFile> {
    if text.trim().is_empty() {
        return Ok(ProjectFile::default());
    }
    match serde_yaml::from_str(text) {
        Ok(file) => Ok(file),
        Err(e) => {
            error!(error = ?e, "Failed to parse project file YAML");
            Err(anyhow::anyhow!("Failed to parse project file YAML: {e}"))
        }
    }
}

fn read_project_file(options: &LoadOptions) -> Result<ProjectFile> {
    let (path, required) = match &options.config {
        Some(path) => (path.clone(), true),
        None => (options.root.join(PROJECT_FILE), false),
    };
    if !path.exists() {
        if required {
            error!(config_path = ?path, "Config file not found");
            bail!("Config file not found: {}", path.display());
        }
        return Ok(ProjectFile::default());
    }

    let content = match fs::read_to_string(&path) {
        Ok(content) => {
            info!(config_path = ?path, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ));
        }
    };
    parse_project_file(&content)
}

/// Anchor the project root to the current directory.
///
/// Tools run with their own working directories; paths handed to them must be
/// absolute.
fn absolute_root(root: &Path) -> Result<PathBuf> {
    match std::path::absolute(root) {
        Ok(path) => Ok(path),
        Err(e) => {
            error!(error = ?e, root = %root.display(), "Failed to resolve project root");
            Err(anyhow::anyhow!(
                "Failed to resolve project root {}: {}",
                root.display(),
                e
            ))
        }
    }
}

/// Build the configuration from explicit environment values.
pub fn load_config_with_env(
    options: &LoadOptions,
    scope_env: Option<&str>,
    ref_env: Option<&str>,
) -> Result<BuildConfig> {
    let defaults = resolve_defaults(scope_env, ref_env)?;
    let scope = options.scope.unwrap_or(defaults.scope);
    let reference = options.reference.clone().unwrap_or(defaults.reference);

    let root = absolute_root(&options.root)?;
    let file = read_project_file(options)?;
    let mut config = BuildConfig::new(ProjectLayout::new(&root), scope, reference);

    if let Some(locales) = file.locales {
        if locales.is_empty() {
            bail!("Project file lists no locales");
        }
        config.locales = locales;
    }
    if let Some(pdf) = file.pdf {
        if let Some(theme) = pdf.theme {
            config.pdf.theme = theme;
        }
        if let Some(fonts_dir) = pdf.fonts_dir {
            config.pdf.fonts_dir = fonts_dir;
        }
    }

    info!(
        root = %root.display(),
        scope = %config.scope,
        reference = %config.reference,
        "Config resolved"
    );
    Ok(config)
}

/// Build the configuration, reading `BUILD_SCOPE`/`BUILD_REF` from the process
/// environment. Call once per process.
pub fn load_config(options: &LoadOptions) -> Result<BuildConfig> {
    let scope_env = std::env::var(SCOPE_ENV).ok();
    let ref_env = std::env::var(REF_ENV).ok();
    load_config_with_env(options, scope_env.as_deref(), ref_env.as_deref())
}

