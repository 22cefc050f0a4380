//! External toolchain: argument contracts and the process-spawning runner.
//!
//! Each builder below produces the exact command line a target needs; the
//! [`SystemRunner`] executes it and waits. Builders never touch the filesystem,
//! which keeps their argument lists easy to assert on.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::config::{BuildConfig, Locale};
use crate::contract::{CommandRunner, ToolInvocation};
use crate::error::BuildError;
use crate::layout::ProjectLayout;

/// Raster converter whose presence enables the SVG→PNG Lua filter.
pub const SVG_RASTERIZER: &str = "rsvg-convert";

/// `npx antora <playbook>`
pub fn site_build(layout: &ProjectLayout, playbook: &Path) -> ToolInvocation {
    ToolInvocation::new("npx", layout.root())
        .arg("antora")
        .path_arg(playbook)
}

/// asciidoctor-pdf for one (locale, version) export.
pub fn pdf_render(
    config: &BuildConfig,
    locale: Locale,
    version: &str,
    export_index: &Path,
    output: &Path,
) -> ToolInvocation {
    ToolInvocation::new("asciidoctor-pdf", config.layout.root())
        .attribute(format!("pdf-theme={}", config.pdf.theme))
        .attribute(format!("pdf-fontsdir={}", config.pdf.fonts_dir))
        .attribute("toc")
        .attribute(format!("toc-title={}", locale.toc_title()))
        .attribute("allow-uri-read")
        .attribute("title-page=true")
        .attribute(format!("revnumber={version}"))
        .attribute("version-label=")
        .arg("-o")
        .path_arg(output)
        .path_arg(export_index)
}

/// asciidoctor DocBook 5 render, run from inside the exports directory.
///
/// Revision and date attributes are unset so the converted document carries
/// only the metadata supplied through the Pandoc metadata file.
pub fn docbook_render(
    exports_dir: &Path,
    index_name: &str,
    extension: Option<&Path>,
    output: &Path,
) -> ToolInvocation {
    let mut invocation = ToolInvocation::new("asciidoctor", exports_dir).args(["-b", "docbook5"]);
    if let Some(extension) = extension {
        invocation = invocation.arg("-r").path_arg(extension);
    }
    invocation
        .attribute("allow-uri-read")
        .attribute("revdate!")
        .attribute("revnumber!")
        .attribute("docdate!")
        .attribute("docdatetime!")
        .arg("-o")
        .path_arg(output)
        .arg(index_name)
}

/// pandoc DocBook → DOCX conversion.
pub fn docx_convert(
    layout: &ProjectLayout,
    metadata: &Path,
    svg_filter: Option<&Path>,
    docbook: &Path,
    output: &Path,
) -> ToolInvocation {
    let mut invocation = ToolInvocation::new("pandoc", layout.root())
        .args(["--from=docbook", "--to=docx"])
        .arg(format!(
            "--reference-doc={}",
            layout.pandoc_reference().display()
        ))
        .arg(format!("--metadata-file={}", metadata.display()));
    if let Some(filter) = svg_filter {
        invocation = invocation.arg("--lua-filter").path_arg(filter);
    }
    invocation
        .arg("--lua-filter")
        .path_arg(&layout.cover_filter())
        .arg("-o")
        .path_arg(output)
        .path_arg(docbook)
}

/// htmltest over the generated site.
pub fn link_check(layout: &ProjectLayout) -> ToolInvocation {
    ToolInvocation::new("htmltest", layout.root())
        .args(["-c", ".htmltest.yml"])
        .path_arg(&layout.site_dir())
}

/// vale over the documentation sources.
pub fn prose_lint(layout: &ProjectLayout) -> ToolInvocation {
    ToolInvocation::new("vale", layout.root()).args(["--config=.vale.ini", "docs/"])
}

/// shellcheck on a script with carriage returns stripped first.
pub fn shell_lint(layout: &ProjectLayout, script: &Path) -> ToolInvocation {
    ToolInvocation::new("bash", layout.root())
        .arg("-lc")
        .arg(format!(
            "tr -d '\\r' < '{}' | shellcheck -",
            script.display()
        ))
}

/// Runner that spawns real child processes, one at a time.
#[derive(Debug, Default, Clone)]
pub struct SystemRunner {
    search_path: Option<Vec<PathBuf>>,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner with an explicit search path for [`CommandRunner::is_available`].
    pub fn with_search_path(search_path: Vec<PathBuf>) -> Self {
        Self {
            search_path: Some(search_path),
        }
    }

    fn search_path(&self) -> Vec<PathBuf> {
        match &self.search_path {
            Some(paths) => paths.clone(),
            None => std::env::var_os("PATH")
                .map(|p| std::env::split_paths(&p).collect())
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, invocation: &ToolInvocation) -> Result<(), BuildError> {
        println!(" ➜ {invocation}");
        debug!(cwd = %invocation.cwd.display(), command = %invocation, "Spawning tool");

        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .status()
            .await;

        match status {
            Ok(s) if s.success() => {
                info!(program = %invocation.program, status = ?s, "Tool finished");
                Ok(())
            }
            Ok(s) => {
                error!(
                    program = %invocation.program,
                    cwd = %invocation.cwd.display(),
                    "Tool exited with non-zero code: {}", s
                );
                Err(BuildError::ToolFailed {
                    program: invocation.program.clone(),
                    code: s.code(),
                })
            }
            Err(e) => {
                error!(error = ?e, program = %invocation.program, "Failed to launch tool");
                Err(BuildError::Spawn {
                    program: invocation.program.clone(),
                    source: e,
                })
            }
        }
    }

    fn is_available(&self, program: &str) -> bool {
        self.search_path()
            .iter()
            .any(|dir| is_executable(&dir.join(program)))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildScope;

    #[test]
    fn pdf_arguments_follow_the_renderer_contract() {
        let config = BuildConfig::new(ProjectLayout::new("/p"), BuildScope::Local, "HEAD");
        let invocation = pdf_render(
            &config,
            Locale::Ru,
            "main",
            Path::new("/p/build/asm/ru/main/_exports/index.adoc"),
            Path::new("/p/build/pdf/ru/main/adaptadocx-ru.pdf"),
        );
        assert_eq!(invocation.program, "asciidoctor-pdf");
        assert_eq!(
            invocation.args,
            vec![
                "-a",
                "pdf-theme=config/default-theme.yml",
                "-a",
                "pdf-fontsdir=/usr/share/fonts/truetype/dejavu",
                "-a",
                "toc",
                "-a",
                "toc-title=Содержание",
                "-a",
                "allow-uri-read",
                "-a",
                "title-page=true",
                "-a",
                "revnumber=main",
                "-a",
                "version-label=",
                "-o",
                "/p/build/pdf/ru/main/adaptadocx-ru.pdf",
                "/p/build/asm/ru/main/_exports/index.adoc",
            ]
        );
    }

    #[test]
    fn docbook_render_loads_extension_only_when_given() {
        let without = docbook_render(Path::new("/x"), "index.adoc", None, Path::new("/x/t.xml"));
        assert!(!without.args.contains(&"-r".to_string()));
        assert_eq!(without.cwd, PathBuf::from("/x"));
        assert_eq!(without.args.last().map(String::as_str), Some("index.adoc"));

        let with = docbook_render(
            Path::new("/x"),
            "index.adoc",
            Some(Path::new("/p/ext.rb")),
            Path::new("/x/t.xml"),
        );
        assert_eq!(with.value_of("-r"), Some("/p/ext.rb"));
        assert_eq!(with.value_of("-o"), Some("/x/t.xml"));
    }

    #[test]
    fn docx_convert_places_svg_filter_before_cover_filter() {
        let layout = ProjectLayout::new("/p");
        let invocation = docx_convert(
            &layout,
            Path::new("/m.yml"),
            Some(Path::new("/p/docx/svg2png.lua")),
            Path::new("/t.xml"),
            Path::new("/o.docx"),
        );
        assert_eq!(
            invocation.args,
            vec![
                "--from=docbook",
                "--to=docx",
                "--reference-doc=/p/docx/reference.docx",
                "--metadata-file=/m.yml",
                "--lua-filter",
                "/p/docx/svg2png.lua",
                "--lua-filter",
                "/p/docx/coverpage.lua",
                "-o",
                "/o.docx",
                "/t.xml",
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn availability_probes_the_configured_search_path() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join(SVG_RASTERIZER);
        std::fs::write(&tool, b"#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();
        let runner = SystemRunner::with_search_path(vec![dir.path().to_path_buf()]);
        assert!(runner.is_available(SVG_RASTERIZER));
        assert!(!runner.is_available("definitely-not-installed"));
    }

    #[cfg(unix)]
    #[test]
    fn non_executable_file_is_not_available() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join(SVG_RASTERIZER);
        std::fs::write(&tool, b"").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o644)).unwrap();
        let runner = SystemRunner::with_search_path(vec![dir.path().to_path_buf()]);
        assert!(!runner.is_available(SVG_RASTERIZER));
    }
}
