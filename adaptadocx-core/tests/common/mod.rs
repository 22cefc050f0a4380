//! Shared fixtures for pipeline integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use adaptadocx_core::config::{BuildConfig, BuildScope};
use adaptadocx_core::contract::{MockCommandRunner, ToolInvocation};
use adaptadocx_core::layout::ProjectLayout;
use tempfile::TempDir;

pub const RELEASE_PLAYBOOK: &str = "\
site:
  title: Adaptadocx
content:
  sources:
  - url: .
    branches: ~
    tags: '*'
    start_path: docs
";

pub const VALID_DOCBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<book xmlns="http://docbook.org/ns/docbook" version="5.0"><title>Guide</title></book>"#;

/// Isolated project root.
pub struct Project {
    pub temp: TempDir,
}

impl Project {
    pub fn new() -> Self {
        Self {
            temp: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn layout(&self) -> ProjectLayout {
        ProjectLayout::new(self.root())
    }

    pub fn config(&self, scope: BuildScope, reference: &str) -> BuildConfig {
        BuildConfig::new(self.layout(), scope, reference)
    }

    /// Write a file relative to the project root, creating parents.
    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn with_playbooks(self) -> Self {
        for locale in ["ru", "en"] {
            self.write_file(&format!("antora-playbook-{locale}.yml"), RELEASE_PLAYBOOK);
        }
        self
    }

    /// Pretend the site generator produced `version` for `locale`.
    pub fn with_site_version(self, locale: &str, version: &str) -> Self {
        fs::create_dir_all(self.root().join("build/site").join(locale).join(version)).unwrap();
        self
    }

    /// Export index in the nested-by-version layout.
    pub fn with_export(self, locale: &str, version: &str) -> Self {
        self.write_file(
            &format!("build/asm/{locale}/{version}/_exports/index.adoc"),
            "= Guide\n",
        );
        self
    }

    pub fn with_metadata_templates(self) -> Self {
        for locale in ["ru", "en"] {
            self.write_file(
                &format!("config/meta-{locale}.yml"),
                "title: Adaptadocx\nsubtitle: \"{page-version}\"\n",
            );
        }
        self
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.root().join(relative).exists()
    }

    /// Every file below `relative`, as root-relative strings.
    pub fn files_under(&self, relative: &str) -> Vec<String> {
        let base = self.root().join(relative);
        if !base.exists() {
            return Vec::new();
        }
        walkdir_files(&base)
            .into_iter()
            .map(|p| p.strip_prefix(self.root()).unwrap().display().to_string())
            .collect()
    }
}

fn walkdir_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            files.extend(walkdir_files(&path));
        } else {
            files.push(path);
        }
    }
    files.sort();
    files
}

pub type CallLog = Arc<Mutex<Vec<ToolInvocation>>>;

/// Runner that records every invocation and fakes the files tools would write.
///
/// `docbook` is written wherever `asciidoctor` is told to put its output.
pub fn recording_runner(docbook: &'static str, svg_available: bool) -> (MockCommandRunner, CallLog) {
    let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
    let log = calls.clone();
    let mut runner = MockCommandRunner::new();
    runner
        .expect_run()
        .returning(move |invocation: &ToolInvocation| {
            log.lock().unwrap().push(invocation.clone());
            fake_outputs(invocation, docbook);
            Ok(())
        });
    runner.expect_is_available().return_const(svg_available);
    (runner, calls)
}

fn fake_outputs(invocation: &ToolInvocation, docbook: &str) {
    let Some(output) = invocation.value_of("-o") else {
        return;
    };
    let content = match invocation.program.as_str() {
        "asciidoctor" => docbook,
        "asciidoctor-pdf" => "%PDF-1.7 fake",
        "pandoc" => "PK fake docx",
        _ => return,
    };
    fs::write(output, content).unwrap();
}

pub fn programs(calls: &CallLog) -> Vec<String> {
    calls
        .lock()
        .unwrap()
        .iter()
        .map(|c| c.program.clone())
        .collect()
}
