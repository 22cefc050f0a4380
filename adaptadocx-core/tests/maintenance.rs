mod common;

use std::fs;

use adaptadocx_core::banned::{enforce, scan};
use adaptadocx_core::contract::{MockCommandRunner, ToolInvocation};
use adaptadocx_core::pipeline::{self, clean, shell_scripts, Target};
use adaptadocx_core::BuildError;
use common::{programs, recording_runner, Project, VALID_DOCBOOK};

#[tokio::test]
async fn test_target_skips_link_check_without_site() {
    let project = Project::new();
    let (runner, calls) = recording_runner(VALID_DOCBOOK, false);

    let report = pipeline::test(&project.layout(), &runner).await.unwrap();

    assert_eq!(report.targets, vec![Target::Test]);
    assert_eq!(programs(&calls), vec!["vale"]);
    let calls = calls.lock().unwrap();
    assert_eq!(calls[0].args, vec!["--config=.vale.ini", "docs/"]);
}

#[tokio::test]
async fn test_target_checks_links_then_lints_every_script() {
    let project = Project::new().with_site_version("en", "main");
    project.write_file("scripts/b.sh", "echo b\r\n");
    project.write_file("scripts/ci/a.sh", "echo a\n");
    project.write_file("scripts/README.md", "docs\n");
    let (runner, calls) = recording_runner(VALID_DOCBOOK, false);

    pipeline::test(&project.layout(), &runner).await.unwrap();

    assert_eq!(programs(&calls), vec!["htmltest", "vale", "bash", "bash"]);
    let calls = calls.lock().unwrap();
    assert_eq!(&calls[0].args[..2], &["-c", ".htmltest.yml"]);
    let b = project.root().join("scripts/b.sh");
    assert_eq!(calls[2].args[0], "-lc");
    assert_eq!(
        calls[2].args[1],
        format!("tr -d '\\r' < '{}' | shellcheck -", b.display())
    );
    assert!(calls[3].args[1].contains("scripts/ci/a.sh"));
}

#[tokio::test]
async fn prose_lint_failure_stops_the_test_target() {
    let project = Project::new();
    project.write_file("scripts/a.sh", "echo a\n");
    let mut runner = MockCommandRunner::new();
    runner
        .expect_run()
        .times(1)
        .returning(|invocation: &ToolInvocation| {
            Err(BuildError::ToolFailed {
                program: invocation.program.clone(),
                code: Some(2),
            })
        });

    let err = pipeline::test(&project.layout(), &runner).await.unwrap_err();
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn shell_scripts_are_found_recursively_in_name_order() {
    let project = Project::new();
    project.write_file("scripts/z.sh", "");
    project.write_file("scripts/a/y.sh", "");
    project.write_file("scripts/a/notes.txt", "");
    let scripts = shell_scripts(&project.layout()).unwrap();
    let names: Vec<_> = scripts
        .iter()
        .map(|p| p.strip_prefix(project.root()).unwrap().display().to_string())
        .collect();
    assert_eq!(names, vec!["scripts/a/y.sh", "scripts/z.sh"]);
}

#[test]
fn clean_is_non_fatal_without_build_tree() {
    let project = Project::new();
    let report = clean(&project.layout());
    assert_eq!(report.targets, vec![Target::Clean]);

    project.write_file("build/pdf/en/main/adaptadocx-en.pdf", "pdf");
    clean(&project.layout());
    assert!(!project.exists("build"));
}

#[test]
fn banned_scan_requires_patterns_file() {
    let project = Project::new();
    let err = scan(&project.layout()).unwrap_err();
    assert!(matches!(err, BuildError::BannedPatternsMissing { .. }));
}

#[test]
fn banned_scan_reports_hits_outside_excluded_paths() {
    let project = Project::new();
    project.write_file("security/banned-patterns.txt", "# no eval\neval\\(\nTODO-SECRET\n");
    project.write_file("docs/guide.md", "Never call eval(x).\n");
    project.write_file("src/app.ts", "const ok = 1;\n");
    project.write_file("node_modules/pkg/index.js", "eval(1)");
    project.write_file("dist/bundle.js", "eval(1)");
    project.write_file("lib/app.min.js", "eval(1)");
    project.write_file(".cache/x.md", "eval(1)");
    project.write_file("notes.txt", "TODO-SECRET");

    let report = scan(&project.layout()).unwrap();
    assert_eq!(report.files_scanned, 2);
    assert_eq!(report.hits.len(), 1);
    assert_eq!(report.hits[0].render(), "BANNED eval\\( → docs/guide.md");
}

#[test]
fn banned_enforce_writes_report_and_fails() {
    let project = Project::new();
    project.write_file("security/banned-patterns.txt", "password\\s*=\n");
    project.write_file("a.js", "let password = 'x'\n");
    project.write_file("b.md", "password = hunter2\n");

    let err = enforce(&project.layout()).unwrap_err();
    assert!(matches!(err, BuildError::BannedPatternsFound { count: 2, .. }));
    let report = fs::read_to_string(project.root().join("reports/banned-patterns-report.txt")).unwrap();
    assert_eq!(
        report,
        "BANNED password\\s*= → a.js\nBANNED password\\s*= → b.md"
    );
}

#[test]
fn banned_enforce_passes_on_clean_tree() {
    let project = Project::new();
    project.write_file("security/banned-patterns.txt", "forbidden\n");
    project.write_file("README.md", "all good\n");
    let report = enforce(&project.layout()).unwrap();
    assert!(report.hits.is_empty());
    assert!(!project.exists("reports"));
}
