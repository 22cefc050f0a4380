use adaptadocx_core::banned;
use adaptadocx_core::config::BuildScope;
use adaptadocx_core::pipeline::{self, BuildReport};
use adaptadocx_core::tools::SystemRunner;
use adaptadocx_core::BuildError;
use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use owo_colors::{OwoColorize, Stream};
use std::path::PathBuf;

use crate::load_config::{load_config, LoadOptions};

/// CLI for adaptadocx: build the documentation site and its PDF/DOCX exports.
#[derive(Parser)]
#[clap(
    name = "adaptadocx",
    version,
    about = "Build the multi-locale documentation site with per-version PDF and DOCX downloads"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Version scope: working reference only, or every tagged version
    /// [env: BUILD_SCOPE, default: local]
    #[clap(long, global = true, value_enum)]
    pub scope: Option<ScopeArg>,

    /// Working reference substituted into playbooks in local scope
    /// [env: BUILD_REF, default: HEAD]
    #[clap(long = "ref", global = true)]
    pub reference: Option<String>,

    /// Project root containing the playbooks and the build tree
    #[clap(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Optional YAML project file (defaults to <root>/adaptadocx.yml when present)
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Generate the HTML site for every locale
    BuildHtml,
    /// Generate HTML, then one PDF per locale and version
    BuildPdf,
    /// Generate HTML, then one DOCX per locale and version
    BuildDocx,
    /// Generate HTML, PDF and DOCX
    #[clap(visible_alias = "build-all")]
    BuildSite,
    /// Run link check, prose lint and shell lint
    Test,
    /// Remove the build tree
    Clean,
    /// Fail when a banned pattern occurs in scripts or Markdown
    ScanBanned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScopeArg {
    Local,
    Tags,
}

impl From<ScopeArg> for BuildScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Local => BuildScope::Local,
            ScopeArg::Tags => BuildScope::Tags,
        }
    }
}

impl Cli {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            root: self.root.clone(),
            config: self.config.clone(),
            scope: self.scope.map(BuildScope::from),
            reference: self.reference.clone(),
        }
    }
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<BuildReport> {
    tracing::info!("trace_initialised");

    let config = load_config(&cli.load_options())?;
    config.trace_loaded();
    let runner = SystemRunner::new();

    let report = match cli.command {
        Commands::BuildHtml => pipeline::build_html(&config, &runner).await?,
        Commands::BuildPdf => pipeline::build_pdf(&config, &runner).await?,
        Commands::BuildDocx => pipeline::build_docx(&config, &runner).await?,
        Commands::BuildSite => pipeline::build_site(&config, &runner).await?,
        Commands::Test => pipeline::test(&config.layout, &runner).await?,
        Commands::Clean => pipeline::clean(&config.layout),
        Commands::ScanBanned => {
            banned::enforce(&config.layout)?;
            BuildReport::default()
        }
    };

    print_report(&report);
    Ok(report)
}

fn print_report(report: &BuildReport) {
    for artifact in &report.artifacts {
        println!("  {}", artifact.display());
    }
    for target in &report.targets {
        let line = format!("[✓] {}", target.name());
        println!("{}", line.if_supports_color(Stream::Stdout, |t| t.green()));
    }
}

/// Process exit code for a failed run: a failing tool's own code when known.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<BuildError>()
        .map(BuildError::exit_code)
        .unwrap_or(1)
}
