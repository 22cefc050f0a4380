//! # contract: seam between the pipeline and external programs
//!
//! Every generator, renderer, converter and linter the build drives is reached
//! through the [`CommandRunner`] trait. The pipeline only decides *what* to run
//! and in which order; a runner decides *how*.
//!
//! ## Implementations
//! - [`crate::tools::SystemRunner`] spawns real processes and waits for each one.
//! - `MockCommandRunner` (generated by `mockall`) lets tests script outcomes,
//!   assert on arguments and simulate the files a tool would have produced.
//!
//! ## Contract
//! - `run` resolves only after the program has exited.
//! - A non-zero exit must surface as [`BuildError::ToolFailed`] carrying the
//!   program's exit status, so the CLI can propagate it verbatim.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mockall::automock;

use crate::error::BuildError;

/// One fully specified external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory; the project root unless a tool needs otherwise.
    pub cwd: PathBuf,
}

impl ToolInvocation {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        let rendered = path.display().to_string();
        self.arg(rendered)
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Asciidoctor attribute pair: `-a <attribute>`.
    pub fn attribute(self, attribute: impl Into<String>) -> Self {
        self.arg("-a").arg(attribute)
    }

    /// Value following `flag`, if the flag is present.
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Runs external programs on behalf of the pipeline.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the invocation to completion, failing on a non-zero exit.
    async fn run(&self, invocation: &ToolInvocation) -> Result<(), BuildError>;

    /// Whether `program` can be found on the search path.
    fn is_available(&self, program: &str) -> bool;
}
