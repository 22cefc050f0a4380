use std::path::PathBuf;

/// Error taxonomy for every build target.
///
/// A missing export index or a missing site directory are not errors: both are
/// ordinary skip branches handled inside the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    // === External tools ===
    #[error("`{program}` exited with {}", describe_status(*code))]
    ToolFailed { program: String, code: Option<i32> },

    #[error("Failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    // === Filesystem ===
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    // === Intermediate artifacts ===
    #[error("DocBook validation failed for {}: {source}", path.display())]
    InvalidDocBook {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("Metadata template not found: {}", path.display())]
    MissingMetadataTemplate { path: PathBuf },

    // === Banned pattern scan ===
    #[error("banned patterns file not found → {}", path.display())]
    BannedPatternsMissing { path: PathBuf },

    #[error("Invalid banned pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{count} banned pattern hit(s), see {}", report.display())]
    BannedPatternsFound { count: usize, report: PathBuf },

    #[error("{0}")]
    Other(String),
}

fn describe_status(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {code}"),
        None => "no exit status (terminated by signal)".to_string(),
    }
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit status the CLI should terminate with.
    ///
    /// A failing external tool hands its own status through verbatim; every
    /// other failure (including a tool killed by a signal) maps to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            BuildError::ToolFailed {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_failure_propagates_its_status() {
        let err = BuildError::ToolFailed {
            program: "pandoc".into(),
            code: Some(64),
        };
        assert_eq!(err.exit_code(), 64);
        assert!(err.to_string().contains("exit status 64"));
    }

    #[test]
    fn signal_and_non_tool_failures_map_to_one() {
        let killed = BuildError::ToolFailed {
            program: "npx".into(),
            code: None,
        };
        assert_eq!(killed.exit_code(), 1);
        assert_eq!(BuildError::Other("boom".into()).exit_code(), 1);
    }
}
