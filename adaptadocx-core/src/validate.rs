use std::fs;
use std::path::Path;

use tracing::{debug, error};

use crate::error::BuildError;

/// Fail fast on malformed DocBook before it reaches the converter.
///
/// Only well-formedness is checked; the parser's diagnostic is wrapped in
/// [`BuildError::InvalidDocBook`].
pub fn validate_docbook(path: &Path) -> Result<(), BuildError> {
    let xml = fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    match roxmltree::Document::parse_with_options(&xml, options) {
        Ok(_) => {
            debug!(path = %path.display(), "DocBook is well-formed");
            Ok(())
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "DocBook validation failed");
            Err(BuildError::InvalidDocBook {
                path: path.to_path_buf(),
                source: e,
            })
        }
    }
}
