//! Local-build playbook patching.
//!
//! A release playbook aggregates every tag (`tags: '*'`) and no branches
//! (`branches: ~`). For a local build the roles are swapped: tags are switched
//! off and the working reference becomes the only branch.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::{Captures, Regex};
use tempfile::TempPath;
use tracing::{debug, info};

use crate::error::BuildError;

fn tags_rule() -> &'static Regex {
    static RULE: OnceLock<Regex> = OnceLock::new();
    RULE.get_or_init(|| {
        Regex::new(r#"(?m)^([ \t]*tags:[ \t]*)['"]?\*['"]?[ \t]*$"#).expect("static regex")
    })
}

fn branches_rule() -> &'static Regex {
    static RULE: OnceLock<Regex> = OnceLock::new();
    RULE.get_or_init(|| Regex::new(r"(?m)^([ \t]*branches:[ \t]*)~[ \t]*$").expect("static regex"))
}

/// Apply both local-build substitutions to playbook text.
///
/// CRLF line endings are normalised to LF first. Lines that match neither
/// rule are returned untouched, and patching already-patched text is a no-op.
pub fn patch_playbook_text(text: &str, reference: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let text = tags_rule().replace_all(&text, "${1}~");
    branches_rule()
        .replace_all(&text, |caps: &Captures| format!("{}{}", &caps[1], reference))
        .into_owned()
}

/// Sibling path the patched copy is written to: `<stem>.local<.ext>`.
pub fn patched_playbook_path(playbook: &Path) -> PathBuf {
    let stem = playbook
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match playbook.extension() {
        Some(ext) => format!("{stem}.local.{}", ext.to_string_lossy()),
        None => format!("{stem}.local"),
    };
    playbook.with_file_name(name)
}

/// Write a patched copy of `playbook` next to it.
///
/// The returned [`TempPath`] deletes the copy when dropped, so the file is
/// gone on every exit path of the caller, including a failed site build.
pub fn write_patched_playbook(playbook: &Path, reference: &str) -> Result<TempPath, BuildError> {
    let original = fs::read_to_string(playbook).map_err(|e| BuildError::io(playbook, e))?;
    let patched = patch_playbook_text(&original, reference);
    let target = patched_playbook_path(playbook);

    fs::write(&target, &patched).map_err(|e| BuildError::io(&target, e))?;
    if patched == original {
        debug!(path = %playbook.display(), "Playbook had nothing to patch");
    }
    info!(
        source = %playbook.display(),
        patched = %target.display(),
        reference = reference,
        "Wrote patched playbook"
    );
    Ok(TempPath::from_path(target))
}
