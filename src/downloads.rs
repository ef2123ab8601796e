use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;

use crate::document_store::InputFile;

/// Writes renamed copies of processed files into the output directory.
#[derive(Debug, Clone)]
pub struct Downloader {
    output_dir: PathBuf,
}

impl Downloader {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write a byte-identical copy of the payload under the proposed name,
    /// creating the output directory on demand. The file handle is scoped to
    /// this call: created, written, flushed and closed before returning.
    pub fn save(&self, file: &InputFile, new_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!(
                "Failed to create output directory {}",
                self.output_dir.display()
            )
        })?;

        let target = self.output_dir.join(sanitize_proposed_name(new_name));
        let mut out = File::create(&target)
            .with_context(|| format!("Failed to create {}", target.display()))?;
        out.write_all(&file.bytes)
            .with_context(|| format!("Failed to write {}", target.display()))?;
        out.flush()
            .with_context(|| format!("Failed to flush {}", target.display()))?;

        Ok(target)
    }
}

/// The proposed name comes from a remote service, so it crosses a trust
/// boundary before touching the filesystem: anything outside
/// `[a-zA-Z0-9._-]` becomes an underscore, runs collapse, edges are trimmed
/// and the result is capped at 100 characters.
pub fn sanitize_proposed_name(name: &str) -> String {
    let unsafe_chars = Regex::new(r"[^a-zA-Z0-9._-]").unwrap();
    let underscore_runs = Regex::new(r"_{2,}").unwrap();

    let replaced = unsafe_chars.replace_all(name, "_");
    let collapsed = underscore_runs.replace_all(&replaced, "_");
    let trimmed = collapsed.trim_matches('_');

    let capped: String = trimmed.chars().take(100).collect();
    if capped.is_empty() {
        "renamed_document".to_string()
    } else {
        capped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_safe_names() {
        assert_eq!(
            sanitize_proposed_name("B-A5_Compaction.Test.pdf"),
            "B-A5_Compaction.Test.pdf"
        );
    }

    #[test]
    fn test_sanitize_replaces_and_collapses() {
        assert_eq!(
            sanitize_proposed_name("Trench Report (final).pdf"),
            "Trench_Report_final_.pdf"
        );
        assert_eq!(sanitize_proposed_name("__a///b__"), "a_b");
    }

    #[test]
    fn test_sanitize_strips_path_components() {
        let cleaned = sanitize_proposed_name("../../etc/passwd");
        assert!(!cleaned.contains('/'));
        assert!(!cleaned.contains('\\'));
    }

    #[test]
    fn test_sanitize_empty_falls_back() {
        assert_eq!(sanitize_proposed_name("///"), "renamed_document");
    }

    #[test]
    fn test_sanitize_caps_length() {
        let long = "a".repeat(300);
        assert_eq!(sanitize_proposed_name(&long).len(), 100);
    }
}
