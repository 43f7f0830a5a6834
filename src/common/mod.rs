//! Common defaults and the file exclusion rule.
// Shared constants and small value types used by the walker and the CLI.

use std::path::Path;

/// Source directory packed when nothing else is configured.
pub const DEFAULT_ROOT: &str = "dist";
/// Archive written when nothing else is configured.
pub const DEFAULT_OUTPUT: &str = "release.zip";
/// Source maps are never shipped in a release archive.
pub const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] = &["map"];

/// Decides which regular files are left out of the archive.
///
/// A file is excluded when its last dot-suffix equals one of the configured
/// extensions. The comparison is exact and case-sensitive: with the default
/// rule `app.js.map` is excluded, `app.map.js` is kept, and so is a file
/// literally named `.map` (it has no extension, only a leading dot).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludeRule {
    extensions: Vec<String>,
}

impl ExcludeRule {
    /// Builds a rule from extensions given with or without a leading dot.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_string())
            .filter(|e| !e.is_empty())
            .collect();
        Self { extensions }
    }

    /// A rule that keeps every file.
    pub fn none() -> Self {
        Self { extensions: Vec::new() }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Returns true if a file with this name must be skipped.
    pub fn is_excluded(&self, file_name: &str) -> bool {
        match Path::new(file_name).extension().and_then(|e| e.to_str()) {
            Some(ext) => self.extensions.iter().any(|x| x == ext),
            None => false,
        }
    }
}

impl Default for ExcludeRule {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_EXTENSIONS)
    }
}
