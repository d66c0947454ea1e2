//! File reference parsing.
//!
//! A namespace value may be a `${file(<path>)}` or `${file(<path>):<name>}`
//! directive instead of an inline object. This module decomposes such a
//! directive into its path components and derives the per-stage sibling path.

use super::files::{FileExtension, SUPPORTED_EXTENSIONS};
use regex_lite::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::LazyLock;

/// Matches `${file(<dir/>*<name>.<ext>)}` with an optional `:<variable>` suffix.
///
/// Groups: 1 full path, 2 directory prefix (last repetition), 3 file name with
/// extension, 4 file name without extension, 5 extension, 6 variable name.
static FILE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    let sep = regex_lite::escape(std::path::MAIN_SEPARATOR_STR);
    let extensions = SUPPORTED_EXTENSIONS
        .iter()
        .map(|ext| ext.as_str())
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(r"^\$\{{file\(((.+{sep})*((.+)\.({extensions})))\)(?::(.*))?\}}$");
    Regex::new(&pattern).expect("file reference pattern is a valid regex")
});

/// Path components of a parsed `${file(...)}` directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReference {
    /// Path as written inside `file(...)`.
    pub full_path: String,
    /// Directory prefix including its trailing separator, if any.
    pub directory: Option<String>,
    /// File name with extension.
    pub full_file_name: String,
    /// File name without the final extension. May contain dots.
    pub file_name: String,
    pub file_extension: FileExtension,
    /// Name after the closing `):`, if present.
    pub variable_name: Option<String>,
}

impl FileReference {
    /// Parse a file reference directive.
    ///
    /// Returns `None` for anything that is not exactly a file directive with a
    /// supported extension, including other directives such as `${opt:stage}`.
    pub fn parse(input: &str) -> Option<Self> {
        if input.is_empty() {
            return None;
        }
        let caps = FILE_REFERENCE.captures(input)?;
        let file_extension = caps.get(5)?.as_str().parse().ok()?;

        Some(Self {
            full_path: caps.get(1)?.as_str().to_string(),
            directory: caps.get(2).map(|m| m.as_str().to_string()),
            full_file_name: caps.get(3)?.as_str().to_string(),
            file_name: caps.get(4)?.as_str().to_string(),
            file_extension,
            variable_name: caps.get(6).map(|m| m.as_str().to_string()),
        })
    }

    /// Parse a configuration value; only strings can be file references.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Self::parse(s),
            _ => None,
        }
    }

    /// Path of the per-stage sibling: `<directory><file_name>.<stage>.<ext>`.
    pub fn stage_path(&self, stage: &str) -> String {
        format!(
            "{}{}.{}.{}",
            self.directory.as_deref().unwrap_or(""),
            self.file_name,
            stage,
            self.file_extension
        )
    }
}

/// Stage sibling path for an optional reference.
pub fn stage_file_path(reference: Option<&FileReference>, stage: &str) -> Option<String> {
    reference.map(|r| r.stage_path(stage))
}
