//! File access for variable sources.
//!
//! Paths handed to a [`FileSystem`] are relative to the service directory.
//! Missing files are not errors: they read as `None` and contribute nothing
//! to a merge. Malformed content is an error and aborts composition.

use crate::error::{ComposeError, ComposeResult};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Extensions recognized for variable files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileExtension {
    Yml,
    Yaml,
    Json,
    /// Executable module; only read when module sources are enabled.
    Js,
}

/// Supported extensions in probe priority order.
pub const SUPPORTED_EXTENSIONS: [FileExtension; 4] = [
    FileExtension::Yml,
    FileExtension::Yaml,
    FileExtension::Json,
    FileExtension::Js,
];

impl FileExtension {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileExtension::Yml => "yml",
            FileExtension::Yaml => "yaml",
            FileExtension::Json => "json",
            FileExtension::Js => "js",
        }
    }

    /// Extension of a path, taken from its last dot-delimited segment.
    pub fn of_path(path: &str) -> Option<Self> {
        path.rsplit_once('.')?.1.parse().ok()
    }
}

impl std::fmt::Display for FileExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FileExtension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yml" => Ok(FileExtension::Yml),
            "yaml" => Ok(FileExtension::Yaml),
            "json" => Ok(FileExtension::Json),
            "js" => Ok(FileExtension::Js),
            _ => Err(format!(
                "Unsupported extension '{}'. Valid options: yml, yaml, json, js",
                s
            )),
        }
    }
}

/// Read access to the files next to a service document.
pub trait FileSystem {
    /// Whether the file exists. Empty paths are never checked and report `false`.
    fn exists(&self, relative_path: &str) -> bool;

    /// Read and decode a file.
    ///
    /// Returns `Ok(None)` for an empty path, a missing file, or an
    /// unrecognized extension.
    fn read(&self, relative_path: &str) -> ComposeResult<Option<Value>>;
}

/// Find the first existing `<stem>.<ext>` in [`SUPPORTED_EXTENSIONS`] order.
///
/// An empty or missing stem returns `None` without any existence checks.
pub fn probe_extension(fs: &dyn FileSystem, stem: Option<&str>) -> Option<String> {
    let stem = stem.filter(|s| !s.is_empty())?;
    SUPPORTED_EXTENSIONS
        .iter()
        .map(|ext| format!("{}.{}", stem, ext))
        .find(|candidate| fs.exists(candidate))
}

/// Files on disk, resolved against a service directory.
#[derive(Debug, Clone)]
pub struct ServiceDir {
    root: PathBuf,
    allow_modules: bool,
}

impl ServiceDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            allow_modules: false,
        }
    }

    /// Enable evaluation of `.js` module sources through `node`.
    pub fn with_modules(mut self, allow: bool) -> Self {
        self.allow_modules = allow;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute-or-rooted path for a service-relative path.
    pub fn path(&self, relative_path: &str) -> PathBuf {
        self.root.join(relative_path)
    }

    fn read_text(&self, relative_path: &str, path: &Path) -> ComposeResult<String> {
        std::fs::read_to_string(path).map_err(|e| ComposeError::file_read(relative_path, e))
    }

    fn eval_module(&self, relative_path: &str, path: &Path) -> ComposeResult<Value> {
        if !self.allow_modules {
            return Err(ComposeError::module_disabled(relative_path));
        }

        let output = Command::new("node")
            .arg("-e")
            .arg(MODULE_EXPORT_SCRIPT)
            .arg(path)
            .output()
            .map_err(|e| ComposeError::module_failed(relative_path, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ComposeError::module_failed(relative_path, stderr.trim()));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| ComposeError::invalid_json(relative_path, e))
    }
}

/// Prints the module's export as JSON; `null` when it exports nothing serializable.
const MODULE_EXPORT_SCRIPT: &str = "const p = require('path').resolve(process.argv[1]); \
     process.stdout.write(JSON.stringify(require(p)) ?? 'null');";

impl FileSystem for ServiceDir {
    fn exists(&self, relative_path: &str) -> bool {
        if relative_path.is_empty() {
            return false;
        }
        self.path(relative_path).exists()
    }

    fn read(&self, relative_path: &str) -> ComposeResult<Option<Value>> {
        if relative_path.is_empty() {
            return Ok(None);
        }
        let path = self.path(relative_path);
        if !path.exists() {
            return Ok(None);
        }

        let Some(extension) = FileExtension::of_path(relative_path) else {
            debug!(path = %relative_path, "Skipping file with unrecognized extension");
            return Ok(None);
        };

        let value = match extension {
            FileExtension::Yml | FileExtension::Yaml => {
                let content = self.read_text(relative_path, &path)?;
                if content.trim().is_empty() {
                    Value::Null
                } else {
                    serde_yaml::from_str(&content)
                        .map_err(|e| ComposeError::invalid_yaml(relative_path, e))?
                }
            }
            FileExtension::Json => {
                let content = self.read_text(relative_path, &path)?;
                serde_json::from_str(&content)
                    .map_err(|e| ComposeError::invalid_json(relative_path, e))?
            }
            FileExtension::Js => self.eval_module(relative_path, &path)?,
        };

        debug!(path = %relative_path, format = %extension, "Read variable file");
        Ok(Some(value))
    }
}


#[cfg(test)]
mod tests {
    use super::memory::MemoryFileSystem;
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_supported_extension_order() {
        let names: Vec<&str> = SUPPORTED_EXTENSIONS.iter().map(|e| e.as_str()).collect();
        assert_eq!(names, ["yml", "yaml", "json", "js"]);
    }

    #[test]
    fn test_extension_of_path_uses_last_segment() {
        assert_eq!(FileExtension::of_path("./a.b.yaml"), Some(FileExtension::Yaml));
        assert_eq!(FileExtension::of_path("./a.txt"), None);
        assert_eq!(FileExtension::of_path("noext"), None);
    }

    #[test]
    fn test_probe_priority_beats_discovery() {
        let fs = MemoryFileSystem::new()
            .with_file("./variables.js", json!({}))
            .with_file("./variables.json", json!({}));

        let found = probe_extension(&fs, Some("./variables"));

        assert_eq!(found.as_deref(), Some("./variables.json"));
        assert_eq!(
            *fs.checked.borrow(),
            ["./variables.yml", "./variables.yaml", "./variables.json"]
        );
    }

    #[test]
    fn test_probe_short_circuits_on_first_match() {
        let fs = MemoryFileSystem::new().with_file("./environment.yml", json!({}));
        let found = probe_extension(&fs, Some("./environment"));
        assert_eq!(found.as_deref(), Some("./environment.yml"));
        assert_eq!(fs.checked.borrow().len(), 1);
    }

    #[test]
    fn test_probe_empty_stem_checks_nothing() {
        let fs = MemoryFileSystem::new();
        assert_eq!(probe_extension(&fs, None), None);
        assert_eq!(probe_extension(&fs, Some("")), None);
        assert!(fs.checked.borrow().is_empty());
    }

    #[test]
    fn test_probe_none_found() {
        let fs = MemoryFileSystem::new();
        assert_eq!(probe_extension(&fs, Some("./variables.dev")), None);
        assert_eq!(fs.checked.borrow().len(), 4);
    }

    #[test]
    fn test_service_dir_reads_yaml_and_json() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("variables.yml"), "a: 1\nnested:\n  b: [1, 2]\n").unwrap();
        std::fs::write(temp.path().join("variables.json"), r#"{"c": "three"}"#).unwrap();
        let dir = ServiceDir::new(temp.path());

        assert!(dir.exists("./variables.yml"));
        assert_eq!(
            dir.read("./variables.yml").unwrap(),
            Some(json!({"a": 1, "nested": {"b": [1, 2]}}))
        );
        assert_eq!(dir.read("variables.json").unwrap(), Some(json!({"c": "three"})));
    }

    #[test]
    fn test_service_dir_missing_and_empty_paths() {
        let temp = TempDir::new().unwrap();
        let dir = ServiceDir::new(temp.path());

        assert!(!dir.exists(""));
        assert!(!dir.exists("./variables.yml"));
        assert_eq!(dir.read("").unwrap(), None);
        assert_eq!(dir.read("./variables.yml").unwrap(), None);
    }

    #[test]
    fn test_service_dir_unrecognized_extension() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("notes.txt"), "a: 1").unwrap();
        let dir = ServiceDir::new(temp.path());
        assert_eq!(dir.read("notes.txt").unwrap(), None);
    }

    #[test]
    fn test_service_dir_malformed_yaml_is_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("variables.yml"), "a: [1, 2\nb: }").unwrap();
        let dir = ServiceDir::new(temp.path());

        let err = dir.read("variables.yml").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidYaml);
    }

    #[test]
    fn test_service_dir_empty_yaml_reads_null() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("variables.yml"), "\n").unwrap();
        let dir = ServiceDir::new(temp.path());
        assert_eq!(dir.read("variables.yml").unwrap(), Some(Value::Null));
    }

    #[test]
    fn test_modules_disabled_by_default() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("variables.js"), "module.exports = { a: 1 };").unwrap();
        let dir = ServiceDir::new(temp.path());

        assert!(dir.exists("variables.js"));
        let err = dir.read("variables.js").unwrap_err();
        assert_eq!(err.code, ErrorCode::ModuleDisabled);
    }
}
