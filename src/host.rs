//! The service document whose variables are composed.
//!
//! Wraps the parsed `serverless.*` tree and exposes the paths composition
//! reads and writes: `custom`, `provider.environment`, `provider.stage` and
//! `plugins`.

use crate::config::{Composition, FileSystem, Namespace, Resolved, probe_extension};
use crate::error::{ComposeError, ComposeResult};
use serde_json::{Map, Value};
use tracing::debug;

/// Stage used when neither the command line nor the provider names one.
pub const DEFAULT_STAGE: &str = "dev";

/// Stem of the service document, probed with the supported extensions.
pub const SERVICE_FILE_STEM: &str = "./serverless";

/// Live, mutable service configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    document: Value,
}

impl ServiceConfig {
    pub fn new(document: Value) -> Self {
        Self { document }
    }

    /// Load a service document from a service-relative path.
    pub fn load(fs: &dyn FileSystem, relative_path: &str) -> ComposeResult<Self> {
        match fs.read(relative_path)? {
            Some(document @ Value::Object(_)) => Ok(Self::new(document)),
            Some(_) => Err(ComposeError::invalid_service_file(
                relative_path,
                "Service document must be a mapping",
            )),
            None => Err(ComposeError::invalid_service_file(
                relative_path,
                "Service document not found or has an unsupported extension",
            )),
        }
    }

    /// Find `serverless.<ext>` in the service directory and load it.
    pub fn discover(fs: &dyn FileSystem, root_display: &str) -> ComposeResult<Self> {
        let path = probe_extension(fs, Some(SERVICE_FILE_STEM))
            .ok_or_else(|| ComposeError::service_file_not_found(root_display))?;
        debug!(path = %path, "Found service document");
        Self::load(fs, &path)
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn custom(&self) -> Option<&Value> {
        self.document.get("custom")
    }

    pub fn environment(&self) -> Option<&Value> {
        self.document.get("provider")?.get("environment")
    }

    pub fn namespace(&self, namespace: Namespace) -> Option<&Value> {
        match namespace {
            Namespace::Custom => self.custom(),
            Namespace::Environment => self.environment(),
        }
    }

    pub fn provider_stage(&self) -> Option<&str> {
        self.document.get("provider")?.get("stage")?.as_str()
    }

    /// Stage to compose for: the explicit option, then `provider.stage`, then [`DEFAULT_STAGE`].
    pub fn resolve_stage(&self, option: Option<&str>) -> String {
        option
            .filter(|s| !s.is_empty())
            .or_else(|| self.provider_stage())
            .unwrap_or(DEFAULT_STAGE)
            .to_string()
    }

    /// Ordered plugin entries, as written.
    ///
    /// Accepts both a plain list and the `{ modules: [...] }` form. Entries
    /// that are not strings are kept so positions match the document.
    pub fn plugins(&self) -> &[Value] {
        let list = match self.document.get("plugins") {
            Some(Value::Object(map)) => map.get("modules"),
            other => other,
        };
        match list {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        }
    }

    pub fn set_custom(&mut self, value: Value) {
        self.root_mut().insert("custom".to_string(), value);
    }

    pub fn set_environment(&mut self, value: Value) {
        let provider = self
            .root_mut()
            .entry("provider")
            .or_insert_with(|| Value::Object(Map::new()));
        if !provider.is_object() {
            *provider = Value::Object(Map::new());
        }
        if let Value::Object(provider) = provider {
            provider.insert("environment".to_string(), value);
        }
    }

    pub fn set_namespace(&mut self, namespace: Namespace, value: Value) {
        match namespace {
            Namespace::Custom => self.set_custom(value),
            Namespace::Environment => self.set_environment(value),
        }
    }

    /// Write back the namespaces that resolved to a new value.
    ///
    /// Unchanged namespaces are not touched.
    pub fn apply(&mut self, composition: Composition) {
        for (namespace, resolved) in [
            (Namespace::Custom, composition.custom),
            (Namespace::Environment, composition.environment),
        ] {
            if let Resolved::Merged(value) = resolved {
                self.set_namespace(namespace, value);
            }
        }
    }

    fn root_mut(&mut self) -> &mut Map<String, Value> {
        if !self.document.is_object() {
            self.document = Value::Object(Map::new());
        }
        match &mut self.document {
            Value::Object(map) => map,
            _ => unreachable!("service document was just made an object"),
        }
    }
}
