//! Variable resolution for the custom and environment namespaces.
//!
//! Each namespace value is classified by shape:
//! - a `${file(...)}` string loads that file and its stage sibling
//! - an object, an array (or nothing) is combined with `./<stem>` and
//!   `./<stem>.<stage>`
//! - anything else is left alone
//!
//! Sources are merged in precedence order: inline literal, base file, stage file.

use super::files::{FileSystem, probe_extension};
use super::merge::{MergeStrategy, merge};
use super::reference::FileReference;
use crate::error::ComposeResult;
use crate::host::ServiceConfig;
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Independently configured variable group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// `custom`, deep merged from `variables.*` files
    Custom,
    /// `provider.environment`, shallow merged from `environment.*` files
    Environment,
}

impl Namespace {
    /// Namespaces in resolution order.
    pub const ALL: [Namespace; 2] = [Namespace::Custom, Namespace::Environment];

    /// Conventional base file stem, without directory or extension.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Namespace::Custom => "variables",
            Namespace::Environment => "environment",
        }
    }

    pub fn strategy(&self) -> MergeStrategy {
        match self {
            Namespace::Custom => MergeStrategy::Deep,
            Namespace::Environment => MergeStrategy::Shallow,
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Namespace::Custom => write!(f, "custom"),
            Namespace::Environment => write!(f, "environment"),
        }
    }
}

/// Outcome of resolving one namespace value.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// The literal value stands as written; nothing to write back.
    Unchanged,
    /// Merged value replacing the literal.
    Merged(Value),
}

impl Resolved {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Resolved::Unchanged)
    }

    /// The effective value given the literal it was resolved from.
    pub fn into_value(self, literal: Option<Value>) -> Option<Value> {
        match self {
            Resolved::Unchanged => literal,
            Resolved::Merged(value) => Some(value),
        }
    }
}

/// Resolution results for both namespaces.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub custom: Resolved,
    pub environment: Resolved,
}

impl Composition {
    pub fn get(&self, namespace: Namespace) -> &Resolved {
        match namespace {
            Namespace::Custom => &self.custom,
            Namespace::Environment => &self.environment,
        }
    }
}

/// Resolves namespace values against the files of one service for one stage.
pub struct Composer<'a> {
    fs: &'a dyn FileSystem,
    stage: String,
}

impl<'a> Composer<'a> {
    pub fn new(fs: &'a dyn FileSystem, stage: impl Into<String>) -> Self {
        Self {
            fs,
            stage: stage.into(),
        }
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    /// Resolve both namespaces of a service, custom first.
    ///
    /// The service is not modified; apply the result with
    /// [`ServiceConfig::apply`].
    pub fn compose(&self, service: &ServiceConfig) -> ComposeResult<Composition> {
        let mut composition = Composition {
            custom: Resolved::Unchanged,
            environment: Resolved::Unchanged,
        };
        for namespace in Namespace::ALL {
            let resolved = self.resolve_namespace(namespace, service.namespace(namespace))?;
            match namespace {
                Namespace::Custom => composition.custom = resolved,
                Namespace::Environment => composition.environment = resolved,
            }
        }
        Ok(composition)
    }

    pub fn resolve_namespace(
        &self,
        namespace: Namespace,
        literal: Option<&Value>,
    ) -> ComposeResult<Resolved> {
        let resolved = self.resolve(literal, namespace.file_stem(), namespace.strategy())?;
        if resolved.is_unchanged() {
            debug!(namespace = %namespace, "No variable files apply; keeping literal value");
        } else {
            info!(namespace = %namespace, stage = %self.stage, "Composed variables");
        }
        Ok(resolved)
    }

    /// Resolve a single literal value.
    pub fn resolve(
        &self,
        literal: Option<&Value>,
        file_stem: &str,
        strategy: MergeStrategy,
    ) -> ComposeResult<Resolved> {
        match literal {
            Some(Value::String(input)) => self.resolve_reference(input, strategy),
            None | Some(Value::Null) | Some(Value::Object(_)) | Some(Value::Array(_)) => {
                self.resolve_conventional(literal, file_stem, strategy)
            }
            Some(_) => Ok(Resolved::Unchanged),
        }
    }

    fn resolve_reference(&self, input: &str, strategy: MergeStrategy) -> ComposeResult<Resolved> {
        let Some(reference) = FileReference::parse(input) else {
            return Ok(Resolved::Unchanged);
        };
        let stage_path = reference.stage_path(&self.stage);
        debug!(
            base = %reference.full_path,
            stage_file = %stage_path,
            "Resolving file reference"
        );

        let merged = self.merge_files(
            strategy,
            None,
            Some(reference.full_path.as_str()),
            Some(stage_path.as_str()),
        )?;
        Ok(Resolved::Merged(merged))
    }

    fn resolve_conventional(
        &self,
        literal: Option<&Value>,
        file_stem: &str,
        strategy: MergeStrategy,
    ) -> ComposeResult<Resolved> {
        let base_stem = format!("./{}", file_stem);
        let stage_stem = format!("./{}.{}", file_stem, self.stage);
        let base_path = probe_extension(self.fs, Some(base_stem.as_str()));
        let stage_path = probe_extension(self.fs, Some(stage_stem.as_str()));
        if base_path.is_none() && stage_path.is_none() {
            return Ok(Resolved::Unchanged);
        }

        // Arrays are handed to the merge as-is: spread when shallow, skipped when deep.
        let inline = match literal {
            Some(value @ (Value::Object(_) | Value::Array(_))) => value.clone(),
            _ => Value::Object(Map::new()),
        };
        let merged = self.merge_files(
            strategy,
            Some(inline),
            base_path.as_deref(),
            stage_path.as_deref(),
        )?;
        Ok(Resolved::Merged(merged))
    }

    /// Read the base file, then the stage file, and merge after `inline`.
    fn merge_files(
        &self,
        strategy: MergeStrategy,
        inline: Option<Value>,
        base_path: Option<&str>,
        stage_path: Option<&str>,
    ) -> ComposeResult<Value> {
        let base = self.read(base_path)?;
        let stage = self.read(stage_path)?;
        Ok(merge(strategy, [inline, base, stage]))
    }

    fn read(&self, path: Option<&str>) -> ComposeResult<Option<Value>> {
        match path {
            Some(path) => self.fs.read(path),
            None => Ok(None),
        }
    }
}
