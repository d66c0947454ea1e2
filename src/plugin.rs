//! One-shot composition of a service's variables.
//!
//! Initialization runs in a fixed order: plugin ordering check, stage
//! selection, composition of both namespaces, write-back of changed values,
//! and capture of the `merged` snapshot. The `computed` view is read from
//! the live service whenever it is requested, so the two diverge once
//! anything else edits the service after initialization.

use crate::config::{Composer, FileSystem};
use crate::error::ComposeResult;
use crate::format::command_output;
use crate::host::ServiceConfig;
use crate::logging::Logger;
use serde_json::Value;
use tracing::info;

/// Command name of the plugin.
pub const PLUGIN_NAME: &str = "composed-vars";

/// Package identifier; expected first in the service's plugin list and
/// used as the operator log prefix.
pub const PACKAGE_NAME: &str = "serverless-plugin-composed-vars";

/// Options passed on the command line.
#[derive(Debug, Clone, Default)]
pub struct PluginOptions {
    pub stage: Option<String>,
}

/// Deep copies of both namespaces.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub custom: Option<Value>,
    pub environment: Option<Value>,
}

impl Snapshot {
    /// Copy the current namespace values out of a service.
    pub fn capture(service: &ServiceConfig) -> Self {
        Self {
            custom: service.custom().cloned(),
            environment: service.environment().cloned(),
        }
    }

    /// 2-space indented JSON of `{ custom, environment }`.
    pub fn to_report(&self) -> ComposeResult<String> {
        command_output(self.custom.as_ref(), self.environment.as_ref())
    }
}

/// Warning text when this package is not the first plugin.
///
/// The reported index counts every entry, including ones that are not names.
pub fn plugin_order_warning(plugins: &[Value]) -> Option<String> {
    let index = match plugins.iter().position(|p| p.as_str() == Some(PACKAGE_NAME)) {
        Some(0) => return None,
        Some(i) => i as i64,
        None => -1,
    };
    Some(format!(
        "To ensure {} functions properly, it should be the first plugin. Found it at index: {}",
        PACKAGE_NAME, index
    ))
}

/// Result of composing a service's variables at initialization.
pub struct ComposedVarsPlugin {
    stage: String,
    merged: Snapshot,
    logger: Logger,
}

impl ComposedVarsPlugin {
    /// Compose the service's variables and write the results back into it.
    ///
    /// Fails only when a variable file exists but cannot be decoded.
    pub fn initialize(
        service: &mut ServiceConfig,
        options: &PluginOptions,
        fs: &dyn FileSystem,
        logger: Logger,
    ) -> ComposeResult<Self> {
        if let Some(warning) = plugin_order_warning(service.plugins()) {
            logger.warning(&warning);
        }

        let stage = service.resolve_stage(options.stage.as_deref());
        let composition = Composer::new(fs, stage.as_str()).compose(service)?;
        let changed = [&composition.custom, &composition.environment]
            .iter()
            .filter(|r| !r.is_unchanged())
            .count();
        service.apply(composition);
        info!(stage = %stage, changed, "Variables composed");

        Ok(Self {
            stage,
            merged: Snapshot::capture(service),
            logger,
        })
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    /// Values as composed at initialization.
    pub fn merged(&self) -> &Snapshot {
        &self.merged
    }

    /// Values as they currently stand in the service.
    pub fn computed(&self, service: &ServiceConfig) -> Snapshot {
        Snapshot::capture(service)
    }

    pub fn merged_report(&self) -> ComposeResult<String> {
        self.merged.to_report()
    }

    pub fn computed_report(&self, service: &ServiceConfig) -> ComposeResult<String> {
        self.computed(service).to_report()
    }

    /// Log the `merged` report on the operator channel.
    pub fn merged_hook(&self) -> ComposeResult<()> {
        let report = self.merged_report()?;
        self.logger.log(&format!("\n{}", report));
        Ok(())
    }

    /// Log the `computed` report on the operator channel.
    pub fn computed_hook(&self, service: &ServiceConfig) -> ComposeResult<()> {
        let report = self.computed_report(service)?;
        self.logger.log(&format!("\n{}", report));
        Ok(())
    }
}
