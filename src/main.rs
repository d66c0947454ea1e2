//! composed-vars
//!
//! Composes a service's `custom` and `provider.environment` values from
//! stage-specific variable files and prints the result.

use anyhow::{Context, Result};
use clap::Parser;
use composed_vars::cli::{Cli, Command, RenderArgs};
use composed_vars::config::ServiceDir;
use composed_vars::format::{VariablesView, render};
use composed_vars::host::ServiceConfig;
use composed_vars::logging::{Logger, init_tracing};
use composed_vars::plugin::{ComposedVarsPlugin, PACKAGE_NAME, PluginOptions};
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log, cli.verbose)?;

    let fs = ServiceDir::new(&cli.service_path).with_modules(cli.allow_modules);
    let root_display = fs.root().display().to_string();
    let mut service = match &cli.config {
        Some(path) => ServiceConfig::load(&fs, path)
            .with_context(|| format!("Failed to load service document {}", path))?,
        None => ServiceConfig::discover(&fs, &root_display)?,
    };
    debug!(service_path = %root_display, "Loaded service document");

    let options = PluginOptions {
        stage: cli.stage.clone(),
    };
    let logger = Logger::new(PACKAGE_NAME);
    let plugin = ComposedVarsPlugin::initialize(&mut service, &options, &fs, logger)
        .context("Failed to compose variables")?;

    match cli.command {
        Some(Command::Merged) => plugin.merged_hook()?,
        Some(Command::Computed) => plugin.computed_hook(&service)?,
        Some(Command::Render(args)) => render_variables(&service, &args)?,
        None => render_variables(&service, &RenderArgs::default())?,
    }

    Ok(())
}

/// Write `{ custom, environment }` to stdout or the requested file.
fn render_variables(service: &ServiceConfig, args: &RenderArgs) -> Result<()> {
    let view = VariablesView {
        custom: service.custom(),
        environment: service.environment(),
    };
    let output = render(&view, args.format)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            debug!(path = %path.display(), format = %args.format, "Wrote composed variables");
        }
        None => println!("{}", output),
    }
    Ok(())
}
