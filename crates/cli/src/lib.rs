//! # lvgen CLI
//!
//! Command-line interface for lvgen.
//!
//! ## Commands
//!
//! - `tables` - List the tables of the configured database
//! - `columns` - Show a table's columns with their inferred attributes
//! - `preview` - Render a module without writing, live or from a JSON config
//! - `generate` - Run the full pipeline for one table
//!

pub mod args;
pub mod mysql;
pub mod output;
pub mod settings;

pub use args::{ArtifactArg, Cli, Command, NameArgs};
pub use settings::Settings;

use anyhow::Context;
use clap::Parser;
use lvgen_codegen::{
    Generator, Introspector, MenuRegistrar, Renderer, RollbackPolicy, render_offline,
};
use lvgen_ir::{GenerateConfig, GenerateRequest};
use std::path::Path;
use std::sync::Arc;

use crate::mysql::{MySqlMenuStore, MySqlSchemaStore};

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Tracing filter directive from the settings, if they name one.
pub fn log_directive(settings: &Settings) -> &str {
    settings.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
}

/// Execute one parsed command.
pub async fn run(cli: Cli, settings: Settings) -> anyhow::Result<()> {
    match cli.command {
        Command::Preview {
            from_json: Some(path),
            artifact,
            json,
            ..
        } => {
            let renderer = Renderer::new(&settings.templates()?)?;
            let rendered = render_offline(&renderer, read_config(&path)?)?;
            output::print_preview(&rendered, artifact.map(Into::into), json)
        }
        command => {
            let generator = connect(cli.database_url.as_deref(), &settings).await?;
            execute(&generator, command, &settings).await
        }
    }
}

async fn execute(generator: &Generator, command: Command, settings: &Settings) -> anyhow::Result<()> {
    match command {
        Command::Tables { json } => output::print_tables(&generator.list_tables().await?, json),
        Command::Columns { table, json } => {
            output::print_columns(&generator.list_columns(&table).await?, json)
        }
        Command::Preview {
            table: Some(table),
            names,
            artifact,
            json,
            ..
        } => {
            let config = build_config(generator, &table, names).await?;
            let rendered = generator.preview(config).await?;
            output::print_preview(&rendered, artifact.map(Into::into), json)
        }
        Command::Preview { table: None, .. } => {
            anyhow::bail!("preview needs a table name or --from-json")
        }
        Command::Generate {
            table,
            names,
            parent_menu,
            icon,
            overwrite,
            keep_partial,
        } => {
            let config = build_config(generator, &table, names).await?;
            let mut request = GenerateRequest::new(config)
                .with_parent_menu(parent_menu)
                .with_icon(icon.unwrap_or_else(|| settings.menu.default_icon.clone()));
            if overwrite {
                request = request.allow_overwrite();
            }

            let generator = if keep_partial {
                generator.clone().with_rollback(RollbackPolicy::Keep)
            } else {
                generator.clone()
            };

            match generator.generate(request).await {
                Ok(result) => {
                    output::print_result(&result);
                    Ok(())
                }
                Err(failure) => {
                    output::print_failure(&failure);
                    Err(failure.into())
                }
            }
        }
    }
}

async fn connect(url: Option<&str>, settings: &Settings) -> anyhow::Result<Generator> {
    let url = url
        .map(str::to_string)
        .or_else(|| settings.database.url.clone())
        .context("no database url: pass --database-url or set [database] url")?;

    let pool = mysql::connect(&url, settings.query_timeout()).await?;
    let introspector = Introspector::from_dsn(Arc::new(MySqlSchemaStore::new(pool.clone())), &url)?
        .with_timeout(settings.query_timeout());
    let menus = MenuRegistrar::new(Arc::new(MySqlMenuStore::new(pool)))
        .with_timeout(settings.menu_timeout());

    tracing::debug!(database = introspector.database(), "connected");
    Ok(Generator::new(introspector, settings.layout(), menus)?
        .with_inference(settings.inference_engine())
        .with_naming(settings.naming.clone())
        .with_renderer(Renderer::new(&settings.templates()?)?)
        .with_rollback(settings.generation.rollback))
}

async fn build_config(generator: &Generator, table: &str, names: NameArgs) -> anyhow::Result<GenerateConfig> {
    let mut builder = generator.builder_for(table).await?;
    if let Some(module) = names.module {
        builder = builder.module_name(module);
    }
    if let Some(package) = names.package {
        builder = builder.package_name(package);
    }
    if let Some(struct_name) = names.struct_name {
        builder = builder.struct_name(struct_name);
    }
    Ok(builder.build()?)
}

fn read_config(path: &Path) -> anyhow::Result<GenerateConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not a valid module config", path.display()))
}
