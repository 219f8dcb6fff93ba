//! Command-line surface.

use clap::{Args, Parser, Subcommand, ValueEnum};
use lvgen_core::ArtifactKind;
use std::path::PathBuf;

/// Schema-driven CRUD scaffolding for gin/gorm + Vue admin panels
#[derive(Debug, Parser)]
#[command(name = "lvgen", version, long_about = None)]
pub struct Cli {
    /// Settings file (default: ./lvgen.toml when present)
    #[arg(short, long, env = "LVGEN_CONFIG", global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Database connection string, overrides [database] url
    #[arg(long, env = "LVGEN_DATABASE_URL", global = true, hide_env_values = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List tables with their comments
    Tables {
        #[arg(long)]
        json: bool,
    },

    /// List the columns of a table with their inferred attributes
    Columns {
        table: String,

        #[arg(long)]
        json: bool,
    },

    /// Render a module without writing anything
    Preview {
        /// Table to render against the live schema
        #[arg(required_unless_present = "from_json")]
        table: Option<String>,

        #[command(flatten)]
        names: NameArgs,

        /// Print a single artifact
        #[arg(long, value_enum)]
        artifact: Option<ArtifactArg>,

        /// Print the artifact map as JSON
        #[arg(long)]
        json: bool,

        /// Render a serialized config offline, without a database
        #[arg(long, value_name = "FILE", conflicts_with = "table")]
        from_json: Option<PathBuf>,
    },

    /// Generate a module, patch the router and register its menu entry
    Generate {
        table: String,

        #[command(flatten)]
        names: NameArgs,

        /// Parent menu identifier (0 = top level)
        #[arg(long, default_value_t = 0)]
        parent_menu: u64,

        /// Menu icon, overrides [menu] default_icon
        #[arg(long)]
        icon: Option<String>,

        /// Replace existing files
        #[arg(long)]
        overwrite: bool,

        /// Leave partial output in place when a stage fails.
        /// Without it a failed run rolls back the files, router patch and
        /// menu entry it already committed
        #[arg(long)]
        keep_partial: bool,
    },
}

/// Overrides of the names derived from the table name.
#[derive(Debug, Clone, Default, Args)]
pub struct NameArgs {
    #[arg(long)]
    pub module: Option<String>,

    #[arg(long)]
    pub package: Option<String>,

    #[arg(long = "struct", value_name = "STRUCT")]
    pub struct_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ArtifactArg {
    Entity,
    Service,
    Handler,
    Routes,
    View,
    #[value(name = "api_client")]
    ApiClient,
}

impl From<ArtifactArg> for ArtifactKind {
    fn from(arg: ArtifactArg) -> Self {
        match arg {
            ArtifactArg::Entity => ArtifactKind::Entity,
            ArtifactArg::Service => ArtifactKind::Service,
            ArtifactArg::Handler => ArtifactKind::Handler,
            ArtifactArg::Routes => ArtifactKind::Routes,
            ArtifactArg::View => ArtifactKind::View,
            ArtifactArg::ApiClient => ArtifactKind::ApiClient,
        }
    }
}
