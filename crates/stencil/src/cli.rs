//! CLI command structure using clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stencil")]
#[command(version, about = "Render brace-directive templates", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: stencil.toml in the current or a parent directory)
    #[arg(long, global = true, env = "STENCIL_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a template
    Render(RenderArgs),

    /// Compile templates and report errors
    Check {
        #[arg(required = true)]
        templates: Vec<String>,
    },

    /// List the blocks a template defines
    Blocks {
        template: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
pub struct RenderArgs {
    /// Template name or path
    pub template: String,

    /// Data file (.toml or .json) merged into the context; repeatable
    #[arg(short, long = "data", value_name = "FILE")]
    pub data: Vec<PathBuf>,

    /// Variable assignment, e.g. `title=Home` or `site.draft=true`; repeatable
    #[arg(short, long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Render this layout with the template's blocks as overrides
    #[arg(short, long)]
    pub layout: Option<String>,

    /// Write to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Do not register the built-in modifiers
    #[arg(long)]
    pub no_builtins: bool,
}
