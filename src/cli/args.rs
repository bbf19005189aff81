//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};

/// Category tree visualizer: expand/collapse layout for product catalogs
#[derive(Parser, Debug)]
#[command(name = "cattree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file (default: $XDG_CONFIG_HOME/cattree/cattree.toml)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// JSON tree file (default: built-in sample catalog)
    #[arg(short, long, global = true, env = "CATTREE_TREE", value_hint = ValueHint::FilePath)]
    pub tree: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the tree, replaying clicks on the given nodes
    Render {
        /// Visible node id to click, in order (repeatable), e.g. "Eletronicos/L:Alimentos"
        #[arg(short, long = "expand", value_name = "ID")]
        expand: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Tree)]
        format: OutputFormat,
    },

    /// List products of a category and all its subcategories
    Recommend {
        /// Category key
        key: String,
    },

    /// Show tree statistics and balance audit
    Info,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print effective configuration as TOML
    Show,
    /// Print a commented config template
    Template,
    /// Print the global config file location
    Path,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Indented tree of visible nodes
    Tree,
    /// HTML fragment of the rendered scene
    Html,
    /// JSON snapshot of nodes and connectors
    Json,
}
