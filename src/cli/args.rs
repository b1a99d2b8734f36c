//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

use crate::config::ConfigOverrides;

/// Restructure a LaTeX project: split it into files by rule and relocate its assets
#[derive(Parser, Debug)]
#[command(name = "flexitex")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity: -d info, -dd debug, -ddd trace
    #[arg(short = 'd', long = "debug", action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project config file (default: ./flexitex.toml if present)
    #[arg(short, long, global = true, env = "FLEXITEX_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: OverrideArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Command line overrides applied on top of all config layers
#[derive(Args, Debug, Default, Clone)]
pub struct OverrideArgs {
    /// Source project folder
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub input: Option<PathBuf>,

    /// Token stream file, relative to the source folder
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub tokens: Option<PathBuf>,

    /// Output folder
    #[arg(short, long, global = true, value_hint = ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Name of the main output file
    #[arg(long, global = true)]
    pub main_file: Option<String>,

    /// Folder for relocated graphics, relative to the output folder
    #[arg(long, global = true)]
    pub figure_folder: Option<String>,

    /// Keep existing files in the output folder
    #[arg(long, global = true)]
    pub no_clear: bool,
}

impl OverrideArgs {
    pub fn to_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            input_folder: self.input.clone(),
            tokens: self.tokens.clone(),
            output_folder: self.output.clone(),
            main_file: self.main_file.clone(),
            figure_folder: self.figure_folder.clone(),
            clear: self.no_clear.then_some(false),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split the document and relocate assets into the output folder
    Split,

    /// Show the files and asset copies a split would produce, without writing
    Plan,

    /// Show the document tree
    Tree,

    /// Export the document tree as Graphviz DOT
    Dot {
        /// Only draw the document environment
        #[arg(long)]
        hide_preamble: bool,

        /// Write to file instead of stdout
        #[arg(short = 'O', long = "out", value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
    },

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
    /// Show merged config
    Show,

    /// Show config paths
    Path,

    /// Print a config template
    Template,
}
