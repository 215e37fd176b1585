use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{application::data::LogLevel, divine::Game, render::RenderStyle};

/// Lists the contents of Larian game packages (.pak, .lsv) through Divine.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(long, short, default_value = "warn", value_enum, global = true)]
    pub log_level: LogLevel,

    /// Directory holding the saved Divine location
    #[clap(long, global = true)]
    pub config_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List the contents of a package file as a tree
    List {
        /// The package file (.pak, .lsv)
        package: PathBuf,

        #[clap(long, short, default_value = "bg3", value_enum)]
        game: Game,

        /// Divine executable to use instead of the saved one
        #[clap(long)]
        divine: Option<PathBuf>,

        /// Save --divine as the default for later runs
        #[clap(long, requires = "divine")]
        remember: bool,

        #[clap(long, short, default_value = "tree", value_enum)]
        style: RenderStyle,

        #[clap(long)]
        no_color: bool,
    },
    /// Save the location of the Divine executable
    SetDivine { path: PathBuf },
    /// Print the saved location of the Divine executable
    ShowDivine,
}
