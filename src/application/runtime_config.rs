use std::path::PathBuf;

use crate::cli::{Cli, Command};

/// Everything a single run needs, detached from argument parsing.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub command: Command,
    pub config_dir: Option<PathBuf>,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            command: cli.command,
            config_dir: cli.config_dir,
        }
    }
}
