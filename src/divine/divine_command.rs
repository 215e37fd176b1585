use std::{
    ffi::OsString,
    path::PathBuf,
    pin::pin,
    process::Stdio,
};

use compio::{
    io::compat::AsyncStream,
    process::{ChildStderr, ChildStdout, Command},
};
use futures::io::BufReader;
use snafu::{OptionExt, ResultExt, Snafu};
use tracing::{debug, info, warn};

use crate::{
    divine::Game,
    ext::BestEffortPathExt,
    listing::{LineReader, PathTree},
};

/// How a finished tool process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingOutcome {
    Succeeded,
    /// Non-zero exit. `None` when the process was terminated without an exit code.
    Failed { code: Option<i32> },
}

#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub outcome: ListingOutcome,
    /// Everything the tool wrote to stderr, one line per entry.
    pub stderr: Vec<String>,
    /// Number of non-blank stdout lines inserted into the tree.
    pub lines: usize,
}

/// One `list-package` invocation of the Divine executable.
#[derive(Debug, Clone)]
pub struct DivineCommand {
    executable: PathBuf,
    game: Game,
    package: PathBuf,
}

impl DivineCommand {
    pub fn new(executable: impl Into<PathBuf>, game: Game, package: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            game,
            package: package.into(),
        }
    }

    /// Arguments in the order the tool expects them.
    pub fn arguments(&self) -> Vec<OsString> {
        vec![
            "--action".into(),
            "list-package".into(),
            "--game".into(),
            self.game.to_string().into(),
            "--source".into(),
            self.package.clone().into_os_string(),
        ]
    }

    /// Runs the tool to completion, inserting every listed path into `tree` as
    /// soon as its line is complete.
    ///
    /// A non-zero exit is not an error here: the returned outcome reports it and
    /// `tree` keeps whatever was parsed before the process ended.
    pub async fn run(&self, tree: &mut PathTree) -> Result<ToolOutput, DivineCommandError> {
        let mut cmd = self.create_command();
        info!(
            "Executing {} with arguments {:?}",
            self.executable.best_effort_path_display(),
            self.arguments()
        );

        let mut handle = cmd.spawn().context(SpawnSnafu {
            executable: self.executable.best_effort_path_display(),
        })?;

        let stdout = handle
            .stdout
            .take()
            .context(MissingPipeSnafu { stream: "stdout" })?;
        let stderr = handle
            .stderr
            .take()
            .context(MissingPipeSnafu { stream: "stderr" })?;

        let (lines, stderr) = futures::join!(feed_stdout(stdout, tree), collect_stderr(stderr));

        let status = handle.wait().await.context(WaitSnafu {
            executable: self.executable.best_effort_path_display(),
        })?;

        let outcome = if status.success() {
            info!("Listing completed successfully with {lines} entries");
            ListingOutcome::Succeeded
        } else {
            warn!("Listing process failed: {status}");
            ListingOutcome::Failed {
                code: status.code(),
            }
        };

        Ok(ToolOutput {
            outcome,
            stderr,
            lines,
        })
    }

    fn create_command(&self) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.args(self.arguments());
        let _ = cmd.stdin(Stdio::null());
        let _ = cmd.stdout(Stdio::piped());
        let _ = cmd.stderr(Stdio::piped());
        cmd
    }
}

/// Inserts each non-blank stdout line as soon as it is complete.
async fn feed_stdout(stdout: ChildStdout, tree: &mut PathTree) -> usize {
    let reader = pin!(BufReader::new(AsyncStream::new(stdout)));
    let mut lines = LineReader::new(reader);
    let mut inserted = 0;

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => inserted += insert_line(tree, &line),
            Ok(None) => break,
            Err(e) => {
                warn!("Error reading listing output, keeping partial results: {e}");
                break;
            }
        }
    }
    inserted
}

fn insert_line(tree: &mut PathTree, line: &str) -> usize {
    if line.trim().is_empty() {
        return 0;
    }
    tree.insert(line);
    1
}

async fn collect_stderr(stderr: ChildStderr) -> Vec<String> {
    let reader = pin!(BufReader::new(AsyncStream::new(stderr)));
    let mut lines = LineReader::new(reader);
    let mut collected = Vec::new();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if !line.is_empty() {
                    warn!("divine: {line}");
                    collected.push(line.to_string());
                }
            }
            Ok(None) => break,
            Err(e) => {
                debug!("Error reading stderr of the listing process: {e}");
                break;
            }
        }
    }
    collected
}

#[derive(Debug, Snafu)]
pub enum DivineCommandError {
    #[snafu(display("Failed to start the external tool at {}", executable))]
    SpawnError {
        executable: String,
        source: std::io::Error,
    },
    #[snafu(display("The external tool's {} was not captured", stream))]
    MissingPipe { stream: &'static str },
    #[snafu(display("Failed to wait for the external tool at {}", executable))]
    WaitError {
        executable: String,
        source: std::io::Error,
    },
}
