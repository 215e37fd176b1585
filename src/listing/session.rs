use std::path::PathBuf;

use snafu::{ResultExt, Snafu, ensure};
use tracing::{debug, info};

use crate::{
    divine::{DivineCommand, DivineCommandError, Game, ListingOutcome},
    config::is_tool_file,
    ext::BestEffortPathExt,
    listing::PathTree,
};

/// What the user asked to list.
#[derive(Debug, Clone)]
pub struct ListingRequest {
    pub package: PathBuf,
    pub game: Game,
}

/// Result of a listing that got as far as running the tool. The tree stays
/// in the session.
#[derive(Debug, Clone)]
pub struct ListingReport {
    pub outcome: ListingOutcome,
    pub stderr: Vec<String>,
}

/// Owns the tool location and the tree of the most recent listing.
///
/// Listing needs `&mut self`, so one session never has two tool processes in
/// flight. Separate sessions share nothing.
#[derive(Debug)]
pub struct ListingSession {
    divine_path: Option<PathBuf>,
    tree: PathTree,
}

impl ListingSession {
    pub fn new(divine_path: Option<PathBuf>) -> Self {
        Self {
            divine_path,
            tree: PathTree::new(),
        }
    }

    /// Tree of the most recent listing, possibly partial.
    pub fn tree(&self) -> &PathTree {
        &self.tree
    }

    /// Checks the tool first, then the package. Returns the tool path and the
    /// package as an absolute path.
    pub fn validate(&self, request: &ListingRequest) -> Result<(PathBuf, PathBuf), ListingError> {
        let divine = self
            .divine_path
            .as_ref()
            .filter(|path| is_tool_file(path))
            .cloned()
            .ok_or_else(|| ListingError::DivineNotConfigured {
                path: self
                    .divine_path
                    .as_ref()
                    .map(|path| path.best_effort_path_display()),
            })?;

        ensure!(!request.package.as_os_str().is_empty(), PackageNotSelectedSnafu);
        ensure!(
            request.package.exists(),
            PackageNotFoundSnafu {
                path: request.package.best_effort_path_display(),
            }
        );
        let package = std::path::absolute(&request.package).context(PackagePathSnafu {
            path: request.package.display().to_string(),
        })?;

        Ok((divine, package))
    }

    /// Lists `request.package`, discarding the previous tree.
    ///
    /// A validation failure leaves the previous tree in place. Once the tool
    /// has been started, its failure is reported through the outcome and the
    /// partial tree is kept.
    pub async fn list(&mut self, request: &ListingRequest) -> Result<ListingReport, ListingError> {
        let (divine, package) = self.validate(request)?;
        debug!(
            "Listing {} for game {}",
            package.best_effort_path_display(),
            request.game
        );

        self.tree = PathTree::new();
        let output = DivineCommand::new(divine, request.game, package)
            .run(&mut self.tree)
            .await
            .context(InvocationSnafu)?;
        info!(
            "Tree holds {} nodes from {} listed lines",
            self.tree.node_count(),
            output.lines
        );

        Ok(ListingReport {
            outcome: output.outcome,
            stderr: output.stderr,
        })
    }
}

#[derive(Debug, Snafu)]
pub enum ListingError {
    #[snafu(display(
        "The path to Divine is not set or is invalid{}. Set it with `set-divine` or pass `--divine`",
        path.as_ref().map(|p| format!(" ({p})")).unwrap_or_default()
    ))]
    DivineNotConfigured { path: Option<String> },
    #[snafu(display("No package file was selected"))]
    PackageNotSelected,
    #[snafu(display("Package file {} does not exist", path))]
    PackageNotFound { path: String },
    #[snafu(display("Failed to resolve package path {}", path))]
    PackagePathError {
        path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to run the listing"))]
    InvocationError { source: DivineCommandError },
}
