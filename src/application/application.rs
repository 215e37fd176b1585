use std::io::Write as _;
use std::path::{Path, PathBuf};

use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info, warn};

use crate::application::RuntimeConfig;
use crate::cli::Command;
use crate::config::{
    FileSettingsStore, InvalidToolPathError, Remembered, SettingsLocationError,
    SettingsPersistError, SettingsStore, remember_divine_path, resolve_divine_path,
};
use crate::divine::{Game, ListingOutcome};
use crate::ext::BestEffortPathExt;
use crate::listing::{ListingError, ListingRequest, ListingSession};
use crate::render::TreeRenderer;

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        let store = FileSettingsStore::new(app_config.config_dir.as_deref())
            .context(SettingsLocationSnafu)?;
        debug!(
            "Using settings file {}",
            store.path().best_effort_path_display()
        );

        match app_config.command {
            Command::List {
                package,
                game,
                divine,
                remember,
                style,
                no_color,
            } => {
                let divine_path =
                    Self::divine_for_listing(divine.as_deref(), remember, &store).await;
                let renderer = TreeRenderer::new(style, TreeRenderer::color_for_stdout(no_color));
                Self::list(divine_path, package, game, renderer).await
            }
            Command::SetDivine { path } => Self::set_divine(&path, &store).await,
            Command::ShowDivine => Self::show_divine(&store).await,
        }
    }

    /// Resolves the tool for this run, saving an explicit one when asked.
    /// Failing to save only costs the default for later runs.
    async fn divine_for_listing(
        explicit: Option<&Path>,
        remember: bool,
        store: &impl SettingsStore,
    ) -> Option<PathBuf> {
        if let (true, Some(path)) = (remember, explicit) {
            if let Err(e) = remember_divine_path(path, store).await {
                warn!("{e}");
            }
        }
        resolve_divine_path(explicit, store).await
    }

    async fn list(
        divine_path: Option<PathBuf>,
        package: PathBuf,
        game: Game,
        renderer: TreeRenderer,
    ) -> Result<(), ApplicationError> {
        let mut session = ListingSession::new(divine_path);
        let request = ListingRequest { package, game };

        let report = session.list(&request).await.context(ListingSnafu)?;

        let rendered = renderer.render(session.tree());
        std::io::stdout()
            .lock()
            .write_all(rendered.as_bytes())
            .context(OutputSnafu)?;
        if session.tree().is_empty() {
            info!("The package listed no entries");
        }

        match report.outcome {
            ListingOutcome::Succeeded => Ok(()),
            ListingOutcome::Failed { code } => ListingFailedSnafu {
                code,
                stderr: report.stderr.join("\n"),
            }
            .fail(),
        }
    }

    async fn set_divine(path: &Path, store: &impl SettingsStore) -> Result<(), ApplicationError> {
        match remember_divine_path(path, store)
            .await
            .context(InvalidDivineSnafu)?
        {
            Remembered::Persisted => {
                info!("Saved Divine path {}", path.best_effort_path_display());
                Ok(())
            }
            Remembered::SessionOnly { error } => Err(error).context(SettingsNotSavedSnafu),
        }
    }

    async fn show_divine(store: &impl SettingsStore) -> Result<(), ApplicationError> {
        let line = match store.load().await.divine_path {
            Some(path) => path.best_effort_path_display(),
            None => "Divine path not set".to_string(),
        };
        writeln!(std::io::stdout().lock(), "{line}").context(OutputSnafu)
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code".to_string(),
    }
}

fn describe_stderr(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(":\n{stderr}")
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Could not locate the settings file"))]
    SettingsLocationError { source: SettingsLocationError },
    #[snafu(display("Cannot list the package"))]
    ListingError { source: ListingError },
    #[snafu(display(
        "Divine failed with {}{}",
        describe_exit(code),
        describe_stderr(stderr)
    ))]
    ListingFailed { code: Option<i32>, stderr: String },
    #[snafu(display("Divine path was not changed"))]
    InvalidDivineError { source: InvalidToolPathError },
    #[snafu(display("Could not save the Divine path"))]
    SettingsNotSavedError { source: SettingsPersistError },
    #[snafu(display("Failed to write the listing"))]
    OutputError { source: std::io::Error },
}
