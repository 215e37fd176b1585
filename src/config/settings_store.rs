use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

use compio::{BufResult, fs};
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml, YamlEmitter};
use snafu::prelude::*;
use tracing::{debug, info, warn};

use crate::{config::is_tool_file, ext::BestEffortPathExt};

/// Identifier the tool location is stored under.
pub const SERVICE_NAME: &str = "LSLibDivineGUI";
pub const DIVINE_PATH_KEY: &str = "DivineExePath";

const APP_DIR_NAME: &str = "pak-lister";
const SETTINGS_FILE_NAME: &str = "settings.yaml";

/// Persisted user settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolSettings {
    pub divine_path: Option<PathBuf>,
}

impl ToolSettings {
    /// Drops a stored tool path that no longer points at a file.
    pub fn validated(self) -> Self {
        match self.divine_path {
            Some(path) if is_tool_file(&path) => Self {
                divine_path: Some(path),
            },
            Some(path) => {
                warn!(
                    "Stored Divine path {} no longer exists",
                    path.best_effort_path_display()
                );
                Self::default()
            }
            None => Self::default(),
        }
    }

    fn to_yaml(&self) -> Result<String, saphyr::EmitError> {
        let mut service = LinkedHashMap::new();
        if let Some(path) = &self.divine_path {
            service.insert(
                Yaml::Value(Scalar::String(Cow::Borrowed(DIVINE_PATH_KEY))),
                Yaml::Value(Scalar::String(path.to_string_lossy())),
            );
        }
        let mut top_level = LinkedHashMap::new();
        top_level.insert(
            Yaml::Value(Scalar::String(Cow::Borrowed(SERVICE_NAME))),
            Yaml::Mapping(service),
        );

        let mut out = String::new();
        YamlEmitter::new(&mut out).dump(&Yaml::Mapping(top_level))?;
        out.push('\n');
        Ok(out)
    }
}

impl TryFrom<&str> for ToolSettings {
    type Error = SettingsParseError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ScanSnafu)?;
        let Some(document) = documents.first() else {
            return Ok(Self::default());
        };

        let top_level = document.as_mapping().context(TopLevelNotMapSnafu)?;
        let Some(service) = top_level.get(&Yaml::Value(Scalar::String(Cow::Borrowed(SERVICE_NAME))))
        else {
            return Ok(Self::default());
        };
        if is_null(service) {
            return Ok(Self::default());
        }
        let service = service.as_mapping().context(ServiceNotMapSnafu)?;

        let divine_path = match service.get(&Yaml::Value(Scalar::String(Cow::Borrowed(
            DIVINE_PATH_KEY,
        )))) {
            None => None,
            Some(value) if is_null(value) => None,
            Some(value) => Some(PathBuf::from(
                value.as_str().context(PathNotStringSnafu)?,
            )),
        };

        Ok(Self { divine_path })
    }
}

fn is_null(value: &Yaml) -> bool {
    matches!(value, Yaml::Value(Scalar::Null))
}

/// Where the tool location is remembered between runs.
pub trait SettingsStore {
    /// Never fails: anything unreadable counts as "not configured".
    async fn load(&self) -> ToolSettings;
    async fn save(&self, settings: &ToolSettings) -> Result<(), SettingsPersistError>;
}

/// Stores settings as a small YAML document in the user's config directory.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    /// Uses `config_dir` when given, otherwise the platform config directory.
    pub fn new(config_dir: Option<&Path>) -> Result<Self, SettingsLocationError> {
        let dir = match config_dir {
            Some(dir) => dir.to_path_buf(),
            None => dirs::config_dir()
                .context(NoConfigDirSnafu)?
                .join(APP_DIR_NAME),
        };
        Ok(Self::at(dir.join(SETTINGS_FILE_NAME)))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileSettingsStore {
    async fn load(&self) -> ToolSettings {
        debug!(
            "Reading settings from {}",
            self.path.best_effort_path_display()
        );
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("No settings loaded: {e}");
                return ToolSettings::default();
            }
        };

        let contents = String::from_utf8_lossy(&bytes).into_owned();
        match ToolSettings::try_from(contents.as_str()) {
            Ok(settings) => settings.validated(),
            Err(e) => {
                warn!(
                    "Ignoring malformed settings file {}: {e}",
                    self.path.best_effort_path_display()
                );
                ToolSettings::default()
            }
        }
    }

    async fn save(&self, settings: &ToolSettings) -> Result<(), SettingsPersistError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.context(WriteSnafu {
                path: parent.best_effort_path_display(),
            })?;
        }

        let contents = settings.to_yaml().context(EmitSnafu)?;
        let BufResult(res, _) = fs::write(&self.path, contents.into_bytes()).await;
        res.context(WriteSnafu {
            path: self.path.best_effort_path_display(),
        })?;
        info!("Saved settings to {}", self.path.best_effort_path_display());
        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum SettingsParseError {
    #[snafu(display("Failed to parse the settings file"))]
    ScanError { source: saphyr::ScanError },
    #[snafu(display("Top level of the settings file should be a map"))]
    TopLevelNotMap,
    #[snafu(display("'{}' section should be a map", SERVICE_NAME))]
    ServiceNotMap,
    #[snafu(display("'{}' should be a string", DIVINE_PATH_KEY))]
    PathNotString,
}

#[derive(Debug, Snafu)]
pub enum SettingsPersistError {
    #[snafu(display("Failed to write settings to {}", path))]
    WriteError {
        path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to serialize the settings"))]
    EmitError { source: saphyr::EmitError },
}

#[derive(Debug, Snafu)]
pub enum SettingsLocationError {
    #[snafu(display("Could not determine the user's config directory; pass --config-dir"))]
    NoConfigDir,
}
