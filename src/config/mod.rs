mod settings_store;
mod tool_location;

pub use settings_store::{
    FileSettingsStore, SettingsLocationError, SettingsPersistError, SettingsStore, ToolSettings,
};
pub use tool_location::{
    InvalidToolPathError, Remembered, is_tool_file, remember_divine_path, resolve_divine_path,
};
