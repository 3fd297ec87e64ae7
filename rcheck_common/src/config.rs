use crate::{CheckError, Settings};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "rcheck.toml";

#[derive(Debug, Clone)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub path: PathBuf,
    pub exists: bool,
}

/// Load settings from `explicit` or from the platform config directory.
///
/// A missing file is not an error; defaults are returned instead.
pub fn load_settings(explicit: Option<&Path>) -> Result<LoadedSettings, CheckError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => default_settings_path()?,
    };
    let exists = path.exists();

    let settings = if exists {
        let data = fs::read_to_string(&path)?;
        Settings::from_toml_str(&data)?
    } else {
        Settings::default()
    };

    Ok(LoadedSettings {
        settings,
        path,
        exists,
    })
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<(), CheckError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let data = toml::to_string_pretty(settings)
        .map_err(|e| CheckError::Serialization(e.to_string()))?;
    fs::write(path, data)?;
    Ok(())
}

pub fn default_settings_path() -> Result<PathBuf, CheckError> {
    let dirs = ProjectDirs::from("", "aecs4u", "rcheck")
        .ok_or_else(|| CheckError::Config("Unable to determine config directory".to_string()))?;
    Ok(dirs.config_dir().join(CONFIG_FILE_NAME))
}
