use super::{default_settings_path, ConfigError, Settings};
use std::fs;
use std::path::{Path, PathBuf};

pub fn save_settings(settings: &Settings) -> Result<PathBuf, ConfigError> {
    let path = default_settings_path()?;
    write_settings(&path, settings)?;
    Ok(path)
}

pub fn write_settings(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    settings.validate()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
            path: parent.display().to_string(),
            source,
        })?;
    }
    let body = serde_yaml::to_string(settings).map_err(|source| ConfigError::Encode {
        path: path.display().to_string(),
        source,
    })?;
    fs::write(path, body).map_err(|source| ConfigError::Write {
        path: path.display().to_string(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn written_settings_load_back_identically() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested/settings.yaml");
        let settings = Settings {
            state_root: dir.path().join("state"),
            directory: Default::default(),
            notifications: Default::default(),
            dedup: Default::default(),
        };

        write_settings(&path, &settings).expect("write");
        let loaded = Settings::from_path(&path).expect("load");
        assert_eq!(loaded.state_root, settings.state_root);
        assert_eq!(loaded.directory.api_base, settings.directory.api_base);
        assert_eq!(loaded.dedup.ttl_secs, settings.dedup.ttl_secs);
    }

    #[test]
    fn invalid_settings_are_rejected_before_touching_disk() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("settings.yaml");
        let settings = Settings {
            state_root: PathBuf::new(),
            directory: Default::default(),
            notifications: Default::default(),
            dedup: Default::default(),
        };

        assert!(write_settings(&path, &settings).is_err());
        assert!(!path.exists());
    }
}
