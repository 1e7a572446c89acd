use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use log::{debug, info, warn};

use super::errors::{ConfigError, Result};
use super::profile::{Config, Profile};

/// Overrides the config directory when set to a non-empty path.
pub const CONFIG_DIR_ENV: &str = "S3HERO_CONFIG_DIR";

const CONFIG_DIR_NAME: &str = ".s3hero";
const CONFIG_FILE_NAME: &str = "config.json";

/// `$S3HERO_CONFIG_DIR` if set, otherwise `~/.s3hero`.
pub fn default_config_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let base = BaseDirs::new().ok_or(ConfigError::NoHomeDir)?;
    Ok(base.home_dir().join(CONFIG_DIR_NAME))
}

/// Owns the in-memory [`Config`] and the file it is persisted to.
///
/// Every mutating call rewrites the whole file before returning. If that
/// write fails the change is still visible in memory, so a caller that sees
/// an error from a mutation should assume memory and disk have diverged.
///
/// There is no locking: two processes editing the same file race, and the
/// last `save` wins.
#[derive(Debug)]
pub struct Manager {
    path: PathBuf,
    config: Config,
}

impl Manager {
    /// Opens the profile store in [`default_config_dir`].
    pub fn new() -> Result<Self> {
        Self::at_dir(default_config_dir()?)
    }

    /// Opens (creating if needed) the profile store in `dir`.
    ///
    /// A missing `config.json` yields an empty config; an unreadable or
    /// malformed one is an error.
    pub fn at_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        create_private_dir(&dir).map_err(|source| ConfigError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        let mut manager = Self {
            path: dir.join(CONFIG_FILE_NAME),
            config: Config::default(),
        };
        match manager.load() {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!("No config at {:?} yet, starting empty", manager.path);
            }
            Err(e) => return Err(e),
        }
        Ok(manager)
    }

    /// Replaces the in-memory config with the file's content.
    pub fn load(&mut self) -> Result<()> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound {
                    path: self.path.clone(),
                })
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let config: Config =
            serde_json::from_slice(&data).map_err(|source| ConfigError::Parse {
                path: self.path.clone(),
                source,
            })?;

        if !config.default_profile.is_empty()
            && !config.profiles.contains_key(&config.default_profile)
        {
            warn!(
                "Default profile '{}' in {:?} does not exist",
                config.default_profile, self.path
            );
        }
        for key in config.mismatched_keys() {
            warn!(
                "Profile stored under '{}' in {:?} is named '{}'",
                key, self.path, config.profiles[key].name
            );
        }
        debug!(
            "Loaded {} profile(s) from {:?}",
            config.profiles.len(),
            self.path
        );
        self.config = config;
        Ok(())
    }

    /// Writes the whole config as pretty JSON, replacing the file's content.
    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_vec_pretty(&self.config).map_err(ConfigError::Serialize)?;
        write_private_file(&self.path, &json).map_err(|source| ConfigError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!("Saved {} profile(s) to {:?}", self.config.profiles.len(), self.path);
        Ok(())
    }

    /// Creates or replaces the profile stored under `profile.name`.
    ///
    /// The first profile ever stored becomes the default.
    pub fn add_profile(&mut self, profile: Profile) -> Result<()> {
        if profile.name.is_empty() {
            return Err(ConfigError::EmptyName);
        }

        let name = profile.name.clone();
        let replaced = self.config.profiles.insert(name.clone(), profile).is_some();
        if self.config.profiles.len() == 1 {
            self.config.default_profile = name.clone();
        }
        info!(
            "{} profile '{}'",
            if replaced { "Updated" } else { "Added" },
            name
        );
        self.save()
    }

    /// Looks up `name`, or the default profile when `name` is empty.
    pub fn get_profile(&self, name: &str) -> Result<&Profile> {
        let name = if name.is_empty() {
            self.config.default_profile.as_str()
        } else {
            name
        };
        if name.is_empty() {
            return Err(ConfigError::NoDefault);
        }
        self.config
            .profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound(name.to_string()))
    }

    /// Removes `name`. If it was the default, the alphabetically first
    /// remaining profile takes over, or the default is cleared when none remain.
    pub fn delete_profile(&mut self, name: &str) -> Result<()> {
        if self.config.profiles.remove(name).is_none() {
            return Err(ConfigError::ProfileNotFound(name.to_string()));
        }

        if self.config.default_profile == name {
            self.config.default_profile = self
                .config
                .profiles
                .keys()
                .next()
                .cloned()
                .unwrap_or_default();
            info!(
                "Deleted default profile '{}', default is now '{}'",
                name, self.config.default_profile
            );
        } else {
            info!("Deleted profile '{}'", name);
        }
        self.save()
    }

    /// Names of all stored profiles. Callers must not rely on the order.
    pub fn list_profiles(&self) -> Vec<String> {
        self.config.profiles.keys().cloned().collect()
    }

    pub fn set_default(&mut self, name: &str) -> Result<()> {
        if !self.config.profiles.contains_key(name) {
            return Err(ConfigError::ProfileNotFound(name.to_string()));
        }
        self.config.default_profile = name.to_string();
        info!("Default profile set to '{}'", name);
        self.save()
    }

    /// The default profile's name, empty when there is none.
    pub fn default_profile(&self) -> &str {
        &self.config.default_profile
    }

    /// Read-only view of the whole config. Changes go through the methods above.
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}

/// Truncating write; the file ends up owner read/write only on Unix.
fn write_private_file(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    // `mode` only applies on creation; tighten files that already existed.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(data)?;
    file.flush()
}
