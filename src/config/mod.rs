// mod.rs - NDEx credentials file support

use ini::Ini;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the home directory when
/// --conf is not given. Shared with the other NDEx content loaders.
pub const CONFIG_FILE: &str = ".ndexutils.conf";

pub const USER_KEY: &str = "user";
pub const PASSWORD_KEY: &str = "password";
pub const SERVER_KEY: &str = "server";

/// Credentials for one NDEx account, read from a `[profile]` section of the
/// INI configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct NdexCredentials {
    pub user: String,
    pub password: String,
    pub server: String,
}

impl NdexCredentials {
    /// Load credentials for `profile` from the given configuration file,
    /// falling back to `~/.ndexutils.conf` when `conf` is `None`.
    pub fn load(conf: Option<&str>, profile: &str) -> Result<Self, String> {
        let path = match conf {
            Some(p) => PathBuf::from(p),
            None => default_config_path()?,
        };
        Self::from_file(&path, profile)
    }

    /// Parse one profile section out of an INI configuration file.
    pub fn from_file(path: &Path, profile: &str) -> Result<Self, String> {
        let conf = Ini::load_from_file(path).map_err(|e| {
            format!(
                "Failed to load configuration file '{}': {}",
                path.display(),
                e
            )
        })?;

        let section = conf.section(Some(profile)).ok_or_else(|| {
            format!(
                "Profile [{}] not found in configuration file '{}'",
                profile,
                path.display()
            )
        })?;

        let get = |key: &str| -> Result<String, String> {
            section
                .get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| format!("Missing '{}' in profile [{}]", key, profile))
        };

        Ok(NdexCredentials {
            user: get(USER_KEY)?,
            password: get(PASSWORD_KEY)?,
            server: get(SERVER_KEY)?,
        })
    }
}

fn default_config_path() -> Result<PathBuf, String> {
    dirs::home_dir()
        .map(|home| home.join(CONFIG_FILE))
        .ok_or_else(|| "Unable to determine home directory for default --conf".to_string())
}
