use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "boxmark";
const APP_CONFIG_FILE: &str = "config.json";
const SAVE_URL_ENV: &str = "BOXMARK_SAVE_URL";
const CSRF_TOKEN_ENV: &str = "BOXMARK_CSRF_TOKEN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Application-level settings from `config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub save_url: Option<String>,
    #[serde(default)]
    pub csrf_token: Option<String>,
    /// Move on to the next item after a successful save.
    #[serde(default)]
    pub auto_next: bool,
}

impl AppConfig {
    /// Configured save endpoint, ignoring blank values.
    pub fn save_endpoint(&self) -> Option<&str> {
        self.save_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    fn with_overrides(mut self, save_url: Option<String>, csrf_token: Option<String>) -> Self {
        if let Some(save_url) = save_url.filter(|value| !value.is_empty()) {
            self.save_url = Some(save_url);
        }
        if let Some(csrf_token) = csrf_token.filter(|value| !value.is_empty()) {
            self.csrf_token = Some(csrf_token);
        }
        self
    }
}

/// Process inputs that decide where config comes from and what overrides it.
#[derive(Debug, Clone, Default)]
struct ConfigEnv {
    xdg_config_home: Option<PathBuf>,
    home: Option<PathBuf>,
    save_url: Option<String>,
    csrf_token: Option<String>,
}

impl ConfigEnv {
    fn from_process() -> Self {
        Self {
            xdg_config_home: std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
            home: std::env::var_os("HOME").map(PathBuf::from),
            save_url: std::env::var(SAVE_URL_ENV).ok(),
            csrf_token: std::env::var(CSRF_TOKEN_ENV).ok(),
        }
    }

    /// `$XDG_CONFIG_HOME/boxmark/config.json`, else `$HOME/.config/boxmark/config.json`.
    fn config_file(&self) -> ConfigResult<PathBuf> {
        let base = match self.xdg_config_home.as_deref() {
            Some(xdg) if !xdg.as_os_str().is_empty() => xdg.to_path_buf(),
            _ => self
                .home
                .as_deref()
                .ok_or(ConfigError::MissingHomeDirectory)?
                .join(".config"),
        };
        Ok(base.join(APP_DIR).join(APP_CONFIG_FILE))
    }
}

/// Loads `config.json` from the XDG config directory, then applies environment overrides.
pub fn load_app_config() -> AppConfig {
    load_app_config_from(ConfigEnv::from_process())
}

fn load_app_config_from(env: ConfigEnv) -> AppConfig {
    let file_config = match env.config_file() {
        Ok(path) if path.exists() => read_app_config(&path).unwrap_or_else(|err| {
            tracing::warn!(%err, "invalid config.json; using defaults");
            AppConfig::default()
        }),
        Ok(_) => AppConfig::default(),
        Err(err) => {
            tracing::debug!(%err, "no config directory; using defaults");
            AppConfig::default()
        }
    };
    file_config.with_overrides(env.save_url, env.csrf_token)
}

pub fn read_app_config(path: &Path) -> ConfigResult<AppConfig> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("boxmark-config-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join(APP_DIR)).expect("scratch dir should be created");
        dir
    }

    fn env_with_xdg(root: &Path) -> ConfigEnv {
        ConfigEnv {
            xdg_config_home: Some(root.to_path_buf()),
            ..ConfigEnv::default()
        }
    }

    fn write_config(root: &Path, contents: &str) -> PathBuf {
        let path = root.join(APP_DIR).join(APP_CONFIG_FILE);
        std::fs::write(&path, contents).expect("config should be written");
        path
    }

    #[test]
    fn xdg_config_home_wins_over_home() {
        let xdg = scratch_dir("xdg-wins");
        let home = scratch_dir("xdg-wins-home");
        write_config(&xdg, r#"{"save_url":"http://xdg/save"}"#);

        let config = load_app_config_from(ConfigEnv {
            home: Some(home),
            ..env_with_xdg(&xdg)
        });
        assert_eq!(config.save_endpoint(), Some("http://xdg/save"));
    }

    #[test]
    fn blank_xdg_config_home_falls_back_to_home_dot_config() {
        let home = scratch_dir("home-fallback");
        std::fs::create_dir_all(home.join(".config").join(APP_DIR))
            .expect("home config dir should be created");
        write_config(&home.join(".config"), r#"{"auto_next":true}"#);

        let config = load_app_config_from(ConfigEnv {
            xdg_config_home: Some(PathBuf::new()),
            home: Some(home),
            ..ConfigEnv::default()
        });
        assert!(config.auto_next);
    }

    #[test]
    fn no_config_directory_still_applies_env_overrides() {
        let env = ConfigEnv {
            save_url: Some("http://env/save".into()),
            ..ConfigEnv::default()
        };
        assert!(matches!(env.config_file(), Err(ConfigError::MissingHomeDirectory)));

        let config = load_app_config_from(env);
        assert_eq!(config.save_endpoint(), Some("http://env/save"));
        assert!(!config.auto_next);
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let root = scratch_dir("missing");
        assert_eq!(load_app_config_from(env_with_xdg(&root)), AppConfig::default());
    }

    #[test]
    fn config_file_is_parsed() {
        let root = scratch_dir("parsed");
        write_config(
            &root,
            r#"{"save_url":"http://localhost/save","csrf_token":"abc","auto_next":true}"#,
        );

        let config = load_app_config_from(env_with_xdg(&root));
        assert_eq!(config.save_endpoint(), Some("http://localhost/save"));
        assert_eq!(config.csrf_token.as_deref(), Some("abc"));
        assert!(config.auto_next);
    }

    #[test]
    fn malformed_config_falls_back_to_defaults_but_keeps_env_token() {
        let root = scratch_dir("malformed");
        let path = write_config(&root, "{not json");

        assert!(matches!(read_app_config(&path), Err(ConfigError::Parse { .. })));
        let config = load_app_config_from(ConfigEnv {
            csrf_token: Some("env-token".into()),
            ..env_with_xdg(&root)
        });
        assert_eq!(config.save_endpoint(), None);
        assert_eq!(config.csrf_token.as_deref(), Some("env-token"));
    }

    #[test]
    fn file_values_yield_to_non_blank_env_values() {
        let root = scratch_dir("env-over-file");
        write_config(
            &root,
            r#"{"save_url":"http://file/save","csrf_token":"file-token"}"#,
        );

        let config = load_app_config_from(ConfigEnv {
            save_url: Some("http://env/save".into()),
            csrf_token: Some(String::new()),
            ..env_with_xdg(&root)
        });
        assert_eq!(config.save_endpoint(), Some("http://env/save"));
        assert_eq!(config.csrf_token.as_deref(), Some("file-token"));
    }

    #[test]
    fn blank_save_url_is_not_an_endpoint() {
        let config = AppConfig {
            save_url: Some("   ".into()),
            ..AppConfig::default()
        };
        assert_eq!(config.save_endpoint(), None);
    }
}
