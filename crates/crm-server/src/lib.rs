//! Runtime configuration for the contacts server.
//!
//! Settings are layered, lowest precedence first:
//!
//! 1. per-[`Profile`] defaults,
//! 2. an optional TOML file (`config.toml` unless `--config` says otherwise),
//! 3. `CRM_*` environment variables (a `.env` file is loaded beforehand).

use std::{
  fmt,
  path::{Path, PathBuf},
};

use clap::ValueEnum;
use config::{Config, ConfigError, Environment, File};
use crm_store_sqlite::IsolationLevel;
use serde::Deserialize;

// ─── Profiles ────────────────────────────────────────────────────────────────

/// Named environment the server runs in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Profile {
  #[default]
  Development,
  Testing,
  Production,
}

impl Profile {
  pub fn as_str(self) -> &'static str {
    match self {
      Profile::Development => "development",
      Profile::Testing => "testing",
      Profile::Production => "production",
    }
  }

  pub fn default_store_path(self) -> &'static str {
    match self {
      Profile::Testing => "tests/test.db",
      Profile::Development | Profile::Production => "instance/app.db",
    }
  }

  pub fn default_isolation(self) -> IsolationLevel {
    match self {
      Profile::Testing => IsolationLevel::Serializable,
      Profile::Development | Profile::Production => {
        IsolationLevel::RepeatableRead
      }
    }
  }
}

impl fmt::Display for Profile {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Configuration ───────────────────────────────────────────────────────────

/// Resolved server settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  pub store_path:      PathBuf,
  pub isolation_level: IsolationLevel,
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Defaults for `profile`, overlaid by `file` (when it exists).
fn builder(
  profile: Profile,
  file: &Path,
) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
  Ok(
    Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 5000)?
      .set_default("store_path", profile.default_store_path())?
      .set_default("isolation_level", profile.default_isolation().as_str())?
      .add_source(File::from(file).required(false)),
  )
}

/// Load the full configuration for `profile`, including the environment.
pub fn load_config(
  profile: Profile,
  file: &Path,
) -> Result<ServerConfig, ConfigError> {
  builder(profile, file)?
    .add_source(
      Environment::with_prefix("CRM")
        .prefix_separator("_")
        .separator("__"),
    )
    .build()?
    .try_deserialize()
}

// ─── Store path ──────────────────────────────────────────────────────────────

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

/// Expand `path` and make sure its parent directory exists.
pub fn prepare_store_path(path: &Path) -> std::io::Result<PathBuf> {
  let path = expand_tilde(path);
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)?;
  }
  Ok(path)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn without_env(profile: Profile, file: &Path) -> ServerConfig {
    builder(profile, file)
      .unwrap()
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn profiles_resolve_their_own_defaults() {
    let missing = Path::new("does-not-exist.toml");

    let dev = without_env(Profile::Development, missing);
    assert_eq!(dev.store_path, PathBuf::from("instance/app.db"));
    assert_eq!(dev.isolation_level, IsolationLevel::RepeatableRead);
    assert_eq!(dev.address(), "127.0.0.1:5000");

    let testing = without_env(Profile::Testing, missing);
    assert_eq!(testing.store_path, PathBuf::from("tests/test.db"));
    assert_eq!(testing.isolation_level, IsolationLevel::Serializable);

    let prod = without_env(Profile::Production, missing);
    assert_eq!(prod.store_path, PathBuf::from("instance/app.db"));
    assert_eq!(prod.isolation_level, IsolationLevel::RepeatableRead);
  }

  #[test]
  fn toml_file_overrides_profile_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    std::fs::write(
      &file,
      "port = 8080\nstore_path = \"/var/lib/crm/contacts.db\"\n\
       isolation_level = \"read committed\"\n",
    )
    .unwrap();

    let cfg = without_env(Profile::Testing, &file);
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.store_path, PathBuf::from("/var/lib/crm/contacts.db"));
    assert_eq!(cfg.isolation_level, IsolationLevel::ReadCommitted);
  }

  #[test]
  fn unknown_isolation_level_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    std::fs::write(&file, "isolation_level = \"snapshot\"\n").unwrap();

    let result = builder(Profile::Development, &file)
      .unwrap()
      .build()
      .unwrap()
      .try_deserialize::<ServerConfig>();
    assert!(result.is_err());
  }

  #[test]
  fn expand_tilde_only_touches_home_prefix() {
    assert_eq!(
      expand_tilde(Path::new("instance/app.db")),
      PathBuf::from("instance/app.db")
    );
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(
        expand_tilde(Path::new("~/crm/app.db")),
        PathBuf::from(home).join("crm/app.db")
      );
    }
  }

  #[test]
  fn prepare_store_path_creates_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("instance").join("nested").join("app.db");

    let resolved = prepare_store_path(&target).unwrap();
    assert_eq!(resolved, target);
    assert!(target.parent().unwrap().is_dir());
    assert!(!target.exists());
  }
}
