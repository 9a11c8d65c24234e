//! Configuration for tuck.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags (applied by the CLI on top of this)
//! 2. Environment variables (TUCK_HOME, TUCK_DATABASE, TUCK_SEED, TUCK_BIND)
//! 3. Config file (.tuck/config.yaml)
//! 4. Defaults (~/.tuck)
//!
//! Config file discovery:
//! - Searches current directory and parents for .tuck/config.yaml
//! - Paths in config file are relative to the project root (parent of .tuck/)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Default HTTP bind address
pub const DEFAULT_BIND: &str = "0.0.0.0:3000";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub server: Option<ServerConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory
    pub home: Option<String>,
    /// SQLite database file
    pub database: Option<String>,
    /// Seed document consulted when the store is empty
    pub seed: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// State directory
    pub home: PathBuf,
    /// SQLite database file
    pub database: PathBuf,
    /// Seed document
    pub seed: PathBuf,
    /// HTTP bind address
    pub bind: String,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// Find config file by searching `start` and its parents
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(".tuck").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to `base`
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Resolve configuration from an optional config file and an environment lookup
fn resolve(
    config_file: Option<PathBuf>,
    default_home: PathBuf,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedConfig> {
    let file = match config_file {
        Some(ref path) => Some(load_config_file(path)?),
        None => None,
    };

    // Project root is the parent of .tuck/
    let base_dir = config_file
        .as_deref()
        .and_then(Path::parent)
        .and_then(Path::parent)
        .unwrap_or(Path::new("."))
        .to_path_buf();

    let paths = file.as_ref().map(|f| f.paths.clone()).unwrap_or_default();

    let home = if let Some(env_home) = env("TUCK_HOME") {
        PathBuf::from(env_home)
    } else if let Some(ref home) = paths.home {
        resolve_path(&base_dir, home)
    } else {
        default_home
    };

    let database = if let Some(env_db) = env("TUCK_DATABASE") {
        PathBuf::from(env_db)
    } else if let Some(ref db) = paths.database {
        resolve_path(&base_dir, db)
    } else {
        home.join("tuck.db")
    };

    let seed = if let Some(env_seed) = env("TUCK_SEED") {
        PathBuf::from(env_seed)
    } else if let Some(ref seed) = paths.seed {
        resolve_path(&base_dir, seed)
    } else {
        home.join("data.json")
    };

    let bind = env("TUCK_BIND")
        .or_else(|| {
            file.as_ref()
                .and_then(|f| f.server.as_ref())
                .and_then(|s| s.bind.clone())
        })
        .unwrap_or_else(|| DEFAULT_BIND.to_string());

    Ok(ResolvedConfig {
        home,
        database,
        seed,
        bind,
        config_file,
    })
}

/// Load configuration from all sources
pub fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".tuck");

    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let config_file = find_config_file(&cwd);

    resolve(config_file, default_home, |key| std::env::var(key).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_config(temp: &TempDir, body: &str) -> PathBuf {
        let tuck_dir = temp.path().join(".tuck");
        std::fs::create_dir_all(&tuck_dir).unwrap();

        let config_path = tuck_dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "{}", body).unwrap();
        config_path
    }

    #[test]
    fn test_defaults_without_file() {
        let config = resolve(None, PathBuf::from("/home/u/.tuck"), no_env).unwrap();

        assert_eq!(config.database, PathBuf::from("/home/u/.tuck/tuck.db"));
        assert_eq!(config.seed, PathBuf::from("/home/u/.tuck/data.json"));
        assert_eq!(config.bind, DEFAULT_BIND);
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(
            &temp,
            r#"
version: "1"
paths:
  database: data/tuck.db
  seed: /srv/seed.json
server:
  bind: 127.0.0.1:8080
"#,
        );

        let config = resolve(Some(config_path.clone()), PathBuf::from("/h"), no_env).unwrap();
        assert_eq!(config.database, temp.path().join("data/tuck.db"));
        assert_eq!(config.seed, PathBuf::from("/srv/seed.json"));
        assert_eq!(config.bind, "127.0.0.1:8080");
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_env_overrides_file() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(
            &temp,
            r#"
version: "1"
paths:
  home: state
server:
  bind: 127.0.0.1:8080
"#,
        );

        let env: HashMap<&str, &str> =
            [("TUCK_BIND", "0.0.0.0:9999"), ("TUCK_DATABASE", "/tmp/x.db")]
                .into_iter()
                .collect();

        let config = resolve(Some(config_path), PathBuf::from("/h"), |k| {
            env.get(k).map(|v| v.to_string())
        })
        .unwrap();

        assert_eq!(config.home, temp.path().join("state"));
        assert_eq!(config.database, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.seed, temp.path().join("state").join("data.json"));
        assert_eq!(config.bind, "0.0.0.0:9999");
    }

    #[test]
    fn test_invalid_config_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(&temp, "paths: [not, a, map]");

        assert!(resolve(Some(config_path), PathBuf::from("/h"), no_env).is_err());
    }

    #[test]
    fn test_find_config_file_in_parent() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(&temp, "version: \"1\"");
        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config_file(&nested), Some(config_path));
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "./subdir"),
            PathBuf::from("/home/user/project/./subdir")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }
}
