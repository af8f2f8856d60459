//! Runtime configuration: a YAML file, optionally overlaid with
//! environment variables, re-read whenever the file changes.

use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, RwLock, mpsc};
use std::thread;
use std::time::Duration;

use config::{Config as RawConfig, Environment, File};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::de::DeserializeOwned;
use thiserror::Error;

const ENV_SEPARATOR: &str = "__";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load or parse configuration file")]
    Load(#[from] config::ConfigError),

    #[error("Failed to initialize file watcher")]
    Watch(#[from] notify::Error),

    #[error("Configuration lock was poisoned")]
    LockPoisoned,
}

/// Shared, read-mostly configuration handle.
#[derive(Debug)]
pub struct Config {
    values: Arc<RwLock<RawConfig>>,
    // Dropping the watcher stops the reload thread.
    _watcher: Option<RecommendedWatcher>,
}

impl Config {
    pub fn builder<P: AsRef<Path>>(path: P) -> ConfigBuilder {
        ConfigBuilder::new(path.as_ref().to_path_buf())
    }

    #[cfg(any(test, feature = "testing"))]
    pub fn builder_test() -> test_utils::TestConfigBuilder {
        test_utils::TestConfigBuilder::new()
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        let values = self.values.read().map_err(|_| ConfigError::LockPoisoned)?;
        Ok(values.get(key)?)
    }

    /// Like [`Config::get`], but falls back to `default` when the key is
    /// absent or has the wrong type. The fallback is logged.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or_else(|err| {
            tracing::debug!(key, error = %err, "Using default configuration value");
            default
        })
    }
}

/// Where configuration values come from.
#[derive(Clone)]
struct Sources {
    file: PathBuf,
    env: Option<Environment>,
}

impl Sources {
    fn load(&self) -> Result<RawConfig, config::ConfigError> {
        let mut builder = RawConfig::builder().add_source(File::from(self.file.as_path()).required(true));
        if let Some(env) = &self.env {
            builder = builder.add_source(env.clone());
        }
        builder.build()
    }
}

pub struct ConfigBuilder {
    sources: Sources,
    watch: bool,
    watch_interval: Duration,
}

impl ConfigBuilder {
    fn new(file: PathBuf) -> Self {
        Self { sources: Sources { file, env: None }, watch: false, watch_interval: Duration::from_secs(2) }
    }

    /// Lets `{PREFIX}__SECTION__KEY` environment variables override file
    /// values, e.g. `PROFILE_HUB__JWT__ACCESS_SECRET` for `jwt.access_secret`.
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.sources.env = Some(
            Environment::with_prefix(prefix)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );
        self
    }

    #[cfg(test)]
    fn env_vars(mut self, vars: config::Map<String, String>) -> Self {
        self.sources.env = self.sources.env.map(|env| env.source(Some(vars)));
        self
    }

    pub fn watch(mut self) -> Self {
        self.watch = true;
        self
    }

    pub fn watch_interval(mut self, interval: Duration) -> Self {
        self.watch_interval = interval;
        self
    }

    pub fn build(self) -> Result<Config, ConfigError> {
        let values = Arc::new(RwLock::new(self.sources.load()?));

        if !self.watch {
            return Ok(Config { values, _watcher: None });
        }

        let (tx, rx) = mpsc::channel();
        let mut watcher =
            RecommendedWatcher::new(tx, notify::Config::default().with_poll_interval(self.watch_interval))?;
        watcher.watch(&self.sources.file, RecursiveMode::NonRecursive)?;

        spawn_reloader(self.sources, Arc::clone(&values), rx);

        Ok(Config { values, _watcher: Some(watcher) })
    }
}

/// Re-reads every source on each modification of the file. A file that no
/// longer parses leaves the previous values in place.
fn spawn_reloader(sources: Sources, values: Arc<RwLock<RawConfig>>, events: Receiver<notify::Result<Event>>) {
    thread::spawn(move || {
        tracing::info!(file = %sources.file.display(), "Watching configuration file");

        for event in events {
            match event {
                Ok(Event { kind: EventKind::Modify(_), .. }) => match sources.load() {
                    Ok(reloaded) => match values.write() {
                        Ok(mut current) => {
                            *current = reloaded;
                            tracing::info!("Configuration reloaded");
                        },
                        Err(_) => tracing::error!("Configuration lock poisoned, reload skipped"),
                    },
                    Err(err) => tracing::error!(error = %err, "Configuration reload failed, keeping previous values"),
                },
                Ok(_) => (),
                Err(err) => tracing::error!(error = ?err, "Configuration watcher error"),
            }
        }
    });
}

#[cfg(any(test, feature = "testing"))]
pub mod test_utils {
    use std::collections::HashMap;

    use config::Value;

    use super::*;

    #[derive(Default)]
    pub struct TestConfigBuilder {
        values: HashMap<String, Value>,
    }

    impl TestConfigBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with<T: Into<Value>>(mut self, key: &str, value: T) -> Self {
            self.values.insert(key.to_string(), value.into());
            self
        }

        pub fn build(self) -> Config {
            let mut builder = RawConfig::builder();

            for (key, value) in self.values {
                builder = builder.set_override(key, value).unwrap();
            }

            let raw_config = builder.build().expect("Failed to create config from test values");

            Config { values: Arc::new(RwLock::new(raw_config)), _watcher: None }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Write;

    use serde::Deserialize;
    use tempfile::NamedTempFile;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct RoutesConfig {
        login: String,
        home: String,
    }

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut temp_file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .expect("Failed to create temp file");

        temp_file.write_all(content.as_bytes()).expect("Failed to write to temp file");
        temp_file.flush().expect("Failed to flush temp file");
        temp_file
    }

    #[test]
    fn test_builder_basic_usage() {
        let config_content = r#"
            server:
                address: "0.0.0.0:8080"
                timeout_secs: 30
            routes:
                login: "/login"
                home: "/"
            profile:
                delete_removes_row: false
        "#;

        let temp_file = create_temp_config(config_content);
        let config = Config::builder(temp_file.path()).build().expect("Failed to build config");

        let address: String = config.get("server.address").expect("Failed to get server.address");
        let timeout: u64 = config.get("server.timeout_secs").expect("Failed to get server.timeout_secs");
        let delete_removes_row: bool = config.get("profile.delete_removes_row").expect("Failed to get flag");
        let routes: RoutesConfig = config.get("routes").expect("Failed to get routes");

        assert_eq!(address, "0.0.0.0:8080");
        assert_eq!(timeout, 30);
        assert!(!delete_removes_row);
        assert_eq!(routes, RoutesConfig { login: "/login".to_string(), home: "/".to_string() });
    }

    #[test]
    fn test_nonexistent_file() {
        let result = Config::builder("/nonexistent/path/config.yaml").build();

        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_invalid_yaml() {
        let invalid_content = r#"
            server: "test
            address: [invalid: yaml
        "#;

        let temp_file = create_temp_config(invalid_content);
        let result = Config::builder(temp_file.path()).build();

        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_missing_key() {
        let temp_file = create_temp_config("routes:\n  login: \"/login\"\n");
        let config = Config::builder(temp_file.path()).build().expect("Failed to build config");

        assert!(config.get::<String>("routes.home").is_err());
    }

    #[test]
    fn test_get_or_falls_back() {
        let config = Config::builder_test().with("routes.login", "/sign-in").build();

        assert_eq!(config.get_or("routes.login", "/login".to_string()), "/sign-in");
        assert_eq!(config.get_or("routes.home", "/".to_string()), "/");
        assert!(!config.get_or("profile.delete_removes_row", false));
    }

    #[test]
    fn test_env_overrides_file() {
        let temp_file = create_temp_config("jwt:\n  issuer: \"from-file\"\nprofile:\n  delete_removes_row: false\n");
        let config = Config::builder(temp_file.path())
            .env_prefix("PROFILE_HUB")
            .env_vars(config::Map::from([
                ("PROFILE_HUB__JWT__ISSUER".to_string(), "from-env".to_string()),
                ("PROFILE_HUB__PROFILE__DELETE_REMOVES_ROW".to_string(), "true".to_string()),
            ]))
            .build()
            .expect("Failed to build config");

        assert_eq!(config.get::<String>("jwt.issuer").unwrap(), "from-env");
        assert!(config.get::<bool>("profile.delete_removes_row").unwrap());
    }

    #[test]
    fn test_auto_reload() {
        let temp_file = create_temp_config("routes:\n  home: \"/\"\n");
        let config = Config::builder(temp_file.path())
            .watch()
            .watch_interval(Duration::from_millis(100))
            .build()
            .expect("Failed to build config with watch");

        assert_eq!(config.get::<String>("routes.home").unwrap(), "/");

        fs::write(temp_file.path(), "routes:\n  home: \"/dashboard\"\n").expect("Failed to update config file");

        // Wait for the file watcher to detect changes and reload
        thread::sleep(Duration::from_millis(500));

        assert_eq!(config.get::<String>("routes.home").unwrap(), "/dashboard");
    }

    #[test]
    fn test_builder_test() {
        let config = Config::builder_test()
            .with("jwt.issuer", "auth.example.com")
            .with("jwt.access_expiration_secs", 3600)
            .with("profile.delete_removes_row", true)
            .build();

        let issuer: String = config.get("jwt.issuer").unwrap();
        let exp: i64 = config.get("jwt.access_expiration_secs").unwrap();
        let flag: bool = config.get("profile.delete_removes_row").unwrap();

        assert_eq!(issuer, "auth.example.com");
        assert_eq!(exp, 3600);
        assert!(flag);
    }
}
