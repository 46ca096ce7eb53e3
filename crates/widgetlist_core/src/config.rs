//! Shared-namespace configuration.
//!
//! # Responsibility
//! - Describe where the shared store lives and which key holds the list.
//! - Validate provisioning inputs before any store is opened.
//!
//! # Invariants
//! - The namespace maps to `<container_dir>/<namespace>/`.
//! - Core never provisions a namespace implicitly when opening a store.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

/// Default key the widget reads the list from.
pub const DEFAULT_STORAGE_KEY: &str = "widget_todos";

const ENV_CONTAINER_DIR: &str = "WIDGETLIST_CONTAINER_DIR";
const ENV_STORAGE_KEY: &str = "WIDGETLIST_STORAGE_KEY";
const ENV_BACKEND: &str = "WIDGETLIST_BACKEND";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidNamespace(String),
    InvalidStorageKey(String),
    RelativeContainerDir(PathBuf),
    UnknownBackend(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNamespace(value) => write!(f, "invalid namespace identifier: `{value}`"),
            Self::InvalidStorageKey(value) => write!(f, "invalid storage key: `{value}`"),
            Self::RelativeContainerDir(path) => write!(
                f,
                "container_dir must be an absolute path, got `{}`",
                path.display()
            ),
            Self::UnknownBackend(value) => {
                write!(f, "unknown store backend `{value}`; expected sqlite|file")
            }
        }
    }
}

impl Error for ConfigError {}

/// Persistence backend used for the shared namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Sqlite,
    File,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "file" => Ok(Self::File),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// Explicitly constructed configuration for one host process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Namespace identifier shared by host and widget, e.g. `group.com.example.todo`.
    pub namespace: String,
    /// Absolute root under which namespaces are provisioned.
    pub container_dir: PathBuf,
    /// Key the full snapshot is stored under.
    pub storage_key: String,
    pub backend: StoreBackend,
}

impl SyncConfig {
    /// Creates a config with the default key and backend.
    ///
    /// # Errors
    /// - `InvalidNamespace` for blank ids or ids containing whitespace or
    ///   path separators.
    /// - `RelativeContainerDir` when `container_dir` is not absolute.
    pub fn new(
        namespace: impl Into<String>,
        container_dir: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            namespace: namespace.into().trim().to_string(),
            container_dir: container_dir.into(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            backend: StoreBackend::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Builds a config from `WIDGETLIST_*` environment variables.
    ///
    /// Falls back to the system temp dir when no container is configured.
    pub fn from_env(namespace: impl Into<String>) -> Result<Self, ConfigError> {
        let container_dir = non_empty_env(ENV_CONTAINER_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);
        let mut config = Self::new(namespace, container_dir)?;
        if let Some(key) = non_empty_env(ENV_STORAGE_KEY) {
            config = config.with_storage_key(key)?;
        }
        if let Some(backend) = non_empty_env(ENV_BACKEND) {
            config = config.with_backend(backend.parse()?);
        }
        Ok(config)
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Result<Self, ConfigError> {
        self.storage_key = key.into().trim().to_string();
        self.validate()?;
        Ok(self)
    }

    pub fn with_backend(mut self, backend: StoreBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Directory backing the shared namespace.
    pub fn namespace_dir(&self) -> PathBuf {
        self.container_dir.join(self.namespace.as_str())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_namespace(self.namespace.as_str()) {
            return Err(ConfigError::InvalidNamespace(self.namespace.clone()));
        }
        if crate::store::validate_key(self.storage_key.as_str()).is_err() {
            return Err(ConfigError::InvalidStorageKey(self.storage_key.clone()));
        }
        if !self.container_dir.is_absolute() {
            return Err(ConfigError::RelativeContainerDir(self.container_dir.clone()));
        }
        Ok(())
    }
}

/// Creates the namespace directory, as the platform would on install.
///
/// Host apps normally get this from the OS; core only calls it from
/// development tooling and tests.
pub fn provision_namespace(config: &SyncConfig) -> std::io::Result<PathBuf> {
    let dir = config.namespace_dir();
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Returns whether the namespace directory exists.
pub fn is_provisioned(config: &SyncConfig) -> bool {
    config.namespace_dir().is_dir()
}

fn is_valid_namespace(value: &str) -> bool {
    !value.is_empty()
        && value != "."
        && value != ".."
        && !value
            .chars()
            .any(|ch| ch.is_whitespace() || ch == '/' || ch == '\\')
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, StoreBackend, SyncConfig, DEFAULT_STORAGE_KEY};
    use std::path::PathBuf;

    fn root() -> PathBuf {
        std::env::temp_dir()
    }

    #[test]
    fn new_applies_defaults() {
        let config = SyncConfig::new("group.com.example.todo", root()).unwrap();
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.backend, StoreBackend::Sqlite);
        assert_eq!(
            config.namespace_dir(),
            root().join("group.com.example.todo")
        );
    }

    #[test]
    fn new_rejects_bad_namespace_and_relative_root() {
        for namespace in ["", "  ", "a/b", "has space", ".."] {
            let err = SyncConfig::new(namespace, root()).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidNamespace(_)), "ns={namespace}");
        }
        let err = SyncConfig::new("group.ok", "relative/dir").unwrap_err();
        assert!(matches!(err, ConfigError::RelativeContainerDir(_)));
    }

    #[test]
    fn with_storage_key_validates() {
        let config = SyncConfig::new("group.ok", root()).unwrap();
        assert!(config.clone().with_storage_key("todos_v2").is_ok());
        assert!(matches!(
            config.with_storage_key("../escape").unwrap_err(),
            ConfigError::InvalidStorageKey(_)
        ));
    }

    #[test]
    fn backend_parses_case_insensitively() {
        assert_eq!(" SQLite ".parse::<StoreBackend>().unwrap(), StoreBackend::Sqlite);
        assert_eq!("file".parse::<StoreBackend>().unwrap(), StoreBackend::File);
        assert!("redis".parse::<StoreBackend>().is_err());
    }
}
