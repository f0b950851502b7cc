//! # Database Configuration
//!
//! Settings for the storage handle.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Builder calls in code (`DbConfig::new(path).max_connections(2)`)
//! 2. Environment variables (`STOCKROOM_DB_*`, see [`DbConfig::from_env`])
//! 3. Defaults (this file)

use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the database file location.
pub const ENV_DB_PATH: &str = "STOCKROOM_DB_PATH";

/// Environment variable overriding the pool size.
pub const ENV_DB_MAX_CONNECTIONS: &str = "STOCKROOM_DB_MAX_CONNECTIONS";

/// File name used inside the platform data directory.
pub const DEFAULT_DB_FILE: &str = "inventory.db";

const IN_MEMORY: &str = ":memory:";

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/inventory.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file, or `:memory:`.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// How long an operation waits for a free connection.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection. `None` keeps them forever.
    /// Default: 10 minutes
    pub idle_timeout: Option<Duration>,

    /// Whether to run migrations when the handle opens.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// The file (and its parent directory) is created on first open.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            run_migrations: true,
        }
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// Single connection that is never reaped: an in-memory database lives
    /// only as long as a connection to it does.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: None,
            run_migrations: true,
        }
    }

    /// Reads configuration from the process environment.
    ///
    /// ## Environment Variables
    /// - `STOCKROOM_DB_PATH`: database file (`:memory:` allowed)
    /// - `STOCKROOM_DB_MAX_CONNECTIONS`: pool size, ignored if not a number
    ///
    /// Without `STOCKROOM_DB_PATH` the file lives in the platform data
    /// directory (see [`default_database_path`]).
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`DbConfig::from_env`], with an injectable variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = match lookup(ENV_DB_PATH).filter(|p| !p.trim().is_empty()) {
            Some(path) if path.trim() == IN_MEMORY => DbConfig::in_memory(),
            Some(path) => DbConfig::new(path.trim()),
            None => DbConfig::new(default_database_path()),
        };

        if let Some(max) = lookup(ENV_DB_MAX_CONNECTIONS).and_then(|v| v.trim().parse().ok()) {
            config = config.max_connections(max);
        }

        config
    }

    /// Sets the maximum number of connections.
    ///
    /// In-memory databases stay at one connection.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = if self.is_in_memory() { 1 } else { max.max(1) };
        self.min_connections = self.min_connections.min(self.max_connections);
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min.min(self.max_connections);
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the idle timeout.
    pub fn idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on open.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// `true` for `:memory:` configurations.
    pub fn is_in_memory(&self) -> bool {
        self.database_path == Path::new(IN_MEMORY)
    }
}

/// Platform data directory location of the database file.
///
/// - **macOS**: `~/Library/Application Support/com.stockroom.inventory/inventory.db`
/// - **Windows**: `%APPDATA%\stockroom\inventory\data\inventory.db`
/// - **Linux**: `~/.local/share/inventory/inventory.db`
///
/// Falls back to `./inventory.db` when no home directory is known.
pub fn default_database_path() -> PathBuf {
    ProjectDirs::from("com", "stockroom", "inventory")
        .map(|dirs| dirs.data_dir().join(DEFAULT_DB_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.is_in_memory());
    }

    #[test]
    fn test_in_memory_is_single_connection() {
        let config = DbConfig::in_memory().max_connections(8);
        assert!(config.is_in_memory());
        assert_eq!(config.max_connections, 1);
        assert!(config.idle_timeout.is_none());
    }

    #[test]
    fn test_from_lookup_reads_overrides() {
        let config = DbConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, "/data/stock.db"),
            (ENV_DB_MAX_CONNECTIONS, "3"),
        ]));
        assert_eq!(config.database_path, PathBuf::from("/data/stock.db"));
        assert_eq!(config.max_connections, 3);
    }

    #[test]
    fn test_from_lookup_memory_and_bad_numbers() {
        let config = DbConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, ":memory:"),
            (ENV_DB_MAX_CONNECTIONS, "many"),
        ]));
        assert!(config.is_in_memory());
        assert_eq!(config.max_connections, 1);
    }

    #[test]
    fn test_from_lookup_defaults_to_data_dir() {
        let config = DbConfig::from_lookup(lookup(&[]));
        assert_eq!(config.database_path, default_database_path());
        assert!(config.database_path.ends_with(DEFAULT_DB_FILE));
    }
}
