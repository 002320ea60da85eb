use std::env;

use thiserror::Error;

use crate::constants::DEFAULT_SLED_PATH;

#[derive(Debug, Clone)]
pub struct Config {
    pub table_name: String,
    pub sled_path: String,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            table_name: table_name()?,
            sled_path: env_or("SLED_PATH", DEFAULT_SLED_PATH),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
        })
    }
}

/// Name of the backing table. An empty value counts as unset.
pub fn table_name() -> Result<String, ConfigError> {
    match env::var("TABLE_NAME") {
        Ok(name) if !name.trim().is_empty() => Ok(name),
        _ => Err(ConfigError::MissingVar("TABLE_NAME")),
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, OnceLock};

    use super::*;

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn managed_keys() -> &'static [&'static str] {
        &[
            "TABLE_NAME",
            "SLED_PATH",
            "RUST_LOG",
            "ENABLE_FILE_LOGS",
            "LOG_DIR",
        ]
    }

    fn clear_keys(keys: &[&str]) {
        for key in keys {
            env::remove_var(key);
        }
    }

    #[test]
    fn missing_table_name_is_an_error() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("TABLE_NAME")));
    }

    #[test]
    fn blank_table_name_is_an_error() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("TABLE_NAME", "   ");
        assert!(table_name().is_err());
    }

    #[test]
    fn loads_defaults_when_optional_missing() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("TABLE_NAME", "test_table");
        let cfg = Config::from_env().expect("config");
        assert_eq!(cfg.table_name, "test_table");
        assert_eq!(cfg.sled_path, DEFAULT_SLED_PATH);
        assert_eq!(cfg.log_level, "info");
        assert!(!cfg.enable_file_logs);
    }

    #[test]
    fn parses_bool_flags() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("TABLE_NAME", "test_table");
        env::set_var("ENABLE_FILE_LOGS", "yes");
        assert!(Config::from_env().expect("config").enable_file_logs);

        env::set_var("ENABLE_FILE_LOGS", "maybe");
        assert!(!Config::from_env().expect("config").enable_file_logs);
    }
}
