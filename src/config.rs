use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::OPTION_COUNT;
use crate::weight::DEFAULT_STEP;

/// Tunables for quiz selection and weight updates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Size of the least-mastered group fetched in learning mode
    pub priority_limit: usize,
    /// Size of the random distractor sample fetched in learning mode
    pub distractor_limit: usize,
    /// Contraction factor of the weight feedback rule
    pub weight_step: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            priority_limit: 10,
            distractor_limit: 10,
            weight_step: DEFAULT_STEP,
        }
    }
}

impl EngineConfig {
    /// Clamp values into ranges the engine can work with.
    ///
    /// The step stays in (0, 1], at least one priority item is fetched and
    /// both groups together can fill a quiz.
    pub fn normalized(mut self) -> Self {
        if !self.weight_step.is_finite() || self.weight_step <= 0.0 || self.weight_step > 1.0 {
            self.weight_step = DEFAULT_STEP;
        }
        self.priority_limit = self.priority_limit.max(1);
        if self.priority_limit + self.distractor_limit < OPTION_COUNT {
            self.distractor_limit = OPTION_COUNT - self.priority_limit;
        }
        self
    }

    fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let priority_limit = lookup("TANGO_PRIORITY_LIMIT")
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(defaults.priority_limit);

        let distractor_limit = lookup("TANGO_DISTRACTOR_LIMIT")
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(defaults.distractor_limit);

        let weight_step = lookup("TANGO_WEIGHT_STEP")
            .and_then(|value| value.trim().parse::<f64>().ok())
            .unwrap_or(defaults.weight_step);

        Self {
            priority_limit,
            distractor_limit,
            weight_step,
        }
        .normalized()
    }
}

/// Subscriber settings consumed by [`crate::logging::init_tracing`]
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `info` or `tango_recall=debug`
    pub level: String,
    pub file_logs: bool,
    pub log_dir: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_logs: false,
            log_dir: PathBuf::from("./logs"),
        }
    }
}

impl LogConfig {
    /// Directory for the rolling log file, if file logging is on
    pub fn file_directory(&self) -> Option<&Path> {
        self.file_logs.then_some(self.log_dir.as_path())
    }

    fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let level = lookup("RUST_LOG")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(defaults.level);

        let file_logs = lookup("ENABLE_FILE_LOGS")
            .map(|value| matches!(value.trim(), "true" | "1"))
            .unwrap_or(defaults.file_logs);

        let log_dir = lookup("LOG_DIR")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.log_dir);

        Self {
            level,
            file_logs,
            log_dir,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite file for the item store; `None` keeps items in memory
    pub database_path: Option<PathBuf>,
    pub logging: LogConfig,
    pub engine: EngineConfig,
}

impl Config {
    /// Read configuration from the process environment, loading `.env` first.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = lookup("TANGO_DB_PATH")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Self {
            database_path,
            logging: LogConfig::from_lookup(&lookup),
            engine: EngineConfig::from_lookup(&lookup),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup_from(&[]));
        assert_eq!(config.database_path, None);
        assert_eq!(config.logging, LogConfig::default());
        assert_eq!(config.logging.file_directory(), None);
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn test_reads_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("TANGO_DB_PATH", "/tmp/tango.db"),
            ("RUST_LOG", "debug"),
            ("TANGO_PRIORITY_LIMIT", "5"),
            ("TANGO_DISTRACTOR_LIMIT", " 12 "),
            ("TANGO_WEIGHT_STEP", "0.25"),
        ]));
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/tango.db")));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.engine.priority_limit, 5);
        assert_eq!(config.engine.distractor_limit, 12);
        assert_eq!(config.engine.weight_step, 0.25);
    }

    #[test]
    fn test_file_logging_settings() {
        let config = Config::from_lookup(lookup_from(&[
            ("ENABLE_FILE_LOGS", "1"),
            ("LOG_DIR", "/var/log/tango"),
        ]));
        assert!(config.logging.file_logs);
        assert_eq!(config.logging.file_directory(), Some(Path::new("/var/log/tango")));

        let disabled = Config::from_lookup(lookup_from(&[
            ("ENABLE_FILE_LOGS", "yes"),
            ("LOG_DIR", "/var/log/tango"),
        ]));
        assert_eq!(disabled.logging.file_directory(), None);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("TANGO_PRIORITY_LIMIT", "many"),
            ("TANGO_WEIGHT_STEP", "2.5"),
        ]));
        assert_eq!(config.engine.priority_limit, 10);
        assert_eq!(config.engine.weight_step, DEFAULT_STEP);
    }

    #[test]
    fn test_normalized_fills_quiz() {
        let config = EngineConfig {
            priority_limit: 0,
            distractor_limit: 1,
            weight_step: 0.4,
        }
        .normalized();
        assert_eq!(config.priority_limit, 1);
        assert_eq!(config.distractor_limit, 3);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: EngineConfig = serde_json::from_str(r#"{"priorityLimit": 3}"#).unwrap();
        assert_eq!(config.priority_limit, 3);
        assert_eq!(config.distractor_limit, 10);
    }
}
