use std::{env, path::PathBuf};

use thiserror::Error;

#[cfg(test)]
use once_cell::sync::Lazy;
#[cfg(test)]
pub(crate) static ENV_MUTEX: Lazy<std::sync::Mutex<()>> = Lazy::new(|| std::sync::Mutex::new(()));

pub const DEFAULT_INPUT_PATH: &str = "data/swufe/swufe_news.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "results";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    input_path: PathBuf,
    fallback_input_path: Option<PathBuf>,
    output_dir: PathBuf,
    keywords_path: Option<PathBuf>,
    write_metrics: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {source}")]
    Invalid {
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl Config {
    /// 環境変数から設定値を読み込み、検証する。
    ///
    /// いずれの変数も省略可能で、未設定なら既定値を使う。
    ///
    /// # Errors
    /// 空のパスや真偽値として解釈できない値が設定されている場合は [`ConfigError`] を返す。
    pub fn from_env() -> Result<Self, ConfigError> {
        let input_path = parse_path("COOP_INPUT_PATH", DEFAULT_INPUT_PATH)?;
        let fallback_input_path = parse_optional_path("COOP_FALLBACK_INPUT_PATH");
        let output_dir = parse_path("COOP_OUTPUT_DIR", DEFAULT_OUTPUT_DIR)?;
        let keywords_path = parse_optional_path("COOP_KEYWORDS_PATH");
        let write_metrics = parse_bool("COOP_WRITE_METRICS", true)?;

        Ok(Self {
            input_path,
            fallback_input_path,
            output_dir,
            keywords_path,
            write_metrics,
        })
    }

    /// 既定値の設定を組み立てる（テストや組み込み用）。
    #[must_use]
    pub fn new(input_path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            fallback_input_path: None,
            output_dir: output_dir.into(),
            keywords_path: None,
            write_metrics: true,
        }
    }

    #[must_use]
    pub fn with_fallback_input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.fallback_input_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_keywords_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.keywords_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_write_metrics(mut self, enabled: bool) -> Self {
        self.write_metrics = enabled;
        self
    }

    #[must_use]
    pub fn input_path(&self) -> &PathBuf {
        &self.input_path
    }

    #[must_use]
    pub fn fallback_input_path(&self) -> Option<&PathBuf> {
        self.fallback_input_path.as_ref()
    }

    #[must_use]
    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    #[must_use]
    pub fn keywords_path(&self) -> Option<&PathBuf> {
        self.keywords_path.as_ref()
    }

    #[must_use]
    pub fn write_metrics(&self) -> bool {
        self.write_metrics
    }
}

fn parse_path(name: &'static str, default: &str) -> Result<PathBuf, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid {
            name,
            source: anyhow::anyhow!("path must not be empty"),
        });
    }
    Ok(PathBuf::from(trimmed))
}

fn parse_optional_path(name: &'static str) -> Option<PathBuf> {
    env::var(name)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
}

fn parse_bool(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            source: anyhow::anyhow!("invalid boolean value: {raw}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_env(name: &str, value: &str) {
        // SAFETY: tests run sequentially and assign valid UTF-8 values.
        unsafe {
            env::set_var(name, value);
        }
    }

    fn remove_env(name: &str) {
        // SAFETY: tests run sequentially and clean up deterministic keys.
        unsafe {
            env::remove_var(name);
        }
    }

    fn reset_env() {
        remove_env("COOP_INPUT_PATH");
        remove_env("COOP_FALLBACK_INPUT_PATH");
        remove_env("COOP_OUTPUT_DIR");
        remove_env("COOP_KEYWORDS_PATH");
        remove_env("COOP_WRITE_METRICS");
    }

    #[test]
    fn from_env_uses_defaults_when_unset() {
        let _lock = ENV_MUTEX.lock().expect("env mutex");
        reset_env();

        let config = Config::from_env().expect("config should load");

        assert_eq!(config.input_path(), &PathBuf::from(DEFAULT_INPUT_PATH));
        assert_eq!(config.output_dir(), &PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert!(config.fallback_input_path().is_none());
        assert!(config.keywords_path().is_none());
        assert!(config.write_metrics());
    }

    #[test]
    fn from_env_reads_overrides() {
        let _lock = ENV_MUTEX.lock().expect("env mutex");
        reset_env();
        set_env("COOP_INPUT_PATH", " data/news.csv ");
        set_env("COOP_FALLBACK_INPUT_PATH", "backup/news.csv");
        set_env("COOP_OUTPUT_DIR", "out");
        set_env("COOP_KEYWORDS_PATH", "keywords.yaml");
        set_env("COOP_WRITE_METRICS", "off");

        let config = Config::from_env().expect("config should load");
        reset_env();

        assert_eq!(config.input_path(), &PathBuf::from("data/news.csv"));
        assert_eq!(
            config.fallback_input_path(),
            Some(&PathBuf::from("backup/news.csv"))
        );
        assert_eq!(config.output_dir(), &PathBuf::from("out"));
        assert_eq!(config.keywords_path(), Some(&PathBuf::from("keywords.yaml")));
        assert!(!config.write_metrics());
    }

    #[test]
    fn from_env_treats_blank_optional_path_as_unset() {
        let _lock = ENV_MUTEX.lock().expect("env mutex");
        reset_env();
        set_env("COOP_KEYWORDS_PATH", "   ");

        let config = Config::from_env().expect("config should load");
        reset_env();

        assert!(config.keywords_path().is_none());
    }

    #[test]
    fn from_env_rejects_invalid_bool() {
        let _lock = ENV_MUTEX.lock().expect("env mutex");
        reset_env();
        set_env("COOP_WRITE_METRICS", "maybe");

        let error = Config::from_env().expect_err("invalid bool should fail");
        reset_env();

        assert!(matches!(
            error,
            ConfigError::Invalid {
                name: "COOP_WRITE_METRICS",
                ..
            }
        ));
    }

    #[test]
    fn from_env_rejects_empty_output_dir() {
        let _lock = ENV_MUTEX.lock().expect("env mutex");
        reset_env();
        set_env("COOP_OUTPUT_DIR", "");

        let error = Config::from_env().expect_err("empty path should fail");
        reset_env();

        assert!(matches!(
            error,
            ConfigError::Invalid {
                name: "COOP_OUTPUT_DIR",
                ..
            }
        ));
    }
}
