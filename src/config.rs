use anyhow::Context;
use serde::Deserialize;
use std::time::Duration;
use std::{
    env,
    fs::File,
    path::{Path, PathBuf},
};

use crate::constants::{
    DEFAULT_MAX_RETRIES, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_MODEL, DEFAULT_RETRY_DELAY_SECS,
    DEFAULT_TEMPERATURE,
};
use crate::core::ParseMode;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Defaults {
    pub model: Option<String>,
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Generation {
    pub max_retries: Option<usize>,
    /// humantime syntax, e.g. "5s" or "500ms".
    pub retry_delay: Option<String>,
    pub temperature: Option<f64>,
    pub best_effort: Option<bool>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Limits {
    pub max_upload_bytes: Option<u64>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Root {
    pub defaults: Option<Defaults>,
    pub generation: Option<Generation>,
    pub limits: Option<Limits>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub default_model: String,
    pub output_dir: PathBuf,
    pub max_upload_bytes: u64,
    pub max_retries: usize,
    pub retry_delay: Duration,
    pub temperature: f64,
    pub parse_mode: ParseMode,
}

impl AppConfig {
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        let api_key =
            env::var("GEMINI_API_KEY").map_err(|_| anyhow::anyhow!("GEMINI_API_KEY not set"))?;
        if api_key.trim().is_empty() {
            anyhow::bail!("GEMINI_API_KEY is empty");
        }
        let root = match path {
            Some(p) => Some(Self::read_yaml(Path::new(p))?),
            None => {
                for candidate in ["atagen.yaml", "atagen.yml"] {
                    let path = Path::new(candidate);
                    if path.exists() {
                        return Self::_from_yaml(Some(Self::read_yaml(path)?), api_key.clone());
                    }
                }
                None
            }
        };
        Self::_from_yaml(root, api_key)
    }

    fn read_yaml(path: &Path) -> anyhow::Result<Root> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        Ok(serde_yaml::from_reader(file)?)
    }

    fn _from_yaml(root: Option<Root>, api_key: String) -> anyhow::Result<Self> {
        let r = root.unwrap_or_default();
        let defaults = r.defaults.unwrap_or_default();
        let generation = r.generation.unwrap_or_default();
        let limits = r.limits.unwrap_or_default();

        let default_model = env::var("ATAGEN_DEFAULT_MODEL")
            .ok()
            .or(defaults.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let output_dir = env::var("ATAGEN_OUTPUT_DIR")
            .ok()
            .map(PathBuf::from)
            .or(defaults.output_dir)
            .map(|p| expand_home(&p))
            .unwrap_or_else(|| PathBuf::from("atas"));

        let retry_delay = match generation.retry_delay {
            Some(text) => humantime::parse_duration(&text)
                .with_context(|| format!("invalid retry_delay '{text}'"))?,
            None => Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
        };

        let parse_mode = if generation.best_effort.unwrap_or(false) {
            ParseMode::BestEffort
        } else {
            ParseMode::Strict
        };

        Ok(Self {
            api_key,
            default_model,
            output_dir,
            max_upload_bytes: limits.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            max_retries: generation.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            retry_delay,
            temperature: generation.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            parse_mode,
        })
    }
}

fn expand_home(path: &Path) -> PathBuf {
    if path.starts_with("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(path.strip_prefix("~").unwrap());
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_sections_override_defaults() {
        let root: Root = serde_yaml::from_str(
            "defaults:\n  model: gemini-2.5-pro\ngeneration:\n  max_retries: 1\n  retry_delay: 500ms\n  best_effort: true\nlimits:\n  max_upload_bytes: 1024\n",
        )
        .unwrap();
        let cfg = AppConfig::_from_yaml(Some(root), "key".into()).unwrap();
        assert_eq!(cfg.default_model, "gemini-2.5-pro");
        assert_eq!(cfg.max_retries, 1);
        assert_eq!(cfg.retry_delay, Duration::from_millis(500));
        assert_eq!(cfg.max_upload_bytes, 1024);
        assert_eq!(cfg.parse_mode, ParseMode::BestEffort);
        assert_eq!(cfg.temperature, DEFAULT_TEMPERATURE);
    }

    #[test]
    fn invalid_retry_delay_is_rejected() {
        let root: Root =
            serde_yaml::from_str("generation:\n  retry_delay: soon\n").unwrap();
        assert!(AppConfig::_from_yaml(Some(root), "key".into()).is_err());
    }
}
