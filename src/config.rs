use crate::pdf_extract::PdfBackend;
use serde::Deserialize;
use std::{fs, path::Path};
use thiserror::Error;
use tracing::info;

/// Where the binary looks for its settings, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = ".config/invoice_extractor.toml";

/// Environment variable holding the chat-completion bearer key.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("no API key configured: set GROQ_API_KEY or llm.api_key")]
    MissingApiKey,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub pdf: PdfSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8501".to_string()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

/// Hosted chat-completion endpoint (any OpenAI-compatible `/chat/completions`).
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Used only when the environment variable is unset.
    #[serde(default)]
    pub api_key: Option<String>,
    /// No timeout unless set.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
            timeout_secs: None,
        }
    }
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_model() -> String {
    "llama3-8b-8192".to_string()
}

impl LlmSection {
    /// Pick the bearer key: a non-empty environment value wins over the file.
    pub fn resolve_api_key(&self, from_env: Option<String>) -> Result<String, ConfigError> {
        from_env
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()))
            .ok_or(ConfigError::MissingApiKey)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PdfSection {
    #[serde(default)]
    pub backend: PdfBackend,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Like [`Config::load`], but a missing file means "all defaults".
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        info!(path = %path.display(), "Loading config");
        Self::load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = Config::parse("").unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:8501");
        assert_eq!(cfg.server.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(cfg.llm.model, "llama3-8b-8192");
        assert_eq!(cfg.llm.base_url, "https://api.groq.com/openai/v1");
        assert!(cfg.llm.timeout_secs.is_none());
        assert_eq!(cfg.pdf.backend, PdfBackend::Lopdf);
    }

    #[test]
    fn test_partial_sections() {
        let cfg = Config::parse(
            r#"
            [llm]
            model = "llama-3.1-8b-instant"
            timeout_secs = 30

            [pdf]
            backend = "pdf_extract"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.llm.model, "llama-3.1-8b-instant");
        assert_eq!(cfg.llm.timeout_secs, Some(30));
        assert_eq!(cfg.llm.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(cfg.pdf.backend, PdfBackend::PdfExtract);
        assert_eq!(cfg.server.bind, "127.0.0.1:8501");
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let result = Config::parse("[pdf]\nbackend = \"ocr\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_api_key_env_wins() {
        let llm = LlmSection {
            api_key: Some("from-file".to_string()),
            ..LlmSection::default()
        };
        assert_eq!(llm.resolve_api_key(Some("from-env".into())).unwrap(), "from-env");
        assert_eq!(llm.resolve_api_key(Some("  ".into())).unwrap(), "from-file");
        assert_eq!(llm.resolve_api_key(None).unwrap(), "from-file");
    }

    #[test]
    fn test_missing_api_key() {
        let llm = LlmSection::default();
        assert!(matches!(
            llm.resolve_api_key(None),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let cfg = Config::load_or_default("does/not/exist.toml").unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:8501");
    }
}
