//! Configuration structures for the extraction pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default inference host, matching a containerized deployment that
/// reaches an Ollama server on the host machine.
pub const DEFAULT_HOST: &str = "host.docker.internal";

/// Default model requested from the inference service.
pub const DEFAULT_MODEL: &str = "phi4";

/// Default request timeout in seconds. Local models parse long statements
/// slowly, so the window is generous.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Main configuration for the stex pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StexConfig {
    /// Inference service configuration.
    pub inference: InferenceConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,
}

impl Default for StexConfig {
    fn default() -> Self {
        Self {
            inference: InferenceConfig::default(),
            pdf: PdfConfig::default(),
        }
    }
}

/// Inference service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Host the Ollama server is reachable at.
    pub host: String,

    /// Port the Ollama server listens on.
    pub port: u16,

    /// Model name to request.
    pub model: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: stex_inference::DEFAULT_PORT,
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl InferenceConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum extracted-text length to treat a PDF as text-based rather
    /// than scanned.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            min_text_length: 50,
        }
    }
}

impl StexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }

    /// Apply environment overrides.
    ///
    /// `OLLAMA_HOST` selects the inference host and takes precedence over
    /// both file and default values.
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("OLLAMA_HOST") {
            if !host.is_empty() {
                self.inference.host = host;
            }
        }
    }
}
