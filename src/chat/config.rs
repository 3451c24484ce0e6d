//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and the resolved
//! configuration for a chat session.

use arrrg_derive::CommandLine;

/// Default model name forwarded to the server.
const DEFAULT_MODEL: &str = "MoE-4bit";

/// Default maximum generated tokens per response.
const DEFAULT_MAX_TOKENS: u32 = 16000;

/// Default sampling temperature.
const DEFAULT_TEMPERATURE: f64 = 0.6;

/// Default sampling seed.
const DEFAULT_SEED: u64 = 0;

/// Default model server endpoint.
const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8080";

/// Command-line arguments for the thinker-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: MoE-4bit)", "MODEL")]
    pub model: Option<String>,

    /// Maximum generated tokens per response.
    #[arrrg(optional, "Max generated tokens per response (default: 16000)", "TOKENS")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature. Carried as text so the argument struct stays
    /// `Eq`; parsed when the config is resolved.
    #[arrrg(optional, "Sampling temperature (default: 0.6)", "TEMP")]
    pub temp: Option<String>,

    /// Sampling seed for reproducibility.
    #[arrrg(optional, "Sampling seed (default: 0)", "SEED")]
    pub seed: Option<u64>,

    /// Model server endpoint.
    #[arrrg(
        optional,
        "Model server endpoint (default: http://127.0.0.1:8080)",
        "URL"
    )]
    pub endpoint: Option<String>,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// The model to request responses from.
    pub model: String,

    /// Maximum generated tokens per response, enforced server-side.
    pub max_tokens: u32,

    /// Sampling temperature.
    pub temperature: f64,

    /// Sampling seed.
    pub seed: u64,

    /// Model server endpoint.
    pub endpoint: String,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: MoE-4bit
    /// - Max tokens: 16000
    /// - Temperature: 0.6
    /// - Seed: 0
    /// - Endpoint: http://127.0.0.1:8080
    pub fn new() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            seed: DEFAULT_SEED,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Sets the model to request.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the maximum generated tokens per response.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the sampling seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the model server endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        ChatConfig {
            model: args.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: args.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: args
                .temp
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TEMPERATURE),
            seed: args.seed.unwrap_or(DEFAULT_SEED),
            endpoint: args.endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert_eq!(config.model, "MoE-4bit");
        assert_eq!(config.max_tokens, 16000);
        assert_eq!(config.temperature, 0.6);
        assert_eq!(config.seed, 0);
        assert_eq!(config.endpoint, "http://127.0.0.1:8080");
    }

    #[test]
    fn config_from_args_defaults() {
        let args = ChatArgs::default();
        let config = ChatConfig::from(args);
        assert_eq!(config, ChatConfig::new());
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            model: Some("qwen3-30b".to_string()),
            max_tokens: Some(4096),
            temp: Some("0.2".to_string()),
            seed: Some(7),
            endpoint: Some("http://127.0.0.1:9999".to_string()),
        };
        let config = ChatConfig::from(args);
        assert_eq!(config.model, "qwen3-30b");
        assert_eq!(config.max_tokens, 4096);
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.seed, 7);
        assert_eq!(config.endpoint, "http://127.0.0.1:9999");
    }

    #[test]
    fn unparseable_temperature_falls_back_to_the_default() {
        let args = ChatArgs {
            temp: Some("warm".to_string()),
            ..ChatArgs::default()
        };
        let config = ChatConfig::from(args);
        assert_eq!(config.temperature, 0.6);
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_model("qwen3-30b")
            .with_max_tokens(2048)
            .with_temperature(1.0)
            .with_seed(42)
            .with_endpoint("http://10.0.0.2:8080");

        assert_eq!(config.model, "qwen3-30b");
        assert_eq!(config.max_tokens, 2048);
        assert_eq!(config.temperature, 1.0);
        assert_eq!(config.seed, 42);
        assert_eq!(config.endpoint, "http://10.0.0.2:8080");
    }
}
