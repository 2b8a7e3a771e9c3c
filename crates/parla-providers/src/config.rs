//! Configuration and provider factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use parla_core::engine::TutorEngineConfig;
use parla_core::traits::ChatProvider;

use crate::mock::MockProvider;
use crate::ollama::OllamaProvider;
use crate::openai::OpenAiProvider;

/// Name of the project-local config file.
pub const LOCAL_CONFIG_FILE: &str = "parla.toml";

/// Configuration for a single chat provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
    },
    /// Scripted replies, for offline practice and tests.
    Mock {
        #[serde(default)]
        replies: Vec<String>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                org_id,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
            ProviderConfig::Ollama { base_url } => f
                .debug_struct("Ollama")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Mock { replies } => f
                .debug_struct("Mock")
                .field("replies", &replies.len())
                .finish(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

/// Top-level parla configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParlaConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Provider used for lessons.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Model used for lessons.
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Max retries on provider errors.
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Where progress is stored.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_temperature() -> f64 {
    0.7
}
fn default_max_tokens() -> u32 {
    500
}
fn default_retries() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    1000
}
fn default_data_dir() -> PathBuf {
    std::env::var("HOME")
        .map(|h| PathBuf::from(h).join(".local").join("share").join("parla"))
        .unwrap_or_else(|_| PathBuf::from(".parla"))
}

impl Default for ParlaConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_retries: default_retries(),
            retry_delay_ms: default_retry_delay(),
            data_dir: default_data_dir(),
        }
    }
}

impl ParlaConfig {
    /// Tutor engine settings derived from this config.
    pub fn engine_config(&self) -> TutorEngineConfig {
        TutorEngineConfig {
            model: self.default_model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    /// Look up a provider by name, falling back to `default_provider`.
    pub fn provider_config(&self, name: Option<&str>) -> Result<(&str, &ProviderConfig)> {
        let name = name.unwrap_or(self.default_provider.as_str());
        self.providers
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .with_context(|| {
                format!(
                    "provider '{name}' is not configured. Set OPENAI_API_KEY or run `parla init` and edit {LOCAL_CONFIG_FILE}"
                )
            })
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
fn resolve_env_vars(s: &str, env: &impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        result.push_str(&env(&rest[start + 2..start + len]).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

/// Resolve env vars in a provider config.
fn resolve_provider_config(
    config: &ProviderConfig,
    env: &impl Fn(&str) -> Option<String>,
) -> ProviderConfig {
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key, env),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u, env)),
            org_id: org_id.as_ref().map(|o| resolve_env_vars(o, env)),
        },
        ProviderConfig::Ollama { base_url } => ProviderConfig::Ollama {
            base_url: resolve_env_vars(base_url, env),
        },
        ProviderConfig::Mock { replies } => ProviderConfig::Mock {
            replies: replies.clone(),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `parla.toml` in the current directory
/// 2. `~/.config/parla/config.toml`
///
/// Environment variable overrides: `OPENAI_API_KEY`, `PARLA_DATA_DIR`.
pub fn load_config() -> Result<ParlaConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ParlaConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ParlaConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ParlaConfig::default(),
    };

    Ok(apply_env_overrides(config, |var| std::env::var(var).ok()))
}

/// Apply environment overrides, then resolve `${VAR}` references.
fn apply_env_overrides(mut config: ParlaConfig, env: impl Fn(&str) -> Option<String>) -> ParlaConfig {
    if let Some(key) = env("OPENAI_API_KEY").filter(|k| !k.is_empty()) {
        let entry = config
            .providers
            .entry("openai".into())
            .or_insert(ProviderConfig::OpenAI {
                api_key: String::new(),
                base_url: None,
                org_id: None,
            });
        if let ProviderConfig::OpenAI { api_key, .. } = entry {
            *api_key = key;
        }
    }

    if let Some(dir) = env("PARLA_DATA_DIR").filter(|d| !d.is_empty()) {
        config.data_dir = PathBuf::from(dir);
    }

    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v, &env)))
        .collect();

    config
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("parla"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(name: &str, config: &ProviderConfig) -> Result<Box<dyn ChatProvider>> {
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => {
            if api_key.is_empty() {
                anyhow::bail!("provider '{name}' has no API key. Set OPENAI_API_KEY");
            }
            Ok(Box::new(OpenAiProvider::new(
                api_key,
                base_url.clone(),
                org_id.clone(),
            )?))
        }
        ProviderConfig::Ollama { base_url } => Ok(Box::new(OllamaProvider::new(base_url)?)),
        ProviderConfig::Mock { replies } => Ok(Box::new(MockProvider::new(replies.clone()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn resolve_env_vars_basic() {
        let env = |var: &str| (var == "_PARLA_TEST_VAR").then(|| "hello".to_string());
        assert_eq!(resolve_env_vars("${_PARLA_TEST_VAR}", &env), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_PARLA_TEST_VAR}_suffix", &env),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("${_PARLA_UNSET_VAR}", &env), "");
        assert_eq!(resolve_env_vars("broken ${", &env), "broken ${");
        assert_eq!(resolve_env_vars("${A}${_PARLA_TEST_VAR}", &env), "hello");
    }

    #[test]
    fn resolved_values_are_not_rescanned() {
        let env = |var: &str| match var {
            "SELF_REF" => Some("${SELF_REF}".to_string()),
            "OTHER" => Some("x${SELF_REF}".to_string()),
            _ => None,
        };
        assert_eq!(resolve_env_vars("${SELF_REF}", &env), "${SELF_REF}");
        assert_eq!(resolve_env_vars("a-${OTHER}-b", &env), "a-x${SELF_REF}-b");
    }

    #[test]
    fn default_config() {
        let config = ParlaConfig::default();
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.default_model, "gpt-4o-mini");
        assert_eq!(config.max_tokens, 500);
        assert_eq!(config.max_retries, 3);

        let engine = config.engine_config();
        assert_eq!(engine.retry_delay, Duration::from_millis(1000));
        assert!((engine.temperature - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_provider_config() {
        let toml_str = r#"
default_provider = "local"
default_model = "llama3.1:8b"
temperature = 0.5
data_dir = "/tmp/parla-data"

[providers.openai]
type = "openai"
api_key = "sk-openai"

[providers.local]
type = "ollama"

[providers.offline]
type = "mock"
replies = ["Ciao!"]
"#;
        let config: ParlaConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.providers.len(), 3);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/parla-data"));
        assert_eq!(config.max_tokens, 500);
        assert!(matches!(
            config.providers.get("local"),
            Some(ProviderConfig::Ollama { base_url }) if base_url == "http://localhost:11434"
        ));

        let (name, provider) = config.provider_config(None).unwrap();
        assert_eq!(name, "local");
        assert!(matches!(provider, ProviderConfig::Ollama { .. }));
        assert!(config.provider_config(Some("anthropic")).is_err());
    }

    #[test]
    fn env_overrides() {
        let config = apply_env_overrides(ParlaConfig::default(), |var| match var {
            "OPENAI_API_KEY" => Some("sk-env".into()),
            "PARLA_DATA_DIR" => Some("/data/parla".into()),
            _ => None,
        });
        assert!(matches!(
            config.providers.get("openai"),
            Some(ProviderConfig::OpenAI { api_key, .. }) if api_key == "sk-env"
        ));
        assert_eq!(config.data_dir, PathBuf::from("/data/parla"));

        let untouched = apply_env_overrides(ParlaConfig::default(), no_env);
        assert!(untouched.providers.is_empty());
    }

    #[test]
    fn env_key_keeps_configured_base_url() {
        let mut config = ParlaConfig::default();
        config.providers.insert(
            "openai".into(),
            ProviderConfig::OpenAI {
                api_key: "from-file".into(),
                base_url: Some("http://proxy.local".into()),
                org_id: None,
            },
        );
        let config = apply_env_overrides(config, |var| {
            (var == "OPENAI_API_KEY").then(|| "sk-env".to_string())
        });
        assert!(matches!(
            config.providers.get("openai"),
            Some(ProviderConfig::OpenAI { api_key, base_url: Some(url), .. })
                if api_key == "sk-env" && url == "http://proxy.local"
        ));
    }

    #[test]
    fn debug_masks_api_key() {
        let config = ProviderConfig::OpenAI {
            api_key: "sk-secret".into(),
            base_url: None,
            org_id: None,
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn explicit_missing_path_fails() {
        let err = load_config_from(Some(Path::new("/nonexistent/parla.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parla.toml");
        std::fs::write(&path, "default_model = \"gpt-4o\"\nmax_retries = 1\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.default_model, "gpt-4o");
        assert_eq!(config.max_retries, 1);
    }

    #[test]
    fn factory_requires_api_key() {
        let empty = ProviderConfig::OpenAI {
            api_key: String::new(),
            base_url: None,
            org_id: None,
        };
        assert!(create_provider("openai", &empty).is_err());

        let mock = create_provider("offline", &ProviderConfig::Mock { replies: vec![] }).unwrap();
        assert_eq!(mock.name(), "mock");
    }
}
