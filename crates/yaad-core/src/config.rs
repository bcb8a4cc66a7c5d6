use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, YaadError};

/// Top-level configuration for the Yaad skill server.
///
/// Loaded from `~/.yaad/config.toml` by default. Vocabulary and grammar
/// sections hold the language data the normalizer and composer consult, so
/// new spellings or feminine nouns are a config change rather than a release.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YaadConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub durable: DurableConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub vocabulary: VocabularyConfig,
    #[serde(default)]
    pub grammar: GrammarConfig,
}

impl YaadConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: YaadConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| YaadError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the SQLite document store.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.yaad/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3040,
        }
    }
}

/// Which durable tier backs the Item Store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurableBackendKind {
    /// One JSON document per user in a SQLite table.
    #[default]
    Sqlite,
    /// Process-wide map shared by every conversation, lost on restart.
    Memory,
    /// No durable tier; items live only as long as the conversation.
    None,
}

impl std::fmt::Display for DurableBackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DurableBackendKind::Sqlite => "sqlite",
            DurableBackendKind::Memory => "memory",
            DurableBackendKind::None => "none",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for DurableBackendKind {
    type Err = YaadError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(DurableBackendKind::Sqlite),
            "memory" => Ok(DurableBackendKind::Memory),
            "none" => Ok(DurableBackendKind::None),
            other => Err(YaadError::Config(format!(
                "unknown durable backend: {}",
                other
            ))),
        }
    }
}

/// Durable tier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DurableConfig {
    /// Backend kind: "sqlite", "memory" or "none".
    pub backend: DurableBackendKind,
    /// SQLite file name, relative to `general.data_dir`.
    pub db_file: String,
}

impl Default for DurableConfig {
    fn default() -> Self {
        Self {
            backend: DurableBackendKind::Sqlite,
            db_file: "yaad.db".to_string(),
        }
    }
}

/// Conversation lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Minutes of inactivity after which a conversation's ephemeral items are dropped.
    pub idle_timeout_minutes: u32,
    /// Seconds between purge sweeps.
    pub purge_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_minutes: 30,
            purge_interval_secs: 60,
        }
    }
}

/// A canonical item name and the spellings that should collapse onto it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellingVariant {
    pub canonical: String,
    pub spellings: Vec<String>,
}

/// Name normalization vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    pub variants: Vec<SpellingVariant>,
    /// Possessive words stripped from the front of an item name.
    pub possessive_prefixes: Vec<String>,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            variants: vec![SpellingVariant {
                canonical: "खारी".to_string(),
                spellings: ["khari", "khadi", "khaari", "khaadi", "खारी", "खड़ी", "खरी", "खडी"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }],
            possessive_prefixes: ["मेरा", "मेरी", "अपना", "अपनी", "mera", "meri", "apna", "apni"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Grammatical data for reply rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarConfig {
    /// Item words that take feminine verb agreement (रखी rather than रखा).
    pub feminine_items: Vec<String>,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            feminine_items: ["चाबी", "किताब", "कॉपी", "घड़ी", "दवाई", "खारी"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}
