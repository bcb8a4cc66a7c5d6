//! CLI argument definitions for the Yaad skill server.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

use yaad_core::config::DurableBackendKind;

/// Yaad Rakhna - remembers where you put things, and tells you when you ask.
#[derive(Parser, Debug)]
#[command(name = "yaad", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// API server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Data directory for the SQLite document store.
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Durable store: sqlite, memory or none.
    #[arg(long = "durable")]
    pub durable: Option<DurableBackendKind>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > YAAD_CONFIG env var > ~/.yaad/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("YAAD_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the API server port.
    ///
    /// Priority: --port flag > YAAD_PORT env var > config file value.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        if let Some(p) = self.port {
            return p;
        }
        if let Ok(val) = std::env::var("YAAD_PORT") {
            if let Ok(p) = val.parse::<u16>() {
                return p;
            }
        }
        config_port
    }

    /// Data directory override, if given.
    pub fn resolve_data_dir(&self) -> Option<String> {
        self.data_dir
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
    }
}

/// Default config file path: ~/.yaad/config.toml.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".yaad").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".yaad").join("config.toml");
    }
    PathBuf::from("config.toml")
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(rest)
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let args = CliArgs::parse_from([
            "yaad",
            "--config",
            "/etc/yaad.toml",
            "-p",
            "9000",
            "--durable",
            "memory",
            "-l",
            "debug",
        ]);
        assert_eq!(args.resolve_config_path(), PathBuf::from("/etc/yaad.toml"));
        assert_eq!(args.resolve_port(3040), 9000);
        assert_eq!(args.durable, Some(DurableBackendKind::Memory));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.resolve_data_dir().is_none());
    }

    #[test]
    fn test_unknown_durable_backend_rejected() {
        let result = CliArgs::try_parse_from(["yaad", "--durable", "dynamodb"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_data_dir_flag() {
        let args = CliArgs::parse_from(["yaad", "-d", "/var/lib/yaad"]);
        assert_eq!(args.resolve_data_dir().as_deref(), Some("/var/lib/yaad"));
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_home("relative"), PathBuf::from("relative"));
        let expanded = expand_home("~/.yaad/data");
        assert!(expanded.ends_with(".yaad/data"));
        assert!(!expanded.to_string_lossy().starts_with('~'));
    }
}
