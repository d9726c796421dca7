//! Configuration for the sender binary.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    /// Network settings.
    pub network: NetworkConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Network configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Local UDP port to bind (0 = ephemeral).
    pub local_port: u16,
    /// Peer host to send to.
    pub peer_host: String,
    /// Peer UDP port.
    pub peer_port: u16,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            local_port: 0,
            peer_host: "127.0.0.1".into(),
            peer_port: 20001,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl SenderConfig {
    /// Load configuration from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("invalid config {}: {e}; using defaults", path.display());
                Self::default()
            }),
            Err(_) => {
                tracing::info!("no config at {}; using defaults", path.display());
                Self::default()
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let cfg = SenderConfig::default();
        let text = toml::to_string_pretty(&cfg).unwrap();
        assert!(text.contains("peer_host"));
        assert!(text.contains("level"));
    }

    #[test]
    fn roundtrip_config() {
        let cfg = SenderConfig::default();
        let text = toml::to_string_pretty(&cfg).unwrap();
        let parsed: SenderConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.network.peer_port, 20001);
        assert_eq!(parsed.logging.level, "info");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let parsed: SenderConfig = toml::from_str("[network]\npeer_port = 9000\n").unwrap();
        assert_eq!(parsed.network.peer_port, 9000);
        assert_eq!(parsed.network.peer_host, "127.0.0.1");
        assert_eq!(parsed.logging.level, "info");
    }
}
