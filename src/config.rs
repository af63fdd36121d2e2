// User configuration loaded from ~/.config/vbs/config.toml.
// Falls back to sensible defaults when the file is missing. Never written back.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Accepted range for `[general] tick_rate`, in ticks per second.
pub const MIN_TICK_RATE: f64 = 0.1;
pub const MAX_TICK_RATE: f64 = 120.0;

/// Application configuration, deserialized from `~/.config/vbs/config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub ipc: IpcConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Liveness spinner ticks per second (default: 10, at most 120).
    #[serde(default = "default_tick_rate")]
    pub tick_rate: f64,
    /// `"dark"` or `"light"`.
    #[serde(default = "default_theme")]
    pub theme: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerConfig {
    /// Player executable, looked up on `PATH`.
    #[serde(default = "default_executable")]
    pub executable: String,
    /// Display index for fullscreen output.
    #[serde(default)]
    pub output_screen: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IpcConfig {
    /// Delay between connection attempts while mpv creates its endpoint.
    #[serde(default = "default_connect_interval_ms")]
    pub connect_interval_ms: u64,
    #[serde(default = "default_connect_attempts")]
    pub connect_attempts: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosticsConfig {
    /// Number of IPC lines kept for the debug panel.
    #[serde(default = "default_event_log_capacity")]
    pub event_log_capacity: usize,
}

fn default_tick_rate() -> f64 {
    10.0
}

fn default_theme() -> String {
    crate::theme::THEME_DARK.to_string()
}

fn default_executable() -> String {
    "mpv".to_string()
}

fn default_connect_interval_ms() -> u64 {
    100
}

fn default_connect_attempts() -> u32 {
    100
}

fn default_event_log_capacity() -> usize {
    crate::app::DEFAULT_EVENT_LOG_CAPACITY
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            tick_rate: default_tick_rate(),
            theme: default_theme(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            output_screen: 0,
        }
    }
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            connect_interval_ms: default_connect_interval_ms(),
            connect_attempts: default_connect_attempts(),
        }
    }
}

impl IpcConfig {
    pub fn connect_interval(&self) -> Duration {
        Duration::from_millis(self.connect_interval_ms)
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            event_log_capacity: default_event_log_capacity(),
        }
    }
}

impl Config {
    /// Read config from the default location, or return defaults if the file
    /// doesn't exist.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Config::default())
        }
    }

    /// Read config from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let rate = self.general.tick_rate;
        if !(MIN_TICK_RATE..=MAX_TICK_RATE).contains(&rate) {
            anyhow::bail!(
                "general.tick_rate must be between {} and {}, got {}",
                MIN_TICK_RATE,
                MAX_TICK_RATE,
                rate
            );
        }
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vbs")
            .join("config.toml")
    }
}
