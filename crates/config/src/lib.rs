//! Configuration loading, validation, and management for climactl.
//!
//! Loads configuration from `~/.climactl/config.toml` (or an explicit path)
//! with environment variable overrides. Validates all settings at startup;
//! a bad configuration is fatal.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure.
///
/// Maps directly to `~/.climactl/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model backend and conversation settings
    #[serde(default)]
    pub slm: SlmConfig,

    /// Scheduler settings
    #[serde(default)]
    pub system: SystemConfig,

    /// Prompts for non-terminal triggers
    #[serde(default)]
    pub control: ControlConfig,

    /// Sensor, LED and button wiring
    #[serde(default)]
    pub hardware: HardwareConfig,
}

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an IoT Climate Control Assistant running on a Raspberry Pi.
Your primary role is to monitor and control the environment using the provided tools.
You MUST use the tools to read sensor data or change LED states (actuators).
Always try to use the most relevant tool before providing a final answer.
Be concise and conversational in your final response.";

pub const DEFAULT_BUTTON_PROMPT: &str = "The control button was pressed. Read the current environment data, \
then decide which actuators should be active: turn the red LED (fan) on if it is too warm, \
the yellow LED (heater) on if it is too cold, and the green LED on when conditions are comfortable. \
Set the LEDs accordingly and briefly report what you did.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlmConfig {
    /// Base URL of the Ollama server
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Maximum retained messages, system preamble included
    #[serde(default = "default_max_history_length")]
    pub max_history_length: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Load the model before the first turn
    #[serde(default = "default_true")]
    pub preload: bool,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_base_url() -> String {
    "http://localhost:11434".into()
}
fn default_model_name() -> String {
    "qwen2.5:1.5b".into()
}
fn default_max_history_length() -> usize {
    9
}
fn default_request_timeout_secs() -> u64 {
    120
}
fn default_true() -> bool {
    true
}
fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.into()
}

impl Default for SlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model_name: default_model_name(),
            max_history_length: default_max_history_length(),
            temperature: None,
            request_timeout_secs: default_request_timeout_secs(),
            preload: true,
            system_prompt: default_system_prompt(),
        }
    }
}

impl SlmConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Scheduler tick period in seconds
    #[serde(default = "default_check_interval_s")]
    pub check_interval_s: f64,
}

fn default_check_interval_s() -> f64 {
    0.1
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            check_interval_s: default_check_interval_s(),
        }
    }
}

impl SystemConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs_f64(self.check_interval_s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    /// User turn sent when the button is pressed
    #[serde(default = "default_button_prompt")]
    pub button_control_prompt: String,
}

fn default_button_prompt() -> String {
    DEFAULT_BUTTON_PROMPT.into()
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            button_control_prompt: default_button_prompt(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HardwareBackend {
    /// In-memory board, for development machines
    Simulated,
    /// Linux sysfs GPIO value files and IIO sensor attributes
    Sysfs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardwareConfig {
    #[serde(default = "default_backend")]
    pub backend: HardwareBackend,

    #[serde(default = "default_gpio_root")]
    pub gpio_root: PathBuf,

    #[serde(default = "default_led_red_pin")]
    pub led_red_pin: u32,

    #[serde(default = "default_led_yellow_pin")]
    pub led_yellow_pin: u32,

    #[serde(default = "default_led_green_pin")]
    pub led_green_pin: u32,

    #[serde(default = "default_button_pin")]
    pub button_pin: u32,

    /// Button wired to ground with a pull-up: pressed reads as 0
    #[serde(default = "default_true")]
    pub button_active_low: bool,

    /// IIO device directory of the DHT22 (dht11 kernel driver)
    #[serde(default = "default_dht_iio_device")]
    pub dht_iio_device: PathBuf,

    /// IIO device directory of the BMP280
    #[serde(default = "default_bmp280_iio_device")]
    pub bmp280_iio_device: PathBuf,

    #[serde(default)]
    pub simulated: SimulatedHardwareConfig,
}

fn default_backend() -> HardwareBackend {
    HardwareBackend::Simulated
}
fn default_gpio_root() -> PathBuf {
    PathBuf::from("/sys/class/gpio")
}
fn default_led_red_pin() -> u32 {
    17
}
fn default_led_yellow_pin() -> u32 {
    27
}
fn default_led_green_pin() -> u32 {
    22
}
fn default_button_pin() -> u32 {
    23
}
fn default_dht_iio_device() -> PathBuf {
    PathBuf::from("/sys/bus/iio/devices/iio:device0")
}
fn default_bmp280_iio_device() -> PathBuf {
    PathBuf::from("/sys/bus/iio/devices/iio:device1")
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            gpio_root: default_gpio_root(),
            led_red_pin: default_led_red_pin(),
            led_yellow_pin: default_led_yellow_pin(),
            led_green_pin: default_led_green_pin(),
            button_pin: default_button_pin(),
            button_active_low: true,
            dht_iio_device: default_dht_iio_device(),
            bmp280_iio_device: default_bmp280_iio_device(),
            simulated: SimulatedHardwareConfig::default(),
        }
    }
}

/// Fixed readings served by the simulated board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedHardwareConfig {
    #[serde(default = "default_sim_temperature")]
    pub dht_temperature_c: f64,

    #[serde(default = "default_sim_humidity")]
    pub humidity_percent: f64,

    #[serde(default = "default_sim_bmp_temperature")]
    pub bmp_temperature_c: f64,

    #[serde(default = "default_sim_pressure")]
    pub pressure_hpa: f64,

    /// A file holding `0` or `1` that stands in for the button level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_value_file: Option<PathBuf>,
}

fn default_sim_temperature() -> f64 {
    24.6
}
fn default_sim_humidity() -> f64 {
    52.3
}
fn default_sim_bmp_temperature() -> f64 {
    24.9
}
fn default_sim_pressure() -> f64 {
    1012.84
}

impl Default for SimulatedHardwareConfig {
    fn default() -> Self {
        Self {
            dht_temperature_c: default_sim_temperature(),
            humidity_percent: default_sim_humidity(),
            bmp_temperature_c: default_sim_bmp_temperature(),
            pressure_hpa: default_sim_pressure(),
            button_value_file: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, or from the default location
    /// (`~/.climactl/config.toml`) when none is given.
    ///
    /// Environment overrides (applied after the file):
    /// - `CLIMACTL_MODEL`
    /// - `CLIMACTL_OLLAMA_URL`
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_dir().join("config.toml"),
        };
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(model) = lookup("CLIMACTL_MODEL").filter(|m| !m.trim().is_empty()) {
            self.slm.model_name = model;
        }
        if let Some(url) = lookup("CLIMACTL_OLLAMA_URL").filter(|u| !u.trim().is_empty()) {
            self.slm.base_url = url;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".climactl")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slm.model_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "slm.model_name must not be empty".into(),
            ));
        }

        if self.slm.max_history_length < 2 {
            return Err(ConfigError::ValidationError(
                "slm.max_history_length must be at least 2".into(),
            ));
        }

        if let Some(t) = self.slm.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::ValidationError(
                    "slm.temperature must be between 0.0 and 2.0".into(),
                ));
            }
        }

        if self.slm.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "slm.request_timeout_secs must be > 0".into(),
            ));
        }

        let interval = self.system.check_interval_s;
        if interval <= 0.0 || Duration::try_from_secs_f64(interval).is_err() {
            return Err(ConfigError::ValidationError(
                "system.check_interval_s must be a positive number of seconds".into(),
            ));
        }

        let hw = &self.hardware;
        let pins = [hw.led_red_pin, hw.led_yellow_pin, hw.led_green_pin, hw.button_pin];
        for (i, pin) in pins.iter().enumerate() {
            if pins[i + 1..].contains(pin) {
                return Err(ConfigError::ValidationError(format!(
                    "hardware pin {pin} is assigned twice"
                )));
            }
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
