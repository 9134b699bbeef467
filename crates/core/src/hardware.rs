//! Hardware abstractions: sensors, LED actuators and the push button.
//!
//! Backends (simulated, sysfs) implement the small traits below. The
//! [`Board`] bundles one of each and is the single hardware context that is
//! built at startup and shared by the capabilities, the status reporter and
//! the scheduler.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

use crate::error::HardwareError;

/// One of the three status LEDs (standing in for fan/heater/status actuators).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedColor {
    Red,
    Yellow,
    Green,
}

impl LedColor {
    pub const ALL: [LedColor; 3] = [LedColor::Red, LedColor::Yellow, LedColor::Green];

    pub fn as_str(&self) -> &'static str {
        match self {
            LedColor::Red => "red",
            LedColor::Yellow => "yellow",
            LedColor::Green => "green",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            LedColor::Red => 0,
            LedColor::Yellow => 1,
            LedColor::Green => 2,
        }
    }
}

impl fmt::Display for LedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LedColor {
    type Err = HardwareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(LedColor::Red),
            "yellow" => Ok(LedColor::Yellow),
            "green" => Ok(LedColor::Green),
            _ => Err(HardwareError::InvalidColor(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedState {
    On,
    Off,
}

impl LedState {
    pub fn from_lit(lit: bool) -> Self {
        if lit { LedState::On } else { LedState::Off }
    }

    pub fn is_on(&self) -> bool {
        matches!(self, LedState::On)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LedState::On => "on",
            LedState::Off => "off",
        }
    }
}

impl fmt::Display for LedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LedState {
    type Err = HardwareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on" => Ok(LedState::On),
            "off" => Ok(LedState::Off),
            _ => Err(HardwareError::InvalidState(s.to_string())),
        }
    }
}

/// Snapshot of all three LEDs, in the shape the model sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedStatus {
    pub red_led_status: LedState,
    pub yellow_led_status: LedState,
    pub green_led_status: LedState,
}

impl LedStatus {
    pub fn get(&self, color: LedColor) -> LedState {
        match color {
            LedColor::Red => self.red_led_status,
            LedColor::Yellow => self.yellow_led_status,
            LedColor::Green => self.green_led_status,
        }
    }
}

/// Raw values as delivered by the sensor drivers. `None` means the driver
/// had no reading (a DHT22 checksum miss, an unplugged BMP280...).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorSample {
    pub dht_temperature_c: Option<f64>,
    pub humidity_percent: Option<f64>,
    pub bmp_temperature_c: Option<f64>,
    pub pressure_hpa: Option<f64>,
}

/// A complete, rounded environment reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentReading {
    pub dht_temperature_c: f64,
    pub humidity_percent: f64,
    pub bmp_temperature_c: f64,
    pub pressure_hpa: f64,
    pub button_pressed: bool,
}

impl EnvironmentReading {
    /// Temperatures and humidity to 1 decimal, pressure to 2.
    pub fn from_sample(sample: SensorSample, button_pressed: bool) -> Result<Self, HardwareError> {
        let (Some(dht_t), Some(humidity), Some(bmp_t), Some(pressure)) = (
            sample.dht_temperature_c,
            sample.humidity_percent,
            sample.bmp_temperature_c,
            sample.pressure_hpa,
        ) else {
            return Err(HardwareError::SensorUnavailable);
        };

        Ok(Self {
            dht_temperature_c: round_to(dht_t, 1),
            humidity_percent: round_to(humidity, 1),
            bmp_temperature_c: round_to(bmp_t, 1),
            pressure_hpa: round_to(pressure, 2),
            button_pressed,
        })
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Temperature, humidity and pressure sensors.
pub trait SensorBackend: Send + Sync {
    fn sample(&self) -> Result<SensorSample, HardwareError>;
}

/// The LED actuators.
pub trait ActuatorBackend: Send + Sync {
    fn set(&self, color: LedColor, on: bool) -> Result<(), HardwareError>;

    fn is_lit(&self, color: LedColor) -> bool;
}

/// The physical push button, sampled as a level.
pub trait ButtonSignal: Send + Sync {
    fn is_pressed(&self) -> bool;
}

/// The hardware context: sensors, LEDs and button, constructed once.
#[derive(Clone)]
pub struct Board {
    sensors: Arc<dyn SensorBackend>,
    leds: Arc<dyn ActuatorBackend>,
    button: Arc<dyn ButtonSignal>,
}

impl Board {
    pub fn new(
        sensors: Arc<dyn SensorBackend>,
        leds: Arc<dyn ActuatorBackend>,
        button: Arc<dyn ButtonSignal>,
    ) -> Self {
        Self {
            sensors,
            leds,
            button,
        }
    }

    /// Read all sensors plus the button level.
    ///
    /// Any missing value fails the whole reading with `SensorUnavailable`.
    pub fn read_environment(&self) -> Result<EnvironmentReading, HardwareError> {
        let reading = self
            .sensors
            .sample()
            .and_then(|sample| EnvironmentReading::from_sample(sample, self.button.is_pressed()));
        if let Err(e) = &reading {
            warn!(error = %e, "Sensor read failed");
        }
        reading
    }

    /// Switch one LED and return the confirmation line.
    pub fn set_led(&self, color: LedColor, state: LedState) -> Result<String, HardwareError> {
        self.leds.set(color, state.is_on())?;
        Ok(format!(
            "LED {} turned {} successfully.",
            color.as_str().to_ascii_uppercase(),
            state
        ))
    }

    /// String-typed variant of [`Board::set_led`]. The color is validated
    /// before the state; nothing changes when either is rejected.
    pub fn set_actuator(&self, color: &str, state: &str) -> Result<String, HardwareError> {
        let color: LedColor = color.parse()?;
        let state: LedState = state.parse()?;
        self.set_led(color, state)
    }

    pub fn led_status(&self) -> LedStatus {
        LedStatus {
            red_led_status: LedState::from_lit(self.leds.is_lit(LedColor::Red)),
            yellow_led_status: LedState::from_lit(self.leds.is_lit(LedColor::Yellow)),
            green_led_status: LedState::from_lit(self.leds.is_lit(LedColor::Green)),
        }
    }

    pub fn button_pressed(&self) -> bool {
        self.button.is_pressed()
    }

    /// Shared handle on the button, for the scheduler's poll loop.
    pub fn button(&self) -> Arc<dyn ButtonSignal> {
        Arc::clone(&self.button)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("leds", &self.led_status())
            .field("button_pressed", &self.button_pressed())
            .finish()
    }
}
