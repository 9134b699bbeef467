//! Linux sysfs backends.
//!
//! LEDs and the button are exported GPIO lines (`<gpio_root>/gpioN/value`,
//! direction already configured by the system). The DHT22 and BMP280 are
//! read through their kernel IIO drivers:
//!
//! | attribute | unit |
//! |---|---|
//! | `in_temp_input` | milli °C |
//! | `in_humidityrelative_input` | milli %RH |
//! | `in_pressure_input` | kPa |
//!
//! The DHT22 regularly fails a read with `EIO`; such a value is reported as
//! missing rather than as an error.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use climactl_core::error::HardwareError;
use climactl_core::hardware::{
    ActuatorBackend, ButtonSignal, LedColor, SensorBackend, SensorSample,
};
use tracing::{debug, warn};

pub fn gpio_value_path(gpio_root: &Path, pin: u32) -> PathBuf {
    gpio_root.join(format!("gpio{pin}")).join("value")
}

fn io_error(path: &Path, e: std::io::Error) -> HardwareError {
    HardwareError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

fn read_attr(path: &Path) -> Result<String, HardwareError> {
    std::fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|e| io_error(path, e))
}

fn require_exists(path: &Path) -> Result<(), HardwareError> {
    if path.exists() {
        Ok(())
    } else {
        Err(HardwareError::NotConfigured(format!(
            "{} does not exist",
            path.display()
        )))
    }
}

fn parse_level(raw: &str) -> Option<bool> {
    match raw {
        "1" => Some(true),
        "0" => Some(false),
        _ => None,
    }
}

/// A push button read from a GPIO `value` file.
pub struct GpioValueButton {
    path: PathBuf,
    active_low: bool,
    failing: AtomicBool,
}

impl GpioValueButton {
    pub fn new(path: impl Into<PathBuf>, active_low: bool) -> Result<Self, HardwareError> {
        let path = path.into();
        require_exists(&path)?;
        Ok(Self {
            path,
            active_low,
            failing: AtomicBool::new(false),
        })
    }
}

impl ButtonSignal for GpioValueButton {
    /// An unreadable line counts as released; the failure is logged once
    /// until the line becomes readable again.
    fn is_pressed(&self) -> bool {
        let level = read_attr(&self.path).and_then(|raw| {
            parse_level(&raw).ok_or_else(|| HardwareError::Io {
                path: self.path.display().to_string(),
                reason: format!("unexpected GPIO level '{raw}'"),
            })
        });

        match level {
            Ok(high) => {
                if self.failing.swap(false, Ordering::Relaxed) {
                    debug!(path = %self.path.display(), "Button line readable again");
                }
                high != self.active_low
            }
            Err(e) => {
                if !self.failing.swap(true, Ordering::Relaxed) {
                    warn!(error = %e, "Button read failed, treating as released");
                }
                false
            }
        }
    }
}

/// The three LEDs on GPIO output lines.
pub struct SysfsLeds {
    paths: [PathBuf; 3],
    lit: Mutex<[bool; 3]>,
}

impl SysfsLeds {
    /// `pins` is ordered red, yellow, green. Current line levels are read
    /// so the reported state matches the hardware from the start.
    pub fn new(gpio_root: &Path, pins: [u32; 3]) -> Result<Self, HardwareError> {
        let paths = pins.map(|pin| gpio_value_path(gpio_root, pin));
        let mut lit = [false; 3];
        for (i, path) in paths.iter().enumerate() {
            require_exists(path)?;
            lit[i] = parse_level(&read_attr(path)?).unwrap_or(false);
        }
        Ok(Self {
            paths,
            lit: Mutex::new(lit),
        })
    }

    fn lit(&self) -> MutexGuard<'_, [bool; 3]> {
        self.lit.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ActuatorBackend for SysfsLeds {
    fn set(&self, color: LedColor, on: bool) -> Result<(), HardwareError> {
        let path = &self.paths[color.index()];
        std::fs::write(path, if on { "1" } else { "0" }).map_err(|e| io_error(path, e))?;
        self.lit()[color.index()] = on;
        Ok(())
    }

    fn is_lit(&self, color: LedColor) -> bool {
        self.lit()[color.index()]
    }
}

/// DHT22 + BMP280 through IIO.
pub struct IioSensors {
    dht_dir: PathBuf,
    bmp_dir: PathBuf,
}

impl IioSensors {
    pub fn new(dht_dir: &Path, bmp_dir: &Path) -> Result<Self, HardwareError> {
        require_exists(dht_dir)?;
        require_exists(bmp_dir)?;
        Ok(Self {
            dht_dir: dht_dir.to_path_buf(),
            bmp_dir: bmp_dir.to_path_buf(),
        })
    }

    fn read_scaled(dir: &Path, attr: &str, scale: f64) -> Option<f64> {
        let path = dir.join(attr);
        match read_attr(&path).map(|raw| raw.parse::<f64>()) {
            Ok(Ok(value)) => Some(value * scale),
            Ok(Err(e)) => {
                debug!(path = %path.display(), error = %e, "Unparseable IIO value");
                None
            }
            Err(e) => {
                debug!(error = %e, "IIO read failed");
                None
            }
        }
    }
}

impl SensorBackend for IioSensors {
    fn sample(&self) -> Result<SensorSample, HardwareError> {
        Ok(SensorSample {
            dht_temperature_c: Self::read_scaled(&self.dht_dir, "in_temp_input", 1e-3),
            humidity_percent: Self::read_scaled(&self.dht_dir, "in_humidityrelative_input", 1e-3),
            bmp_temperature_c: Self::read_scaled(&self.bmp_dir, "in_temp_input", 1e-3),
            pressure_hpa: Self::read_scaled(&self.bmp_dir, "in_pressure_input", 10.0),
        })
    }
}
