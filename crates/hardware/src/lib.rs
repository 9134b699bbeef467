//! Hardware backends for climactl.
//!
//! - **Simulated**: in-memory sensors, LEDs and button, for development
//!   machines and tests
//! - **Sysfs**: GPIO `value` files for the LEDs and the button, IIO
//!   attributes for the DHT22 (`dht11` driver) and BMP280 sensors
//!
//! [`build_from_config`] assembles the [`Board`] chosen in configuration.

pub mod sim;
pub mod sysfs;

pub use sim::{SimulatedButton, SimulatedLeds, SimulatedRig, SimulatedSensors};
pub use sysfs::{GpioValueButton, IioSensors, SysfsLeds};

use std::sync::Arc;

use climactl_config::{HardwareBackend, HardwareConfig};
use climactl_core::error::HardwareError;
use climactl_core::hardware::{Board, ButtonSignal, SensorSample};
use tracing::info;

/// Build the board described by the `[hardware]` configuration section.
///
/// Fails when a sysfs path is missing; the caller treats that as fatal.
pub fn build_from_config(config: &HardwareConfig) -> Result<Board, HardwareError> {
    match config.backend {
        HardwareBackend::Simulated => {
            let sim = &config.simulated;
            let sensors = SimulatedSensors::new(SensorSample {
                dht_temperature_c: Some(sim.dht_temperature_c),
                humidity_percent: Some(sim.humidity_percent),
                bmp_temperature_c: Some(sim.bmp_temperature_c),
                pressure_hpa: Some(sim.pressure_hpa),
            });
            let button: Arc<dyn ButtonSignal> = match &sim.button_value_file {
                Some(path) => Arc::new(GpioValueButton::new(path, false)?),
                None => Arc::new(SimulatedButton::default()),
            };
            info!(button_file = ?sim.button_value_file, "Using simulated hardware");
            Ok(Board::new(
                Arc::new(sensors),
                Arc::new(SimulatedLeds::default()),
                button,
            ))
        }
        HardwareBackend::Sysfs => {
            let sensors = IioSensors::new(&config.dht_iio_device, &config.bmp280_iio_device)?;
            let leds = SysfsLeds::new(
                &config.gpio_root,
                [config.led_red_pin, config.led_yellow_pin, config.led_green_pin],
            )?;
            let button = GpioValueButton::new(
                sysfs::gpio_value_path(&config.gpio_root, config.button_pin),
                config.button_active_low,
            )?;
            info!(
                gpio_root = %config.gpio_root.display(),
                button_pin = config.button_pin,
                "Using sysfs hardware"
            );
            Ok(Board::new(Arc::new(sensors), Arc::new(leds), Arc::new(button)))
        }
    }
}
