//! In-memory hardware.
//!
//! Readings are fixed until changed through the handle, so repeated reads
//! are identical. The button is a latch that tests (or a REPL) flip.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use climactl_core::error::HardwareError;
use climactl_core::hardware::{
    ActuatorBackend, Board, ButtonSignal, LedColor, SensorBackend, SensorSample,
};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct SimulatedSensors {
    sample: Mutex<SensorSample>,
}

impl SimulatedSensors {
    pub fn new(sample: SensorSample) -> Self {
        Self {
            sample: Mutex::new(sample),
        }
    }

    /// Drop the humidity reading, as a DHT22 does after a checksum miss.
    pub fn drop_humidity(&self) {
        lock(&self.sample).humidity_percent = None;
    }
}

impl SensorBackend for SimulatedSensors {
    fn sample(&self) -> Result<SensorSample, HardwareError> {
        Ok(*lock(&self.sample))
    }
}

#[derive(Default)]
pub struct SimulatedLeds {
    lit: Mutex<[bool; 3]>,
}

impl ActuatorBackend for SimulatedLeds {
    fn set(&self, color: LedColor, on: bool) -> Result<(), HardwareError> {
        lock(&self.lit)[color.index()] = on;
        Ok(())
    }

    fn is_lit(&self, color: LedColor) -> bool {
        lock(&self.lit)[color.index()]
    }
}

#[derive(Default)]
pub struct SimulatedButton {
    pressed: AtomicBool,
}

impl SimulatedButton {
    pub fn press(&self) {
        self.pressed.store(true, Ordering::SeqCst);
    }

    pub fn release(&self) {
        self.pressed.store(false, Ordering::SeqCst);
    }
}

impl ButtonSignal for SimulatedButton {
    fn is_pressed(&self) -> bool {
        self.pressed.load(Ordering::SeqCst)
    }
}

/// A simulated board plus handles on each part, for tests and demos.
pub struct SimulatedRig {
    pub board: Board,
    pub sensors: Arc<SimulatedSensors>,
    pub leds: Arc<SimulatedLeds>,
    pub button: Arc<SimulatedButton>,
}

impl SimulatedRig {
    pub fn new(sample: SensorSample) -> Self {
        let sensors = Arc::new(SimulatedSensors::new(sample));
        let leds = Arc::new(SimulatedLeds::default());
        let button = Arc::new(SimulatedButton::default());
        let board = Board::new(sensors.clone(), leds.clone(), button.clone());
        Self {
            board,
            sensors,
            leds,
            button,
        }
    }

    /// A rig with a comfortable room's readings.
    pub fn comfortable() -> Self {
        Self::new(SensorSample {
            dht_temperature_c: Some(21.84),
            humidity_percent: Some(45.02),
            bmp_temperature_c: Some(22.13),
            pressure_hpa: Some(1013.257),
        })
    }
}
