//! Post-turn status report: sensors, LEDs and model timing.

use std::fmt;

use climactl_core::error::HardwareError;
use climactl_core::hardware::{Board, EnvironmentReading, LedColor, LedStatus};
use climactl_core::provider::Timings;

const RULE: &str = "============================================================";

/// A snapshot of the board plus, after a turn, the model's timing counters.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub environment: Result<EnvironmentReading, HardwareError>,
    pub leds: LedStatus,
    pub timings: Option<Timings>,
}

impl StatusReport {
    /// Take a fresh reading of the board. Reads only; nothing is switched.
    pub fn capture(board: &Board, timings: Option<Timings>) -> Self {
        Self {
            environment: board.read_environment(),
            leds: board.led_status(),
            timings,
        }
    }
}

fn or_na(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "SYSTEM STATUS & SENSOR DATA")?;
        writeln!(f, "{RULE}")?;

        match &self.environment {
            Ok(r) => {
                writeln!(f, "DHT22: {:.1}°C / {:.1}%", r.dht_temperature_c, r.humidity_percent)?;
                writeln!(f, "BMP280: {:.1}°C / {:.2}hPa", r.bmp_temperature_c, r.pressure_hpa)?;
                writeln!(
                    f,
                    "Button: {}",
                    if r.button_pressed { "PRESSED" } else { "NOT PRESSED" }
                )?;
            }
            Err(e) => writeln!(f, "Error reading sensors: {e}")?,
        }

        writeln!(f)?;
        writeln!(f, "LED Status:")?;
        for color in LedColor::ALL {
            let label = format!("{} LED:", capitalize(color.as_str()));
            writeln!(
                f,
                "  {label:<11} {}",
                self.leds.get(color).as_str().to_ascii_uppercase()
            )?;
        }
        writeln!(f, "{RULE}")?;

        if let Some(timings) = &self.timings {
            writeln!(f)?;
            writeln!(f, "--- SLM Metrics ---")?;
            writeln!(f, "Total Duration: {} seconds", or_na(timings.total_seconds()))?;
            writeln!(f, "Eval Rate: {} tokens/s", or_na(timings.eval_rate()))?;
        }
        Ok(())
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
