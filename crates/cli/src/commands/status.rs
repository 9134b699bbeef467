//! `climactl status`: Show configuration, sensor readings and LED states.

use std::path::Path;

use climactl_agent::StatusReport;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;

    println!("climactl Status");
    println!("===============");
    println!("  Config file:  {}", super::config_path(config_path).display());
    println!("  Backend:      {}", config.slm.base_url);
    println!("  Model:        {}", config.slm.model_name);
    println!("  History cap:  {} messages", config.slm.max_history_length);
    println!("  Poll period:  {} s", config.system.check_interval_s);
    println!("  Hardware:     {:?}", config.hardware.backend);

    let board = climactl_hardware::build_from_config(&config.hardware)
        .map_err(|e| format!("Failed to initialise hardware: {e}"))?;
    print!("{}", StatusReport::capture(&board, None));

    Ok(())
}
