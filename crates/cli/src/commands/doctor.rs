//! `climactl doctor`: Diagnose system health.

use std::path::Path;

use climactl_config::AppConfig;
use climactl_core::provider::Provider;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("climactl Doctor — System Diagnostics");
    println!("====================================\n");

    let mut issues = 0;

    // Config
    let path = super::config_path(config_path);
    if !path.exists() {
        println!("  ⚠️  No config file at {} — using defaults (run `climactl onboard`)", path.display());
        issues += 1;
    }
    let config = match AppConfig::load(config_path) {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            println!("\n  ⚠️  Cannot continue without a valid configuration.");
            return Ok(());
        }
    };

    // Model backend
    match climactl_providers::build_from_config(&config) {
        Ok(provider) => match provider.health_check().await {
            Ok(true) => {
                println!("  ✅ Ollama reachable at {}", config.slm.base_url);
                match provider.list_models().await {
                    Ok(models) if models.iter().any(|m| m == &config.slm.model_name) => {
                        println!("  ✅ Model {} is available", config.slm.model_name);
                    }
                    Ok(_) => {
                        println!(
                            "  ❌ Model {} not found — run `ollama pull {}`",
                            config.slm.model_name, config.slm.model_name
                        );
                        issues += 1;
                    }
                    Err(e) => {
                        println!("  ❌ Could not list models: {e}");
                        issues += 1;
                    }
                }
            }
            Ok(false) | Err(_) => {
                println!("  ❌ Ollama not reachable at {}", config.slm.base_url);
                issues += 1;
            }
        },
        Err(e) => {
            println!("  ❌ Cannot create model backend: {e}");
            issues += 1;
        }
    }

    // Hardware
    match climactl_hardware::build_from_config(&config.hardware) {
        Ok(board) => {
            println!("  ✅ Hardware backend ready ({:?})", config.hardware.backend);
            match board.read_environment() {
                Ok(_) => println!("  ✅ Sensors responding"),
                Err(e) => {
                    println!("  ⚠️  Sensor read failed: {e}");
                    issues += 1;
                }
            }
        }
        Err(e) => {
            println!("  ❌ Hardware unavailable: {e}");
            issues += 1;
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
