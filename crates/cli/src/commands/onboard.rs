//! `climactl onboard`: First-time setup.

use std::path::Path;

use climactl_config::AppConfig;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let path = super::config_path(config_path);

    println!("climactl — First-Time Setup");
    println!("===========================\n");

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)?;
            println!("✅ Created config directory: {}", dir.display());
        }
    }

    if path.exists() {
        println!("⚠️  Config already exists at: {}", path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
        return Ok(());
    }

    std::fs::write(&path, AppConfig::default_toml())?;
    println!("✅ Created config at: {}", path.display());
    println!("\n📝 Next steps:");
    println!("   1. Pull the model:        ollama pull {}", AppConfig::default().slm.model_name);
    println!("   2. On a Raspberry Pi, set [hardware] backend = \"sysfs\" and the pin numbers");
    println!("   3. Check everything:      climactl doctor");
    println!("   4. Start the loop:        climactl run");

    Ok(())
}
