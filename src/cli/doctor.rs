use crate::domain::CommandRunner;
use crate::infra::{SystemRunner, config::CONFIG_FILE_NAME, soda};
use crate::services::REQUIRED_TOOLS;
use anyhow::Result;
use std::path::Path;

pub fn run(config_dir: &Path) -> Result<()> {
    println!("🔍 Checking tools and configuration...");
    let runner = SystemRunner::new();

    for tool in REQUIRED_TOOLS {
        if runner.is_available(tool) {
            println!("✅ {tool} available");
        } else {
            println!("❌ {tool} not found in PATH (required)");
        }
    }

    if runner.is_available(soda::PROGRAM) {
        println!("✅ {} available", soda::PROGRAM);
    } else {
        println!(
            "⚠️  {} not found in PATH (Windows containers disabled)",
            soda::PROGRAM
        );
    }

    let settings_file = config_dir.join(CONFIG_FILE_NAME);
    if settings_file.exists() {
        println!("✅ Settings: {:?}", settings_file);
    } else {
        println!(
            "⚠️  No settings at {:?} (created with defaults on first use)",
            settings_file
        );
    }

    Ok(())
}
