use std::path::Path;

use bitsight_core::Settings;

fn show(config_file: &Path) -> anyhow::Result<String> {
    let settings = Settings::load_with_env(config_file)?;
    Ok(serde_json::to_string_pretty(&settings.masked())?)
}

fn set(config_file: &Path, section: &str, key: &str, value: &str) -> anyhow::Result<()> {
    let mut settings = Settings::load(config_file)?;
    settings.apply_edit(section, key, value)?;
    settings.save(config_file)?;
    Ok(())
}

pub fn run_show() -> anyhow::Result<()> {
    let paths = bitsight_telemetry::Paths::new()?;
    println!("{}", show(&paths.config_file())?);
    Ok(())
}

pub fn run_set(section: &str, key: &str, value: &str) -> anyhow::Result<()> {
    let paths = bitsight_telemetry::Paths::new()?;
    set(&paths.config_file(), section, key, value)?;
    println!("Updated {}.{}", section, key);
    Ok(())
}
