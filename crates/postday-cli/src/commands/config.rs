use anyhow::Result;
use postday_core::config::AppConfig;
use postday_infrastructure::ConfigLoader;

pub fn show(config: &AppConfig) -> Result<()> {
    print!("{}", redacted(config).to_toml_string()?);
    Ok(())
}

pub fn init(loader: &ConfigLoader) -> Result<()> {
    if loader.path().exists() {
        println!("Config already exists at {}", loader.path().display());
        return Ok(());
    }
    loader.save(&AppConfig::default())?;
    println!("Wrote default config to {}", loader.path().display());
    Ok(())
}

fn redacted(config: &AppConfig) -> AppConfig {
    let mut config = config.clone();
    if config.remote.access_token.is_some() {
        config.remote.access_token = Some("***".to_string());
    }
    if config.remote.api_key.is_some() {
        config.remote.api_key = Some("***".to_string());
    }
    config
}
