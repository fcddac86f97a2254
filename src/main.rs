use anyhow::Result;

#[cfg(windows)]
fn main() -> Result<()> {
    use maj1428::config::AppConfig;
    use maj1428::host::{RawInputHost, signal};
    use maj1428::logging;

    const CONFIG_PATH: &str = "Config.toml";

    signal::set_control_ctrl_handler()?;

    // Load config or create default if not exists
    let config = AppConfig::load_or_create(CONFIG_PATH)
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    logging::init(&config.log_level)?;
    tracing::info!(config = CONFIG_PATH, device = %config.device_id, "starting");

    RawInputHost::run(&config)
}

#[cfg(not(windows))]
fn main() -> Result<()> {
    anyhow::bail!("the Raw Input host requires Windows")
}
