use std::error::Error;

use attractor_app::{AppConfig, viewer};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => {
            info!(path = %path.to_string_lossy(), "loading configuration");
            AppConfig::load(path)?
        }
        None => AppConfig::default(),
    };

    viewer::run(config)?;
    Ok(())
}
