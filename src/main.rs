mod app;
mod state;

use crate::state::app_config::{AppConfig, CONFIG_PATH};
use dota_widget_api::client::LiveApi;
use log::error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    better_panic::install();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init()?;

    let config = AppConfig::load_or_default(CONFIG_PATH);
    let api = LiveApi::new();

    if let Err(e) = app::run(&api, &config).await {
        error!("widget update failed: {e}");
        std::process::exit(1);
    }

    Ok(())
}
