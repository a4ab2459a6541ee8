use std::sync::Arc;

use surge::SurgeError;
use surge::config::fetch_config;
use surge::logging::init_tracing;
use surge::notify::TelegramBot;
use surge::screener::{Consumer, ConsumerOptions};
use surge::settings::{Settings, watch_settings_file};
use surge::websocket::KrakenProducer;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), SurgeError> {
    init_tracing();

    let app_config = fetch_config()?;

    let settings_path = app_config.screener.settings_path.clone();
    let settings = Settings::load_or_default(&settings_path)?;
    if !settings.is_ready() {
        info!(
            path = %settings_path.display(),
            "No chat id or bot token configured yet, alerts are paused"
        );
    }

    let (producer, connection) = KrakenProducer::new(&app_config.kraken);
    let feed_task = tokio::spawn(connection.run());

    let bot = TelegramBot::new(&app_config.telegram.api_url)?;

    let consumer = Consumer::new(
        Arc::new(producer),
        Arc::new(bot),
        settings,
        ConsumerOptions::from(&app_config.screener),
    );
    let handle = consumer.handle();

    let watcher_handle = handle.clone();
    let watcher_task = tokio::spawn(watch_settings_file(
        settings_path,
        app_config.screener.settings_reload,
        move |settings| watcher_handle.update_settings(settings),
    ));

    let consumer_task = tokio::spawn(consumer.start());

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");

    handle.stop().await;
    watcher_task.abort();
    feed_task.abort();

    match consumer_task.await {
        Ok(Ok(())) => info!("Screener shut down cleanly"),
        Ok(Err(e)) => error!("Consumer ended with error: {e}"),
        Err(e) => error!("Consumer task failed: {e}"),
    }

    Ok(())
}
