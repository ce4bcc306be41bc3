use std::sync::Arc;

use nudge::appsettings::AppSettings;
use nudge::scheduling::{self, ReminderScheduler};
use nudge::storage::ReminderStore;
use nudge::telegram::TelegramDeliveryChannel;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let settings = AppSettings::load()?;
    log::info!(
        "Loaded settings. [default_timezone = {}, timezone_labels = {}]",
        settings.default_timezone,
        settings.timezones.len()
    );

    let store = Arc::new(ReminderStore::open(
        &settings.storage.reminders_file,
        &settings.storage.timezones_file,
        settings.default_timezone.clone(),
    ));
    let delivery = Arc::new(TelegramDeliveryChannel::new(settings.telegram.token.clone()));
    let scheduler = ReminderScheduler::new(Arc::clone(&store), delivery);

    let restored = scheduling::restore_all(&store, &scheduler).await;
    log::info!("Restore pass finished. [reminders = {restored}]");

    tokio::signal::ctrl_c().await?;
    log::info!("Shutting down");
    Ok(())
}
