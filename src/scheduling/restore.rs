use std::sync::Arc;

use crate::storage::ReminderStore;

use super::scheduler::ReminderScheduler;

/// Rebuilds every timer pair from the persisted store, replaying the same
/// fire-time decisions used for freshly created reminders: a reminder whose
/// time elapsed while the process was down goes through the ordinary overdue
/// path. Incomplete drafts are skipped. Returns the number scheduled.
pub async fn restore_all(store: &Arc<ReminderStore>, scheduler: &ReminderScheduler) -> usize {
    let mut restored = 0;
    for owner in store.owners().await {
        for (index, record) in store.list(owner).await.iter().enumerate() {
            let Some(complete) = record.completed() else {
                log::warn!("Skipping incomplete reminder. [owner = {owner}, index = {index}]");
                continue;
            };

            match scheduler.schedule(owner, index, &complete).await {
                Ok(pair) => {
                    restored += 1;
                    log::info!(
                        "Restored reminder. [owner = {owner}, index = {index}, primary = {}]",
                        pair.primary_fire_at
                    );
                }
                Err(error) => {
                    log::error!(
                        "Could not restore reminder. [owner = {owner}, index = {index}]: {error}"
                    );
                }
            }
        }
    }
    restored
}
