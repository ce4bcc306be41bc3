mod model;
mod reminder_store;

pub use reminder_store::{ReminderStore, StoreError};
