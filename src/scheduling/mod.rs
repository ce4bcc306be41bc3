mod delivery;
mod restore;
mod scheduler;

pub use delivery::DeliveryChannel;
pub use restore::restore_all;
pub use scheduler::{FOLLOW_UP_DELAY, LATE_FIRE_GRACE, ReminderScheduler, TimerPair};
