//! Core engine of the nudge reminder bot: reminder records and their store,
//! civil-time conversion, recurrence arithmetic, and the timer scheduler.
//! The conversational dialog layer drives this API; delivery goes through
//! the [`scheduling::DeliveryChannel`] seam.

pub mod appsettings;
pub mod civil;
pub mod recurrence;
pub mod reminder;
pub mod scheduling;
pub mod storage;
pub mod telegram;
