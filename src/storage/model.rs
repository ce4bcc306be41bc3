//! On-disk shapes of the two snapshot files.
//!
//! The reminder file maps string-encoded owner ids to ordered record lists;
//! the timezone file maps integer-encoded owner ids to IANA zone names.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::recurrence::Recurrence;
use crate::reminder::{OwnerId, ReminderRecord};

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct StoredReminder {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minute: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
}

pub(super) type StoredReminderMap = HashMap<String, Vec<StoredReminder>>;
pub(super) type StoredTimezoneMap = HashMap<OwnerId, String>;

impl From<&ReminderRecord> for StoredReminder {
    fn from(record: &ReminderRecord) -> Self {
        Self {
            text: record.text.clone(),
            date: record.date,
            hour: record.hour,
            minute: record.minute,
            recurrence: match record.recurrence {
                Recurrence::None => None,
                repeating => Some(repeating),
            },
        }
    }
}

impl From<StoredReminder> for ReminderRecord {
    fn from(stored: StoredReminder) -> Self {
        Self {
            text: stored.text,
            date: stored.date,
            hour: stored.hour,
            minute: stored.minute,
            recurrence: stored.recurrence.unwrap_or_default(),
        }
    }
}
