use chrono::NaiveDate;

use crate::recurrence::Recurrence;

/// Stable identifier of the user a reminder belongs to.
pub type OwnerId = i64;

/// A reminder as the store holds it.
///
/// Records start as a draft carrying only the text and are filled in
/// field by field (date, hour, minute, recurrence) by the dialog layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderRecord {
    pub text: String,
    pub date: Option<NaiveDate>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    pub recurrence: Recurrence,
}

impl ReminderRecord {
    pub fn draft(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            date: None,
            hour: None,
            minute: None,
            recurrence: Recurrence::None,
        }
    }

    /// The schedulable shape of this record, if date, hour and minute are all
    /// present. Scheduling only ever consumes `CompleteReminder`, so the
    /// draft/complete distinction is decided here and nowhere else.
    pub fn completed(&self) -> Option<CompleteReminder> {
        Some(CompleteReminder {
            text: self.text.clone(),
            date: self.date?,
            hour: self.hour?,
            minute: self.minute?,
            recurrence: self.recurrence,
        })
    }
}

/// A reminder with every field required for scheduling present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteReminder {
    pub text: String,
    pub date: NaiveDate,
    pub hour: u32,
    pub minute: u32,
    pub recurrence: Recurrence,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_draft_is_not_schedulable() {
        assert_eq!(ReminderRecord::draft("water the plants").completed(), None);
    }

    #[test]
    fn record_completes_once_date_hour_and_minute_are_set() {
        let mut record = ReminderRecord::draft("water the plants");
        record.date = Some(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(record.completed(), None);
        record.hour = Some(18);
        assert_eq!(record.completed(), None);
        record.minute = Some(30);

        let complete = record.completed().unwrap();
        assert_eq!(complete.text, "water the plants");
        assert_eq!(complete.hour, 18);
        assert_eq!(complete.recurrence, Recurrence::None);
    }
}
