use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How often a reminder re-fires after its first delivery.
///
/// Monthly and yearly are fixed 30/365-day offsets, not calendar arithmetic,
/// so the cadence drifts across month boundaries and leap years.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Recurrence {
    pub fn period(self) -> Option<Duration> {
        match self {
            Recurrence::None => None,
            Recurrence::Daily => Some(Duration::days(1)),
            Recurrence::Weekly => Some(Duration::days(7)),
            Recurrence::Monthly => Some(Duration::days(30)),
            Recurrence::Yearly => Some(Duration::days(365)),
        }
    }
}

/// The instant one period after `instant`, or `None` for a one-off reminder.
pub fn next_occurrence(instant: DateTime<Utc>, recurrence: Recurrence) -> Option<DateTime<Utc>> {
    recurrence.period().map(|period| instant + period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn one_off_has_no_next_occurrence() {
        assert_eq!(next_occurrence(instant(), Recurrence::None), None);
    }

    #[test]
    fn daily_advances_one_day() {
        let next = next_occurrence(instant(), Recurrence::Daily).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 1, 2, 9, 0, 0).unwrap());
    }

    #[test]
    fn weekly_advances_seven_days() {
        let next = next_occurrence(instant(), Recurrence::Weekly).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 1, 8, 9, 0, 0).unwrap());
    }

    #[test]
    fn monthly_is_a_fixed_thirty_day_offset() {
        let next = next_occurrence(instant(), Recurrence::Monthly).unwrap();
        // 30 days from Jan 1 lands on Jan 31, not Feb 1.
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 1, 31, 9, 0, 0).unwrap());
    }

    #[test]
    fn yearly_is_a_fixed_365_day_offset() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let next = next_occurrence(start, Recurrence::Yearly).unwrap();
        // 2024 is a leap year, so 365 days falls one short of the anniversary.
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 12, 31, 9, 0, 0).unwrap());
    }
}
