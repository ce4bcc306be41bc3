//! Conversions between user-local civil time and absolute instants.
//!
//! A reminder's date and time are wall-clock values in the owner's selected
//! timezone; everything downstream of the store works in UTC instants.

use chrono::offset::LocalResult;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CivilTimeError {
    #[error("unknown timezone name: {0}")]
    InvalidTimeZone(String),

    #[error("invalid civil time {hour:02}:{minute:02} on {date}")]
    InvalidCivilTime {
        date: NaiveDate,
        hour: u32,
        minute: u32,
    },
}

/// Interprets `(date, hour, minute)` as wall-clock time in the named zone and
/// returns the corresponding instant.
///
/// An ambiguous local time (clocks rolled back) resolves to the earlier
/// instant; a nonexistent one (clocks jumped forward) is an error.
pub fn to_absolute(
    date: NaiveDate,
    hour: u32,
    minute: u32,
    tz_name: &str,
) -> Result<DateTime<Utc>, CivilTimeError> {
    let tz = parse_zone(tz_name)?;
    let invalid = || CivilTimeError::InvalidCivilTime { date, hour, minute };
    let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)?;

    match tz.from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(local) => Ok(local.with_timezone(&Utc)),
        LocalResult::Ambiguous(earlier, _) => Ok(earlier.with_timezone(&Utc)),
        LocalResult::None => Err(invalid()),
    }
}

/// Projects an instant back into civil time in the named zone, for display.
pub fn to_local(
    instant: DateTime<Utc>,
    tz_name: &str,
) -> Result<(NaiveDate, u32, u32), CivilTimeError> {
    let local = instant.with_timezone(&parse_zone(tz_name)?);
    Ok((local.date_naive(), local.hour(), local.minute()))
}

fn parse_zone(tz_name: &str) -> Result<Tz, CivilTimeError> {
    tz_name
        .parse()
        .map_err(|_| CivilTimeError::InvalidTimeZone(tz_name.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use proptest_arbitrary_interop::arb;

    #[test]
    fn moscow_morning_maps_to_utc_minus_three_hours() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let instant = to_absolute(date, 9, 0, "Europe/Moscow").unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2025, 1, 1, 6, 0, 0).unwrap());
    }

    #[test]
    fn unknown_zone_is_rejected() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let result = to_absolute(date, 9, 0, "Mars/Olympus_Mons");
        assert_eq!(
            result,
            Err(CivilTimeError::InvalidTimeZone(
                "Mars/Olympus_Mons".to_owned()
            ))
        );
    }

    #[test]
    fn out_of_range_hour_is_rejected() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let result = to_absolute(date, 24, 0, "Europe/Moscow");
        assert_eq!(
            result,
            Err(CivilTimeError::InvalidCivilTime {
                date,
                hour: 24,
                minute: 0
            })
        );
    }

    #[test]
    fn out_of_range_minute_is_rejected() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(to_absolute(date, 9, 60, "Europe/Moscow").is_err());
    }

    #[test]
    fn nonexistent_local_time_is_rejected() {
        // US DST spring-forward: 02:30 did not exist on this date in New York.
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert!(to_absolute(date, 2, 30, "America/New_York").is_err());
    }

    fn zone_strategy() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec![
            "Europe/Kaliningrad",
            "Europe/Moscow",
            "Asia/Yekaterinburg",
            "Asia/Vladivostok",
            "Asia/Kamchatka",
            "America/New_York",
            "UTC",
        ])
    }

    fn date_strategy() -> impl Strategy<Value = NaiveDate> {
        (2000i32..2100, 1u32..=12, 1u32..=28)
            .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    proptest! {
        #[test]
        fn civil_round_trip(
            date in date_strategy(),
            time in arb::<NaiveTime>(),
            zone in zone_strategy()
        ) {
            let (hour, minute) = (time.hour(), time.minute());
            let converted = to_absolute(date, hour, minute, zone);
            // Times swallowed by a DST gap have no instant to round-trip through.
            prop_assume!(converted.is_ok());

            let round_tripped = to_local(converted.unwrap(), zone).unwrap();
            prop_assert_eq!(round_tripped, (date, hour, minute));
        }
    }
}
