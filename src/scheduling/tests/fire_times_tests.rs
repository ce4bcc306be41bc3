use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use crate::recurrence::Recurrence;
use crate::scheduling::scheduler::resolve_fire_times;
use crate::scheduling::{FOLLOW_UP_DELAY, LATE_FIRE_GRACE};

fn follow_up_delay() -> Duration {
    Duration::from_std(FOLLOW_UP_DELAY).unwrap()
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
}

#[test]
fn future_target_is_kept_as_is() {
    let target = now() + Duration::hours(2);
    let (primary, follow_up) = resolve_fire_times(target, Recurrence::None, now());

    assert_eq!(primary, target);
    assert_eq!(follow_up, target + follow_up_delay());
}

#[test]
fn late_one_off_re_anchors_to_shortly_after_now() {
    let target = now() - Duration::hours(3);
    let (primary, follow_up) = resolve_fire_times(target, Recurrence::None, now());

    assert_eq!(primary, now() + Duration::from_std(LATE_FIRE_GRACE).unwrap());
    assert_eq!(follow_up, primary + follow_up_delay());
}

#[test]
fn daily_overdue_by_one_day_advances_exactly_one_day() {
    let target = now() - Duration::days(1);
    let (primary, _) = resolve_fire_times(target, Recurrence::Daily, now());

    assert_eq!(primary, target + Duration::days(1));
    assert_eq!(primary, now());
}

#[test]
fn long_overdue_recurring_reminder_gets_a_single_advance_only() {
    // Three days late; one daily period forward still lands in the past.
    let target = now() - Duration::days(3);
    let (primary, follow_up) = resolve_fire_times(target, Recurrence::Daily, now());

    assert_eq!(primary, target + Duration::days(1));
    assert!(primary < now());
    assert_eq!(follow_up, primary + follow_up_delay());
}

#[test]
fn overdue_weekly_advances_seven_days() {
    let target = now() - Duration::days(2);
    let (primary, _) = resolve_fire_times(target, Recurrence::Weekly, now());

    assert_eq!(primary, target + Duration::days(7));
}

fn instant_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    // 1970..~2096, safely clear of chrono's arithmetic limits.
    (0i64..4_000_000_000).prop_map(|secs| Utc.timestamp_opt(secs, 0).unwrap())
}

fn recurrence_strategy() -> impl Strategy<Value = Recurrence> {
    prop::sample::select(vec![
        Recurrence::None,
        Recurrence::Daily,
        Recurrence::Weekly,
        Recurrence::Monthly,
        Recurrence::Yearly,
    ])
}

proptest! {
    #[test]
    fn follow_up_is_always_ten_minutes_after_primary(
        target in instant_strategy(),
        now in instant_strategy(),
        recurrence in recurrence_strategy()
    ) {
        let (primary, follow_up) = resolve_fire_times(target, recurrence, now);
        prop_assert_eq!(follow_up - primary, follow_up_delay());
    }

    #[test]
    fn resolution_follows_the_overdue_policy(
        target in instant_strategy(),
        now in instant_strategy(),
        recurrence in recurrence_strategy()
    ) {
        let (primary, _) = resolve_fire_times(target, recurrence, now);

        if target >= now {
            prop_assert_eq!(primary, target);
        } else {
            match recurrence.period() {
                None => {
                    prop_assert!(primary > now);
                    prop_assert!(primary <= now + Duration::from_std(LATE_FIRE_GRACE).unwrap());
                }
                Some(period) => prop_assert_eq!(primary, target + period),
            }
        }
    }
}
