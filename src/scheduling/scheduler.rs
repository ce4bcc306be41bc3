use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::civil::{self, CivilTimeError};
use crate::recurrence::{Recurrence, next_occurrence};
use crate::reminder::{CompleteReminder, OwnerId};
use crate::storage::ReminderStore;

use super::delivery::DeliveryChannel;

/// Gap between the primary delivery and the follow-up nudge.
pub const FOLLOW_UP_DELAY: StdDuration = StdDuration::from_secs(10 * 60);

/// How soon a one-off reminder fires when its target is already in the past.
pub const LATE_FIRE_GRACE: StdDuration = StdDuration::from_secs(10);

/// The two deadlines armed for one reminder. The follow-up is always derived
/// from the primary, never set independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerPair {
    pub primary_fire_at: DateTime<Utc>,
    pub follow_up_fire_at: DateTime<Utc>,
    pub recurrence: Recurrence,
}

/// Identifier a timer pair carries through logs, derived from the owner and
/// the creation timestamp, with a sequence suffix against same-microsecond
/// mints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerTag(String);

impl TimerTag {
    fn mint(owner: OwnerId, seq: &AtomicU64) -> Self {
        let stamp = Utc::now().timestamp_micros();
        let seq = seq.fetch_add(1, Ordering::Relaxed);
        Self(format!("reminder-{owner}-{stamp}-{seq}"))
    }
}

impl fmt::Display for TimerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

struct PairState {
    tag: TimerTag,
    pair: TimerPair,
}

struct ScheduledPair {
    state: Arc<Mutex<PairState>>,
    token: CancellationToken,
}

type PairRegistry = RwLock<HashMap<OwnerId, BTreeMap<usize, ScheduledPair>>>;

/// Owns every in-memory timer pair and decides fire times.
///
/// Each scheduled reminder gets two tokio tasks (primary and follow-up)
/// sharing one cancellation token. The registry keys pairs by
/// `(owner, index)`, mirroring the store's positional lists.
pub struct ReminderScheduler {
    store: Arc<ReminderStore>,
    delivery: Arc<dyn DeliveryChannel>,
    pairs: Arc<PairRegistry>,
    tag_seq: Arc<AtomicU64>,
}

impl ReminderScheduler {
    pub fn new(store: Arc<ReminderStore>, delivery: Arc<dyn DeliveryChannel>) -> Self {
        Self {
            store,
            delivery,
            pairs: Arc::new(RwLock::new(HashMap::new())),
            tag_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Computes fire times for `record` in the owner's timezone and arms both
    /// timers. Conversion failures abort the attempt with nothing registered.
    pub async fn schedule(
        &self,
        owner: OwnerId,
        index: usize,
        record: &CompleteReminder,
    ) -> Result<TimerPair, CivilTimeError> {
        let tz = self.store.timezone(owner).await;
        let target = civil::to_absolute(record.date, record.hour, record.minute, &tz)?;
        let (primary_at, follow_up_at) = resolve_fire_times(target, record.recurrence, Utc::now());
        let pair = TimerPair {
            primary_fire_at: primary_at,
            follow_up_fire_at: follow_up_at,
            recurrence: record.recurrence,
        };

        let token = CancellationToken::new();
        let tag = TimerTag::mint(owner, &self.tag_seq);
        let state = Arc::new(Mutex::new(PairState {
            tag: tag.clone(),
            pair: pair.clone(),
        }));

        // Register before arming so an already-due timer finds its slot.
        {
            let mut pairs = self.pairs.write().await;
            let owner_pairs = pairs.entry(owner).or_default();
            let scheduled = ScheduledPair {
                state: Arc::clone(&state),
                token: token.clone(),
            };
            if let Some(previous) = owner_pairs.insert(index, scheduled) {
                // At most one active pair per record.
                previous.token.cancel();
                log::warn!("Replaced an already armed pair. [owner = {owner}, index = {index}]");
            }
        }

        let ctx = FireContext {
            owner,
            text: record.text.clone(),
            recurrence: record.recurrence,
            store: Arc::clone(&self.store),
            delivery: Arc::clone(&self.delivery),
            pairs: Arc::clone(&self.pairs),
            state,
            token,
            tag_seq: Arc::clone(&self.tag_seq),
        };
        tokio::spawn(primary_timer(ctx.clone(), primary_at));
        spawn_follow_up(ctx, follow_up_at);

        log::info!(
            "Scheduled reminder. [owner = {owner}, index = {index}, tag = {tag}, primary = {primary_at}, follow_up = {follow_up_at}]"
        );
        Ok(pair)
    }

    /// Cancels both timers for the reminder at `index` and drops the entry.
    /// A no-op when nothing is armed there. Call together with
    /// `ReminderStore::remove`; once this returns, neither timer delivers.
    pub async fn cancel(&self, owner: OwnerId, index: usize) {
        let mut pairs = self.pairs.write().await;
        let Some(owner_pairs) = pairs.get_mut(&owner) else {
            return;
        };

        match owner_pairs.remove(&index) {
            Some(pair) => {
                pair.token.cancel();
                log::info!("Cancelled reminder timers. [owner = {owner}, index = {index}]");
            }
            None => {
                log::debug!("Nothing armed at removed slot. [owner = {owner}, index = {index}]");
            }
        }

        // Later slots keep following the store's list, which shifted down.
        let shifted: Vec<_> = owner_pairs
            .split_off(&(index + 1))
            .into_iter()
            .map(|(slot, pair)| (slot - 1, pair))
            .collect();
        owner_pairs.extend(shifted);
    }

    /// The currently armed fire times for the reminder at `index`, if any.
    pub async fn pair(&self, owner: OwnerId, index: usize) -> Option<TimerPair> {
        let pairs = self.pairs.read().await;
        let scheduled = pairs.get(&owner)?.get(&index)?;
        let state = scheduled.state.lock().expect("pair state lock poisoned");
        Some(state.pair.clone())
    }
}

/// Applies the overdue policy to a target instant and derives the follow-up.
///
/// A late one-off re-anchors to shortly after `now` instead of being
/// dropped. A late recurring reminder advances by exactly one period, which
/// may still be in the past for long-overdue reminders; such a deadline
/// elapses immediately.
pub(crate) fn resolve_fire_times(
    target: DateTime<Utc>,
    recurrence: Recurrence,
    now: DateTime<Utc>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let primary = if target < now {
        match next_occurrence(target, recurrence) {
            None => now + chrono_interval(LATE_FIRE_GRACE),
            Some(advanced) => advanced,
        }
    } else {
        target
    };

    (primary, primary + chrono_interval(FOLLOW_UP_DELAY))
}

fn chrono_interval(interval: StdDuration) -> Duration {
    Duration::from_std(interval).expect("Interval constants fit the chrono range.")
}

#[derive(Clone)]
struct FireContext {
    owner: OwnerId,
    text: String,
    recurrence: Recurrence,
    store: Arc<ReminderStore>,
    delivery: Arc<dyn DeliveryChannel>,
    pairs: Arc<PairRegistry>,
    state: Arc<Mutex<PairState>>,
    token: CancellationToken,
    tag_seq: Arc<AtomicU64>,
}

impl FireContext {
    fn tag(&self) -> TimerTag {
        self.state.lock().expect("pair state lock poisoned").tag.clone()
    }
}

/// Boxed so the recurring re-arm can respawn itself.
fn primary_timer(
    ctx: FireContext,
    fire_at: DateTime<Utc>,
) -> Pin<Box<dyn Future<Output = ()> + Send>> {
    Box::pin(async move {
        if !wait_until(&ctx.token, fire_at).await {
            return;
        }
        if !record_present(&ctx).await {
            log::warn!(
                "Record gone before primary fire, skipping delivery. [owner = {}, tag = {}]",
                ctx.owner,
                ctx.tag()
            );
            return;
        }
        if let Err(error) = ctx.delivery.deliver_primary(ctx.owner, &ctx.text).await {
            log::error!("Failed to deliver reminder. [owner = {}]: {error}", ctx.owner);
        }

        let Some(next_target) = next_occurrence(fire_at, ctx.recurrence) else {
            return;
        };

        // Re-arm anchored to the scheduled instant, not to delivery time, so
        // the cadence never drifts with delivery delay.
        let (primary_at, follow_up_at) =
            resolve_fire_times(next_target, ctx.recurrence, Utc::now());
        let tag = TimerTag::mint(ctx.owner, &ctx.tag_seq);
        {
            let mut state = ctx.state.lock().expect("pair state lock poisoned");
            state.tag = tag.clone();
            state.pair = TimerPair {
                primary_fire_at: primary_at,
                follow_up_fire_at: follow_up_at,
                recurrence: ctx.recurrence,
            };
        }
        log::info!(
            "Re-armed recurring reminder. [owner = {}, tag = {tag}, primary = {primary_at}]",
            ctx.owner
        );

        spawn_follow_up(ctx.clone(), follow_up_at);
        tokio::spawn(primary_timer(ctx, primary_at));
    })
}

fn spawn_follow_up(ctx: FireContext, fire_at: DateTime<Utc>) {
    tokio::spawn(async move {
        if !wait_until(&ctx.token, fire_at).await {
            return;
        }
        if !record_present(&ctx).await {
            log::warn!(
                "Record gone before follow-up fire, skipping delivery. [owner = {}, tag = {}]",
                ctx.owner,
                ctx.tag()
            );
            return;
        }
        if let Err(error) = ctx.delivery.deliver_follow_up(ctx.owner, &ctx.text).await {
            log::error!(
                "Failed to deliver follow-up. [owner = {}]: {error}",
                ctx.owner
            );
        }
    });
}

/// Sleeps until `fire_at`; an overdue deadline elapses immediately. Returns
/// false when the pair was cancelled. The token is re-checked after the
/// sleep, so a cancellation always beats an already-elapsed timer.
async fn wait_until(token: &CancellationToken, fire_at: DateTime<Utc>) -> bool {
    let delay = (fire_at - Utc::now()).to_std().unwrap_or(StdDuration::ZERO);
    tokio::select! {
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(delay) => !token.is_cancelled(),
    }
}

/// Re-validates the record behind this pair before delivering. The pair's
/// current slot comes from the registry (slots shift as earlier records are
/// removed), and the slot is checked against the store's current list
/// length, so a record removed while the timer was in flight never delivers.
async fn record_present(ctx: &FireContext) -> bool {
    let slot = {
        let pairs = ctx.pairs.read().await;
        let Some(owner_pairs) = pairs.get(&ctx.owner) else {
            return false;
        };
        owner_pairs
            .iter()
            .find_map(|(slot, pair)| Arc::ptr_eq(&pair.state, &ctx.state).then_some(*slot))
    };
    match slot {
        Some(slot) => ctx.store.list(ctx.owner).await.len() > slot,
        None => false,
    }
}
