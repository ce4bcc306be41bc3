use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::RwLock;

use crate::reminder::{OwnerId, ReminderRecord};
use crate::recurrence::Recurrence;

use super::model::{StoredReminder, StoredReminderMap, StoredTimezoneMap};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("no reminder at index {index} (owner has {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

#[derive(Default)]
struct StoreState {
    reminders: HashMap<OwnerId, Vec<ReminderRecord>>,
    timezones: HashMap<OwnerId, String>,
}

/// Durable collection of per-owner reminder lists and timezone preferences.
///
/// Every mutation rewrites the full snapshot before returning, so a crash
/// right after a successful call never loses that call's effect. A failed
/// write is logged and the in-memory state stays authoritative for the rest
/// of the process lifetime.
pub struct ReminderStore {
    state: RwLock<StoreState>,
    reminders_path: PathBuf,
    timezones_path: PathBuf,
    default_timezone: String,
}

impl ReminderStore {
    /// Loads both snapshot files. A missing file means an empty store;
    /// malformed content is logged and treated as empty rather than taking
    /// the process down.
    pub fn open(
        reminders_path: impl Into<PathBuf>,
        timezones_path: impl Into<PathBuf>,
        default_timezone: impl Into<String>,
    ) -> Self {
        let reminders_path = reminders_path.into();
        let timezones_path = timezones_path.into();
        let state = StoreState {
            reminders: load_reminders(&reminders_path),
            timezones: load_timezones(&timezones_path),
        };

        Self {
            state: RwLock::new(state),
            reminders_path,
            timezones_path,
            default_timezone: default_timezone.into(),
        }
    }

    /// Appends a draft holding only the text; returns its index in the
    /// owner's list.
    pub async fn create_draft(&self, owner: OwnerId, text: impl Into<String>) -> usize {
        let mut state = self.state.write().await;
        let list = state.reminders.entry(owner).or_default();
        list.push(ReminderRecord::draft(text));
        let index = list.len() - 1;
        self.persist_reminders(&state);
        index
    }

    pub async fn set_date(
        &self,
        owner: OwnerId,
        index: usize,
        date: chrono::NaiveDate,
    ) -> Result<(), StoreError> {
        self.update_record(owner, index, |record| record.date = Some(date))
            .await
    }

    pub async fn set_hour(&self, owner: OwnerId, index: usize, hour: u32) -> Result<(), StoreError> {
        self.update_record(owner, index, |record| record.hour = Some(hour))
            .await
    }

    pub async fn set_minute(
        &self,
        owner: OwnerId,
        index: usize,
        minute: u32,
    ) -> Result<(), StoreError> {
        self.update_record(owner, index, |record| record.minute = Some(minute))
            .await
    }

    pub async fn set_recurrence(
        &self,
        owner: OwnerId,
        index: usize,
        recurrence: Recurrence,
    ) -> Result<(), StoreError> {
        self.update_record(owner, index, |record| record.recurrence = recurrence)
            .await
    }

    /// The owner's reminders in creation order.
    pub async fn list(&self, owner: OwnerId) -> Vec<ReminderRecord> {
        let state = self.state.read().await;
        state.reminders.get(&owner).cloned().unwrap_or_default()
    }

    pub async fn owners(&self) -> Vec<OwnerId> {
        let state = self.state.read().await;
        state.reminders.keys().copied().collect()
    }

    /// Removes and returns the record at `index`; later records shift down
    /// by one.
    pub async fn remove(&self, owner: OwnerId, index: usize) -> Result<ReminderRecord, StoreError> {
        let mut state = self.state.write().await;
        let list = state.reminders.get_mut(&owner);
        let len = list.as_ref().map_or(0, |list| list.len());
        let list = list
            .filter(|list| index < list.len())
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        let removed = list.remove(index);
        self.persist_reminders(&state);
        Ok(removed)
    }

    pub async fn set_timezone(&self, owner: OwnerId, tz_name: impl Into<String>) {
        let mut state = self.state.write().await;
        state.timezones.insert(owner, tz_name.into());
        self.persist_timezones(&state);
    }

    /// The owner's selected zone name, or the configured default.
    pub async fn timezone(&self, owner: OwnerId) -> String {
        let state = self.state.read().await;
        state
            .timezones
            .get(&owner)
            .cloned()
            .unwrap_or_else(|| self.default_timezone.clone())
    }

    async fn update_record(
        &self,
        owner: OwnerId,
        index: usize,
        apply: impl FnOnce(&mut ReminderRecord),
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let list = state.reminders.get_mut(&owner);
        let len = list.as_ref().map_or(0, |list| list.len());
        let record = list
            .and_then(|list| list.get_mut(index))
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        apply(record);
        self.persist_reminders(&state);
        Ok(())
    }

    fn persist_reminders(&self, state: &StoreState) {
        let snapshot: StoredReminderMap = state
            .reminders
            .iter()
            .map(|(owner, list)| {
                let stored = list.iter().map(StoredReminder::from).collect();
                (owner.to_string(), stored)
            })
            .collect();

        if let Err(error) = write_json(&self.reminders_path, &snapshot) {
            log::error!(
                "Failed to persist reminder snapshot. [path = {}]: {error}",
                self.reminders_path.display()
            );
        }
    }

    fn persist_timezones(&self, state: &StoreState) {
        if let Err(error) = write_json(&self.timezones_path, &state.timezones) {
            log::error!(
                "Failed to persist timezone snapshot. [path = {}]: {error}",
                self.timezones_path.display()
            );
        }
    }
}

fn write_json(path: &Path, value: &impl serde::Serialize) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

fn load_reminders(path: &Path) -> HashMap<OwnerId, Vec<ReminderRecord>> {
    let Some(contents) = read_if_present(path) else {
        return HashMap::new();
    };

    let stored: StoredReminderMap = match serde_json::from_str(&contents) {
        Ok(stored) => stored,
        Err(error) => {
            log::error!(
                "Malformed reminder snapshot, starting empty. [path = {}]: {error}",
                path.display()
            );
            return HashMap::new();
        }
    };

    stored
        .into_iter()
        .filter_map(|(owner, list)| match owner.parse::<OwnerId>() {
            Ok(owner) => Some((owner, list.into_iter().map(Into::into).collect())),
            Err(_) => {
                log::warn!("Dropping reminders under non-numeric owner key {owner:?}");
                None
            }
        })
        .collect()
}

fn load_timezones(path: &Path) -> HashMap<OwnerId, String> {
    let Some(contents) = read_if_present(path) else {
        return HashMap::new();
    };

    match serde_json::from_str::<StoredTimezoneMap>(&contents) {
        Ok(timezones) => timezones,
        Err(error) => {
            log::error!(
                "Malformed timezone snapshot, starting empty. [path = {}]: {error}",
                path.display()
            );
            HashMap::new()
        }
    }
}

fn read_if_present(path: &Path) -> Option<String> {
    if !path.exists() {
        return None;
    }
    match fs::read_to_string(path) {
        Ok(contents) => Some(contents),
        Err(error) => {
            log::error!(
                "Could not read snapshot, starting empty. [path = {}]: {error}",
                path.display()
            );
            None
        }
    }
}
