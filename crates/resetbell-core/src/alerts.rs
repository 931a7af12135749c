//! Per-guild expiry alert scheduling.
//!
//! The scheduler owns the live set of pending notification firings derived
//! from each guild's persisted [`GuildAlertSetting`] and the latest event
//! snapshot. A guild's pending set is only ever replaced wholesale: one
//! locked cancel-all-then-rebuild pass, so no caller observes a half-built
//! state. The registry starts empty at process start and is rebuilt from
//! persisted settings plus fresh event data -- waiters are recomputed, never
//! resumed across a restart.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::clock::CalendarClock;
use crate::error::{CoreError, Result};
use crate::events::{dedup_events, snapshot_fingerprint, EventRecord, EventSource};
use crate::notify::{AlertMessage, Notifier};
use crate::store::SettingsStore;

pub const MIN_HOURS_BEFORE: u32 = 1;
pub const MAX_HOURS_BEFORE: u32 = 240;
pub const DEFAULT_HOURS_BEFORE: u32 = 24;

fn default_hours_before() -> u32 {
    DEFAULT_HOURS_BEFORE
}

/// Correct an out-of-range lead time instead of rejecting it.
pub fn clamp_hours_before(hours: u32) -> u32 {
    hours.clamp(MIN_HOURS_BEFORE, MAX_HOURS_BEFORE)
}

/// Per-guild alert configuration. Created on first registration and disabled
/// in place rather than deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuildAlertSetting {
    pub enabled: bool,
    pub channel_id: u64,
    #[serde(default = "default_hours_before")]
    pub hours_before: u32,
}

/// One scheduled firing: a group of events sharing an expiry instant, plus
/// the waiter parked until `fires_at`. Dropped on firing, cancellation, or
/// shutdown.
#[derive(Debug)]
pub struct PendingAlert {
    pub guild_id: u64,
    pub fires_at: NaiveDateTime,
    pub events: Vec<EventRecord>,
    handle: JoinHandle<()>,
}

type PendingRegistry = HashMap<u64, Vec<PendingAlert>>;

fn cancel_guild(pending: &mut PendingRegistry, guild_id: u64) {
    if let Some(alerts) = pending.remove(&guild_id) {
        for alert in &alerts {
            alert.handle.abort();
        }
    }
}

/// Owns the pending-alert registry and the settings store.
pub struct AlertScheduler {
    store: SettingsStore<GuildAlertSetting>,
    source: Arc<dyn EventSource>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn CalendarClock>,
    refresh_hours: Vec<u32>,
    pending: AsyncMutex<PendingRegistry>,
}

impl AlertScheduler {
    pub fn new(
        store: SettingsStore<GuildAlertSetting>,
        source: Arc<dyn EventSource>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn CalendarClock>,
    ) -> Self {
        Self {
            store,
            source,
            notifier,
            clock,
            refresh_hours: vec![crate::clock::RESET_HOUR, crate::clock::RESET_HOUR + 12],
            pending: AsyncMutex::new(HashMap::new()),
        }
    }

    /// Override the daily refresh wake hours (reference timezone).
    pub fn with_refresh_hours(mut self, hours: Vec<u32>) -> Self {
        self.refresh_hours = hours;
        self
    }

    /// Persist an enabled setting and (re)build the guild's pending alerts.
    /// Returns the number of pending alert groups.
    pub async fn register(&self, guild_id: u64, channel_id: u64, hours_before: u32) -> Result<usize> {
        let setting = GuildAlertSetting {
            enabled: true,
            channel_id,
            hours_before: clamp_hours_before(hours_before),
        };
        self.store.save(guild_id, &setting).await?;
        self.apply_settings(guild_id, setting).await
    }

    /// Disable alerts for the guild, keeping the stored record. Idempotent.
    pub async fn disable(&self, guild_id: u64) -> Result<()> {
        let mut setting = self.store.load(guild_id).await?.unwrap_or(GuildAlertSetting {
            enabled: false,
            channel_id: 0,
            hours_before: DEFAULT_HOURS_BEFORE,
        });
        setting.enabled = false;
        self.store.save(guild_id, &setting).await?;

        let mut pending = self.pending.lock().await;
        cancel_guild(&mut pending, guild_id);
        Ok(())
    }

    /// Stored setting for the guild, if any.
    pub async fn setting(&self, guild_id: u64) -> Result<Option<GuildAlertSetting>> {
        Ok(self.store.load(guild_id).await?)
    }

    /// Firing instants and group sizes currently pending for the guild.
    pub async fn pending_summary(&self, guild_id: u64) -> Vec<(NaiveDateTime, usize)> {
        let pending = self.pending.lock().await;
        pending
            .get(&guild_id)
            .map(|alerts| alerts.iter().map(|a| (a.fires_at, a.events.len())).collect())
            .unwrap_or_default()
    }

    /// Rebuild the guild's pending alerts from `setting` against a fresh
    /// event snapshot. The previous set is cancelled wholesale; on source
    /// failure it is left untouched until the next successful pass.
    pub async fn apply_settings(&self, guild_id: u64, setting: GuildAlertSetting) -> Result<usize> {
        if !setting.enabled {
            let mut pending = self.pending.lock().await;
            cancel_guild(&mut pending, guild_id);
            return Ok(0);
        }

        // Fetch before cancelling: a failed fetch must leave the previous
        // pass's alerts in place.
        let Some(snapshot) = self.source.fetch_current_events().await else {
            warn!(guild_id, "event source unavailable, keeping previous alerts");
            return Err(CoreError::DataUnavailable);
        };
        let snapshot = dedup_events(snapshot);
        let now = self.clock.now();
        debug!(
            guild_id,
            fingerprint = %snapshot_fingerprint(&snapshot),
            "applying alert settings"
        );

        let mut pending = self.pending.lock().await;
        cancel_guild(&mut pending, guild_id);

        // Events sharing an expiry share one waiter: one timer per distinct
        // deadline instead of one per event.
        let mut groups: BTreeMap<NaiveDateTime, Vec<EventRecord>> = BTreeMap::new();
        for record in snapshot {
            if record.permanent {
                continue;
            }
            let Some(ends_at) = record.ends_at else {
                continue;
            };
            if ends_at < now {
                continue;
            }
            groups.entry(ends_at).or_default().push(record);
        }

        let mut alerts = Vec::with_capacity(groups.len());
        for (ends_at, events) in groups {
            let fires_at = (ends_at - Duration::hours(i64::from(setting.hours_before))).max(now);
            let delay = (fires_at - now).to_std().unwrap_or_default();
            let handle = tokio::spawn(fire_after(
                delay,
                guild_id,
                setting,
                events.clone(),
                Arc::clone(&self.notifier),
            ));
            alerts.push(PendingAlert {
                guild_id,
                fires_at,
                events,
                handle,
            });
        }
        let count = alerts.len();
        info!(guild_id, pending = count, "alert schedule rebuilt");
        pending.insert(guild_id, alerts);
        Ok(count)
    }

    /// Re-apply persisted settings for every guild against fresh event data.
    /// One guild's failure never aborts the others. Returns the number of
    /// guilds successfully refreshed.
    pub async fn refresh_all(&self) -> usize {
        let ids = match self.store.guild_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                error!(error = %e, "failed to enumerate guild settings");
                return 0;
            }
        };

        let mut refreshed = 0;
        for guild_id in ids {
            let setting = match self.store.load(guild_id).await {
                Ok(Some(setting)) => setting,
                Ok(None) => continue,
                Err(e) => {
                    warn!(guild_id, error = %e, "skipping guild with unreadable setting");
                    continue;
                }
            };
            match self.apply_settings(guild_id, setting).await {
                Ok(_) => refreshed += 1,
                Err(e) => warn!(guild_id, error = %e, "refresh failed for guild"),
            }
        }
        refreshed
    }

    /// Cancel the guild's waiters, deliver the first group immediately for
    /// diagnostics, then rebuild from the stored setting.
    pub async fn test_fire(&self, guild_id: u64) -> Result<()> {
        let taken = {
            let mut pending = self.pending.lock().await;
            pending.remove(&guild_id)
        };
        let Some(alerts) = taken else {
            return Ok(());
        };
        for alert in &alerts {
            alert.handle.abort();
        }

        if let Some(first) = alerts.first() {
            if let Some(setting) = self.store.load(guild_id).await? {
                info!(guild_id, "test-firing one alert group");
                deliver_group(guild_id, &setting, &first.events, self.notifier.as_ref()).await;
            }
        }

        if let Some(setting) = self.store.load(guild_id).await? {
            self.apply_settings(guild_id, setting).await?;
        }
        Ok(())
    }

    /// Abort every pending waiter. Waiters are never resumed across a
    /// restart; startup rebuilds them via [`AlertScheduler::refresh_all`].
    pub async fn shutdown(&self) {
        let mut pending = self.pending.lock().await;
        for (_, alerts) in pending.drain() {
            for alert in &alerts {
                alert.handle.abort();
            }
        }
    }

    /// Instant of the next scheduled refresh strictly after `now`.
    fn next_refresh_after(&self, now: NaiveDateTime) -> NaiveDateTime {
        let mut next: Option<NaiveDateTime> = None;
        for day_offset in 0..=1i64 {
            let date = now.date() + Duration::days(day_offset);
            for &hour in &self.refresh_hours {
                let Some(time) = NaiveTime::from_hms_opt(hour, 0, 0) else {
                    continue;
                };
                let candidate = date.and_time(time);
                if candidate > now && next.map_or(true, |n| candidate < n) {
                    next = Some(candidate);
                }
            }
        }
        next.unwrap_or(now + Duration::days(1))
    }

    /// Drive periodic refresh at the fixed wake hours until cancelled.
    pub async fn run_refresh_loop(&self) {
        loop {
            let now = self.clock.now();
            let next = self.next_refresh_after(now);
            let delay = (next - now).to_std().unwrap_or_default();
            info!(next = %next, "next alert refresh scheduled");
            tokio::time::sleep(delay).await;

            let refreshed = self.refresh_all().await;
            info!(refreshed, "periodic alert refresh complete");
        }
    }
}

async fn fire_after(
    delay: std::time::Duration,
    guild_id: u64,
    setting: GuildAlertSetting,
    events: Vec<EventRecord>,
    notifier: Arc<dyn Notifier>,
) {
    tokio::time::sleep(delay).await;
    deliver_group(guild_id, &setting, &events, notifier.as_ref()).await;
}

/// Deliver one group. Failures are logged and the alert is consumed; the
/// deadline is imminent, so there is no retry.
async fn deliver_group(
    guild_id: u64,
    setting: &GuildAlertSetting,
    events: &[EventRecord],
    notifier: &dyn Notifier,
) {
    for event in events {
        let Some(ends_at) = event.ends_at else {
            continue;
        };
        let message = AlertMessage {
            title: format!("Event expiry alert - {}", event.name),
            body: format!(
                "{} hours until the event ends.\nEnds at: {}",
                setting.hours_before,
                ends_at.format("%Y-%m-%d %H:%M:%S")
            ),
            url: (!event.url.trim().is_empty()).then(|| event.url.clone()),
        };
        if let Err(e) = notifier.send(setting.channel_id, &message).await {
            warn!(
                guild_id,
                channel_id = setting.channel_id,
                event = %event.name,
                error = %e,
                "alert delivery failed"
            );
        }
    }
}
