//! # Resetbell Core Library
//!
//! Reset-cycle-aware reward scheduling engine. Two tightly coupled halves:
//!
//! - A deterministic calendar model of a game's recurring weekly-reset and
//!   weekend reward windows, with a forward simulation projecting when an
//!   accumulating resource target will be met.
//! - A per-guild notification scheduler that watches externally supplied
//!   event records with expiry timestamps, computes delayed firings, and
//!   reschedules them when settings or data change. Settings persist across
//!   restarts; pending waiters are always recomputed, never resumed.
//!
//! ## Architecture
//!
//! - **Calendar**: pure functions over civil instants in one fixed reference
//!   timezone with a fixed reset hour ([`cycle`], [`clock`])
//! - **Projection**: bounded discrete-event simulation ([`projector`])
//! - **Storage**: per-guild JSON records with atomic replace ([`store`]) and
//!   TOML configuration ([`config`])
//! - **Scheduling**: cancel-all-then-rebuild pending-alert registry over
//!   tokio waiters ([`alerts`])
//! - **Edges**: [`events::EventSource`] and [`notify::Notifier`] are the
//!   capability interfaces to the outside world
//!
//! ## Key Components
//!
//! - [`project_fulfillment`]: earliest instant a reward target is met
//! - [`AlertScheduler`]: live per-guild expiry alert state
//! - [`SettingsStore`]: durable per-guild settings persistence
//! - [`Config`]: operator configuration management

pub mod alerts;
pub mod clock;
pub mod config;
pub mod cycle;
pub mod error;
pub mod events;
pub mod notify;
pub mod projector;
pub mod store;

pub use alerts::{AlertScheduler, GuildAlertSetting, PendingAlert};
pub use clock::{CalendarClock, FixedClock, SystemClock, RESET_HOUR};
pub use config::Config;
pub use error::{ConfigError, CoreError, ProjectionError, Result, SendError, StorageError};
pub use events::{dedup_events, snapshot_fingerprint, EventRecord, EventSource};
pub use notify::{AlertMessage, DiscordNotifier, Notifier};
pub use projector::{project_fulfillment, RewardTarget};
pub use store::{data_dir, SettingsStore};
