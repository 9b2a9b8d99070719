//! Medicine schedules
//!
//! Flow of a schedule through the appliance:
//!
//! ```text
//!   capture / file ──► JSON value ──► validate_batch ──► ScheduleDescriptor
//!                                          │ (any error:            │
//!                                          ▼  nothing runs)         ▼
//!                                  Vec<ValidationError>      Recurrence + job
//!                                                                   │
//!                                   TriggerScheduler worker ◄───────┘
//!                                          │ fires
//!                                          ▼
//!                      light on, beep sequence, "Notification" overlay
//! ```

mod bridge;
mod descriptor;
mod recurrence;
mod store;
mod trigger;
mod validate;

pub use bridge::{BridgeConfig, Notifier, ScheduleBridge, NOTIFICATION_LABEL};
pub use descriptor::ScheduleDescriptor;
pub use recurrence::{CronField, HourField, Recurrence, RecurrenceError};
pub use store::{PersistenceError, ScheduleStore};
pub use trigger::{Clock, JobFn, JobId, JobTable, LocalClock, TriggerScheduler};
pub use validate::{validate_batch, validate_descriptor, ValidationError};
