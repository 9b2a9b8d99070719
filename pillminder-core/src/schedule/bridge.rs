//! Schedule bridge
//!
//! Turns validated descriptors into trigger jobs. When a job fires, the
//! slot light goes on, a beep sequence starts and a "Notification" page is
//! pushed over whatever is on screen. Acknowledging it switches the light
//! off again.

use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use serde_json::Value;

use super::descriptor::ScheduleDescriptor;
use super::recurrence::{HourField, Recurrence};
use super::store::ScheduleStore;
use super::trigger::TriggerScheduler;
use super::validate::{validate_batch, ValidationError};
use crate::config::{Config, SLOT_COUNT};
use crate::effects::Effects;
use crate::navigation::Navigator;
use crate::overlay::LoadFn;
use crate::page::{Page, PageRef};
use pillminder_hal::PinId;

/// Label of the page pushed when a reminder fires
pub const NOTIFICATION_LABEL: &str = "Notification";

/// Anything that can show an overlay page
pub trait Notifier: Send + Sync {
    fn push_notification(&self, on_load: Option<LoadFn>, page: PageRef);
}

impl Notifier for Navigator {
    fn push_notification(&self, on_load: Option<LoadFn>, page: PageRef) {
        Navigator::push_notification(self, on_load, page);
    }
}

/// Reminder settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Light pin of each slot
    pub slots: [PinId; SLOT_COUNT],
    /// Beeps per reminder
    pub beeps: u32,
    /// Pause after each reminder beep
    pub beep_interval: Duration,
    /// How descriptor `hour` fields are read
    pub hour_field: HourField,
}

impl From<&Config> for BridgeConfig {
    fn from(config: &Config) -> Self {
        Self {
            slots: config.leds.slots,
            beeps: config.sound.beeps,
            beep_interval: Duration::from_millis(config.sound.interval_ms),
            hour_field: config.schedule.hour_field,
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Everything a firing job needs
#[derive(Clone)]
struct Reminder {
    effects: Arc<Effects>,
    notifier: Arc<dyn Notifier>,
    config: BridgeConfig,
}

impl Reminder {
    fn fire(&self, descriptor: &ScheduleDescriptor) {
        info!("reminder: {}", descriptor.reminder_text());
        let light = self.config.slots.get(descriptor.slot as usize).copied();
        if light.is_none() {
            warn!("{}: no light for slot {}", descriptor.name, descriptor.slot);
        }

        if let Some(pin) = light {
            self.effects.light_on(pin);
        }
        self.effects
            .beep_sequence(self.config.beeps, self.config.beep_interval);

        // Acknowledged with Select
        let mut lines = vec![Page::leaf(descriptor.reminder_text())];
        if let Some(special) = &descriptor.special {
            lines.push(Page::leaf(special.clone()));
        }
        let mut page = Page::builder(NOTIFICATION_LABEL).children(lines).no_prefix();
        let mut on_load: Option<LoadFn> = None;
        if let Some(pin) = light {
            let effects = self.effects.clone();
            page = page.on_visit(move |_| effects.light_off(pin));
            let effects = self.effects.clone();
            on_load = Some(Arc::new(move || effects.light_on(pin)));
        }

        self.notifier.push_notification(on_load, page.build());
    }
}

/// Connects stored schedules to the trigger scheduler and the screen
pub struct ScheduleBridge {
    store: ScheduleStore,
    scheduler: TriggerScheduler,
    reminder: Reminder,
}

impl ScheduleBridge {
    /// Create a bridge; no jobs are registered until [`rebuild`](Self::rebuild)
    /// or [`activate`](Self::activate)
    pub fn new(
        store: ScheduleStore,
        scheduler: TriggerScheduler,
        effects: Arc<Effects>,
        notifier: Arc<dyn Notifier>,
        config: BridgeConfig,
    ) -> Self {
        Self {
            store,
            scheduler,
            reminder: Reminder {
                effects,
                notifier,
                config,
            },
        }
    }

    /// Stored schedules
    pub fn store(&self) -> &ScheduleStore {
        &self.store
    }

    /// Validate a batch and register one job per descriptor
    ///
    /// If any descriptor is invalid nothing is registered and every error,
    /// sorted by origin and field, is returned (and logged).
    pub fn activate(&self, batch: &[(String, Value)]) -> Result<usize, Vec<ValidationError>> {
        let descriptors = match validate_batch(batch, self.reminder.config.hour_field) {
            Ok(descriptors) => descriptors,
            Err(errors) => {
                error!("schedule rejected, {} error(s)", errors.len());
                for e in &errors {
                    error!("  {}", e);
                }
                return Err(errors);
            }
        };

        let mut registered = 0;
        for descriptor in descriptors {
            let recurrence = match Recurrence::new(
                &descriptor.hour,
                descriptor.day_of_week.as_deref(),
                self.reminder.config.hour_field,
            ) {
                Ok(r) => r,
                Err(e) => {
                    // Validation parsed the same fields
                    warn!("{}: {}", descriptor.name, e);
                    continue;
                }
            };

            let reminder = self.reminder.clone();
            let label = format!("{} (hour {}, days {})", descriptor.name, descriptor.hour, descriptor.day_of_week());
            self.scheduler
                .add(label, recurrence, move || reminder.fire(&descriptor));
            registered += 1;
        }
        info!("{} reminder(s) active", registered);
        Ok(registered)
    }

    /// Drop every job and re-register from the stored files
    ///
    /// Files that cannot be read are skipped.
    pub fn rebuild(&self) -> Result<usize, Vec<ValidationError>> {
        self.scheduler.clear();
        let (batch, _skipped) = self.store.load_all();
        self.activate(&batch)
    }

    /// Drop every job
    pub fn clear(&self) {
        self.scheduler.clear();
    }

    /// Number of registered jobs
    pub fn job_count(&self) -> usize {
        self.scheduler.job_count()
    }

    /// Fire the reminder for `descriptor` now
    pub fn notify(&self, descriptor: &ScheduleDescriptor) {
        self.reminder.fire(descriptor);
    }

    /// Stop the scheduler without waiting for a running reminder
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::LocalClock;
    use pillminder_hal::OutputPin;
    use pillminder_hal_linux::{SimBuzzer, SimPin};
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        pages: Mutex<Vec<(Option<LoadFn>, PageRef)>>,
    }

    impl Notifier for Recorder {
        fn push_notification(&self, on_load: Option<LoadFn>, page: PageRef) {
            self.pages.lock().unwrap().push((on_load, page));
        }
    }

    struct Fixture {
        bridge: ScheduleBridge,
        recorder: Arc<Recorder>,
        effects: Arc<Effects>,
        light: SimPin,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let effects = Arc::new(Effects::new(Arc::new(SimBuzzer::new()), "beep.wav"));
        let light = SimPin::new(23);
        effects.init_light(23, Box::new(light.clone()));
        let recorder = Arc::new(Recorder::default());
        let config = BridgeConfig {
            beeps: 1,
            beep_interval: Duration::from_millis(1),
            ..BridgeConfig::default()
        };
        let bridge = ScheduleBridge::new(
            ScheduleStore::new(dir.path()),
            TriggerScheduler::start(LocalClock).unwrap(),
            effects.clone(),
            recorder.clone(),
            config,
        );
        Fixture {
            bridge,
            recorder,
            effects,
            light,
            _dir: dir,
        }
    }

    fn descriptor(special: Option<&str>) -> ScheduleDescriptor {
        ScheduleDescriptor {
            name: "Aspirin".into(),
            dosage: "1 tablet".into(),
            slot: 2,
            hour: "8".into(),
            day_of_week: None,
            special: special.map(String::from),
        }
    }

    #[test]
    fn test_notify_lights_slot_and_pushes_page() {
        let f = fixture();
        f.bridge.notify(&descriptor(Some("With food")));
        assert!(f.light.is_set_high());

        let pages = f.recorder.pages.lock().unwrap();
        let (on_load, page) = &pages[0];
        assert!(on_load.is_some());
        assert_eq!(page.label(), NOTIFICATION_LABEL);
        assert!(!page.prefix_marker());
        let lines: Vec<String> = page.children().iter().map(|p| p.label().to_string()).collect();
        assert_eq!(lines, vec!["Take 1 tablet of Aspirin", "With food"]);
    }

    #[test]
    fn test_acknowledge_turns_light_off() {
        let f = fixture();
        f.bridge.notify(&descriptor(None));
        let page = f.recorder.pages.lock().unwrap()[0].1.clone();
        assert_eq!(page.children().len(), 1);

        let screen = pillminder_display::SharedScreen::new();
        let nav = Navigator::new(Page::leaf("Home"), Box::new(screen), f.effects.clone());
        nav.push_notification(None, page);
        nav.select_current();
        assert!(f.light.is_set_low());
    }

    #[test]
    fn test_activate_registers_jobs() {
        let f = fixture();
        let batch = vec![
            ("a".to_string(), json!({"name": "A", "dosage": "1", "slot": 0, "hour": "8"})),
            ("b".to_string(), json!({"name": "B", "dosage": "2", "slot": 1, "hour": "9,21"})),
        ];
        assert_eq!(f.bridge.activate(&batch).unwrap(), 2);
        assert_eq!(f.bridge.job_count(), 2);
        f.bridge.clear();
        assert_eq!(f.bridge.job_count(), 0);
    }

    #[test]
    fn test_rebuild_reads_store() {
        let f = fixture();
        f.bridge
            .store()
            .save_payload(r#"{"name": "A", "dosage": "1", "slot": 0, "hour": "8"}"#)
            .unwrap();
        assert_eq!(f.bridge.rebuild().unwrap(), 1);

        f.bridge.store().remove("A").unwrap();
        assert_eq!(f.bridge.rebuild().unwrap(), 0);
        assert_eq!(f.bridge.job_count(), 0);
    }
}
