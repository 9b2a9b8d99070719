//! Hardware side effects
//!
//! Owns the slot lights, the buzzer, the mute flag and the beep-sequence
//! guard. Every failure here is logged and otherwise ignored: a light that
//! does not switch or a beep that does not play never stops the controller.
//!
//! Timed effects run on detached threads and cannot be cancelled once
//! started.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, warn};
use pillminder_hal::{Buzzer, OutputPin, PinId};

/// Default sound played for beeps
pub const DEFAULT_SOUND: &str = "beep-07.wav";

type Lights = HashMap<PinId, Box<dyn OutputPin + Send>>;

/// Releases the beep-sequence guard when the sequence thread ends
struct SequenceGuard(Arc<AtomicBool>);

impl Drop for SequenceGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Lights, buzzer and mute state of the appliance
pub struct Effects {
    lights: Arc<Mutex<Lights>>,
    buzzer: Arc<dyn Buzzer>,
    sound: String,
    muted: Arc<AtomicBool>,
    sequence_active: Arc<AtomicBool>,
}

impl Effects {
    /// Create effects around a buzzer, with no lights registered
    pub fn new(buzzer: Arc<dyn Buzzer>, sound: impl Into<String>) -> Self {
        Self {
            lights: Arc::new(Mutex::new(HashMap::new())),
            buzzer,
            sound: sound.into(),
            muted: Arc::new(AtomicBool::new(false)),
            sequence_active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Register the output pin driving light `id`, switched off
    pub fn init_light(&self, id: PinId, mut pin: Box<dyn OutputPin + Send>) {
        if let Err(e) = pin.set_low() {
            warn!("light {}: init failed: {}", id, e);
        }
        lock(&self.lights).insert(id, pin);
    }

    /// Switch light `id` on
    pub fn light_on(&self, id: PinId) {
        set_light(&self.lights, id, true);
    }

    /// Switch light `id` off
    pub fn light_off(&self, id: PinId) {
        set_light(&self.lights, id, false);
    }

    /// Whether light `id` is currently on
    pub fn is_light_on(&self, id: PinId) -> bool {
        lock(&self.lights)
            .get(&id)
            .map(|pin| pin.is_set_high())
            .unwrap_or(false)
    }

    /// Switch light `id` on for `duration`, then off, on a detached thread
    pub fn pulse_light(&self, id: PinId, duration: Duration) -> Option<JoinHandle<()>> {
        let lights = self.lights.clone();
        spawn("light-pulse", move || {
            set_light(&lights, id, true);
            thread::sleep(duration);
            set_light(&lights, id, false);
        })
    }

    /// Play the configured sound once, blocking; silent when muted
    pub fn beep(&self) {
        play(self.buzzer.as_ref(), &self.sound, &self.muted);
    }

    /// Acknowledgement beep on a detached thread
    pub fn ack_tone(&self) {
        let buzzer = self.buzzer.clone();
        let sound = self.sound.clone();
        let muted = self.muted.clone();
        spawn("ack-tone", move || play(buzzer.as_ref(), &sound, &muted));
    }

    /// Play `count` beeps `interval` apart on a detached thread
    ///
    /// At most one sequence runs at a time. A request made while one is
    /// active is dropped and `None` is returned.
    pub fn beep_sequence(&self, count: u32, interval: Duration) -> Option<JoinHandle<()>> {
        if self
            .sequence_active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("beep sequence already active, dropping request");
            return None;
        }

        let guard = SequenceGuard(self.sequence_active.clone());
        let buzzer = self.buzzer.clone();
        let sound = self.sound.clone();
        let muted = self.muted.clone();
        spawn("beep-sequence", move || {
            let _guard = guard;
            for _ in 0..count {
                play(buzzer.as_ref(), &sound, &muted);
                thread::sleep(interval);
            }
        })
    }

    /// Whether a beep sequence is running
    pub fn is_sequence_active(&self) -> bool {
        self.sequence_active.load(Ordering::SeqCst)
    }

    /// Mute or unmute all beeps
    pub fn set_muted(&self, muted: bool) {
        debug!("sound {}", if muted { "muted" } else { "unmuted" });
        self.muted.store(muted, Ordering::SeqCst);
    }

    /// Whether beeps are muted
    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }
}

fn lock(lights: &Mutex<Lights>) -> MutexGuard<'_, Lights> {
    lights.lock().unwrap_or_else(PoisonError::into_inner)
}

fn set_light(lights: &Mutex<Lights>, id: PinId, on: bool) {
    match lock(lights).get_mut(&id) {
        Some(pin) => {
            if let Err(e) = pin.set_state(on) {
                warn!("light {}: {}", id, e);
            }
        }
        None => warn!("light {}: not initialised", id),
    }
}

fn play(buzzer: &dyn Buzzer, sound: &str, muted: &AtomicBool) {
    if muted.load(Ordering::SeqCst) {
        return;
    }
    if let Err(e) = buzzer.play(sound) {
        warn!("beep failed: {}", e);
    }
}

fn spawn<F>(name: &str, f: F) -> Option<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    match thread::Builder::new().name(name.into()).spawn(f) {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("failed to spawn {} thread: {}", name, e);
            None
        }
    }
}
