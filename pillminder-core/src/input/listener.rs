//! Input dispatcher thread
//!
//! The stop signal doubles as the poll-interval sleep: the loop waits on a
//! channel for one interval, and leaves at the next poll boundary once the
//! handle is stopped or dropped. A handler that is running is never
//! interrupted.

use std::io;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use log::{debug, info, warn};
use pillminder_hal::InputPin;

use super::edge::EdgeDetector;

/// Callback run on the dispatcher thread for each press
pub type Handler = Box<dyn FnMut() + Send>;

struct Binding {
    pin: Box<dyn InputPin + Send>,
    detector: EdgeDetector,
    handler: Handler,
    /// Whether the last read failed, so failures log once per outage
    failing: bool,
}

impl Binding {
    fn poll(&mut self) {
        match self.pin.is_high() {
            Ok(level) => {
                if self.failing {
                    info!("input readable again");
                    self.failing = false;
                }
                if self.detector.sample(level) {
                    (self.handler)();
                }
            }
            Err(e) => {
                if !self.failing {
                    warn!("input read failed: {}", e);
                    self.failing = true;
                }
            }
        }
    }
}

/// Not-yet-started dispatcher with its binding table
///
/// Starting consumes the listener; a stopped dispatcher cannot be restarted,
/// build a new one instead.
pub struct InputListener {
    name: String,
    bindings: Vec<Binding>,
    poll_interval: Duration,
    debounce_polls: u32,
}

impl InputListener {
    /// Create a listener with an empty binding table
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            name: "input".into(),
            bindings: Vec::new(),
            poll_interval,
            debounce_polls: 0,
        }
    }

    /// Thread name, for logs
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Samples a level must hold before it is accepted, for bindings added
    /// after this call
    pub fn debounce(mut self, polls: u32) -> Self {
        self.debounce_polls = polls;
        self
    }

    /// Call `handler` on every rising edge of `pin`
    pub fn bind<P, F>(mut self, pin: P, handler: F) -> Self
    where
        P: InputPin + Send + 'static,
        F: FnMut() + Send + 'static,
    {
        self.bindings.push(Binding {
            pin: Box::new(pin),
            detector: EdgeDetector::with_debounce(self.debounce_polls),
            handler: Box::new(handler),
            failing: false,
        });
        self
    }

    /// Number of bound inputs
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether nothing is bound
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Spawn the dispatcher thread
    pub fn start(self) -> io::Result<ListenerHandle> {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let Self {
            name,
            mut bindings,
            poll_interval,
            ..
        } = self;

        let thread_name = name.clone();
        let thread = thread::Builder::new().name(thread_name).spawn(move || {
            info!("{} listener started ({} inputs)", name, bindings.len());
            loop {
                for binding in bindings.iter_mut() {
                    binding.poll();
                }
                match stop_rx.recv_timeout(poll_interval) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            info!("{} listener stopped", name);
        })?;

        Ok(ListenerHandle {
            thread_id: thread.thread().id(),
            thread: Some(thread),
            stop_tx,
        })
    }
}

/// Running dispatcher
///
/// Dropping the handle stops the thread without waiting for it.
pub struct ListenerHandle {
    stop_tx: Sender<()>,
    thread: Option<JoinHandle<()>>,
    thread_id: ThreadId,
}

impl ListenerHandle {
    /// Stop the dispatcher at its next poll boundary
    ///
    /// Waits for the thread to exit, unless called from a handler running
    /// on that same thread.
    pub fn stop(mut self) {
        let _ = self.stop_tx.try_send(());
        if thread::current().id() == self.thread_id {
            debug!("listener stopping itself");
            return;
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("input listener panicked");
            }
        }
    }

    /// Whether the dispatcher thread has exited
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, |t| t.is_finished())
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        let _ = self.stop_tx.try_send(());
    }
}
