//! Timed triggers
//!
//! A single worker thread owns the [`JobTable`] and sleeps on its control
//! channel until the earliest deadline. Jobs run on the worker thread, one
//! at a time. A run that happens late (the process was suspended, the clock
//! jumped) fires once and is rescheduled from the current time.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use crossbeam_channel::{unbounded, RecvTimeoutError, Sender};
use log::{debug, info, trace, warn};

use super::recurrence::Recurrence;

/// Longest sleep between clock checks
const MAX_WAIT: Duration = Duration::from_secs(1);

/// Job identifier, unique per scheduler
pub type JobId = u64;

/// Job body
pub type JobFn = Box<dyn FnMut() + Send>;

/// Source of local wall-clock time
pub trait Clock: Send + 'static {
    fn now(&self) -> NaiveDateTime;
}

/// System local time
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

struct Job {
    id: JobId,
    label: String,
    recurrence: Recurrence,
    next: Option<NaiveDateTime>,
    run: JobFn,
}

/// Registered jobs and their next firing times
#[derive(Default)]
pub struct JobTable {
    jobs: Vec<Job>,
    next_id: JobId,
}

impl JobTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job, first due after `now`
    pub fn add(&mut self, label: impl Into<String>, recurrence: Recurrence, run: JobFn, now: NaiveDateTime) -> JobId {
        let id = self.next_id;
        self.next_id += 1;
        let label = label.into();
        let next = recurrence.next_after(now);
        match next {
            Some(at) => debug!("job {} ({}) first due {}", id, label, at),
            None => warn!("job {} ({}) never fires", id, label),
        }
        self.jobs.push(Job {
            id,
            label,
            recurrence,
            next,
            run,
        });
        id
    }

    /// Drop every job
    pub fn clear(&mut self) {
        self.jobs.clear();
    }

    /// Number of jobs
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether no job is registered
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Earliest firing time of any job
    pub fn next_deadline(&self) -> Option<NaiveDateTime> {
        self.jobs.iter().filter_map(|job| job.next).min()
    }

    /// Run every job due at `now`, then schedule its next firing after `now`
    ///
    /// Returns the ids of the jobs that ran, in registration order.
    pub fn run_due(&mut self, now: NaiveDateTime) -> Vec<JobId> {
        let mut ran = Vec::new();
        for job in self.jobs.iter_mut() {
            if job.next.is_some_and(|at| at <= now) {
                trace!("running job {} ({})", job.id, job.label);
                (job.run)();
                job.next = job.recurrence.next_after(now);
                ran.push(job.id);
            }
        }
        ran
    }
}

enum Control {
    Add {
        label: String,
        recurrence: Recurrence,
        run: JobFn,
    },
    Clear,
    Shutdown,
}

/// Background trigger scheduler
pub struct TriggerScheduler {
    control: Sender<Control>,
    jobs: Arc<AtomicUsize>,
}

impl TriggerScheduler {
    /// Spawn the worker thread
    pub fn start<C: Clock>(clock: C) -> io::Result<Self> {
        let (control, rx) = unbounded::<Control>();

        thread::Builder::new().name("scheduler".into()).spawn(move || {
            info!("scheduler started");
            let mut table = JobTable::new();
            loop {
                let now = clock.now();
                table.run_due(now);

                // Sleep until the next deadline or a control message
                let wait = table.next_deadline().map_or(MAX_WAIT, |at| {
                    (at - clock.now())
                        .to_std()
                        .unwrap_or(Duration::ZERO)
                        .min(MAX_WAIT)
                });

                match rx.recv_timeout(wait) {
                    Ok(Control::Add {
                        label,
                        recurrence,
                        run,
                    }) => {
                        table.add(label, recurrence, run, clock.now());
                    }
                    Ok(Control::Clear) => {
                        debug!("clearing {} job(s)", table.len());
                        table.clear();
                    }
                    Ok(Control::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {}
                }
            }
            info!("scheduler stopped");
        })?;

        Ok(Self {
            control,
            jobs: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Register a recurring job
    pub fn add<F>(&self, label: impl Into<String>, recurrence: Recurrence, run: F)
    where
        F: FnMut() + Send + 'static,
    {
        let label = label.into();
        info!("scheduling {}", label);
        if self
            .control
            .send(Control::Add {
                label,
                recurrence,
                run: Box::new(run),
            })
            .is_ok()
        {
            self.jobs.fetch_add(1, Ordering::SeqCst);
        } else {
            warn!("scheduler is not running");
        }
    }

    /// Remove every job
    pub fn clear(&self) {
        if self.control.send(Control::Clear).is_err() {
            warn!("scheduler is not running");
        }
        self.jobs.store(0, Ordering::SeqCst);
    }

    /// Number of registered jobs
    pub fn job_count(&self) -> usize {
        self.jobs.load(Ordering::SeqCst)
    }

    /// Stop the worker without waiting for a running job
    pub fn shutdown(&self) {
        if self.control.send(Control::Shutdown).is_ok() {
            info!("scheduler shutting down");
        }
        self.jobs.store(0, Ordering::SeqCst);
    }
}

impl Drop for TriggerScheduler {
    fn drop(&mut self) {
        let _ = self.control.send(Control::Shutdown);
    }
}
