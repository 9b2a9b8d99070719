//! Commands for the main thread
//!
//! Menu callbacks run on the input thread with the navigation lock held, and
//! the Ctrl-C handler runs on its own thread. Anything long-running or that
//! needs the navigator itself is sent here and handled by the command loop.

use crossbeam_channel::{unbounded, Receiver, Sender};

/// Work requested of the main thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run a record (capture) session
    Record,
    /// Reload stored schedules and re-register their reminders
    Rebuild,
    /// Tear down and exit
    Shutdown,
}

/// Sending half, cloned into menu callbacks and the signal handler
pub type CommandSender = Sender<Command>;

/// Receiving half, owned by the command loop
pub type CommandReceiver = Receiver<Command>;

/// Create the command channel
///
/// Unbounded, so senders holding the navigation lock never block.
pub fn command_channel() -> (CommandSender, CommandReceiver) {
    unbounded()
}
