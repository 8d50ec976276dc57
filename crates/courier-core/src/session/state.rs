//! Per-session queue and pending-result state.

use crate::command::{Command, CommandId, CommandResult};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Notify;

/// State owned by a single session: one FIFO command queue and one
/// pending-result map, plus the activity timestamp that drives idle
/// reclamation.
pub struct Session {
    commands: VecDeque<Command>,
    results: HashMap<CommandId, CommandResult>,
    last_activity: Instant,
    notify: Arc<Notify>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            commands: VecDeque::new(),
            results: HashMap::new(),
            last_activity: Instant::now(),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Append a command to the back of the queue.
    pub fn enqueue(&mut self, command: Command) {
        self.commands.push_back(command);
    }

    /// Pop the oldest unfetched command, if any.
    pub fn pop_command(&mut self) -> Option<Command> {
        self.commands.pop_front()
    }

    /// Store a result for a command id, replacing any unread result for
    /// the same id (last write wins), and wake waiters on this session.
    pub fn store_result(&mut self, id: CommandId, result: CommandResult) {
        self.results.insert(id, result);
        self.wake_waiters();
    }

    /// Wake every waiter parked on this session so it re-checks the
    /// pending-result map (and re-resolves the session it waits on).
    pub fn wake_waiters(&self) {
        self.notify.notify_waiters();
    }

    /// Remove and return the result for a command id, if present.
    pub fn take_result(&mut self, id: &CommandId) -> Option<CommandResult> {
        self.results.remove(id)
    }

    /// Refresh the activity timestamp to now.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// True if the session has seen no activity since `cutoff`.
    pub fn idle_since(&self, cutoff: Instant) -> bool {
        self.last_activity < cutoff
    }

    /// Handle waiters use to sleep until a result lands on this session.
    pub fn notify_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.notify)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
