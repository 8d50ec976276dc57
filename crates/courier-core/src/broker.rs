//! Broker - the rendezvous engine matching submitted commands to
//! posted results.
//!
//! Submit enqueues and returns immediately; Fetch and Post are the agent
//! side of the handshake. The synchronous-looking request/response a
//! submitter sees is reconstructed on top of these by [`crate::wait`].

use crate::command::{Command, CommandId, CommandResult, CommandSpec, SubmitError};
use crate::session::{SessionSelector, SessionStore};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::sync::Notify;

/// Thread-safe rendezvous engine over a [`SessionStore`].
///
/// A single lock guards the whole store; every critical section is short
/// and never spans an await point, so waiters and the reaper interleave
/// freely with submit/fetch/post.
pub struct Broker {
    store: Mutex<SessionStore>,
}

impl Broker {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(SessionStore::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionStore> {
        // Keep serving even if a previous holder panicked.
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Validate a spec, assign it a fresh id, and enqueue it on the
    /// resolved session. Returns the id without waiting for a result.
    pub fn submit(
        &self,
        selector: &SessionSelector,
        spec: CommandSpec,
    ) -> Result<CommandId, SubmitError> {
        spec.validate()?;
        let command = Command::from_spec(spec);
        let id = command.id.clone();

        let mut store = self.lock();
        let session = store.get_or_create(selector);
        if matches!(selector, SessionSelector::Keyed(_)) {
            session.touch();
        }
        session.enqueue(command);

        log::debug!("submit: queued {} on {:?}", id, selector);
        Ok(id)
    }

    /// Pop the oldest unfetched command for the resolved session.
    ///
    /// Unknown keys get an empty session rather than an error. A fetched
    /// command leaves the queue for good and is never re-delivered.
    pub fn fetch(&self, selector: &SessionSelector) -> Option<Command> {
        let mut store = self.lock();
        let session = store.get_or_create(selector);
        if matches!(selector, SessionSelector::Keyed(_)) {
            session.touch();
        }
        let command = session.pop_command();
        if let Some(ref command) = command {
            log::debug!("fetch: handed out {} from {:?}", command.id, selector);
        }
        command
    }

    /// Store a result under a command id, overwriting any unread result
    /// for the same id, and wake waiters on that session.
    ///
    /// The id is not checked against commands actually issued; a result
    /// for an unknown id simply sits unclaimed until the session is
    /// reaped or a waiter picks it up.
    pub fn post(&self, selector: &SessionSelector, id: CommandId, result: CommandResult) {
        let mut store = self.lock();
        let session = store.get_or_create(selector);
        if matches!(selector, SessionSelector::Keyed(_)) {
            session.touch();
        }
        log::debug!("post: result for {} on {:?}", id, selector);
        session.store_result(id, result);
    }

    /// Remove and return the result for a command id, if one is pending.
    ///
    /// This is the pop-on-read primitive behind [`crate::wait::await_result`];
    /// it does not refresh session activity and does not create sessions.
    pub fn take_result(
        &self,
        selector: &SessionSelector,
        id: &CommandId,
    ) -> Option<CommandResult> {
        self.lock().get(selector)?.take_result(id)
    }

    /// Notify handle of the resolved session, creating it if absent.
    ///
    /// Waiters must park on the same session a later post will resolve,
    /// so this creates rather than returning nothing when the session
    /// was reaped out from under a wait in progress. Does not refresh
    /// activity: a waiter alone does not keep a session alive.
    pub(crate) fn notify_handle(&self, selector: &SessionSelector) -> Arc<Notify> {
        self.lock().get_or_create(selector).notify_handle()
    }

    /// Evict every keyed session idle for longer than `idle_threshold`,
    /// discarding its queue and unclaimed results. Returns how many
    /// sessions were dropped. The default session is never considered.
    pub fn sweep_idle(&self, idle_threshold: Duration) -> usize {
        let cutoff = match Instant::now().checked_sub(idle_threshold) {
            Some(cutoff) => cutoff,
            // Threshold reaches past process start; nothing can be idle yet.
            None => return 0,
        };

        let mut store = self.lock();
        let idle = store.idle_keys(cutoff);
        for key in &idle {
            store.evict(key);
        }
        idle.len()
    }

    /// Number of keyed sessions currently alive (diagnostics and tests).
    pub fn keyed_sessions(&self) -> usize {
        self.lock().keyed_count()
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new()
    }
}
