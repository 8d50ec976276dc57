//! Wait coordinator - turns the asynchronous fetch/post handshake into
//! a bounded blocking wait for the submitter.
//!
//! Waiters sleep on the session's notify handle instead of polling on an
//! interval; a post wakes every waiter on that session and each re-checks
//! the pending-result map for its own command id. Pop-on-read is done
//! under the store lock, so a result reaches at most one waiter.

use crate::broker::Broker;
use crate::command::{CommandId, CommandResult};
use crate::session::SessionSelector;
use std::time::Duration;
use tokio::time::Instant;

/// Terminal outcome of one outstanding submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    Fulfilled(CommandResult),
    TimedOut,
}

/// Wait until a result for `id` lands on the resolved session, removing
/// and returning it, or until `timeout` elapses.
///
/// Timing out does not retract the submitted command: it stays fetchable
/// and its eventual result goes unclaimed until the session is reaped.
/// Only the calling task blocks; other sessions' operations and the
/// reaper proceed while this waits.
pub async fn await_result(
    broker: &Broker,
    selector: &SessionSelector,
    id: &CommandId,
    timeout: Duration,
) -> WaitOutcome {
    let deadline = Instant::now() + timeout;

    loop {
        // Resolve the notify handle fresh each round: the session may
        // have been reaped and re-created since the last wake, and
        // eviction wakes parked waiters so they land back here.
        let notify = broker.notify_handle(selector);

        // Register interest before checking the map, so a post landing
        // between the check and the await still wakes us.
        let notified = notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        if let Some(result) = broker.take_result(selector, id) {
            return WaitOutcome::Fulfilled(result);
        }

        if tokio::time::timeout_at(deadline, notified).await.is_err() {
            return WaitOutcome::TimedOut;
        }
    }
}
