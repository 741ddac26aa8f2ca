//! One-shot round deadline timer for Orbiter.
//!
//! A [`RoundTimer`] arms a single future deadline and delivers a message
//! through an `mpsc` channel when it elapses. Completion is message passing,
//! not a callback: the owning room actor receives the fire through the same
//! command channel as every client-triggered operation, so the end-of-round
//! transition is serialized like everything else and never races room state.
//!
//! # Contract
//!
//! - At most one fire per armed deadline.
//! - [`RoundTimer::arm`] disarms any predecessor first, so re-arming keeps
//!   the at-most-once guarantee across rounds.
//! - [`RoundTimer::disarm`] after the fire is a safe no-op.
//! - A fire whose receiver is gone (room destroyed) is dropped silently —
//!   there is no dangling callback touching freed state.
//! - Dropping the timer disarms it.
//!
//! # Integration
//!
//! ```ignore
//! // Inside the room actor, on start_round:
//! self.timer.arm(
//!     duration,
//!     self.command_tx.clone(),
//!     RoomCommand::RoundElapsed { round: self.round_seq },
//! );
//! ```

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

/// A one-shot deadline that posts a message when it elapses.
///
/// One `RoundTimer` per room actor. Not `Clone` — exactly one owner may
/// arm and disarm it, which is what makes "at most one fire" easy to
/// reason about.
#[derive(Debug, Default)]
pub struct RoundTimer {
    armed: Option<JoinHandle<()>>,
}

impl RoundTimer {
    /// Creates a disarmed timer.
    pub fn new() -> Self {
        Self { armed: None }
    }

    /// Arms the timer: after `delay`, `msg` is sent on `tx`.
    ///
    /// Any previously armed deadline is disarmed first. If the receiving
    /// end of `tx` has been dropped by the time the deadline elapses, the
    /// fire is discarded.
    pub fn arm<M: Send + 'static>(
        &mut self,
        delay: Duration,
        tx: mpsc::Sender<M>,
        msg: M,
    ) {
        self.disarm();
        self.armed = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(msg).await.is_err() {
                trace!("deadline fired after its receiver went away");
            }
        }));
    }

    /// Disarms a pending deadline.
    ///
    /// Safe to call when nothing is armed or after the deadline has
    /// already fired.
    pub fn disarm(&mut self) {
        if let Some(handle) = self.armed.take() {
            handle.abort();
        }
    }

    /// Whether a deadline is currently pending.
    ///
    /// Best-effort: returns `false` once the fire task has completed.
    pub fn is_armed(&self) -> bool {
        self.armed.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for RoundTimer {
    fn drop(&mut self) {
        self.disarm();
    }
}
