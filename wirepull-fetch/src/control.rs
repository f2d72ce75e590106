//! Cooperative pause/cancel control.
//!
//! The run loop and the UI live on different tasks, so pause/resume/cancel
//! travel over a `watch` channel. Waiting for a resume awaits a channel
//! change instead of polling a flag, which also makes pause-then-cancel
//! ordering deterministic: a cancel always wins, even mid-pause.

use tokio::sync::watch;

/// Control state for one run.
///
/// `Paused` blocks progression at the next await point but still admits
/// cancellation. `Cancelled` is terminal for the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ControlState {
    /// The run may proceed.
    #[default]
    Running,
    /// The run holds at the next chunk/page boundary.
    Paused,
    /// The run stops at the next chunk/page boundary.
    Cancelled,
}

/// Marker error: the run was cancelled while waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

/// Cloneable handle controlling one run.
///
/// Pause and resume take effect at the next await point between pages or
/// chunks; an in-flight network call always runs to completion.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    tx: watch::Sender<ControlState>,
}

impl ControlHandle {
    /// Creates a handle in the `Running` state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ControlState::Running);
        Self { tx }
    }

    /// Returns the current state.
    pub fn state(&self) -> ControlState {
        *self.tx.borrow()
    }

    /// Returns true once the run has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.state() == ControlState::Cancelled
    }

    /// Requests a pause. No effect after cancellation.
    pub fn pause(&self) {
        self.tx.send_if_modified(|state| {
            if *state == ControlState::Running {
                *state = ControlState::Paused;
                true
            } else {
                false
            }
        });
    }

    /// Lifts a pause. No effect after cancellation.
    pub fn resume(&self) {
        self.tx.send_if_modified(|state| {
            if *state == ControlState::Paused {
                *state = ControlState::Running;
                true
            } else {
                false
            }
        });
    }

    /// Cancels the run permanently.
    pub fn cancel(&self) {
        self.tx.send_if_modified(|state| {
            if *state == ControlState::Cancelled {
                false
            } else {
                *state = ControlState::Cancelled;
                true
            }
        });
    }

    /// Rearms the handle for a fresh run.
    pub fn reset(&self) {
        self.tx.send_replace(ControlState::Running);
    }

    /// Waits until the run may proceed.
    ///
    /// Returns immediately while `Running`; while `Paused`, awaits a state
    /// change. Errors with [`Cancelled`] as soon as cancellation is
    /// observed, including cancellation arriving during a pause.
    pub async fn wait_if_paused(&self) -> Result<(), Cancelled> {
        let mut rx = self.tx.subscribe();
        loop {
            let state = *rx.borrow_and_update();
            match state {
                ControlState::Running => return Ok(()),
                ControlState::Cancelled => return Err(Cancelled),
                ControlState::Paused => {
                    if rx.changed().await.is_err() {
                        // Sender dropped; treat as cancellation.
                        return Err(Cancelled);
                    }
                }
            }
        }
    }
}

impl Default for ControlHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_running_passes_through() {
        let control = ControlHandle::new();
        assert_eq!(control.wait_if_paused().await, Ok(()));
    }

    #[tokio::test]
    async fn test_resume_releases_wait() {
        let control = ControlHandle::new();
        control.pause();

        let waiter = control.clone();
        let handle = tokio::spawn(async move { waiter.wait_if_paused().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        control.resume();
        assert_eq!(handle.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn test_cancel_during_pause_wins() {
        let control = ControlHandle::new();
        control.pause();

        let waiter = control.clone();
        let handle = tokio::spawn(async move { waiter.wait_if_paused().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        control.cancel();
        assert_eq!(handle.await.unwrap(), Err(Cancelled));
    }

    #[tokio::test]
    async fn test_cancel_is_terminal() {
        let control = ControlHandle::new();
        control.cancel();
        control.resume();
        control.pause();
        assert!(control.is_cancelled());
        assert_eq!(control.wait_if_paused().await, Err(Cancelled));
    }
}
