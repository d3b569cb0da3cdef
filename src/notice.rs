//! The single user-visible error message and its auto-clear timer.
//!
//! Posting a message (re)starts a timer; when it fires the message disappears.
//! Only one message is visible at a time, so a new post replaces the old one
//! and aborts its timer. A generation counter guards against a timer that
//! already woke up clearing a newer message.

use crate::progress::Observer;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

#[derive(Default)]
struct Slot {
    message: Option<String>,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl Slot {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds at most one transient error message.
///
/// Timers are spawned on the ambient tokio runtime. Outside a runtime a
/// posted message stays until [`NoticeBoard::clear`] is called. Dropping the
/// board aborts any pending timer.
pub struct NoticeBoard {
    slot: Arc<Mutex<Slot>>,
    display_for: Duration,
    observer: Observer,
}

impl NoticeBoard {
    pub fn new(display_for: Duration, observer: Observer) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            display_for,
            observer,
        }
    }

    pub fn display_for(&self) -> Duration {
        self.display_for
    }

    /// Show `message`, replacing any current one and restarting the timer.
    pub fn post(&self, message: impl Into<String>) {
        let message = message.into();
        {
            let mut slot = lock(&self.slot);
            slot.cancel_timer();
            slot.generation += 1;
            slot.message = Some(message.clone());
            slot.timer = self.schedule_clear(slot.generation);
        }
        self.observer.on_error(&message);
    }

    /// Remove the current message, if any, and cancel its timer.
    pub fn clear(&self) {
        let had_message = {
            let mut slot = lock(&self.slot);
            slot.cancel_timer();
            slot.generation += 1;
            slot.message.take().is_some()
        };
        if had_message {
            self.observer.on_error_cleared();
        }
    }

    pub fn current(&self) -> Option<String> {
        lock(&self.slot).message.clone()
    }

    pub fn is_visible(&self) -> bool {
        lock(&self.slot).message.is_some()
    }

    fn schedule_clear(&self, generation: u64) -> Option<JoinHandle<()>> {
        let handle = Handle::try_current().ok()?;
        let slot = Arc::downgrade(&self.slot);
        let observer = Arc::clone(&self.observer);
        let delay = self.display_for;

        Some(handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(slot) = slot.upgrade() else {
                return;
            };
            let cleared = {
                let mut slot = lock(&slot);
                if slot.generation == generation && slot.message.is_some() {
                    slot.message = None;
                    slot.timer = None;
                    true
                } else {
                    false
                }
            };
            if cleared {
                observer.on_error_cleared();
            }
        }))
    }
}

impl Drop for NoticeBoard {
    fn drop(&mut self) {
        lock(&self.slot).cancel_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{ConversionObserver, NoopObserver};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn board(secs: u64) -> NoticeBoard {
        NoticeBoard::new(Duration::from_secs(secs), Arc::new(NoopObserver))
    }

    #[tokio::test(start_paused = true)]
    async fn message_clears_after_display_window() {
        let b = board(5);
        b.post("boom");
        assert_eq!(b.current().as_deref(), Some("boom"));

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert!(b.is_visible());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!b.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn new_post_restarts_the_window() {
        let b = board(5);
        b.post("first");
        tokio::time::sleep(Duration::from_secs(3)).await;
        b.post("second");

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(b.current().as_deref(), Some("second"));

        tokio::time::sleep(Duration::from_millis(2_100)).await;
        assert_eq!(b.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_clear_cancels_timer() {
        #[derive(Default)]
        struct Cleared(AtomicUsize);
        impl ConversionObserver for Cleared {
            fn on_error_cleared(&self) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let obs = Arc::new(Cleared::default());
        let b = NoticeBoard::new(Duration::from_secs(5), obs.clone());
        b.post("gone soon");
        b.clear();
        assert!(!b.is_visible());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(obs.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn without_runtime_message_persists() {
        let b = board(1);
        b.post("sticky");
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(b.current().as_deref(), Some("sticky"));
        b.clear();
        assert_eq!(b.current(), None);
    }
}
