//! Ctrl+C delivery into the async session.

use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    flag: AtomicBool,
    streaming: AtomicBool,
    notify: Notify,
}

/// A cloneable interrupt flag that can also be awaited.
///
/// [`Interrupt::trigger`] is safe to call from a signal-handler thread.  The
/// session races [`Interrupt::triggered`] against the next response fragment,
/// so a stalled stream still unwinds promptly.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    inner: Arc<Inner>,
}

impl Interrupt {
    /// Creates an untriggered interrupt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag and wakes every waiter.
    pub fn trigger(&self) {
        self.inner.flag.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Returns true once [`Interrupt::trigger`] has been called since the last reset.
    pub fn is_triggered(&self) -> bool {
        self.inner.flag.load(Ordering::SeqCst)
    }

    /// Lowers the flag.
    pub fn reset(&self) {
        self.inner.flag.store(false, Ordering::SeqCst);
    }

    /// Marks whether a turn is in flight and can be unwound by [`Interrupt::trigger`].
    ///
    /// Outside a turn nothing awaits the flag, so a signal handler should end
    /// the process instead.
    pub fn set_streaming(&self, streaming: bool) {
        self.inner.streaming.store(streaming, Ordering::SeqCst);
    }

    /// Returns true while a turn is in flight.
    pub fn is_streaming(&self) -> bool {
        self.inner.streaming.load(Ordering::SeqCst)
    }

    /// Completes when the flag is raised; immediately if it already is.
    pub async fn triggered(&self) {
        loop {
            let mut notified = pin!(self.inner.notify.notified());
            // register before checking the flag so a concurrent trigger is not missed
            notified.as_mut().enable();
            if self.is_triggered() {
                return;
            }
            notified.await;
        }
    }
}
