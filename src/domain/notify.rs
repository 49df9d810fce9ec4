//! Throttled change-notification bus for store consumers.

use crate::domain::logging::get_time_provider;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Minimum interval between listener fan-outs.
pub const NOTIFY_THROTTLE_MS: u64 = 100;

/// Abstraction over deferred execution so the bus itself stays free of
/// browser APIs. Production uses a `gloo_timers` timeout, tests a manual queue.
pub trait DeferScheduler {
    fn defer(&self, delay_ms: u32, callback: Box<dyn FnOnce()>);
}

struct BusState {
    listeners: Vec<(u64, Rc<dyn Fn()>)>,
    next_id: u64,
    last_notify: u64,
    pending: bool,
}

/// Publish/subscribe bus with burst coalescing.
///
/// Mutations may arrive far faster than consumers can redraw; `notify` fans
/// out immediately when the throttle window has elapsed, otherwise it
/// schedules exactly one deferred flush. Bursts never queue more than one
/// pending notification.
#[derive(Clone)]
pub struct NotificationBus {
    state: Rc<RefCell<BusState>>,
    scheduler: Rc<dyn DeferScheduler>,
    throttle_ms: u64,
}

/// Opaque unsubscribe handle; dropping it removes the listener.
pub struct Subscription {
    state: Weak<RefCell<BusState>>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            state.borrow_mut().listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

impl NotificationBus {
    pub fn new(scheduler: Rc<dyn DeferScheduler>) -> Self {
        Self::with_throttle(scheduler, NOTIFY_THROTTLE_MS)
    }

    pub fn with_throttle(scheduler: Rc<dyn DeferScheduler>, throttle_ms: u64) -> Self {
        Self {
            state: Rc::new(RefCell::new(BusState {
                listeners: Vec::new(),
                next_id: 0,
                last_notify: 0,
                pending: false,
            })),
            scheduler,
            throttle_ms,
        }
    }

    pub fn subscribe(&self, callback: impl Fn() + 'static) -> Subscription {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.listeners.push((id, Rc::new(callback)));
        Subscription { state: Rc::downgrade(&self.state), id }
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    /// Notify listeners, throttled. Callers never need to care whether the
    /// fan-out happens now or at the end of the current throttle window.
    pub fn notify(&self) {
        let now = get_time_provider().current_timestamp();
        let elapsed = now.saturating_sub(self.state.borrow().last_notify);
        if elapsed >= self.throttle_ms {
            self.flush(now);
        } else {
            let mut state = self.state.borrow_mut();
            if !state.pending {
                state.pending = true;
                let remaining = (self.throttle_ms - elapsed) as u32;
                drop(state);
                let bus = self.clone();
                self.scheduler.defer(
                    remaining,
                    Box::new(move || {
                        let now = get_time_provider().current_timestamp();
                        bus.flush(now);
                    }),
                );
            }
        }
    }

    fn flush(&self, now: u64) {
        let callbacks: Vec<Rc<dyn Fn()>> = {
            let mut state = self.state.borrow_mut();
            state.last_notify = now;
            state.pending = false;
            state.listeners.iter().map(|(_, cb)| Rc::clone(cb)).collect()
        };
        // Listeners run outside the borrow: a callback may subscribe/unsubscribe.
        for callback in callbacks {
            callback();
        }
    }
}
