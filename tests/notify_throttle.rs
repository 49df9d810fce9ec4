#![cfg(not(target_arch = "wasm32"))]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use trade_chart_wasm::domain::logging::{TimeProvider, init_time_provider};
use trade_chart_wasm::domain::notify::{DeferScheduler, NOTIFY_THROTTLE_MS, NotificationBus};

/// Hand-cranked clock installed as the global time provider
static CLOCK_MS: AtomicU64 = AtomicU64::new(0);

struct TestClock;

impl TimeProvider for TestClock {
    fn current_timestamp(&self) -> u64 {
        CLOCK_MS.load(Ordering::SeqCst)
    }

    fn format_timestamp(&self, timestamp: u64) -> String {
        format!("{timestamp}")
    }
}

/// Serializes the tests sharing the process-global clock
static CLOCK_GUARD: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Captures deferred callbacks instead of arming real timers
#[derive(Default)]
struct ManualScheduler {
    queue: RefCell<Vec<(u32, Box<dyn FnOnce()>)>>,
}

impl DeferScheduler for ManualScheduler {
    fn defer(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) {
        self.queue.borrow_mut().push((delay_ms, callback));
    }
}

fn fire_all(scheduler: &Rc<ManualScheduler>) -> usize {
    let pending: Vec<_> = scheduler.queue.borrow_mut().drain(..).collect();
    let count = pending.len();
    for (_, callback) in pending {
        callback();
    }
    count
}

/// One sequential scenario: the clock is process-global, so every phase of
/// the throttle contract is exercised in order inside a single test.
#[test]
fn bus_throttles_and_coalesces() {
    let _guard = CLOCK_GUARD.lock().unwrap();
    init_time_provider(Box::new(TestClock));
    let scheduler = Rc::new(ManualScheduler::default());
    let bus = NotificationBus::new(Rc::clone(&scheduler) as Rc<dyn DeferScheduler>);

    let delivered = Rc::new(RefCell::new(0u32));
    let counter = Rc::clone(&delivered);
    let subscription = bus.subscribe(move || *counter.borrow_mut() += 1);

    // Quiet start: the throttle window has long elapsed, fan-out is immediate
    CLOCK_MS.store(1_000, Ordering::SeqCst);
    bus.notify();
    assert_eq!(*delivered.borrow(), 1);
    assert_eq!(fire_all(&scheduler), 0);

    // A burst inside the window coalesces into exactly one deferred flush
    CLOCK_MS.store(1_010, Ordering::SeqCst);
    bus.notify();
    bus.notify();
    bus.notify();
    assert_eq!(*delivered.borrow(), 1, "burst must not fan out early");
    assert_eq!(scheduler.queue.borrow().len(), 1, "exactly one deferred flush");

    // The deferred flush fires at the end of the window
    CLOCK_MS.store(1_000 + NOTIFY_THROTTLE_MS, Ordering::SeqCst);
    assert_eq!(fire_all(&scheduler), 1);
    assert_eq!(*delivered.borrow(), 2);

    // After the flush the pending flag is clear: a later notify is immediate
    CLOCK_MS.store(5_000, Ordering::SeqCst);
    bus.notify();
    assert_eq!(*delivered.borrow(), 3);

    // Dropping the subscription stops delivery
    drop(subscription);
    CLOCK_MS.store(10_000, Ordering::SeqCst);
    bus.notify();
    assert_eq!(*delivered.borrow(), 3);
    assert_eq!(bus.listener_count(), 0);
}

#[test]
fn multiple_subscribers_each_receive_the_fanout() {
    let _guard = CLOCK_GUARD.lock().unwrap();
    init_time_provider(Box::new(TestClock));
    let scheduler = Rc::new(ManualScheduler::default());
    let bus = NotificationBus::new(Rc::clone(&scheduler) as Rc<dyn DeferScheduler>);

    let first = Rc::new(RefCell::new(0u32));
    let second = Rc::new(RefCell::new(0u32));
    let a = Rc::clone(&first);
    let b = Rc::clone(&second);
    let _sub_a = bus.subscribe(move || *a.borrow_mut() += 1);
    let _sub_b = bus.subscribe(move || *b.borrow_mut() += 1);

    // Far enough in the future to be outside any window the other test used
    CLOCK_MS.fetch_add(100_000, Ordering::SeqCst);
    bus.notify();

    assert_eq!(*first.borrow(), 1);
    assert_eq!(*second.borrow(), 1);
}
