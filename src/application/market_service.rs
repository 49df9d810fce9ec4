//! Application service wiring the market store to its data sources: the
//! push feed, the REST polling fallback, and the notification bus.

use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::{
    MarketDataStore, MarketSnapshot, PairConfig, PairSymbol, Timeframe,
};
use crate::domain::notify::{NotificationBus, Subscription};
use crate::infrastructure::http::MarketRestClient;
use crate::infrastructure::websocket::{FeedHandle, FeedMessage, MarketFeedClient};
use gloo_timers::callback::Interval;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;

/// Polling cadence while the push channel is down
pub const REFRESH_RATE_MS: u32 = 1000;

/// Default market shown before any user selection
pub const DEFAULT_PAIR: &str = "AMR/NVR";

struct ServiceInner {
    store: RefCell<MarketDataStore>,
    bus: NotificationBus,
    rest: MarketRestClient,
    feed: RefCell<Option<FeedHandle>>,
    feed_open: Cell<bool>,
    poll: RefCell<Option<Interval>>,
    /// Bumped on every pair switch; async completions from an older epoch
    /// are discarded instead of resurrecting stale state.
    epoch: Cell<u64>,
}

#[derive(Clone)]
pub struct MarketService {
    inner: Rc<ServiceInner>,
}

impl MarketService {
    pub fn new(bus: NotificationBus) -> Self {
        Self::with_rest_client(bus, MarketRestClient::new())
    }

    pub fn with_rest_client(bus: NotificationBus, rest: MarketRestClient) -> Self {
        Self {
            inner: Rc::new(ServiceInner {
                store: RefCell::new(MarketDataStore::new(
                    PairSymbol::from(DEFAULT_PAIR),
                    Timeframe::OneMinute,
                )),
                bus,
                rest,
                feed: RefCell::new(None),
                feed_open: Cell::new(false),
                poll: RefCell::new(None),
                epoch: Cell::new(0),
            }),
        }
    }

    pub fn pair(&self) -> PairSymbol {
        self.inner.store.borrow().pair().clone()
    }

    pub fn timeframe(&self) -> Timeframe {
        self.inner.store.borrow().timeframe()
    }

    pub fn pair_config(&self) -> &'static PairConfig {
        self.inner.store.borrow().pair_config()
    }

    pub fn subscribe(&self, callback: impl Fn() + 'static) -> Subscription {
        self.inner.bus.subscribe(callback)
    }

    /// Whether the push channel is currently open (polling stands down)
    pub fn is_feed_open(&self) -> bool {
        self.inner.feed_open.get()
    }

    pub fn snapshot(&self) -> MarketSnapshot {
        self.inner.store.borrow().snapshot()
    }

    /// Read-only access for render paths that want to avoid a full clone
    pub fn with_store<R>(&self, f: impl FnOnce(&MarketDataStore) -> R) -> R {
        f(&self.inner.store.borrow())
    }

    /// Boot the engine: load the default pair and start the polling timer
    pub fn start(&self) {
        get_logger().info(
            LogComponent::Application("MarketService"),
            &format!("🚀 Starting market engine for {}", self.pair()),
        );
        self.switch_sources(self.pair());
        self.start_polling();
    }

    /// Stop timers and the feed; the store keeps its last-known-good state
    pub fn stop(&self) {
        if let Some(handle) = self.inner.feed.borrow_mut().take() {
            handle.abort();
        }
        self.inner.feed_open.set(false);
        *self.inner.poll.borrow_mut() = None;
    }

    /// Switch the active pair: tear down the old channel, clear all per-pair
    /// state, then open fresh sources.
    pub fn set_pair(&self, pair: PairSymbol) {
        get_logger().info(
            LogComponent::Application("MarketService"),
            &format!("🔄 Switching pair to {pair}"),
        );
        self.switch_sources(pair);
    }

    /// Switch the candle bucket duration; history is refetched wholesale
    pub fn set_timeframe(&self, timeframe: Timeframe) {
        self.inner.store.borrow_mut().set_timeframe(timeframe);
        self.fetch_history(self.inner.epoch.get());
        self.inner.bus.notify();
    }

    /// Apply one parsed feed message to the store. Synchronous: exactly one
    /// logical writer mutates state at a time.
    pub fn apply_feed_message(&self, message: FeedMessage) {
        {
            let mut store = self.inner.store.borrow_mut();
            match message {
                FeedMessage::Depth { bid_updates, ask_updates } => {
                    store.apply_depth_diff(&bid_updates, &ask_updates);
                }
                FeedMessage::Trade(trade) => {
                    store.apply_trade(trade);
                }
                FeedMessage::Ticker(fields) => {
                    let symbol = store.pair().clone();
                    store.set_ticker(fields.into_ticker(symbol));
                }
            }
        }
        self.inner.bus.notify();
    }

    fn switch_sources(&self, pair: PairSymbol) {
        let epoch = self.inner.epoch.get() + 1;
        self.inner.epoch.set(epoch);

        if let Some(handle) = self.inner.feed.borrow_mut().take() {
            handle.abort();
        }
        self.inner.feed_open.set(false);
        self.inner.store.borrow_mut().reset(pair.clone());

        self.fetch_history(epoch);
        self.connect_feed(pair, epoch);
        self.inner.bus.notify();
    }

    fn fetch_history(&self, epoch: u64) {
        let service = self.clone();
        let pair = self.pair();
        let timeframe = self.timeframe();
        spawn_local(async move {
            match service.inner.rest.get_klines(&pair, timeframe).await {
                Ok(candles) => {
                    if service.inner.epoch.get() != epoch {
                        return; // pair switched while the fetch was in flight
                    }
                    service.inner.store.borrow_mut().set_history(candles);
                    service.inner.bus.notify();
                }
                Err(e) => {
                    // Transient: the polling tick retries
                    get_logger().warn(
                        LogComponent::Application("MarketService"),
                        &format!("⚠️ History fetch failed for {pair}: {e}"),
                    );
                }
            }
        });
    }

    fn connect_feed(&self, pair: PairSymbol, epoch: u64) {
        let client = MarketFeedClient::new(pair);
        let message_service = self.clone();
        let status_service = self.clone();
        let handle = client.spawn(
            move |message| {
                if message_service.inner.epoch.get() == epoch {
                    message_service.apply_feed_message(message);
                }
            },
            move |open| {
                if status_service.inner.epoch.get() == epoch {
                    status_service.inner.feed_open.set(open);
                }
            },
        );
        *self.inner.feed.borrow_mut() = Some(handle);
    }

    fn start_polling(&self) {
        let service = self.clone();
        let interval = Interval::new(REFRESH_RATE_MS, move || service.poll_tick());
        *self.inner.poll.borrow_mut() = Some(interval);
    }

    /// One timer tick: REST refresh only while the push channel is closed,
    /// then indicator recompute and a (throttled) notification.
    fn poll_tick(&self) {
        if !self.inner.feed_open.get() {
            self.fetch_rest_data(self.inner.epoch.get());
        }
        self.inner.store.borrow_mut().recompute_indicators();
        self.inner.bus.notify();
    }

    fn fetch_rest_data(&self, epoch: u64) {
        let service = self.clone();
        let pair = self.pair();
        spawn_local(async move {
            let rest = &service.inner.rest;
            let depth = rest.get_depth(&pair).await;
            let ticker = rest.get_ticker(&pair).await;
            let trades = rest.get_trades(&pair).await;

            if service.inner.epoch.get() != epoch {
                return;
            }
            let mut changed = false;
            {
                let mut store = service.inner.store.borrow_mut();
                if let Ok((bids, asks)) = depth {
                    store.set_depth_snapshot(&bids, &asks);
                    changed = true;
                }
                if let Ok(ticker) = ticker {
                    store.set_ticker(ticker);
                    changed = true;
                }
                if let Ok(trades) = trades {
                    store.set_trades(trades);
                    changed = true;
                }
            }
            if changed {
                service.inner.bus.notify();
            }
        });
    }
}
