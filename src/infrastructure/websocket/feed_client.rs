use super::dto::{FeedMessage, parse_feed_message};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::PairSymbol;
use futures::StreamExt;
use futures::future::{AbortHandle, Abortable};
use gloo_net::websocket::{Message, futures::WebSocket};
use wasm_bindgen_futures::spawn_local;

/// Push-feed endpoint
pub const FEED_WS_BASE: &str = "wss://price.orcaamr.com/ws";

/// Market data WebSocket client based on gloo
pub struct MarketFeedClient {
    pair: PairSymbol,
    base_url: String,
}

/// Handle to a spawned stream task; aborting it tears the stream down so a
/// pair switch never leaves a second writer alive.
pub struct FeedHandle {
    abort: AbortHandle,
    pair: PairSymbol,
}

impl FeedHandle {
    pub fn pair(&self) -> &PairSymbol {
        &self.pair
    }

    pub fn abort(self) {
        get_logger().info(
            LogComponent::Infrastructure("MarketFeed"),
            &format!("🛑 Feed stream for {} aborted", self.pair),
        );
        self.abort.abort();
    }
}

impl MarketFeedClient {
    pub fn new(pair: PairSymbol) -> Self {
        Self { pair, base_url: FEED_WS_BASE.to_string() }
    }

    pub fn with_base_url(pair: PairSymbol, base_url: &str) -> Self {
        Self { pair, base_url: base_url.to_string() }
    }

    /// Connect to the per-pair stream
    async fn connect(&self) -> Result<WebSocket, String> {
        let url = format!("{}?symbol={}", self.base_url, self.pair.value());

        get_logger().info(
            LogComponent::Infrastructure("MarketFeed"),
            &format!("🔌 Connecting to feed: {url}"),
        );

        let ws = WebSocket::open(&url).map_err(|e| format!("Failed to open WebSocket: {e:?}"))?;

        get_logger().info(
            LogComponent::Infrastructure("MarketFeed"),
            &format!("✅ Feed connected for {}", self.pair),
        );

        Ok(ws)
    }

    /// Spawn the stream loop as an abortable task.
    ///
    /// `handler` receives every parsed message; `on_status` reports socket
    /// availability so the polling fallback can stand down while the push
    /// channel is open.
    pub fn spawn<F, S>(self, handler: F, on_status: S) -> FeedHandle
    where
        F: FnMut(FeedMessage) + 'static,
        S: FnMut(bool) + 'static,
    {
        let pair = self.pair.clone();
        let (abort_handle, abort_registration) = AbortHandle::new_pair();
        let stream_future = Abortable::new(self.run_stream(handler, on_status), abort_registration);
        spawn_local(async move {
            // Err(Aborted) is the expected teardown path on pair switch
            let _ = stream_future.await;
        });
        FeedHandle { abort: abort_handle, pair }
    }

    /// Reconnecting message loop with exponential backoff
    async fn run_stream<F, S>(self, mut handler: F, mut on_status: S)
    where
        F: FnMut(FeedMessage) + 'static,
        S: FnMut(bool) + 'static,
    {
        use gloo_timers::future::sleep;
        use std::time::Duration;

        let mut delay = 1u64;
        loop {
            let mut stream = match self.connect().await {
                Ok(ws) => {
                    delay = 1;
                    on_status(true);
                    ws
                }
                Err(e) => {
                    get_logger().error(
                        LogComponent::Infrastructure("MarketFeed"),
                        &format!("❌ Connection error: {e}"),
                    );
                    on_status(false);
                    sleep(Duration::from_secs(delay)).await;
                    delay = (delay * 2).min(32);
                    continue;
                }
            };

            while let Some(msg) = stream.next().await {
                match msg {
                    Ok(Message::Text(data)) => match parse_feed_message(&data) {
                        Ok(message) => handler(message),
                        Err(reason) => {
                            // Malformed frames are dropped, state unchanged
                            get_logger().debug(
                                LogComponent::Infrastructure("MarketFeed"),
                                &format!("Dropped feed frame: {reason}"),
                            );
                        }
                    },
                    Ok(Message::Bytes(_)) => {}
                    Err(e) => {
                        get_logger().warn(
                            LogComponent::Infrastructure("MarketFeed"),
                            &format!("⚠️ Feed stream error: {e:?}"),
                        );
                        break;
                    }
                }
            }

            get_logger().warn(
                LogComponent::Infrastructure("MarketFeed"),
                &format!("🔄 Feed disconnected for {}, reconnecting in {delay}s...", self.pair),
            );
            on_status(false);
            sleep(Duration::from_secs(delay)).await;
            delay = (delay * 2).min(32);
        }
    }
}
