use super::MarketService;
use crate::domain::notify::NotificationBus;
use crate::infrastructure::services::TimeoutScheduler;
use std::cell::RefCell;
use std::rc::Rc;

thread_local! {
    static SERVICE: RefCell<Option<MarketService>> = const { RefCell::new(None) };
}

/// Global service accessor, created on first use. Single-threaded WASM:
/// thread-local is the whole story.
pub fn market_service() -> MarketService {
    SERVICE.with(|slot| {
        let mut slot = slot.borrow_mut();
        if let Some(service) = slot.as_ref() {
            service.clone()
        } else {
            let bus = NotificationBus::new(Rc::new(TimeoutScheduler));
            let service = MarketService::new(bus);
            *slot = Some(service.clone());
            service
        }
    })
}
