//! Durable per-pair persistence for viewport state and drawings, keyed by
//! pair symbol in browser local storage.

use crate::domain::chart::drawings::DrawingObject;
use crate::domain::chart::viewport::ViewportState;
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::PairSymbol;
use gloo::storage::{LocalStorage, Storage};

pub struct ChartStorage;

impl ChartStorage {
    fn viewport_key(pair: &PairSymbol) -> String {
        format!("chart_view_{}", pair.storage_key())
    }

    fn drawings_key(pair: &PairSymbol) -> String {
        format!("chart_drawings_{}", pair.storage_key())
    }

    /// Load the saved viewport for a pair, defaulting on miss or parse error
    pub fn load_viewport(pair: &PairSymbol) -> ViewportState {
        LocalStorage::get(Self::viewport_key(pair)).unwrap_or_default()
    }

    pub fn save_viewport(pair: &PairSymbol, viewport: &ViewportState) {
        if let Err(e) = LocalStorage::set(Self::viewport_key(pair), viewport) {
            get_logger().warn(
                LogComponent::Infrastructure("Storage"),
                &format!("Failed to persist viewport for {}: {:?}", pair, e),
            );
        }
    }

    /// Load the drawing list for a pair; corrupt payloads come back empty
    pub fn load_drawings(pair: &PairSymbol) -> Vec<DrawingObject> {
        LocalStorage::get(Self::drawings_key(pair)).unwrap_or_default()
    }

    pub fn save_drawings(pair: &PairSymbol, drawings: &[DrawingObject]) {
        if let Err(e) = LocalStorage::set(Self::drawings_key(pair), drawings) {
            get_logger().warn(
                LogComponent::Infrastructure("Storage"),
                &format!("Failed to persist drawings for {}: {:?}", pair, e),
            );
        }
    }

    pub fn clear_drawings(pair: &PairSymbol) {
        LocalStorage::delete(Self::drawings_key(pair));
    }
}
