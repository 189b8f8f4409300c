//! Data structures shared between the API client and the UI.

pub mod market;

pub use market::{Currency, MarketCapOrdering, MarketRecord, MarketsQuery, Roi, PAGE_SIZES};
