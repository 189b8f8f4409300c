//! API clients for the external market-data sources.

pub mod coingecko;

pub use coingecko::fetch_coins_markets;
