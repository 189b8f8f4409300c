//! Typed view of the CoinGecko `/coins/markets` payload and the query
//! parameters that drive it.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Quote currency for prices and caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    Usd,
    Eur,
}

impl Currency {
    /// Value expected by the API (`vs_currency` parameter).
    pub fn api_value(self) -> &'static str {
        match self {
            Currency::Usd => "usd",
            Currency::Eur => "eur",
        }
    }

    /// Symbol prefixed to rendered prices.
    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }

    /// Switches between the two supported currencies.
    pub fn toggled(self) -> Self {
        match self {
            Currency::Usd => Currency::Eur,
            Currency::Eur => Currency::Usd,
        }
    }
}

/// Result ordering for the markets endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketCapOrdering {
    MarketCapDesc,
    MarketCapAsc,
}

impl MarketCapOrdering {
    /// Value expected by the API (`order` parameter).
    pub fn api_value(self) -> &'static str {
        match self {
            MarketCapOrdering::MarketCapDesc => "market_cap_desc",
            MarketCapOrdering::MarketCapAsc => "market_cap_asc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MarketCapOrdering::MarketCapDesc => "market cap ↓",
            MarketCapOrdering::MarketCapAsc => "market cap ↑",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            MarketCapOrdering::MarketCapDesc => MarketCapOrdering::MarketCapAsc,
            MarketCapOrdering::MarketCapAsc => MarketCapOrdering::MarketCapDesc,
        }
    }
}

/// User-controlled parameters of a markets fetch.
///
/// Always fully populated; mutated as a whole by the control handlers
/// and passed by value to the API client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketsQuery {
    pub vs_currency: Currency,
    pub order: MarketCapOrdering,
    pub page: u32,
    pub per_page: u32,
}

/// Page sizes the UI cycles through.
pub const PAGE_SIZES: [u32; 4] = [10, 25, 50, 100];

impl Default for MarketsQuery {
    fn default() -> Self {
        Self {
            vs_currency: Currency::Usd,
            order: MarketCapOrdering::MarketCapAsc,
            page: 1,
            per_page: PAGE_SIZES[0],
        }
    }
}

impl MarketsQuery {
    /// The four query pairs in their canonical order. The client adds
    /// the fixed `sparkline=false` pair on top of these.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("vs_currency", self.vs_currency.api_value().to_string()),
            ("order", self.order.api_value().to_string()),
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
        ]
    }

    /// Next page size in the fixed cycle (10 → 25 → 50 → 100 → 10).
    pub fn next_page_size(&self) -> u32 {
        let pos = PAGE_SIZES.iter().position(|&s| s == self.per_page);
        match pos {
            Some(i) => PAGE_SIZES[(i + 1) % PAGE_SIZES.len()],
            None => PAGE_SIZES[0],
        }
    }
}

/// Return-on-investment block, present on a handful of assets only.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Roi {
    pub times: f64,
    pub currency: String,
    pub percentage: f64,
}

/// One asset's market snapshot as returned by `/coins/markets`.
///
/// Field order matches the API payload; extra fields the API may add
/// are ignored. Nullable API fields are `Option`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MarketRecord {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub image: String,
    pub current_price: f64,
    pub market_cap: f64,
    pub market_cap_rank: Option<u32>,
    pub fully_diluted_valuation: Option<f64>,
    pub total_volume: f64,
    pub high_24h: Option<f64>,
    pub low_24h: Option<f64>,
    pub price_change_24h: f64,
    pub price_change_percentage_24h: f64,
    pub market_cap_change_24h: f64,
    pub market_cap_change_percentage_24h: f64,
    pub circulating_supply: f64,
    pub total_supply: Option<f64>,
    pub max_supply: Option<f64>,
    pub ath: f64,
    pub ath_change_percentage: f64,
    pub ath_date: DateTime<Utc>,
    pub atl: f64,
    pub atl_change_percentage: f64,
    pub atl_date: DateTime<Utc>,
    pub roi: Option<Roi>,
    pub last_updated: DateTime<Utc>,
}

fn fmt_opt_f64(v: Option<f64>) -> String {
    match v {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

impl MarketRecord {
    /// Every field except `image`, as `(label, value)` pairs with
    /// underscores de-slugified into spaces, in declaration order.
    /// The image URL is surfaced separately by the detail view.
    pub fn detail_fields(&self) -> Vec<(&'static str, String)> {
        let roi = match &self.roi {
            Some(roi) => format!(
                "{:.2}x {} ({:.2}%)",
                roi.times, roi.currency, roi.percentage
            ),
            None => "-".to_string(),
        };

        vec![
            ("id", self.id.clone()),
            ("symbol", self.symbol.clone()),
            ("name", self.name.clone()),
            ("current price", self.current_price.to_string()),
            ("market cap", self.market_cap.to_string()),
            (
                "market cap rank",
                match self.market_cap_rank {
                    Some(rank) => rank.to_string(),
                    None => "-".to_string(),
                },
            ),
            (
                "fully diluted valuation",
                fmt_opt_f64(self.fully_diluted_valuation),
            ),
            ("total volume", self.total_volume.to_string()),
            ("high 24h", fmt_opt_f64(self.high_24h)),
            ("low 24h", fmt_opt_f64(self.low_24h)),
            ("price change 24h", self.price_change_24h.to_string()),
            (
                "price change percentage 24h",
                self.price_change_percentage_24h.to_string(),
            ),
            (
                "market cap change 24h",
                self.market_cap_change_24h.to_string(),
            ),
            (
                "market cap change percentage 24h",
                self.market_cap_change_percentage_24h.to_string(),
            ),
            (
                "circulating supply",
                self.circulating_supply.to_string(),
            ),
            ("total supply", fmt_opt_f64(self.total_supply)),
            ("max supply", fmt_opt_f64(self.max_supply)),
            ("ath", self.ath.to_string()),
            (
                "ath change percentage",
                self.ath_change_percentage.to_string(),
            ),
            ("ath date", self.ath_date.to_rfc3339()),
            ("atl", self.atl.to_string()),
            (
                "atl change percentage",
                self.atl_change_percentage.to_string(),
            ),
            ("atl date", self.atl_date.to_rfc3339()),
            ("roi", roi),
            ("last updated", self.last_updated.to_rfc3339()),
        ]
    }
}
