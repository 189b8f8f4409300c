//! CoinGecko `/coins/markets` client.
//!
//! One GET per call, no retry, no timeout beyond reqwest's defaults.
//! The response is deserialized into typed [`MarketRecord`]s; a payload
//! that does not match the schema fails the fetch instead of leaking an
//! arbitrary shape into the UI.

use anyhow::{Context, Result};
use tracing::{debug, error, info, instrument};

use crate::models::{MarketRecord, MarketsQuery};

const API_URL: &str = "https://api.coingecko.com/api/v3";

/// Joins `key=value` pairs in insertion order.
///
/// Values are scalar API tokens (lowercase words, integers, booleans)
/// and never need escaping.
fn query_string(pairs: &[(&str, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

/// Builds the full request URL, always forcing `sparkline=false` on
/// top of the user-controlled parameters.
fn build_markets_url(query: &MarketsQuery) -> String {
    let mut pairs = query.to_query_pairs();
    pairs.push(("sparkline", "false".to_string()));
    format!("{}/coins/markets?{}", API_URL, query_string(&pairs))
}

/// Fetches one page of market records.
///
/// Errors cover HTTP status failures, network failures and
/// malformed-response payloads alike; the caller turns them into a
/// single user notification.
#[instrument(skip(query), fields(page = query.page, per_page = query.per_page))]
pub async fn fetch_coins_markets(query: &MarketsQuery) -> Result<Vec<MarketRecord>> {
    let url = build_markets_url(query);
    debug!(url = %url, "Built CoinGecko markets URL");

    // CoinGecko throttles clients without a browser-like User-Agent.
    let client = reqwest::Client::builder()
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
        .build()
        .context("Failed to build HTTP client")?;

    let response = client
        .get(&url)
        .send()
        .await
        .context("Request to CoinGecko failed")?;

    let status = response.status();
    debug!(status = %status, "Received HTTP response");

    if !status.is_success() {
        error!(status = %status, "CoinGecko returned error status");
        anyhow::bail!("Request failed with HTTP {}", status);
    }

    let records: Vec<MarketRecord> = response
        .json()
        .await
        .context("Malformed CoinGecko markets response")?;

    info!(records = records.len(), "Fetched market records");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Currency, MarketCapOrdering};

    #[test]
    fn test_build_markets_url_contains_all_parameters() {
        let query = MarketsQuery {
            vs_currency: Currency::Eur,
            order: MarketCapOrdering::MarketCapDesc,
            page: 3,
            per_page: 25,
        };
        let url = build_markets_url(&query);

        assert!(url.starts_with("https://api.coingecko.com/api/v3/coins/markets?"));
        assert!(url.contains("vs_currency=eur"));
        assert!(url.contains("order=market_cap_desc"));
        assert!(url.contains("page=3"));
        assert!(url.contains("per_page=25"));
        assert!(url.contains("sparkline=false"));

        // Exactly the five expected keys.
        let (_, qs) = url.split_once('?').unwrap();
        assert_eq!(qs.split('&').count(), 5);
    }

    #[test]
    fn test_sparkline_is_forced_regardless_of_input() {
        let url = build_markets_url(&MarketsQuery::default());
        assert!(url.ends_with("sparkline=false"));
    }

    #[test]
    fn test_query_string_preserves_insertion_order() {
        let pairs = [
            ("b", "2".to_string()),
            ("a", "1".to_string()),
        ];
        assert_eq!(query_string(&pairs), "b=2&a=1");
    }

    // Live call against the real API; tolerant of missing connectivity,
    // it only asserts the schema when a response does come back.
    #[tokio::test]
    async fn test_fetch_coins_markets_live() {
        let query = MarketsQuery {
            per_page: 3,
            ..MarketsQuery::default()
        };

        match fetch_coins_markets(&query).await {
            Ok(records) => {
                assert!(records.len() <= 3);
                for record in &records {
                    assert!(!record.id.is_empty());
                }
            }
            Err(e) => {
                println!("skipped (no connectivity?): {}", e);
            }
        }
    }
}
