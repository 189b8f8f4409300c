//! coinview — CoinGecko markets in the terminal.

pub mod api;
pub mod app;
pub mod models;
pub mod ui;
