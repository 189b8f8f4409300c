//! Application state.
//!
//! One `App` holds everything the UI reads and the event loop mutates:
//! the current query parameters, the last fetched page of records, the
//! table cursor, the detail-view selection and the transient error
//! notification. Shared between the event loop and the worker thread
//! behind `Arc<Mutex<App>>`.

use crate::models::{MarketRecord, MarketsQuery};

/// Screens of the application. One active at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Main view: the paginated markets table.
    Table,

    /// Detail view for the selected record.
    Detail,
}

/// How many event-loop ticks a notification stays on screen
/// (the loop polls input with a 250 ms timeout, so 24 ≈ 6 s).
const NOTICE_TICKS: u16 = 24;

/// The API exposes no total item count; the original front-end fed its
/// pagination a fixed placeholder instead. Kept for the page indicator.
pub const TOTAL_ITEMS_HINT: u32 = 10_000;

/// Mutable state of the application.
pub struct App {
    /// False once the user has confirmed quitting.
    pub running: bool,

    /// Current query parameters. Invariant: always fully populated.
    pub query: MarketsQuery,

    /// Last successfully fetched page. Replaced wholesale on success,
    /// cleared on fetch failure.
    pub records: Vec<MarketRecord>,

    /// Table cursor, clamped to `records`.
    pub selected_row: usize,

    /// Record shown in the detail view. An owned clone captured at
    /// open time: a refetch does not change an open detail view.
    pub selection: Option<MarketRecord>,

    pub current_screen: Screen,

    /// True from fetch initiation to settlement of the matching result.
    pub is_loading: bool,

    /// Optional status text shown while loading.
    pub loading_message: Option<String>,

    /// Transient error notification and its remaining ticks.
    pub notice: Option<String>,
    notice_ticks: u16,

    /// Sequence number of the most recently issued fetch. A settling
    /// result is applied only if it carries this value; superseded
    /// responses are dropped instead of racing last-to-resolve-wins.
    pub request_seq: u64,

    /// Two-step quit: first 'q' arms the confirmation, second quits.
    pub confirm_quit: bool,
}

impl App {
    pub fn new() -> Self {
        Self {
            running: true,
            query: MarketsQuery::default(),
            records: Vec::new(),
            selected_row: 0,
            selection: None,
            current_screen: Screen::Table,
            is_loading: false,
            loading_message: None,
            notice: None,
            notice_ticks: 0,
            request_seq: 0,
            confirm_quit: false,
        }
    }

    /// Starts with an already fetched first page.
    pub fn with_records(records: Vec<MarketRecord>) -> Self {
        Self {
            records,
            ..Self::new()
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Query mutations. Each one mutates exactly one field and issues a
    // new fetch sequence; the caller sends the matching command.
    // ========================================================================

    /// Switches USD ↔ EUR and returns the new fetch sequence.
    pub fn toggle_currency(&mut self) -> u64 {
        self.query.vs_currency = self.query.vs_currency.toggled();
        self.begin_fetch()
    }

    /// Switches market cap ordering and returns the new fetch sequence.
    pub fn toggle_ordering(&mut self) -> u64 {
        self.query.order = self.query.order.toggled();
        self.begin_fetch()
    }

    /// Moves to the next page.
    pub fn next_page(&mut self) -> u64 {
        self.query.page += 1;
        self.begin_fetch()
    }

    /// Moves to the previous page. Page never goes below 1; at page 1
    /// the query is unchanged but the fetch is still re-issued.
    pub fn previous_page(&mut self) -> u64 {
        self.query.page = self.query.page.saturating_sub(1).max(1);
        self.begin_fetch()
    }

    /// Cycles the page size through the fixed set.
    pub fn cycle_page_size(&mut self) -> u64 {
        self.query.per_page = self.query.next_page_size();
        self.begin_fetch()
    }

    /// Re-issues the current query unchanged.
    pub fn refresh(&mut self) -> u64 {
        self.begin_fetch()
    }

    /// Bumps the sequence and flips the loading flag on. The returned
    /// sequence travels with the fetch command and comes back with the
    /// result.
    fn begin_fetch(&mut self) -> u64 {
        self.request_seq += 1;
        self.is_loading = true;
        self.loading_message = Some(format!(
            "Fetching page {} ({})...",
            self.query.page,
            self.query.vs_currency.label()
        ));
        self.request_seq
    }

    // ========================================================================
    // Fetch settlement
    // ========================================================================

    /// Applies a successful fetch result, unless a newer request has
    /// been issued since `seq` (then the stale page is dropped).
    pub fn apply_records(&mut self, seq: u64, records: Vec<MarketRecord>) {
        if seq != self.request_seq {
            return;
        }
        self.records = records;
        self.selected_row = self.selected_row.min(self.records.len().saturating_sub(1));
        self.finish_loading();
    }

    /// Applies a failed fetch: empty table plus one notification.
    /// Stale failures are dropped like stale successes.
    pub fn apply_fetch_error(&mut self, seq: u64, message: String) {
        if seq != self.request_seq {
            return;
        }
        self.records.clear();
        self.selected_row = 0;
        self.finish_loading();
        self.notify(message);
    }

    fn finish_loading(&mut self) {
        self.is_loading = false;
        self.loading_message = None;
    }

    // ========================================================================
    // Notification
    // ========================================================================

    /// Shows a transient notification; replaced if one is already up.
    pub fn notify(&mut self, message: String) {
        self.notice = Some(message);
        self.notice_ticks = NOTICE_TICKS;
    }

    /// Called every loop iteration; counts the notification down.
    pub fn tick(&mut self) {
        if self.notice.is_some() {
            self.notice_ticks = self.notice_ticks.saturating_sub(1);
            if self.notice_ticks == 0 {
                self.notice = None;
            }
        }
    }

    // ========================================================================
    // Table cursor and detail view
    // ========================================================================

    pub fn navigate_up(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(1);
    }

    pub fn navigate_down(&mut self) {
        let max_row = self.records.len().saturating_sub(1);
        self.selected_row = (self.selected_row + 1).min(max_row);
    }

    pub fn selected_record(&self) -> Option<&MarketRecord> {
        self.records.get(self.selected_row)
    }

    /// Captures the selected record and opens the detail view.
    pub fn open_detail(&mut self) {
        if let Some(record) = self.records.get(self.selected_row) {
            self.selection = Some(record.clone());
            self.current_screen = Screen::Detail;
        }
    }

    /// Confirms the detail view: clears the selection, back to the table.
    pub fn close_detail(&mut self) {
        self.selection = None;
        self.current_screen = Screen::Table;
    }

    pub fn is_on_table(&self) -> bool {
        self.current_screen == Screen::Table
    }

    pub fn is_on_detail(&self) -> bool {
        self.current_screen == Screen::Detail
    }

    /// Cosmetic page count derived from the fixed total placeholder.
    pub fn page_count_hint(&self) -> u32 {
        TOTAL_ITEMS_HINT.div_ceil(self.query.per_page.max(1))
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Currency, MarketCapOrdering, MarketRecord};

    fn record(id: &str) -> MarketRecord {
        let json = format!(
            r#"{{
                "id": "{id}",
                "symbol": "{id}",
                "name": "{id}",
                "image": "https://example.com/{id}.png",
                "current_price": 1.0,
                "market_cap": 2.0,
                "market_cap_rank": 1,
                "fully_diluted_valuation": null,
                "total_volume": 3.0,
                "high_24h": null,
                "low_24h": null,
                "price_change_24h": 0.1,
                "price_change_percentage_24h": 0.2,
                "market_cap_change_24h": 0.3,
                "market_cap_change_percentage_24h": 0.4,
                "circulating_supply": 5.0,
                "total_supply": null,
                "max_supply": null,
                "ath": 6.0,
                "ath_change_percentage": -1.0,
                "ath_date": "2024-01-01T00:00:00Z",
                "atl": 0.5,
                "atl_change_percentage": 100.0,
                "atl_date": "2020-01-01T00:00:00Z",
                "roi": null,
                "last_updated": "2024-01-02T00:00:00Z"
            }}"#
        );
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_app_creation() {
        let app = App::new();
        assert!(app.is_running());
        assert!(app.records.is_empty());
        assert!(!app.is_loading);
        assert_eq!(app.query, MarketsQuery::default());
    }

    #[test]
    fn test_toggle_currency_changes_only_that_field() {
        let mut app = App::new();
        let before = app.query;

        let seq = app.toggle_currency();

        assert_eq!(seq, 1);
        assert_eq!(app.request_seq, 1);
        assert_eq!(app.query.vs_currency, Currency::Eur);
        assert_eq!(app.query.order, before.order);
        assert_eq!(app.query.page, before.page);
        assert_eq!(app.query.per_page, before.per_page);
        assert!(app.is_loading);
    }

    #[test]
    fn test_toggle_ordering_changes_only_that_field() {
        let mut app = App::new();
        let before = app.query;

        app.toggle_ordering();

        assert_eq!(app.query.order, MarketCapOrdering::MarketCapDesc);
        assert_eq!(app.query.vs_currency, before.vs_currency);
        assert_eq!(app.query.page, before.page);
        assert_eq!(app.query.per_page, before.per_page);
    }

    #[test]
    fn test_page_navigation_never_goes_below_one() {
        let mut app = App::new();
        app.previous_page();
        assert_eq!(app.query.page, 1);

        app.next_page();
        assert_eq!(app.query.page, 2);
        app.previous_page();
        assert_eq!(app.query.page, 1);
    }

    #[test]
    fn test_page_size_cycles() {
        let mut app = App::new();
        assert_eq!(app.query.per_page, 10);
        app.cycle_page_size();
        assert_eq!(app.query.per_page, 25);
        app.cycle_page_size();
        app.cycle_page_size();
        app.cycle_page_size();
        assert_eq!(app.query.per_page, 10);
    }

    #[test]
    fn test_apply_records_settles_matching_sequence() {
        let mut app = App::new();
        let seq = app.refresh();

        app.apply_records(seq, vec![record("bitcoin"), record("ethereum")]);

        assert_eq!(app.records.len(), 2);
        assert!(!app.is_loading);
    }

    #[test]
    fn test_stale_result_is_dropped() {
        let mut app = App::new();
        let stale = app.refresh();
        let newer = app.toggle_currency();
        assert!(newer > stale);

        // The superseded response arrives late and must not win.
        app.apply_records(stale, vec![record("bitcoin")]);
        assert!(app.records.is_empty());
        assert!(app.is_loading);

        app.apply_records(newer, vec![record("ethereum")]);
        assert_eq!(app.records.len(), 1);
        assert!(!app.is_loading);
    }

    #[test]
    fn test_fetch_error_empties_table_and_notifies_once() {
        let mut app = App::with_records(vec![record("bitcoin")]);
        let seq = app.refresh();

        app.apply_fetch_error(seq, "Request failed with HTTP 429".to_string());

        assert!(app.records.is_empty());
        assert!(!app.is_loading);
        assert_eq!(
            app.notice.as_deref(),
            Some("Request failed with HTTP 429")
        );
    }

    #[test]
    fn test_notice_expires_after_ticks() {
        let mut app = App::new();
        app.notify("boom".to_string());
        assert!(app.notice.is_some());

        for _ in 0..NOTICE_TICKS {
            app.tick();
        }
        assert!(app.notice.is_none());
    }

    #[test]
    fn test_cursor_navigation_is_clamped() {
        let mut app = App::with_records(vec![record("a"), record("b")]);

        app.navigate_up();
        assert_eq!(app.selected_row, 0);

        app.navigate_down();
        assert_eq!(app.selected_row, 1);
        app.navigate_down();
        assert_eq!(app.selected_row, 1);
    }

    #[test]
    fn test_detail_selection_survives_refetch() {
        let mut app = App::with_records(vec![record("bitcoin")]);
        app.open_detail();
        assert!(app.is_on_detail());

        // A refetch replaces the collection; the captured clone stays.
        let seq = app.refresh();
        app.apply_records(seq, vec![record("ethereum")]);
        assert_eq!(app.selection.as_ref().unwrap().id, "bitcoin");

        app.close_detail();
        assert!(app.selection.is_none());
        assert!(app.is_on_table());
    }

    #[test]
    fn test_open_detail_on_empty_table_is_a_no_op() {
        let mut app = App::new();
        app.open_detail();
        assert!(app.is_on_table());
        assert!(app.selection.is_none());
    }

    #[test]
    fn test_cursor_clamped_after_smaller_page() {
        let mut app = App::with_records(vec![record("a"), record("b"), record("c")]);
        app.selected_row = 2;

        let seq = app.refresh();
        app.apply_records(seq, vec![record("a")]);
        assert_eq!(app.selected_row, 0);
    }

    #[test]
    fn test_page_count_hint() {
        let mut app = App::new();
        assert_eq!(app.page_count_hint(), 1000);
        app.query.per_page = 100;
        assert_eq!(app.page_count_hint(), 100);
    }
}
