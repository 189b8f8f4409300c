//! Terminal user interface.

pub mod detail;
pub mod events;
pub mod table;

pub use events::{Event, EventHandler};

use ratatui::Frame;

use crate::app::{App, Screen};

/// Draws the whole interface, routed by the active screen.
pub fn render(frame: &mut Frame, app: &App) {
    match app.current_screen {
        Screen::Table => table::render_table_screen(frame, app),
        Screen::Detail => {
            // The table stays visible behind the centered detail popup.
            table::render_table_screen(frame, app);
            detail::render_detail(frame, app);
        }
    }
}
