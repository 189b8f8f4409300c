//! Markets table screen: header, table, status line and footer.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::{App, TOTAL_ITEMS_HINT};

pub fn render_table_screen(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, chunks[0]);
    render_markets_table(frame, app, chunks[1]);
    render_status_line(frame, app, chunks[2]);
    render_footer(frame, app, chunks[3]);
}

/// Header (3), table (rest), status line (1 + borders), footer (3).
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(area)
        .to_vec()
}

fn render_header(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Coins & Markets ")
        .title_alignment(Alignment::Center);

    let text = vec![Line::from(Span::styled(
        "CoinGecko market overview",
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    ))];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

fn render_markets_table(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Markets ");

    if app.records.is_empty() {
        let message = if app.is_loading {
            "Loading..."
        } else {
            "No data"
        };
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(message, Style::default().fg(Color::Gray))),
        ];
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let widths = [
        Constraint::Length(6),
        Constraint::Min(20),
        Constraint::Length(18),
        Constraint::Length(22),
    ];

    let header = Row::new(["#", "Name", "Current Price", "Circulating Supply"]).style(
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::BOLD),
    );

    let currency = app.query.vs_currency;
    let rows: Vec<Row> = app
        .records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let rank = record
                .market_cap_rank
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".to_string());

            let change_style = if record.price_change_percentage_24h >= 0.0 {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Red)
            };

            let mut row = Row::new(vec![
                Cell::from(rank),
                Cell::from(format!(
                    "{} ({})",
                    record.name,
                    record.symbol.to_uppercase()
                )),
                Cell::from(format!("{}{}", currency.symbol(), record.current_price))
                    .style(change_style),
                Cell::from(format!("{:.0}", record.circulating_supply)),
            ]);

            if index == app.selected_row {
                row = row.style(
                    Style::default()
                        .add_modifier(Modifier::BOLD)
                        .add_modifier(Modifier::REVERSED),
                );
            }

            row
        })
        .collect();

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(1);

    frame.render_widget(table, area);
}

/// Page indicator, active parameters, loading spinner and notification.
fn render_status_line(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let line = if let Some(notice) = &app.notice {
        Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
    } else {
        let mut spans = vec![Span::raw(format!(
            " page {}/{} (~{} items)  size {}  {}  sorted by {}",
            app.query.page,
            app.page_count_hint(),
            TOTAL_ITEMS_HINT,
            app.query.per_page,
            app.query.vs_currency.label(),
            app.query.order.label(),
        ))];

        if app.is_loading {
            let message = app
                .loading_message
                .clone()
                .unwrap_or_else(|| "Loading...".to_string());
            spans.push(Span::styled(
                format!("  ⏳ {}", message),
                Style::default().fg(Color::Yellow),
            ));
        }

        Line::from(spans)
    };

    let paragraph = Paragraph::new(vec![line])
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled(
                "Press ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " again to quit, any other key to cancel",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        Line::from(vec![
            Span::styled("[q]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" Quit  "),
            Span::styled("[↑↓]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" Row  "),
            Span::styled("[Enter]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" Details  "),
            Span::styled("[←→]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" Page  "),
            Span::styled("[c]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" Currency  "),
            Span::styled("[s]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" Sort  "),
            Span::styled("[p]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" Page size  "),
            Span::styled("[r]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" Refresh"),
        ])
    };

    let paragraph = Paragraph::new(vec![shortcuts])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
