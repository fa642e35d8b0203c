//! Detail overlay rendering.
//!
//! Displays a modal overlay with every field of the selected row.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::data::format::{format_price, format_timestamp, format_ttl};
use crate::data::DerivedRow;

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 40;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 15;

/// Render the selected row as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    // Skip rendering if terminal is too small for the overlay
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(row) = app.selected_row() else {
        return;
    };

    let overlay_width = (area.width * 60 / 100).clamp(MIN_OVERLAY_WIDTH, 70);
    let overlay_height = MIN_OVERLAY_HEIGHT;

    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let [body, footer] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(overlay_area);

    let direction_style = app.theme.direction_style(row.record.direction);
    let rows: Vec<Row> = fields(&row)
        .into_iter()
        .map(|(label, value)| {
            Row::new(vec![
                Cell::from(label).style(Style::default().add_modifier(Modifier::DIM)),
                Cell::from(value),
            ])
        })
        .collect();

    let block = Block::default()
        .title(Line::from(vec![
            Span::raw(" "),
            Span::styled(
                row.record.pair.clone(),
                direction_style.add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
        ]))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let table = Table::new(rows, [Constraint::Length(16), Constraint::Fill(1)]).block(block);
    frame.render_widget(table, body);

    let footer_text = Paragraph::new(Line::from(vec![Span::styled(
        " ↑/↓:previous/next  Esc:close ",
        Style::default().add_modifier(Modifier::DIM),
    )]));
    frame.render_widget(footer_text, footer);
}

/// Label/value pairs shown for a row.
fn fields(row: &DerivedRow) -> Vec<(&'static str, String)> {
    let record = &row.record;
    vec![
        ("Pair", record.pair.clone()),
        ("Direction", record.direction.label().to_string()),
        ("Monitor Price", format_price(record.monitor_price)),
        ("Current Close", format_price(record.current_close)),
        ("Ask", format_price(record.current_ask_price)),
        ("Bid", format_price(record.current_bid_price)),
        ("Diff %", row.price_diff_label()),
        ("Monitor Time", format_timestamp(record.monitor_timestamp)),
        ("TTL (days)", format_ttl(row)),
        ("TTL (seconds)", format!("{:.0}", record.ttl_seconds)),
    ]
}
