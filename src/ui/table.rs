//! Monitor table rendering.
//!
//! Displays every row of the latest fetch in the active sort order. The
//! geometry of the sortable headers and of the body is recorded on the
//! [`App`] so mouse clicks can be mapped back to columns and rows.

use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, HighlightSpacing, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, HeaderRegion, TableLayout};
use crate::data::format::{format_price, format_timestamp, format_ttl};
use crate::data::{DerivedRow, SortField};

const HIGHLIGHT_SYMBOL: &str = "▶ ";
const COLUMN_SPACING: u16 = 1;
/// Marker on a sortable header that is not the active sort column.
const UNSORTED_MARKER: &str = "⇵";

/// A table column: its title, width and the sort field its header selects.
struct Column {
    title: &'static str,
    width: Constraint,
    sort: Option<SortField>,
}

const COLUMNS: [Column; 8] = [
    Column {
        title: "Pair",
        width: Constraint::Fill(2),
        sort: Some(SortField::Pair),
    },
    Column {
        title: "Diff %",
        width: Constraint::Fill(1),
        sort: Some(SortField::PriceDiff),
    },
    Column {
        title: "Direction",
        width: Constraint::Min(9),
        sort: None,
    },
    Column {
        title: "Monitor Price",
        width: Constraint::Fill(2),
        sort: None,
    },
    Column {
        title: "Ask",
        width: Constraint::Fill(2),
        sort: None,
    },
    Column {
        title: "Bid",
        width: Constraint::Fill(2),
        sort: None,
    },
    Column {
        title: "Monitor Time",
        width: Constraint::Min(19),
        sort: None,
    },
    Column {
        title: "TTL (days)",
        width: Constraint::Fill(1),
        sort: None,
    },
];

/// Render the monitor table.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let rows = app.rows();
    let selected = app.selected_index.min(rows.len().saturating_sub(1));

    let header = Row::new(COLUMNS.iter().map(|c| Cell::from(header_label(c, app))))
        .height(1)
        .style(app.theme.header);

    let body: Vec<Row> = rows.iter().map(|row| render_row(row, app)).collect();

    let position_info = if rows.is_empty() {
        String::new()
    } else {
        format!(" [{}/{}]", selected + 1, rows.len())
    };
    let title = format!(
        " Monitors [sort: {} {}]{} ",
        app.sort.field.label(),
        app.sort.direction.arrow(),
        position_info
    );

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    let inner = block.inner(area);

    let widths: Vec<Constraint> = COLUMNS.iter().map(|c| c.width).collect();
    let table = Table::new(body, widths.clone())
        .header(header)
        .block(block)
        .column_spacing(COLUMN_SPACING)
        .flex(Flex::Start)
        .row_highlight_style(app.theme.selected)
        .highlight_symbol(HIGHLIGHT_SYMBOL)
        .highlight_spacing(HighlightSpacing::Always);

    let mut state = TableState::default();
    if !rows.is_empty() {
        state.select(Some(selected));
    }

    frame.render_stateful_widget(table, area, &mut state);

    app.header_regions = header_regions(inner, &widths);
    app.table_layout = Some(TableLayout {
        body_y: inner.y.saturating_add(1),
        body_height: inner.height.saturating_sub(1),
        offset: state.offset(),
    });

    if rows.is_empty() {
        render_empty(frame, app, inner);
    }
}

fn header_label(column: &Column, app: &App) -> String {
    match column.sort {
        Some(field) if field == app.sort.field => {
            format!("{} {}", column.title, app.sort.direction.arrow())
        }
        Some(_) => format!("{} {}", column.title, UNSORTED_MARKER),
        None => column.title.to_string(),
    }
}

fn render_row<'a>(row: &DerivedRow, app: &App) -> Row<'a> {
    let record = &row.record;
    let direction_style = app.theme.direction_style(record.direction);

    Row::new(vec![
        Cell::from(record.pair.clone()),
        Cell::from(row.price_diff_label()),
        Cell::from(record.direction.label()),
        Cell::from(format_price(record.monitor_price)),
        Cell::from(format_price(record.current_ask_price)),
        Cell::from(format_price(record.current_bid_price)),
        Cell::from(format_timestamp(record.monitor_timestamp)),
        Cell::from(format_ttl(row)),
    ])
    .style(direction_style)
}

/// Compute where each sortable header is drawn.
///
/// Mirrors the table's own column layout: the highlight column is always
/// reserved, then the remaining width is split with the same constraints
/// and spacing.
fn header_regions(inner: Rect, widths: &[Constraint]) -> Vec<HeaderRegion> {
    if inner.height == 0 {
        return Vec::new();
    }

    let selection_width = HIGHLIGHT_SYMBOL.chars().count() as u16;
    let [_, columns_area] = Layout::horizontal([
        Constraint::Length(selection_width),
        Constraint::Fill(0),
    ])
    .areas(Rect::new(inner.x, inner.y, inner.width, 1));

    let cells = Layout::horizontal(widths.iter().copied())
        .flex(Flex::Start)
        .spacing(COLUMN_SPACING)
        .split(columns_area);

    COLUMNS
        .iter()
        .zip(cells.iter())
        .filter_map(|(column, cell)| {
            column.sort.map(|field| HeaderRegion {
                x: cell.x,
                width: cell.width,
                y: inner.y,
                field,
            })
        })
        .collect()
}

/// Message shown in the table body when there is nothing to list.
fn render_empty(frame: &mut Frame, app: &App, inner: Rect) {
    let [_, body] = Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(inner);
    if body.height == 0 {
        return;
    }

    let (message, style) = match (&app.load_error, app.has_data()) {
        (Some(err), false) => (
            format!("Error: {}", err),
            Style::default().fg(app.theme.error),
        ),
        (None, false) => (
            "Loading...".to_string(),
            Style::default().add_modifier(Modifier::DIM),
        ),
        (_, true) => (
            "No data".to_string(),
            Style::default().add_modifier(Modifier::DIM),
        ),
    };

    let area = Rect::new(body.x, body.y + body.height / 2, body.width, 1);
    frame.render_widget(
        Paragraph::new(message)
            .alignment(Alignment::Center)
            .style(style),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Direction, MonitorRecord, SortDirection, SortDirective};
    use crate::source::ChannelSource;
    use crate::ui::Theme;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn app_with(records: Vec<MonitorRecord>) -> App {
        let (tx, source) = ChannelSource::create("test");
        tx.send(records).unwrap();
        let mut app = App::with_theme(Box::new(source), SortDirective::default(), Theme::dark());
        app.reload_data();
        app
    }

    fn draw(app: &mut App, width: u16, height: u16) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|frame| render(frame, app, frame.area()))
            .unwrap();
        terminal.backend().buffer().clone()
    }

    fn buffer_text(buffer: &Buffer) -> String {
        let area = buffer.area;
        (area.top()..area.bottom())
            .map(|y| {
                (area.left()..area.right())
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_renders_rows_in_sort_order() {
        let mut app = app_with(vec![
            MonitorRecord::new("BTCUSD", Direction::Long, 100.0, 110.0),
            MonitorRecord::new("ETHUSD", Direction::Short, 50.0, 50.0),
        ]);
        let text = buffer_text(&draw(&mut app, 140, 10));

        let eth = text.find("ETHUSD").unwrap();
        let btc = text.find("BTCUSD").unwrap();
        assert!(eth < btc);
        assert!(text.contains("10.00"));
        assert!(text.contains("110.00000"));
        assert!(text.contains("Pair ⇵"));
        assert!(text.contains("Diff % ↑"));
    }

    #[test]
    fn test_header_regions_match_rendered_titles() {
        let mut app = app_with(vec![MonitorRecord::new("BTCUSD", Direction::Long, 1.0, 1.0)]);
        let buffer = draw(&mut app, 140, 10);

        assert_eq!(app.header_regions.len(), 2);
        for region in &app.header_regions {
            let title = match region.field {
                SortField::Pair => "Pair",
                SortField::PriceDiff => "Diff %",
            };
            let drawn: String = (region.x..region.x + title.chars().count() as u16)
                .map(|x| buffer[(x, region.y)].symbol().to_string())
                .collect();
            assert_eq!(drawn, title);
        }

        let layout = app.table_layout.unwrap();
        assert_eq!(layout.body_y, 2);
        assert_eq!(layout.offset, 0);
        assert_eq!(app.row_index_at(2), Some(0));
    }

    #[test]
    fn test_clicking_rendered_header_toggles_sort() {
        let mut app = app_with(vec![MonitorRecord::new("BTCUSD", Direction::Long, 1.0, 1.0)]);
        draw(&mut app, 140, 10);

        let region = app.header_regions[0];
        let field = app.sort_field_at(region.x, region.y).unwrap();
        app.select_sort(field);
        assert_eq!(
            app.sort,
            SortDirective::new(SortField::Pair, SortDirection::Ascending)
        );
    }

    #[test]
    fn test_empty_fetch_shows_no_data() {
        let mut app = app_with(Vec::new());
        let text = buffer_text(&draw(&mut app, 140, 10));
        assert!(text.contains("No data"));
    }

    #[test]
    fn test_before_first_fetch_shows_loading() {
        let (_tx, source) = ChannelSource::create("test");
        let mut app = App::with_theme(Box::new(source), SortDirective::default(), Theme::dark());
        let text = buffer_text(&draw(&mut app, 140, 10));
        assert!(text.contains("Loading..."));
    }
}
