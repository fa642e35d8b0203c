//! Terminal UI rendering using ratatui.
//!
//! ## Submodules
//!
//! - [`table`]: The sortable monitor table
//! - [`detail`]: Modal overlay showing every field of the selected row
//! - [`common`]: Shared components (header, prefix bar, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Prefix (common::render_prefix_bar)   │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ Monitor table (table::render)        │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlays rendered on top:
//!    - detail::render_overlay
//!    - common::render_help
//! ```

pub mod common;
pub mod detail;
pub mod table;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

/// Minimum terminal size for a usable display.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 12;

/// Draw one frame.
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(app.theme.error));
        let height = area.height.min(5);
        let centered = Rect::new(
            area.x,
            area.y + (area.height.saturating_sub(height)) / 2,
            area.width,
            height,
        );
        // Stale geometry would make clicks land on rows that are not drawn
        app.header_regions.clear();
        app.table_layout = None;
        frame.render_widget(paragraph, centered);
        return;
    }

    let [header, prefix, content, status] = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Length(1), // Prefix bar
        Constraint::Min(8),    // Table
        Constraint::Length(1), // Status bar
    ])
    .areas(area);

    common::render_header(frame, app, header);
    common::render_prefix_bar(frame, app, prefix);
    table::render(frame, app, content);
    common::render_status_bar(frame, app, status);

    if app.show_detail_overlay {
        detail::render_overlay(frame, app, area);
    }

    if app.show_help {
        common::render_help(frame, app, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Direction, MonitorRecord, SortDirective};
    use crate::source::ChannelSource;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app() -> App {
        let (tx, source) = ChannelSource::create("test");
        tx.send(vec![
            MonitorRecord::new("BTCUSD", Direction::Long, 100.0, 110.0),
            MonitorRecord::new("ETHUSD", Direction::Short, 50.0, 50.0),
            MonitorRecord::new("SOLUSD", Direction::Long, 20.0, 21.0),
        ])
        .unwrap();
        let mut app = App::with_theme(Box::new(source), SortDirective::default(), Theme::dark());
        app.reload_data();
        app
    }

    #[test]
    fn test_header_shows_counts_and_prefix() {
        let mut app = app();
        let text = screen(&mut app, 140, 20);
        let header = text.lines().next().unwrap();
        assert!(header.contains("3 monitors"));
        assert!(header.contains("2 long"));
        assert!(header.contains("1 short"));
        assert!(header.contains("prefix *"));
    }

    #[test]
    fn test_table_is_placed_below_bars() {
        let mut app = app();
        screen(&mut app, 140, 20);
        // Header, prefix bar, then the table border
        assert!(app.header_regions.iter().all(|r| r.y == 3));
        assert_eq!(app.table_layout.unwrap().body_y, 4);
    }

    #[test]
    fn test_too_small_terminal() {
        let mut app = app();
        let text = screen(&mut app, 40, 10);
        assert!(text.contains("Terminal too small"));
        assert!(app.header_regions.is_empty());
        assert!(app.table_layout.is_none());
    }

    #[test]
    fn test_help_overlay() {
        let mut app = app();
        app.toggle_help();
        let text = screen(&mut app, 140, 30);
        assert!(text.contains("Keyboard Shortcuts"));
    }

    #[test]
    fn test_detail_overlay() {
        let mut app = app();
        app.enter_detail();
        let text = screen(&mut app, 140, 30);
        assert!(text.contains("Current Close"));
    }
}
