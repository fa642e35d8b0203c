use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::App;
use crate::data::SortField;

/// File written by the `e` key, relative to the working directory.
pub const EXPORT_FILE: &str = "pairwatch_export.json";

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    // If detail overlay is shown, handle overlay-specific keys
    if app.show_detail_overlay {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q') => {
                app.close_overlay();
            }
            // Allow stepping through rows while overlay is open
            KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            KeyCode::PageUp => app.select_prev_n(10),
            KeyCode::PageDown => app.select_next_n(10),
            KeyCode::Home => app.select_first(),
            KeyCode::End => app.select_last(),
            _ => {}
        }
        return;
    }

    if app.prefix_active {
        handle_prefix_input(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // Navigation
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        KeyCode::Enter => app.enter_detail(),
        KeyCode::Esc => app.close_overlay(),

        // Sorting
        KeyCode::Char('1') => app.select_sort(SortField::Pair),
        KeyCode::Char('2') => app.select_sort(SortField::PriceDiff),
        KeyCode::Char('s') => app.cycle_sort(),
        KeyCode::Char('S') => app.toggle_sort_direction(),

        // Prefix
        KeyCode::Char('/') => app.start_prefix_input(),
        KeyCode::Char('c') => app.reset_prefix(),

        KeyCode::Char('r') => {
            app.refresh();
            app.set_status_message("Refreshing...".to_string());
        }

        KeyCode::Char('?') => app.toggle_help(),

        KeyCode::Char('e') => {
            let export_path = PathBuf::from(EXPORT_FILE);
            match app.export_state(&export_path) {
                Ok(()) => {
                    tracing::info!(path = %export_path.display(), "exported table");
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "export failed");
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle key input while the prefix is being edited
fn handle_prefix_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_prefix(),
        KeyCode::Esc => app.cancel_prefix_input(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.cancel_prefix_input();
        }
        KeyCode::Backspace => app.prefix_pop(),
        KeyCode::Char(c) => app.prefix_push(c),
        _ => {}
    }
}

/// Handle mouse events
///
/// Hit-testing uses the header regions and table layout recorded by the
/// last render.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        MouseEventKind::Down(MouseButton::Left) => {
            if app.show_help || app.show_detail_overlay {
                return;
            }
            if let Some(field) = app.sort_field_at(mouse.column, mouse.row) {
                app.select_sort(field);
            } else if let Some(index) = app.row_index_at(mouse.row) {
                app.select_index(index);
            }
        }

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{HeaderRegion, TableLayout};
    use crate::data::{Direction, MonitorRecord, SortDirection, SortDirective};
    use crate::source::ChannelSource;
    use crate::ui::Theme;
    use tokio::sync::watch;

    fn app() -> (watch::Sender<Vec<MonitorRecord>>, App) {
        let (tx, source) = ChannelSource::create("test");
        tx.send(vec![
            MonitorRecord::new("ETHUSD", Direction::Short, 50.0, 50.0),
            MonitorRecord::new("BTCUSD", Direction::Long, 100.0, 110.0),
        ])
        .unwrap();
        let mut app = App::with_theme(Box::new(source), SortDirective::default(), Theme::dark());
        app.reload_data();
        (tx, app)
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn click(app: &mut App, column: u16, row: u16) {
        handle_mouse_event(
            app,
            MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                modifiers: KeyModifiers::NONE,
            },
        );
    }

    #[test]
    fn test_quit() {
        let (_tx, mut app) = app();
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[test]
    fn test_sort_keys() {
        let (_tx, mut app) = app();

        press(&mut app, KeyCode::Char('1'));
        assert_eq!(
            app.sort,
            SortDirective::new(SortField::Pair, SortDirection::Ascending)
        );
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.sort.direction, SortDirection::Descending);

        press(&mut app, KeyCode::Char('2'));
        assert_eq!(
            app.sort,
            SortDirective::new(SortField::PriceDiff, SortDirection::Ascending)
        );

        press(&mut app, KeyCode::Char('S'));
        assert_eq!(app.sort.direction, SortDirection::Descending);

        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.sort.field, SortField::Pair);
    }

    #[test]
    fn test_prefix_keys() {
        let (_tx, mut app) = app();

        press(&mut app, KeyCode::Char('/'));
        assert!(app.prefix_active);

        // Keys are text while editing, not commands
        press(&mut app, KeyCode::Char('q'));
        press(&mut app, KeyCode::Backspace);
        for c in "ETH".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert!(app.running);
        press(&mut app, KeyCode::Enter);

        assert!(!app.prefix_active);
        assert_eq!(app.prefix(), "ETH");

        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.prefix(), "*");
    }

    #[test]
    fn test_escape_cancels_prefix_edit() {
        let (_tx, mut app) = app();
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('X'));
        press(&mut app, KeyCode::Esc);
        assert!(!app.prefix_active);
        assert_eq!(app.prefix(), "*");
    }

    #[test]
    fn test_overlays() {
        let (_tx, mut app) = app();

        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.show_help);
        assert!(app.running);

        press(&mut app, KeyCode::Enter);
        assert!(app.show_detail_overlay);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.selected_index, 1);
        press(&mut app, KeyCode::Esc);
        assert!(!app.show_detail_overlay);
    }

    #[test]
    fn test_navigation_keys() {
        let (_tx, mut app) = app();
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.selected_index, 1);
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.selected_index, 1);
        press(&mut app, KeyCode::Home);
        assert_eq!(app.selected_index, 0);
        press(&mut app, KeyCode::End);
        assert_eq!(app.selected_index, 1);
    }

    #[test]
    fn test_header_click_selects_sort() {
        let (_tx, mut app) = app();
        app.header_regions = vec![HeaderRegion {
            x: 2,
            width: 10,
            y: 3,
            field: SortField::Pair,
        }];

        click(&mut app, 5, 3);
        assert_eq!(
            app.sort,
            SortDirective::new(SortField::Pair, SortDirection::Ascending)
        );
        click(&mut app, 5, 3);
        assert_eq!(app.sort.direction, SortDirection::Descending);
    }

    #[test]
    fn test_row_click_selects_row() {
        let (_tx, mut app) = app();
        app.table_layout = Some(TableLayout {
            body_y: 4,
            body_height: 10,
            offset: 0,
        });

        click(&mut app, 5, 5);
        assert_eq!(app.selected_index, 1);

        // Below the last row
        click(&mut app, 5, 9);
        assert_eq!(app.selected_index, 1);
    }
}
