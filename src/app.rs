//! Application state and user interaction logic.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::data::{
    compute_aggregates, derive_rows, sort_rows, AggregateStats, DerivedRow, MonitorRecord,
    SortDirective, SortField,
};
use crate::export;
use crate::source::{DataSource, MATCH_ALL};
use crate::ui::Theme;

/// How long a status message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Clickable area of a sortable column header, in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderRegion {
    pub x: u16,
    pub width: u16,
    pub y: u16,
    pub field: SortField,
}

impl HeaderRegion {
    pub fn contains(&self, column: u16, row: u16) -> bool {
        row == self.y && column >= self.x && column < self.x.saturating_add(self.width)
    }
}

/// Where the table body was drawn on the last frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableLayout {
    /// First terminal row of the table body.
    pub body_y: u16,
    /// Number of body rows visible.
    pub body_height: u16,
    /// Index of the first visible row.
    pub offset: usize,
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Data source
    source: Box<dyn DataSource>,
    /// Records of the latest fetch, in the order the source delivered them.
    pub records: Vec<MonitorRecord>,
    /// Counts over `records`, recomputed on every fetch.
    pub stats: AggregateStats,
    pub last_updated: Option<Instant>,
    pub load_error: Option<String>,

    // Sorting
    pub sort: SortDirective,

    // Navigation state (index into the sorted rows)
    pub selected_index: usize,

    // Prefix editing
    pub prefix_input: String,
    pub prefix_active: bool,

    // Hit-testing, updated on every render
    pub header_regions: Vec<HeaderRegion>,
    pub table_layout: Option<TableLayout>,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App with the given data source and initial sort.
    pub fn new(source: Box<dyn DataSource>, sort: SortDirective) -> Self {
        Self::with_theme(source, sort, Theme::auto_detect())
    }

    /// Create a new App with an explicit theme.
    pub fn with_theme(source: Box<dyn DataSource>, sort: SortDirective, theme: Theme) -> Self {
        Self {
            running: true,
            show_help: false,
            show_detail_overlay: false,
            source,
            records: Vec::new(),
            stats: AggregateStats::default(),
            last_updated: None,
            load_error: None,
            sort,
            selected_index: 0,
            prefix_input: String::new(),
            prefix_active: false,
            header_regions: Vec::new(),
            table_layout: None,
            theme,
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// The pair prefix the source is currently fetching.
    pub fn prefix(&self) -> &str {
        self.source.prefix()
    }

    /// Whether at least one fetch has completed.
    pub fn has_data(&self) -> bool {
        self.last_updated.is_some()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_MESSAGE_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Poll the data source for new records.
    ///
    /// Returns true if a new fetch was applied. When nothing new arrived,
    /// the source's last error (if any) is recorded for display and the
    /// previous records stay on screen.
    pub fn reload_data(&mut self) -> bool {
        if let Some(records) = self.source.poll() {
            self.apply_records(records);
            true
        } else {
            self.load_error = self.source.error();
            false
        }
    }

    /// Replace the current record set with a new fetch.
    fn apply_records(&mut self, records: Vec<MonitorRecord>) {
        self.stats = compute_aggregates(&records);
        self.records = records;
        self.last_updated = Some(Instant::now());
        self.load_error = None;

        tracing::debug!(
            total = self.stats.total,
            long = self.stats.long_count,
            short = self.stats.short_count,
            "applied fetch"
        );

        // Clamp selection index
        if self.selected_index >= self.records.len() {
            self.selected_index = self.records.len().saturating_sub(1);
        }
    }

    /// Ask the source to fetch again now.
    pub fn refresh(&mut self) {
        self.source.refresh();
        self.reload_data();
    }

    /// The rows to display: derived from the current records and ordered
    /// by the active sort.
    pub fn rows(&self) -> Vec<DerivedRow> {
        sort_rows(&derive_rows(&self.records), Some(&self.sort))
    }

    /// The row under the selection cursor.
    pub fn selected_row(&self) -> Option<DerivedRow> {
        self.rows().into_iter().nth(self.selected_index)
    }

    /// Apply a column selection to the sort (the header click contract).
    pub fn select_sort(&mut self, field: SortField) {
        self.sort.select(field);
    }

    /// Switch sorting to the other column.
    pub fn cycle_sort(&mut self) {
        self.select_sort(self.sort.field.next());
    }

    /// Toggle sort direction between ascending and descending.
    pub fn toggle_sort_direction(&mut self) {
        self.select_sort(self.sort.field);
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.records.len().saturating_sub(1);
        self.selected_index = (self.selected_index + n).min(max);
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        self.selected_index = self.selected_index.saturating_sub(n);
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        self.selected_index = self.records.len().saturating_sub(1);
    }

    /// Select the row at the given position, if it exists.
    pub fn select_index(&mut self, index: usize) {
        if index < self.records.len() {
            self.selected_index = index;
        }
    }

    /// Open the detail overlay for the selected row.
    pub fn enter_detail(&mut self) {
        if !self.records.is_empty() {
            self.show_detail_overlay = true;
        }
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Enter prefix input mode, pre-filled with the active prefix.
    pub fn start_prefix_input(&mut self) {
        self.prefix_input = match self.source.prefix() {
            MATCH_ALL => String::new(),
            prefix => prefix.to_string(),
        };
        self.prefix_active = true;
    }

    /// Exit prefix input mode without changing the prefix.
    pub fn cancel_prefix_input(&mut self) {
        self.prefix_active = false;
    }

    /// Append a character to the prefix being edited.
    pub fn prefix_push(&mut self, c: char) {
        self.prefix_input.push(c);
    }

    /// Remove the last character from the prefix being edited.
    pub fn prefix_pop(&mut self) {
        self.prefix_input.pop();
    }

    /// Send the edited prefix to the source. Blank input means all pairs.
    pub fn submit_prefix(&mut self) {
        self.prefix_active = false;
        let input = std::mem::take(&mut self.prefix_input);
        self.apply_prefix(&input);
    }

    /// Go back to fetching every pair.
    pub fn reset_prefix(&mut self) {
        self.prefix_active = false;
        self.prefix_input.clear();
        self.apply_prefix(MATCH_ALL);
    }

    fn apply_prefix(&mut self, prefix: &str) {
        self.source.set_prefix(prefix);
        self.selected_index = 0;
        let message = format!("Prefix: {}", self.source.prefix());
        self.set_status_message(message);
        self.reload_data();
    }

    /// Find the sortable column whose header covers the given cell.
    pub fn sort_field_at(&self, column: u16, row: u16) -> Option<SortField> {
        self.header_regions
            .iter()
            .find(|region| region.contains(column, row))
            .map(|region| region.field)
    }

    /// Find the row index drawn at the given terminal row.
    pub fn row_index_at(&self, row: u16) -> Option<usize> {
        let layout = self.table_layout?;
        if row < layout.body_y || row >= layout.body_y.saturating_add(layout.body_height) {
            return None;
        }
        let index = layout.offset + (row - layout.body_y) as usize;
        (index < self.records.len()).then_some(index)
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current table to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        if !self.has_data() {
            anyhow::bail!("No data to export");
        }

        let export = export::build_export(&self.rows(), &self.stats, &self.sort, self.prefix());
        export::write_export(path, &export)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Direction, SortDirection};
    use crate::source::ChannelSource;
    use tokio::sync::watch;

    fn sample_records() -> Vec<MonitorRecord> {
        vec![
            MonitorRecord::new("SOLUSDT", Direction::Long, 20.0, 22.0),
            MonitorRecord::new("BTCUSDT", Direction::Short, 100.0, 101.0),
            MonitorRecord::new("ETHUSDT", Direction::Long, 50.0, 55.0),
        ]
    }

    fn app_with_records() -> (watch::Sender<Vec<MonitorRecord>>, App) {
        let (tx, source) = ChannelSource::create("test");
        tx.send(sample_records()).unwrap();
        let mut app = App::with_theme(Box::new(source), SortDirective::default(), Theme::dark());
        assert!(app.reload_data());
        (tx, app)
    }

    fn pairs(app: &App) -> Vec<String> {
        app.rows().into_iter().map(|r| r.record.pair).collect()
    }

    #[test]
    fn test_reload_recomputes_stats() {
        let (tx, mut app) = app_with_records();
        assert!(app.has_data());
        assert_eq!(app.stats.total, 3);
        assert_eq!(app.stats.long_count, 2);
        assert_eq!(app.stats.short_count, 1);

        tx.send(vec![MonitorRecord::new("ADAUSDT", Direction::Short, 1.0, 1.0)])
            .unwrap();
        assert!(app.reload_data());
        assert_eq!(app.stats.total, 1);
        assert_eq!(app.stats.short_count, 1);
        assert_eq!(pairs(&app), vec!["ADAUSDT"]);

        // Nothing new
        assert!(!app.reload_data());
    }

    #[test]
    fn test_rows_follow_sort() {
        let (_tx, mut app) = app_with_records();

        // Default: smallest diff first (1%, 10%, 10% tie broken by pair)
        assert_eq!(pairs(&app), vec!["BTCUSDT", "ETHUSDT", "SOLUSDT"]);

        app.select_sort(SortField::Pair);
        assert_eq!(app.sort.direction, SortDirection::Ascending);
        assert_eq!(pairs(&app), vec!["BTCUSDT", "ETHUSDT", "SOLUSDT"]);

        app.select_sort(SortField::Pair);
        assert_eq!(app.sort.direction, SortDirection::Descending);
        assert_eq!(pairs(&app), vec!["SOLUSDT", "ETHUSDT", "BTCUSDT"]);

        app.cycle_sort();
        assert_eq!(
            app.sort,
            SortDirective::new(SortField::PriceDiff, SortDirection::Ascending)
        );

        app.toggle_sort_direction();
        assert_eq!(app.sort.field, SortField::PriceDiff);
        assert_eq!(app.sort.direction, SortDirection::Descending);
        assert_eq!(pairs(&app)[2], "BTCUSDT");
    }

    #[test]
    fn test_navigation_is_clamped() {
        let (tx, mut app) = app_with_records();

        app.select_prev();
        assert_eq!(app.selected_index, 0);

        app.select_next_n(10);
        assert_eq!(app.selected_index, 2);

        app.select_first();
        app.select_next();
        assert_eq!(app.selected_row().unwrap().record.pair, "ETHUSDT");

        app.select_last();
        tx.send(vec![MonitorRecord::new("ADAUSDT", Direction::Short, 1.0, 1.0)])
            .unwrap();
        app.reload_data();
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_prefix_editing() {
        let (_tx, mut app) = app_with_records();
        assert_eq!(app.prefix(), "*");

        app.start_prefix_input();
        assert!(app.prefix_active);
        assert_eq!(app.prefix_input, "");

        for c in "BTCX".chars() {
            app.prefix_push(c);
        }
        app.prefix_pop();
        app.submit_prefix();

        assert!(!app.prefix_active);
        assert_eq!(app.prefix(), "BTC");
        assert_eq!(app.get_status_message(), Some("Prefix: BTC"));

        app.start_prefix_input();
        assert_eq!(app.prefix_input, "BTC");
        app.cancel_prefix_input();
        assert_eq!(app.prefix(), "BTC");

        app.reset_prefix();
        assert_eq!(app.prefix(), "*");
    }

    #[test]
    fn test_blank_prefix_means_all() {
        let (_tx, mut app) = app_with_records();
        app.start_prefix_input();
        app.submit_prefix();
        assert_eq!(app.prefix(), "*");
    }

    #[test]
    fn test_hit_testing() {
        let (_tx, mut app) = app_with_records();
        app.header_regions = vec![
            HeaderRegion {
                x: 3,
                width: 10,
                y: 4,
                field: SortField::Pair,
            },
            HeaderRegion {
                x: 14,
                width: 8,
                y: 4,
                field: SortField::PriceDiff,
            },
        ];
        app.table_layout = Some(TableLayout {
            body_y: 5,
            body_height: 10,
            offset: 0,
        });

        assert_eq!(app.sort_field_at(3, 4), Some(SortField::Pair));
        assert_eq!(app.sort_field_at(15, 4), Some(SortField::PriceDiff));
        assert_eq!(app.sort_field_at(15, 5), None);

        assert_eq!(app.row_index_at(4), None);
        assert_eq!(app.row_index_at(5), Some(0));
        assert_eq!(app.row_index_at(7), Some(2));
        assert_eq!(app.row_index_at(8), None);
    }

    #[test]
    fn test_detail_overlay_needs_rows() {
        let (_tx, source) = ChannelSource::create("empty");
        let mut app = App::with_theme(Box::new(source), SortDirective::default(), Theme::dark());
        app.reload_data();
        app.enter_detail();
        assert!(!app.show_detail_overlay);

        let (_tx, mut app) = app_with_records();
        app.enter_detail();
        assert!(app.show_detail_overlay);
        app.close_overlay();
        assert!(!app.show_detail_overlay);
    }

    #[test]
    fn test_export_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");

        let (_tx, source) = ChannelSource::create("empty");
        let app = App::with_theme(Box::new(source), SortDirective::default(), Theme::dark());
        assert!(app.export_state(&path).is_err());

        let (_tx, app) = app_with_records();
        app.export_state(&path).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["summary"]["total"], 3);
        assert_eq!(written["rows"][0]["pair"], "BTCUSDT");
    }
}
