//! Common UI components.
//!
//! This module contains the header bar, prefix bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;

/// Render the header bar with the summary counts.
///
/// Displays: app name, total / long / short monitor counts, active prefix.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = Span::styled(" PAIRWATCH ", Style::default().add_modifier(Modifier::BOLD));

    if !app.has_data() {
        let line = Line::from(vec![title, Span::raw("│ Loading...")]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let stats = &app.stats;
    let line = Line::from(vec![
        title,
        Span::raw("│ "),
        Span::styled(
            format!("{}", stats.total),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" monitors │ "),
        Span::styled(
            format!("{}", stats.long_count),
            Style::default().fg(app.theme.long),
        ),
        Span::raw(" long │ "),
        Span::styled(
            format!("{}", stats.short_count),
            Style::default().fg(app.theme.short),
        ),
        Span::raw(" short │ prefix "),
        Span::styled(
            app.prefix().to_string(),
            Style::default().fg(app.theme.highlight),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the prefix line: the editor while typing, the active prefix otherwise.
pub fn render_prefix_bar(frame: &mut Frame, app: &App, area: Rect) {
    let line = if app.prefix_active {
        Line::from(vec![
            Span::styled(" Prefix: ", Style::default().fg(app.theme.highlight)),
            Span::raw(format!("{}_", app.prefix_input)),
            Span::styled(
                "  Enter:apply Esc:cancel (empty = all pairs)",
                Style::default().add_modifier(Modifier::DIM),
            ),
        ])
    } else {
        Line::from(vec![Span::styled(
            format!(" Prefix: {}  [/:edit c:reset]", app.prefix()),
            Style::default().add_modifier(Modifier::DIM),
        )])
    };

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the status bar at the bottom.
///
/// Shows the source, time since the last fetch and the available controls,
/// or a temporary status message. A fetch error is shown while the previous
/// data stays on screen.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    if let Some(ref err) = app.load_error {
        let paragraph = Paragraph::new(format!(" Error: {} | r:retry q:quit", err))
            .style(Style::default().fg(app.theme.error));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = if app.prefix_active {
        "Type a pair prefix | Enter:apply Esc:cancel"
    } else {
        "1/2:sort S:reverse /:prefix r:refresh Enter:detail ?:help q:quit"
    };

    let status = match app.last_updated {
        Some(updated) => format!(
            " {} | Updated {:.1}s ago | {}",
            app.source_description(),
            updated.elapsed().as_secs_f64(),
            controls,
        ),
        None => format!(" {} | Loading... | q:quit", app.source_description()),
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the table.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  ↑/↓ j/k     Move selection"),
        Line::from("  PgUp/PgDn   Jump 10 rows"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       Row detail"),
        Line::from("  Esc         Close detail"),
        Line::from(""),
        section(" Sorting"),
        Line::from("  1         Sort by pair"),
        Line::from("  2         Sort by price diff"),
        Line::from("  s         Switch sort column"),
        Line::from("  S         Reverse direction"),
        Line::from("  click     Header sorts, row selects"),
        Line::from(""),
        section(" General"),
        Line::from("  /         Edit pair prefix"),
        Line::from("  c         Show all pairs"),
        Line::from("  r         Refresh now"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 44u16.min(area.width.saturating_sub(4));
    let help_height = 27u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
