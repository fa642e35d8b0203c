use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use pairwatch::config::Overrides;
use pairwatch::data::{compute_aggregates, derive_rows, sort_rows};
use pairwatch::source::normalize_prefix;
use pairwatch::{
    events, export, logging, ui, App, DataSource, FileSource, HttpSource, MonitorClient,
    MonitorRecord, Settings, SortDirective,
};

/// UI poll interval when the source fetches in the background.
const BACKGROUND_POLL: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(name = "pairwatch")]
#[command(about = "Terminal dashboard for trading pair price monitors")]
struct Args {
    /// Backend base URL (e.g. http://127.0.0.1:8888)
    #[arg(long, conflicts_with = "file")]
    endpoint: Option<String>,

    /// Read monitors from a JSON file in the backend's response format
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only show pairs starting with this prefix ("*" for all)
    #[arg(short, long)]
    prefix: Option<String>,

    /// Refresh interval in seconds
    #[arg(short, long)]
    refresh: Option<u64>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Initial sort column (pair or priceDiff)
    #[arg(short, long)]
    sort: Option<String>,

    /// Sort descending instead of ascending
    #[arg(short, long)]
    descending: bool,

    /// Write logs to this file while the TUI is running
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Export the current table to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

impl Args {
    /// Resolve settings: file and environment first, then flags on top.
    fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::load(self.config.as_deref())?;
        settings.apply_overrides(&Overrides {
            endpoint: self.endpoint.clone(),
            prefix: self.prefix.clone(),
            refresh_secs: self.refresh,
            timeout_secs: self.timeout,
            sort_field: self.sort.clone(),
            descending: self.descending,
            log_file: self.log_file.clone(),
        });
        Ok(settings)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = args.settings()?;

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        logging::init_stderr()?;
        return export_to_file(&args, &settings, export_path);
    }

    if let Some(ref log_file) = settings.log_file {
        logging::init_file(log_file)
            .with_context(|| format!("opening log file {}", log_file.display()))?;
    }

    let sort = settings.sort_directive();

    if let Some(ref path) = args.file {
        return run_with_file(path, &settings, sort);
    }

    run_with_http(&settings, sort)
}

/// Run with a file-based data source
fn run_with_file(path: &Path, settings: &Settings, sort: SortDirective) -> Result<()> {
    tracing::info!(path = %path.display(), "watching monitor file");
    let mut source = FileSource::new(path);
    source.set_prefix(&settings.prefix);
    run_tui(Box::new(source), sort, settings.refresh_interval())
}

/// Run against the HTTP backend
fn run_with_http(settings: &Settings, sort: SortDirective) -> Result<()> {
    tracing::info!(endpoint = %settings.endpoint, "polling monitor backend");
    let client = MonitorClient::new(&settings.endpoint, settings.timeout())?;

    // The polling task runs on the runtime while the TUI owns the main thread
    let rt = tokio::runtime::Runtime::new()?;
    let source = {
        let _guard = rt.enter();
        HttpSource::spawn(client, &settings.prefix, settings.refresh_interval())
    };

    let result = run_tui(Box::new(source), sort, BACKGROUND_POLL);
    rt.shutdown_timeout(Duration::from_secs(1));
    result
}

/// Run the TUI with the given data source
fn run_tui(
    source: Box<dyn DataSource>,
    sort: SortDirective,
    refresh_interval: Duration,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    // Create app and load initial data
    let mut app = App::new(source, sort);
    app.reload_data();

    // Run the main loop
    let result = run_app(&mut terminal, &mut app, refresh_interval);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    while app.running {
        terminal.draw(|frame| ui::render(frame, app))?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(BACKGROUND_POLL)? {
            match event {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    events::handle_key_event(app, key)
                }
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                // Redrawn on the next iteration
                _ => {}
            }
        }

        if last_refresh.elapsed() >= refresh_interval {
            app.reload_data();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}

/// Fetch once and write the table to a JSON file
fn export_to_file(args: &Args, settings: &Settings, export_path: &Path) -> Result<()> {
    let prefix = normalize_prefix(&settings.prefix);
    let records = fetch_once(args, settings, &prefix)?;

    let sort = settings.sort_directive();
    let rows = sort_rows(&derive_rows(&records), Some(&sort));
    let stats = compute_aggregates(&records);

    let document = export::build_export(&rows, &stats, &sort, &prefix);
    export::write_export(export_path, &document)?;

    tracing::info!(
        path = %export_path.display(),
        total = stats.total,
        "exported monitor table"
    );
    println!("Exported {} monitors to: {}", stats.total, export_path.display());
    Ok(())
}

fn fetch_once(args: &Args, settings: &Settings, prefix: &str) -> Result<Vec<MonitorRecord>> {
    if let Some(ref path) = args.file {
        let mut source = FileSource::new(path);
        source.set_prefix(prefix);
        return match source.poll() {
            Some(records) => Ok(records),
            None => anyhow::bail!(
                "failed to read {}: {}",
                path.display(),
                source.error().unwrap_or_else(|| "no data".to_string())
            ),
        };
    }

    let client = MonitorClient::new(&settings.endpoint, settings.timeout())?;
    let rt = tokio::runtime::Runtime::new()?;
    let records = rt
        .block_on(client.fetch(prefix))
        .with_context(|| format!("fetching monitors from {}", settings.endpoint))?;
    Ok(records)
}
