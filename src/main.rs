//! qtop - Interactive job-queue dashboard for Slurm

use std::io::{self, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen},
};

use qtop::display;
use qtop::models::{QueueSnapshot, TopConfig};
use qtop::slurm::SlurmQueue;
use qtop::tui;

#[derive(Parser)]
#[command(name = "qtop")]
#[command(about = "Interactive job-queue dashboard for Slurm", long_about = None)]
#[command(version)]
struct Cli {
    /// User whose jobs to monitor (defaults to $USER)
    user: Option<String>,

    /// Print one snapshot to stdout and exit
    #[arg(long)]
    once: bool,

    /// Redraw the snapshot every N seconds until Ctrl+C
    #[arg(short, long, value_name = "SECONDS", default_value = "0")]
    watch: f64,

    /// Theme override (dark or light)
    #[arg(long, value_name = "NAME")]
    theme: Option<String>,

    /// Directory containing the Slurm binaries (squeue, scontrol)
    #[arg(long, value_name = "DIR")]
    slurm_path: Option<PathBuf>,
}

/// Set up file logging when QTOP_LOG names a path.
///
/// The TUI owns stdout and stderr is invisible behind the alternate screen,
/// so logging is opt-in and file-only. RUST_LOG overrides the default filter.
fn init_logging() {
    let Ok(path) = std::env::var("QTOP_LOG") else {
        return;
    };
    if path.is_empty() {
        return;
    }

    match std::fs::File::create(&path) {
        Ok(file) => {
            let filter = tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("qtop=debug"));
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        Err(e) => eprintln!("Warning: could not open log file '{}': {}", path, e),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let (mut config, warnings) = TopConfig::load();
    for warning in &warnings {
        eprintln!("Warning: {}", warning);
    }

    // CLI flags override config and environment
    if let Some(theme) = cli.theme {
        config.display.theme = theme;
    }
    if let Some(path) = cli.slurm_path {
        config.system.slurm_bin_path = Some(path);
    }

    let queue = SlurmQueue::with_config(config.system.slurm_bin_path.as_deref());

    if let Err(e) = queue.test_connection() {
        eprintln!("Error: Unable to connect to Slurm: {}", e);
        eprintln!("Make sure squeue/scontrol are available.");
        std::process::exit(1);
    }

    let username = cli.user.unwrap_or_else(SlurmQueue::current_user);

    if cli.watch > 0.0 {
        watch_loop(cli.watch, || {
            let snapshot = QueueSnapshot::fetch(&queue, &username);
            Ok(display::format_snapshot(&snapshot))
        })
    } else if cli.once {
        let snapshot = QueueSnapshot::fetch(&queue, &username);
        println!("{}", display::format_snapshot(&snapshot));
        Ok(())
    } else {
        tui::run(username, config, &queue)
    }
}

/// Watch loop that repeatedly renders the snapshot with flicker-free updates
fn watch_loop<F>(interval: f64, render: F) -> Result<()>
where
    F: Fn() -> Result<String>,
{
    // Set up Ctrl+C handler
    let running = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, std::sync::atomic::Ordering::SeqCst);
    })?;

    // Enter alternate screen buffer and hide cursor for clean display
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;

    let cleanup = || -> Result<()> {
        let mut stdout = io::stdout();
        execute!(stdout, Show, LeaveAlternateScreen)?;
        Ok(())
    };

    let result = (|| -> Result<()> {
        while running.load(std::sync::atomic::Ordering::SeqCst) {
            let now = chrono::Local::now();
            let timestamp = now.format("%Y-%m-%d %H:%M:%S");

            let output = match render() {
                Ok(s) => s,
                Err(e) => format!("Error: {}", e),
            };

            let screen_content = format!(
                "{}\n\nLast updated: {} | Refreshing every {}s | Press Ctrl+C to exit",
                output, timestamp, interval
            );

            // Write everything at once with synchronized update (DEC private
            // mode) so the terminal paints the full frame in one go
            write!(stdout, "\x1B[?2026h")?;
            write!(stdout, "\x1B[H{}\x1B[J", screen_content)?;
            write!(stdout, "\x1B[?2026l")?;
            stdout.flush()?;

            thread::sleep(Duration::from_secs_f64(interval));
        }
        Ok(())
    })();

    // Always clean up terminal state
    cleanup()?;

    println!("Watch mode stopped.");

    result
}
