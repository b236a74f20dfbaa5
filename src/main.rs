//! pocket - terminal client for the Pocket AI assistant
//!
//! ## Usage
//!
//! ```bash
//! # Talk to the backend on http://localhost:8000
//! pocket
//!
//! # Another backend, verbose logging
//! pocket --base-url http://192.168.1.20:8000 -v
//!
//! # Custom config file and log directory
//! pocket --config ./client.yaml --log-dir /tmp/pocket-logs
//! ```

use std::io::Write;
use std::panic;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use pocket_client::{ClientConfig, HttpBackend};
use pocket_core::{LogGuard, init_logging};
use pocket_tui::App;
use tracing::{error, info};

/// Pocket AI terminal client
///
/// Chat with the Pocket AI backend and inspect its security profile and
/// app routing.
#[derive(Parser, Debug)]
#[command(name = "pocket")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging (increases log level)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Directory for log files (defaults to ~/.pocket/logs/)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Client config file (defaults to ~/.pocket/client.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend base URL; overrides the config file and POCKET_BASE_URL
    #[arg(long)]
    base_url: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match setup_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::from(1);
        }
    };

    install_panic_hook();

    match run(&cli) {
        Ok(()) => {
            info!("pocket exited normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("pocket error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli)?;
    info!(base_url = %config.base_url, timeout_secs = config.timeout_secs, "starting pocket");

    let backend = HttpBackend::from_config(&config)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;

    let mut app = App::new(Arc::new(backend), runtime.handle().clone(), &config.greeting);
    app.run().map_err(|e| anyhow::anyhow!("{}", e))?;

    runtime.shutdown_background();
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::load(cli.config.as_deref()).map_err(|e| {
        match e.guidance() {
            Some(hint) => anyhow::anyhow!("{} ({})", e, hint),
            None => anyhow::Error::new(e),
        }
    })?;

    if let Some(url) = &cli.base_url {
        config = config.with_base_url(url.clone());
        config.validate()?;
    }

    Ok(config)
}

/// Restore the terminal before the default hook prints the panic.
fn install_panic_hook() {
    let original_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}

fn restore_terminal() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    let _ = crossterm::terminal::disable_raw_mode();
    crossterm::execute!(
        stdout,
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::cursor::Show
    )?;
    stdout.flush()
}

/// The shell owns the terminal, so logs go to file only.
fn setup_logging(cli: &Cli) -> pocket_core::Result<LogGuard> {
    init_logging(cli.log_dir.clone(), cli.verbose > 0, false)
}
