//! Course Buddy Entry Point
//!
//! Line-oriented terminal chat with the Course Buddy course search service.
//!
//! # Usage
//!
//! ```bash
//! # Sign in straight away against a local service
//! course-buddy --user ada
//!
//! # Point at another deployment
//! course-buddy --api-url https://buddy.example.com
//!
//! # With verbose logging (to stderr)
//! course-buddy --verbose
//! RUST_LOG=buddy_conductor=trace course-buddy
//! ```
//!
//! # Environment Variables
//!
//! - `BUDDY_API_URL`: Course service base URL (default: http://localhost:8000)
//! - `BUDDY_REQUEST_TIMEOUT_SECS`: Request timeout
//! - `BUDDY_PACING_MIN_MS` / `BUDDY_PACING_MAX_MS`: Reply pacing bounds
//! - `RUST_LOG`: Log level (trace, debug, info, warn, error)

use std::path::PathBuf;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use buddy_conductor::{load_config_from_path, ConfigOverrides};
use course_buddy::commands::{self, Command, USAGE};
use course_buddy::display::DEFAULT_WIDTH;
use course_buddy::{ConductorClient, DisplayState};

/// Find certification courses from your terminal
#[derive(Debug, Parser)]
#[command(name = "course-buddy", version, about)]
struct Args {
    /// Course service base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sign in as this user on startup
    #[arg(long, short)]
    user: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Log at debug level
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("course_buddy={level}").parse()?)
                .add_directive(format!("buddy_conductor={level}").parse()?),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let mut config = load_config_from_path(args.config.clone())?;
    let mut overrides = ConfigOverrides::new();
    if let Some(url) = args.api_url.clone() {
        overrides = overrides.with_api_url(url);
    }
    if let Some(secs) = args.timeout {
        overrides = overrides.with_request_timeout_secs(secs);
    }
    overrides.apply(&mut config)?;

    info!(
        base_url = %config.service.base_url,
        source = %config.source(),
        "Starting Course Buddy"
    );

    let mut client = ConductorClient::from_config(&config)?;
    let width = std::env::var("COLUMNS")
        .ok()
        .and_then(|c| c.parse().ok())
        .unwrap_or(DEFAULT_WIDTH);
    let mut display = DisplayState::new(width);

    println!("{USAGE}");
    match args.user {
        Some(user) => client.login(user).await?,
        None => println!("Sign in with /login NAME."),
    }

    run(&mut client, &mut display).await?;

    info!("Course Buddy exited");
    Ok(())
}

/// Pump stdin lines into the Conductor and Conductor messages to stdout
async fn run(client: &mut ConductorClient, display: &mut DisplayState) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;

    loop {
        tokio::select! {
            msg = client.recv() => {
                let Some(msg) = msg else {
                    debug!("Conductor channel closed");
                    break;
                };
                for line in display.apply(&msg) {
                    println!("{line}");
                }
                if display.quit {
                    break;
                }
            }

            line = lines.next_line(), if input_open => {
                match line? {
                    Some(line) => handle_line(client, display, &line).await?,
                    None => {
                        input_open = false;
                        client.request_quit().await?;
                    }
                }
            }

            _ = tokio::signal::ctrl_c(), if input_open => {
                input_open = false;
                client.request_quit().await?;
            }
        }
    }

    Ok(())
}

async fn handle_line(
    client: &mut ConductorClient,
    display: &DisplayState,
    line: &str,
) -> anyhow::Result<()> {
    let command = match commands::parse(line) {
        Ok(command) => command,
        Err(usage) => {
            println!("{usage}");
            return Ok(());
        }
    };

    match command {
        Command::Submit(text) => {
            client
                .submit(commands::submission(&text, &display.draft))
                .await?;
        }
        Command::Retry => client.retry().await?,
        Command::Pick(n) => match display.suggestion(n) {
            Some(text) => client.pick_suggestion(text.to_string()).await?,
            None => println!("No suggestion {n} to pick."),
        },
        Command::Login(name) => client.login(name).await?,
        Command::Logout => client.logout().await?,
        Command::Quit => client.request_quit().await?,
    }
    Ok(())
}
