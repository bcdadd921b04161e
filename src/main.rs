mod api;
mod app;
mod config;
mod contact;
mod gallery;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use api::ApiClient;
use app::App;
use config::AppConfig;
use contact::{ContactMessage, Rejected, SubmitFlow};

#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "A terminal client for a personal-portfolio API: projects and contact form")]
struct Args {
    /// Base URL of the portfolio API (overrides FOLIO_API_URL and the config file)
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Print the project list as JSON
    #[arg(short, long)]
    projects: bool,

    /// Check that the API is up and print its health JSON
    #[arg(long)]
    health: bool,

    /// Send a contact message without starting the TUI
    #[arg(short, long)]
    send: bool,

    /// Sender name (with --send)
    #[arg(long)]
    name: Option<String>,

    /// Reply-to address (with --send)
    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    subject: Option<String>,

    #[arg(long)]
    message: Option<String>,
}

impl Args {
    fn is_tui(&self) -> bool {
        !(self.projects || self.health || self.send)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(args.is_tui());

    let config = AppConfig::load().unwrap_or_default();
    let api_url = config.resolve_api_url(args.api_url.as_deref());
    let client = ApiClient::new(&api_url, config.request_timeout())?;
    tracing::info!("Using portfolio API at {}", api_url);

    // Handle CLI-only commands
    if args.health {
        return print_health(&client).await;
    }

    if args.projects {
        return print_projects(&client).await;
    }

    if args.send {
        let message = ContactMessage::new(
            args.name.unwrap_or_default(),
            args.email.unwrap_or_default(),
            args.subject.unwrap_or_default(),
            args.message.unwrap_or_default(),
        );
        return send_message(&client, &config, message).await;
    }

    // Run TUI
    run_tui(config, client)
}

/// TUI mode logs to a file so output does not land on the alternate screen
fn init_logging(tui: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("folio=info"));
    let registry = tracing_subscriber::registry().with(filter);

    if !tui {
        registry.with(tracing_subscriber::fmt::layer().with_writer(io::stderr)).init();
        return;
    }

    match open_log_file() {
        Ok(file) => registry
            .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(std::sync::Mutex::new(file)))
            .init(),
        // No log destination; keep the screen clean
        Err(_) => registry.init(),
    }
}

fn open_log_file() -> Result<std::fs::File> {
    let dir = dirs::cache_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?
        .join("folio");
    std::fs::create_dir_all(&dir)?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("folio.log"))?;
    Ok(file)
}

async fn print_health(client: &ApiClient) -> Result<()> {
    let health = client
        .health()
        .await
        .with_context(|| format!("API at {} is not reachable", client.base_url()))?;
    println!("{}", serde_json::to_string(&health)?);
    Ok(())
}

async fn print_projects(client: &ApiClient) -> Result<()> {
    let projects = client.list_projects().await.context(gallery::LOAD_FAILED)?;
    println!("{}", serde_json::to_string_pretty(&projects)?);
    Ok(())
}

/// Headless version of the form flow: same validation, same messages
async fn send_message(client: &ApiClient, config: &AppConfig, message: ContactMessage) -> Result<()> {
    let mut flow = SubmitFlow::new(config.reset_delay());
    flow.edit(|form| {
        for field in contact::Field::ALL {
            form.update(field, message.get(field));
        }
    });

    let snapshot = match flow.begin_submit() {
        Ok(snapshot) => snapshot,
        Err(Rejected::Invalid(err)) => anyhow::bail!("{} ({} is empty)", err, err.field().label()),
        Err(Rejected::Busy) => anyhow::bail!("A message is already being sent"),
    };

    match client.submit_contact(&snapshot).await {
        Ok(response) => {
            flow.complete(response.message, std::time::Instant::now());
            if config.notifications {
                notify_sent();
            }
        }
        Err(e) => {
            tracing::warn!("Contact submission failed: {}", e);
            flow.fail(e.user_message());
        }
    }

    match flow.banner() {
        Some((contact::BannerKind::Error, text)) => anyhow::bail!("{}", text),
        Some((_, text)) => println!("{}", text),
        None => {}
    }
    Ok(())
}

fn run_tui(config: AppConfig, client: ApiClient) -> Result<()> {
    ui::init_theme(&config.theme);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::new(config, client);

    // Main loop
    let result = run_app(&mut terminal, &mut app);

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
) -> Result<()> {
    // Projects load in the background; the list shows its loading state until then
    app.refresh_projects();

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            if app.is_submitting() {
                tracing::warn!("Quitting with a contact message still in flight");
            } else if !app.contact.form().draft().is_blank() {
                tracing::info!("Discarding unsent draft");
            }
            return Ok(());
        }

        // Collect background results, clear the form after success
        app.tick();
    }
}

/// Desktop notification after a send. Headless hosts often have no
/// notification daemon; that is logged and otherwise ignored.
fn notify_sent() {
    let shown = notify_rust::Notification::new()
        .summary("folio")
        .body("Message sent")
        .icon("mail-send")
        .show();
    if let Err(e) = shown {
        tracing::warn!("Notification failed: {}", e);
    }
}
