use std::fs::OpenOptions;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use companion_core::{memory, CompanionClient, CompanionService, Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod tui;
mod ui;

use app::App;

/// Log filter variable, e.g. `COMPANION_LOG=companion_core=debug`
const LOG_ENV: &str = "COMPANION_LOG";

#[derive(Parser)]
#[command(name = "companion", version)]
#[command(about = "Terminal client for the AI Companion memory and personality service")]
struct Cli {
    /// Base URL of the companion service (overrides config and COMPANION_API_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive client (default)
    Chat {
        /// Personality to start with, e.g. witty_friend
        #[arg(short, long)]
        personality: Option<String>,
    },
    /// Print the sample conversation
    Sample,
    /// Extract memory from a JSON list of messages
    Extract {
        /// JSON file, or - for stdin
        input: PathBuf,
    },
    /// Ask every personality to answer one message
    Compare {
        message: String,
    },
    /// List available personalities
    Personalities,
    /// Check that the service is up
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("{}: {}", "Ignoring config".yellow(), e);
        Config::new()
    });
    let base_url = cli.base_url.clone().unwrap_or_else(|| config.resolved_base_url());
    let client = CompanionClient::new(&base_url);

    let interactive = matches!(cli.command, None | Some(Commands::Chat { .. }));
    init_logging(interactive);
    info!(%base_url, "companion client starting");

    match cli.command {
        None => run_tui(client, &config, None).await?,
        Some(Commands::Chat { personality }) => {
            run_tui(client, &config, personality.as_deref()).await?
        }
        Some(Commands::Sample) => print_sample(&client).await?,
        Some(Commands::Extract { input }) => print_memory(&client, &input).await?,
        Some(Commands::Compare { message }) => print_comparison(&client, &message).await?,
        Some(Commands::Personalities) => print_personalities(&client).await?,
        Some(Commands::Health) => print_health(&client).await?,
    }

    Ok(())
}

/// The TUI owns the terminal, so its logs go to a file in the config dir
fn init_logging(to_file: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    if !to_file {
        builder.with_writer(std::io::stderr).init();
        return;
    }

    let log_file = Config::config_dir().ok().and_then(|dir| {
        std::fs::create_dir_all(&dir).ok()?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("companion.log"))
            .ok()
    });

    match log_file {
        Some(file) => builder.with_ansi(false).with_writer(Mutex::new(file)).init(),
        None => builder.with_writer(std::io::sink).init(),
    }
}

async fn run_tui(client: CompanionClient, config: &Config, personality: Option<&str>) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut app = App::new(client, config, personality);
    app.refresh_catalog();
    let mut events = tui::EventHandler::new();

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;
            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event).await?,
                None => break,
            }
        }
        anyhow::Ok(())
    }
    .await;

    tui::restore()?;
    result
}

fn service_hint(base_url: &str) {
    println!(
        "Make sure the companion service is running at {}",
        base_url.bold()
    );
}

async fn print_sample(client: &CompanionClient) -> Result<()> {
    match memory::load_sample(client).await {
        Ok(sample) => println!("{}", sample),
        Err(e) => {
            println!("{}: {}", "Error".red(), e);
            service_hint(client.base_url());
        }
    }
    Ok(())
}

async fn print_memory(client: &CompanionClient, input: &Path) -> Result<()> {
    let raw = if input.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("reading {}", input.display()))?
    };

    let memory = match memory::extract_memory(client, &raw).await {
        Ok(memory) => memory,
        Err(e) => {
            println!("{}: {}", "Error".red(), e);
            if e.is_request() {
                service_hint(client.base_url());
            }
            return Ok(());
        }
    };

    println!("\n{}", "🧠 Extracted Memory".bold().blue());
    println!("{}", "=".repeat(40).dimmed());
    for (label, items) in memory::format_memory(&memory) {
        println!("\n{}", label.bold().green());
        if items.is_empty() {
            println!("  {}", "(none)".dimmed());
        }
        for item in items {
            println!("  • {}", item);
        }
    }

    Ok(())
}

async fn print_comparison(client: &CompanionClient, message: &str) -> Result<()> {
    match companion_core::compare_personalities(client, message, None).await {
        Ok(responses) => {
            println!("💬 {}\n", message.trim().bold().cyan());
            for (name, response) in responses {
                println!("{}", name.bold().magenta());
                println!("{}\n", response);
            }
        }
        Err(e) => {
            println!("{}: {}", "Error".red(), e);
            if e.is_request() {
                service_hint(client.base_url());
            }
        }
    }

    Ok(())
}

async fn print_personalities(client: &CompanionClient) -> Result<()> {
    println!("\n{}", "🎭 Available Personalities".bold().blue());
    println!("{}", "=".repeat(30).dimmed());

    let catalog = match client.personalities().await {
        Ok(map) => companion_core::Catalog::from_service(map),
        Err(e) => {
            println!("{} ({}), showing built-in list", "Service unavailable".yellow(), e);
            companion_core::Catalog::builtin()
        }
    };

    for index in 0..catalog.len() {
        if let Some((id, info)) = catalog.get(index) {
            println!("  • {} ({})", info.name.green(), id.dimmed());
            println!("    {}", info.description);
        }
    }

    Ok(())
}

async fn print_health(client: &CompanionClient) -> Result<()> {
    match client.health().await {
        Ok(health) => println!(
            "{} {} v{} at {}",
            health.status.green().bold(),
            health.service,
            health.version,
            client.base_url()
        ),
        Err(e) => {
            println!("{}: {}", "Service unreachable".red(), e);
            service_hint(client.base_url());
        }
    }
    Ok(())
}
