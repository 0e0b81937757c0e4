use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use harvest_core::{AssistantView, Config, QaClient};

mod app;
mod clipboard;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use clipboard::SystemClipboard;
use logging::LogLevel;

#[derive(Parser)]
#[command(name = "harvest", version)]
#[command(about = "Ask harvest-readiness questions from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Q&A service origin (overrides HARVEST_SERVICE_URL and the config file)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Enable verbose (trace-level) logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the interactive assistant (default)
    Tui,
    /// Ask a single question and print the answer
    Ask {
        /// Your question
        question: String,
        /// Print the exchange as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or update configuration
    Config {
        /// Persist a new Q&A service origin
        #[arg(long)]
        set_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = LogLevel {
        debug: cli.debug,
        verbose: cli.verbose,
    };

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let log_path = logging::init_file(level)?;
            tracing::info!(path = %log_path.display(), "harvest assistant starting");
            let (client, url) = build_client(cli.url.as_deref())?;
            run_tui(client, url).await
        }
        Commands::Ask { question, json } => {
            logging::init_stderr(level);
            let (client, _) = build_client(cli.url.as_deref())?;
            ask_once(&client, &question, json).await
        }
        Commands::Config { set_url } => {
            logging::init_stderr(level);
            show_config(set_url, cli.url.as_deref())
        }
    }
}

fn load_config() -> Config {
    Config::load().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "ignoring unreadable config");
        Config::new()
    })
}

fn build_client(url_flag: Option<&str>) -> Result<(QaClient, String)> {
    let config = load_config();
    let url = config.resolve_service_url(url_flag);
    let client = match config.timeout() {
        Some(timeout) => QaClient::with_timeout(&url, timeout)?,
        None => QaClient::new(&url),
    };
    Ok((client, url))
}

async fn run_tui(client: QaClient, service_url: String) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();
    let mut app = App::new(Arc::new(client), service_url, Box::new(SystemClipboard::new()));

    let result = run_loop(&mut terminal, &mut events, &mut app).await;

    tui::restore()?;
    tracing::info!(exchanges = app.view.history().len(), "session ended");
    result
}

async fn run_loop(terminal: &mut tui::Tui, events: &mut tui::EventHandler, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }

        app.poll_query_task().await;
    }
    Ok(())
}

async fn ask_once(client: &QaClient, question: &str, json: bool) -> Result<()> {
    if question.trim().is_empty() {
        bail!("question must not be empty");
    }

    let mut view = AssistantView::new();
    *view.question_mut() = question.to_string();

    if view.submit_with(client).await.is_none() {
        if let Some(message) = view.failure() {
            bail!("{} (service: {})", message, client.ask_url());
        }
        eprintln!("The service returned an empty answer.");
        return Ok(());
    }

    if let Some(item) = view.selected() {
        if json {
            println!("{}", serde_json::to_string_pretty(item)?);
        } else {
            println!("{}", item.answer);
        }
    }
    Ok(())
}

fn show_config(set_url: Option<String>, url_flag: Option<&str>) -> Result<()> {
    let path = Config::config_path()?;
    let mut config = Config::load()?;

    if let Some(url) = set_url {
        config.service_url = Some(url);
        config.save()?;
        println!("Saved {}", path.display());
    }

    println!("config file:  {}", path.display());
    println!("service url:  {}", config.resolve_service_url(url_flag));
    match config.timeout_secs {
        Some(secs) => println!("timeout:      {}s", secs),
        None => println!("timeout:      none"),
    }
    println!("log file:     {}", logging::log_file_path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_to_tui() {
        let cli = Cli::try_parse_from(["harvest"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_ask_with_global_flags() {
        let cli = Cli::try_parse_from([
            "harvest",
            "ask",
            "When is wheat ready?",
            "--json",
            "--url",
            "http://farm.local:8000",
        ])
        .unwrap();

        assert_eq!(cli.url.as_deref(), Some("http://farm.local:8000"));
        match cli.command {
            Some(Commands::Ask { question, json }) => {
                assert_eq!(question, "When is wheat ready?");
                assert!(json);
            }
            _ => panic!("expected ask subcommand"),
        }
    }

    #[tokio::test]
    async fn test_ask_once_rejects_empty_question() {
        let client = QaClient::new("http://127.0.0.1:9");
        let err = ask_once(&client, "   ", false).await.unwrap_err();
        assert_eq!(err.to_string(), "question must not be empty");
    }
}
