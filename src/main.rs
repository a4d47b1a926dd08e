use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ragdash::config::{ConfigError, DashboardConfig};
use ragdash::dashboard::Dashboard;
use ragdash::dashboard::events::EventTable;
use ragdash::dashboard::scheduler::Scheduler;
use ragdash::net::api::{Backend, HttpBackend};
use ragdash::net::error::ApiError;
use ragdash::net::types::SearchQuery;
use ragdash::render::text;
use ragdash::serve::{ServeState, app};
use ragdash::state::ViewState;

const DEFAULT_LOG_FILTER: &str = "ragdash=info,tower_http=info";
const EXIT_WORDS: &[&str] = &["quit", "exit", "bye", "goodbye"];

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("backend request failed: {0}")]
    Api(#[from] ApiError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{failed} of {total} uploads did not succeed")]
    UploadIncomplete { failed: usize, total: usize },
}

#[derive(Parser, Debug)]
#[command(name = "ragdash", about = "Dashboard client for a RAG document backend")]
struct Cli {
    /// Overrides RAGDASH_BACKEND_URL from the config.
    #[arg(long, env = "RAGDASH_BACKEND_URL")]
    backend_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll the backend and serve the dashboard page.
    Serve {
        #[arg(long, env = "RAGDASH_LISTEN_ADDR")]
        listen: Option<String>,
    },
    /// Service health.
    Status,
    Documents,
    Collections,
    /// Entries of one collection.
    Collection { name: String },
    Search {
        query: String,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        sort: Option<String>,
    },
    /// Send one message, or start an interactive session when none is given.
    Chat { message: Option<String> },
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    Delete { file_id: String },
    /// Remove every document from the backend.
    Clear {
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = DashboardConfig::from_env()?;
    if let Some(url) = &cli.backend_url {
        config.set_backend_url(url)?;
    }

    let backend: Arc<dyn Backend> = Arc::new(HttpBackend::from_config(&config)?);
    let dashboard = Arc::new(Dashboard::new(backend, config.limits));

    match cli.command {
        Command::Serve { listen } => {
            let addr = listen.unwrap_or_else(|| config.listen_addr.clone());
            run_serve(dashboard, &config, &addr).await
        }
        Command::Status => {
            let result = dashboard.refresh_health().await;
            print_view(&dashboard, |s| text::health_text(&s.health));
            result.map(|_| ()).map_err(CliError::from)
        }
        Command::Documents => {
            let result = dashboard.refresh_documents().await;
            print_view(&dashboard, |s| text::documents_text(&s.documents));
            result.map(|_| ()).map_err(CliError::from)
        }
        Command::Collections => {
            let result = dashboard.refresh_collections().await;
            print_view(&dashboard, |s| text::collections_text(&s.collections));
            result.map(|_| ()).map_err(CliError::from)
        }
        Command::Collection { name } => {
            let result = dashboard.view_collection(&name).await;
            print_view(&dashboard, |s| text::collection_detail_text(&s.collection_detail));
            result.map(|_| ()).map_err(CliError::from)
        }
        Command::Search { query, limit, language, sort } => {
            let query = SearchQuery { query, limit: limit.unwrap_or(0), language, sort };
            let result = dashboard.search_with(query).await;
            print_view(&dashboard, |s| text::search_text(&s.search));
            result.map(|_| ()).map_err(CliError::from)
        }
        Command::Chat { message: Some(message) } => {
            let outcome = dashboard.send_chat(&message).await;
            print_view(&dashboard, |s| text::chat_text(s.chat.messages()));
            match outcome.and_then(|o| o.error) {
                Some(e) => Err(e.into()),
                None => Ok(()),
            }
        }
        Command::Chat { message: None } => run_chat_repl(&dashboard).await,
        Command::Upload { files } => {
            let report = dashboard.upload_paths(&files).await;
            print_view(&dashboard, |s| text::uploads_text(&s.uploads));
            let failed = report.files.len() - report.succeeded();
            if failed > 0 {
                return Err(CliError::UploadIncomplete { failed, total: report.files.len() });
            }
            Ok(())
        }
        Command::Delete { file_id } => {
            let result = dashboard.delete_document(&file_id).await;
            print_view(&dashboard, |s| text::notifications_text(&s.notifications));
            result.map_err(CliError::from)
        }
        Command::Clear { yes } => {
            if !yes && !confirm("Delete ALL documents from the backend? Type 'yes' to continue: ").await? {
                println!("Aborted.");
                return Ok(());
            }
            let result = dashboard.clear_all().await;
            print_view(&dashboard, |s| text::notifications_text(&s.notifications));
            result.map_err(CliError::from)
        }
    }
}

fn print_view(dashboard: &Dashboard, render: impl FnOnce(&ViewState) -> String) {
    print!("{}", dashboard.store().read(render));
}

async fn run_serve(dashboard: Arc<Dashboard>, config: &DashboardConfig, addr: &str) -> Result<(), CliError> {
    let mut scheduler = Scheduler::new();
    dashboard.start_polling(&mut scheduler, &config.intervals);

    let state = ServeState {
        dashboard,
        events: Arc::new(EventTable::standard()),
        refresh_secs: config.intervals.health.as_secs(),
    };
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, backend = %config.backend_url, "dashboard listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    scheduler.cancel_all();
    info!("dashboard stopped");
    Ok(())
}

async fn run_chat_repl(dashboard: &Dashboard) -> Result<(), CliError> {
    println!("Chatting with the RAG backend. Type 'quit' to leave.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if EXIT_WORDS.contains(&line.to_lowercase().as_str()) {
            println!("Goodbye.");
            break;
        }
        if let Some(outcome) = dashboard.send_chat(line).await {
            for reply in &outcome.replies {
                println!("[{}] {reply}", outcome.language);
            }
        }
    }
    Ok(())
}

async fn confirm(prompt: &str) -> Result<bool, CliError> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let answer = lines.next_line().await?.unwrap_or_default();
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}
