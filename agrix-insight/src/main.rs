//! agrix-insight CLI
//!
//! Fetches from the record store and prints category summaries, monthly
//! totals or an inventory view as JSON.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use agrix_common::config::{ConfigResolver, TomlConfig};
use agrix_common::events::EventBus;
use agrix_insight::debounce::Debouncer;
use agrix_insight::query::FilterChange;
use agrix_insight::store::HttpRecordStore;
use agrix_insight::{
    Category, FetchOrchestrator, FetchOutcome, FetchSettings, InventorySession, RecordKind,
};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const INVENTORY_VIEW: &str = "inventory";

/// Command-line arguments for agrix-insight
#[derive(Parser, Debug)]
#[command(name = "agrix-insight")]
#[command(about = "Production summaries and inventory queries over the agrix record store")]
#[command(version)]
struct Args {
    /// Configuration file (overrides AGRIX_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Record store base URL
    #[arg(long, global = true)]
    store_url: Option<String>,

    /// Log filter, e.g. "debug" or "agrix_insight=trace"
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Category summaries with percentage breakdowns
    Summary {
        /// Only this category (e.g. "rice", "legumes", "hvc")
        #[arg(long)]
        category: Option<Category>,
    },

    /// Production per calendar month
    Months {
        #[arg(long, default_value = "high_value_crops")]
        category: Category,
    },

    /// One page of an inventory view
    List {
        kind: RecordKind,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        barangay: Option<String>,
        #[arg(long)]
        month: Option<u32>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Defaults to [query] page_size
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// Filter options of an inventory view
    Options { kind: RecordKind },

    /// Interactive search: each stdin line is a search term, debounced
    Browse { kind: RecordKind },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (mut config, source) = ConfigResolver::new(args.config.clone())
        .resolve()
        .context("Failed to load configuration")?;
    config.apply_store_url_override(args.store_url.as_deref());

    init_tracing(args.log_level.as_deref().unwrap_or(&config.logging.level));

    info!(
        "Starting agrix-insight v{} (config: {:?}, store: {})",
        env!("CARGO_PKG_VERSION"),
        source,
        config.store.base_url
    );

    let store = HttpRecordStore::new(&config.store).context("Failed to build store client")?;
    let orchestrator = Arc::new(FetchOrchestrator::new(
        Arc::new(store),
        FetchSettings::from_config(&config),
        EventBus::new(64),
    ));

    let root = orchestrator.root_token().clone();
    tokio::spawn(cancel_on_ctrl_c(root));

    match args.command {
        Command::Summary { category } => summary(&orchestrator, category).await,
        Command::Months { category } => months(&orchestrator, category).await,
        Command::List {
            kind,
            search,
            barangay,
            month,
            year,
            page,
            page_size,
        } => {
            let mut session =
                open_session(&orchestrator, &config, kind, config.query.page_size).await?;
            if let Some(page_size) = page_size {
                session.set_page_size(page_size);
            }
            session.set_filter(FilterChange::Search(search.unwrap_or_default()));
            session.set_filter(FilterChange::Barangay(barangay));
            session.set_filter(FilterChange::Month(month));
            session.set_filter(FilterChange::Year(year));
            session.set_page(page);
            print_json(&session.view())
        }
        Command::Options { kind } => {
            let session = open_session(&orchestrator, &config, kind, config.query.page_size).await?;
            print_json(session.engine().options())
        }
        Command::Browse { kind } => {
            let session = open_session(&orchestrator, &config, kind, config.query.page_size).await?;
            let window = Duration::from_millis(config.query.search_debounce_ms);
            browse(session, window, orchestrator.root_token().clone()).await
        }
    }
}

fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn cancel_on_ctrl_c(token: CancellationToken) {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received Ctrl+C, cancelling fetches");
            token.cancel();
        }
        Err(e) => warn!("Failed to install Ctrl+C handler: {}", e),
    }
}

async fn summary(orchestrator: &FetchOrchestrator, category: Option<Category>) -> Result<()> {
    let token = orchestrator.root_token().child_token();
    let dataset = orchestrator.fetch_analytics(&token).await?;

    #[derive(Serialize)]
    struct Report {
        category: Category,
        display_name: &'static str,
        unit: &'static str,
        total: f64,
        items: Vec<agrix_insight::aggregate::ItemShare>,
    }

    let summaries = match category {
        Some(category) => vec![dataset.summary(category)],
        None => dataset.summaries(),
    };
    let report: Vec<Report> = summaries
        .iter()
        .map(|s| Report {
            category: s.category,
            display_name: s.display_name,
            unit: s.unit,
            total: s.total,
            items: s.percentages(),
        })
        .collect();

    print_json(&report)
}

async fn months(orchestrator: &FetchOrchestrator, category: Category) -> Result<()> {
    let token = orchestrator.root_token().child_token();
    let dataset = orchestrator.fetch_analytics(&token).await?;
    print_json(&dataset.monthly(category))
}

async fn open_session(
    orchestrator: &Arc<FetchOrchestrator>,
    config: &TomlConfig,
    kind: RecordKind,
    page_size: usize,
) -> Result<InventorySession> {
    let mut session = InventorySession::new(Arc::clone(orchestrator), INVENTORY_VIEW, kind, page_size);
    match session.select_kind(kind).await {
        FetchOutcome::Loaded { snapshot, .. } => {
            info!(kind = %kind, records = snapshot.len(), "Inventory loaded");
        }
        FetchOutcome::Cancelled => bail!("Fetch of {} cancelled", kind),
        FetchOutcome::Failed { error, .. } => {
            return Err(error).with_context(|| format!("Record store at {}", config.store.base_url));
        }
    }
    Ok(session)
}

async fn browse(
    mut session: InventorySession,
    window: Duration,
    token: CancellationToken,
) -> Result<()> {
    let (debouncer, mut settled) = Debouncer::new(window);
    let mut debouncer = Some(debouncer);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_json(&session.view())?;

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            line = lines.next_line(), if debouncer.is_some() => {
                match line.context("Failed to read search input")? {
                    Some(text) => {
                        if let Some(debouncer) = &debouncer {
                            debouncer.push(text);
                        }
                    }
                    // End of input: flush the pending term
                    None => {
                        if let Some(debouncer) = debouncer.take() {
                            debouncer.finish().await;
                        }
                    }
                }
            }
            search = settled.recv() => match search {
                Some(text) => {
                    session.set_filter(FilterChange::Search(text));
                    print_json(&session.view())?;
                }
                None => break,
            },
        }
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to render output")?;
    println!("{text}");
    Ok(())
}
