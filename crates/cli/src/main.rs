use std::sync::Arc;

use anyhow::{Context, Result};
use atlas_api::{ProviderClient, ProviderEndpoints};
use atlas_engine::listing::{ListView, ParameterStore};
use atlas_engine::{DetailOrchestrator, QueryClient, QueryTtls};
use atlas_types::Region;
use atlas_util::AtlasSettings;
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Debug, Parser)]
#[command(name = "atlas", version, about = "Browse countries with live weather, summaries and photos")]
struct Cli {
    /// Log provider traffic and cache activity to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List countries, filtered and paginated.
    List(ListArgs),
    /// Show one country with its weather, summary and photos.
    Show(ShowArgs),
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Case-insensitive text matched against the common name.
    #[arg(long)]
    query: Option<String>,
    /// Region filter: All, Africa, Americas, Asia, Europe, Oceania or Antarctic.
    #[arg(long)]
    region: Option<Region>,
    #[arg(long)]
    page: Option<usize>,
    #[arg(long)]
    page_size: Option<usize>,
    /// Shareable parameter string, for example "query=fra&region=Europe&page=2".
    /// Explicit flags take precedence.
    #[arg(long, value_name = "QUERY_STRING")]
    params: Option<String>,
    /// Emit JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct ShowArgs {
    /// Country name as displayed in the list.
    #[arg(required = true, num_args = 1..)]
    name: Vec<String>,
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = AtlasSettings::load().context("failed to load settings")?;
    let endpoints = ProviderEndpoints::from_env().context("invalid provider base URL")?;
    let transport = ProviderClient::new().context("failed to build HTTP client")?;
    let client = Arc::new(QueryClient::new(
        Arc::new(transport),
        Arc::new(endpoints),
        QueryTtls::with_overrides(&settings.ttl_overrides),
    ));
    debug!(ttls = ?client.ttls(), photos_enabled = settings.photo_credential().is_some(), "session ready");

    match cli.command {
        Command::List(args) => run_list(&client, args).await,
        Command::Show(args) => {
            let credential = settings.photo_credential().map(str::to_string);
            run_show(client, credential, args).await
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run_list(client: &QueryClient, args: ListArgs) -> Result<()> {
    let store = ParameterStore::from_query_string(args.params.as_deref().unwrap_or_default());
    if let Some(query) = args.query {
        store.set_query(query);
    }
    if let Some(region) = args.region {
        store.set_region(region);
    }
    if let Some(page_size) = args.page_size {
        store.set_page_size(page_size);
    }
    if let Some(page) = args.page {
        store.set_page(page);
    }

    let entities = match client.all_countries().await {
        Ok(entities) => entities,
        Err(error) => {
            eprintln!("error: {error}");
            return Ok(());
        }
    };

    let view = ListView::new(store, entities);
    let projection = view.refresh();
    let share = view.store().to_query_string();
    if args.json {
        let output = serde_json::json!({ "projection": projection, "share": share });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render::list_table(&projection, &share));
    }
    Ok(())
}

async fn run_show(client: Arc<QueryClient>, credential: Option<String>, args: ShowArgs) -> Result<()> {
    let subject = args.name.join(" ");
    let orchestrator = DetailOrchestrator::new(client, credential);
    let snapshot = orchestrator.load(&subject).await;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&render::detail_json(&snapshot))?);
    } else {
        print!("{}", render::detail_text(&snapshot));
    }
    Ok(())
}
