use anyhow::{bail, Context, Result};
use clap::Parser;
use graphite_trust::{
    api::{BalanceHistoryOptions, PageOptions, SortOrder},
    config::Config,
    query::{is_address_ready, is_text_ready},
    Dashboard,
};
use log::info;

/// Wallet trust scores, compliance and activity from the Graphite explorer
#[derive(Parser)]
#[clap(name = "graphite_trust")]
#[clap(about = "Show trust score, compliance and activity for a wallet or search term")]
struct Args {
    /// Wallet address (0x...) or free-text search term
    query: String,

    /// Rows shown by the list cards
    #[clap(long, default_value = "10")]
    limit: u64,

    /// Oldest balance changes first
    #[clap(long)]
    ascending: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::from_env()?;
    info!("Using explorer API at {}", config.api_base_url);

    let sort = if args.ascending {
        SortOrder::Asc
    } else {
        SortOrder::Desc
    };
    let dashboard = Dashboard::from_config(&config)
        .context("failed to build explorer client")?
        .with_page(PageOptions {
            offset: 0,
            limit: args.limit,
        })
        .with_history_options(
            BalanceHistoryOptions::default()
                .with_page(0, args.limit)
                .with_sort(sort),
        );

    let query = args.query.trim();
    if is_address_ready(query) {
        let wallet = dashboard.wallet(query).await;
        println!("{}", wallet);
        if wallet.failed_cards() == wallet.cards.len() {
            bail!("no data could be loaded for {}", query);
        }
    } else if is_text_ready(query) {
        let view = dashboard.search(query).await;
        println!("{}", view);
        if let Some(err) = view.outcome.search.error() {
            bail!("search failed: {}", err);
        }
        if let Some(address) = view.selected_address().filter(|a| is_address_ready(a)) {
            println!("{}", dashboard.wallet(address).await);
        }
    } else {
        bail!("expected a wallet address or a search term");
    }

    Ok(())
}
