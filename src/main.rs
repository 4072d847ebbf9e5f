// SPDX-License-Identifier: MIT

use arbscout::app::config::GlobalSettings;
use arbscout::app::logging::setup_logging;
use arbscout::domain::error::AppError;
use arbscout::domain::opportunity::ArbitrageOpportunity;
use arbscout::domain::token::TokenRegistry;
use arbscout::domain::venue::VenueKind;
use arbscout::infrastructure::network::gas::GasOracle;
use arbscout::infrastructure::network::provider::ConnectionFactory;
use arbscout::infrastructure::network::reads::{DexReads, RpcReads};
use arbscout::services::engine::Engine;
use arbscout::services::evaluator::{EvaluatorConfig, ProfitabilityEvaluator};
use arbscout::services::quote::aggregator::VenueAggregator;
use arbscout::services::quote::v2::V2QuoteAdapter;
use arbscout::services::quote::v3::V3QuoteAdapter;
use arbscout::services::quote::{PairCache, QuoteAdapter};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(author, version, about = "arbscout")]
struct Cli {
    /// Path to config file (default: config.{toml,yaml,...})
    #[arg(long)]
    config: Option<String>,

    /// Evaluate and log only, never hand opportunities to execution
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Slippage basis points (overrides config)
    #[arg(long)]
    slippage_bps: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let settings = GlobalSettings::load(cli.config.as_deref())?;
    setup_logging(&settings.log_level, settings.log_json);

    let provider = ConnectionFactory::http(&settings.rpc_url)?;
    let ws_provider = match &settings.ws_url {
        Some(url) => Some(ConnectionFactory::ws(url).await?),
        None => None,
    };

    let wrapped_native = settings.wrapped_native()?;
    let registry = TokenRegistry::new(provider.clone(), settings.static_token_map());
    let native = registry.resolve(wrapped_native).await?;
    tracing::info!(
        target: "app",
        chain_id = settings.chain_id,
        wrapped_native = %native.symbol,
        "Connected"
    );

    let pair_cache = Arc::new(PairCache::new(
        Duration::from_secs(settings.pair_cache_ttl_secs),
        settings.pair_cache_capacity,
    ));

    let reads: Arc<dyn DexReads> = Arc::new(RpcReads::new(provider.clone()));
    let mut adapters: Vec<Arc<dyn QuoteAdapter>> = Vec::new();
    for venue in settings.build_venues()? {
        let adapter: Arc<dyn QuoteAdapter> = match venue.kind {
            VenueKind::ConstantProduct => Arc::new(V2QuoteAdapter::new(
                reads.clone(),
                venue,
                wrapped_native,
                pair_cache.clone(),
            )?),
            VenueKind::ConcentratedLiquidity => Arc::new(V3QuoteAdapter::new(
                reads.clone(),
                venue,
                wrapped_native,
            )?),
        };
        tracing::info!(target: "app", venue = adapter.venue_name(), "Venue registered");
        adapters.push(adapter);
    }

    let quote_timeout = Duration::from_millis(settings.quote_timeout_ms);
    let aggregator = Arc::new(VenueAggregator::new(
        adapters.clone(),
        settings.max_concurrent_quotes,
        quote_timeout,
    ));

    // Native-price lookups go through the trusted venue alone when one is
    // configured, otherwise through the full whitelist.
    let price_paths = match &settings.trusted_price_venue {
        Some(name) => {
            let trusted: Vec<Arc<dyn QuoteAdapter>> = adapters
                .iter()
                .filter(|a| a.venue_name() == name)
                .cloned()
                .collect();
            Arc::new(VenueAggregator::new(
                trusted,
                settings.max_concurrent_quotes,
                quote_timeout,
            ))
        }
        None => aggregator.clone(),
    };

    let gas = Arc::new(GasOracle::new(provider.clone()));
    let evaluator = Arc::new(ProfitabilityEvaluator::new(
        aggregator,
        price_paths,
        gas,
        EvaluatorConfig {
            slippage_bps: cli.slippage_bps.unwrap_or(settings.slippage_bps),
            gas_limit: settings.gas_limit,
            gas_strategy: settings.gas_strategy(),
            wrapped_native,
        },
    ));

    let dry_run = cli.dry_run || settings.dry_run;
    let (handoff_tx, mut handoff_rx) = mpsc::unbounded_channel::<ArbitrageOpportunity>();
    let handoff = if dry_run { None } else { Some(handoff_tx) };

    // Stand-in for the execution layer; opportunities that clear the
    // threshold land here.
    tokio::spawn(async move {
        while let Some(opp) = handoff_rx.recv().await {
            tracing::info!(
                target: "handoff",
                loan = %opp.loan_token.symbol,
                target = %opp.target_token.symbol,
                net_profit = %opp.net_profit,
                "Opportunity handed off"
            );
        }
    });

    let shutdown = CancellationToken::new();
    let ctrl_c_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!(target: "app", "Shutdown signal received");
            ctrl_c_token.cancel();
        }
    });

    let engine = Engine::new(
        evaluator,
        settings.trade_tuples()?,
        ws_provider,
        Duration::from_millis(settings.scan_interval_ms),
        dry_run,
        handoff,
        shutdown,
    );
    engine.run().await
}
