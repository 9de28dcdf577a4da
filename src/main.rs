use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rotabot::api::{BinanceClient, PriceSource};
use rotabot::config::Settings;
use rotabot::execution::{PaperWallet, RotationCycle, TracingNotifier};
use rotabot::strategy::select_best;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "rotabot", about = "Spot rotation bot: RSI/EMA + Bollinger exit and market ranking")]
struct Cli {
    /// Settings file (TOML); `rotabot.toml` when omitted
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyse the watchlist and show the best rotation target
    Scan,
    /// Evaluate both exit horizons for a held asset
    Evaluate {
        #[arg(long)]
        asset: String,
        /// Defaults to the current spot price
        #[arg(long)]
        entry_price: Option<f64>,
    },
    /// Run one rotation cycle against a paper wallet
    Cycle {
        /// The quote asset means holding cash
        #[arg(long)]
        asset: String,
        #[arg(long)]
        entry_price: Option<f64>,
        #[arg(long, default_value_t = 0.0)]
        balance: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;
    let source: Arc<dyn PriceSource> = Arc::new(BinanceClient::new(&settings.exchange)?);

    tracing::info!("🚀 rotabot starting ({} markets on watchlist)", settings.watchlist.len());

    match cli.command {
        Command::Scan => scan(settings, source).await,
        Command::Evaluate { asset, entry_price } => {
            evaluate(settings, source, &asset, entry_price).await
        }
        Command::Cycle {
            asset,
            entry_price,
            balance,
        } => cycle(settings, source, &asset, entry_price, balance).await,
    }
}

fn setup_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("rotabot=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn build_cycle(settings: Settings, source: Arc<dyn PriceSource>, wallet: PaperWallet) -> RotationCycle {
    RotationCycle::new(settings, source, Arc::new(wallet), Arc::new(TracingNotifier))
}

async fn scan(settings: Settings, source: Arc<dyn PriceSource>) -> Result<()> {
    let cycle = build_cycle(settings, source, PaperWallet::new());
    let analysis = cycle.scanner().scan().await;

    println!(
        "{:<10} {:>14} {:>7} {:>14} {:>14} {:>14} {:>6} {:>6} {:>7}",
        "SYMBOL", "PRICE", "RSI", "EMA", "LOWER", "UPPER", "TREND", "BAND", "STANCE"
    );
    for market in analysis.iter() {
        println!(
            "{:<10} {:>14.4} {:>7.2} {:>14.4} {:>14.4} {:>14.4} {:>6} {:>6} {:>7}",
            market.symbol,
            market.price,
            market.rsi,
            market.ema,
            market.lower_band,
            market.upper_band,
            market.trend_signal,
            market.band_signal,
            market.stance()
        );
    }

    match select_best(&analysis) {
        Some(best) => println!("\nBest pick: {} (RSI {:.2})", best.asset, best.rsi),
        None => println!("\nNo eligible market: stay in cash"),
    }

    Ok(())
}

async fn evaluate(
    settings: Settings,
    source: Arc<dyn PriceSource>,
    asset: &str,
    entry_price: Option<f64>,
) -> Result<()> {
    let cycle = build_cycle(settings, source, PaperWallet::new());

    let entry_price = cycle
        .resolve_position(asset, entry_price)
        .await?
        .entry_price()
        .context("cannot evaluate the quote asset")?;

    let verdicts = cycle.evaluate_horizons(asset, entry_price).await?;
    println!("{}", serde_json::to_string_pretty(&verdicts)?);
    println!(
        "Exit {}",
        if verdicts.confirms_exit() { "confirmed" } else { "not confirmed" }
    );

    Ok(())
}

async fn cycle(
    settings: Settings,
    source: Arc<dyn PriceSource>,
    asset: &str,
    entry_price: Option<f64>,
    balance: f64,
) -> Result<()> {
    let wallet = PaperWallet::new().with_balance(asset, balance);
    let cycle = build_cycle(settings, source, wallet);

    let state = cycle.resolve_position(asset, entry_price).await?;

    let outcome = cycle.run(state).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    Ok(())
}
