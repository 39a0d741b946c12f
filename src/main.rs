use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, ValueEnum};
use confluence::execution::{OrderSink, PaperOrderSink, SessionManager};
use confluence::feed::{drive_timeframe, replay, MarketScenario, SyntheticCandleSource};
use confluence::strategy::ConfluenceStrategy;
use confluence::{AppConfig, Result};
use tokio::sync::mpsc;
use tokio::time::Duration;
use tracing_subscriber::EnvFilter;

const FEED_CHANNEL_SIZE: usize = 256;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Scenario {
    Uptrend,
    Downtrend,
    Sideways,
    Volatile,
    Cycle,
}

impl From<Scenario> for MarketScenario {
    fn from(scenario: Scenario) -> Self {
        match scenario {
            Scenario::Uptrend => MarketScenario::Uptrend,
            Scenario::Downtrend => MarketScenario::Downtrend,
            Scenario::Sideways => MarketScenario::Sideways,
            Scenario::Volatile => MarketScenario::Volatile,
            Scenario::Cycle => MarketScenario::Cycle,
        }
    }
}

/// Multi-timeframe confluence signal engine
#[derive(Debug, Parser)]
#[command(name = "confluence", version, about)]
struct Args {
    /// Configuration file (defaults to ./confluence.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Candles replayed per timeframe
    #[arg(long, default_value_t = 300)]
    candles: usize,

    /// Live updates per candle (the last one closes the candle)
    #[arg(long, default_value_t = 3)]
    ticks: usize,

    /// Seed for the synthetic market
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Starting price of the synthetic market
    #[arg(long, default_value_t = 150.0)]
    base_price: f64,

    #[arg(long, value_enum, default_value_t = Scenario::Cycle)]
    scenario: Scenario,

    /// Pause between updates, in milliseconds
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,

    /// Submit the final trade setup to the paper order sink
    #[arg(long)]
    paper_trade: bool,

    /// Print the session snapshot as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref())?;

    tracing::info!(
        "🚀 Confluence starting - {} on {} timeframes ({:?} market)",
        config.symbol,
        config.timeframes.len(),
        args.scenario
    );

    let strategy = Arc::new(ConfluenceStrategy::new(config.signal.clone()));
    let session = Arc::new(SessionManager::with_strategy(
        config.session_config()?,
        strategy,
    ));

    let now = Utc::now().timestamp_millis();
    let delay = Duration::from_millis(args.delay_ms);
    let mut producers = Vec::new();
    let mut consumers = Vec::new();

    for (i, timeframe) in session.timeframes().into_iter().enumerate() {
        let start_time = now - timeframe.duration_ms() * args.candles as i64;
        let candles = SyntheticCandleSource::new(args.seed.wrapping_add(i as u64))
            .with_base_price(args.base_price)
            .generate(args.scenario.into(), args.candles, timeframe, start_time);

        let (tx, rx) = mpsc::channel(FEED_CHANNEL_SIZE);
        producers.push(tokio::spawn(replay(tx, candles, args.ticks, delay)));
        consumers.push(tokio::spawn(drive_timeframe(session.clone(), timeframe, rx)));
    }

    for consumer in consumers {
        consumer.await?;
    }
    for producer in producers {
        if let Err(e) = producer.await? {
            tracing::warn!("Feed producer stopped early: {}", e);
        }
    }

    print_summary(&session);

    if args.paper_trade {
        let sink = PaperOrderSink::new();
        match session.order_request() {
            Some(order) => sink.submit(&order)?,
            None => tracing::info!("No executable trade setup, nothing to submit"),
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
    }

    Ok(())
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("confluence=info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn print_summary(session: &SessionManager) {
    println!("\n=== {} ===", session.symbol());

    for timeframe in session.timeframes() {
        if let Some(view) = session.timeframe_view(timeframe) {
            let last_close = view
                .candles
                .last()
                .and_then(|c| c.open_time())
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string());
            let last_signal = view
                .last_signal
                .as_ref()
                .map(|s| format!("{} @ {:.4}", s.signal_type, s.price))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:>4} {:?} candles={} last={} last_signal={}",
                timeframe,
                view.phase,
                view.candles.len(),
                last_close,
                last_signal
            );
        }
    }

    let alerts = session.alert_log();
    println!("\nAlerts ({}):", alerts.len());
    for alert in alerts.iter().take(10) {
        println!(
            "  {} {:>4} {:<4} {:.4} {}",
            alert.timestamp.format("%Y-%m-%d %H:%M"),
            alert.timeframe,
            alert.signal_type,
            alert.price,
            alert.reason
        );
    }

    match session.trade_setup() {
        Some(setup) => println!(
            "\nTrade setup ({}): {} entry={:.4} stop={:.4} target={:.4} \
             size={:.6} risk={:.2} R:R={:.1}",
            session.primary_timeframe(),
            setup.side,
            setup.entry_price,
            setup.stop_loss,
            setup.take_profit,
            setup.position_size,
            setup.risk_amount,
            setup.risk_reward_ratio()
        ),
        None => println!("\nNo trade setup on {}", session.primary_timeframe()),
    }
}
