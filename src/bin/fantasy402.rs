use std::sync::Arc;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::info;

use fantasy402_rs::dto::{PlaceBetRequest, SportEventQuery};
use fantasy402_rs::events::EventPublisher;
use fantasy402_rs::http::{router, AppState};
use fantasy402_rs::repository::InMemoryBetRepository;
use fantasy402_rs::{Config, Fantasy402Adapter, Fantasy402Gateway};

#[derive(Parser)]
#[command(name = "fantasy402")]
#[command(about = "Fantasy402 integration CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check upstream API health and report latency
    Health,
    /// List live sport events
    Events {
        /// Filter by sport (e.g. soccer, basketball)
        #[arg(short, long)]
        sport: Option<String>,
    },
    /// Place a bet through the upstream API
    PlaceBet {
        #[arg(long)]
        agent_id: String,
        #[arg(long)]
        event_id: String,
        #[arg(long)]
        market_id: String,
        #[arg(long)]
        selection: String,
        #[arg(long)]
        stake: Decimal,
        #[arg(long)]
        odds: Decimal,
    },
    /// Run the local bet placement HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::new()?;

    match cli.command {
        Commands::Health => {
            let gateway = build_gateway(&config);
            let report = gateway.health_check().await;
            println!(
                "state: {:?}, latency: {}ms, checked at: {}",
                report.state,
                report.latency.as_millis(),
                report.checked_at
            );
        }
        Commands::Events { sport } => {
            let gateway = build_gateway(&config);
            let query = SportEventQuery {
                sport,
                live_only: true,
                ..Default::default()
            };
            let events = gateway.get_live_sport_events(&query).await?;
            info!(count = events.len(), "fetched live events");
            for event in &events {
                println!(
                    "{} | {} | {} vs {} | {:?}",
                    event.event_id(),
                    event.sport(),
                    event.home_team(),
                    event.away_team(),
                    event.status()
                );
            }
        }
        Commands::PlaceBet {
            agent_id,
            event_id,
            market_id,
            selection,
            stake,
            odds,
        } => {
            let gateway = build_gateway(&config);
            let bet = gateway
                .place_bet(PlaceBetRequest {
                    agent_id,
                    event_id,
                    market_id,
                    selection,
                    stake,
                    odds,
                    odds_format: None,
                })
                .await?;
            println!(
                "placed bet {} ({:?}), stake {} at {}, potential payout {}",
                bet.bet_id(),
                bet.status(),
                bet.stake(),
                bet.odds(),
                bet.potential_payout()
            );
        }
        Commands::Serve { port } => {
            let repository = Arc::new(InMemoryBetRepository::new());
            let publisher = Arc::new(EventPublisher::new(
                config.fantasy402.enable_event_versioning,
            ));
            let state = AppState::new(repository, publisher);
            let app = router(state);

            let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
            info!(port, "bet placement server listening");
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

fn build_gateway(config: &Config) -> Fantasy402Gateway {
    let adapter = Fantasy402Adapter::new(config.fantasy402.clone());
    let publisher = Arc::new(EventPublisher::new(
        config.fantasy402.enable_event_versioning,
    ));
    Fantasy402Gateway::new(adapter, publisher)
}
