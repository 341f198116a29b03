//! # fantasy402-rs
//!
//! A Rust integration layer for the Fantasy402 sports betting platform,
//! featuring a session-aware API adapter, a gateway that translates external
//! payloads into domain entities, and a small betting core with a bet
//! aggregate, odds value objects and domain events.
//!
//! ## Quick Start
//!
//! ```no_run
//! use fantasy402_rs::{Config, Fantasy402Adapter, Fantasy402Gateway};
//! use fantasy402_rs::dto::SportEventQuery;
//! use fantasy402_rs::events::EventPublisher;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! // Load configuration from config.toml
//! let config = Config::new()?;
//!
//! // Create the adapter; it authenticates lazily on first request
//! let adapter = Fantasy402Adapter::new(config.fantasy402.clone());
//!
//! // Wrap it in the gateway to get domain entities and events out
//! let publisher = Arc::new(EventPublisher::new(false));
//! let gateway = Fantasy402Gateway::new(adapter, publisher);
//!
//! let query = SportEventQuery {
//!     sport: Some("soccer".to_string()),
//!     ..Default::default()
//! };
//! let live = gateway.get_live_sport_events(&query).await?;
//! for event in live {
//!     println!("{} vs {}", event.home_team(), event.away_team());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **API Adapter**: Session-based authentication with automatic re-login,
//!   bearer-authenticated JSON endpoints and typed errors
//! - **Retry Logic**: Exponential backoff for transient failures, with a
//!   fixed no-jitter schedule for upstream calls
//! - **Anti-Corruption Gateway**: External payloads never leak past the
//!   gateway; everything is mapped into validated domain entities
//! - **Betting Core**: `Bet` aggregate with a settle/cancel/void state
//!   machine that emits domain events
//! - **Event Publishing**: In-process pub/sub with optional topic versioning
//! - **HTTP Surface**: axum router for bet placement and lifecycle
//!
//! ## Configuration
//!
//! Create a `config.toml` file with your Fantasy402 credentials:
//!
//! ```toml
//! [fantasy402]
//! api_url = "https://api.fantasy402.example/cloud/api"
//! customer_id = "your_customer_id"
//! password = "your_password"
//! ```

pub mod adapter;
pub mod bet;
pub mod config;
pub mod dto;
pub mod entities;
pub mod error;
pub mod events;
pub mod gateway;
pub mod http;
pub mod money;
pub mod odds;
pub mod placement;
pub mod repository;
pub mod retry;

pub use adapter::Fantasy402Adapter;
pub use bet::{Bet, BetStatus};
pub use config::{Config, Fantasy402Config};
pub use error::{AdapterError, DomainError, ServiceError, ValidationError};
pub use events::{EventEnvelope, EventPublisher};
pub use gateway::Fantasy402Gateway;
pub use odds::OddsValue;
pub use placement::{PlaceBetCommand, PlaceBetUseCase};
