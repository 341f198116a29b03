use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::odds::OddsFormat;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetDto {
    pub bet_id: String,
    pub agent_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    pub event_id: String,
    pub market_id: String,
    pub selection: String,
    pub stake: Decimal,
    pub odds: Decimal,
    /// Explicit odds convention tag. Older feed versions omit it, in which
    /// case the legacy numeric heuristic is applied during mapping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub odds_format: Option<OddsFormat>,
    pub status: String,
    pub placed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetEnvelope {
    pub bet: BetDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetsEnvelope {
    pub bets: Vec<BetDto>,
}

/// Body of `POST /bets` against the upstream system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBetRequest {
    pub agent_id: String,
    pub event_id: String,
    pub market_id: String,
    pub selection: String,
    pub stake: Decimal,
    pub odds: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub odds_format: Option<OddsFormat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelBetRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
