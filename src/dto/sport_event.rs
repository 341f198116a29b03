use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SportEventDto {
    pub event_id: String,
    pub sport: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub league: Option<String>,
    pub home_team: String,
    pub away_team: String,
    pub start_time: DateTime<Utc>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsEnvelope {
    pub events: Vec<SportEventDto>,
}

/// One priced selection on an event market.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventOddsDto {
    pub market_id: String,
    pub selection: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OddsEnvelope {
    pub odds: Vec<EventOddsDto>,
}
