use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dto::BetDto;
use crate::error::ValidationError;
use crate::odds::OddsFormat;

/// Lifecycle state as reported by the external system. Distinct from the
/// internal `BetStatus` machine: this is a cached remote snapshot, not an
/// aggregate we control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalBetStatus {
    Pending,
    Open,
    Won,
    Lost,
    Cancelled,
    Void,
}

impl ExternalBetStatus {
    fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "pending" => Ok(ExternalBetStatus::Pending),
            "open" | "active" => Ok(ExternalBetStatus::Open),
            "won" => Ok(ExternalBetStatus::Won),
            "lost" => Ok(ExternalBetStatus::Lost),
            "cancelled" | "canceled" => Ok(ExternalBetStatus::Cancelled),
            "void" | "voided" => Ok(ExternalBetStatus::Void),
            other => Err(ValidationError::new(
                "status",
                format!("unknown bet status: {other}"),
            )),
        }
    }
}

/// External bet snapshot with a locally-assigned identity. References agent,
/// customer and event by id only; lookups, not ownership.
#[derive(Debug, Clone)]
pub struct FantasyBet {
    id: Uuid,
    bet_id: String,
    agent_id: String,
    customer_id: Option<String>,
    event_id: String,
    market_id: String,
    selection: String,
    stake: Decimal,
    odds: Decimal,
    odds_format: OddsFormat,
    status: ExternalBetStatus,
    placed_at: DateTime<Utc>,
}

impl FantasyBet {
    pub fn from_external_data(dto: BetDto) -> Result<Self, ValidationError> {
        if dto.bet_id.is_empty() {
            return Err(ValidationError::new("betId", "must not be empty"));
        }
        if dto.stake <= Decimal::ZERO {
            return Err(ValidationError::new("stake", "must be positive"));
        }

        let status = ExternalBetStatus::parse(&dto.status)?;
        // Prefer the feed's explicit tag; fall back to the legacy heuristic.
        let odds_format = dto
            .odds_format
            .unwrap_or_else(|| OddsFormat::infer(dto.odds));
        let sign_ok = match odds_format {
            OddsFormat::AmericanNegative => dto.odds < Decimal::ZERO,
            OddsFormat::Decimal | OddsFormat::AmericanPositive => dto.odds > Decimal::ZERO,
        };
        if !sign_ok {
            return Err(ValidationError::new(
                "odds",
                format!("{} is not a valid {:?} figure", dto.odds, odds_format),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            bet_id: dto.bet_id,
            agent_id: dto.agent_id,
            customer_id: dto.customer_id,
            event_id: dto.event_id,
            market_id: dto.market_id,
            selection: dto.selection,
            stake: dto.stake,
            odds: dto.odds,
            odds_format,
            status,
            placed_at: dto.placed_at,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn bet_id(&self) -> &str {
        &self.bet_id
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn customer_id(&self) -> Option<&str> {
        self.customer_id.as_deref()
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn market_id(&self) -> &str {
        &self.market_id
    }

    pub fn selection(&self) -> &str {
        &self.selection
    }

    pub fn stake(&self) -> Decimal {
        self.stake
    }

    pub fn odds(&self) -> Decimal {
        self.odds
    }

    pub fn odds_format(&self) -> OddsFormat {
        self.odds_format
    }

    pub fn status(&self) -> ExternalBetStatus {
        self.status
    }

    pub fn placed_at(&self) -> DateTime<Utc> {
        self.placed_at
    }

    /// Stake plus profit on a win, computed under the bet's odds format.
    pub fn potential_payout(&self) -> Decimal {
        self.stake + self.odds_format.profit_on(self.stake, self.odds)
    }

    pub fn is_settled(&self) -> bool {
        matches!(
            self.status,
            ExternalBetStatus::Won
                | ExternalBetStatus::Lost
                | ExternalBetStatus::Cancelled
                | ExternalBetStatus::Void
        )
    }
}
