use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::{DomainError, ValidationError};
use crate::odds::OddsValue;

/// Bet lifecycle states. `Open` is the only non-terminal state; every
/// transition out of it is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BetStatus {
    Open,
    Won,
    Lost,
    Cancelled,
    Voided,
}

impl BetStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BetStatus::Open)
    }
}

impl std::fmt::Display for BetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BetStatus::Open => "OPEN",
            BetStatus::Won => "WON",
            BetStatus::Lost => "LOST",
            BetStatus::Cancelled => "CANCELLED",
            BetStatus::Voided => "VOIDED",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetOutcome {
    Win,
    Loss,
    Cancelled,
    Voided,
}

/// Events produced by the `Bet` aggregate. Buffered on the aggregate and
/// drained by the caller for publication.
#[derive(Debug, Clone)]
pub enum BetEvent {
    Placed {
        bet_id: Uuid,
        customer_id: String,
        stake: Decimal,
        potential_win: Decimal,
        odds_price: Decimal,
        selection: String,
        market_id: String,
        placed_at: DateTime<Utc>,
    },
    Won {
        bet_id: Uuid,
        customer_id: String,
        stake: Decimal,
        potential_win: Decimal,
        actual_win: Decimal,
        market_result: String,
        settled_at: DateTime<Utc>,
    },
    Lost {
        bet_id: Uuid,
        customer_id: String,
        stake: Decimal,
        potential_win: Decimal,
        actual_win: Decimal,
        market_result: String,
        settled_at: DateTime<Utc>,
    },
    Cancelled {
        bet_id: Uuid,
        customer_id: String,
        stake: Decimal,
        actual_win: Decimal,
        reason: Option<String>,
        settled_at: DateTime<Utc>,
    },
    Voided {
        bet_id: Uuid,
        customer_id: String,
        stake: Decimal,
        actual_win: Decimal,
        reason: Option<String>,
        settled_at: DateTime<Utc>,
    },
}

impl BetEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            BetEvent::Placed { .. } => "BetPlaced",
            BetEvent::Won { .. } => "BetWon",
            BetEvent::Lost { .. } => "BetLost",
            BetEvent::Cancelled { .. } => "BetCancelled",
            BetEvent::Voided { .. } => "BetVoided",
        }
    }

    pub fn payload(&self) -> serde_json::Value {
        match self {
            BetEvent::Placed {
                bet_id,
                customer_id,
                stake,
                potential_win,
                odds_price,
                selection,
                market_id,
                placed_at,
            } => json!({
                "betId": bet_id,
                "customerId": customer_id,
                "stake": stake,
                "potentialWin": potential_win,
                "oddsPrice": odds_price,
                "selection": selection,
                "marketId": market_id,
                "placedAt": placed_at,
            }),
            BetEvent::Won {
                bet_id,
                customer_id,
                stake,
                potential_win,
                actual_win,
                market_result,
                settled_at,
            }
            | BetEvent::Lost {
                bet_id,
                customer_id,
                stake,
                potential_win,
                actual_win,
                market_result,
                settled_at,
            } => json!({
                "betId": bet_id,
                "customerId": customer_id,
                "stake": stake,
                "potentialWin": potential_win,
                "actualWin": actual_win,
                "marketResult": market_result,
                "settledAt": settled_at,
            }),
            BetEvent::Cancelled {
                bet_id,
                customer_id,
                stake,
                actual_win,
                reason,
                settled_at,
            }
            | BetEvent::Voided {
                bet_id,
                customer_id,
                stake,
                actual_win,
                reason,
                settled_at,
            } => json!({
                "betId": bet_id,
                "customerId": customer_id,
                "stake": stake,
                "actualWin": actual_win,
                "reason": reason,
                "settledAt": settled_at,
            }),
        }
    }
}

/// Core betting aggregate. Constructed only through `create` (new bets) or
/// `from_stored` (repository rehydration); state changes only through the
/// settlement operations, each of which records exactly one event.
///
/// `potential_win` is fixed at creation (stake x price) and never recomputed;
/// `actual_win` is written only during settlement.
#[derive(Debug, Clone)]
pub struct Bet {
    id: Uuid,
    customer_id: String,
    stake: Decimal,
    potential_win: Decimal,
    odds: OddsValue,
    placed_at: DateTime<Utc>,
    status: BetStatus,
    settled_at: Option<DateTime<Utc>>,
    outcome: Option<BetOutcome>,
    actual_win: Option<Decimal>,
    market_result: Option<String>,
    pending_events: Vec<BetEvent>,
}

impl Bet {
    /// Places a new bet. Business-policy caps on stake and odds are enforced
    /// one layer up in the placement use case; this factory only guards the
    /// structural invariant that a stake is positive.
    pub fn create(
        customer_id: &str,
        stake: Decimal,
        odds: OddsValue,
    ) -> Result<Self, ValidationError> {
        if customer_id.is_empty() {
            return Err(ValidationError::new("customerId", "must not be empty"));
        }
        if stake <= Decimal::ZERO {
            return Err(ValidationError::new("stake", "must be positive"));
        }

        let id = Uuid::new_v4();
        let placed_at = Utc::now();
        let potential_win = stake * odds.price();

        let mut bet = Self {
            id,
            customer_id: customer_id.to_string(),
            stake,
            potential_win,
            odds,
            placed_at,
            status: BetStatus::Open,
            settled_at: None,
            outcome: None,
            actual_win: None,
            market_result: None,
            pending_events: Vec::new(),
        };

        bet.pending_events.push(BetEvent::Placed {
            bet_id: id,
            customer_id: bet.customer_id.clone(),
            stake,
            potential_win,
            odds_price: bet.odds.price(),
            selection: bet.odds.selection().to_string(),
            market_id: bet.odds.market_id().to_string(),
            placed_at,
        });

        Ok(bet)
    }

    /// Rehydrates a previously persisted bet. Records no event.
    #[allow(clippy::too_many_arguments)]
    pub fn from_stored(
        id: Uuid,
        customer_id: String,
        stake: Decimal,
        potential_win: Decimal,
        odds: OddsValue,
        placed_at: DateTime<Utc>,
        status: BetStatus,
        settled_at: Option<DateTime<Utc>>,
        outcome: Option<BetOutcome>,
        actual_win: Option<Decimal>,
        market_result: Option<String>,
    ) -> Self {
        Self {
            id,
            customer_id,
            stake,
            potential_win,
            odds,
            placed_at,
            status,
            settled_at,
            outcome,
            actual_win,
            market_result,
            pending_events: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn stake(&self) -> Decimal {
        self.stake
    }

    pub fn potential_win(&self) -> Decimal {
        self.potential_win
    }

    pub fn odds(&self) -> &OddsValue {
        &self.odds
    }

    pub fn placed_at(&self) -> DateTime<Utc> {
        self.placed_at
    }

    pub fn status(&self) -> BetStatus {
        self.status
    }

    pub fn settled_at(&self) -> Option<DateTime<Utc>> {
        self.settled_at
    }

    pub fn outcome(&self) -> Option<BetOutcome> {
        self.outcome
    }

    pub fn actual_win(&self) -> Option<Decimal> {
        self.actual_win
    }

    pub fn market_result(&self) -> Option<&str> {
        self.market_result.as_deref()
    }

    /// Drains events recorded since the last drain. The caller is
    /// responsible for publishing them.
    pub fn take_events(&mut self) -> Vec<BetEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn settle_as_won(&mut self, market_result: &str) -> Result<(), DomainError> {
        self.ensure_open(|id, status| DomainError::BetCannotSettle {
            bet_id: id,
            current_status: status,
        })?;

        let settled_at = Utc::now();
        self.status = BetStatus::Won;
        self.outcome = Some(BetOutcome::Win);
        self.actual_win = Some(self.potential_win);
        self.market_result = Some(market_result.to_string());
        self.settled_at = Some(settled_at);

        self.pending_events.push(BetEvent::Won {
            bet_id: self.id,
            customer_id: self.customer_id.clone(),
            stake: self.stake,
            potential_win: self.potential_win,
            actual_win: self.potential_win,
            market_result: market_result.to_string(),
            settled_at,
        });
        Ok(())
    }

    pub fn settle_as_lost(&mut self, market_result: &str) -> Result<(), DomainError> {
        self.ensure_open(|id, status| DomainError::BetCannotSettle {
            bet_id: id,
            current_status: status,
        })?;

        let settled_at = Utc::now();
        self.status = BetStatus::Lost;
        self.outcome = Some(BetOutcome::Loss);
        self.actual_win = Some(Decimal::ZERO);
        self.market_result = Some(market_result.to_string());
        self.settled_at = Some(settled_at);

        self.pending_events.push(BetEvent::Lost {
            bet_id: self.id,
            customer_id: self.customer_id.clone(),
            stake: self.stake,
            potential_win: self.potential_win,
            actual_win: Decimal::ZERO,
            market_result: market_result.to_string(),
            settled_at,
        });
        Ok(())
    }

    /// Cancels the bet, returning the full stake.
    pub fn cancel(&mut self, reason: Option<&str>) -> Result<(), DomainError> {
        self.ensure_open(|id, status| DomainError::BetCannotCancel {
            bet_id: id,
            current_status: status,
        })?;

        let settled_at = Utc::now();
        self.status = BetStatus::Cancelled;
        self.outcome = Some(BetOutcome::Cancelled);
        self.actual_win = Some(self.stake);
        self.settled_at = Some(settled_at);

        self.pending_events.push(BetEvent::Cancelled {
            bet_id: self.id,
            customer_id: self.customer_id.clone(),
            stake: self.stake,
            actual_win: self.stake,
            reason: reason.map(str::to_string),
            settled_at,
        });
        Ok(())
    }

    /// Voids the bet (house decision), returning the full stake.
    pub fn void(&mut self, reason: Option<&str>) -> Result<(), DomainError> {
        self.ensure_open(|id, status| DomainError::BetCannotVoid {
            bet_id: id,
            current_status: status,
        })?;

        let settled_at = Utc::now();
        self.status = BetStatus::Voided;
        self.outcome = Some(BetOutcome::Voided);
        self.actual_win = Some(self.stake);
        self.settled_at = Some(settled_at);

        self.pending_events.push(BetEvent::Voided {
            bet_id: self.id,
            customer_id: self.customer_id.clone(),
            stake: self.stake,
            actual_win: self.stake,
            reason: reason.map(str::to_string),
            settled_at,
        });
        Ok(())
    }

    /// Customer profit or loss relative to the stake. Cancelled and voided
    /// bets net to zero because the stake was already returned in full
    /// through `actual_win`.
    pub fn net_result(&self) -> Decimal {
        match self.status {
            BetStatus::Won => self.actual_win.unwrap_or_default() - self.stake,
            BetStatus::Lost => -self.stake,
            BetStatus::Cancelled | BetStatus::Voided | BetStatus::Open => Decimal::ZERO,
        }
    }

    /// Amount paid out to the customer; zero while the bet is open.
    pub fn total_payout(&self) -> Decimal {
        if self.status.is_terminal() {
            self.actual_win.unwrap_or_default()
        } else {
            Decimal::ZERO
        }
    }

    fn ensure_open(
        &self,
        to_error: impl FnOnce(Uuid, BetStatus) -> DomainError,
    ) -> Result<(), DomainError> {
        if self.status != BetStatus::Open {
            return Err(to_error(self.id, self.status));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn sample_odds() -> OddsValue {
        OddsValue::create(dec!(2.5), "Home Win", "mkt-1").unwrap()
    }

    #[test]
    fn test_create_open_bet_with_fixed_potential_win() {
        let mut bet = Bet::create("cust-1", dec!(100), sample_odds()).unwrap();
        assert_eq!(bet.potential_win(), dec!(250.0));
        assert_eq!(bet.status(), BetStatus::Open);
        assert_eq!(bet.total_payout(), Decimal::ZERO);

        let events = bet.take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "BetPlaced");
        assert!(bet.take_events().is_empty());
    }

    #[test]
    fn test_create_rejects_non_positive_stake() {
        assert!(Bet::create("cust-1", dec!(0), sample_odds()).is_err());
        assert!(Bet::create("cust-1", dec!(-5), sample_odds()).is_err());
    }

    #[test]
    fn test_settle_as_won() {
        let mut bet = Bet::create("cust-1", dec!(100), sample_odds()).unwrap();
        bet.take_events();

        bet.settle_as_won("Home team won 2-1").unwrap();
        assert_eq!(bet.status(), BetStatus::Won);
        assert_eq!(bet.actual_win(), Some(dec!(250.0)));
        assert_eq!(bet.net_result(), dec!(150.0));
        assert_eq!(bet.total_payout(), dec!(250.0));
        assert_eq!(bet.market_result(), Some("Home team won 2-1"));
        assert!(bet.settled_at().is_some());

        let events = bet.take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "BetWon");
        let payload = events[0].payload();
        assert_eq!(payload["marketResult"], "Home team won 2-1");
        assert_eq!(payload["customerId"], "cust-1");
    }

    #[test]
    fn test_settle_as_lost() {
        let mut bet = Bet::create("cust-1", dec!(100), sample_odds()).unwrap();
        bet.settle_as_lost("Away team won").unwrap();
        assert_eq!(bet.status(), BetStatus::Lost);
        assert_eq!(bet.actual_win(), Some(Decimal::ZERO));
        assert_eq!(bet.net_result(), dec!(-100));
        assert_eq!(bet.total_payout(), Decimal::ZERO);
    }

    #[test]
    fn test_cancel_returns_full_stake() {
        let mut bet = Bet::create("cust-1", dec!(50), sample_odds()).unwrap();
        bet.cancel(Some("market suspended")).unwrap();
        assert_eq!(bet.status(), BetStatus::Cancelled);
        assert_eq!(bet.actual_win(), Some(dec!(50)));
        assert_eq!(bet.net_result(), Decimal::ZERO);
        assert_eq!(bet.total_payout(), dec!(50));
    }

    #[test]
    fn test_void_returns_full_stake() {
        let mut bet = Bet::create("cust-1", dec!(75), sample_odds()).unwrap();
        bet.void(None).unwrap();
        assert_eq!(bet.status(), BetStatus::Voided);
        assert_eq!(bet.net_result(), Decimal::ZERO);
        assert_eq!(bet.total_payout(), dec!(75));
    }

    #[test]
    fn test_double_settle_fails_with_terminal_state_error() {
        let mut bet = Bet::create("cust-1", dec!(100), sample_odds()).unwrap();
        bet.settle_as_won("Home team won 2-1").unwrap();

        let err = bet.settle_as_won("Home team won 2-1").unwrap_err();
        assert_eq!(err.code(), "BET_CANNOT_SETTLE");
        match err {
            DomainError::BetCannotSettle {
                bet_id,
                current_status,
            } => {
                assert_eq!(bet_id, bet.id());
                assert_eq!(current_status, BetStatus::Won);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_cancel_after_settlement_fails() {
        let mut bet = Bet::create("cust-1", dec!(100), sample_odds()).unwrap();
        bet.settle_as_lost("Away team won").unwrap();
        assert_eq!(bet.cancel(None).unwrap_err().code(), "BET_CANNOT_CANCEL");
        assert_eq!(bet.void(None).unwrap_err().code(), "BET_CANNOT_VOID");
    }

    #[test]
    fn test_each_transition_records_exactly_one_event() {
        let mut bet = Bet::create("cust-1", dec!(100), sample_odds()).unwrap();
        bet.take_events();
        bet.cancel(None).unwrap();
        assert_eq!(bet.take_events().len(), 1);
    }

    #[test]
    fn test_from_stored_records_no_event() {
        let odds = sample_odds();
        let mut bet = Bet::from_stored(
            Uuid::new_v4(),
            "cust-1".to_string(),
            dec!(100),
            dec!(250),
            odds,
            Utc::now(),
            BetStatus::Open,
            None,
            None,
            None,
            None,
        );
        assert!(bet.take_events().is_empty());
    }
}
