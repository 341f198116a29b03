use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::{debug, warn};

use crate::adapter::Fantasy402Adapter;
use crate::dto::{BalanceUpdateRequest, BetQuery, PlaceBetRequest, SportEventQuery};
use crate::entities::{FantasyAccount, FantasyAgent, FantasyBet, FantasySportEvent};
use crate::error::{AdapterError, ServiceError};
use crate::events::EventPublisher;
use crate::odds::OddsValue;

pub const TOPIC_SPORT_EVENT_DISCOVERED: &str = "fantasy.sport_event.discovered";
pub const TOPIC_BET_PLACED: &str = "fantasy.bet.placed";
pub const TOPIC_BET_CANCELLED: &str = "fantasy.bet.cancelled";
pub const TOPIC_BALANCE_UPDATED: &str = "fantasy.account.balance_updated";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone)]
pub struct HealthReport {
    pub state: HealthState,
    pub latency: Duration,
    pub checked_at: DateTime<Utc>,
}

/// Result of an agent balance adjustment.
#[derive(Debug, Clone)]
pub struct BalanceChange {
    pub agent_id: String,
    pub previous_balance: Decimal,
    pub new_balance: Decimal,
    pub amount: Decimal,
    pub reason: String,
}

/// Anti-corruption gateway: the sole point of contact between internal
/// domains and the Fantasy402 adapter. Every external DTO is converted to a
/// domain entity before leaving this layer, and every state-changing call
/// publishes exactly one versioned domain event. The gateway itself holds no
/// persistent state.
pub struct Fantasy402Gateway {
    adapter: Fantasy402Adapter,
    publisher: Arc<EventPublisher>,
    health_latency_threshold: Duration,
}

impl Fantasy402Gateway {
    pub fn new(adapter: Fantasy402Adapter, publisher: Arc<EventPublisher>) -> Self {
        let health_latency_threshold = adapter.config().health_latency_threshold();
        Self {
            adapter,
            publisher,
            health_latency_threshold,
        }
    }

    pub fn publisher(&self) -> &Arc<EventPublisher> {
        &self.publisher
    }

    /// Fetches live events, maps each to an entity and publishes one
    /// discovery event per mapped event. Fan-out is per event, not batched:
    /// a mapping failure mid-batch propagates without rolling back events
    /// already published for earlier entries.
    pub async fn get_live_sport_events(
        &self,
        query: &SportEventQuery,
    ) -> Result<Vec<FantasySportEvent>, ServiceError> {
        let dtos = self.adapter.get_sport_events(query).await?;
        debug!(count = dtos.len(), "mapping sport events");

        let mut events = Vec::with_capacity(dtos.len());
        for dto in dtos {
            let entity = FantasySportEvent::from_external_data(dto)?;
            self.publisher
                .publish(
                    TOPIC_SPORT_EVENT_DISCOVERED,
                    "FantasySportEvent",
                    entity.event_id(),
                    json!({
                        "eventId": entity.event_id(),
                        "sport": entity.sport(),
                        "league": entity.league(),
                        "homeTeam": entity.home_team(),
                        "awayTeam": entity.away_team(),
                        "startTime": entity.start_time(),
                        "status": entity.status(),
                    }),
                )
                .await;
            events.push(entity);
        }
        Ok(events)
    }

    pub async fn get_event_odds(&self, event_id: &str) -> Result<Vec<OddsValue>, ServiceError> {
        let dtos = self.adapter.get_event_odds(event_id).await?;
        dtos.into_iter()
            .map(|dto| {
                OddsValue::create(dto.price, &dto.selection, &dto.market_id)
                    .map_err(ServiceError::from)
            })
            .collect()
    }

    pub async fn get_agents(&self) -> Result<Vec<FantasyAgent>, ServiceError> {
        let dtos = self.adapter.get_agents().await?;
        dtos.into_iter()
            .map(|dto| FantasyAgent::from_external_data(dto).map_err(ServiceError::from))
            .collect()
    }

    pub async fn get_agent(&self, agent_id: &str) -> Result<FantasyAgent, ServiceError> {
        let dto = self.adapter.get_agent(agent_id).await?;
        Ok(FantasyAgent::from_external_data(dto)?)
    }

    pub async fn get_agent_account(&self, agent_id: &str) -> Result<FantasyAccount, ServiceError> {
        let dto = self.adapter.get_agent_account(agent_id).await?;
        Ok(FantasyAccount::from_external_data(dto)?)
    }

    pub async fn get_bets(&self, query: &BetQuery) -> Result<Vec<FantasyBet>, ServiceError> {
        let dtos = self.adapter.get_bets(query).await?;
        dtos.into_iter()
            .map(|dto| FantasyBet::from_external_data(dto).map_err(ServiceError::from))
            .collect()
    }

    /// Looks up a single bet. A missing bet is an absence, not a failure:
    /// the adapter's typed not-found maps to `Ok(None)`, while transport and
    /// auth failures propagate.
    pub async fn get_bet(&self, bet_id: &str) -> Result<Option<FantasyBet>, ServiceError> {
        match self.adapter.get_bet(bet_id).await {
            Ok(dto) => Ok(Some(FantasyBet::from_external_data(dto)?)),
            Err(AdapterError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Places a bet upstream. The published event carries the request
    /// parameters plus the resulting status, deliberately minimal rather than the
    /// full bet payload; consumers depend on this shape.
    pub async fn place_bet(&self, params: PlaceBetRequest) -> Result<FantasyBet, ServiceError> {
        let dto = self.adapter.place_bet(&params).await?;
        let entity = FantasyBet::from_external_data(dto)?;

        self.publisher
            .publish(
                TOPIC_BET_PLACED,
                "FantasyBet",
                entity.bet_id(),
                json!({
                    "agentId": params.agent_id,
                    "eventId": params.event_id,
                    "marketId": params.market_id,
                    "selection": params.selection,
                    "stake": params.stake,
                    "odds": params.odds,
                    "status": entity.status(),
                }),
            )
            .await;
        Ok(entity)
    }

    pub async fn cancel_bet(
        &self,
        bet_id: &str,
        reason: Option<&str>,
    ) -> Result<FantasyBet, ServiceError> {
        let dto = self.adapter.cancel_bet(bet_id, reason).await?;
        let entity = FantasyBet::from_external_data(dto)?;

        self.publisher
            .publish(
                TOPIC_BET_CANCELLED,
                "FantasyBet",
                entity.bet_id(),
                json!({
                    "betId": entity.bet_id(),
                    "status": entity.status(),
                    "reason": reason,
                }),
            )
            .await;
        Ok(entity)
    }

    /// Adjusts an agent's balance upstream. `previous_balance` is derived by
    /// subtraction from the post-call balance rather than re-fetching prior
    /// state; a concurrent mutation upstream would skew it. Known race-prone
    /// simplification.
    pub async fn update_agent_balance(
        &self,
        agent_id: &str,
        amount: Decimal,
        reason: &str,
    ) -> Result<BalanceChange, ServiceError> {
        let request = BalanceUpdateRequest {
            amount,
            reason: reason.to_string(),
        };
        let dto = self.adapter.update_balance(agent_id, &request).await?;

        let change = BalanceChange {
            agent_id: dto.agent_id,
            previous_balance: dto.new_balance - amount,
            new_balance: dto.new_balance,
            amount,
            reason: reason.to_string(),
        };

        self.publisher
            .publish(
                TOPIC_BALANCE_UPDATED,
                "FantasyAccount",
                &change.agent_id,
                json!({
                    "agentId": change.agent_id,
                    "previousBalance": change.previous_balance,
                    "newBalance": change.new_balance,
                    "amount": change.amount,
                    "reason": change.reason,
                }),
            )
            .await;
        Ok(change)
    }

    /// Round-trip latency classification of the upstream system. Single
    /// attempt, no retries: a health check must fail fast.
    pub async fn health_check(&self) -> HealthReport {
        let started = Instant::now();
        let checked_at = Utc::now();

        match self.adapter.health_check().await {
            Ok(()) => {
                let latency = started.elapsed();
                let state = if latency < self.health_latency_threshold {
                    HealthState::Healthy
                } else {
                    HealthState::Degraded
                };
                HealthReport {
                    state,
                    latency,
                    checked_at,
                }
            }
            Err(err) => {
                warn!(error = %err, "Fantasy402 health check failed");
                HealthReport {
                    state: HealthState::Unhealthy,
                    latency: started.elapsed(),
                    checked_at,
                }
            }
        }
    }
}
