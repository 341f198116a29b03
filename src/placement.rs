use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use crate::bet::Bet;
use crate::error::{ServiceError, ValidationError};
use crate::events::EventPublisher;
use crate::odds::OddsValue;
use crate::repository::BetRepository;

/// Business-policy caps enforced at placement. The `Bet` aggregate itself
/// does not know about them; this is the validation boundary.
const MAX_STAKE: u32 = 10_000;
const MAX_ODDS_PRICE: u32 = 100;

#[derive(Debug, Clone)]
pub struct PlaceBetCommand {
    pub customer_id: String,
    pub stake: Decimal,
    pub odds_price: Decimal,
    pub selection: String,
    pub market_id: String,
}

/// Places a bet for a customer: validates the command, creates the
/// aggregate, publishes its events and persists it.
pub struct PlaceBetUseCase {
    repository: Arc<dyn BetRepository>,
    publisher: Arc<EventPublisher>,
}

impl PlaceBetUseCase {
    pub fn new(repository: Arc<dyn BetRepository>, publisher: Arc<EventPublisher>) -> Self {
        Self {
            repository,
            publisher,
        }
    }

    pub fn repository(&self) -> &Arc<dyn BetRepository> {
        &self.repository
    }

    pub fn publisher(&self) -> &Arc<EventPublisher> {
        &self.publisher
    }

    pub async fn execute(&self, command: PlaceBetCommand) -> Result<Bet, ServiceError> {
        validate(&command)?;

        let odds = OddsValue::create(command.odds_price, &command.selection, &command.market_id)?;
        let mut bet = Bet::create(&command.customer_id, command.stake, odds)?;

        publish_bet_events(&self.publisher, &mut bet).await;
        self.repository.save(&bet).await?;

        info!(
            bet_id = %bet.id(),
            customer_id = %bet.customer_id(),
            stake = %bet.stake(),
            "bet placed"
        );
        Ok(bet)
    }
}

fn validate(command: &PlaceBetCommand) -> Result<(), ValidationError> {
    if command.stake <= Decimal::ZERO || command.stake > Decimal::from(MAX_STAKE) {
        return Err(ValidationError::new(
            "stake",
            format!("must be positive and at most {MAX_STAKE}"),
        ));
    }
    if command.odds_price <= Decimal::ONE || command.odds_price > Decimal::from(MAX_ODDS_PRICE) {
        return Err(ValidationError::new(
            "oddsPrice",
            format!("must be greater than 1 and at most {MAX_ODDS_PRICE}"),
        ));
    }
    Ok(())
}

/// Drains the aggregate's recorded events and publishes each one.
pub async fn publish_bet_events(publisher: &EventPublisher, bet: &mut Bet) {
    let bet_id = bet.id().to_string();
    for event in bet.take_events() {
        publisher
            .publish(event.event_type(), "Bet", &bet_id, event.payload())
            .await;
    }
}
