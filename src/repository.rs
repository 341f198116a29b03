use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::bet::{Bet, BetStatus};
use crate::error::DomainError;

/// Aggregated figures over all live (non-deleted) bets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BetStatistics {
    pub total_bets: usize,
    pub open_bets: usize,
    pub won_bets: usize,
    pub lost_bets: usize,
    pub cancelled_bets: usize,
    pub voided_bets: usize,
    pub total_staked: Decimal,
    pub total_payout: Decimal,
    pub net_result: Decimal,
}

/// Persistence contract for bets. Storage engine choice belongs to the
/// implementor; the domain only depends on this trait.
///
/// Bets are never physically removed: `soft_delete` tombstones a record,
/// after which it is invisible to every query and to `statistics`.
#[async_trait]
pub trait BetRepository: Send + Sync {
    async fn save(&self, bet: &Bet) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Bet>, DomainError>;

    async fn find_by_customer(&self, customer_id: &str) -> Result<Vec<Bet>, DomainError>;

    async fn find_by_status(&self, status: BetStatus) -> Result<Vec<Bet>, DomainError>;

    async fn soft_delete(&self, id: Uuid) -> Result<(), DomainError>;

    async fn statistics(&self) -> Result<BetStatistics, DomainError>;
}

struct StoredBet {
    bet: Bet,
    deleted: bool,
}

/// In-memory repository used by the CLI wiring and tests.
#[derive(Default)]
pub struct InMemoryBetRepository {
    bets: RwLock<HashMap<Uuid, StoredBet>>,
}

impl InMemoryBetRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BetRepository for InMemoryBetRepository {
    async fn save(&self, bet: &Bet) -> Result<(), DomainError> {
        let mut bets = self.bets.write().await;
        let deleted = bets.get(&bet.id()).map(|s| s.deleted).unwrap_or(false);
        bets.insert(
            bet.id(),
            StoredBet {
                bet: bet.clone(),
                deleted,
            },
        );
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Bet>, DomainError> {
        let bets = self.bets.read().await;
        Ok(bets
            .get(&id)
            .filter(|stored| !stored.deleted)
            .map(|stored| stored.bet.clone()))
    }

    async fn find_by_customer(&self, customer_id: &str) -> Result<Vec<Bet>, DomainError> {
        let bets = self.bets.read().await;
        let mut found: Vec<Bet> = bets
            .values()
            .filter(|stored| !stored.deleted && stored.bet.customer_id() == customer_id)
            .map(|stored| stored.bet.clone())
            .collect();
        found.sort_by(|a, b| b.placed_at().cmp(&a.placed_at()));
        Ok(found)
    }

    async fn find_by_status(&self, status: BetStatus) -> Result<Vec<Bet>, DomainError> {
        let bets = self.bets.read().await;
        let mut found: Vec<Bet> = bets
            .values()
            .filter(|stored| !stored.deleted && stored.bet.status() == status)
            .map(|stored| stored.bet.clone())
            .collect();
        found.sort_by(|a, b| b.placed_at().cmp(&a.placed_at()));
        Ok(found)
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut bets = self.bets.write().await;
        match bets.get_mut(&id) {
            Some(stored) => {
                stored.deleted = true;
                Ok(())
            }
            None => Err(DomainError::BetNotFound {
                bet_id: id.to_string(),
            }),
        }
    }

    async fn statistics(&self) -> Result<BetStatistics, DomainError> {
        let bets = self.bets.read().await;
        let mut stats = BetStatistics::default();
        for stored in bets.values().filter(|stored| !stored.deleted) {
            let bet = &stored.bet;
            stats.total_bets += 1;
            match bet.status() {
                BetStatus::Open => stats.open_bets += 1,
                BetStatus::Won => stats.won_bets += 1,
                BetStatus::Lost => stats.lost_bets += 1,
                BetStatus::Cancelled => stats.cancelled_bets += 1,
                BetStatus::Voided => stats.voided_bets += 1,
            }
            stats.total_staked += bet.stake();
            stats.total_payout += bet.total_payout();
            stats.net_result += bet.net_result();
        }
        Ok(stats)
    }
}
