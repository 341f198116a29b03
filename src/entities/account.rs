use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::dto::AccountDto;
use crate::error::{DomainError, ValidationError};
use crate::money::Money;

/// Local view of an agent's wagering account: a snapshot of remote state
/// plus a locally-assigned identity. Current and available balances move
/// together; the pending balance holds reserved stakes.
#[derive(Debug, Clone)]
pub struct FantasyAccount {
    id: Uuid,
    account_id: String,
    agent_id: String,
    current_balance: Money,
    available_balance: Money,
    pending_balance: Money,
    credit_limit: Money,
    active: bool,
}

impl FantasyAccount {
    pub fn from_external_data(dto: AccountDto) -> Result<Self, ValidationError> {
        if dto.account_id.is_empty() {
            return Err(ValidationError::new("accountId", "must not be empty"));
        }
        if dto.agent_id.is_empty() {
            return Err(ValidationError::new("agentId", "must not be empty"));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            account_id: dto.account_id,
            agent_id: dto.agent_id,
            current_balance: Money::new(dto.current_balance, &dto.currency)
                .map_err(|_| ValidationError::new("currentBalance", "must not be negative"))?,
            available_balance: Money::new(dto.available_balance, &dto.currency)
                .map_err(|_| ValidationError::new("availableBalance", "must not be negative"))?,
            pending_balance: Money::new(dto.pending_balance, &dto.currency)
                .map_err(|_| ValidationError::new("pendingBalance", "must not be negative"))?,
            credit_limit: Money::new(dto.credit_limit, &dto.currency)
                .map_err(|_| ValidationError::new("creditLimit", "must not be negative"))?,
            active: dto.active,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn current_balance(&self) -> &Money {
        &self.current_balance
    }

    pub fn available_balance(&self) -> &Money {
        &self.available_balance
    }

    pub fn pending_balance(&self) -> &Money {
        &self.pending_balance
    }

    pub fn credit_limit(&self) -> &Money {
        &self.credit_limit
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn freeze(&mut self) {
        self.active = false;
    }

    pub fn unfreeze(&mut self) {
        self.active = true;
    }

    /// Adds funds to both current and available balances.
    pub fn credit(&mut self, amount: &Money) -> Result<(), DomainError> {
        self.ensure_active()?;
        self.current_balance = self.current_balance.add(amount)?;
        self.available_balance = self.available_balance.add(amount)?;
        Ok(())
    }

    /// Removes funds from both balances; fails with `INSUFFICIENT_FUNDS` if
    /// the available balance cannot cover the amount.
    pub fn debit(&mut self, amount: &Money) -> Result<(), DomainError> {
        self.ensure_active()?;
        let available = self.available_balance.subtract(amount)?;
        let current = self.current_balance.subtract(amount)?;
        self.available_balance = available;
        self.current_balance = current;
        Ok(())
    }

    /// Reserves a stake: moves funds from available to pending.
    pub fn add_pending_wager(&mut self, stake: &Money) -> Result<(), DomainError> {
        self.ensure_active()?;
        self.available_balance = self.available_balance.subtract(stake)?;
        self.pending_balance = self.pending_balance.add(stake)?;
        Ok(())
    }

    /// Releases a pending reservation. On a win the released amount is
    /// additionally credited to both balances as winnings; on a loss only
    /// the reservation is dropped.
    pub fn settle_pending_wager(&mut self, amount: &Money, is_win: bool) -> Result<(), DomainError> {
        if self.pending_balance.covers(amount)? {
            self.pending_balance = self.pending_balance.subtract(amount)?;
        } else {
            return Err(DomainError::PendingWagerMismatch {
                reserved: self.pending_balance.amount(),
                requested: amount.amount(),
            });
        }
        if is_win {
            self.current_balance = self.current_balance.add(amount)?;
            self.available_balance = self.available_balance.add(amount)?;
        }
        Ok(())
    }

    /// Share of the credit line currently in use, as a percentage. Zero
    /// when no credit line is configured.
    pub fn utilization_percentage(&self) -> Decimal {
        let limit = self.credit_limit.amount();
        if limit.is_zero() {
            return Decimal::ZERO;
        }
        ((limit - self.available_balance.amount()) / limit * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    fn ensure_active(&self) -> Result<(), DomainError> {
        if !self.active {
            return Err(DomainError::AccountInactive {
                account_id: self.account_id.clone(),
            });
        }
        Ok(())
    }
}
