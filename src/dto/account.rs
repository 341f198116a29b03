use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub account_id: String,
    pub agent_id: String,
    pub current_balance: Decimal,
    pub available_balance: Decimal,
    #[serde(default)]
    pub pending_balance: Decimal,
    pub credit_limit: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountEnvelope {
    pub account: AccountDto,
}

/// Body of `POST /agents/{id}/balance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceUpdateRequest {
    pub amount: Decimal,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceUpdateDto {
    pub agent_id: String,
    pub new_balance: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceEnvelope {
    pub balance: BalanceUpdateDto,
}
