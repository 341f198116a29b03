use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const MAX_PRICE: Decimal = Decimal::ONE_THOUSAND;
const MAX_SELECTION_LEN: usize = 100;
const MAX_MARKET_ID_LEN: usize = 50;

/// Immutable betting-odds value object. Equality is structural over
/// price + selection + market id; the capture timestamp is a snapshot
/// detail and does not participate in comparisons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OddsValue {
    price: Decimal,
    selection: String,
    market_id: String,
    captured_at: DateTime<Utc>,
}

impl PartialEq for OddsValue {
    fn eq(&self, other: &Self) -> bool {
        self.price == other.price
            && self.selection == other.selection
            && self.market_id == other.market_id
    }
}

impl Eq for OddsValue {}

impl OddsValue {
    pub fn create(
        price: Decimal,
        selection: &str,
        market_id: &str,
    ) -> Result<Self, ValidationError> {
        if price <= Decimal::ZERO || price > MAX_PRICE {
            return Err(ValidationError::new(
                "price",
                format!("must be in (0, {MAX_PRICE}], got {price}"),
            ));
        }
        if selection.is_empty() || selection.chars().count() > MAX_SELECTION_LEN {
            return Err(ValidationError::new(
                "selection",
                format!("must be 1-{MAX_SELECTION_LEN} characters"),
            ));
        }
        if market_id.is_empty() || market_id.chars().count() > MAX_MARKET_ID_LEN {
            return Err(ValidationError::new(
                "marketId",
                format!("must be 1-{MAX_MARKET_ID_LEN} characters"),
            ));
        }
        Ok(Self {
            price,
            selection: selection.to_string(),
            market_id: market_id.to_string(),
            captured_at: Utc::now(),
        })
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn selection(&self) -> &str {
        &self.selection
    }

    pub fn market_id(&self) -> &str {
        &self.market_id
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn fractional(&self) -> Result<FractionalOdds, ValidationError> {
        decimal_to_fractional(self.price)
    }

    pub fn american(&self) -> Result<i64, ValidationError> {
        decimal_to_american(self.price)
    }

    pub fn implied_probability(&self) -> Decimal {
        // price > 0 is a construction invariant
        (Decimal::ONE_HUNDRED / self.price)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    pub fn is_long_shot(&self) -> bool {
        self.price >= Decimal::from(5)
    }

    pub fn is_favorite(&self) -> bool {
        self.price < Decimal::TWO
    }
}

/// Fractional odds as numerator/denominator, e.g. 3/2 for decimal 2.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FractionalOdds {
    pub numerator: i64,
    pub denominator: i64,
}

impl std::fmt::Display for FractionalOdds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Converts a decimal price to fractional odds. Prices below 2.0 produce
/// 1/n odds-on fractions; prices at or above 2.0 produce n/1.
pub fn decimal_to_fractional(price: Decimal) -> Result<FractionalOdds, ValidationError> {
    let margin = profit_margin(price)?;
    if price < Decimal::TWO {
        Ok(FractionalOdds {
            numerator: 1,
            denominator: round_to_i64(Decimal::ONE / margin)?,
        })
    } else {
        Ok(FractionalOdds {
            numerator: round_to_i64(margin)?,
            denominator: 1,
        })
    }
}

/// Converts a decimal price to American odds: positive for 2.0 and up,
/// negative below.
pub fn decimal_to_american(price: Decimal) -> Result<i64, ValidationError> {
    let margin = profit_margin(price)?;
    if price >= Decimal::TWO {
        round_to_i64(margin * Decimal::ONE_HUNDRED)
    } else {
        Ok(-round_to_i64(Decimal::ONE_HUNDRED / margin)?)
    }
}

/// Implied probability as a percentage rounded to two decimal places.
pub fn implied_probability(price: Decimal) -> Result<Decimal, ValidationError> {
    if price <= Decimal::ZERO {
        return Err(ValidationError::new("price", "must be positive"));
    }
    Ok((Decimal::ONE_HUNDRED / price)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

fn profit_margin(price: Decimal) -> Result<Decimal, ValidationError> {
    if price <= Decimal::ONE {
        return Err(ValidationError::new(
            "price",
            "must be greater than 1 for odds conversion",
        ));
    }
    Ok(price - Decimal::ONE)
}

fn round_to_i64(value: Decimal) -> Result<i64, ValidationError> {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| ValidationError::new("price", "odds conversion out of range"))
}

/// Which convention an external odds figure is expressed in.
///
/// The upstream feed historically mixed decimal and American figures in one
/// numeric field. When the feed supplies no explicit tag, `infer` applies the
/// legacy numeric heuristic; treat inferred tags as approximate until
/// validated against real settlement data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OddsFormat {
    Decimal,
    AmericanPositive,
    AmericanNegative,
}

impl OddsFormat {
    /// Legacy heuristic: negative figures are American negative, figures of
    /// 100 or more are American positive, everything else is decimal.
    pub fn infer(value: Decimal) -> Self {
        if value < Decimal::ZERO {
            OddsFormat::AmericanNegative
        } else if value >= Decimal::ONE_HUNDRED {
            OddsFormat::AmericanPositive
        } else {
            OddsFormat::Decimal
        }
    }

    /// Profit on a winning wager of `stake` at odds `value` in this format.
    pub fn profit_on(&self, stake: Decimal, value: Decimal) -> Decimal {
        match self {
            OddsFormat::Decimal => stake * (value - Decimal::ONE),
            OddsFormat::AmericanPositive => stake * value / Decimal::ONE_HUNDRED,
            OddsFormat::AmericanNegative => stake * Decimal::ONE_HUNDRED / value.abs(),
        }
    }
}
