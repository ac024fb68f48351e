use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// =============================================================================
// Amounts
// =============================================================================

/// A required amount as handed in by a caller, before validation.
///
/// Floats are converted through their shortest decimal text form so that
/// `0.1` becomes exactly `0.1`, never the nearest binary fraction.
#[derive(Debug, Clone, PartialEq)]
pub enum AmountInput {
    Text(String),
    Integer(i128),
    Float(f64),
    Decimal(Decimal),
}

impl AmountInput {
    /// Build an amount from a JSON argument (string or number).
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::String(s) => Ok(Self::Text(s.clone())),
            // serde_json prints numbers in their shortest round-trip form.
            serde_json::Value::Number(n) => Ok(Self::Text(n.to_string())),
            serde_json::Value::Null => Err(Error::invalid_input("amount_required is missing")),
            other => Err(Error::invalid_input(format!(
                "amount_required must be a string or number, got {}",
                other
            ))),
        }
    }

    /// Parse into an exact, non-negative decimal.
    pub fn parse(&self) -> Result<Decimal> {
        let mut amount = match self {
            Self::Text(s) => parse_decimal(s)?,
            Self::Integer(i) => Decimal::try_from_i128_with_scale(*i, 0)
                .map_err(|e| Error::invalid_input(format!("amount {} is out of range: {}", i, e)))?,
            Self::Float(f) => {
                if !f.is_finite() {
                    return Err(Error::invalid_input(format!("amount is not finite: {}", f)));
                }
                parse_decimal(&f.to_string())?
            }
            Self::Decimal(d) => *d,
        };

        if amount.is_sign_negative() {
            if !amount.is_zero() {
                return Err(Error::invalid_input(format!("amount must not be negative: {}", amount)));
            }
            amount.set_sign_positive(true);
        }
        Ok(amount)
    }
}

impl From<&str> for AmountInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AmountInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for AmountInput {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<i64> for AmountInput {
    fn from(value: i64) -> Self {
        Self::Integer(value as i128)
    }
}

impl From<u64> for AmountInput {
    fn from(value: u64) -> Self {
        Self::Integer(value as i128)
    }
}

impl From<Decimal> for AmountInput {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

/// Parse a decimal string exactly, accepting plain (`"12.50"`) and scientific
/// (`"1e-7"`) forms.
///
/// Values that would need rounding to fit a `Decimal` (more than 28 fractional
/// digits, or too many significant digits) are rejected.
pub fn parse_decimal(raw: &str) -> Result<Decimal> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(Error::invalid_input("amount is empty"));
    }
    let invalid = |detail: String| Error::invalid_input(format!("amount '{}' is not an exact decimal: {}", raw, detail));

    let Some((mantissa, exponent)) = s.split_once(['e', 'E']) else {
        return Decimal::from_str_exact(s).map_err(|e| invalid(e.to_string()));
    };

    let mantissa = Decimal::from_str_exact(mantissa)
        .map_err(|e| invalid(e.to_string()))?
        .normalize();
    let exponent: i64 = exponent
        .parse()
        .map_err(|_| invalid(format!("bad exponent '{}'", exponent)))?;

    if exponent < 0 {
        let scale = i64::from(mantissa.scale()) - exponent;
        if scale > i64::from(MAX_SCALE) {
            return Err(invalid(format!("more than {} fractional digits", MAX_SCALE)));
        }
        let mut value = mantissa;
        value
            .set_scale(scale as u32)
            .map_err(|e| invalid(e.to_string()))?;
        return Ok(value);
    }

    let mut value = mantissa;
    for _ in 0..exponent.min(i64::from(MAX_SCALE) + 1) {
        value = value
            .checked_mul(Decimal::TEN)
            .ok_or_else(|| invalid("out of range".to_string()))?;
    }
    if exponent > i64::from(MAX_SCALE) && !value.is_zero() {
        return Err(invalid("out of range".to_string()));
    }
    Ok(value)
}

/// Largest number of fractional digits a `Decimal` holds.
const MAX_SCALE: u32 = 28;

// =============================================================================
// Balance Query / Result
// =============================================================================

/// A request for a party's current holdings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceQuery {
    pub tenant_id: String,
    pub agent_id: String,
    pub currency_or_asset: String,
}

impl BalanceQuery {
    /// Build a validated query. Empty or whitespace-only fields are rejected.
    pub fn new(
        tenant_id: impl Into<String>,
        agent_id: impl Into<String>,
        currency_or_asset: impl Into<String>,
    ) -> Result<Self> {
        let query = Self {
            tenant_id: tenant_id.into(),
            agent_id: agent_id.into(),
            currency_or_asset: currency_or_asset.into(),
        };

        for (field, value) in [
            ("tenant_id", &query.tenant_id),
            ("agent_id", &query.agent_id),
            ("currency_or_asset", &query.currency_or_asset),
        ] {
            if value.trim().is_empty() {
                return Err(Error::invalid_input(format!("{} is required", field)));
            }
        }

        Ok(query)
    }
}

/// The oracle's answer to a [`BalanceQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceResult {
    pub current_balance: Decimal,
}

impl BalanceResult {
    pub fn new(current_balance: Decimal) -> Self {
        Self { current_balance }
    }

    /// Balance for an asset the party has never held.
    pub fn zero() -> Self {
        Self::new(Decimal::ZERO)
    }
}

// =============================================================================
// Budget Decision
// =============================================================================

/// Why a budget check was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    InsufficientBalance,
}

impl DenialReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InsufficientBalance => "insufficient_balance",
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allow/deny outcome of a budget check.
///
/// Fields are private so `reason.is_some() == !allowed` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetDecision {
    allowed: bool,
    current_balance: Decimal,
    required: Decimal,
    reason: Option<DenialReason>,
}

impl BudgetDecision {
    /// Compare a balance against a requirement. Equality is affordable.
    pub fn evaluate(current_balance: Decimal, required: Decimal) -> Self {
        let allowed = current_balance >= required;
        Self {
            allowed,
            current_balance,
            required,
            reason: (!allowed).then_some(DenialReason::InsufficientBalance),
        }
    }

    pub fn allowed(&self) -> bool {
        self.allowed
    }

    pub fn current_balance(&self) -> Decimal {
        self.current_balance
    }

    pub fn required(&self) -> Decimal {
        self.required
    }

    pub fn reason(&self) -> Option<DenialReason> {
        self.reason
    }
}
