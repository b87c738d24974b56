//! Money values stored as TEXT decimals.

use anyhow::{anyhow, Context, Result};
use rust_decimal::Decimal;
use std::str::FromStr;

/// NULL is zero; anything else must be a valid decimal
pub fn parse_amount(raw: Option<&str>) -> Result<Decimal> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(Decimal::ZERO);
    };
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .with_context(|| format!("invalid amount '{}'", raw))
}

/// Add `amount` to `total`, failing instead of panicking past `Decimal::MAX`
pub fn add_amount(total: &mut Decimal, amount: Decimal) -> Result<()> {
    *total = total
        .checked_add(amount)
        .ok_or_else(|| anyhow!("amount overflow adding {} to {}", amount, total))?;
    Ok(())
}
