//! Read-only quotes for integrators.

use anchor_lang::prelude::*;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::engine::IssuanceEngine;
use crate::error::EngineError::{InvalidDepositAmount, QuoteArithmetic};

/// Amounts of a prospective trade with its effective fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineQuote {
  pub in_amount: u128,
  pub out_amount: u128,
  pub fee_amount: u128,
  /// Fees are always denominated in collateral.
  pub fee_token: Pubkey,
  /// `fee_amount / fee_base` as a fraction, not a percentage of 100.
  pub fee_pct: Decimal,
  pub exchange_rate: u128,
}

/// Computes the effective fee fraction, zero when nothing was charged on.
pub fn fee_pct(fee_amount: u128, fee_base: u128) -> Result<Decimal> {
  if fee_base == 0 {
    return Ok(Decimal::ZERO);
  }
  let fee = Decimal::from_u128(fee_amount).ok_or(QuoteArithmetic)?;
  let base = Decimal::from_u128(fee_base).ok_or(QuoteArithmetic)?;
  fee.checked_div(base).ok_or(QuoteArithmetic.into())
}

impl IssuanceEngine {
  /// Quote for buying with `amount` collateral. Fee base is the deposit.
  pub fn quote_buy(&self, amount: u128) -> Result<EngineQuote> {
    if amount == 0 {
      return Err(InvalidDepositAmount.into());
    }
    let purchase = self.price_purchase(amount)?;
    Ok(EngineQuote {
      in_amount: amount,
      out_amount: purchase.issuance_out,
      fee_amount: purchase.fee_amount,
      fee_token: self.state().collateral_token,
      fee_pct: fee_pct(purchase.fee_amount, amount)?,
      exchange_rate: purchase.exchange_rate,
    })
  }

  /// Quote for selling `amount` issuance tokens. Fee base is the gross
  /// collateral before the sell fee.
  pub fn quote_sell(&self, amount: u128) -> Result<EngineQuote> {
    if amount == 0 {
      return Err(InvalidDepositAmount.into());
    }
    let sale = self.price_sale(amount)?;
    Ok(EngineQuote {
      in_amount: amount,
      out_amount: sale.net_collateral,
      fee_amount: sale.fee_amount,
      fee_token: self.state().collateral_token,
      fee_pct: fee_pct(sale.fee_amount, sale.gross_collateral)?,
      exchange_rate: sale.exchange_rate,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn one_percent() -> Result<()> {
    assert_eq!(fee_pct(10_000, 1_000_000)?, Decimal::new(1, 2));
    Ok(())
  }

  #[test]
  fn zero_base_is_zero() -> Result<()> {
    assert_eq!(fee_pct(0, 0)?, Decimal::ZERO);
    Ok(())
  }

  #[test]
  fn out_of_range_err() {
    let out = fee_pct(1, u128::MAX);
    assert!(out.is_err_and(|e| e == QuoteArithmetic.into()));
  }
}
