//! Purchase and sale pricing.
//!
//! Amounts enter in token precision, are lifted to 18 decimals, multiplied by
//! an 18 decimal oracle rate and lowered back into the output token's
//! precision. Every conversion rounds down; only fees round up.

use alloy_primitives::U256;
use anchor_lang::prelude::*;

use crate::conversion::{from_internal, to_internal, TokenDecimalsPair};
use crate::error::CoreError::{CollateralToIssuance, IssuanceToCollateral};
use crate::fee_controller::{FeeConfig, FeeExtract};
use crate::oracle::{PriceQuote, RATE_ONE};

/// Rounding direction
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Rounding {
  Up,
  Down,
}

/// `x * y / denominator` through a 256-bit intermediate.
/// `None` on a zero denominator or when the result exceeds `u128`.
#[must_use]
pub fn mul_div(
  x: u128,
  y: u128,
  denominator: u128,
  rounding: Rounding,
) -> Option<u128> {
  if denominator == 0 {
    return None;
  }
  let denominator = U256::from(denominator);
  let product = U256::from(x).checked_mul(U256::from(y))?;
  let quotient = product.checked_div(denominator)?;
  let result = match rounding {
    Rounding::Up if !(product % denominator).is_zero() => {
      quotient.checked_add(U256::from(1u8))?
    }
    _ => quotient,
  };
  u128::try_from(result).ok()
}

/// Breakdown of a collateral deposit converted into issuance tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseReturn {
  pub deposit_amount: u128,
  pub fee_bps: u16,
  pub fee_amount: u128,
  pub net_deposit: u128,
  pub exchange_rate: u128,
  pub issuance_out: u128,
}

/// Computes issuance tokens received for a gross collateral deposit.
///   `normalize(normalize(net collateral → 18) * rate / 1e18 → issuance)`
pub fn purchase_return(
  deposit_amount: u128,
  buy_fee: &FeeConfig,
  rate: PriceQuote,
  decimals: TokenDecimalsPair,
) -> Result<PurchaseReturn> {
  let FeeExtract {
    fees_extracted,
    amount_remaining,
  } = buy_fee.extract(deposit_amount)?;
  let internal = to_internal(amount_remaining, decimals.collateral())
    .map_err(|_| CollateralToIssuance)?;
  let issued = mul_div(internal, rate.get(), RATE_ONE, Rounding::Down)
    .ok_or(CollateralToIssuance)?;
  let issuance_out = from_internal(issued, decimals.issuance())
    .map_err(|_| CollateralToIssuance)?;
  Ok(PurchaseReturn {
    deposit_amount,
    fee_bps: buy_fee.current_bps(),
    fee_amount: fees_extracted,
    net_deposit: amount_remaining,
    exchange_rate: rate.get(),
    issuance_out,
  })
}

/// Breakdown of issuance tokens redeemed into owed collateral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleReturn {
  pub deposit_amount: u128,
  pub exchange_rate: u128,
  pub gross_collateral: u128,
  pub fee_bps: u16,
  pub fee_amount: u128,
  pub net_collateral: u128,
}

/// Computes collateral owed for burned issuance tokens. The redemption rate
/// is collateral per issuance token, and the sell fee is taken from the
/// gross collateral.
pub fn sale_return(
  deposit_amount: u128,
  sell_fee: &FeeConfig,
  rate: PriceQuote,
  decimals: TokenDecimalsPair,
) -> Result<SaleReturn> {
  let internal = to_internal(deposit_amount, decimals.issuance())
    .map_err(|_| IssuanceToCollateral)?;
  let collateral = mul_div(internal, rate.get(), RATE_ONE, Rounding::Down)
    .ok_or(IssuanceToCollateral)?;
  let gross_collateral = from_internal(collateral, decimals.collateral())
    .map_err(|_| IssuanceToCollateral)?;
  let FeeExtract {
    fees_extracted,
    amount_remaining,
  } = sell_fee.extract(gross_collateral)?;
  Ok(SaleReturn {
    deposit_amount,
    exchange_rate: rate.get(),
    gross_collateral,
    fee_bps: sell_fee.current_bps(),
    fee_amount: fees_extracted,
    net_collateral: amount_remaining,
  })
}
