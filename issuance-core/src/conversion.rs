//! Decimal normalization between fixed-point token amounts.
//!
//! Scaling up to a finer precision is exact. Scaling down truncates toward
//! zero and the remainder is lost, so `1` at 18 decimals becomes `0` at 6.
//! Pricing and fee logic downstream rely on this truncation.

use anchor_lang::prelude::*;

use crate::error::CoreError::{DecimalNormalization, InvalidTokenDecimals};

/// Precision used for all internal pricing math, matching the oracle rates.
pub const INTERNAL_DECIMALS: u8 = 18;

/// Smallest supported token precision.
pub const MIN_TOKEN_DECIMALS: u8 = 1;

/// Largest supported token precision.
pub const MAX_TOKEN_DECIMALS: u8 = 24;

/// Checks a token precision against the supported range.
pub fn validate_decimals(decimals: u8) -> Result<u8> {
  (MIN_TOKEN_DECIMALS..=MAX_TOKEN_DECIMALS)
    .contains(&decimals)
    .then_some(decimals)
    .ok_or(InvalidTokenDecimals.into())
}

fn pow10(exp: u8) -> Result<u128> {
  10u128
    .checked_pow(u32::from(exp))
    .ok_or(DecimalNormalization.into())
}

/// Converts `amount` expressed with `from_decimals` into `to_decimals`.
pub fn normalize(amount: u128, from_decimals: u8, to_decimals: u8) -> Result<u128> {
  match from_decimals.cmp(&to_decimals) {
    std::cmp::Ordering::Less => {
      let factor = pow10(to_decimals - from_decimals)?;
      amount
        .checked_mul(factor)
        .ok_or(DecimalNormalization.into())
    }
    std::cmp::Ordering::Greater => {
      let divisor = pow10(from_decimals - to_decimals)?;
      Ok(amount / divisor)
    }
    std::cmp::Ordering::Equal => Ok(amount),
  }
}

/// Lifts a token amount into internal 18 decimal precision.
pub fn to_internal(amount: u128, decimals: u8) -> Result<u128> {
  normalize(amount, decimals, INTERNAL_DECIMALS)
}

/// Lowers an internal 18 decimal amount into token precision.
pub fn from_internal(amount: u128, decimals: u8) -> Result<u128> {
  normalize(amount, INTERNAL_DECIMALS, decimals)
}

/// Decimal precision of the collateral and issuance tokens, captured once
/// from their ledgers.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, InitSpace, AnchorSerialize, AnchorDeserialize,
)]
pub struct TokenDecimalsPair {
  collateral: u8,
  issuance: u8,
}

impl TokenDecimalsPair {
  pub fn new(collateral: u8, issuance: u8) -> Result<TokenDecimalsPair> {
    Ok(TokenDecimalsPair {
      collateral: validate_decimals(collateral)?,
      issuance: validate_decimals(issuance)?,
    })
  }

  #[must_use]
  pub fn collateral(&self) -> u8 {
    self.collateral
  }

  #[must_use]
  pub fn issuance(&self) -> u8 {
    self.issuance
  }

  /// Re-captures issuance precision after the issuance token is re-pointed.
  pub fn with_issuance(self, issuance: u8) -> Result<TokenDecimalsPair> {
    TokenDecimalsPair::new(self.collateral, issuance)
  }
}
