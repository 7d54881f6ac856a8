use anchor_lang::error::Error;
use anchor_lang::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::CoreError::{
  FeeExceedsMaximum, FeeExtraction, MaxFeeBelowActiveFee,
};
use crate::exchange_math::{mul_div, Rounding};

/// Denominator of every fee: 10,000 basis points is 100%.
pub const BPS_SCALE: u16 = 10_000;

/// Which side of the engine a fee applies to.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  AnchorSerialize,
  AnchorDeserialize,
)]
pub enum FeeDirection {
  Buy,
  Sell,
}

impl std::fmt::Display for FeeDirection {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      FeeDirection::Buy => f.write_str("buy"),
      FeeDirection::Sell => f.write_str("sell"),
    }
  }
}

/// Active fee and its cap, both in basis points.
/// Always holds `current_bps <= max_bps <= BPS_SCALE`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, InitSpace, AnchorSerialize, AnchorDeserialize,
)]
pub struct FeeConfig {
  current_bps: u16,
  max_bps: u16,
}

impl FeeConfig {
  pub fn new(current_bps: u16, max_bps: u16) -> Result<FeeConfig> {
    let mut config = FeeConfig {
      current_bps: 0,
      max_bps: BPS_SCALE,
    };
    config.set_max_fee(max_bps)?;
    config.set_fee(current_bps)?;
    Ok(config)
  }

  #[must_use]
  pub fn current_bps(&self) -> u16 {
    self.current_bps
  }

  #[must_use]
  pub fn max_bps(&self) -> u16 {
    self.max_bps
  }

  /// Replaces the active fee, bounded by the cap.
  pub fn set_fee(&mut self, fee_bps: u16) -> Result<()> {
    if fee_bps > self.max_bps {
      Err(Error::from(FeeExceedsMaximum).with_values((fee_bps, self.max_bps)))
    } else {
      self.current_bps = fee_bps;
      Ok(())
    }
  }

  /// Replaces the cap. It may not drop below the active fee nor exceed 100%.
  pub fn set_max_fee(&mut self, max_bps: u16) -> Result<()> {
    if max_bps > BPS_SCALE {
      Err(Error::from(FeeExceedsMaximum).with_values((max_bps, BPS_SCALE)))
    } else if max_bps < self.current_bps {
      Err(
        Error::from(MaxFeeBelowActiveFee).with_values((max_bps, self.current_bps)),
      )
    } else {
      self.max_bps = max_bps;
      Ok(())
    }
  }

  /// Splits a gross amount with the active fee.
  pub fn extract(&self, amount_in: u128) -> Result<FeeExtract> {
    FeeExtract::new(self.current_bps, amount_in)
  }
}

/// Buy and sell fee configuration.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, InitSpace, AnchorSerialize, AnchorDeserialize,
)]
pub struct FeeSchedule {
  buy: FeeConfig,
  sell: FeeConfig,
}

impl FeeSchedule {
  #[must_use]
  pub fn new(buy: FeeConfig, sell: FeeConfig) -> FeeSchedule {
    FeeSchedule { buy, sell }
  }

  #[must_use]
  pub fn get(&self, direction: FeeDirection) -> &FeeConfig {
    match direction {
      FeeDirection::Buy => &self.buy,
      FeeDirection::Sell => &self.sell,
    }
  }

  pub fn get_mut(&mut self, direction: FeeDirection) -> &mut FeeConfig {
    match direction {
      FeeDirection::Buy => &mut self.buy,
      FeeDirection::Sell => &mut self.sell,
    }
  }
}

/// Combines fee multiplication for a token amount with the remaining token
/// amount by subtraction. The fee rounds up so truncation never favors the
/// payer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeExtract {
  pub fees_extracted: u128,
  pub amount_remaining: u128,
}

impl FeeExtract {
  pub fn new(fee_bps: u16, amount_in: u128) -> Result<FeeExtract> {
    let fees_extracted = mul_div(
      amount_in,
      u128::from(fee_bps),
      u128::from(BPS_SCALE),
      Rounding::Up,
    )
    .ok_or(FeeExtraction)?;

    let amount_remaining = amount_in
      .checked_sub(fees_extracted)
      .ok_or(FeeExtraction)?;

    Ok(FeeExtract {
      fees_extracted,
      amount_remaining,
    })
  }
}
