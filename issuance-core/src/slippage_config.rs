use anchor_lang::error::Error;
use anchor_lang::prelude::*;

use crate::error::CoreError::InsufficientOutputAmount;

/// Client specified lowest tolerable output of a buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct SlippageConfig {
  min_amount_out: u128,
}

impl SlippageConfig {
  #[must_use]
  pub fn new(min_amount_out: u128) -> SlippageConfig {
    SlippageConfig { min_amount_out }
  }

  #[must_use]
  pub fn min_amount_out(&self) -> u128 {
    self.min_amount_out
  }

  /// Checks computed output against the configured minimum.
  pub fn validate_amount_out(&self, amount_out: u128) -> Result<()> {
    validate_amount_out(amount_out, self.min_amount_out)
  }
}

/// Fails with the computed and requested amounts when `amount_out < min_out`.
pub fn validate_amount_out(amount_out: u128, min_out: u128) -> Result<()> {
  if amount_out >= min_out {
    Ok(())
  } else {
    Err(
      Error::from(InsufficientOutputAmount)
        .with_values((amount_out, min_out)),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn slippage_neg() {
    let config = SlippageConfig::new(1_201_346);
    let out = config.validate_amount_out(1_198_942);
    assert!(out.is_err_and(|e| e == InsufficientOutputAmount.into()));
  }

  #[test]
  fn slippage_pos() {
    let config = SlippageConfig::new(99_312_089);
    assert!(config.validate_amount_out(99_411_501).is_ok());
  }

  #[test]
  fn exact_minimum_passes() {
    assert!(validate_amount_out(495_000_000_000, 495_000_000_000).is_ok());
  }
}
