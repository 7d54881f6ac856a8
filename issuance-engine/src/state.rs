use anchor_lang::error::Error;
use anchor_lang::prelude::*;
use issuance_core::conversion::TokenDecimalsPair;
use issuance_core::fee_controller::{FeeConfig, FeeDirection, FeeSchedule};
use issuance_core::redemption_queue::RedemptionQueue;
use tracing::warn;

use crate::error::EngineError::InvalidEngineState;

/// Everything the engine owns, as persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct EngineState {
  pub fees: FeeSchedule,
  pub decimals: TokenDecimalsPair,
  pub project_treasury: Pubkey,
  pub price_source: Pubkey,
  pub collateral_token: Pubkey,
  pub issuance_token: Pubkey,
  pub buy_is_open: bool,
  pub sell_is_open: bool,
  pub direct_operations_only: bool,
  pub queue: RedemptionQueue,
  /// Buy fees received by the treasury, in collateral units.
  pub collected_buy_fees: u128,
  /// Sell fees withheld from redemption payouts, in collateral units.
  pub retained_sell_fees: u128,
}

impl EngineState {
  pub fn to_bytes(&self) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    self
      .serialize(&mut bytes)
      .map_err(|_| InvalidEngineState)?;
    Ok(bytes)
  }

  /// Decodes persisted state and rejects it unless every invariant the
  /// engine maintains still holds.
  pub fn from_bytes(bytes: &[u8]) -> Result<EngineState> {
    let state =
      EngineState::try_from_slice(bytes).map_err(|_| InvalidEngineState)?;
    state.validate()?;
    Ok(state)
  }

  /// Re-checks fee ordering, decimals, treasury and queue counters.
  pub fn validate(&self) -> Result<()> {
    for direction in [FeeDirection::Buy, FeeDirection::Sell] {
      let fee = self.fees.get(direction);
      FeeConfig::new(fee.current_bps(), fee.max_bps()).map_err(|err| {
        warn!(%direction, error = %err, "persisted fee config invalid");
        Error::from(InvalidEngineState)
          .with_values((fee.current_bps(), fee.max_bps()))
      })?;
    }
    TokenDecimalsPair::new(self.decimals.collateral(), self.decimals.issuance())
      .map_err(|_| {
        Error::from(InvalidEngineState).with_values((
          self.decimals.collateral(),
          self.decimals.issuance(),
        ))
      })?;
    if self.project_treasury == Pubkey::default() {
      return Err(InvalidEngineState.into());
    }
    if !self.queue.is_consistent() {
      warn!(
        next_order_id = self.queue.next_order_id(),
        orders = self.queue.len(),
        "persisted redemption queue inconsistent"
      );
      return Err(InvalidEngineState.into());
    }
    Ok(())
  }
}
