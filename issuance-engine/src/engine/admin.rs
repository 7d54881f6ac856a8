use anchor_lang::prelude::*;
use issuance_core::fee_controller::FeeDirection;
use issuance_core::oracle::PriceSource;
use tracing::info;

use super::IssuanceEngine;
use crate::authority::Capability;
use crate::error::EngineError::InvalidProjectTreasury;
use crate::events::{
  DirectOperationsOnlyUpdated, FeeUpdated, IssuanceTokenUpdated, MaxFeeUpdated,
  PriceSourceUpdated, ProjectTreasuryUpdated, TradingGateUpdated,
};
use crate::ledger::TokenLedger;
use crate::settlement::Settlement;

impl IssuanceEngine {
  pub fn set_buy_fee(&mut self, caller: &Pubkey, fee_bps: u16) -> Result<()> {
    self.set_fee(caller, FeeDirection::Buy, fee_bps)
  }

  pub fn set_sell_fee(&mut self, caller: &Pubkey, fee_bps: u16) -> Result<()> {
    self.set_fee(caller, FeeDirection::Sell, fee_bps)
  }

  pub fn set_max_buy_fee(&mut self, caller: &Pubkey, max_bps: u16) -> Result<()> {
    self.set_max_fee(caller, FeeDirection::Buy, max_bps)
  }

  pub fn set_max_sell_fee(
    &mut self,
    caller: &Pubkey,
    max_bps: u16,
  ) -> Result<()> {
    self.set_max_fee(caller, FeeDirection::Sell, max_bps)
  }

  fn set_fee(
    &mut self,
    caller: &Pubkey,
    direction: FeeDirection,
    fee_bps: u16,
  ) -> Result<()> {
    self.transact("set_fee", |engine| {
      engine.authorize(Capability::Governance, caller)?;
      let fee = engine.state.fees.get_mut(direction);
      let old_bps = fee.current_bps();
      fee.set_fee(fee_bps)?;
      if old_bps != fee_bps {
        engine.emit(FeeUpdated {
          direction,
          old_bps,
          new_bps: fee_bps,
        });
        info!(%direction, old_bps, new_bps = fee_bps, "fee updated");
      }
      Ok(())
    })
  }

  fn set_max_fee(
    &mut self,
    caller: &Pubkey,
    direction: FeeDirection,
    max_bps: u16,
  ) -> Result<()> {
    self.transact("set_max_fee", |engine| {
      engine.authorize(Capability::Governance, caller)?;
      let fee = engine.state.fees.get_mut(direction);
      let old_bps = fee.max_bps();
      fee.set_max_fee(max_bps)?;
      if old_bps != max_bps {
        engine.emit(MaxFeeUpdated {
          direction,
          old_bps,
          new_bps: max_bps,
        });
        info!(%direction, old_bps, new_bps = max_bps, "max fee updated");
      }
      Ok(())
    })
  }

  /// Re-points the collateral destination of buys.
  pub fn set_project_treasury(
    &mut self,
    caller: &Pubkey,
    treasury: &Pubkey,
  ) -> Result<()> {
    self.transact("set_project_treasury", |engine| {
      engine.authorize(Capability::Governance, caller)?;
      if *treasury == Pubkey::default() {
        return Err(InvalidProjectTreasury.into());
      }
      let old = engine.state.project_treasury;
      if old != *treasury {
        engine.state.project_treasury = *treasury;
        engine.emit(ProjectTreasuryUpdated {
          old,
          new: *treasury,
        });
        info!(%old, new = %treasury, "project treasury updated");
      }
      Ok(())
    })
  }

  /// Swaps the price source. A candidate without the price source interface
  /// is rejected and the current source stays attached.
  pub fn set_price_source(
    &mut self,
    caller: &Pubkey,
    source: Box<dyn PriceSource>,
  ) -> Result<()> {
    self.transact("set_price_source", |engine| {
      engine.authorize(Capability::Governance, caller)?;
      let old = engine.prices.replace(source)?;
      let new = engine.prices.source_id();
      engine.state.price_source = new;
      if old != new {
        engine.emit(PriceSourceUpdated { old, new });
        info!(%old, %new, "price source updated");
      }
      Ok(())
    })
  }

  pub fn set_direct_operations_only(
    &mut self,
    caller: &Pubkey,
    enabled: bool,
  ) -> Result<()> {
    self.transact("set_direct_operations_only", |engine| {
      engine.authorize(Capability::Governance, caller)?;
      if engine.state.direct_operations_only != enabled {
        engine.state.direct_operations_only = enabled;
        engine.emit(DirectOperationsOnlyUpdated { enabled });
        info!(enabled, "direct operations mode updated");
      }
      Ok(())
    })
  }

  /// Re-points the issuance ledger and re-captures its decimals.
  pub fn set_issuance_token(
    &mut self,
    caller: &Pubkey,
    ledger: Box<dyn TokenLedger>,
  ) -> Result<()> {
    self.transact("set_issuance_token", |engine| {
      engine.authorize(Capability::Governance, caller)?;
      let decimals = engine.state.decimals.with_issuance(ledger.decimals())?;
      let old = engine.state.issuance_token;
      let new = ledger.token();
      engine.state.decimals = decimals;
      engine.state.issuance_token = new;
      engine.issuance = ledger;
      if old != new {
        engine.emit(IssuanceTokenUpdated {
          old,
          new,
          decimals: decimals.issuance(),
        });
        info!(%old, %new, decimals = decimals.issuance(), "issuance token updated");
      }
      Ok(())
    })
  }

  /// Re-points the settlement collaborator. Its interface is checked when
  /// the queue is next executed.
  pub fn set_settlement(
    &mut self,
    caller: &Pubkey,
    settlement: Box<dyn Settlement>,
  ) -> Result<()> {
    self.transact("set_settlement", |engine| {
      engine.authorize(Capability::Governance, caller)?;
      engine.settlement = settlement;
      info!("settlement updated");
      Ok(())
    })
  }

  pub fn open_buy(&mut self, caller: &Pubkey) -> Result<()> {
    self.set_gate(caller, FeeDirection::Buy, true)
  }

  pub fn close_buy(&mut self, caller: &Pubkey) -> Result<()> {
    self.set_gate(caller, FeeDirection::Buy, false)
  }

  pub fn open_sell(&mut self, caller: &Pubkey) -> Result<()> {
    self.set_gate(caller, FeeDirection::Sell, true)
  }

  pub fn close_sell(&mut self, caller: &Pubkey) -> Result<()> {
    self.set_gate(caller, FeeDirection::Sell, false)
  }

  fn set_gate(
    &mut self,
    caller: &Pubkey,
    direction: FeeDirection,
    is_open: bool,
  ) -> Result<()> {
    self.transact("set_gate", |engine| {
      engine.authorize(Capability::Governance, caller)?;
      let gate = match direction {
        FeeDirection::Buy => &mut engine.state.buy_is_open,
        FeeDirection::Sell => &mut engine.state.sell_is_open,
      };
      if *gate != is_open {
        *gate = is_open;
        engine.emit(TradingGateUpdated { direction, is_open });
        info!(%direction, is_open, "trading gate updated");
      }
      Ok(())
    })
  }
}
