use anchor_lang::prelude::*;
use issuance_core::exchange_math::{purchase_return, PurchaseReturn};
use issuance_core::fee_controller::FeeDirection;
use issuance_core::slippage_config::validate_amount_out;
use tracing::info;

use super::{validate_trade, IssuanceEngine};
use crate::authority::Capability;
use crate::error::EngineError::{
  BuyingClosed, DirectOperationsOnly, FeeTotalOverflow, InvalidDepositAmount,
};
use crate::events::Purchased;
use crate::ledger::{LedgerOp, TokenSide};

impl IssuanceEngine {
  /// Deposits `deposit_amount` collateral from `caller` and mints issuance
  /// tokens back to `caller`.
  pub fn buy(
    &mut self,
    caller: &Pubkey,
    deposit_amount: u128,
    min_amount_out: u128,
  ) -> Result<PurchaseReturn> {
    self.transact("buy", |engine| {
      engine.execute_buy(caller, caller, deposit_amount, min_amount_out)
    })
  }

  /// Like [`IssuanceEngine::buy`] with a separate beneficiary. Rejected while
  /// direct operations are enforced.
  pub fn buy_for(
    &mut self,
    caller: &Pubkey,
    receiver: &Pubkey,
    deposit_amount: u128,
    min_amount_out: u128,
  ) -> Result<PurchaseReturn> {
    if self.state.direct_operations_only {
      return Err(DirectOperationsOnly.into());
    }
    self.transact("buy_for", |engine| {
      engine.execute_buy(caller, receiver, deposit_amount, min_amount_out)
    })
  }

  /// Previews a buy at the current rate and fee.
  pub fn calculate_purchase_return(
    &self,
    deposit_amount: u128,
  ) -> Result<PurchaseReturn> {
    if deposit_amount == 0 {
      return Err(InvalidDepositAmount.into());
    }
    self.price_purchase(deposit_amount)
  }

  pub(crate) fn price_purchase(
    &self,
    deposit_amount: u128,
  ) -> Result<PurchaseReturn> {
    purchase_return(
      deposit_amount,
      self.fee_config(FeeDirection::Buy),
      self.prices.issuance_rate()?,
      self.state.decimals,
    )
  }

  fn execute_buy(
    &mut self,
    caller: &Pubkey,
    receiver: &Pubkey,
    deposit_amount: u128,
    min_amount_out: u128,
  ) -> Result<PurchaseReturn> {
    self.authorize(Capability::Whitelist, caller)?;
    if !self.state.buy_is_open {
      return Err(BuyingClosed.into());
    }
    validate_trade(receiver, deposit_amount, min_amount_out)?;
    let purchase = self.price_purchase(deposit_amount)?;
    validate_amount_out(purchase.issuance_out, min_amount_out)?;

    self.state.collected_buy_fees = self
      .state
      .collected_buy_fees
      .checked_add(purchase.fee_amount)
      .ok_or(FeeTotalOverflow)?;

    self.settle_ledger(&[
      (
        TokenSide::Collateral,
        LedgerOp::Transfer {
          from: *caller,
          to: self.state.project_treasury,
          amount: deposit_amount,
        },
      ),
      (
        TokenSide::Issuance,
        LedgerOp::Mint {
          to: *receiver,
          amount: purchase.issuance_out,
        },
      ),
    ])?;

    self.emit(Purchased {
      buyer: *caller,
      receiver: *receiver,
      deposit_amount,
      fee_amount: purchase.fee_amount,
      issuance_out: purchase.issuance_out,
      exchange_rate: purchase.exchange_rate,
    });
    info!(
      %caller,
      %receiver,
      deposit_amount,
      fee_amount = purchase.fee_amount,
      issuance_out = purchase.issuance_out,
      "buy settled"
    );
    Ok(purchase)
  }
}
