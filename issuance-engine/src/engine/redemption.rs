use anchor_lang::error::Error;
use anchor_lang::prelude::*;
use issuance_core::exchange_math::{sale_return, SaleReturn};
use issuance_core::fee_controller::FeeDirection;
use issuance_core::redemption_queue::{
  OrderDraft, OrderState, RedemptionOrder,
};
use issuance_core::slippage_config::validate_amount_out;
use tracing::{info, warn};

use super::{validate_trade, IssuanceEngine};
use crate::authority::Capability;
use crate::error::EngineError::{
  DirectOperationsOnly, FeeTotalOverflow, InsufficientTokenBalance,
  InvalidDepositAmount, QueueExecutionFailed, SellingClosed,
};
use crate::events::{
  RedemptionOrderUpdated, RedemptionQueueExecuted, RedemptionQueued,
  RedemptionSettled,
};
use crate::ledger::{LedgerOp, TokenSide};
use crate::settlement::SETTLEMENT_INTERFACE;

/// Sale accepted into the redemption queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedSale {
  pub order_id: u64,
  pub sale: SaleReturn,
}

impl IssuanceEngine {
  /// Burns `deposit_amount` issuance tokens from `caller` and queues the
  /// collateral owed to `caller`.
  pub fn sell(
    &mut self,
    caller: &Pubkey,
    deposit_amount: u128,
    min_amount_out: u128,
  ) -> Result<QueuedSale> {
    self.transact("sell", |engine| {
      engine.execute_sell(caller, caller, deposit_amount, min_amount_out)
    })
  }

  /// Like [`IssuanceEngine::sell`] with a separate payee. Rejected while
  /// direct operations are enforced.
  pub fn sell_to(
    &mut self,
    caller: &Pubkey,
    receiver: &Pubkey,
    deposit_amount: u128,
    min_amount_out: u128,
  ) -> Result<QueuedSale> {
    if self.state.direct_operations_only {
      return Err(DirectOperationsOnly.into());
    }
    self.transact("sell_to", |engine| {
      engine.execute_sell(caller, receiver, deposit_amount, min_amount_out)
    })
  }

  /// Previews a sell at the current rate and fee.
  pub fn calculate_sale_return(&self, deposit_amount: u128) -> Result<SaleReturn> {
    if deposit_amount == 0 {
      return Err(InvalidDepositAmount.into());
    }
    self.price_sale(deposit_amount)
  }

  pub(crate) fn price_sale(&self, deposit_amount: u128) -> Result<SaleReturn> {
    sale_return(
      deposit_amount,
      self.fee_config(FeeDirection::Sell),
      self.prices.redemption_rate()?,
      self.state.decimals,
    )
  }

  fn execute_sell(
    &mut self,
    caller: &Pubkey,
    receiver: &Pubkey,
    deposit_amount: u128,
    min_amount_out: u128,
  ) -> Result<QueuedSale> {
    self.authorize(Capability::Whitelist, caller)?;
    if !self.state.sell_is_open {
      return Err(SellingClosed.into());
    }
    validate_trade(receiver, deposit_amount, min_amount_out)?;
    let balance = self.issuance.balance_of(caller)?;
    if balance < deposit_amount {
      return Err(
        Error::from(InsufficientTokenBalance)
          .with_values((balance, deposit_amount)),
      );
    }
    let sale = self.price_sale(deposit_amount)?;
    validate_amount_out(sale.net_collateral, min_amount_out)?;

    let order_id = self.state.queue.enqueue(OrderDraft {
      seller: *caller,
      receiver: *receiver,
      deposit_amount,
      exchange_rate: sale.exchange_rate,
      fee_bps: sale.fee_bps,
      fee_amount: sale.fee_amount,
      final_redemption_amount: sale.net_collateral,
      collateral_token: self.state.collateral_token,
    })?;
    self.state.retained_sell_fees = self
      .state
      .retained_sell_fees
      .checked_add(sale.fee_amount)
      .ok_or(FeeTotalOverflow)?;

    self.settle_ledger(&[(
      TokenSide::Issuance,
      LedgerOp::Burn {
        from: *caller,
        amount: deposit_amount,
      },
    )])?;

    self.emit(RedemptionQueued {
      order_id,
      seller: *caller,
      receiver: *receiver,
      deposit_amount,
      exchange_rate: sale.exchange_rate,
      fee_bps: sale.fee_bps,
      fee_amount: sale.fee_amount,
      final_redemption_amount: sale.net_collateral,
      collateral_token: self.state.collateral_token,
    });
    info!(
      %caller,
      %receiver,
      order_id,
      deposit_amount,
      fee_amount = sale.fee_amount,
      final_redemption_amount = sale.net_collateral,
      open_redemption_amount = self.state.queue.open_redemption_amount(),
      "redemption queued"
    );
    Ok(QueuedSale { order_id, sale })
  }

  /// Marks every pending order `Processing`, then hands the batch to
  /// settlement in id order. Returns the number of orders dispatched.
  pub fn execute_redemption_queue(&mut self, caller: &Pubkey) -> Result<usize> {
    self.transact("execute_redemption_queue", |engine| {
      engine.authorize(Capability::QueueExecutor, caller)?;
      if !engine.settlement.supports_interface(SETTLEMENT_INTERFACE) {
        warn!("settlement does not expose the settlement interface");
        return Err(QueueExecutionFailed.into());
      }
      let order_ids: Vec<u64> = engine
        .state
        .queue
        .pending_batch()
        .iter()
        .map(|order| order.order_id)
        .collect();
      if order_ids.is_empty() {
        info!("redemption queue empty, nothing dispatched");
        return Ok(0);
      }
      engine.state.queue.mark_processing(&order_ids)?;
      let batch: Vec<RedemptionOrder> = order_ids
        .iter()
        .filter_map(|order_id| engine.state.queue.get(*order_id).cloned())
        .collect();
      engine.settlement.submit_batch(&batch).map_err(|err| {
        warn!(error = %err, orders = batch.len(), "settlement rejected batch");
        QueueExecutionFailed
      })?;
      info!(
        orders = order_ids.len(),
        first = order_ids.first().copied(),
        last = order_ids.last().copied(),
        "redemption queue dispatched"
      );
      engine.emit(RedemptionQueueExecuted {
        order_ids: order_ids.clone(),
      });
      Ok(order_ids.len())
    })
  }

  /// Reduces the open redemption amount by collateral paid out.
  pub fn mark_settled(&mut self, caller: &Pubkey, amount: u128) -> Result<()> {
    self.transact("mark_settled", |engine| {
      engine.authorize(Capability::Settlement, caller)?;
      engine.state.queue.mark_settled(amount)?;
      let open_redemption_amount = engine.state.queue.open_redemption_amount();
      engine.emit(RedemptionSettled {
        amount,
        open_redemption_amount,
      });
      info!(amount, open_redemption_amount, "redemption settled");
      Ok(())
    })
  }

  /// Records whether a dispatched order was paid or abandoned.
  pub fn report_order_outcome(
    &mut self,
    caller: &Pubkey,
    order_id: u64,
    outcome: OrderState,
  ) -> Result<()> {
    self.transact("report_order_outcome", |engine| {
      engine.authorize(Capability::Settlement, caller)?;
      engine.state.queue.finalize(order_id, outcome)?;
      engine.emit(RedemptionOrderUpdated {
        order_id,
        state: outcome,
      });
      info!(order_id, %outcome, "redemption order updated");
      Ok(())
    })
  }
}
