//! Ordered ledger of collateral owed to sellers.
//!
//! Orders are created `Pending` in the same unit of work that burns the
//! seller's issuance tokens. A dispatch to settlement moves a batch to
//! `Processing`, after which the settlement side reports `Completed` or
//! `Cancelled`. The open redemption amount is tracked separately from order
//! states and only shrinks through [`RedemptionQueue::mark_settled`].

use std::collections::BTreeMap;

use anchor_lang::error::Error;
use anchor_lang::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::CoreError::{
  InvalidOrderTransition, OpenRedemptionOverflow, OpenRedemptionUnderflow,
  OrderIdOverflow, UnknownRedemptionOrder,
};

/// First id handed out by a fresh queue.
pub const FIRST_ORDER_ID: u64 = 1;

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
pub enum OrderState {
  Pending,
  Processing,
  Completed,
  Cancelled,
}

impl std::fmt::Display for OrderState {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let name = match self {
      OrderState::Pending => "pending",
      OrderState::Processing => "processing",
      OrderState::Completed => "completed",
      OrderState::Cancelled => "cancelled",
    };
    f.write_str(name)
  }
}

/// Obligation to pay `final_redemption_amount` of collateral to `receiver`.
#[derive(Debug, Clone, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct RedemptionOrder {
  pub order_id: u64,
  pub seller: Pubkey,
  pub receiver: Pubkey,
  pub deposit_amount: u128,
  pub exchange_rate: u128,
  pub fee_bps: u16,
  pub fee_amount: u128,
  pub final_redemption_amount: u128,
  pub collateral_token: Pubkey,
  pub state: OrderState,
}

/// Order contents known before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
  pub seller: Pubkey,
  pub receiver: Pubkey,
  pub deposit_amount: u128,
  pub exchange_rate: u128,
  pub fee_bps: u16,
  pub fee_amount: u128,
  pub final_redemption_amount: u128,
  pub collateral_token: Pubkey,
}

impl OrderDraft {
  fn into_order(self, order_id: u64) -> RedemptionOrder {
    RedemptionOrder {
      order_id,
      seller: self.seller,
      receiver: self.receiver,
      deposit_amount: self.deposit_amount,
      exchange_rate: self.exchange_rate,
      fee_bps: self.fee_bps,
      fee_amount: self.fee_amount,
      final_redemption_amount: self.final_redemption_amount,
      collateral_token: self.collateral_token,
      state: OrderState::Pending,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct RedemptionQueue {
  next_order_id: u64,
  open_redemption_amount: u128,
  orders: BTreeMap<u64, RedemptionOrder>,
}

impl Default for RedemptionQueue {
  fn default() -> RedemptionQueue {
    RedemptionQueue::new()
  }
}

impl RedemptionQueue {
  #[must_use]
  pub fn new() -> RedemptionQueue {
    RedemptionQueue {
      next_order_id: FIRST_ORDER_ID,
      open_redemption_amount: 0,
      orders: BTreeMap::new(),
    }
  }

  /// Last assigned order id, zero before the first order.
  #[must_use]
  pub fn order_id(&self) -> u64 {
    self.next_order_id.saturating_sub(FIRST_ORDER_ID)
  }

  /// Whether the counter and the stored orders agree: the counter has not
  /// dropped below the first id, every order is filed under its own id and
  /// no order carries an id the counter has yet to hand out.
  #[must_use]
  pub fn is_consistent(&self) -> bool {
    self.next_order_id >= FIRST_ORDER_ID
      && self.orders.iter().all(|(order_id, order)| {
        *order_id == order.order_id
          && *order_id >= FIRST_ORDER_ID
          && *order_id < self.next_order_id
      })
  }

  #[must_use]
  pub fn next_order_id(&self) -> u64 {
    self.next_order_id
  }

  #[must_use]
  pub fn open_redemption_amount(&self) -> u128 {
    self.open_redemption_amount
  }

  #[must_use]
  pub fn get(&self, order_id: u64) -> Option<&RedemptionOrder> {
    self.orders.get(&order_id)
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.orders.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.orders.is_empty()
  }

  /// Assigns the next id and adds the owed amount to the open total.
  pub fn enqueue(&mut self, draft: OrderDraft) -> Result<u64> {
    let order_id = self.next_order_id;
    let next_order_id = order_id.checked_add(1).ok_or(OrderIdOverflow)?;
    let open_redemption_amount = self
      .open_redemption_amount
      .checked_add(draft.final_redemption_amount)
      .ok_or(OpenRedemptionOverflow)?;
    self.orders.insert(order_id, draft.into_order(order_id));
    self.next_order_id = next_order_id;
    self.open_redemption_amount = open_redemption_amount;
    Ok(order_id)
  }

  /// All `Pending` orders in id order.
  #[must_use]
  pub fn pending_batch(&self) -> Vec<RedemptionOrder> {
    self
      .orders
      .values()
      .filter(|order| order.state == OrderState::Pending)
      .cloned()
      .collect()
  }

  /// Moves every listed order from `Pending` to `Processing`, or none of them.
  pub fn mark_processing(&mut self, order_ids: &[u64]) -> Result<()> {
    for order_id in order_ids {
      let order = self.orders.get(order_id).ok_or(UnknownRedemptionOrder)?;
      if order.state != OrderState::Pending {
        return Err(
          Error::from(InvalidOrderTransition)
            .with_values((order.state, OrderState::Processing)),
        );
      }
    }
    for order_id in order_ids {
      if let Some(order) = self.orders.get_mut(order_id) {
        order.state = OrderState::Processing;
      }
    }
    Ok(())
  }

  /// Subtracts settled collateral from the open total. Never clamps.
  pub fn mark_settled(&mut self, amount: u128) -> Result<()> {
    let open = self.open_redemption_amount;
    self.open_redemption_amount = open.checked_sub(amount).ok_or_else(|| {
      Error::from(OpenRedemptionUnderflow).with_values((amount, open))
    })?;
    Ok(())
  }

  /// Records the settlement outcome of a `Processing` order.
  pub fn finalize(&mut self, order_id: u64, outcome: OrderState) -> Result<()> {
    let order = self
      .orders
      .get_mut(&order_id)
      .ok_or(UnknownRedemptionOrder)?;
    match (order.state, outcome) {
      (
        OrderState::Processing,
        OrderState::Completed | OrderState::Cancelled,
      ) => {
        order.state = outcome;
        Ok(())
      }
      (from, to) => {
        Err(Error::from(InvalidOrderTransition).with_values((from, to)))
      }
    }
  }
}
