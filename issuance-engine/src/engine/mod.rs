//! Stateful issuance and redemption engine.
//!
//! Every mutating operation runs through [`IssuanceEngine::transact`]: the
//! engine state and event buffer are snapshotted on entry and restored if the
//! operation fails at any point. Ledger mutations are issued last, through
//! [`IssuanceEngine::settle_ledger`], which compensates the mutations it
//! already applied before surfacing a failure.

mod admin;
mod issuance;
mod redemption;

pub use redemption::QueuedSale;

use anchor_lang::error::Error;
use anchor_lang::prelude::*;
use issuance_core::conversion::TokenDecimalsPair;
use issuance_core::fee_controller::{FeeConfig, FeeDirection};
use issuance_core::oracle::{PriceSource, PriceSourceAdapter};
use issuance_core::redemption_queue::{RedemptionOrder, RedemptionQueue};
use tracing::{debug, error, warn};

use crate::authority::{require_capability, Authority, Capability};
use crate::config::EngineConfig;
use crate::error::EngineError::{
  CollaboratorMismatch, InvalidDepositAmount, InvalidMinAmountOut,
  InvalidReceiver,
};
use crate::events::EngineEvent;
use crate::ledger::{LedgerJournal, LedgerOp, TokenLedger, TokenSide};
use crate::settlement::Settlement;
use crate::state::EngineState;

/// External systems the engine calls out to.
pub struct Collaborators {
  pub collateral: Box<dyn TokenLedger>,
  pub issuance: Box<dyn TokenLedger>,
  pub price_source: Box<dyn PriceSource>,
  pub authority: Box<dyn Authority>,
  pub settlement: Box<dyn Settlement>,
}

pub struct IssuanceEngine {
  state: EngineState,
  collateral: Box<dyn TokenLedger>,
  issuance: Box<dyn TokenLedger>,
  prices: PriceSourceAdapter,
  authority: Box<dyn Authority>,
  settlement: Box<dyn Settlement>,
  events: Vec<EngineEvent>,
}

impl std::fmt::Debug for IssuanceEngine {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("IssuanceEngine")
      .field("state", &self.state)
      .field("prices", &self.prices)
      .field("pending_events", &self.events.len())
      .finish_non_exhaustive()
  }
}

impl IssuanceEngine {
  /// Builds a fresh engine. Decimals are captured from the ledgers and the
  /// price source must expose the price source interface.
  pub fn new(
    config: &EngineConfig,
    collaborators: Collaborators,
  ) -> Result<IssuanceEngine> {
    let Collaborators {
      collateral,
      issuance,
      price_source,
      authority,
      settlement,
    } = collaborators;
    let project_treasury = config.validated_treasury()?;
    let fees = config.fee_schedule()?;
    let decimals =
      TokenDecimalsPair::new(collateral.decimals(), issuance.decimals())?;
    let prices = PriceSourceAdapter::attach(price_source)?;
    let state = EngineState {
      fees,
      decimals,
      project_treasury,
      price_source: prices.source_id(),
      collateral_token: collateral.token(),
      issuance_token: issuance.token(),
      buy_is_open: config.buy_is_open,
      sell_is_open: config.sell_is_open,
      direct_operations_only: config.direct_operations_only,
      queue: RedemptionQueue::new(),
      collected_buy_fees: 0,
      retained_sell_fees: 0,
    };
    debug!(
      collateral = %state.collateral_token,
      issuance = %state.issuance_token,
      collateral_decimals = decimals.collateral(),
      issuance_decimals = decimals.issuance(),
      "engine created"
    );
    Ok(IssuanceEngine {
      state,
      collateral,
      issuance,
      prices,
      authority,
      settlement,
      events: Vec::new(),
    })
  }

  /// Rebuilds an engine from [`IssuanceEngine::save_state`] output. The
  /// collaborators must be the ones the state was saved with.
  pub fn restore(
    state_bytes: &[u8],
    collaborators: Collaborators,
  ) -> Result<IssuanceEngine> {
    let state = EngineState::from_bytes(state_bytes)?;
    let Collaborators {
      collateral,
      issuance,
      price_source,
      authority,
      settlement,
    } = collaborators;
    check_identity("collateral", state.collateral_token, collateral.token())?;
    check_identity("issuance", state.issuance_token, issuance.token())?;
    let decimals =
      TokenDecimalsPair::new(collateral.decimals(), issuance.decimals())?;
    if decimals != state.decimals {
      return Err(Error::from(CollaboratorMismatch).with_values((
        format!("{:?}", state.decimals),
        format!("{decimals:?}"),
      )));
    }
    let prices = PriceSourceAdapter::attach(price_source)?;
    check_identity("price source", state.price_source, prices.source_id())?;
    debug!(
      order_id = state.queue.order_id(),
      open_redemption_amount = state.queue.open_redemption_amount(),
      "engine restored"
    );
    Ok(IssuanceEngine {
      state,
      collateral,
      issuance,
      prices,
      authority,
      settlement,
      events: Vec::new(),
    })
  }

  #[must_use]
  pub fn state(&self) -> &EngineState {
    &self.state
  }

  pub fn save_state(&self) -> Result<Vec<u8>> {
    self.state.to_bytes()
  }

  /// Takes all buffered events, oldest first.
  pub fn drain_events(&mut self) -> Vec<EngineEvent> {
    std::mem::take(&mut self.events)
  }

  #[must_use]
  pub fn buy_fee(&self) -> u16 {
    self.fee_config(FeeDirection::Buy).current_bps()
  }

  #[must_use]
  pub fn sell_fee(&self) -> u16 {
    self.fee_config(FeeDirection::Sell).current_bps()
  }

  #[must_use]
  pub fn fee_config(&self, direction: FeeDirection) -> &FeeConfig {
    self.state.fees.get(direction)
  }

  #[must_use]
  pub fn open_redemption_amount(&self) -> u128 {
    self.state.queue.open_redemption_amount()
  }

  /// Last assigned redemption order id, zero before the first sale.
  #[must_use]
  pub fn order_id(&self) -> u64 {
    self.state.queue.order_id()
  }

  #[must_use]
  pub fn next_order_id(&self) -> u64 {
    self.state.queue.next_order_id()
  }

  #[must_use]
  pub fn redemption_order(&self, order_id: u64) -> Option<&RedemptionOrder> {
    self.state.queue.get(order_id)
  }

  /// Current issuance rate, issuance tokens per collateral unit.
  pub fn static_price_for_buying(&self) -> Result<u128> {
    Ok(self.prices.issuance_rate()?.get())
  }

  /// Current redemption rate, collateral per issuance token.
  pub fn static_price_for_selling(&self) -> Result<u128> {
    Ok(self.prices.redemption_rate()?.get())
  }

  fn authorize(&self, capability: Capability, caller: &Pubkey) -> Result<()> {
    require_capability(self.authority.as_ref(), capability, caller)
  }

  fn emit(&mut self, event: impl Into<EngineEvent>) {
    self.events.push(event.into());
  }

  /// Runs `op` as one unit of work. On failure the state and event buffer
  /// are restored to their values at entry.
  fn transact<T>(
    &mut self,
    name: &'static str,
    op: impl FnOnce(&mut IssuanceEngine) -> Result<T>,
  ) -> Result<T> {
    let snapshot = self.state.clone();
    let emitted = self.events.len();
    op(self).inspect_err(|err| {
      warn!(op = name, error = %err, "operation rolled back");
      self.state = snapshot;
      self.events.truncate(emitted);
    })
  }

  fn ledger_mut(&mut self, side: TokenSide) -> &mut dyn TokenLedger {
    match side {
      TokenSide::Collateral => self.collateral.as_mut(),
      TokenSide::Issuance => self.issuance.as_mut(),
    }
  }

  /// Applies ledger mutations in order. If one fails, the ones already
  /// applied are compensated newest first and the failure is returned.
  /// A failed compensation replaces the failure's values with the
  /// compensation that did not apply and the reason it failed.
  fn settle_ledger(&mut self, ops: &[(TokenSide, LedgerOp)]) -> Result<()> {
    let mut journal = LedgerJournal::new();
    for (side, op) in ops {
      if let Err(err) = op.apply(self.ledger_mut(*side)) {
        return Err(match self.compensate(&journal) {
          Some((failed, reason)) => err.with_values((failed, reason)),
          None => err,
        });
      }
      journal.record(*side, *op);
    }
    Ok(())
  }

  /// Undoes journaled mutations. Returns the first compensation that failed,
  /// after attempting all of them.
  fn compensate(&mut self, journal: &LedgerJournal) -> Option<(String, String)> {
    let mut first_failure = None;
    for (side, op) in journal.compensations() {
      if let Err(err) = op.apply(self.ledger_mut(side)) {
        error!(%side, ?op, error = %err, "ledger compensation failed");
        if first_failure.is_none() {
          first_failure = Some((format!("{side} {op:?}"), err.to_string()));
        }
      }
    }
    first_failure
  }
}

fn check_identity(
  collaborator: &'static str,
  persisted: Pubkey,
  provided: Pubkey,
) -> Result<()> {
  if persisted == provided {
    Ok(())
  } else {
    warn!(collaborator, %persisted, %provided, "collaborator mismatch");
    Err(Error::from(CollaboratorMismatch).with_values((persisted, provided)))
  }
}

/// Receiver, amount and minimum output checks shared by buy and sell.
fn validate_trade(
  receiver: &Pubkey,
  deposit_amount: u128,
  min_amount_out: u128,
) -> Result<()> {
  if *receiver == Pubkey::default() {
    Err(InvalidReceiver.into())
  } else if deposit_amount == 0 {
    Err(InvalidDepositAmount.into())
  } else if min_amount_out == 0 {
    Err(InvalidMinAmountOut.into())
  } else {
    Ok(())
  }
}
