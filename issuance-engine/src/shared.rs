use std::sync::{Arc, Mutex};

use anchor_lang::prelude::*;
use issuance_core::exchange_math::PurchaseReturn;

use crate::engine::{IssuanceEngine, QueuedSale};
use crate::error::EngineError::EngineUnavailable;

/// Thread-safe handle that serializes every engine operation.
#[derive(Debug, Clone)]
pub struct SharedEngine {
  inner: Arc<Mutex<IssuanceEngine>>,
}

impl SharedEngine {
  #[must_use]
  pub fn new(engine: IssuanceEngine) -> SharedEngine {
    SharedEngine {
      inner: Arc::new(Mutex::new(engine)),
    }
  }

  /// Runs `op` with exclusive access to the engine.
  pub fn with<T>(
    &self,
    op: impl FnOnce(&mut IssuanceEngine) -> Result<T>,
  ) -> Result<T> {
    let mut engine = self.inner.lock().map_err(|_| EngineUnavailable)?;
    op(&mut engine)
  }

  pub fn buy(
    &self,
    caller: &Pubkey,
    deposit_amount: u128,
    min_amount_out: u128,
  ) -> Result<PurchaseReturn> {
    self.with(|engine| engine.buy(caller, deposit_amount, min_amount_out))
  }

  pub fn sell(
    &self,
    caller: &Pubkey,
    deposit_amount: u128,
    min_amount_out: u128,
  ) -> Result<QueuedSale> {
    self.with(|engine| engine.sell(caller, deposit_amount, min_amount_out))
  }

  pub fn execute_redemption_queue(&self, caller: &Pubkey) -> Result<usize> {
    self.with(|engine| engine.execute_redemption_queue(caller))
  }

  pub fn mark_settled(&self, caller: &Pubkey, amount: u128) -> Result<()> {
    self.with(|engine| engine.mark_settled(caller, amount))
  }

  pub fn open_redemption_amount(&self) -> Result<u128> {
    self.with(|engine| Ok(engine.open_redemption_amount()))
  }

  pub fn order_id(&self) -> Result<u64> {
    self.with(|engine| Ok(engine.order_id()))
  }
}
