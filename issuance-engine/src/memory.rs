//! In-process collaborators for hosts without external ledgers and for tests.
//!
//! Every type here is a cheap handle: clones share the same underlying data,
//! so a host can keep one handle while the engine owns another.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, RwLock};

use anchor_lang::error::Error;
use anchor_lang::prelude::*;
use issuance_core::oracle::InterfaceId;
use issuance_core::redemption_queue::RedemptionOrder;

use crate::authority::{Authority, Capability};
use crate::error::EngineError::{
  EngineUnavailable, LedgerInsufficientBalance, LedgerOverflow,
};
use crate::ledger::TokenLedger;
use crate::settlement::{Settlement, SETTLEMENT_INTERFACE};

#[derive(Debug, Default)]
struct Balances {
  accounts: HashMap<Pubkey, u128>,
  supply: u128,
}

impl Balances {
  fn balance(&self, account: &Pubkey) -> u128 {
    self.accounts.get(account).copied().unwrap_or_default()
  }

  fn credit(&mut self, account: &Pubkey, amount: u128) -> Result<()> {
    let balance = self
      .balance(account)
      .checked_add(amount)
      .ok_or(LedgerOverflow)?;
    self.accounts.insert(*account, balance);
    Ok(())
  }

  fn debit(&mut self, account: &Pubkey, amount: u128) -> Result<()> {
    let balance = self.balance(account);
    let remaining = balance.checked_sub(amount).ok_or_else(|| {
      Error::from(LedgerInsufficientBalance).with_values((balance, amount))
    })?;
    self.accounts.insert(*account, remaining);
    Ok(())
  }
}

/// Fungible token ledger held in memory.
#[derive(Debug, Clone)]
pub struct InMemoryLedger {
  token: Pubkey,
  decimals: u8,
  balances: Arc<Mutex<Balances>>,
}

impl InMemoryLedger {
  #[must_use]
  pub fn new(token: Pubkey, decimals: u8) -> InMemoryLedger {
    InMemoryLedger {
      token,
      decimals,
      balances: Arc::default(),
    }
  }

  fn with_balances<T>(
    &self,
    op: impl FnOnce(&mut Balances) -> Result<T>,
  ) -> Result<T> {
    let mut balances = self.balances.lock().map_err(|_| EngineUnavailable)?;
    op(&mut balances)
  }

  #[must_use]
  pub fn balance(&self, account: &Pubkey) -> u128 {
    self
      .with_balances(|balances| Ok(balances.balance(account)))
      .unwrap_or_default()
  }

  #[must_use]
  pub fn total_supply(&self) -> u128 {
    self
      .with_balances(|balances| Ok(balances.supply))
      .unwrap_or_default()
  }
}

impl TokenLedger for InMemoryLedger {
  fn token(&self) -> Pubkey {
    self.token
  }

  fn decimals(&self) -> u8 {
    self.decimals
  }

  fn balance_of(&self, account: &Pubkey) -> Result<u128> {
    self.with_balances(|balances| Ok(balances.balance(account)))
  }

  fn mint(&mut self, to: &Pubkey, amount: u128) -> Result<()> {
    self.with_balances(|balances| {
      let supply = balances.supply.checked_add(amount).ok_or(LedgerOverflow)?;
      balances.credit(to, amount)?;
      balances.supply = supply;
      Ok(())
    })
  }

  fn burn(&mut self, from: &Pubkey, amount: u128) -> Result<()> {
    self.with_balances(|balances| {
      let supply = balances.supply.checked_sub(amount).ok_or_else(|| {
        Error::from(LedgerInsufficientBalance)
          .with_values((balances.supply, amount))
      })?;
      balances.debit(from, amount)?;
      balances.supply = supply;
      Ok(())
    })
  }

  fn transfer_from(
    &mut self,
    from: &Pubkey,
    to: &Pubkey,
    amount: u128,
  ) -> Result<()> {
    self.with_balances(|balances| {
      balances.debit(from, amount)?;
      if let Err(err) = balances.credit(to, amount) {
        balances.credit(from, amount)?;
        return Err(err);
      }
      Ok(())
    })
  }
}

/// Capability grants held in memory.
#[derive(Debug, Clone, Default)]
pub struct RoleRegistry {
  grants: Arc<RwLock<BTreeSet<(Capability, Pubkey)>>>,
}

impl RoleRegistry {
  #[must_use]
  pub fn new() -> RoleRegistry {
    RoleRegistry::default()
  }

  pub fn grant(&self, capability: Capability, account: Pubkey) {
    if let Ok(mut grants) = self.grants.write() {
      grants.insert((capability, account));
    }
  }

  pub fn revoke(&self, capability: Capability, account: &Pubkey) {
    if let Ok(mut grants) = self.grants.write() {
      grants.remove(&(capability, *account));
    }
  }
}

impl Authority for RoleRegistry {
  fn has_capability(&self, capability: Capability, caller: &Pubkey) -> bool {
    self
      .grants
      .read()
      .is_ok_and(|grants| grants.contains(&(capability, *caller)))
  }
}

/// Settlement that accepts every batch and keeps it for inspection.
#[derive(Debug, Clone, Default)]
pub struct CollectingSettlement {
  batches: Arc<Mutex<Vec<Vec<RedemptionOrder>>>>,
}

impl CollectingSettlement {
  #[must_use]
  pub fn new() -> CollectingSettlement {
    CollectingSettlement::default()
  }

  /// Batches received so far, oldest first.
  #[must_use]
  pub fn batches(&self) -> Vec<Vec<RedemptionOrder>> {
    self
      .batches
      .lock()
      .map(|batches| batches.clone())
      .unwrap_or_default()
  }
}

impl Settlement for CollectingSettlement {
  fn supports_interface(&self, interface: InterfaceId) -> bool {
    interface == SETTLEMENT_INTERFACE
  }

  fn submit_batch(&mut self, orders: &[RedemptionOrder]) -> Result<()> {
    let mut batches = self.batches.lock().map_err(|_| EngineUnavailable)?;
    batches.push(orders.to_vec());
    Ok(())
  }
}
