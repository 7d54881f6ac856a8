//! Shared fixtures for engine scenario tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use anchor_lang::prelude::*;
use issuance_core::oracle::{InterfaceId, ManualPriceSource, RATE_ONE};
use issuance_core::redemption_queue::RedemptionOrder;
use issuance_engine::error::EngineError::LedgerInsufficientBalance;
use issuance_engine::prelude::*;

pub const E6: u128 = 1_000_000;
pub const E12: u128 = 1_000_000_000_000;
pub const E18: u128 = 1_000_000_000_000_000_000;

/// Switches that make a wrapped collaborator fail on demand.
#[derive(Debug, Clone, Default)]
pub struct FailSwitch {
  armed: Arc<AtomicBool>,
  passes: Arc<AtomicUsize>,
}

impl FailSwitch {
  pub fn arm(&self) {
    self.arm_after(0);
  }

  /// Lets `passes` calls through before failing.
  pub fn arm_after(&self, passes: usize) {
    self.passes.store(passes, Ordering::SeqCst);
    self.armed.store(true, Ordering::SeqCst);
  }

  pub fn disarm(&self) {
    self.armed.store(false, Ordering::SeqCst);
  }

  pub fn is_armed(&self) -> bool {
    if !self.armed.load(Ordering::SeqCst) {
      return false;
    }
    let passed = self
      .passes
      .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    passed.is_err()
  }
}

/// Ledger that fails selected mutations while its switch is armed.
#[derive(Debug, Clone)]
pub struct FaultyLedger {
  pub inner: InMemoryLedger,
  pub fail_mint: FailSwitch,
  pub fail_burn: FailSwitch,
  pub fail_transfer: FailSwitch,
}

impl FaultyLedger {
  pub fn new(inner: InMemoryLedger) -> FaultyLedger {
    FaultyLedger {
      inner,
      fail_mint: FailSwitch::default(),
      fail_burn: FailSwitch::default(),
      fail_transfer: FailSwitch::default(),
    }
  }

  fn check(switch: &FailSwitch) -> Result<()> {
    if switch.is_armed() {
      Err(LedgerInsufficientBalance.into())
    } else {
      Ok(())
    }
  }
}

impl TokenLedger for FaultyLedger {
  fn token(&self) -> Pubkey {
    self.inner.token()
  }

  fn decimals(&self) -> u8 {
    self.inner.decimals()
  }

  fn balance_of(&self, account: &Pubkey) -> Result<u128> {
    self.inner.balance_of(account)
  }

  fn mint(&mut self, to: &Pubkey, amount: u128) -> Result<()> {
    FaultyLedger::check(&self.fail_mint)?;
    self.inner.mint(to, amount)
  }

  fn burn(&mut self, from: &Pubkey, amount: u128) -> Result<()> {
    FaultyLedger::check(&self.fail_burn)?;
    self.inner.burn(from, amount)
  }

  fn transfer_from(
    &mut self,
    from: &Pubkey,
    to: &Pubkey,
    amount: u128,
  ) -> Result<()> {
    FaultyLedger::check(&self.fail_transfer)?;
    self.inner.transfer_from(from, to, amount)
  }
}

/// Settlement that can reject batches or hide its interface.
#[derive(Debug, Clone, Default)]
pub struct FaultySettlement {
  pub inner: CollectingSettlement,
  pub reject: FailSwitch,
  pub hide_interface: FailSwitch,
}

impl Settlement for FaultySettlement {
  fn supports_interface(&self, interface: InterfaceId) -> bool {
    !self.hide_interface.is_armed() && self.inner.supports_interface(interface)
  }

  fn submit_batch(&mut self, orders: &[RedemptionOrder]) -> Result<()> {
    if self.reject.is_armed() {
      return Err(ProgramError::Custom(1).into());
    }
    self.inner.submit_batch(orders)
  }
}

/// Engine over 6 decimal collateral and 18 decimal issuance, with one
/// account per capability and handles on every collaborator.
pub struct Harness {
  pub engine: IssuanceEngine,
  pub collateral: FaultyLedger,
  pub issuance: FaultyLedger,
  pub prices: ManualPriceSource,
  pub roles: RoleRegistry,
  pub settlement: FaultySettlement,
  pub treasury: Pubkey,
  pub governance: Pubkey,
  pub trader: Pubkey,
  pub executor: Pubkey,
  pub settler: Pubkey,
}

impl Harness {
  /// 1% fees both ways, issuance rate 2.0, redemption rate 1.0.
  pub fn new() -> Result<Harness> {
    Harness::with_config(|_| {})
  }

  pub fn with_config(edit: impl FnOnce(&mut EngineConfig)) -> Result<Harness> {
    let treasury = Pubkey::new_unique();
    let mut config = EngineConfig::new(treasury, 100, 100);
    edit(&mut config);
    let collateral =
      FaultyLedger::new(InMemoryLedger::new(Pubkey::new_unique(), 6));
    let issuance =
      FaultyLedger::new(InMemoryLedger::new(Pubkey::new_unique(), 18));
    let prices = ManualPriceSource::new(Pubkey::new_unique());
    prices.publish_issuance_price(2 * RATE_ONE);
    prices.publish_redemption_price(RATE_ONE);
    let roles = RoleRegistry::new();
    let governance = Pubkey::new_unique();
    let trader = Pubkey::new_unique();
    let executor = Pubkey::new_unique();
    let settler = Pubkey::new_unique();
    roles.grant(Capability::Governance, governance);
    roles.grant(Capability::Whitelist, trader);
    roles.grant(Capability::QueueExecutor, executor);
    roles.grant(Capability::Settlement, settler);
    let settlement = FaultySettlement::default();
    let collaborators = Harness::collaborators_of(
      &collateral,
      &issuance,
      &prices,
      &roles,
      &settlement,
    );
    let engine = IssuanceEngine::new(&config, collaborators)?;
    Ok(Harness {
      engine,
      collateral,
      issuance,
      prices,
      roles,
      settlement,
      treasury,
      governance,
      trader,
      executor,
      settler,
    })
  }

  fn collaborators_of(
    collateral: &FaultyLedger,
    issuance: &FaultyLedger,
    prices: &ManualPriceSource,
    roles: &RoleRegistry,
    settlement: &FaultySettlement,
  ) -> Collaborators {
    Collaborators {
      collateral: Box::new(collateral.clone()),
      issuance: Box::new(issuance.clone()),
      price_source: Box::new(prices.clone()),
      authority: Box::new(roles.clone()),
      settlement: Box::new(settlement.clone()),
    }
  }

  /// Fresh handles onto the same collaborators, for `IssuanceEngine::restore`.
  pub fn collaborators(&self) -> Collaborators {
    Harness::collaborators_of(
      &self.collateral,
      &self.issuance,
      &self.prices,
      &self.roles,
      &self.settlement,
    )
  }

  pub fn fund_collateral(&mut self, account: &Pubkey, amount: u128) -> Result<()> {
    self.collateral.inner.mint(account, amount)
  }

  pub fn fund_issuance(&mut self, account: &Pubkey, amount: u128) -> Result<()> {
    self.issuance.inner.mint(account, amount)
  }

  pub fn collateral_balance(&self, account: &Pubkey) -> u128 {
    self.collateral.inner.balance(account)
  }

  pub fn issuance_balance(&self, account: &Pubkey) -> u128 {
    self.issuance.inner.balance(account)
  }
}
