//! Token ledger seam and the journal used to undo ledger mutations.
//!
//! The engine issues ledger mutations only after its own state is updated.
//! Each applied mutation is recorded; if a later mutation in the same
//! operation fails, the recorded ones are compensated newest first.

use anchor_lang::prelude::*;

/// External fungible token ledger.
pub trait TokenLedger: Send {
  /// Identity of the token this ledger tracks.
  fn token(&self) -> Pubkey;

  fn decimals(&self) -> u8;

  fn balance_of(&self, account: &Pubkey) -> Result<u128>;

  fn mint(&mut self, to: &Pubkey, amount: u128) -> Result<()>;

  fn burn(&mut self, from: &Pubkey, amount: u128) -> Result<()>;

  fn transfer_from(
    &mut self,
    from: &Pubkey,
    to: &Pubkey,
    amount: u128,
  ) -> Result<()>;
}

/// Which of the engine's two ledgers a mutation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSide {
  Collateral,
  Issuance,
}

impl std::fmt::Display for TokenSide {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      TokenSide::Collateral => f.write_str("collateral"),
      TokenSide::Issuance => f.write_str("issuance"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOp {
  Mint {
    to: Pubkey,
    amount: u128,
  },
  Burn {
    from: Pubkey,
    amount: u128,
  },
  Transfer {
    from: Pubkey,
    to: Pubkey,
    amount: u128,
  },
}

impl LedgerOp {
  /// Mutation that cancels this one.
  #[must_use]
  pub fn inverse(&self) -> LedgerOp {
    match *self {
      LedgerOp::Mint { to, amount } => LedgerOp::Burn { from: to, amount },
      LedgerOp::Burn { from, amount } => LedgerOp::Mint { to: from, amount },
      LedgerOp::Transfer { from, to, amount } => LedgerOp::Transfer {
        from: to,
        to: from,
        amount,
      },
    }
  }

  pub fn apply(&self, ledger: &mut dyn TokenLedger) -> Result<()> {
    match self {
      LedgerOp::Mint { to, amount } => ledger.mint(to, *amount),
      LedgerOp::Burn { from, amount } => ledger.burn(from, *amount),
      LedgerOp::Transfer { from, to, amount } => {
        ledger.transfer_from(from, to, *amount)
      }
    }
  }
}

/// Mutations applied so far within one engine operation.
#[derive(Debug, Default)]
pub struct LedgerJournal {
  applied: Vec<(TokenSide, LedgerOp)>,
}

impl LedgerJournal {
  #[must_use]
  pub fn new() -> LedgerJournal {
    LedgerJournal::default()
  }

  pub fn record(&mut self, side: TokenSide, op: LedgerOp) {
    self.applied.push((side, op));
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.applied.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.applied.is_empty()
  }

  /// Inverse mutations, newest first.
  #[must_use]
  pub fn compensations(&self) -> Vec<(TokenSide, LedgerOp)> {
    self
      .applied
      .iter()
      .rev()
      .map(|(side, op)| (*side, op.inverse()))
      .collect()
  }
}
