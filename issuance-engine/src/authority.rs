use anchor_lang::error::Error;
use anchor_lang::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::EngineError::CallerNotAuthorized;

/// Rights an [`Authority`] can grant to a caller.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Capability {
  /// Buy and sell.
  Whitelist,
  /// Dispatch pending redemption orders to settlement.
  QueueExecutor,
  /// Fees, gates, treasury and collaborator re-pointing.
  Governance,
  /// Report settled amounts and order outcomes.
  Settlement,
}

impl Capability {
  #[must_use]
  pub const fn as_str(&self) -> &'static str {
    match self {
      Capability::Whitelist => "whitelist",
      Capability::QueueExecutor => "queue_executor",
      Capability::Governance => "governance",
      Capability::Settlement => "settlement",
    }
  }
}

impl std::fmt::Display for Capability {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Answers capability questions. Role membership is managed elsewhere.
pub trait Authority: Send {
  fn has_capability(&self, capability: Capability, caller: &Pubkey) -> bool;
}

/// Fails with the missing capability and caller attached.
pub fn require_capability(
  authority: &dyn Authority,
  capability: Capability,
  caller: &Pubkey,
) -> Result<()> {
  if authority.has_capability(capability, caller) {
    Ok(())
  } else {
    Err(Error::from(CallerNotAuthorized).with_values((capability, caller)))
  }
}
