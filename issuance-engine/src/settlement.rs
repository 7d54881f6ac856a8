use anchor_lang::prelude::*;
use issuance_core::oracle::InterfaceId;
use issuance_core::redemption_queue::RedemptionOrder;

/// Interface tag a settlement collaborator must report.
pub const SETTLEMENT_INTERFACE: InterfaceId = InterfaceId(*b"stl1");

/// Receives batches of pending redemption orders and pays them out later.
/// Payment progress comes back through the engine's settlement operations.
pub trait Settlement: Send {
  fn supports_interface(&self, interface: InterfaceId) -> bool;

  /// Accepts the whole batch or rejects it.
  fn submit_batch(&mut self, orders: &[RedemptionOrder]) -> Result<()>;
}
