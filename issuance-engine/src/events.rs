//! Change notifications. The engine buffers them in emission order until the
//! host drains them with `IssuanceEngine::drain_events`; an operation that
//! fails leaves no events behind.

use anchor_lang::prelude::*;
use issuance_core::fee_controller::FeeDirection;
use issuance_core::redemption_queue::OrderState;

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchased {
  pub buyer: Pubkey,
  pub receiver: Pubkey,
  pub deposit_amount: u128,
  pub fee_amount: u128,
  pub issuance_out: u128,
  pub exchange_rate: u128,
}

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionQueued {
  pub order_id: u64,
  pub seller: Pubkey,
  pub receiver: Pubkey,
  pub deposit_amount: u128,
  pub exchange_rate: u128,
  pub fee_bps: u16,
  pub fee_amount: u128,
  pub final_redemption_amount: u128,
  pub collateral_token: Pubkey,
}

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionQueueExecuted {
  pub order_ids: Vec<u64>,
}

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionSettled {
  pub amount: u128,
  pub open_redemption_amount: u128,
}

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionOrderUpdated {
  pub order_id: u64,
  pub state: OrderState,
}

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectTreasuryUpdated {
  pub old: Pubkey,
  pub new: Pubkey,
}

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceSourceUpdated {
  pub old: Pubkey,
  pub new: Pubkey,
}

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuanceTokenUpdated {
  pub old: Pubkey,
  pub new: Pubkey,
  pub decimals: u8,
}

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeUpdated {
  pub direction: FeeDirection,
  pub old_bps: u16,
  pub new_bps: u16,
}

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaxFeeUpdated {
  pub direction: FeeDirection,
  pub old_bps: u16,
  pub new_bps: u16,
}

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradingGateUpdated {
  pub direction: FeeDirection,
  pub is_open: bool,
}

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectOperationsOnlyUpdated {
  pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
  Purchased(Purchased),
  RedemptionQueued(RedemptionQueued),
  RedemptionQueueExecuted(RedemptionQueueExecuted),
  RedemptionSettled(RedemptionSettled),
  RedemptionOrderUpdated(RedemptionOrderUpdated),
  ProjectTreasuryUpdated(ProjectTreasuryUpdated),
  PriceSourceUpdated(PriceSourceUpdated),
  IssuanceTokenUpdated(IssuanceTokenUpdated),
  FeeUpdated(FeeUpdated),
  MaxFeeUpdated(MaxFeeUpdated),
  TradingGateUpdated(TradingGateUpdated),
  DirectOperationsOnlyUpdated(DirectOperationsOnlyUpdated),
}

macro_rules! impl_from_event {
  ($($name:ident),* $(,)?) => {
    $(
      impl From<$name> for EngineEvent {
        fn from(event: $name) -> EngineEvent {
          EngineEvent::$name(event)
        }
      }
    )*
  };
}

impl_from_event!(
  Purchased,
  RedemptionQueued,
  RedemptionQueueExecuted,
  RedemptionSettled,
  RedemptionOrderUpdated,
  ProjectTreasuryUpdated,
  PriceSourceUpdated,
  IssuanceTokenUpdated,
  FeeUpdated,
  MaxFeeUpdated,
  TradingGateUpdated,
  DirectOperationsOnlyUpdated,
);
