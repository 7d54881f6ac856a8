//! Common imports for issuance-engine.

pub use crate::authority::{Authority, Capability};
pub use crate::config::EngineConfig;
pub use crate::engine::{Collaborators, IssuanceEngine, QueuedSale};
pub use crate::error::EngineError;
pub use crate::events::EngineEvent;
pub use crate::ledger::TokenLedger;
pub use crate::memory::{CollectingSettlement, InMemoryLedger, RoleRegistry};
pub use crate::quote::EngineQuote;
pub use crate::settlement::{Settlement, SETTLEMENT_INTERFACE};
pub use crate::shared::SharedEngine;
pub use crate::state::EngineState;
