//! Price-driven issuance and redemption engine.
//!
//! Buyers deposit collateral and receive issuance tokens at the rate of an
//! external price source. Sellers burn issuance tokens and are owed
//! collateral through an ordered redemption queue that a settlement
//! collaborator drains.
//!
//! ```rust,no_run
//! use anchor_lang::prelude::Pubkey;
//! use issuance_core::oracle::{ManualPriceSource, RATE_ONE};
//! use issuance_engine::prelude::*;
//!
//! # fn example() -> anchor_lang::Result<()> {
//! let buyer = Pubkey::new_unique();
//! let roles = RoleRegistry::new();
//! roles.grant(Capability::Whitelist, buyer);
//! let prices = ManualPriceSource::new(Pubkey::new_unique());
//! prices.publish_issuance_price(2 * RATE_ONE);
//! let collateral = InMemoryLedger::new(Pubkey::new_unique(), 6);
//! let config = EngineConfig::new(Pubkey::new_unique(), 100, 100);
//! let mut engine = IssuanceEngine::new(
//!   &config,
//!   Collaborators {
//!     collateral: Box::new(collateral),
//!     issuance: Box::new(InMemoryLedger::new(Pubkey::new_unique(), 18)),
//!     price_source: Box::new(prices),
//!     authority: Box::new(roles),
//!     settlement: Box::new(CollectingSettlement::new()),
//!   },
//! )?;
//! let purchase = engine.buy(&buyer, 1_000_000, 1)?;
//! # Ok(())
//! # }
//! ```

#![allow(clippy::missing_errors_doc)]

pub mod authority;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod ledger;
pub mod memory;
pub mod prelude;
pub mod quote;
pub mod settlement;
pub mod shared;
pub mod state;
