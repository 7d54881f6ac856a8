//! Price source interface and the adapter that guards it.
//!
//! A [`PriceSource`] publishes two 18 decimal rates: issuance tokens per unit
//! of collateral for buying, and collateral per issuance token for selling.
//! A rate of zero means nothing was published and is never handed to pricing.
//!
//! ```ignore
//! let source = ManualPriceSource::new(Pubkey::new_unique());
//! source.publish_issuance_price(2 * RATE_ONE);
//! let adapter = PriceSourceAdapter::attach(Box::new(source.clone()))?;
//! let quote = adapter.issuance_rate()?;
//! ```

use std::sync::{Arc, RwLock};

use anchor_lang::prelude::*;

use crate::error::CoreError::{InvalidPrice, InvalidPriceSourceInterface};

/// Decimals of every oracle rate.
pub const RATE_DECIMALS: u8 = 18;

/// A rate of exactly one at [`RATE_DECIMALS`].
pub const RATE_ONE: u128 = 1_000_000_000_000_000_000;

/// Tag a collaborator reports to prove it implements an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterfaceId(pub [u8; 4]);

/// Interface tag for [`PriceSource`] implementations.
pub const PRICE_SOURCE_INTERFACE: InterfaceId = InterfaceId(*b"ipx1");

/// Validated positive fixed-point rate at 18 decimals.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  AnchorSerialize,
  AnchorDeserialize,
)]
pub struct PriceQuote(u128);

impl PriceQuote {
  pub fn new(rate: u128) -> Result<PriceQuote> {
    (rate > 0)
      .then_some(PriceQuote(rate))
      .ok_or(InvalidPrice.into())
  }

  #[must_use]
  pub fn get(&self) -> u128 {
    self.0
  }
}

/// External rate publisher.
pub trait PriceSource: Send {
  /// Identity of the source, reported in change notifications.
  fn source_id(&self) -> Pubkey;

  /// Whether the source implements the interface tagged by `interface`.
  fn supports_interface(&self, interface: InterfaceId) -> bool;

  /// Issuance tokens per collateral unit, 18 decimals. Zero if unpublished.
  fn price_for_issuance(&self) -> Result<u128>;

  /// Collateral per issuance token, 18 decimals. Zero if unpublished.
  fn price_for_redemption(&self) -> Result<u128>;
}

/// Holds the attached price source and turns its raw answers into quotes.
pub struct PriceSourceAdapter {
  source: Box<dyn PriceSource>,
}

impl std::fmt::Debug for PriceSourceAdapter {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("PriceSourceAdapter")
      .field("source", &self.source.source_id())
      .finish()
  }
}

fn check_interface(candidate: &dyn PriceSource) -> Result<()> {
  if candidate.supports_interface(PRICE_SOURCE_INTERFACE) {
    Ok(())
  } else {
    Err(InvalidPriceSourceInterface.into())
  }
}

impl PriceSourceAdapter {
  pub fn attach(candidate: Box<dyn PriceSource>) -> Result<PriceSourceAdapter> {
    check_interface(candidate.as_ref())?;
    Ok(PriceSourceAdapter { source: candidate })
  }

  /// Swaps in a new source and returns the previous identity.
  /// A rejected candidate leaves the current source attached.
  pub fn replace(&mut self, candidate: Box<dyn PriceSource>) -> Result<Pubkey> {
    check_interface(candidate.as_ref())?;
    let previous = std::mem::replace(&mut self.source, candidate);
    Ok(previous.source_id())
  }

  #[must_use]
  pub fn source_id(&self) -> Pubkey {
    self.source.source_id()
  }

  pub fn issuance_rate(&self) -> Result<PriceQuote> {
    let raw = self
      .source
      .price_for_issuance()
      .map_err(|_| InvalidPrice)?;
    PriceQuote::new(raw)
  }

  pub fn redemption_rate(&self) -> Result<PriceQuote> {
    let raw = self
      .source
      .price_for_redemption()
      .map_err(|_| InvalidPrice)?;
    PriceQuote::new(raw)
  }
}

#[derive(Debug, Default)]
struct PublishedPrices {
  issuance: u128,
  redemption: u128,
}

/// Price source fed by explicit publications. Clones share the same prices,
/// so a handle kept by the publisher keeps working after attachment.
#[derive(Debug, Clone)]
pub struct ManualPriceSource {
  id: Pubkey,
  prices: Arc<RwLock<PublishedPrices>>,
}

impl ManualPriceSource {
  #[must_use]
  pub fn new(id: Pubkey) -> ManualPriceSource {
    ManualPriceSource {
      id,
      prices: Arc::default(),
    }
  }

  pub fn publish_issuance_price(&self, rate: u128) {
    if let Ok(mut prices) = self.prices.write() {
      prices.issuance = rate;
    }
  }

  pub fn publish_redemption_price(&self, rate: u128) {
    if let Ok(mut prices) = self.prices.write() {
      prices.redemption = rate;
    }
  }

  fn read(&self, pick: fn(&PublishedPrices) -> u128) -> Result<u128> {
    let prices = self.prices.read().map_err(|_| InvalidPrice)?;
    PriceQuote::new(pick(&prices)).map(|quote| quote.get())
  }
}

impl PriceSource for ManualPriceSource {
  fn source_id(&self) -> Pubkey {
    self.id
  }

  fn supports_interface(&self, interface: InterfaceId) -> bool {
    interface == PRICE_SOURCE_INTERFACE
  }

  fn price_for_issuance(&self) -> Result<u128> {
    self.read(|prices| prices.issuance)
  }

  fn price_for_redemption(&self) -> Result<u128> {
    self.read(|prices| prices.redemption)
  }
}
