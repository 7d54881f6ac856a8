//! Engine construction parameters, loaded from JSON.
//!
//! ```json
//! {
//!   "project_treasury": "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin",
//!   "buy_fee_bps": 100,
//!   "sell_fee_bps": 100,
//!   "max_buy_fee_bps": 500
//! }
//! ```
//!
//! Omitted caps default to 100%, both trading gates default to open and
//! direct operations default to off.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use anchor_lang::prelude::Pubkey;
use anyhow::{Context, Result};
use issuance_core::fee_controller::{FeeConfig, FeeSchedule, BPS_SCALE};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::EngineError::InvalidProjectTreasury;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
  #[serde(with = "pubkey_base58")]
  pub project_treasury: Pubkey,
  pub buy_fee_bps: u16,
  pub sell_fee_bps: u16,
  #[serde(default = "default_max_fee_bps")]
  pub max_buy_fee_bps: u16,
  #[serde(default = "default_max_fee_bps")]
  pub max_sell_fee_bps: u16,
  #[serde(default)]
  pub direct_operations_only: bool,
  #[serde(default = "default_open")]
  pub buy_is_open: bool,
  #[serde(default = "default_open")]
  pub sell_is_open: bool,
}

fn default_max_fee_bps() -> u16 {
  BPS_SCALE
}

fn default_open() -> bool {
  true
}

impl EngineConfig {
  /// Config with both caps at 100%, gates open and direct operations off.
  #[must_use]
  pub fn new(
    project_treasury: Pubkey,
    buy_fee_bps: u16,
    sell_fee_bps: u16,
  ) -> EngineConfig {
    EngineConfig {
      project_treasury,
      buy_fee_bps,
      sell_fee_bps,
      max_buy_fee_bps: BPS_SCALE,
      max_sell_fee_bps: BPS_SCALE,
      direct_operations_only: false,
      buy_is_open: true,
      sell_is_open: true,
    }
  }

  pub fn from_json(json: &str) -> Result<EngineConfig> {
    serde_json::from_str(json).context("Parsing engine config")
  }

  pub fn from_file(path: impl AsRef<Path>) -> Result<EngineConfig> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
      .with_context(|| format!("Reading engine config {}", path.display()))?;
    EngineConfig::from_json(&json)
  }

  /// Builds the fee schedule, enforcing the same bounds as the governed fee
  /// setters.
  pub fn fee_schedule(&self) -> anchor_lang::Result<FeeSchedule> {
    Ok(FeeSchedule::new(
      FeeConfig::new(self.buy_fee_bps, self.max_buy_fee_bps)?,
      FeeConfig::new(self.sell_fee_bps, self.max_sell_fee_bps)?,
    ))
  }

  pub fn validated_treasury(&self) -> anchor_lang::Result<Pubkey> {
    if self.project_treasury == Pubkey::default() {
      Err(InvalidProjectTreasury.into())
    } else {
      Ok(self.project_treasury)
    }
  }
}

mod pubkey_base58 {
  use super::*;

  pub fn serialize<S: Serializer>(
    key: &Pubkey,
    serializer: S,
  ) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&key.to_string())
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
  ) -> std::result::Result<Pubkey, D::Error> {
    let encoded = String::deserialize(deserializer)?;
    Pubkey::from_str(&encoded).map_err(serde::de::Error::custom)
  }
}
