mod common;

use anchor_lang::prelude::*;
use common::{Harness, E18, E6};
use issuance_engine::error::EngineError::{CollaboratorMismatch, InvalidEngineState};
use issuance_engine::prelude::*;

fn config_path() -> String {
  format!("{}/tests/data/engine-config.json", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn config_file_loads() -> anyhow::Result<()> {
  let config = EngineConfig::from_file(config_path())?;
  assert_eq!(
    config.project_treasury.to_string(),
    "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin"
  );
  assert_eq!((config.buy_fee_bps, config.max_buy_fee_bps), (100, 500));
  assert_eq!((config.sell_fee_bps, config.max_sell_fee_bps), (50, 250));
  assert!(config.direct_operations_only);
  assert!(config.buy_is_open);
  assert!(!config.sell_is_open);
  Ok(())
}

#[test]
fn missing_config_file_err() {
  let out = EngineConfig::from_file("tests/data/absent.json");
  assert!(out.is_err());
}

#[test]
fn engine_built_from_config_file() -> anyhow::Result<()> {
  let config = EngineConfig::from_file(config_path())?;
  let h = Harness::with_config(|c| *c = config.clone())?;
  assert_eq!(h.engine.buy_fee(), 100);
  assert_eq!(h.engine.sell_fee(), 50);
  assert!(h.engine.state().direct_operations_only);
  assert!(!h.engine.state().sell_is_open);
  assert_eq!(h.engine.state().project_treasury, config.project_treasury);
  Ok(())
}

#[test]
fn restore_continues_where_saved() -> Result<()> {
  let mut h = Harness::new()?;
  let (trader, settler) = (h.trader, h.settler);
  h.fund_issuance(&trader, 30 * E18)?;
  h.engine.sell(&trader, 10 * E18, 1)?;
  h.engine.sell(&trader, 10 * E18, 1)?;
  h.engine.mark_settled(&settler, 3 * E6)?;

  let saved = h.engine.save_state()?;
  let mut restored = IssuanceEngine::restore(&saved, h.collaborators())?;
  assert_eq!(restored.state(), h.engine.state());
  assert_eq!(restored.order_id(), 2);
  assert!(restored.drain_events().is_empty());

  let queued = restored.sell(&trader, 10 * E18, 1)?;
  assert_eq!(queued.order_id, 3);
  assert_eq!(
    restored.open_redemption_amount(),
    h.engine.open_redemption_amount() + queued.sale.net_collateral
  );
  Ok(())
}

#[test]
fn restore_with_foreign_ledger_rejected() -> Result<()> {
  let h = Harness::new()?;
  let saved = h.engine.save_state()?;
  let mut collaborators = h.collaborators();
  collaborators.collateral =
    Box::new(InMemoryLedger::new(Pubkey::new_unique(), 6));
  let out = IssuanceEngine::restore(&saved, collaborators);
  assert!(out.is_err_and(|e| e == CollaboratorMismatch.into()));
  Ok(())
}

#[test]
fn restore_with_other_decimals_rejected() -> Result<()> {
  let h = Harness::new()?;
  let saved = h.engine.save_state()?;
  let mut collaborators = h.collaborators();
  collaborators.issuance =
    Box::new(InMemoryLedger::new(h.engine.state().issuance_token, 9));
  let out = IssuanceEngine::restore(&saved, collaborators);
  assert!(out.is_err_and(|e| e == CollaboratorMismatch.into()));
  Ok(())
}

#[test]
fn corrupt_state_rejected() -> Result<()> {
  let h = Harness::new()?;
  let mut saved = h.engine.save_state()?;
  saved.truncate(saved.len() / 2);
  let truncated = IssuanceEngine::restore(&saved, h.collaborators());
  assert!(truncated.is_err_and(|e| e == InvalidEngineState.into()));
  let garbage = IssuanceEngine::restore(&[0xff; 3], h.collaborators());
  assert!(garbage.is_err_and(|e| e == InvalidEngineState.into()));
  Ok(())
}

/// Byte offsets in the Borsh layout of `EngineState`.
const BUY_FEE_OFFSET: usize = 0;
const COLLATERAL_DECIMALS_OFFSET: usize = 8;
const NEXT_ORDER_ID_OFFSET: usize = 8 + 2 + 4 * 32 + 3;

fn write_u64(bytes: &mut [u8], offset: usize, value: u64) {
  bytes[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}

#[test]
fn fee_above_cap_state_rejected() -> Result<()> {
  let h = Harness::new()?;
  let mut saved = h.engine.save_state()?;
  saved[BUY_FEE_OFFSET..BUY_FEE_OFFSET + 2]
    .copy_from_slice(&20_000u16.to_le_bytes());
  let out = IssuanceEngine::restore(&saved, h.collaborators());
  assert!(out.is_err_and(|e| e == InvalidEngineState.into()));
  Ok(())
}

#[test]
fn out_of_range_decimals_state_rejected() -> Result<()> {
  let h = Harness::new()?;
  let mut saved = h.engine.save_state()?;
  saved[COLLATERAL_DECIMALS_OFFSET] = 0;
  let out = IssuanceEngine::restore(&saved, h.collaborators());
  assert!(out.is_err_and(|e| e == InvalidEngineState.into()));
  Ok(())
}

#[test]
fn zero_order_counter_state_rejected() -> Result<()> {
  let h = Harness::new()?;
  let mut saved = h.engine.save_state()?;
  assert_eq!(
    saved[NEXT_ORDER_ID_OFFSET..NEXT_ORDER_ID_OFFSET + 8],
    1u64.to_le_bytes()
  );
  write_u64(&mut saved, NEXT_ORDER_ID_OFFSET, 0);
  let out = IssuanceEngine::restore(&saved, h.collaborators());
  assert!(out.is_err_and(|e| e == InvalidEngineState.into()));
  Ok(())
}

#[test]
fn rewound_order_counter_state_rejected() -> Result<()> {
  let mut h = Harness::new()?;
  let trader = h.trader;
  h.fund_issuance(&trader, 10 * E18)?;
  h.engine.sell(&trader, 10 * E18, 1)?;
  let mut saved = h.engine.save_state()?;
  write_u64(&mut saved, NEXT_ORDER_ID_OFFSET, 1);
  let out = IssuanceEngine::restore(&saved, h.collaborators());
  assert!(out.is_err_and(|e| e == InvalidEngineState.into()));

  write_u64(&mut saved, NEXT_ORDER_ID_OFFSET, 2);
  let restored = IssuanceEngine::restore(&saved, h.collaborators())?;
  assert_eq!(restored.order_id(), 1);
  Ok(())
}
