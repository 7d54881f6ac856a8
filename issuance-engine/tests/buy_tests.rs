mod common;

use anchor_lang::prelude::*;
use common::{Harness, E12};
use issuance_core::error::CoreError::{InsufficientOutputAmount, InvalidPrice};
use issuance_core::oracle::ManualPriceSource;
use issuance_engine::error::EngineError::{
  BuyingClosed, CallerNotAuthorized, DirectOperationsOnly, InvalidDepositAmount,
  InvalidMinAmountOut, InvalidReceiver, LedgerInsufficientBalance,
};
use issuance_engine::events::{EngineEvent, Purchased};
use rust_decimal::Decimal;

#[test]
fn buy_six_to_eighteen_decimals() -> Result<()> {
  let mut h = Harness::new()?;
  let trader = h.trader;
  h.fund_collateral(&trader, 1_000_000)?;
  let purchase = h.engine.buy(&trader, 1_000_000, 1)?;
  assert_eq!(purchase.fee_amount, 10_000);
  assert_eq!(purchase.issuance_out, 1_980_000 * E12);
  assert_eq!(h.issuance_balance(&trader), 1_980_000 * E12);
  assert_eq!(h.collateral_balance(&trader), 0);
  assert_eq!(h.collateral_balance(&h.treasury), 1_000_000);
  assert_eq!(h.engine.state().collected_buy_fees, 10_000);
  assert_eq!(
    h.engine.drain_events(),
    vec![EngineEvent::Purchased(Purchased {
      buyer: trader,
      receiver: trader,
      deposit_amount: 1_000_000,
      fee_amount: 10_000,
      issuance_out: 1_980_000 * E12,
      exchange_rate: 2_000_000_000_000_000_000,
    })]
  );
  Ok(())
}

#[test]
fn preview_matches_execution() -> Result<()> {
  let mut h = Harness::new()?;
  let trader = h.trader;
  h.fund_collateral(&trader, 123_456_789)?;
  let preview = h.engine.calculate_purchase_return(123_456_789)?;
  let quote = h.engine.quote_buy(123_456_789)?;
  let purchase = h.engine.buy(&trader, 123_456_789, preview.issuance_out)?;
  assert_eq!(preview, purchase);
  assert_eq!(quote.out_amount, purchase.issuance_out);
  assert_eq!(quote.fee_token, h.engine.state().collateral_token);
  Ok(())
}

#[test]
fn quote_reports_fee_fraction() -> Result<()> {
  let h = Harness::new()?;
  let quote = h.engine.quote_buy(1_000_000)?;
  assert_eq!(quote.fee_amount, 10_000);
  assert_eq!(quote.fee_pct, Decimal::new(1, 2));
  Ok(())
}

#[test]
fn slippage_failure_mutates_nothing() -> Result<()> {
  let mut h = Harness::new()?;
  let trader = h.trader;
  h.fund_collateral(&trader, 1_000_000)?;
  let before = h.engine.state().clone();
  let out = h.engine.buy(&trader, 1_000_000, 1_980_000 * E12 + 1);
  assert!(out.is_err_and(|e| e == InsufficientOutputAmount.into()));
  assert_eq!(h.engine.state(), &before);
  assert_eq!(h.collateral_balance(&trader), 1_000_000);
  assert_eq!(h.issuance_balance(&trader), 0);
  assert!(h.engine.drain_events().is_empty());
  Ok(())
}

#[test]
fn unfunded_buyer_rolls_back() -> Result<()> {
  let mut h = Harness::new()?;
  let trader = h.trader;
  let before = h.engine.state().clone();
  let out = h.engine.buy(&trader, 1_000_000, 1);
  assert!(out.is_err_and(|e| e == LedgerInsufficientBalance.into()));
  assert_eq!(h.engine.state(), &before);
  assert_eq!(h.issuance.inner.total_supply(), 0);
  Ok(())
}

#[test]
fn caller_without_whitelist_rejected() -> Result<()> {
  let mut h = Harness::new()?;
  let stranger = Pubkey::new_unique();
  h.fund_collateral(&stranger, 1_000_000)?;
  let out = h.engine.buy(&stranger, 1_000_000, 1);
  assert!(out.is_err_and(|e| e == CallerNotAuthorized.into()));
  Ok(())
}

#[test]
fn closed_buying_rejected() -> Result<()> {
  let mut h = Harness::new()?;
  let (governance, trader) = (h.governance, h.trader);
  h.fund_collateral(&trader, 1_000_000)?;
  h.engine.close_buy(&governance)?;
  let out = h.engine.buy(&trader, 1_000_000, 1);
  assert!(out.is_err_and(|e| e == BuyingClosed.into()));
  h.engine.open_buy(&governance)?;
  h.engine.buy(&trader, 1_000_000, 1)?;
  Ok(())
}

#[test]
fn input_validation() -> Result<()> {
  let mut h = Harness::new()?;
  let trader = h.trader;
  let zero_amount = h.engine.buy(&trader, 0, 1);
  let zero_min = h.engine.buy(&trader, 1_000_000, 0);
  let null_receiver =
    h.engine.buy_for(&trader, &Pubkey::default(), 1_000_000, 1);
  let zero_preview = h.engine.calculate_purchase_return(0);
  assert!(zero_amount.is_err_and(|e| e == InvalidDepositAmount.into()));
  assert!(zero_min.is_err_and(|e| e == InvalidMinAmountOut.into()));
  assert!(null_receiver.is_err_and(|e| e == InvalidReceiver.into()));
  assert!(zero_preview.is_err_and(|e| e == InvalidDepositAmount.into()));
  Ok(())
}

#[test]
fn buy_for_credits_receiver() -> Result<()> {
  let mut h = Harness::new()?;
  let trader = h.trader;
  let receiver = Pubkey::new_unique();
  h.fund_collateral(&trader, 1_000_000)?;
  h.engine.buy_for(&trader, &receiver, 1_000_000, 1)?;
  assert_eq!(h.issuance_balance(&receiver), 1_980_000 * E12);
  assert_eq!(h.issuance_balance(&trader), 0);
  Ok(())
}

#[test]
fn direct_mode_blocks_buy_for() -> Result<()> {
  let mut h = Harness::new()?;
  let (governance, trader) = (h.governance, h.trader);
  h.roles.grant(issuance_engine::authority::Capability::Whitelist, governance);
  h.fund_collateral(&trader, 1_000_000)?;
  h.engine.set_direct_operations_only(&governance, true)?;
  let receiver = Pubkey::new_unique();
  let by_trader = h.engine.buy_for(&trader, &receiver, 1_000_000, 1);
  let by_governance = h.engine.buy_for(&governance, &receiver, 1_000_000, 1);
  let to_self = h.engine.buy_for(&trader, &trader, 1_000_000, 1);
  assert!(by_trader.is_err_and(|e| e == DirectOperationsOnly.into()));
  assert!(by_governance.is_err_and(|e| e == DirectOperationsOnly.into()));
  assert!(to_self.is_err_and(|e| e == DirectOperationsOnly.into()));
  h.engine.buy(&trader, 1_000_000, 1)?;
  Ok(())
}

#[test]
fn unpublished_price_rejected() -> Result<()> {
  let mut h = Harness::new()?;
  let (governance, trader) = (h.governance, h.trader);
  h.fund_collateral(&trader, 1_000_000)?;
  let silent = ManualPriceSource::new(Pubkey::new_unique());
  h.engine.set_price_source(&governance, Box::new(silent))?;
  let out = h.engine.buy(&trader, 1_000_000, 1);
  assert!(out.is_err_and(|e| e == InvalidPrice.into()));
  assert!(h.engine.static_price_for_buying().is_err());
  assert_eq!(h.collateral_balance(&trader), 1_000_000);
  Ok(())
}
