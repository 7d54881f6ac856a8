use anchor_lang::prelude::error_code;

#[error_code]
pub enum CoreError {
  // `conversion`
  #[msg("Token decimals must be within [1, 24].")]
  InvalidTokenDecimals = 7000,
  #[msg("Overflow while normalizing token decimals.")]
  DecimalNormalization,
  // `oracle`
  #[msg("Price source has not published a valid price.")]
  InvalidPrice,
  #[msg("Price source does not expose the expected interface.")]
  InvalidPriceSourceInterface,
  // `fee_controller`
  #[msg("Fee exceeds the configured maximum.")]
  FeeExceedsMaximum,
  #[msg("Maximum fee cannot be lowered below the active fee.")]
  MaxFeeBelowActiveFee,
  #[msg("Arithmetic error while extracting fees.")]
  FeeExtraction,
  // `exchange_math`
  #[msg("Arithmetic error in conversion from collateral to issuance token.")]
  CollateralToIssuance,
  #[msg("Arithmetic error in conversion from issuance token to collateral.")]
  IssuanceToCollateral,
  // `slippage_config`
  #[msg("Computed output amount is below the requested minimum.")]
  InsufficientOutputAmount,
  // `redemption_queue`
  #[msg("Overflow in open redemption amount.")]
  OpenRedemptionOverflow,
  #[msg("Settled amount exceeds the open redemption amount.")]
  OpenRedemptionUnderflow,
  #[msg("Redemption order id counter exhausted.")]
  OrderIdOverflow,
  #[msg("No redemption order exists for the given id.")]
  UnknownRedemptionOrder,
  #[msg("Redemption order cannot move to the requested state.")]
  InvalidOrderTransition,
}
