use anchor_lang::prelude::error_code;

#[error_code]
pub enum EngineError {
  // `authority`
  #[msg("Caller does not hold the capability required for this operation.")]
  CallerNotAuthorized = 7200,
  // trading gates
  #[msg("Buying is closed.")]
  BuyingClosed,
  #[msg("Selling is closed.")]
  SellingClosed,
  #[msg("Only the caller may be the beneficiary while direct operations are enforced.")]
  DirectOperationsOnly,
  // trade input
  #[msg("Deposit amount must be greater than zero.")]
  InvalidDepositAmount,
  #[msg("Minimum amount out must be greater than zero.")]
  InvalidMinAmountOut,
  #[msg("Token balance is lower than the amount to sell.")]
  InsufficientTokenBalance,
  #[msg("Receiver must not be the null address.")]
  InvalidReceiver,
  #[msg("Overflow in accumulated fee totals.")]
  FeeTotalOverflow,
  // configuration
  #[msg("Project treasury must not be the null address.")]
  InvalidProjectTreasury,
  #[msg("Collaborator does not match the persisted engine state.")]
  CollaboratorMismatch,
  #[msg("Persisted engine state could not be encoded or decoded.")]
  InvalidEngineState,
  // `settlement`
  #[msg("Settlement rejected the redemption batch.")]
  QueueExecutionFailed,
  // `quote`
  #[msg("Arithmetic error while computing quote fee percentage.")]
  QuoteArithmetic,
  // `memory`
  #[msg("Ledger balance is lower than the requested debit.")]
  LedgerInsufficientBalance,
  #[msg("Overflow in ledger balance.")]
  LedgerOverflow,
  // `shared`
  #[msg("Engine lock is poisoned.")]
  EngineUnavailable,
}
