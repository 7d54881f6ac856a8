#![allow(clippy::missing_errors_doc)]
#![allow(clippy::wildcard_imports)]

pub mod conversion;
pub mod error;
pub mod exchange_math;
pub mod fee_controller;
pub mod oracle;
pub mod redemption_queue;
pub mod slippage_config;
