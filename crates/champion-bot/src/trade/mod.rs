//! Trade execution

pub mod service;

pub use service::{TradeReceipt, TradeService, TradeStatus};
