//! Web app payload verification for the Champion Trade bot
//!
//! [`WebAppValidator`] authenticates init data signed by the platform and
//! checks the structure of the trade orders the web app submits.

pub mod error;
pub mod trade;
pub mod validator;

pub use error::SignatureError;
pub use trade::{TradeAction, TradeOrder, ValidationResult, validate_trade_data};
pub use validator::{InitData, WebAppValidator};
