//! Trade order payload and its structural validation

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Fields every trade payload must carry, checked in this order
pub const REQUIRED_FIELDS: [&str; 3] = ["symbol", "amount", "action"];

pub const INVALID_AMOUNT: &str = "Invalid amount: must be a positive number";
pub const INVALID_SYMBOL: &str = "Invalid symbol format";
pub const INVALID_ACTION: &str = "Invalid action: must be buy or sell";

/// Direction of a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl TradeAction {
    pub fn as_str(self) -> &'static str {
        match self {
            TradeAction::Buy => "buy",
            TradeAction::Sell => "sell",
        }
    }
}

impl FromStr for TradeAction {
    type Err = String;

    /// Case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "buy" => Ok(TradeAction::Buy),
            "sell" => Ok(TradeAction::Sell),
            _ => Err(INVALID_ACTION.to_string()),
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A structurally valid trade order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeOrder {
    pub symbol: String,
    pub amount: f64,
    pub action: TradeAction,
}

impl TryFrom<&Map<String, Value>> for TradeOrder {
    type Error = ValidationResult;

    fn try_from(payload: &Map<String, Value>) -> Result<Self, Self::Error> {
        let result = validate_trade_data(payload);
        if !result.is_valid {
            return Err(result);
        }

        // Validation guarantees each of these is present and well formed
        let symbol = payload.get("symbol").and_then(Value::as_str);
        let amount = payload.get("amount").and_then(numeric_value);
        let action = payload
            .get("action")
            .and_then(Value::as_str)
            .and_then(|a| a.parse::<TradeAction>().ok());

        match (symbol, amount, action) {
            (Some(symbol), Some(amount), Some(action)) => Ok(TradeOrder {
                symbol: symbol.to_string(),
                amount,
                action,
            }),
            _ => Err(ValidationResult::from_errors(vec![
                "Trade payload could not be converted".to_string(),
            ])),
        }
    }
}

/// Outcome of structural validation
///
/// Never an error value on its own; callers decide what to do with it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    /// Valid exactly when `errors` is empty
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid {
            write!(f, "valid")
        } else {
            write!(f, "{}", self.errors.join("; "))
        }
    }
}

/// Check the fields and types of a trade payload
///
/// Errors accumulate in a fixed order: missing fields, then amount, symbol
/// and action checks on the fields that are present. A field counts as
/// missing when it is absent, null, `false`, zero or an empty string.
pub fn validate_trade_data(payload: &Map<String, Value>) -> ValidationResult {
    let mut errors = Vec::new();

    for field in REQUIRED_FIELDS {
        if !payload.get(field).is_some_and(is_present) {
            errors.push(format!("Missing required field: {field}"));
        }
    }

    let present = |field: &str| payload.get(field).filter(|v| is_present(v));

    if present("amount").is_some_and(|a| !numeric_value(a).is_some_and(|n| n > 0.0)) {
        errors.push(INVALID_AMOUNT.to_string());
    }

    if present("symbol").is_some_and(|s| !s.is_string()) {
        errors.push(INVALID_SYMBOL.to_string());
    }

    let valid_action = |a: &Value| a.as_str().is_some_and(|a| a.parse::<TradeAction>().is_ok());
    if present("action").is_some_and(|a| !valid_action(a)) {
        errors.push(INVALID_ACTION.to_string());
    }

    if !errors.is_empty() {
        let data = Value::Object(payload.clone());
        warn!(
            errors = ?errors,
            data = %data,
            "Trade data validation failed"
        );
    }

    ValidationResult::from_errors(errors)
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Finite numeric reading of a JSON value
///
/// Numbers as-is, strings after trimming, booleans as 1 or 0.
fn numeric_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    n.is_finite().then_some(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_empty_payload_reports_missing_fields_in_order() {
        let result = validate_trade_data(&Map::new());
        assert!(!result.is_valid);
        assert_eq!(
            result.errors,
            vec![
                "Missing required field: symbol",
                "Missing required field: amount",
                "Missing required field: action",
            ]
        );
    }

    #[test]
    fn test_valid_trade() {
        let result =
            validate_trade_data(&payload(json!({"symbol": "BTC", "amount": 1.5, "action": "buy"})));
        assert_eq!(result, ValidationResult::valid());
    }

    #[test]
    fn test_negative_amount_is_single_error() {
        let result =
            validate_trade_data(&payload(json!({"symbol": "BTC", "amount": -5, "action": "sell"})));
        assert_eq!(result.errors, vec![INVALID_AMOUNT]);
    }

    #[test]
    fn test_action_is_case_insensitive() {
        let result =
            validate_trade_data(&payload(json!({"symbol": "ETH", "amount": 2, "action": "BUY"})));
        assert!(result.is_valid);
    }

    #[test]
    fn test_zero_amount_counts_as_missing() {
        let result =
            validate_trade_data(&payload(json!({"symbol": "ETH", "amount": 0, "action": "buy"})));
        assert_eq!(result.errors, vec!["Missing required field: amount"]);
    }

    #[test]
    fn test_numeric_string_amount() {
        let ok = validate_trade_data(&payload(
            json!({"symbol": "ETH", "amount": " 10.25 ", "action": "sell"}),
        ));
        assert!(ok.is_valid);

        let bad = validate_trade_data(&payload(
            json!({"symbol": "ETH", "amount": "ten", "action": "sell"}),
        ));
        assert_eq!(bad.errors, vec![INVALID_AMOUNT]);
    }

    #[test]
    fn test_wrong_types_accumulate_in_order() {
        let result = validate_trade_data(&payload(
            json!({"symbol": 42, "amount": "Infinity", "action": "hold"}),
        ));
        assert_eq!(result.errors, vec![INVALID_AMOUNT, INVALID_SYMBOL, INVALID_ACTION]);
    }

    #[test]
    fn test_non_string_action_is_invalid() {
        let result =
            validate_trade_data(&payload(json!({"symbol": "BTC", "amount": 1, "action": 7})));
        assert_eq!(result.errors, vec![INVALID_ACTION]);
    }

    #[test]
    fn test_try_from_builds_order() {
        let order = TradeOrder::try_from(&payload(
            json!({"symbol": "SOL", "amount": "3", "action": "Sell"}),
        ))
        .unwrap();
        assert_eq!(
            order,
            TradeOrder {
                symbol: "SOL".to_string(),
                amount: 3.0,
                action: TradeAction::Sell,
            }
        );
    }

    #[test]
    fn test_try_from_returns_validation_errors() {
        let err = TradeOrder::try_from(&payload(json!({"symbol": "SOL"}))).unwrap_err();
        assert!(!err.is_valid);
        assert_eq!(err.errors.len(), 2);
        assert_eq!(err.to_string(), "Missing required field: amount; Missing required field: action");
    }
}
