//! Signed init data verification
//!
//! The embedded web app hands back a query string signed by the platform.
//! Verification follows the platform's chained HMAC scheme:
//!
//! 1. drop the `hash` field and sort the remaining `key=value` pairs by key
//! 2. join them with `\n` to form the check string
//! 3. `secret = HMAC-SHA256(key = "WebAppData", msg = bot_token)`
//! 4. `hash = hex(HMAC-SHA256(key = secret, msg = check_string))`

use crate::error::SignatureError;
use crate::trade::{ValidationResult, validate_trade_data};
use hmac::{Hmac, Mac};
use serde_json::{Map, Value};
use sha2::Sha256;
use std::collections::BTreeMap;
use std::fmt;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};
use url::form_urlencoded;

type HmacSha256 = Hmac<Sha256>;

/// Key of the first HMAC round
const SECRET_KEY_SEED: &[u8] = b"WebAppData";

/// Length of a hex encoded SHA-256 digest
const HASH_HEX_LEN: usize = 64;

/// Authenticated init data fields, without the `hash`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitData {
    fields: BTreeMap<String, String>,
}

impl InitData {
    /// Value of a signed field
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Fields in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Signing time in unix seconds, when present
    pub fn auth_date(&self) -> Option<i64> {
        self.get("auth_date")?.parse().ok()
    }

    /// The signed `user` object, when present and well formed
    pub fn user(&self) -> Option<Value> {
        serde_json::from_str(self.get("user")?).ok()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Verifies signed init data and trade payloads for one bot token
#[derive(Clone)]
pub struct WebAppValidator {
    bot_token: String,
}

impl fmt::Debug for WebAppValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebAppValidator")
            .field("bot_token", &"<redacted>")
            .finish()
    }
}

impl WebAppValidator {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
        }
    }

    /// Verify a signed init data blob
    ///
    /// Duplicate keys resolve to the last occurrence.
    pub fn verify(&self, init_data: &str) -> Result<InitData, SignatureError> {
        let mut fields: BTreeMap<String, String> = form_urlencoded::parse(init_data.as_bytes())
            .into_owned()
            .collect();

        let hash = fields
            .remove("hash")
            .filter(|h| !h.is_empty())
            .ok_or(SignatureError::MissingHash)?;

        if hash.len() != HASH_HEX_LEN || !hash.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(SignatureError::MalformedHash(hash));
        }

        let calculated = self.digest(&check_string(&fields))?;

        if calculated.as_bytes().ct_eq(hash.as_bytes()).into() {
            Ok(InitData { fields })
        } else {
            Err(SignatureError::Mismatch)
        }
    }

    /// Whether the init data carries a valid signature
    ///
    /// Every failure, including unexpected ones, yields `false`.
    pub fn validate_web_app_data(&self, init_data: &str) -> bool {
        match self.verify(init_data) {
            Ok(data) => {
                debug!(fields = data.len(), "Web app data signature verified");
                true
            }
            Err(SignatureError::Mismatch) => {
                warn!("Web app data validation failed: Hash mismatch");
                false
            }
            Err(e) => {
                warn!(error = %e, "Web app data validation failed: {e}");
                false
            }
        }
    }

    /// Hash the platform would attach to these fields
    pub fn sign<'a, I>(&self, fields: I) -> Result<String, SignatureError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let fields: BTreeMap<String, String> = fields
            .into_iter()
            .filter(|(k, _)| *k != "hash")
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.digest(&check_string(&fields))
    }

    /// Encode fields as a query string with a valid `hash` appended
    pub fn signed_init_data<'a, I>(&self, fields: I) -> Result<String, SignatureError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)> + Clone,
    {
        let hash = self.sign(fields.clone())?;
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (k, v) in fields {
            serializer.append_pair(k, v);
        }
        serializer.append_pair("hash", &hash);
        Ok(serializer.finish())
    }

    /// Structural validation of a trade payload
    pub fn validate_trade_data(&self, payload: &Map<String, Value>) -> ValidationResult {
        validate_trade_data(payload)
    }

    fn digest(&self, check_string: &str) -> Result<String, SignatureError> {
        let mut secret = HmacSha256::new_from_slice(SECRET_KEY_SEED)
            .map_err(|e| SignatureError::InvalidKey(e.to_string()))?;
        secret.update(self.bot_token.as_bytes());
        let secret_key = secret.finalize().into_bytes();

        let mut mac = HmacSha256::new_from_slice(&secret_key)
            .map_err(|e| SignatureError::InvalidKey(e.to_string()))?;
        mac.update(check_string.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

/// Sorted `key=value` lines joined by newlines
fn check_string(fields: &BTreeMap<String, String>) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("\n")
}
