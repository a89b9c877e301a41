//! Response classification and body sanitization.
//!
//! The backend emits two known malformed JSON patterns: a literal
//! `": ?"` where it means `": null"`, and negative fractions with the
//! leading zero dropped (`": -.5"`). Decoding retries exactly once
//! against a repaired body before giving up.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, ErrorDetails, ErrorKind, Result};

/// Known malformed patterns and their repairs, applied as a single
/// ordered substitution pass.
const BODY_REPAIRS: &[(&str, &str)] = &[
    // null rendered as a bare question mark
    (r#"": ?"#, r#"": null"#),
    // negative fraction missing its leading zero
    (r#"": -."#, r#"": -0."#),
];

/// Apply the known-malformed-pattern repairs to a response body.
pub fn repair_body(body: &str) -> String {
    let mut repaired = body.to_string();
    for (pattern, replacement) in BODY_REPAIRS {
        repaired = repaired.replace(pattern, replacement);
    }
    repaired
}

/// Decode a response body, retrying once against the repaired body
/// when the first attempt fails. A second failure is a decode error
/// carrying the sanitized body and the original cause.
pub fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    match serde_json::from_str(body) {
        Ok(data) => Ok(data),
        Err(_) => {
            let sanitized = repair_body(body);
            debug!("decode failed, retrying against sanitized body");
            serde_json::from_str(&sanitized).map_err(|err| {
                Error::with_source(ErrorKind::Decode { body: sanitized }, err)
            })
        }
    }
}

/// Classify a status >= 400 response into a backend error. The body is
/// best-effort parsed into a generic map for the details, falling back
/// to the raw body text.
pub fn backend_error(status: u16, body: &str) -> Error {
    let details = match serde_json::from_str::<Value>(body) {
        Ok(value) => ErrorDetails::Parsed(value),
        Err(_) => ErrorDetails::Raw(body.to_string()),
    };
    Error::new(ErrorKind::Backend { status, details })
}
