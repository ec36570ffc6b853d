//! Inbound request validation for the three banking operations.
//!
//! Each operation has an explicit input type ([`NationalId`],
//! [`CashMovement`]) and a function that turns raw request data into
//! either the normalized value or the complete, ordered list of
//! [`Violation`]s. Validation never stops at the first failure.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Violation;

/// Shape of a national ID: eight digits, a dash, one check digit.
pub const NATIONAL_ID_PATTERN: &str = r"/^\d{8}-\d$/";

/// Maximum number of decimal places accepted for an amount.
pub const AMOUNT_PRECISION: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NationalId(String);

impl NationalId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NationalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated input of a deposit or withdrawal.
///
/// Serializes to the upstream body shape `{accountNumber, amount}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashMovement {
    pub account_number: String,
    pub amount: f64,
}

/// Validate the `nationalId` path parameter of an account lookup.
pub fn national_id(raw: &str) -> Result<NationalId, Vec<Violation>> {
    let trimmed = raw.trim();
    let path = ["params", "nationalId"];

    if trimmed.is_empty() {
        return Err(vec![Violation::new(
            "\"nationalId\" is not allowed to be empty",
            &path,
        )]);
    }
    if !matches_national_id(trimmed) {
        return Err(vec![Violation::new(
            format!(
                "\"nationalId\" with value \"{trimmed}\" fails to match the required pattern: {NATIONAL_ID_PATTERN}"
            ),
            &path,
        )]);
    }
    Ok(NationalId(trimmed.to_string()))
}

fn matches_national_id(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes[..8].iter().all(u8::is_ascii_digit)
        && bytes[8] == b'-'
        && bytes[9].is_ascii_digit()
}

/// Validate the JSON body of a deposit or withdrawal.
///
/// `None` means the request carried no body at all.
pub fn cash_movement(body: Option<&Value>) -> Result<CashMovement, Vec<Violation>> {
    let Some(body) = body else {
        return Err(vec![Violation::new("\"body\" is required", &["body"])]);
    };
    let Value::Object(fields) = body else {
        return Err(vec![Violation::new(
            "\"body\" must be of type object",
            &["body"],
        )]);
    };

    let mut errors = Vec::new();
    let account_number = account_number(fields, &mut errors);
    let amount = amount(fields, &mut errors);

    match (account_number, amount) {
        (Some(account_number), Some(amount)) if errors.is_empty() => Ok(CashMovement {
            account_number,
            amount,
        }),
        _ => Err(errors),
    }
}

fn account_number(fields: &Map<String, Value>, errors: &mut Vec<Violation>) -> Option<String> {
    let path = ["body", "accountNumber"];
    match fields.get("accountNumber") {
        None | Some(Value::Null) => {
            errors.push(Violation::new("\"accountNumber\" is required", &path));
            None
        }
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                errors.push(Violation::new(
                    "\"accountNumber\" is not allowed to be empty",
                    &path,
                ));
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Some(_) => {
            errors.push(Violation::new("\"accountNumber\" must be a string", &path));
            None
        }
    }
}

fn amount(fields: &Map<String, Value>, errors: &mut Vec<Violation>) -> Option<f64> {
    let path = ["body", "amount"];
    let value = match fields.get("amount") {
        None | Some(Value::Null) => {
            errors.push(Violation::new("\"amount\" is required", &path));
            return None;
        }
        Some(Value::Number(n)) => n.as_f64(),
        // Numeric strings are accepted and converted.
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    let Some(value) = value.filter(|v| v.is_finite()) else {
        errors.push(Violation::new("\"amount\" must be a number", &path));
        return None;
    };

    let mut valid = true;
    if value <= 0.0 {
        errors.push(Violation::new("\"amount\" must be a positive number", &path));
        valid = false;
    }
    if decimal_places(value) > AMOUNT_PRECISION {
        errors.push(Violation::new(
            format!("\"amount\" must have no more than {AMOUNT_PRECISION} decimal places"),
            &path,
        ));
        valid = false;
    }
    valid.then_some(value)
}

/// Number of fractional digits in the shortest decimal form of `value`.
///
/// `Display` for `f64` yields the shortest round-tripping representation
/// without exponent, so `10.10` counts one place and `10.005` counts three.
fn decimal_places(value: f64) -> usize {
    let repr = value.to_string();
    repr.split_once('.').map_or(0, |(_, frac)| frac.len())
}
