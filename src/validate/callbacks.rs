//! Named callback validators, registered per resource in its field schema.
//!
//! Each check returns the caller-facing message on failure. Names here are the
//! ones rule files use in their `callback` field.

use crate::id::OpaqueId;
use regex::Regex;
use serde_json::Value;

const ORDER_STATUSES: [&str; 4] = ["pending", "shipped", "delivered", "cancelled"];
const STORE_TYPES: [&str; 5] = [
    "sole_proprietorship",
    "corporation",
    "partnership",
    "cooperative",
    "one_person",
];
const VAT_STATUSES: [&str; 2] = ["vat", "non"];
const VERIFICATION_STATUSES: [&str; 3] = ["pending", "verified", "rejected"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Callback {
    Id,
    Email,
    Password,
    Contact,
    Url,
    HouseNo,
    Street,
    City,
    Region,
    PostalCode,
    Tin,
    OrderStatus,
    StoreType,
    VatStatus,
    VerificationStatus,
    Price,
    Quantity,
}

impl Callback {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "id" => Callback::Id,
            "email" => Callback::Email,
            "password" => Callback::Password,
            "contact" => Callback::Contact,
            "url" => Callback::Url,
            "house_no" => Callback::HouseNo,
            "street" => Callback::Street,
            "city" => Callback::City,
            "region" => Callback::Region,
            "postal_code" => Callback::PostalCode,
            "tin" => Callback::Tin,
            "order_status" => Callback::OrderStatus,
            "store_type" => Callback::StoreType,
            "vat_status" => Callback::VatStatus,
            "verification_status" => Callback::VerificationStatus,
            "price" => Callback::Price,
            "quantity" => Callback::Quantity,
            _ => return None,
        })
    }

    /// Run the check; `Err` carries the caller-facing message.
    pub fn run(self, value: &Value) -> Result<(), String> {
        let text = value_text(value);
        match self {
            Callback::Id => {
                if !OpaqueId::is_valid_text(&text) {
                    return Err("Id is invalid.".into());
                }
            }
            Callback::Email => {
                if !is_match(r"^[^@\s]+@[^@\s]+\.[^@\s]+$", &text)? {
                    return Err("Invalid email format.".into());
                }
            }
            Callback::Password => {
                if text.chars().any(|c| {
                    !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '!' | '@' | '\'' | '.'))
                }) {
                    return Err("Password should only contain lower and uppercase characters, numbers, and special characters (_, -, !, @, ').".into());
                }
            }
            Callback::Contact => {
                if text.chars().any(|c| {
                    !(c.is_ascii_digit()
                        || c == ' '
                        || matches!(c, '+' | '[' | ']' | '(' | ')' | '-' | '_' | '#'))
                }) {
                    return Err("Contact number should only contain numbers, space, and special characters (+, [, ], (, ), -, _, #).".into());
                }
            }
            Callback::Url => {
                if !is_match(r"^https?://[^\s]+$", &text)? {
                    return Err("Invalid URL format.".into());
                }
            }
            Callback::HouseNo => {
                if text
                    .chars()
                    .any(|c| !(c.is_alphanumeric() || matches!(c, '_' | '#' | '-')))
                {
                    return Err("House number can only contain letters, numbers, hash symbol(#), and hyphens(-).".into());
                }
            }
            Callback::Street => {
                if text.chars().any(|c| {
                    !(c.is_alphanumeric() || c.is_whitespace() || matches!(c, '_' | '\'' | '-'))
                }) {
                    return Err("Street can only contain letters, numbers, spaces, apostrophe('), and hyphens(-).".into());
                }
            }
            Callback::City => {
                if text.chars().any(|c| {
                    !(c.is_alphabetic() || c.is_whitespace() || matches!(c, '\'' | '-'))
                }) {
                    return Err(
                        "City can only contain letters, spaces, apostrophe('), and hyphens(-)."
                            .into(),
                    );
                }
            }
            Callback::Region => {
                if text.chars().any(|c| {
                    !(c.is_alphanumeric() || c.is_whitespace() || matches!(c, '_' | '-'))
                }) {
                    return Err(
                        "Region can only contain letters, numbers, spaces, and hyphens(-).".into(),
                    );
                }
            }
            Callback::PostalCode => {
                if !is_match(r"^\d{4,}(-\d+)?$", &text)? {
                    return Err("Invalid Postal code format.".into());
                }
            }
            Callback::Tin => {
                if !is_match(r"^\d{3}-\d{3}-\d{3}(-\d{3})?$", &text)? {
                    return Err("Invalid TIN format.".into());
                }
            }
            Callback::OrderStatus => {
                if !ORDER_STATUSES.contains(&text.to_lowercase().as_str()) {
                    return Err(
                        "Invalid order status [Options: pending, shipped, delivered, cancelled]."
                            .into(),
                    );
                }
            }
            Callback::StoreType => {
                if !STORE_TYPES.contains(&text.as_str()) {
                    return Err("Invalid store type.".into());
                }
            }
            Callback::VatStatus => {
                if !VAT_STATUSES.contains(&text.as_str()) {
                    return Err("Invalid store VAT type.".into());
                }
            }
            Callback::VerificationStatus => {
                if !VERIFICATION_STATUSES.contains(&text.as_str()) {
                    return Err("Invalid verification status.".into());
                }
            }
            Callback::Price => {
                let n = value_number(value).ok_or("Price must be a number.")?;
                if n <= 0.0 {
                    return Err("Price must be positive only.".into());
                }
                if n > 999_999.999 {
                    return Err("Maximum price is 999,999.999.".into());
                }
            }
            Callback::Quantity => {
                let n = value_number(value).ok_or("Quantity must be a number.")?;
                if n < 1.0 {
                    return Err("Quantity must be positive only.".into());
                }
                if n > 99.0 {
                    return Err("Maximum quantity is 99.".into());
                }
            }
        }
        Ok(())
    }
}

fn is_match(pattern: &str, text: &str) -> Result<bool, String> {
    let re = Regex::new(pattern).map_err(|_| format!("invalid pattern {pattern}"))?;
    Ok(re.is_match(text))
}

/// Scalar rendered as text, for checks that inspect characters.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn value_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
