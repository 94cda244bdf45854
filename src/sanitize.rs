//! Parameter sanitization, run strictly after validation succeeds and before
//! binding. Validation always sees the raw values; the statement only ever
//! sees the sanitized ones.
//!
//! Dispatch is by the column's declared kind: Id text becomes the 16-byte
//! binary form, Email/Url values pass through safe-character filters, declared
//! trimmable text fields lose surrounding whitespace. Password parameters are
//! already hashed by the time this runs and match no rule. A per-resource
//! extension hook runs last for business normalization (price minor units,
//! order status casing).

use crate::engine::params::{BindValue, ParamMap};
use crate::id::OpaqueId;
use crate::schema::{ColumnKind, ResourceConfig};

pub fn sanitize(params: &mut ParamMap, config: &ResourceConfig) {
    for (key, value) in params.iter_mut() {
        match config.kind_of_param(key) {
            Some(ColumnKind::Id) => {
                if let BindValue::Text(s) = value {
                    if let Some(id) = OpaqueId::parse_text(s.trim()) {
                        *value = BindValue::Bytes(id.to_binary().to_vec());
                    }
                }
            }
            Some(ColumnKind::Email) => {
                if let BindValue::Text(s) = value {
                    *value = BindValue::Text(filter_email(s));
                }
            }
            Some(ColumnKind::Url) => {
                if let BindValue::Text(s) = value {
                    *value = BindValue::Text(filter_url(s));
                }
            }
            _ => {
                if config.trimmable.iter().any(|t| t == key) {
                    if let BindValue::Text(s) = value {
                        *value = BindValue::Text(s.trim().to_string());
                    }
                }
            }
        }
    }
    if let Some(ext) = config.sanitize_ext {
        ext(params);
    }
}

/// Keep only characters legal in an email address.
fn filter_email(s: &str) -> String {
    s.chars()
        .filter(|c| {
            c.is_ascii_alphanumeric()
                || matches!(
                    c,
                    '!' | '#' | '$' | '%' | '&' | '\'' | '*' | '+' | '-' | '/' | '=' | '?'
                        | '^' | '_' | '`' | '{' | '|' | '}' | '~' | '@' | '.' | '[' | ']'
                )
        })
        .collect()
}

/// Keep only characters legal in a URL.
fn filter_url(s: &str) -> String {
    s.chars()
        .filter(|c| {
            c.is_ascii_alphanumeric()
                || matches!(
                    c,
                    '$' | '-' | '_' | '.' | '+' | '!' | '*' | '\'' | '(' | ')' | ',' | '{'
                        | '}' | '|' | '\\' | '^' | '~' | '[' | ']' | '`' | '<' | '>' | '#'
                        | '%' | '"' | ';' | '/' | '?' | ':' | '@' | '&' | '='
                )
        })
        .collect()
}
