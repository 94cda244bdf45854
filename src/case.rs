//! Case conversion between API keys (camelCase) and SQL column names (snake_case).
//!
//! The mapping must be deterministic and reversible: the engine snake-cases
//! request keys to build WHERE/SET clauses and camel-cases row keys on the way
//! out, so every module goes through these two functions and nothing else.

use serde_json::{Map, Value};

/// Convert a single identifier from snake_case to camelCase.
/// e.g. "user_id" -> "userId", "created_at" -> "createdAt"
pub fn to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut capitalize_next = false;
    for c in s.chars() {
        if c == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            out.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert a single identifier from camelCase to snake_case.
/// e.g. "userId" -> "user_id", "createdAt" -> "created_at"
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Human-readable field name for validation messages.
/// e.g. "firstName" -> "First Name", "id" -> "Id"
pub fn to_display_name(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut word_start = true;
    for c in s.chars() {
        if c == '_' {
            out.push(' ');
            word_start = true;
        } else if c.is_uppercase() {
            out.push(' ');
            out.push(c);
            word_start = false;
        } else if word_start {
            out.extend(c.to_uppercase());
            word_start = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert all keys of a JSON object from snake_case to camelCase (in place).
/// Used for rows on the way out so the client receives camelCase keys.
pub fn object_keys_to_camel_case(obj: &mut Map<String, Value>) {
    let keys: Vec<String> = obj.keys().cloned().collect();
    for k in keys {
        let camel = to_camel_case(&k);
        if camel != k {
            if let Some(v) = obj.remove(&k) {
                obj.insert(camel, v);
            }
        }
    }
}
