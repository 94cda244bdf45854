//! Field validation against a declarative per-resource schema.
//!
//! The validator is partial and fail-fast: rules run in declaration order,
//! absent fields are skipped, and the first failing rule's message is the only
//! one ever surfaced. Presence is enforced explicitly: the caller passes the
//! field names its operation is about to bind, and a rule marked `required`
//! fails when such a field is missing instead of surfacing later as a lookup
//! error.

mod callbacks;
pub use callbacks::Callback;

use crate::case::to_display_name;
use crate::error::ApiError;
use crate::schema::FieldSchema;
use crate::Record;
use serde_json::Value;

pub const DEFAULT_MIN: u32 = 8;
pub const DEFAULT_MAX: u32 = 255;

/// Validate a record against a schema.
///
/// `required_keys` lists the camelCase fields the current operation binds
/// (POST: insert columns, PUT: updatable columns plus pk). Pass an empty slice
/// for argument validation (GET/DELETE), where presence is not enforced.
pub fn validate_fields(
    record: &Record,
    schema: &FieldSchema,
    required_keys: &[String],
) -> Result<(), ApiError> {
    for rule in &schema.rules {
        match record.get(&rule.name) {
            None | Some(Value::Null) => {
                if rule.required && required_keys.contains(&rule.name) {
                    return Err(ApiError::Validation(format!(
                        "{} is required.",
                        to_display_name(&rule.name)
                    )));
                }
            }
            Some(value) => validate_one(
                &rule.name,
                value,
                rule.min_length.unwrap_or(DEFAULT_MIN),
                rule.max_length.unwrap_or(DEFAULT_MAX),
                rule.validator,
            )?,
        }
    }
    Ok(())
}

/// Validate a single field.
///
/// The branch chain is deliberately mutually exclusive: a field that is not
/// (case-insensitively) named "id" gets the length-range check and nothing
/// else; an "id" field skips length and runs its callback instead. Callers
/// relying on callbacks for non-id fields must know they will not run.
pub fn validate_one(
    name: &str,
    value: &Value,
    min: u32,
    max: u32,
    callback: Option<Callback>,
) -> Result<(), ApiError> {
    let display = to_display_name(name);

    if is_empty(value) {
        return Err(ApiError::Validation(format!("{display} cannot be empty.")));
    } else if !name.eq_ignore_ascii_case("id") {
        let len = callbacks::value_text(value).chars().count() as u32;
        if len < min || len > max {
            return Err(ApiError::Validation(format!(
                "{display} must be between {min} and {max} only."
            )));
        }
    } else if let Some(cb) = callback {
        cb.run(value).map_err(ApiError::Validation)?;
    }
    Ok(())
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldRule;
    use serde_json::json;

    fn schema() -> FieldSchema {
        FieldSchema::new(vec![
            FieldRule::new("id").required().callback(Callback::Id),
            FieldRule::new("firstName").required().length(2, 50),
            FieldRule::new("email").required().length(5, 255).callback(Callback::Email),
        ])
    }

    fn record(pairs: &[(&str, serde_json::Value)]) -> Record {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn fail_fast_surfaces_only_first_invalid_field() {
        // firstName and email both invalid; firstName comes first in the schema.
        let rec = record(&[("firstName", json!("A")), ("email", json!("x"))]);
        let err = validate_fields(&rec, &schema(), &[]).unwrap_err();
        assert_eq!(err.to_string(), "First Name must be between 2 and 50 only.");
    }

    #[test]
    fn absent_fields_are_skipped_without_required_keys() {
        let rec = record(&[("firstName", json!("Ada"))]);
        assert!(validate_fields(&rec, &schema(), &[]).is_ok());
    }

    #[test]
    fn required_enforced_for_bound_fields_only() {
        let rec = record(&[("firstName", json!("Ada")), ("email", json!("a@b.co"))]);
        // email bound and present, id not bound by this operation: passes.
        assert!(validate_fields(&rec, &schema(), &keys(&["firstName", "email"])).is_ok());
        // id bound but absent: fails with the presence message.
        let err = validate_fields(&rec, &schema(), &keys(&["id", "firstName"])).unwrap_err();
        assert_eq!(err.to_string(), "Id is required.");
    }

    #[test]
    fn null_counts_as_absent_for_required() {
        let rec = record(&[("email", Value::Null)]);
        let err = validate_fields(&rec, &schema(), &keys(&["email"])).unwrap_err();
        assert_eq!(err.to_string(), "Email is required.");
    }

    #[test]
    fn empty_value_fails_before_anything_else() {
        let err = validate_one("email", &json!(""), 5, 255, Some(Callback::Email)).unwrap_err();
        assert_eq!(err.to_string(), "Email cannot be empty.");
        let err = validate_one("id", &Value::Null, 8, 255, Some(Callback::Id)).unwrap_err();
        assert_eq!(err.to_string(), "Id cannot be empty.");
    }

    #[test]
    fn non_id_field_never_runs_its_callback() {
        // "not-an-email" is 12 chars, inside 5..255: passes despite the email
        // callback being registered, because the length branch wins.
        assert!(validate_one("email", &json!("not-an-email"), 5, 255, Some(Callback::Email)).is_ok());
    }

    #[test]
    fn id_field_runs_callback_and_skips_length() {
        let err = validate_one("id", &json!("xx"), 8, 255, Some(Callback::Id)).unwrap_err();
        // "xx" is shorter than min 8, but ids never length-check.
        assert_eq!(err.to_string(), "Id is invalid.");
        let valid = crate::id::OpaqueId::generate().to_text();
        assert!(validate_one("id", &json!(valid), 8, 255, Some(Callback::Id)).is_ok());
    }

    #[test]
    fn id_without_callback_passes() {
        assert!(validate_one("id", &json!("anything"), 8, 255, None).is_ok());
    }

    #[test]
    fn length_uses_defaults() {
        let sch = FieldSchema::new(vec![FieldRule::new("description")]);
        let rec = record(&[("description", json!("short"))]);
        let err = validate_fields(&rec, &sch, &[]).unwrap_err();
        assert_eq!(err.to_string(), "Description must be between 8 and 255 only.");
    }
}
