//! Parse per-resource field-rule files (JSON) into typed schemas.
//!
//! Rule files are external static configuration: an array of
//! `{name, required?, min?, max?, callback?}` objects, read once at startup.
//! Unknown callback names are a startup error, not a runtime surprise.

use crate::error::ConfigError;
use crate::schema::{FieldRule, FieldSchema};
use crate::validate::Callback;
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
struct RawFieldRule {
    name: String,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    min: Option<u32>,
    #[serde(default)]
    max: Option<u32>,
    #[serde(default)]
    callback: Option<String>,
}

/// Parse one rule file's contents.
pub fn parse_rules(json: &str) -> Result<FieldSchema, ConfigError> {
    let raw: Vec<RawFieldRule> =
        serde_json::from_str(json).map_err(|e| ConfigError::Load(e.to_string()))?;
    let mut rules = Vec::with_capacity(raw.len());
    for r in raw {
        let validator = match r.callback {
            Some(name) => Some(
                Callback::from_name(&name).ok_or(ConfigError::UnknownCallback(name))?,
            ),
            None => None,
        };
        rules.push(FieldRule {
            name: r.name,
            required: r.required,
            min_length: r.min,
            max_length: r.max,
            validator,
        });
    }
    Ok(FieldSchema::new(rules))
}

/// Load `validate-<path>-fields.json` for a resource path segment, if present.
pub fn load_rules_for(dir: &Path, path_segment: &str) -> Result<Option<FieldSchema>, ConfigError> {
    let file = dir.join(format!("validate-{path_segment}-fields.json"));
    if !file.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(&file)
        .map_err(|e| ConfigError::Load(format!("{}: {e}", file.display())))?;
    parse_rules(&text).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rules_with_defaults() {
        let schema = parse_rules(
            r#"[
                {"name": "id", "callback": "id", "required": true},
                {"name": "firstName", "min": 2, "max": 50},
                {"name": "email"}
            ]"#,
        )
        .unwrap();
        assert_eq!(schema.rules.len(), 3);
        assert_eq!(schema.rules[0].validator, Some(Callback::Id));
        assert!(schema.rules[0].required);
        assert_eq!(schema.rules[1].min_length, Some(2));
        assert_eq!(schema.rules[1].max_length, Some(50));
        assert!(!schema.rules[1].required);
        assert!(schema.rules[2].validator.is_none());
    }

    #[test]
    fn unknown_callback_is_a_config_error() {
        let err = parse_rules(r#"[{"name": "id", "callback": "no_such_check"}]"#).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownCallback(ref n) if n == "no_such_check"));
    }

    #[test]
    fn malformed_json_is_a_load_error() {
        assert!(matches!(parse_rules("{oops"), Err(ConfigError::Load(_))));
    }
}
