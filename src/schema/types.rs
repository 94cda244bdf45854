//! Static resource configuration: what a CRUD operation targets and how its
//! fields are validated. Constructed once at registration time, immutable and
//! shared read-only afterwards.

use crate::engine::params::ParamMap;
use crate::validate::Callback;
use crate::Record;
use serde::{Deserialize, Serialize};

/// Explicit per-column type tag. The sanitizer and the engine dispatch on this
/// instead of guessing id-ness from name patterns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Id,
    Email,
    Url,
    Text,
    Numeric,
    Password,
}

#[derive(Clone, Debug)]
pub struct ColumnSpec {
    /// snake_case SQL column name.
    pub name: String,
    pub kind: ColumnKind,
    /// SQL cast appended to the placeholder (e.g. "timestamp") so text
    /// values bind correctly against non-text columns.
    pub cast: Option<String>,
}

impl ColumnSpec {
    pub fn new(name: &str, kind: ColumnKind) -> Self {
        ColumnSpec {
            name: name.to_string(),
            kind,
            cast: None,
        }
    }

    pub fn cast(mut self, cast: &str) -> Self {
        self.cast = Some(cast.to_string());
        self
    }
}

/// Resource-specific content defaults applied before validation
/// (e.g. an order's expected arrival date).
pub type PrepareFn = fn(&mut Record);

/// Resource-specific sanitization extension, run after the shared rules
/// (e.g. product price to integer minor units).
pub type SanitizeFn = fn(&mut ParamMap);

/// Declares what a CRUD operation targets. One per resource, built at startup.
#[derive(Clone, Debug)]
pub struct ResourceConfig {
    /// Display name used in log lines and success messages, e.g. "User".
    pub name: String,
    /// URL path segment, e.g. "user".
    pub path: String,
    /// SQL table name.
    pub table: String,
    /// Primary key column (snake_case).
    pub pk: String,
    /// Whether the engine generates the pk on POST. False where the pk is a
    /// caller-supplied foreign key (e.g. user_address.user_id).
    pub pk_generated: bool,
    /// Full column list in declaration order.
    pub columns: Vec<ColumnSpec>,
    /// Columns bound on INSERT (snake_case); defaults to all columns.
    pub insertable: Vec<String>,
    /// Columns SET on PUT (snake_case; never contains the pk).
    pub updatable: Vec<String>,
    /// camelCase parameter keys the sanitizer trims.
    pub trimmable: Vec<String>,
    /// Optional pre-built base SELECT overriding the generated one.
    pub fixed_query: Option<String>,
    pub prepare: Option<PrepareFn>,
    pub sanitize_ext: Option<SanitizeFn>,
}

impl ResourceConfig {
    pub fn column(&self, snake_name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == snake_name)
    }

    /// Kind of the column a camelCase parameter key maps to.
    pub fn kind_of_param(&self, camel_key: &str) -> Option<ColumnKind> {
        self.column(&crate::case::to_snake_case(camel_key)).map(|c| c.kind)
    }
}

/// One declarative validation rule. `min_length`/`max_length` default to the
/// validator's own 8/255 when absent; `validator` names a registered callback.
#[derive(Clone, Debug)]
pub struct FieldRule {
    /// camelCase field name as it appears in a request record.
    pub name: String,
    pub required: bool,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub validator: Option<Callback>,
}

impl FieldRule {
    pub fn new(name: &str) -> Self {
        FieldRule {
            name: name.to_string(),
            required: false,
            min_length: None,
            max_length: None,
            validator: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn length(mut self, min: u32, max: u32) -> Self {
        self.min_length = Some(min);
        self.max_length = Some(max);
        self
    }

    pub fn callback(mut self, cb: Callback) -> Self {
        self.validator = Some(cb);
        self
    }
}

/// Ordered rule set for one resource. Validation iterates in declaration order.
#[derive(Clone, Debug, Default)]
pub struct FieldSchema {
    pub rules: Vec<FieldRule>,
}

impl FieldSchema {
    pub fn new(rules: Vec<FieldRule>) -> Self {
        FieldSchema { rules }
    }
}
