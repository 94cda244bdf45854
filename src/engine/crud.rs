//! Generic CRUD pipelines: one per verb, each a linear
//! guard -> validate -> bind -> sanitize -> execute -> respond sequence.
//!
//! Planning is pure and synchronous: `plan_*` either returns the finished
//! [`Statement`] or an error, so a validation failure can never be followed by
//! statement execution. Execution is the only async, database-touching step.

use crate::case::{object_keys_to_camel_case, to_camel_case, to_display_name};
use crate::engine::params::{BindValue, ParamMap};
use crate::engine::sql::{delete_sql, insert_sql, select_sql, update_sql, Statement};
use crate::error::{ApiError, ConfigError};
use crate::id::OpaqueId;
use crate::logger::log_access;
use crate::password::hash_password;
use crate::registry::ResourceSpec;
use crate::response::Reply;
use crate::sanitize::sanitize;
use crate::schema::{ColumnKind, ResourceConfig};
use crate::validate::validate_fields;
use crate::Record;
use axum::http::Method;
use serde_json::Value;
use sqlx::PgPool;

pub struct CrudEngine;

impl CrudEngine {
    /// Fetch rows, optionally filtered by `args` (exact match per field).
    pub async fn get(
        pool: &PgPool,
        spec: &ResourceSpec,
        method: &Method,
        args: &Record,
    ) -> Result<Reply, ApiError> {
        require_verb(method, Method::GET)?;
        log_access(&format!("Create GET request on {}.", spec.config.name));

        let stmt = Self::plan_get(spec, args)?;
        let rows = fetch_all(pool, &spec.config, &stmt).await?;

        log_access(&format!("Finished GET request on {}.", spec.config.name));
        Ok(Reply::ok("", rows))
    }

    /// Create a row from the request body.
    pub async fn post(
        pool: &PgPool,
        spec: &ResourceSpec,
        method: &Method,
        content: &Record,
    ) -> Result<Reply, ApiError> {
        require_verb(method, Method::POST)?;
        log_access(&format!("Create POST request on {}.", spec.config.name));

        let stmt = Self::plan_post(spec, content)?;
        execute(pool, &stmt).await?;

        log_access(&format!("Finished POST request on {}.", spec.config.name));
        Ok(Reply::created(format!(
            "{} created successfully.",
            spec.config.name
        )))
    }

    /// Update a row: path args carry the identity, the body the new values.
    pub async fn put(
        pool: &PgPool,
        spec: &ResourceSpec,
        method: &Method,
        args: &Record,
        content: &Record,
    ) -> Result<Reply, ApiError> {
        require_verb(method, Method::PUT)?;
        log_access(&format!("Create PUT request on {}.", spec.config.name));

        let stmt = Self::plan_put(spec, args, content)?;
        execute(pool, &stmt).await?;

        log_access(&format!("Finished PUT request on {}.", spec.config.name));
        Ok(Reply::ok(
            format!("{} updated successfully.", spec.config.name),
            Vec::new(),
        ))
    }

    /// Delete the row identified by the pk argument.
    pub async fn delete(
        pool: &PgPool,
        spec: &ResourceSpec,
        method: &Method,
        args: &Record,
    ) -> Result<Reply, ApiError> {
        require_verb(method, Method::DELETE)?;
        log_access(&format!("Create DELETE request on {}.", spec.config.name));

        let stmt = Self::plan_delete(spec, args)?;
        execute(pool, &stmt).await?;

        log_access(&format!("Finished DELETE request on {}.", spec.config.name));
        Ok(Reply::ok(
            format!("{} deleted successfully.", spec.config.name),
            Vec::new(),
        ))
    }

    /// Plan a SELECT. Non-empty args are validated first; keys that are not
    /// declared columns are ignored rather than reaching the statement.
    pub fn plan_get(spec: &ResourceSpec, args: &Record) -> Result<Statement, ApiError> {
        let config = &spec.config;
        let mut params: ParamMap = Vec::new();
        let mut keys: Vec<&String> = Vec::new();

        if !args.is_empty() {
            validate_fields(args, &spec.schema, &[])?;
            keys = args
                .keys()
                .filter(|k| config.kind_of_param(k).is_some())
                .collect();
            keys.sort();
            for key in &keys {
                params.push(((*key).clone(), BindValue::from_json(&args[*key])));
            }
        }
        sanitize(&mut params, config);

        let filter_keys: Vec<&str> = keys.iter().map(|k| k.as_str()).collect();
        Ok(Statement {
            sql: select_sql(config, &filter_keys),
            params,
        })
    }

    /// Plan an INSERT. Binds every insertable column with a value: a generated
    /// pk where configured, a hash for password columns, the content value
    /// otherwise. Optional absent columns are omitted so DB defaults apply.
    pub fn plan_post(spec: &ResourceSpec, content: &Record) -> Result<Statement, ApiError> {
        let config = &spec.config;
        let mut content = content.clone();
        if let Some(prepare) = config.prepare {
            prepare(&mut content);
        }
        validate_fields(&content, &spec.schema, &spec.insert_required_keys())?;

        let mut columns: Vec<&str> = Vec::with_capacity(config.insertable.len());
        let mut params: ParamMap = Vec::with_capacity(config.insertable.len());
        for col in &config.insertable {
            let key = to_camel_case(col);
            let kind = config.column(col).map(|c| c.kind);
            let bind = if config.pk_generated && *col == config.pk {
                BindValue::Text(OpaqueId::generate().to_text())
            } else if kind == Some(ColumnKind::Password) {
                BindValue::Text(hash_field(&content, &key)?)
            } else {
                match content.get(&key) {
                    None | Some(Value::Null) => continue,
                    Some(v) => BindValue::from_json(v),
                }
            };
            columns.push(col.as_str());
            params.push((key, bind));
        }
        sanitize(&mut params, config);

        Ok(Statement {
            sql: insert_sql(config, &columns),
            params,
        })
    }

    /// Plan an UPDATE. The merged record is body over args, except the pk,
    /// which always comes from args: a client cannot change a row's identity
    /// through the body.
    pub fn plan_put(
        spec: &ResourceSpec,
        args: &Record,
        content: &Record,
    ) -> Result<Statement, ApiError> {
        let config = &spec.config;
        let pk_key = to_camel_case(&config.pk);
        let pk_value = args
            .get(&pk_key)
            .cloned()
            .ok_or_else(|| ConfigError::Undefined(to_display_name(&pk_key)))?;

        let mut merged = args.clone();
        merged.extend(content.clone());
        merged.insert(pk_key.clone(), pk_value.clone());
        if let Some(prepare) = config.prepare {
            prepare(&mut merged);
        }
        validate_fields(&merged, &spec.schema, &spec.update_required_keys())?;

        let mut params: ParamMap = Vec::with_capacity(config.updatable.len() + 1);
        for col in &config.updatable {
            let key = to_camel_case(col);
            let kind = config.column(col).map(|c| c.kind);
            let bind = if kind == Some(ColumnKind::Password) {
                BindValue::Text(hash_field(&merged, &key)?)
            } else {
                let v = merged
                    .get(&key)
                    .ok_or_else(|| ConfigError::Undefined(to_display_name(&key)))?;
                BindValue::from_json(v)
            };
            params.push((key, bind));
        }
        params.push((pk_key, BindValue::from_json(&pk_value)));
        sanitize(&mut params, config);

        Ok(Statement {
            sql: update_sql(config),
            params,
        })
    }

    /// Plan a DELETE. A missing pk argument is a caller-contract error, not a
    /// recoverable validation failure.
    pub fn plan_delete(spec: &ResourceSpec, args: &Record) -> Result<Statement, ApiError> {
        let config = &spec.config;
        validate_fields(args, &spec.schema, &[])?;

        let pk_key = to_camel_case(&config.pk);
        let pk_value = args
            .get(&pk_key)
            .ok_or_else(|| ConfigError::Undefined(to_display_name(&pk_key)))?;

        let mut params: ParamMap = vec![(pk_key, BindValue::from_json(pk_value))];
        sanitize(&mut params, config);

        Ok(Statement {
            sql: delete_sql(config),
            params,
        })
    }
}

fn require_verb(method: &Method, expected: Method) -> Result<(), ApiError> {
    if *method != expected {
        return Err(ApiError::MethodMismatch);
    }
    Ok(())
}

fn hash_field(record: &Record, key: &str) -> Result<String, ApiError> {
    let plain = record
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ConfigError::Undefined(to_display_name(key)))?;
    hash_password(plain)
}

async fn fetch_all(
    pool: &PgPool,
    config: &ResourceConfig,
    stmt: &Statement,
) -> Result<Vec<Value>, ApiError> {
    tracing::debug!(sql = %stmt.sql, "query");
    let mut query = sqlx::query(&stmt.sql);
    for (_, p) in &stmt.params {
        query = query.bind(p.clone());
    }
    let rows = query.fetch_all(pool).await?;
    Ok(rows.iter().map(|r| row_to_json(config, r)).collect())
}

async fn execute(pool: &PgPool, stmt: &Statement) -> Result<u64, ApiError> {
    tracing::debug!(sql = %stmt.sql, "query");
    let mut query = sqlx::query(&stmt.sql);
    for (_, p) in &stmt.params {
        query = query.bind(p.clone());
    }
    let done = query.execute(pool).await?;
    Ok(done.rows_affected())
}

/// Row to a camelCase JSON object. Id-kind columns always come out in text
/// form; binary identifiers never leak past the engine.
fn row_to_json(config: &ResourceConfig, row: &sqlx::postgres::PgRow) -> Value {
    use sqlx::{Column, Row};
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        let v = if config.column(name).map(|c| c.kind) == Some(ColumnKind::Id) {
            id_cell_to_text(row, name)
        } else {
            cell_to_value(row, name)
        };
        map.insert(name.to_string(), v);
    }
    object_keys_to_camel_case(&mut map);
    Value::Object(map)
}

fn id_cell_to_text(row: &sqlx::postgres::PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(bytes)) = row.try_get::<Option<Vec<u8>>, _>(name) {
        if let Some(id) = OpaqueId::from_binary(&bytes) {
            return Value::String(id.to_text());
        }
        return Value::Null;
    }
    if let Ok(Some(u)) = row.try_get::<Option<uuid::Uuid>, _>(name) {
        return Value::String(u.hyphenated().to_string());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    Value::Null
}

fn cell_to_value(row: &sqlx::postgres::PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i16>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
        return Value::String(d.format("%Y-%m-%d %H:%M:%S").to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDate>, _>(name) {
        return Value::String(d.format("%Y-%m-%d").to_string());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<serde_json::Value>, _>(name) {
        return j;
    }
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::verify_password;
    use crate::registry::Registry;
    use serde_json::json;

    fn spec(path: &str) -> ResourceSpec {
        Registry::builtin().unwrap().get(path).cloned().unwrap()
    }

    fn record(pairs: &[(&str, Value)]) -> Record {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn param<'a>(stmt: &'a Statement, key: &str) -> &'a BindValue {
        &stmt.params.iter().find(|(k, _)| k == key).unwrap().1
    }

    #[test]
    fn get_without_args_selects_all() {
        let stmt = CrudEngine::plan_get(&spec("product"), &Record::new()).unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM \"product\"");
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn get_with_filter_binds_the_value() {
        let args = record(&[("name", json!("Widget"))]);
        let stmt = CrudEngine::plan_get(&spec("product"), &args).unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM \"product\" WHERE \"name\" = $1");
        assert_eq!(*param(&stmt, "name"), BindValue::Text("Widget".into()));
    }

    #[test]
    fn get_with_invalid_args_plans_nothing() {
        // 1-char name fails length validation; planning must stop before
        // sanitization or SQL construction.
        let args = record(&[("name", json!("W"))]);
        let err = CrudEngine::plan_get(&spec("product"), &args).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn get_ignores_undeclared_columns() {
        let args = record(&[("favoriteColor", json!("tealish-blue"))]);
        let stmt = CrudEngine::plan_get(&spec("product"), &args).unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM \"product\"");
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn post_generates_distinct_ids() {
        let body = record(&[
            ("name", json!("Widget")),
            ("description", json!("A very useful widget")),
            ("price", json!("19.99")),
        ]);
        let spec = spec("product");
        let a = CrudEngine::plan_post(&spec, &body).unwrap();
        let b = CrudEngine::plan_post(&spec, &body).unwrap();
        assert!(matches!(param(&a, "id"), BindValue::Bytes(_)));
        assert_ne!(param(&a, "id"), param(&b, "id"));
    }

    #[test]
    fn post_converts_price_to_minor_units() {
        let body = record(&[
            ("name", json!("Widget")),
            ("description", json!("A very useful widget")),
            ("price", json!("19.99")),
        ]);
        let stmt = CrudEngine::plan_post(&spec("product"), &body).unwrap();
        assert_eq!(*param(&stmt, "price"), BindValue::I64(1999));
    }

    #[test]
    fn post_hashes_passwords() {
        let body = record(&[
            ("firstName", json!("Ada")),
            ("lastName", json!("Lovelace")),
            ("email", json!("ada@example.com")),
            ("password", json!("secret123")),
            ("contact", json!("123-4567")),
        ]);
        let stmt = CrudEngine::plan_post(&spec("user"), &body).unwrap();
        let bound = param(&stmt, "password").as_text().unwrap();
        assert_ne!(bound, "secret123");
        assert!(verify_password("secret123", bound));
    }

    #[test]
    fn post_missing_required_field_fails_validation() {
        let body = record(&[("firstName", json!("Ada"))]);
        let err = CrudEngine::plan_post(&spec("user"), &body).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn post_omits_absent_optional_columns() {
        // order_item quantity is optional; absent means the DB default applies.
        let body = record(&[
            ("orderId", json!(OpaqueId::generate().to_text())),
            ("productId", json!(OpaqueId::generate().to_text())),
        ]);
        let stmt = CrudEngine::plan_post(&spec("order-item"), &body).unwrap();
        assert!(!stmt.sql.contains("quantity"));
        assert!(stmt.params.iter().all(|(k, _)| k != "quantity"));
    }

    #[test]
    fn post_order_fills_expected_arrival() {
        let body = record(&[("userId", json!(OpaqueId::generate().to_text()))]);
        let stmt = CrudEngine::plan_post(&spec("order"), &body).unwrap();
        assert!(matches!(param(&stmt, "expectedArrival"), BindValue::Text(_)));
    }

    #[test]
    fn put_identity_comes_from_args_never_body() {
        let id_a = OpaqueId::generate();
        let id_b = OpaqueId::generate();
        let args = record(&[("id", json!(id_a.to_text()))]);
        let body = record(&[
            ("id", json!(id_b.to_text())),
            ("name", json!("Widget")),
            ("description", json!("A very useful widget")),
            ("price", json!("19.99")),
        ]);
        let stmt = CrudEngine::plan_put(&spec("product"), &args, &body).unwrap();
        let (key, bound) = stmt.params.last().unwrap();
        assert_eq!(key, "id");
        assert_eq!(*bound, BindValue::Bytes(id_a.to_binary().to_vec()));
        assert!(!stmt
            .params
            .iter()
            .any(|(_, v)| *v == BindValue::Bytes(id_b.to_binary().to_vec())));
    }

    #[test]
    fn put_missing_updatable_value_is_a_contract_error() {
        let args = record(&[("id", json!(OpaqueId::generate().to_text()))]);
        let body = record(&[
            ("status", json!("shipped")),
            // actualArrival missing
        ]);
        let err = CrudEngine::plan_put(&spec("order"), &args, &body).unwrap_err();
        assert!(matches!(err, ApiError::Config(ConfigError::Undefined(_))));
    }

    #[test]
    fn delete_without_id_is_a_contract_error() {
        let err = CrudEngine::plan_delete(&spec("product"), &Record::new()).unwrap_err();
        assert_eq!(err.to_string(), "Id is not defined.");
    }

    #[test]
    fn delete_binds_the_binary_id() {
        let id = OpaqueId::generate();
        let args = record(&[("id", json!(id.to_text()))]);
        let stmt = CrudEngine::plan_delete(&spec("product"), &args).unwrap();
        assert_eq!(stmt.sql, "DELETE FROM \"product\" WHERE \"id\" = $1");
        assert_eq!(stmt.params[0].1, BindValue::Bytes(id.to_binary().to_vec()));
    }

    #[test]
    fn verb_guard_rejects_mismatches() {
        assert!(require_verb(&Method::GET, Method::GET).is_ok());
        assert!(matches!(
            require_verb(&Method::POST, Method::GET),
            Err(ApiError::MethodMismatch)
        ));
    }
}
