//! Builds parameterized SELECT, INSERT, UPDATE, DELETE text from a resource
//! config. Identifiers come from config only, never from the request; request
//! values always travel as positional `$n` parameters.

use crate::case::to_snake_case;
use crate::engine::params::ParamMap;
use crate::schema::ResourceConfig;

/// A planned statement: SQL text plus its parameters in placeholder order.
#[derive(Debug)]
pub struct Statement {
    pub sql: String,
    pub params: ParamMap,
}

/// Quote identifier for PostgreSQL (safe: only from config).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// `$n`, with an SQL cast when the column declares one (e.g. timestamp
/// columns, so text values bind correctly).
fn placeholder(config: &ResourceConfig, snake_col: &str, n: usize) -> String {
    match config.column(snake_col).and_then(|c| c.cast.as_deref()) {
        Some(cast) => format!("${n}::{cast}"),
        None => format!("${n}"),
    }
}

/// `SELECT * FROM table [WHERE col = $n AND ...]`; filter keys are camelCase
/// request keys, snake-cased into column names in the given order.
pub fn select_sql(config: &ResourceConfig, filter_keys: &[&str]) -> String {
    let mut sql = config
        .fixed_query
        .clone()
        .unwrap_or_else(|| format!("SELECT * FROM {}", quoted(&config.table)));
    if !filter_keys.is_empty() {
        let conditions: Vec<String> = filter_keys
            .iter()
            .enumerate()
            .map(|(i, key)| {
                let col = to_snake_case(key);
                format!("{} = {}", quoted(&col), placeholder(config, &col, i + 1))
            })
            .collect();
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql
}

/// `INSERT INTO table(cols...) VALUES($1, ...)` over the given snake_case
/// column list (columns without a value are omitted so DB defaults apply).
pub fn insert_sql(config: &ResourceConfig, columns: &[&str]) -> String {
    let col_list: Vec<String> = columns.iter().map(|c| quoted(c)).collect();
    let values: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| placeholder(config, c, i + 1))
        .collect();
    format!(
        "INSERT INTO {}({}) VALUES({})",
        quoted(&config.table),
        col_list.join(", "),
        values.join(", ")
    )
}

/// `UPDATE table SET col = $n, ... WHERE pk = $last` over the declared
/// updatable columns. The pk binds last and only ever comes from path args.
pub fn update_sql(config: &ResourceConfig) -> String {
    let sets: Vec<String> = config
        .updatable
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = {}", quoted(c), placeholder(config, c, i + 1)))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE {} = ${}",
        quoted(&config.table),
        sets.join(", "),
        quoted(&config.pk),
        config.updatable.len() + 1
    )
}

/// `DELETE FROM table WHERE pk = $1`.
pub fn delete_sql(config: &ResourceConfig) -> String {
    format!(
        "DELETE FROM {} WHERE {} = $1",
        quoted(&config.table),
        quoted(&config.pk)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::builtin_specs;

    fn config_for(path: &str) -> ResourceConfig {
        builtin_specs()
            .into_iter()
            .find(|s| s.config.path == path)
            .map(|s| s.config)
            .unwrap()
    }

    #[test]
    fn select_without_filters() {
        let cfg = config_for("product");
        assert_eq!(select_sql(&cfg, &[]), "SELECT * FROM \"product\"");
    }

    #[test]
    fn select_with_filters_maps_camel_to_snake() {
        let cfg = config_for("user");
        let sql = select_sql(&cfg, &["firstName", "lastName"]);
        assert_eq!(
            sql,
            "SELECT * FROM \"user\" WHERE \"first_name\" = $1 AND \"last_name\" = $2"
        );
    }

    #[test]
    fn insert_shape() {
        let cfg = config_for("product");
        let sql = insert_sql(&cfg, &["id", "name", "description", "price"]);
        assert_eq!(
            sql,
            "INSERT INTO \"product\"(\"id\", \"name\", \"description\", \"price\") VALUES($1, $2, $3, $4)"
        );
    }

    #[test]
    fn update_binds_pk_last() {
        let cfg = config_for("product");
        let sql = update_sql(&cfg);
        assert_eq!(
            sql,
            "UPDATE \"product\" SET \"name\" = $1, \"description\" = $2, \"price\" = $3 WHERE \"id\" = $4"
        );
    }

    #[test]
    fn delete_targets_pk() {
        let cfg = config_for("user-address");
        assert_eq!(
            delete_sql(&cfg),
            "DELETE FROM \"user_address\" WHERE \"user_id\" = $1"
        );
    }

    #[test]
    fn timestamp_columns_get_a_cast() {
        let cfg = config_for("order");
        let sql = insert_sql(&cfg, &["id", "user_id", "expected_arrival"]);
        assert!(sql.ends_with("VALUES($1, $2, $3::timestamp)"), "{sql}");
    }
}
