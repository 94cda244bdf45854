//! Built-in resource definitions for the e-commerce backend: each is a
//! [`ResourceConfig`] plus its default field schema. A new resource is one
//! more entry here, not new handler code.

use crate::case::to_camel_case;
use crate::engine::params::{BindValue, ParamMap};
use crate::registry::ResourceSpec;
use crate::schema::{ColumnKind, ColumnSpec, FieldRule, FieldSchema, ResourceConfig};
use crate::validate::Callback;
use crate::Record;
use serde_json::Value;

pub fn builtin_specs() -> Vec<ResourceSpec> {
    vec![
        user(),
        user_address(),
        store(),
        store_address(),
        store_document(),
        store_staff(),
        product(),
        product_image(),
        order(),
        order_item(),
    ]
}

fn config(
    name: &str,
    path: &str,
    table: &str,
    pk: &str,
    pk_generated: bool,
    columns: Vec<ColumnSpec>,
) -> ResourceConfig {
    let all: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
    let updatable: Vec<String> = all.iter().filter(|c| *c != pk).cloned().collect();
    ResourceConfig {
        name: name.to_string(),
        path: path.to_string(),
        table: table.to_string(),
        pk: pk.to_string(),
        pk_generated,
        columns,
        insertable: all,
        updatable,
        trimmable: Vec::new(),
        fixed_query: None,
        prepare: None,
        sanitize_ext: None,
    }
}

fn camel(cols: &[&str]) -> Vec<String> {
    cols.iter().map(|c| to_camel_case(c)).collect()
}

fn user() -> ResourceSpec {
    let mut config = config(
        "User",
        "user",
        "user",
        "id",
        true,
        vec![
            ColumnSpec::new("id", ColumnKind::Id),
            ColumnSpec::new("first_name", ColumnKind::Text),
            ColumnSpec::new("last_name", ColumnKind::Text),
            ColumnSpec::new("email", ColumnKind::Email),
            ColumnSpec::new("password", ColumnKind::Password),
            ColumnSpec::new("contact", ColumnKind::Text),
        ],
    );
    config.trimmable = camel(&["first_name", "last_name", "contact"]);
    ResourceSpec {
        config,
        schema: FieldSchema::new(vec![
            FieldRule::new("id").required().callback(Callback::Id),
            FieldRule::new("firstName").required().length(2, 50),
            FieldRule::new("lastName").required().length(2, 50),
            FieldRule::new("email")
                .required()
                .length(5, 255)
                .callback(Callback::Email),
            FieldRule::new("password")
                .required()
                .length(8, 255)
                .callback(Callback::Password),
            FieldRule::new("contact")
                .required()
                .length(7, 20)
                .callback(Callback::Contact),
        ]),
    }
}

fn address_rules(owner_key: &str) -> Vec<FieldRule> {
    vec![
        FieldRule::new(owner_key)
            .required()
            .length(36, 36)
            .callback(Callback::Id),
        FieldRule::new("houseNo")
            .required()
            .length(1, 10)
            .callback(Callback::HouseNo),
        FieldRule::new("street")
            .required()
            .length(2, 100)
            .callback(Callback::Street),
        FieldRule::new("city")
            .required()
            .length(2, 50)
            .callback(Callback::City),
        FieldRule::new("region")
            .required()
            .length(2, 50)
            .callback(Callback::Region),
        FieldRule::new("postalCode")
            .required()
            .length(4, 10)
            .callback(Callback::PostalCode),
    ]
}

fn address_columns(owner_col: &str) -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new(owner_col, ColumnKind::Id),
        ColumnSpec::new("house_no", ColumnKind::Text),
        ColumnSpec::new("street", ColumnKind::Text),
        ColumnSpec::new("city", ColumnKind::Text),
        ColumnSpec::new("region", ColumnKind::Text),
        ColumnSpec::new("postal_code", ColumnKind::Text),
    ]
}

/// One address row per user; the owning user's id is the pk and is always
/// caller-supplied, never generated.
fn user_address() -> ResourceSpec {
    let mut config = config(
        "User address",
        "user-address",
        "user_address",
        "user_id",
        false,
        address_columns("user_id"),
    );
    config.trimmable = camel(&["street", "city", "region"]);
    ResourceSpec {
        config,
        schema: FieldSchema::new(address_rules("userId")),
    }
}

fn store() -> ResourceSpec {
    let mut config = config(
        "Store",
        "store",
        "store",
        "id",
        true,
        vec![
            ColumnSpec::new("id", ColumnKind::Id),
            ColumnSpec::new("name", ColumnKind::Text),
            ColumnSpec::new("slug", ColumnKind::Text),
            ColumnSpec::new("store_type", ColumnKind::Text),
            ColumnSpec::new("vat_status", ColumnKind::Text),
        ],
    );
    config.trimmable = camel(&["name"]);
    config.prepare = Some(prepare_store);
    ResourceSpec {
        config,
        schema: FieldSchema::new(vec![
            FieldRule::new("id").required().callback(Callback::Id),
            FieldRule::new("name").required().length(2, 100),
            FieldRule::new("slug").required().length(2, 100),
            FieldRule::new("storeType")
                .required()
                .length(4, 40)
                .callback(Callback::StoreType),
            FieldRule::new("vatStatus")
                .required()
                .length(3, 10)
                .callback(Callback::VatStatus),
        ]),
    }
}

fn store_address() -> ResourceSpec {
    let mut config = config(
        "Store address",
        "store-address",
        "store_address",
        "store_id",
        false,
        address_columns("store_id"),
    );
    config.trimmable = camel(&["street", "city", "region"]);
    ResourceSpec {
        config,
        schema: FieldSchema::new(address_rules("storeId")),
    }
}

/// Verification paperwork; `verification_status` starts from the DB default
/// and only ever changes through PUT.
fn store_document() -> ResourceSpec {
    let mut config = config(
        "Store document",
        "store-document",
        "store_document",
        "id",
        true,
        vec![
            ColumnSpec::new("id", ColumnKind::Id),
            ColumnSpec::new("store_id", ColumnKind::Id),
            ColumnSpec::new("tin", ColumnKind::Text),
            ColumnSpec::new("verification_status", ColumnKind::Text),
        ],
    );
    config.insertable = vec!["id".into(), "store_id".into(), "tin".into()];
    config.updatable = vec!["tin".into(), "verification_status".into()];
    ResourceSpec {
        config,
        schema: FieldSchema::new(vec![
            FieldRule::new("id").required().callback(Callback::Id),
            FieldRule::new("storeId")
                .required()
                .length(36, 36)
                .callback(Callback::Id),
            FieldRule::new("tin")
                .required()
                .length(11, 15)
                .callback(Callback::Tin),
            FieldRule::new("verificationStatus")
                .length(7, 10)
                .callback(Callback::VerificationStatus),
        ]),
    }
}

fn store_staff() -> ResourceSpec {
    let mut config = config(
        "Store staff",
        "store-staff",
        "store_staff",
        "id",
        true,
        vec![
            ColumnSpec::new("id", ColumnKind::Id),
            ColumnSpec::new("store_id", ColumnKind::Id),
            ColumnSpec::new("user_id", ColumnKind::Id),
            ColumnSpec::new("position", ColumnKind::Text),
        ],
    );
    config.updatable = vec!["position".into()];
    config.trimmable = camel(&["position"]);
    ResourceSpec {
        config,
        schema: FieldSchema::new(vec![
            FieldRule::new("id").required().callback(Callback::Id),
            FieldRule::new("storeId")
                .required()
                .length(36, 36)
                .callback(Callback::Id),
            FieldRule::new("userId")
                .required()
                .length(36, 36)
                .callback(Callback::Id),
            FieldRule::new("position").required().length(2, 50),
        ]),
    }
}

fn product() -> ResourceSpec {
    let mut config = config(
        "Product",
        "product",
        "product",
        "id",
        true,
        vec![
            ColumnSpec::new("id", ColumnKind::Id),
            ColumnSpec::new("name", ColumnKind::Text),
            ColumnSpec::new("description", ColumnKind::Text),
            ColumnSpec::new("price", ColumnKind::Numeric),
        ],
    );
    config.trimmable = camel(&["name", "description"]);
    config.sanitize_ext = Some(sanitize_product);
    ResourceSpec {
        config,
        schema: FieldSchema::new(vec![
            FieldRule::new("id").required().callback(Callback::Id),
            FieldRule::new("name").required().length(2, 100),
            FieldRule::new("description").required().length(8, 255),
            FieldRule::new("price")
                .required()
                .length(1, 13)
                .callback(Callback::Price),
        ]),
    }
}

fn product_image() -> ResourceSpec {
    let config = config(
        "Product image",
        "product-image",
        "product_image",
        "id",
        true,
        vec![
            ColumnSpec::new("id", ColumnKind::Id),
            ColumnSpec::new("product_id", ColumnKind::Id),
            ColumnSpec::new("image_link", ColumnKind::Url),
        ],
    );
    ResourceSpec {
        config,
        schema: FieldSchema::new(vec![
            FieldRule::new("id").required().callback(Callback::Id),
            FieldRule::new("productId")
                .required()
                .length(36, 36)
                .callback(Callback::Id),
            FieldRule::new("imageLink")
                .required()
                .length(8, 255)
                .callback(Callback::Url),
        ]),
    }
}

/// Orders start `pending` via the DB default; the expected arrival is stamped
/// at creation and only status and actual arrival change afterwards.
fn order() -> ResourceSpec {
    let mut config = config(
        "Order",
        "order",
        "orders",
        "id",
        true,
        vec![
            ColumnSpec::new("id", ColumnKind::Id),
            ColumnSpec::new("user_id", ColumnKind::Id),
            ColumnSpec::new("status", ColumnKind::Text),
            ColumnSpec::new("expected_arrival", ColumnKind::Text).cast("timestamp"),
            ColumnSpec::new("actual_arrival", ColumnKind::Text).cast("timestamp"),
        ],
    );
    config.insertable = vec!["id".into(), "user_id".into(), "expected_arrival".into()];
    config.updatable = vec!["status".into(), "actual_arrival".into()];
    config.prepare = Some(prepare_order);
    config.sanitize_ext = Some(sanitize_order);
    ResourceSpec {
        config,
        schema: FieldSchema::new(vec![
            FieldRule::new("id").required().callback(Callback::Id),
            FieldRule::new("userId")
                .required()
                .length(36, 36)
                .callback(Callback::Id),
            FieldRule::new("status")
                .required()
                .length(4, 16)
                .callback(Callback::OrderStatus),
            FieldRule::new("expectedArrival").required().length(10, 19),
            FieldRule::new("actualArrival").length(10, 19),
        ]),
    }
}

fn order_item() -> ResourceSpec {
    let mut config = config(
        "Order item",
        "order-item",
        "order_item",
        "id",
        true,
        vec![
            ColumnSpec::new("id", ColumnKind::Id),
            ColumnSpec::new("order_id", ColumnKind::Id),
            ColumnSpec::new("product_id", ColumnKind::Id),
            ColumnSpec::new("quantity", ColumnKind::Numeric),
        ],
    );
    config.updatable = vec!["quantity".into()];
    ResourceSpec {
        config,
        schema: FieldSchema::new(vec![
            FieldRule::new("id").required().callback(Callback::Id),
            FieldRule::new("orderId")
                .required()
                .length(36, 36)
                .callback(Callback::Id),
            FieldRule::new("productId")
                .required()
                .length(36, 36)
                .callback(Callback::Id),
            FieldRule::new("quantity")
                .length(1, 2)
                .callback(Callback::Quantity),
        ]),
    }
}

/// Derive the URL slug from the store name when the caller did not send one.
fn prepare_store(content: &mut Record) {
    if content.get("slug").map_or(true, Value::is_null) {
        if let Some(name) = content.get("name").and_then(Value::as_str) {
            content.insert("slug".to_string(), Value::String(slugify(name)));
        }
    }
}

fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}

/// Stamp the expected arrival three days out when absent.
fn prepare_order(content: &mut Record) {
    if content.get("expectedArrival").map_or(true, Value::is_null) {
        let eta = chrono::Utc::now() + chrono::Duration::days(3);
        content.insert(
            "expectedArrival".to_string(),
            Value::String(eta.format("%Y-%m-%d %H:%M:%S").to_string()),
        );
    }
}

/// Price travels as a decimal major-unit amount and is stored as integer
/// minor units (centavos), truncating beyond the second decimal place.
fn sanitize_product(params: &mut ParamMap) {
    for (key, value) in params.iter_mut() {
        if key != "price" {
            continue;
        }
        let major = match value {
            BindValue::Text(s) => s.trim().parse::<f64>().ok(),
            BindValue::F64(n) => Some(*n),
            BindValue::I64(n) => Some(*n as f64),
            _ => None,
        };
        if let Some(major) = major {
            *value = BindValue::I64(minor_units(major));
        }
    }
}

fn minor_units(major: f64) -> i64 {
    // Round away float noise at the sixth decimal before truncating, so
    // 19.99 -> 1999 and 10.999 -> 1099.
    ((major * 100.0 * 1e6).round() / 1e6).trunc() as i64
}

/// Order status is stored capitalized ("Pending", "Shipped", ...).
fn sanitize_order(params: &mut ParamMap) {
    for (key, value) in params.iter_mut() {
        if key != "status" {
            continue;
        }
        if let BindValue::Text(s) = value {
            *value = BindValue::Text(capitalize(s.trim()));
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minor_unit_conversion() {
        assert_eq!(minor_units(19.99), 1999);
        assert_eq!(minor_units(10.999), 1099);
        assert_eq!(minor_units(5.0), 500);
        assert_eq!(minor_units(0.01), 1);
    }

    #[test]
    fn store_slug_derives_from_name() {
        let mut content = Record::new();
        content.insert("name".to_string(), json!("Ada's Corner Store"));
        prepare_store(&mut content);
        assert_eq!(content["slug"], json!("ada-s-corner-store"));
    }

    #[test]
    fn explicit_slug_is_kept() {
        let mut content = Record::new();
        content.insert("name".to_string(), json!("Ada's Corner Store"));
        content.insert("slug".to_string(), json!("adas"));
        prepare_store(&mut content);
        assert_eq!(content["slug"], json!("adas"));
    }

    #[test]
    fn order_prepare_fills_expected_arrival_once() {
        let mut content = Record::new();
        prepare_order(&mut content);
        let first = content["expectedArrival"].clone();
        assert_eq!(first.as_str().unwrap().len(), 19);
        prepare_order(&mut content);
        assert_eq!(content["expectedArrival"], first);
    }

    #[test]
    fn status_capitalization() {
        assert_eq!(capitalize("shipped"), "Shipped");
        assert_eq!(capitalize("SHIPPED"), "Shipped");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn every_updatable_column_is_declared() {
        for spec in builtin_specs() {
            for col in &spec.config.updatable {
                assert!(
                    spec.config.column(col).is_some(),
                    "{}: {col}",
                    spec.config.path
                );
            }
            for col in &spec.config.insertable {
                assert!(
                    spec.config.column(col).is_some(),
                    "{}: {col}",
                    spec.config.path
                );
            }
        }
    }
}
