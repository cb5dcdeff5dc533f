//! Response mapping: walking nested GraphQL JSON and reconstructing typed
//! record graphs.
//!
//! The central algorithm is [`map_node`]: given one node of response JSON
//! and a model schema, resolve each declared attribute's source value,
//! apply defaulting and transforms, enforce nullability, coerce to the
//! declared type, then recursively build any eager-loaded connections,
//! including inverse back-references into each related record's cache.
//!
//! Traversal is explicit: JSON is a [`serde_json::Value`] and every
//! lookup goes through [`dig`], which returns `None` for anything missing
//! along the path. A missing node yields a null attribute, never an error;
//! only a null value on a non-nullable attribute is reported.

use serde_json::Value;

use crate::error::MappingError;
use crate::query::Include;
use crate::record::{ConnectionValue, Record};
use crate::schema::{
    AttributeConfig, AttributeKind, AttributeValue, ModelSchema, Registry,
};
use std::sync::Arc;

/// Digs through nested objects, one key per path segment.
///
/// Returns `None` as soon as a segment is missing or the current value is
/// not an object.
///
/// # Example
///
/// ```rust
/// use shopify_orm::mapper::dig;
/// use serde_json::json;
///
/// let node = json!({"totalPriceSet": {"shopMoney": {"amount": "99.99"}}});
/// let amount = dig(&node, &["totalPriceSet", "shopMoney", "amount"]);
/// assert_eq!(amount, Some(&json!("99.99")));
/// assert_eq!(dig(&node, &["totalPriceSet", "missing"]), None);
/// ```
#[must_use]
pub fn dig<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for segment in path {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Maps one response node into a [`Record`], recursing into the requested
/// connections.
///
/// # Errors
///
/// Returns [`MappingError::NullAttribute`] when a non-nullable attribute
/// resolves to null after defaulting and transforming.
pub fn map_node(
    node: &Value,
    schema: &Arc<ModelSchema>,
    includes: &[Include],
    registry: &Registry,
) -> Result<Record, MappingError> {
    let mut record = Record::new(Arc::clone(schema));

    // Identity attributes come first; declared attributes may overwrite.
    for key in ["id", "handle"] {
        if let Some(Value::String(s)) = node.get(key) {
            record.set_attribute(key, AttributeValue::String(s.clone()));
        }
    }

    for attr in schema.attributes() {
        let raw = resolve_source(node, attr);
        let value = finish_attribute(attr, raw)?;
        record.set_attribute(attr.name(), value);
    }

    extract_connections(&mut record, node, schema, includes, registry)?;
    Ok(record)
}

/// Maps one metaobject response node.
///
/// Metaobject fields live either in an aliased single-field selection
/// (`alias: field(key: …) { value }`) or inside the generic `fields`
/// array. The aliased key wins; the `fields` scan only runs when the
/// aliased key is absent.
///
/// # Errors
///
/// Returns [`MappingError::NullAttribute`] when a non-nullable attribute
/// resolves to null.
pub fn map_metaobject_node(
    node: &Value,
    schema: &Arc<ModelSchema>,
) -> Result<Record, MappingError> {
    let mut record = Record::new(Arc::clone(schema));

    for (key, name) in [
        ("id", "id"),
        ("handle", "handle"),
        ("displayName", "display_name"),
        ("type", "type"),
    ] {
        if let Some(Value::String(s)) = node.get(key) {
            record.set_attribute(name, AttributeValue::String(s.clone()));
        }
    }

    for attr in schema.attributes() {
        let raw = metaobject_field_value(node, attr);
        let value = finish_attribute(attr, raw)?;
        record.set_attribute(attr.name(), value);
    }

    if schema.attribute("fields").is_none() {
        if let Some(fields @ Value::Array(_)) = node.get("fields") {
            record.set_attribute("fields", AttributeValue::Json(fields.clone()));
        }
    }

    Ok(record)
}

/// Resolves a metaobject attribute's raw value: aliased key first, then a
/// scan of the generic `fields` array by field key.
fn metaobject_field_value(node: &Value, attr: &AttributeConfig) -> Value {
    if let Some(aliased) = node.get(attr.name()) {
        // aliased selections wrap the value: `alias: field(key: …) { value }`
        return aliased.get("value").unwrap_or(aliased).clone();
    }
    if let Some(Value::Array(fields)) = node.get("fields") {
        for field in fields {
            if field.get("key").and_then(Value::as_str) == Some(attr.source_path()) {
                return field.get("value").cloned().unwrap_or(Value::Null);
            }
        }
    }
    Value::Null
}

/// Resolves an attribute's raw source value from a response node.
///
/// Resolution order: aliased raw-GraphQL key (digging any remaining
/// dotted segments), dotted path, then the flat key matching the
/// attribute's own name (the query aliases simple fields to that name).
fn resolve_source(node: &Value, attr: &AttributeConfig) -> Value {
    let value = if attr.raw_selection().is_some() {
        let segments: Vec<&str> = attr.source_path().split('.').collect();
        dig(node, &segments)
    } else if attr.source_path().contains('.') {
        let segments: Vec<&str> = attr.source_path().split('.').collect();
        dig(node, &segments)
    } else {
        node.get(attr.name())
    };
    value.cloned().unwrap_or(Value::Null)
}

/// Applies defaulting, transform, nullability, and coercion to a raw
/// source value.
fn finish_attribute(
    attr: &AttributeConfig,
    raw: Value,
) -> Result<AttributeValue, MappingError> {
    let mut value = raw;

    if value.is_null() {
        if let Some(default) = attr.default_value() {
            value = default.clone();
        }
    }

    // The transform receives the already-defaulted value and runs even
    // when that value is still null.
    if let Some(transform) = attr.transform_fn() {
        value = transform(value);
    }

    if value.is_null() {
        if attr.nullable() {
            return Ok(AttributeValue::Null);
        }
        return Err(MappingError::NullAttribute {
            attribute: attr.name().to_string(),
            path: attr.source_path().to_string(),
        });
    }

    Ok(coerce(attr.kind(), value))
}

/// Coerces a non-null JSON value to the declared attribute kind.
///
/// Arrays bypass scalar coercion entirely regardless of the declared
/// kind; unparseable numerics coerce to zero; datetimes fall back to the
/// raw string when they are not valid ISO-8601.
fn coerce(kind: AttributeKind, value: Value) -> AttributeValue {
    if let Value::Array(items) = value {
        return AttributeValue::Array(items);
    }
    match kind {
        AttributeKind::String => AttributeValue::String(stringify(&value)),
        AttributeKind::Integer => AttributeValue::Integer(match &value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .unwrap_or(0),
            Value::String(s) => s
                .parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
                .unwrap_or(0),
            _ => 0,
        }),
        AttributeKind::Float => AttributeValue::Float(match &value {
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            Value::String(s) => s.parse::<f64>().unwrap_or(0.0),
            _ => 0.0,
        }),
        AttributeKind::Boolean => AttributeValue::Boolean(match &value {
            Value::Bool(b) => *b,
            Value::String(s) => s == "true",
            _ => false,
        }),
        AttributeKind::DateTime => match &value {
            Value::String(s) => chrono::DateTime::parse_from_rfc3339(s).map_or_else(
                |_| AttributeValue::String(s.clone()),
                AttributeValue::DateTime,
            ),
            other => AttributeValue::String(stringify(other)),
        },
        AttributeKind::Json => AttributeValue::Json(value),
    }
}

/// Renders a JSON scalar the way `to_s` would: strings unquoted,
/// everything else as JSON text.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Builds the requested connections on a freshly mapped record.
///
/// Each related record may receive an inverse back-reference: a singular
/// inverse stores the parent directly, a plural inverse stores a
/// one-element list. Unknown inverse names and unregistered target types
/// are tolerated to support partial model definitions.
fn extract_connections(
    record: &mut Record,
    node: &Value,
    schema: &Arc<ModelSchema>,
    includes: &[Include],
    registry: &Registry,
) -> Result<(), MappingError> {
    if includes.is_empty() {
        return Ok(());
    }

    // Snapshot for inverse back-references: the parent's attributes are
    // complete at this point, its connections are not.
    let parent = record.clone();

    for include in includes {
        let Some(conn) = schema.connection(&include.name) else {
            tracing::warn!(
                connection = %include.name,
                model = %schema.name(),
                "requested connection is not declared; skipping"
            );
            continue;
        };
        let Some(target) = registry.get(conn.target()) else {
            tracing::warn!(
                target = %conn.target(),
                connection = %include.name,
                "connection target is not registered; skipping"
            );
            continue;
        };

        // Connections are aliased to their declared name in the document.
        let Some(raw) = node.get(conn.name()) else {
            continue;
        };

        let value = if let Some(Value::Array(nodes)) = raw.get("nodes") {
            let mut related = Vec::with_capacity(nodes.len());
            for child_node in nodes {
                let mut child = map_node(child_node, target, &include.children, registry)?;
                seed_inverse(&mut child, conn.inverse(), target, &parent);
                related.push(child);
            }
            ConnectionValue::Many(related)
        } else if raw.is_object() {
            let mut child = map_node(raw, target, &include.children, registry)?;
            seed_inverse(&mut child, conn.inverse(), target, &parent);
            ConnectionValue::One(Box::new(child))
        } else {
            continue;
        };

        record.store_connection(conn.name(), value);
    }

    Ok(())
}

/// Stores the parent under the child's inverse connection name, when one
/// is declared and resolvable.
fn seed_inverse(
    child: &mut Record,
    inverse: Option<&str>,
    target: &Arc<ModelSchema>,
    parent: &Record,
) {
    let Some(name) = inverse else { return };
    match target.connection(name) {
        Some(inverse_conn) if inverse_conn.singular() => {
            child.store_connection(name, ConnectionValue::One(Box::new(parent.clone())));
        }
        Some(_) => {
            child.store_connection(name, ConnectionValue::Many(vec![parent.clone()]));
        }
        None => {
            tracing::warn!(
                inverse = %name,
                model = %target.name(),
                "inverse connection is not declared on the target; cache left unset"
            );
        }
    }
}

/// Surfaces a GraphQL `errors` array as an error, untouched.
pub(crate) fn check_errors(body: &Value) -> Result<(), crate::error::OrmError> {
    match body.get("errors") {
        Some(errors) if !errors.is_null() => Err(crate::error::OrmError::Graphql {
            errors: errors.clone(),
        }),
        _ => Ok(()),
    }
}

/// Reads `data.<segments…>` from a response body, treating explicit null
/// as absent.
pub(crate) fn data_field<'a>(body: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    let mut path = Vec::with_capacity(segments.len() + 1);
    path.push("data");
    path.extend_from_slice(segments);
    dig(body, &path).filter(|v| !v.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ConnectionConfig;
    use serde_json::json;

    fn registry() -> Registry {
        let line_item = ModelSchema::builder("LineItem")
            .attribute(AttributeConfig::new("title", AttributeKind::String))
            .connection(ConnectionConfig::has_one("order", "Order").nested())
            .build();
        let order = ModelSchema::builder("Order")
            .attribute(AttributeConfig::new("name", AttributeKind::String))
            .attribute(
                AttributeConfig::new("total_price", AttributeKind::Float)
                    .path("totalPriceSet.shopMoney.amount"),
            )
            .connection(
                ConnectionConfig::has_many("line_items", "LineItem")
                    .nested()
                    .inverse_of("order"),
            )
            .build();
        let mut registry = Registry::new();
        registry.register(line_item);
        registry.register(order);
        registry
    }

    fn order_schema(registry: &Registry) -> Arc<ModelSchema> {
        Arc::clone(registry.get("Order").unwrap())
    }

    #[test]
    fn test_dotted_path_maps_nested_float() {
        let registry = registry();
        let node = json!({
            "id": "gid://shopify/Order/1",
            "name": "#1001",
            "totalPriceSet": {"shopMoney": {"amount": "99.99"}}
        });
        let record = map_node(&node, &order_schema(&registry), &[], &registry).unwrap();
        assert_eq!(record.get("total_price").unwrap().as_f64(), Some(99.99));
    }

    #[test]
    fn test_missing_path_yields_null_not_error() {
        let registry = registry();
        let node = json!({"id": "gid://shopify/Order/1", "name": "#1001"});
        let record = map_node(&node, &order_schema(&registry), &[], &registry).unwrap();
        assert!(record.get("total_price").unwrap().is_null());
    }

    #[test]
    fn test_non_nullable_null_is_a_mapping_error() {
        let schema = ModelSchema::builder("Order")
            .attribute(AttributeConfig::new("name", AttributeKind::String).not_null())
            .build();
        let registry = Registry::new();
        let node = json!({"name": null});
        let error = map_node(&node, &schema, &[], &registry).unwrap_err();
        assert_eq!(
            error,
            MappingError::NullAttribute {
                attribute: "name".to_string(),
                path: "name".to_string(),
            }
        );
    }

    #[test]
    fn test_default_substitutes_before_transform() {
        let schema = ModelSchema::builder("Order")
            .attribute(
                AttributeConfig::new("note", AttributeKind::String)
                    .default(json!("none"))
                    .transform(|v| json!(format!("note: {}", v.as_str().unwrap_or("")))),
            )
            .build();
        let registry = Registry::new();
        let record = map_node(&json!({}), &schema, &[], &registry).unwrap();
        assert_eq!(record.get("note").unwrap().as_str(), Some("note: none"));
    }

    #[test]
    fn test_transform_runs_even_on_null() {
        let schema = ModelSchema::builder("Order")
            .attribute(
                AttributeConfig::new("tag_count", AttributeKind::Integer)
                    .transform(|v| if v.is_null() { json!(0) } else { v }),
            )
            .build();
        let registry = Registry::new();
        let record = map_node(&json!({}), &schema, &[], &registry).unwrap();
        assert_eq!(record.get("tag_count").unwrap().as_i64(), Some(0));
    }

    #[test]
    fn test_raw_attribute_reads_aliased_key_then_digs() {
        let schema = ModelSchema::builder("Order")
            .attribute(
                AttributeConfig::new("note_value", AttributeKind::String)
                    .path("customNote.value")
                    .raw_graphql("customNote: metafield(key: \"note\") { value }"),
            )
            .build();
        let registry = Registry::new();
        let node = json!({"customNote": {"value": "gift"}});
        let record = map_node(&node, &schema, &[], &registry).unwrap();
        assert_eq!(record.get("note_value").unwrap().as_str(), Some("gift"));
    }

    #[test]
    fn test_boolean_coercion_accepts_literal_and_string_true() {
        assert_eq!(
            coerce(AttributeKind::Boolean, json!(true)),
            AttributeValue::Boolean(true)
        );
        assert_eq!(
            coerce(AttributeKind::Boolean, json!("true")),
            AttributeValue::Boolean(true)
        );
        assert_eq!(
            coerce(AttributeKind::Boolean, json!("yes")),
            AttributeValue::Boolean(false)
        );
        assert_eq!(
            coerce(AttributeKind::Boolean, json!(1)),
            AttributeValue::Boolean(false)
        );
    }

    #[test]
    fn test_datetime_falls_back_to_raw_string() {
        let parsed = coerce(AttributeKind::DateTime, json!("2024-05-01T12:00:00Z"));
        assert!(matches!(parsed, AttributeValue::DateTime(_)));

        let fallback = coerce(AttributeKind::DateTime, json!("last tuesday"));
        assert_eq!(fallback, AttributeValue::String("last tuesday".to_string()));
    }

    #[test]
    fn test_arrays_bypass_scalar_coercion() {
        let value = coerce(AttributeKind::String, json!(["a", "b"]));
        assert_eq!(value, AttributeValue::Array(vec![json!("a"), json!("b")]));
    }

    #[test]
    fn test_unparseable_numerics_coerce_to_zero() {
        assert_eq!(
            coerce(AttributeKind::Integer, json!("abc")),
            AttributeValue::Integer(0)
        );
        assert_eq!(
            coerce(AttributeKind::Float, json!("abc")),
            AttributeValue::Float(0.0)
        );
        assert_eq!(
            coerce(AttributeKind::Integer, json!("42")),
            AttributeValue::Integer(42)
        );
    }

    #[test]
    fn test_plural_inverse_cache_holds_parent() {
        let registry = registry();
        let node = json!({
            "id": "gid://shopify/Order/1",
            "name": "#1001",
            "line_items": {
                "nodes": [
                    {"id": "gid://shopify/LineItem/10", "title": "Hat"},
                    {"id": "gid://shopify/LineItem/11", "title": "Scarf"}
                ]
            }
        });
        let includes = Include::list(&["line_items"]);
        let record = map_node(&node, &order_schema(&registry), &includes, &registry).unwrap();

        let Some(ConnectionValue::Many(items)) = record.connection("line_items") else {
            panic!("expected eager-loaded line items");
        };
        assert_eq!(items.len(), 2);
        for item in items {
            // inverse is has_one on LineItem, so the parent is stored directly
            let Some(ConnectionValue::One(parent)) = item.connection("order") else {
                panic!("expected inverse back-reference");
            };
            assert_eq!(parent.id(), Some("gid://shopify/Order/1"));
        }
    }

    #[test]
    fn test_singular_connection_maps_plain_object() {
        let registry = registry();
        let schema = Arc::clone(registry.get("LineItem").unwrap());
        let node = json!({
            "id": "gid://shopify/LineItem/10",
            "title": "Hat",
            "order": {"id": "gid://shopify/Order/1", "name": "#1001"}
        });
        let includes = Include::list(&["order"]);
        let record = map_node(&node, &schema, &includes, &registry).unwrap();
        let Some(ConnectionValue::One(order)) = record.connection("order") else {
            panic!("expected a singular connection");
        };
        assert_eq!(order.get("name").unwrap().as_str(), Some("#1001"));
    }

    #[test]
    fn test_unknown_inverse_is_tolerated() {
        let line_item = ModelSchema::builder("LineItem")
            .attribute(AttributeConfig::new("title", AttributeKind::String))
            .build();
        let order = ModelSchema::builder("Order")
            .connection(
                ConnectionConfig::has_many("line_items", "LineItem")
                    .nested()
                    .inverse_of("missing"),
            )
            .build();
        let mut registry = Registry::new();
        registry.register(line_item);
        registry.register(Arc::clone(&order));

        let node = json!({
            "id": "gid://shopify/Order/1",
            "line_items": {"nodes": [{"id": "gid://shopify/LineItem/10", "title": "Hat"}]}
        });
        let includes = Include::list(&["line_items"]);
        let record = map_node(&node, &order, &includes, &registry).unwrap();
        let Some(ConnectionValue::Many(items)) = record.connection("line_items") else {
            panic!("expected line items");
        };
        assert!(items[0].connection("missing").is_none());
    }

    #[test]
    fn test_metaobject_aliased_key_wins_over_fields_array() {
        let schema = ModelSchema::builder("Faq")
            .metaobject("faq")
            .attribute(AttributeConfig::new("question", AttributeKind::String))
            .build();
        let node = json!({
            "id": "gid://shopify/Metaobject/1",
            "handle": "shipping",
            "displayName": "Shipping FAQ",
            "type": "faq",
            "question": {"value": "from alias"},
            "fields": [{"key": "question", "value": "from fields"}]
        });
        let record = map_metaobject_node(&node, &schema).unwrap();
        assert_eq!(record.get("question").unwrap().as_str(), Some("from alias"));
        assert_eq!(record.display_name(), Some("Shipping FAQ"));
        assert_eq!(record.type_name(), Some("faq"));
    }

    #[test]
    fn test_metaobject_falls_back_to_fields_array() {
        let schema = ModelSchema::builder("Faq")
            .metaobject("faq")
            .attribute(AttributeConfig::new("question", AttributeKind::String))
            .build();
        let node = json!({
            "id": "gid://shopify/Metaobject/1",
            "fields": [{"key": "question", "value": "from fields"}]
        });
        let record = map_metaobject_node(&node, &schema).unwrap();
        assert_eq!(record.get("question").unwrap().as_str(), Some("from fields"));
    }

    #[test]
    fn test_data_field_treats_null_as_absent() {
        let body = json!({"data": {"order": null}});
        assert!(data_field(&body, &["order"]).is_none());

        let body = json!({"data": {"order": {"id": "1"}}});
        assert!(data_field(&body, &["order"]).is_some());
    }
}
