use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use serde_json::{Number, Value};

use super::{Record, RecordStore, StoreError};

/// Single-table DynamoDB store.
///
/// Layout: PK = collection name, SK = "{collection}#{id}". Scans are
/// partition queries filtered in memory, so no secondary index is required.
pub struct DynamoStore {
    client: DynamoClient,
    table_name: String,
}

impl DynamoStore {
    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    fn sort_key(collection: &str, id: &str) -> String {
        format!("{}#{}", collection, id)
    }
}

fn to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(
            map.iter()
                .map(|(k, v)| (k.clone(), to_attribute(v)))
                .collect(),
        ),
    }
}

fn from_attribute(attr: &AttributeValue) -> Value {
    match attr {
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::N(n) => n
            .parse::<i64>()
            .map(|i| Value::Number(i.into()))
            .or_else(|_| {
                n.parse::<f64>()
                    .map(|f| Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null))
            })
            .unwrap_or(Value::Null),
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::L(items) => Value::Array(items.iter().map(from_attribute).collect()),
        AttributeValue::M(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), from_attribute(v)))
                .collect(),
        ),
        _ => Value::Null,
    }
}

fn item_to_record(item: &HashMap<String, AttributeValue>) -> Record {
    item.iter()
        .filter(|(key, _)| key.as_str() != "PK" && key.as_str() != "SK")
        .map(|(key, attr)| (key.clone(), from_attribute(attr)))
        .collect()
}

#[async_trait]
impl RecordStore for DynamoStore {
    async fn create(&self, collection: &str, mut fields: Record) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        fields.insert("id".to_string(), Value::String(id.clone()));

        let mut builder = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .item("PK", AttributeValue::S(collection.to_string()))
            .item("SK", AttributeValue::S(Self::sort_key(collection, &id)));

        for (key, value) in &fields {
            builder = builder.item(key, to_attribute(value));
        }

        builder
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("DynamoDB put_item error: {}", e)))?;

        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Record>, StoreError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(collection.to_string()))
            .key("SK", AttributeValue::S(Self::sort_key(collection, id)))
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("DynamoDB get_item error: {}", e)))?;

        Ok(result.item().map(item_to_record))
    }

    async fn update(&self, collection: &str, id: &str, patch: Record) -> Result<(), StoreError> {
        if patch.is_empty() {
            return Ok(());
        }

        let mut set_exprs = Vec::new();
        let mut remove_exprs = Vec::new();
        let mut expr_names = HashMap::new();
        let mut expr_values = HashMap::new();

        for (idx, (key, value)) in patch.iter().enumerate() {
            let name = format!("#f{}", idx);
            expr_names.insert(name.clone(), key.clone());
            if value.is_null() {
                remove_exprs.push(name);
            } else {
                let placeholder = format!(":v{}", idx);
                set_exprs.push(format!("{} = {}", name, placeholder));
                expr_values.insert(placeholder, to_attribute(value));
            }
        }

        let mut expression = String::new();
        if !set_exprs.is_empty() {
            expression.push_str(&format!("SET {}", set_exprs.join(", ")));
        }
        if !remove_exprs.is_empty() {
            if !expression.is_empty() {
                expression.push(' ');
            }
            expression.push_str(&format!("REMOVE {}", remove_exprs.join(", ")));
        }

        let mut builder = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(collection.to_string()))
            .key("SK", AttributeValue::S(Self::sort_key(collection, id)))
            .condition_expression("attribute_exists(PK)")
            .update_expression(expression);

        for (k, v) in expr_names {
            builder = builder.expression_attribute_names(k, v);
        }
        for (k, v) in expr_values {
            builder = builder.expression_attribute_values(k, v);
        }

        builder.send().await.map_err(|e| {
            let service_err = e.as_service_error();
            if service_err
                .map(|s| s.is_conditional_check_failed_exception())
                .unwrap_or(false)
            {
                StoreError::Missing {
                    collection: collection.to_string(),
                    id: id.to_string(),
                }
            } else {
                StoreError::Backend(format!("DynamoDB update_item error: {}", e))
            }
        })?;

        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(collection.to_string()))
            .key("SK", AttributeValue::S(Self::sort_key(collection, id)))
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("DynamoDB delete_item error: {}", e)))?;

        Ok(())
    }

    async fn scan(
        &self,
        collection: &str,
        filters: &[(&str, Value)],
    ) -> Result<Vec<Record>, StoreError> {
        let result = self
            .client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression("PK = :pk")
            .expression_attribute_values(":pk", AttributeValue::S(collection.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("DynamoDB query error: {}", e)))?;

        let records = result
            .items()
            .iter()
            .map(item_to_record)
            .filter(|record| {
                filters
                    .iter()
                    .all(|(field, expected)| record.get(*field) == Some(expected))
            })
            .collect();

        Ok(records)
    }
}
