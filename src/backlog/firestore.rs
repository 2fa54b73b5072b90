//! Firestore REST client for the backlog collection.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{BacklogDocument, BacklogStore};
use crate::config::BacklogConfig;
use crate::error::{Result, ServiceError};
use crate::sources::send;

const SERVICE: &str = "firestore";

/// A Firestore typed value as returned by the REST API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
enum FirestoreValue {
    NullValue(serde::de::IgnoredAny),
    BooleanValue(bool),
    IntegerValue(String),
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(LatLng),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Deserialize)]
struct LatLng {
    #[serde(default)]
    latitude: f64,
    #[serde(default)]
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ArrayValue {
    #[serde(default)]
    values: Vec<FirestoreValue>,
}

#[derive(Debug, Deserialize)]
struct MapValue {
    #[serde(default)]
    fields: BTreeMap<String, FirestoreValue>,
}

impl From<FirestoreValue> for Value {
    fn from(value: FirestoreValue) -> Self {
        match value {
            FirestoreValue::NullValue(_) => Value::Null,
            FirestoreValue::BooleanValue(b) => Value::Bool(b),
            // int64 travels as a string
            FirestoreValue::IntegerValue(s) => s.parse::<i64>().map(Value::from).unwrap_or(Value::String(s)),
            FirestoreValue::DoubleValue(d) => json!(d),
            FirestoreValue::TimestampValue(s)
            | FirestoreValue::StringValue(s)
            | FirestoreValue::BytesValue(s)
            | FirestoreValue::ReferenceValue(s) => Value::String(s),
            FirestoreValue::GeoPointValue(p) => json!({ "latitude": p.latitude, "longitude": p.longitude }),
            FirestoreValue::ArrayValue(a) => Value::Array(a.values.into_iter().map(Value::from).collect()),
            FirestoreValue::MapValue(m) => Value::Object(decode_fields(m.fields)),
        }
    }
}

fn decode_fields(fields: BTreeMap<String, FirestoreValue>) -> Map<String, Value> {
    fields.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
}

#[derive(Debug, Deserialize)]
struct Document {
    name: String,
    #[serde(default)]
    fields: BTreeMap<String, FirestoreValue>,
}

#[derive(Debug, Deserialize)]
struct RunQueryItem {
    document: Option<Document>,
}

impl From<Document> for BacklogDocument {
    fn from(doc: Document) -> Self {
        let id = doc.name.rsplit('/').next().unwrap_or_default().to_string();
        Self {
            id,
            fields: decode_fields(doc.fields),
        }
    }
}

pub struct FirestoreStore {
    client: reqwest::Client,
    config: BacklogConfig,
}

impl FirestoreStore {
    pub fn new(client: reqwest::Client, config: BacklogConfig) -> Self {
        Self { client, config }
    }

    fn run_query_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents:runQuery",
            self.config.base_url.trim_end_matches('/'),
            self.config.project_id
        )
    }

    pub(crate) fn query_body(&self) -> Value {
        let excluded: Vec<Value> = self
            .config
            .excluded_completion
            .iter()
            .map(|v| json!({ "stringValue": v }))
            .collect();

        json!({
            "structuredQuery": {
                "from": [{ "collectionId": self.config.collection }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": "completion" },
                        "op": "NOT_IN",
                        "value": { "arrayValue": { "values": excluded } }
                    }
                }
            }
        })
    }
}

#[async_trait]
impl BacklogStore for FirestoreStore {
    #[tracing::instrument(skip(self), fields(collection = %self.config.collection))]
    async fn eligible(&self) -> Result<Vec<BacklogDocument>> {
        let mut request = self.client.post(self.run_query_url()).json(&self.query_body());
        if let Some(key) = &self.config.api_key {
            request = request.query(&[("key", key)]);
        }

        let items: Vec<RunQueryItem> = send(SERVICE, request).await?.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse firestore query response");
            ServiceError::upstream(SERVICE, None)
        })?;

        Ok(items
            .into_iter()
            .filter_map(|item| item.document)
            .map(BacklogDocument::from)
            .collect())
    }
}
