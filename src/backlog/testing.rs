use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::{BacklogDocument, BacklogStore};
use crate::error::{Result, ServiceError};

/// Fixed backlog contents; `None` simulates an unreachable store.
pub struct MemoryStore(pub Option<Vec<BacklogDocument>>);

impl MemoryStore {
    pub fn with_ids(ids: &[&str]) -> Self {
        Self(Some(ids.iter().map(|id| document(id)).collect()))
    }
}

pub fn document(id: &str) -> BacklogDocument {
    let fields: Map<String, Value> = json!({ "title": format!("Game {id}"), "completion": "Unplayed" })
        .as_object()
        .cloned()
        .unwrap_or_default();

    BacklogDocument {
        id: id.to_string(),
        fields,
    }
}

#[async_trait]
impl BacklogStore for MemoryStore {
    async fn eligible(&self) -> Result<Vec<BacklogDocument>> {
        self.0
            .clone()
            .ok_or_else(|| ServiceError::upstream("firestore", Some(503)))
    }
}
