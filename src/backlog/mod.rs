use async_trait::async_trait;
use rand::Rng;
use serde_json::{Map, Value};

use crate::error::{Result, ServiceError};

pub mod firestore;

#[cfg(test)]
pub(crate) mod testing;


/// Document fields plus `documentId`.
pub type BacklogEntry = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct BacklogDocument {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl BacklogDocument {
    pub fn into_entry(self) -> BacklogEntry {
        let mut entry = self.fields;
        entry.insert("documentId".to_string(), Value::String(self.id));
        entry
    }
}

/// A remote collection of backlog games.
#[async_trait]
pub trait BacklogStore: Send + Sync {
    /// Every document whose `completion` is not one of the terminal values.
    async fn eligible(&self) -> Result<Vec<BacklogDocument>>;
}

/// Picks one document uniformly at random.
pub fn pick_random<R: Rng + ?Sized>(mut documents: Vec<BacklogDocument>, rng: &mut R) -> Result<BacklogEntry> {
    if documents.is_empty() {
        return Err(ServiceError::NoEligibleGame);
    }

    let index = rng.gen_range(0..documents.len());
    Ok(documents.swap_remove(index).into_entry())
}

#[tracing::instrument(skip_all)]
pub async fn random_game(store: &dyn BacklogStore) -> Result<BacklogEntry> {
    let documents = store.eligible().await?;
    tracing::debug!(eligible = documents.len(), "queried backlog");

    pick_random(documents, &mut rand::thread_rng())
}
