//! Content-addressed media storage

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use adgen_core::{Artifact, ArtifactId, ArtifactStore, Result};

/// In-memory artifact store keyed by MD5 of the mime type and content
#[derive(Default)]
pub struct InMemoryArtifactStore {
    artifacts: RwLock<HashMap<ArtifactId, Artifact>>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content id over the mime type, a NUL separator, then the bytes
    pub fn content_id(mime_type: &str, bytes: &[u8]) -> ArtifactId {
        let mut context = md5::Context::new();
        context.consume(mime_type.as_bytes());
        context.consume([0u8]);
        context.consume(bytes);
        ArtifactId::new(format!("{:x}", context.compute()))
    }

    pub async fn count(&self) -> usize {
        self.artifacts.read().await.len()
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn put(&self, mime_type: &str, bytes: Vec<u8>) -> Result<ArtifactId> {
        let id = Self::content_id(mime_type, &bytes);
        let mut artifacts = self.artifacts.write().await;
        if artifacts.contains_key(&id) {
            debug!(%id, "artifact already stored");
            return Ok(id);
        }

        debug!(%id, size = bytes.len(), mime_type, "artifact stored");
        artifacts.insert(
            id.clone(),
            Artifact {
                id: id.clone(),
                mime_type: mime_type.to_string(),
                bytes,
            },
        );
        Ok(id)
    }

    async fn get(&self, id: &ArtifactId) -> Result<Option<Artifact>> {
        Ok(self.artifacts.read().await.get(id).cloned())
    }
}
