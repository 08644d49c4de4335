//! Storage traits for campaigns and generated media

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::types::Campaign;

const ARTIFACT_SCHEME: &str = "artifact://";

/// Content hash identifying an immutable media blob
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(String);

impl ArtifactId {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Locator handed to the display layer
    pub fn uri(&self) -> String {
        format!("{}{}", ARTIFACT_SCHEME, self.0)
    }

    /// Parse an `artifact://` locator
    pub fn from_uri(uri: &str) -> Option<ArtifactId> {
        uri.strip_prefix(ARTIFACT_SCHEME)
            .filter(|hex| !hex.is_empty())
            .map(ArtifactId::new)
    }
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stored media blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub id: ArtifactId,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Directly displayable `data:` URI
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Trait for campaign persistence
///
/// Append-only, newest first. The in-memory implementation covers the process
/// lifetime; a durable backend can be substituted behind the same interface.
#[async_trait]
pub trait CampaignStore: Send + Sync {
    /// Insert a campaign at the front of the list
    async fn append(&self, campaign: Campaign) -> Result<()>;

    /// All campaigns, most recent first
    async fn list(&self) -> Result<Vec<Campaign>>;
}

/// Trait for content-addressed media storage
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store bytes and return their content id; identical content and mime type share an id
    async fn put(&self, mime_type: &str, bytes: Vec<u8>) -> Result<ArtifactId>;

    /// Fetch a stored artifact
    async fn get(&self, id: &ArtifactId) -> Result<Option<Artifact>>;
}
