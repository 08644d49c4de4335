//! AI gateway trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{AdObjective, AnalysisResult};
use crate::Result;

/// Raw media returned by a creative generation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedMedia {
    pub mime_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl GeneratedMedia {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// Trait for generative AI backends (e.g., Gemini)
///
/// The gateway is the narrow adapter the workflow controller talks to. Each
/// operation is a single logical request; no operation retries on failure.
#[async_trait]
pub trait AiGateway: Send + Sync {
    /// Research a business URL and produce copy, targeting and a visual prompt.
    ///
    /// Either every required field is present or the call fails with
    /// [`crate::Error::Analysis`].
    async fn analyze(&self, url: &str, objective: AdObjective) -> Result<AnalysisResult>;

    /// Generate a single square still image for the prompt
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedMedia>;

    /// Generate a vertical video for the prompt, waiting on the remote job
    async fn generate_video(&self, prompt: &str) -> Result<GeneratedMedia>;
}

/// Selection of the credential required before video generation
#[async_trait]
pub trait KeySelector: Send + Sync {
    /// Whether a usable credential is already selected
    async fn has_selected_key(&self) -> bool;

    /// Ask the environment to select a credential
    async fn open_select_key(&self) -> Result<()>;
}
