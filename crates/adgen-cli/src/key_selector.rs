//! Credential selection on the terminal

use async_trait::async_trait;
use colored::*;
use std::sync::Arc;
use tracing::info;

use adgen_core::{Error, KeySelector, Result};
use adgen_gemini::GeminiClient;

use crate::ui::read_secret;

/// Asks for a Gemini API key when the client has none and installs it
pub struct TerminalKeySelector {
    client: Arc<GeminiClient>,
}

impl TerminalKeySelector {
    pub fn new(client: Arc<GeminiClient>) -> Self {
        Self { client }
    }

    /// Install a key obtained elsewhere; blank input is rejected
    pub fn install(&self, key: &str) -> Result<()> {
        if key.trim().is_empty() {
            return Err(Error::Authentication("No API key selected.".to_string()));
        }
        self.client.set_api_key(key);
        info!("API key selected for video generation");
        Ok(())
    }
}

#[async_trait]
impl KeySelector for TerminalKeySelector {
    async fn has_selected_key(&self) -> bool {
        self.client.has_api_key()
    }

    async fn open_select_key(&self) -> Result<()> {
        println!(
            "{} Video generation needs a paid Gemini API key.",
            "🔐".yellow()
        );
        let key = tokio::task::spawn_blocking(|| read_secret("API key:"))
            .await
            .map_err(|e| Error::Other(format!("Key prompt failed: {}", e)))??;
        self.install(&key)
    }
}
