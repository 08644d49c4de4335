//! Process-lifetime campaign list

use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::RwLock;
use tracing::info;

use adgen_core::{Campaign, CampaignStore, Result};

/// In-memory campaign store, newest first
#[derive(Default)]
pub struct InMemoryCampaignStore {
    campaigns: RwLock<VecDeque<Campaign>>,
}

impl InMemoryCampaignStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CampaignStore for InMemoryCampaignStore {
    async fn append(&self, campaign: Campaign) -> Result<()> {
        let mut campaigns = self.campaigns.write().await;
        info!(id = %campaign.id, client = %campaign.client_name, "campaign saved");
        campaigns.push_front(campaign);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Campaign>> {
        Ok(self.campaigns.read().await.iter().cloned().collect())
    }
}
