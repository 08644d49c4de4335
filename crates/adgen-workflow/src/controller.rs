//! Workflow controller: research, creative generation, save

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use adgen_core::{
    AdObjective, AiGateway, Artifact, ArtifactId, ArtifactStore, Campaign, CampaignStore,
    CreativeRef, CreativeType, Error, KeySelector, Result,
};

use crate::state::{
    ANALYSIS_FAILED_MESSAGE, Action, GENERATION_FAILED_MESSAGE, STALLED_MESSAGE,
    VALIDATION_MESSAGE, View, WorkflowState, reduce,
};

/// Holds the single in-flight slot; clears the processing flag when dropped
struct ProcessingGuard<'a> {
    _slot: MutexGuard<'a, ()>,
    state: &'a RwLock<WorkflowState>,
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        *state = reduce(&state, Action::ProcessingSettled);
    }
}

/// Time-derived campaign ids, strictly increasing within the process
#[derive(Default)]
struct CampaignIds {
    last: AtomicI64,
}

impl CampaignIds {
    fn next(&self) -> String {
        let now = Utc::now().timestamp_millis();
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or(now);
        now.max(previous + 1).to_string()
    }
}

/// Orchestrates research → creative generation → save
pub struct WorkflowController<G: AiGateway, S: CampaignStore, A: ArtifactStore> {
    gateway: Arc<G>,
    campaigns: Arc<S>,
    artifacts: Arc<A>,
    key_selector: Option<Arc<dyn KeySelector>>,
    state: RwLock<WorkflowState>,
    in_flight: Mutex<()>,
    ids: CampaignIds,
}

impl<G: AiGateway, S: CampaignStore, A: ArtifactStore> WorkflowController<G, S, A> {
    /// Create a new workflow controller
    pub fn new(gateway: Arc<G>, campaigns: Arc<S>, artifacts: Arc<A>) -> Self {
        Self {
            gateway,
            campaigns,
            artifacts,
            key_selector: None,
            state: RwLock::new(WorkflowState::default()),
            in_flight: Mutex::new(()),
            ids: CampaignIds::default(),
        }
    }

    /// Run a credential selection step before each video generation
    pub fn with_key_selector(mut self, selector: Arc<dyn KeySelector>) -> Self {
        self.key_selector = Some(selector);
        self
    }

    fn read_state(&self) -> RwLockReadGuard<'_, WorkflowState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, WorkflowState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn dispatch(&self, action: Action) {
        let mut state = self.write_state();
        *state = reduce(&state, action);
    }

    fn acquire(&self, what: &str) -> Result<ProcessingGuard<'_>> {
        let slot = self.in_flight.try_lock().map_err(|_| {
            Error::Busy(format!("Cannot {} while another step is still running", what))
        })?;
        Ok(ProcessingGuard {
            _slot: slot,
            state: &self.state,
        })
    }

    /// Current state for rendering; available while an action is in flight
    pub fn snapshot(&self) -> WorkflowState {
        self.read_state().clone()
    }

    pub fn is_processing(&self) -> bool {
        self.read_state().is_processing
    }

    pub fn set_url(&self, url: impl Into<String>) {
        self.dispatch(Action::SetUrl(url.into()));
    }

    pub fn set_client_name(&self, name: impl Into<String>) {
        self.dispatch(Action::SetClientName(name.into()));
    }

    pub fn set_objective(&self, objective: AdObjective) {
        self.dispatch(Action::SetObjective(objective));
    }

    pub fn set_format(&self, format: CreativeType) {
        self.dispatch(Action::SetFormat(format));
    }

    pub fn navigate(&self, view: View) {
        self.dispatch(Action::Navigate(view));
    }

    /// Research the intake URL.
    ///
    /// Validation failures make no remote call. On failure the wizard stays at
    /// step 1 so the scan can be retried.
    pub async fn start_research(&self) -> Result<()> {
        let intake = self.read_state().intake.clone();
        if intake.url.trim().is_empty() || intake.client_name.trim().is_empty() {
            self.dispatch(Action::ValidationFailed(VALIDATION_MESSAGE.to_string()));
            return Err(Error::Validation(VALIDATION_MESSAGE.to_string()));
        }
        let Some(url) = normalize_url(&intake.url) else {
            let message = format!("'{}' is not a valid website URL.", intake.url.trim());
            self.dispatch(Action::ValidationFailed(message.clone()));
            return Err(Error::Validation(message));
        };

        let _guard = self.acquire("start a scan")?;
        self.dispatch(Action::ResearchStarted { url: url.clone() });
        info!(%url, objective = %intake.objective, client = %intake.client_name, "research started");

        match self.gateway.analyze(&url, intake.objective).await {
            Ok(analysis) => {
                info!(audience = %analysis.strategy.audience_name, "research complete");
                self.dispatch(Action::ResearchSucceeded(analysis));
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "research failed");
                self.dispatch(Action::ResearchFailed(ANALYSIS_FAILED_MESSAGE.to_string()));
                Err(match e {
                    Error::Analysis(_) => e,
                    other => Error::Analysis(other.to_string()),
                })
            }
        }
    }

    /// Generate the creative for the current analysis.
    ///
    /// Returns `Ok(false)` without touching anything when no analysis exists.
    pub async fn generate_creative(&self) -> Result<bool> {
        let (prompt, format) = {
            let state = self.read_state();
            match &state.analysis {
                Some(analysis) => (analysis.visual_prompt.clone(), state.intake.format),
                None => return Ok(false),
            }
        };

        let _guard = self.acquire("build a creative")?;
        self.dispatch(Action::CreativeStarted);
        info!(%format, "creative generation started");

        match self.produce_creative(&prompt, format).await {
            Ok(creative) => {
                info!(artifact = %creative.artifact_id, "creative ready");
                self.dispatch(Action::CreativeSucceeded(creative));
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "creative generation failed");
                let message = match e {
                    Error::Stall(_) => STALLED_MESSAGE,
                    _ => GENERATION_FAILED_MESSAGE,
                };
                self.dispatch(Action::CreativeFailed(message.to_string()));
                Err(match e {
                    Error::Generation(_) | Error::Stall(_) => e,
                    other => Error::Generation(other.to_string()),
                })
            }
        }
    }

    async fn produce_creative(&self, prompt: &str, format: CreativeType) -> Result<CreativeRef> {
        let media = match format {
            CreativeType::Image => self.gateway.generate_image(prompt).await?,
            CreativeType::Video => {
                if let Some(selector) = &self.key_selector {
                    if !selector.has_selected_key().await {
                        selector.open_select_key().await?;
                    }
                }
                self.gateway.generate_video(prompt).await?
            }
        };

        let artifact_id = self.artifacts.put(&media.mime_type, media.bytes).await?;
        Ok(CreativeRef {
            creative_type: format,
            artifact_id,
            mime_type: media.mime_type,
        })
    }

    /// Finalize the campaign, prepend it to the store and reset the session.
    ///
    /// Returns `Ok(None)` when research or the creative is missing.
    pub async fn save_campaign(&self) -> Result<Option<Campaign>> {
        let state = self.snapshot();
        let (Some(analysis), Some(creative)) = (&state.analysis, &state.creative) else {
            return Ok(None);
        };

        let _guard = self.acquire("save")?;
        let campaign = Campaign::from_workflow(
            self.ids.next(),
            &state.intake,
            analysis,
            creative,
            Utc::now(),
        );
        self.campaigns.append(campaign.clone()).await?;
        self.dispatch(Action::CampaignSaved {
            id: campaign.id.clone(),
        });

        Ok(Some(campaign))
    }

    /// Saved campaigns, newest first
    pub async fn campaigns(&self) -> Result<Vec<Campaign>> {
        self.campaigns.list().await
    }

    /// Stored media behind a creative reference
    pub async fn artifact(&self, id: &ArtifactId) -> Result<Option<Artifact>> {
        self.artifacts.get(id).await
    }
}

/// Accept absolute http(s) URLs; scheme-less input is treated as https
pub fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return None;
    }
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let parsed = url::Url::parse(&candidate).ok()?;
    let has_host = parsed.host_str().is_some_and(|host| host.contains('.') || host == "localhost");
    if matches!(parsed.scheme(), "http" | "https") && has_host {
        Some(candidate)
    } else {
        None
    }
}
