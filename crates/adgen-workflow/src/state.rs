//! Workflow state and its pure transition function
//!
//! All session state lives in one [`WorkflowState`] value. The controller never
//! edits it field by field; it dispatches an [`Action`] and replaces the state
//! with the result of [`reduce`]. Remote calls happen outside the reducer.

use serde::{Deserialize, Serialize};

use adgen_core::{AdObjective, AnalysisResult, CreativeRef, CreativeType, Intake};

pub const VALIDATION_MESSAGE: &str = "URL and Client Name are required.";
pub const ANALYSIS_FAILED_MESSAGE: &str = "Error analyzing site. Verify API key.";
pub const GENERATION_FAILED_MESSAGE: &str = "Generation error. Try again.";
pub const STALLED_MESSAGE: &str = "Video generation timed out. Try again.";

/// Top-level screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    #[default]
    Dashboard,
    StrategyLab,
    AdFactory,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::StrategyLab => "Strategy Lab",
            View::AdFactory => "Ad Factory",
        }
    }

    /// Both wizard screens show the three-step workspace
    pub fn is_workspace(&self) -> bool {
        matches!(self, View::StrategyLab | View::AdFactory)
    }
}

/// Wizard step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Step {
    #[default]
    Research,
    Review,
    Creative,
}

impl Step {
    pub const ALL: [Step; 3] = [Step::Research, Step::Review, Step::Creative];

    pub fn number(&self) -> u8 {
        match self {
            Step::Research => 1,
            Step::Review => 2,
            Step::Creative => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Step::Research => "Market Intelligence",
            Step::Review => "Strategic Review",
            Step::Creative => "Ad Creative",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// User-facing message produced by the last action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Complete session state of the workflow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub view: View,
    pub step: Step,
    pub is_processing: bool,
    pub intake: Intake,
    pub analysis: Option<AnalysisResult>,
    pub creative: Option<CreativeRef>,
    pub notice: Option<Notice>,
}

impl WorkflowState {
    pub fn can_generate_creative(&self) -> bool {
        self.analysis.is_some()
    }

    pub fn can_save(&self) -> bool {
        self.analysis.is_some() && self.creative.is_some()
    }
}

/// State transitions
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetUrl(String),
    SetClientName(String),
    SetObjective(AdObjective),
    SetFormat(CreativeType),
    Navigate(View),
    ValidationFailed(String),
    /// Carries the normalized URL that replaces the typed one
    ResearchStarted { url: String },
    ResearchSucceeded(AnalysisResult),
    ResearchFailed(String),
    CreativeStarted,
    CreativeSucceeded(CreativeRef),
    CreativeFailed(String),
    /// The in-flight guard was released
    ProcessingSettled,
    CampaignSaved { id: String },
}

/// Pure transition function
pub fn reduce(state: &WorkflowState, action: Action) -> WorkflowState {
    let mut next = state.clone();
    match action {
        Action::SetUrl(url) => next.intake.url = url,
        Action::SetClientName(name) => next.intake.client_name = name,
        Action::SetObjective(objective) => next.intake.objective = objective,
        Action::SetFormat(format) => next.intake.format = format,
        Action::Navigate(view) => next.view = view,
        Action::ValidationFailed(message) => next.notice = Some(Notice::error(message)),
        Action::ResearchStarted { url } => {
            next.intake.url = url;
            next.analysis = None;
            next.creative = None;
            next.step = Step::Research;
            next.is_processing = true;
            next.notice = None;
        }
        Action::ResearchSucceeded(analysis) => {
            next.analysis = Some(analysis);
            next.step = Step::Review;
            next.is_processing = false;
            next.notice = Some(Notice::info("Scan completed. Ready to build creative assets."));
        }
        Action::ResearchFailed(message) => {
            next.step = Step::Research;
            next.is_processing = false;
            next.notice = Some(Notice::error(message));
        }
        Action::CreativeStarted => {
            next.is_processing = true;
            next.notice = None;
        }
        Action::CreativeSucceeded(creative) => {
            next.creative = Some(creative);
            next.step = Step::Creative;
            next.is_processing = false;
            next.notice = Some(Notice::info("Creative ready. Save to deploy the campaign."));
        }
        Action::CreativeFailed(message) => {
            next.is_processing = false;
            next.notice = Some(Notice::error(message));
        }
        Action::ProcessingSettled => next.is_processing = false,
        Action::CampaignSaved { id } => {
            next = WorkflowState {
                notice: Some(Notice::info(format!("Campaign {} saved.", id))),
                ..WorkflowState::default()
            };
        }
    }
    next
}
