//! Domain types shared across the campaign generator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::ArtifactId;

/// Campaign objective chosen before research
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AdObjective {
    Clicks,
    #[default]
    Leads,
}

impl AdObjective {
    /// Wire value sent to the remote model
    pub fn as_str(&self) -> &'static str {
        match self {
            AdObjective::Clicks => "CLICKS",
            AdObjective::Leads => "LEADS",
        }
    }

    /// Label used in the intake form
    pub fn display_name(&self) -> &'static str {
        match self {
            AdObjective::Clicks => "Clicks",
            AdObjective::Leads => "Leads",
        }
    }

    /// Parse from user input, case-insensitive
    pub fn parse(s: &str) -> Option<AdObjective> {
        match s.trim().to_lowercase().as_str() {
            "clicks" | "click" | "traffic" => Some(AdObjective::Clicks),
            "leads" | "lead" => Some(AdObjective::Leads),
            _ => None,
        }
    }
}

impl std::fmt::Display for AdObjective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of creative asset attached to a campaign
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreativeType {
    #[default]
    Image,
    Video,
}

impl CreativeType {
    pub fn display_name(&self) -> &'static str {
        match self {
            CreativeType::Image => "Banner",
            CreativeType::Video => "Video (Veo)",
        }
    }

    /// Parse from user input, case-insensitive
    pub fn parse(s: &str) -> Option<CreativeType> {
        match s.trim().to_lowercase().as_str() {
            "image" | "banner" | "img" => Some(CreativeType::Image),
            "video" | "veo" => Some(CreativeType::Video),
            _ => None,
        }
    }
}

impl std::fmt::Display for CreativeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CreativeType::Image => write!(f, "image"),
            CreativeType::Video => write!(f, "video"),
        }
    }
}

/// Generated ad text bundle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdCopy {
    pub headline: String,
    pub primary_text: String,
    pub description: String,
    pub call_to_action: String,
}

/// Generated audience targeting bundle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationStrategy {
    pub audience_name: String,
    pub age_range: String,
    /// Empty means global reach
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub behaviors: Vec<String>,
    #[serde(default)]
    pub detailed_targeting_summary: String,
    /// Inventory items discovered during analysis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_findings: Option<Vec<String>>,
}

/// Citation returned by the remote search grounding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

/// Output of one research call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub copy: AdCopy,
    pub strategy: SegmentationStrategy,
    /// Consumed by creative generation only, never displayed
    pub visual_prompt: String,
    #[serde(default)]
    pub sources: Vec<GroundingSource>,
}

/// Reference to a stored creative artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreativeRef {
    pub creative_type: CreativeType,
    pub artifact_id: ArtifactId,
    pub mime_type: String,
}

impl CreativeRef {
    /// Display-layer locator for the artifact
    pub fn uri(&self) -> String {
        self.artifact_id.uri()
    }
}

/// Lifecycle marker of a saved campaign
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Draft,
    #[default]
    Ready,
    Active,
}

/// Pending form fields collected before research
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intake {
    pub url: String,
    pub client_name: String,
    pub objective: AdObjective,
    pub format: CreativeType,
}

/// Finalized campaign record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: String,
    pub client_name: String,
    pub url: String,
    pub objective: AdObjective,
    pub creative_type: CreativeType,
    pub creative_url: String,
    pub copy: AdCopy,
    pub strategy: SegmentationStrategy,
    pub sources: Vec<GroundingSource>,
    pub status: CampaignStatus,
    pub created_at: DateTime<Utc>,
}

impl Campaign {
    /// Build a ready campaign from a completed workflow.
    ///
    /// The only constructor: a campaign cannot exist without both an analysis
    /// and a creative artifact.
    pub fn from_workflow(
        id: String,
        intake: &Intake,
        analysis: &AnalysisResult,
        creative: &CreativeRef,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            client_name: intake.client_name.trim().to_string(),
            url: intake.url.trim().to_string(),
            objective: intake.objective,
            creative_type: creative.creative_type,
            creative_url: creative.uri(),
            copy: analysis.copy.clone(),
            strategy: analysis.strategy.clone(),
            sources: analysis.sources.clone(),
            status: CampaignStatus::Ready,
            created_at,
        }
    }

    /// Artifact backing the creative, if the url is an artifact locator
    pub fn artifact_id(&self) -> Option<ArtifactId> {
        ArtifactId::from_uri(&self.creative_url)
    }
}
