//! Gemini client implementation

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::RwLock;
use tracing::{debug, info, warn};

use adgen_core::{
    AdCopy, AdObjective, AiGateway, AnalysisResult, Error, GeneratedMedia, GroundingSource,
    Result, SegmentationStrategy,
};

use crate::config::GeminiConfig;
use crate::wire::{
    GenerateContentRequest, GenerateContentResponse, GenerationConfig, GoogleSearch, ImageConfig,
    Operation, PredictLongRunningRequest, Tool, VideoInstance, VideoParameters, analysis_schema,
};

const API_KEY_HEADER: &str = "x-goog-api-key";
const DEFAULT_IMAGE_MIME: &str = "image/png";
const DEFAULT_VIDEO_MIME: &str = "video/mp4";

/// Gemini client
pub struct GeminiClient {
    config: GeminiConfig,
    api_key: RwLock<Option<String>>,
    client: Client,
}

/// Analysis payload as returned by the model, before grounding is attached
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisPayload {
    copy: AdCopy,
    strategy: SegmentationStrategy,
    visual_prompt: String,
}

impl GeminiClient {
    /// Image aspect ratio for feed banners
    pub const IMAGE_ASPECT_RATIO: &'static str = "1:1";
    /// Video aspect ratio for stories and reels
    pub const VIDEO_ASPECT_RATIO: &'static str = "9:16";
    pub const VIDEO_RESOLUTION: &'static str = "720p";

    /// Create a new Gemini client from configuration
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let mut builder = Client::builder();
        // Zero disables the per-request timeout
        if !config.request_timeout.is_zero() {
            builder = builder.timeout(config.request_timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            api_key: RwLock::new(config.api_key.clone()),
            config,
            client,
        })
    }

    /// Create a new Gemini client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = GeminiConfig::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Whether a credential is available for remote calls
    pub fn has_api_key(&self) -> bool {
        self.read_key().is_some()
    }

    /// Install or replace the credential used for remote calls
    pub fn set_api_key(&self, key: impl Into<String>) {
        let key = key.into();
        let mut guard = self.api_key.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(key.trim().to_string()).filter(|k| !k.is_empty());
    }

    fn read_key(&self) -> Option<String> {
        self.api_key
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn require_key(&self) -> Result<String> {
        self.read_key().ok_or_else(|| {
            Error::Authentication(
                "No Gemini API key configured. Set GEMINI_API_KEY or API_KEY.".to_string(),
            )
        })
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.config.api_url, model, method)
    }

    /// Send a request and decode the JSON body
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
                return Err(Error::Authentication(format!(
                    "Gemini rejected the API key ({}): {}",
                    status, error_text
                )));
            }
            return Err(Error::Other(format!(
                "Gemini API request failed with status {}: {}",
                status, error_text
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let key = self.require_key()?;
        let request = self
            .client
            .post(url)
            .header(API_KEY_HEADER, key)
            .json(body);
        self.send_json(request).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let key = self.require_key()?;
        let request = self.client.get(url).header(API_KEY_HEADER, key);
        self.send_json(request).await
    }

    fn build_analysis_prompt(url: &str, objective: AdObjective) -> String {
        format!(
            "Perform a deep marketing analysis of this URL: {url}.\n\
            The goal is a Meta Ads campaign for {objective}.\n\
            1. Identify the specific stock or services offered (e.g., if it's a car dealer, what types of cars?).\n\
            2. Define the perfect Meta Ads segmentation (Interests, Behaviors, Demographics).\n\
            3. Create ad copies that highlight specific inventory items found.\n\
            4. Suggest a visual prompt for the creative."
        )
    }

    /// Parse the model's JSON text into an analysis, rejecting partial results
    pub(crate) fn parse_analysis(text: &str, sources: Vec<GroundingSource>) -> Result<AnalysisResult> {
        let json = strip_code_fence(text);
        let payload: AnalysisPayload = serde_json::from_str(json)
            .map_err(|e| Error::Analysis(format!("Malformed analysis JSON: {}", e)))?;

        let required = [
            ("copy.headline", payload.copy.headline.as_str()),
            ("copy.primaryText", payload.copy.primary_text.as_str()),
            ("copy.description", payload.copy.description.as_str()),
            ("copy.callToAction", payload.copy.call_to_action.as_str()),
            ("strategy.audienceName", payload.strategy.audience_name.as_str()),
            ("strategy.ageRange", payload.strategy.age_range.as_str()),
            ("visualPrompt", payload.visual_prompt.as_str()),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(Error::Analysis(format!("Required field '{}' is empty", field)));
        }

        Ok(AnalysisResult {
            copy: payload.copy,
            strategy: payload.strategy,
            visual_prompt: payload.visual_prompt,
            sources,
        })
    }

    fn grounding_sources(response: &GenerateContentResponse) -> Vec<GroundingSource> {
        response
            .grounding_chunks()
            .iter()
            .filter_map(|chunk| chunk.web.as_ref())
            .filter_map(|web| {
                let uri = web.uri.as_deref().unwrap_or_default().trim();
                if uri.is_empty() {
                    return None;
                }
                let title = web
                    .title
                    .as_deref()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .unwrap_or("Source");
                Some(GroundingSource {
                    title: title.to_string(),
                    uri: uri.to_string(),
                })
            })
            .collect()
    }

    async fn submit_video_job(&self, prompt: &str) -> Result<Operation> {
        let body = PredictLongRunningRequest {
            instances: vec![VideoInstance {
                prompt: format!("Ad video: {}. High engagement, 4k.", prompt),
            }],
            parameters: VideoParameters {
                number_of_videos: 1,
                resolution: Self::VIDEO_RESOLUTION.to_string(),
                aspect_ratio: Self::VIDEO_ASPECT_RATIO.to_string(),
            },
        };
        let url = self.model_url(&self.config.video_model, "predictLongRunning");
        let operation: Operation = self.post_json(&url, &body).await?;
        if operation.name.is_empty() && !operation.done {
            return Err(Error::Generation(
                "Video job was accepted without an operation name".to_string(),
            ));
        }
        Ok(operation)
    }

    /// Poll the operation until it reports done or the poll budget runs out
    async fn wait_for_operation(&self, mut operation: Operation) -> Result<Operation> {
        let policy = self.config.poll;
        let mut attempt = 0;
        debug!(
            operation = %operation.name,
            attempts = policy.max_attempts,
            budget = ?policy.total_budget(),
            "polling video job"
        );

        while !operation.done {
            attempt += 1;
            if attempt > policy.max_attempts {
                warn!(operation = %operation.name, attempts = policy.max_attempts, "video job stalled");
                return Err(Error::Stall(format!(
                    "Video job {} did not finish after {} status checks",
                    operation.name, policy.max_attempts
                )));
            }

            let delay = policy.delay_for(attempt);
            debug!(operation = %operation.name, attempt, ?delay, "video job submitted, waiting");
            tokio::time::sleep(delay).await;

            let url = format!("{}/{}", self.config.api_url, operation.name);
            let name = operation.name.clone();
            operation = self.get_json(&url).await?;
            if operation.name.is_empty() {
                operation.name = name;
            }
        }

        if let Some(error) = &operation.error {
            return Err(Error::Generation(format!(
                "Video job failed ({}): {}",
                error.code.unwrap_or_default(),
                error.message.as_deref().unwrap_or("no message")
            )));
        }

        info!(operation = %operation.name, checks = attempt, "video job complete");
        Ok(operation)
    }

    async fn download(&self, uri: &str) -> Result<GeneratedMedia> {
        let key = self.require_key()?;
        debug!("downloading generated video");
        let response = self
            .client
            .get(uri)
            .header(API_KEY_HEADER, key)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Generation(format!(
                "Video download failed with status {}",
                response.status()
            )));
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .filter(|value| value.starts_with("video/"))
            .unwrap_or(DEFAULT_VIDEO_MIME)
            .to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if bytes.is_empty() {
            return Err(Error::Generation("Video download was empty".to_string()));
        }

        Ok(GeneratedMedia::new(mime_type, bytes.to_vec()))
    }
}

/// Keep authentication and stall failures, fold everything else into `wrap`
fn reclassify(err: Error, wrap: fn(String) -> Error) -> Error {
    match err {
        Error::Authentication(_) | Error::Stall(_) | Error::Analysis(_) | Error::Generation(_) => err,
        other => wrap(other.to_string()),
    }
}

/// Models sometimes wrap JSON in a markdown fence when search is enabled
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[async_trait]
impl AiGateway for GeminiClient {
    async fn analyze(&self, url: &str, objective: AdObjective) -> Result<AnalysisResult> {
        if url.trim().is_empty() {
            return Err(Error::Validation("URL is required for analysis".to_string()));
        }

        let mut request = GenerateContentRequest::text(Self::build_analysis_prompt(url, objective));
        request.tools = vec![Tool {
            google_search: GoogleSearch {},
        }];
        request.generation_config = Some(GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(analysis_schema()),
            ..Default::default()
        });

        info!(%url, %objective, model = %self.config.analysis_model, "requesting market analysis");
        let endpoint = self.model_url(&self.config.analysis_model, "generateContent");
        let response: GenerateContentResponse = self
            .post_json(&endpoint, &request)
            .await
            .map_err(|e| reclassify(e, Error::Analysis))?;

        let text = response
            .text()
            .ok_or_else(|| Error::Analysis("Empty response from Gemini".to_string()))?;
        let sources = Self::grounding_sources(&response);
        let analysis = Self::parse_analysis(&text, sources)?;

        info!(
            audience = %analysis.strategy.audience_name,
            sources = analysis.sources.len(),
            "market analysis complete"
        );
        Ok(analysis)
    }

    async fn generate_image(&self, prompt: &str) -> Result<GeneratedMedia> {
        if prompt.trim().is_empty() {
            return Err(Error::Validation("Visual prompt is empty".to_string()));
        }

        let mut request = GenerateContentRequest::text(format!(
            "Professional Meta Ad: {}. Cinematic lighting, commercial quality.",
            prompt
        ));
        request.generation_config = Some(GenerationConfig {
            image_config: Some(ImageConfig {
                aspect_ratio: Self::IMAGE_ASPECT_RATIO.to_string(),
            }),
            ..Default::default()
        });

        info!(model = %self.config.image_model, "requesting banner image");
        let endpoint = self.model_url(&self.config.image_model, "generateContent");
        let response: GenerateContentResponse = self
            .post_json(&endpoint, &request)
            .await
            .map_err(|e| reclassify(e, Error::Generation))?;

        let inline = response
            .first_inline_data()
            .ok_or_else(|| Error::Generation("No image payload in response".to_string()))?;
        let bytes = STANDARD
            .decode(inline.data.trim())
            .map_err(|e| Error::Generation(format!("Image payload is not valid base64: {}", e)))?;
        if bytes.is_empty() {
            return Err(Error::Generation("Image payload is empty".to_string()));
        }

        let mime_type = inline
            .mime_type
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string());
        Ok(GeneratedMedia::new(mime_type, bytes))
    }

    async fn generate_video(&self, prompt: &str) -> Result<GeneratedMedia> {
        if prompt.trim().is_empty() {
            return Err(Error::Validation("Visual prompt is empty".to_string()));
        }

        info!(model = %self.config.video_model, "submitting video job");
        let result = async {
            let operation = self.submit_video_job(prompt).await?;
            let operation = self.wait_for_operation(operation).await?;
            let uri = operation
                .video_uri()
                .ok_or_else(|| Error::Generation("Finished video job has no download link".to_string()))?
                .to_string();
            self.download(&uri).await
        }
        .await;

        match result {
            Ok(media) => {
                info!(bytes = media.bytes.len(), "video creative downloaded");
                Ok(media)
            }
            Err(e) => {
                warn!(error = %e, "video generation failed");
                Err(reclassify(e, Error::Generation))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
    }

    #[test]
    fn test_parse_analysis_rejects_blank_required_field() {
        let text = r#"{
            "copy": {"headline": " ", "primaryText": "p", "description": "d", "callToAction": "c"},
            "strategy": {"audienceName": "a", "ageRange": "18-65", "interests": []},
            "visualPrompt": "v"
        }"#;
        let err = GeminiClient::parse_analysis(text, vec![]).unwrap_err();
        assert!(matches!(err, Error::Analysis(msg) if msg.contains("copy.headline")));
    }

    #[test]
    fn test_parse_analysis_rejects_missing_section() {
        let text = r#"{"copy": {"headline": "h", "primaryText": "p", "description": "d", "callToAction": "c"}}"#;
        let err = GeminiClient::parse_analysis(text, vec![]).unwrap_err();
        assert!(matches!(err, Error::Analysis(_)));
    }

    #[test]
    fn test_reclassify_keeps_auth_errors() {
        let err = reclassify(Error::Authentication("no key".to_string()), Error::Analysis);
        assert!(matches!(err, Error::Authentication(_)));

        let err = reclassify(Error::Network("reset".to_string()), Error::Generation);
        assert!(matches!(err, Error::Generation(msg) if msg.contains("reset")));
    }

    #[test]
    fn test_prompt_mentions_objective() {
        let prompt = GeminiClient::build_analysis_prompt("https://dealer.test", AdObjective::Leads);
        assert!(prompt.contains("https://dealer.test"));
        assert!(prompt.contains("Meta Ads campaign for LEADS"));
    }
}
