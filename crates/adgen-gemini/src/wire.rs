//! Gemini REST request and response bodies

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part::text(prompt)],
            }],
            tools: Vec::new(),
            generation_config: None,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData {
    #[serde(default)]
    pub mime_type: Option<String>,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Tool {
    pub google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
pub(crate) struct GoogleSearch {}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImageConfig {
    pub aspect_ratio: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| content.parts.iter())
            .into_iter()
            .flatten()
    }

    /// Concatenated text of the first candidate
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .first_parts()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.trim().is_empty() { None } else { Some(text) }
    }

    /// First inline binary payload of the first candidate
    pub fn first_inline_data(&self) -> Option<&InlineData> {
        self.first_parts().find_map(|part| part.inline_data.as_ref())
    }

    pub fn grounding_chunks(&self) -> &[GroundingChunk] {
        self.candidates
            .first()
            .and_then(|candidate| candidate.grounding_metadata.as_ref())
            .map(|metadata| metadata.grounding_chunks.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GroundingChunk {
    #[serde(default)]
    pub web: Option<WebChunk>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WebChunk {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PredictLongRunningRequest {
    pub instances: Vec<VideoInstance>,
    pub parameters: VideoParameters,
}

#[derive(Debug, Serialize)]
pub(crate) struct VideoInstance {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoParameters {
    #[serde(rename = "sampleCount")]
    pub number_of_videos: u32,
    pub resolution: String,
    pub aspect_ratio: String,
}

/// Long-running operation handle
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Operation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<OperationError>,
    #[serde(default)]
    pub response: Option<OperationResponse>,
}

impl Operation {
    /// Download link of the first generated video
    pub fn video_uri(&self) -> Option<&str> {
        let response = self.response.as_ref()?;
        let from_samples = response
            .generate_video_response
            .as_ref()
            .and_then(|samples| samples.generated_samples.first());
        from_samples
            .or_else(|| response.generated_videos.first())
            .and_then(|video| video.video.as_ref())
            .and_then(|file| file.uri.as_deref())
            .filter(|uri| !uri.is_empty())
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OperationError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OperationResponse {
    #[serde(default)]
    pub generate_video_response: Option<GeneratedSamples>,
    #[serde(default)]
    pub generated_videos: Vec<GeneratedVideo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeneratedSamples {
    #[serde(default)]
    pub generated_samples: Vec<GeneratedVideo>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GeneratedVideo {
    #[serde(default)]
    pub video: Option<VideoFile>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct VideoFile {
    #[serde(default)]
    pub uri: Option<String>,
}

/// Response schema for the research call (analysis minus sources)
pub(crate) fn analysis_schema() -> Value {
    let string = json!({ "type": "STRING" });
    let string_list = json!({ "type": "ARRAY", "items": { "type": "STRING" } });

    json!({
        "type": "OBJECT",
        "properties": {
            "copy": {
                "type": "OBJECT",
                "properties": {
                    "headline": string,
                    "primaryText": string,
                    "description": string,
                    "callToAction": string
                },
                "required": ["headline", "primaryText", "description", "callToAction"]
            },
            "strategy": {
                "type": "OBJECT",
                "properties": {
                    "audienceName": string,
                    "ageRange": string,
                    "locations": string_list,
                    "interests": string_list,
                    "behaviors": string_list,
                    "detailedTargetingSummary": string,
                    "stockFindings": string_list
                },
                "required": ["audienceName", "ageRange", "interests"]
            },
            "visualPrompt": string
        },
        "required": ["copy", "strategy", "visualPrompt"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_joins_parts_of_first_candidate() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }))
        .unwrap();

        assert_eq!(response.text().as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn test_empty_response_has_no_text_or_payload() {
        let response: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(response.text(), None);
        assert!(response.first_inline_data().is_none());
        assert!(response.grounding_chunks().is_empty());
    }

    #[test]
    fn test_video_uri_from_either_shape() {
        let rest: Operation = serde_json::from_value(json!({
            "name": "operations/1",
            "done": true,
            "response": { "generateVideoResponse": { "generatedSamples": [
                { "video": { "uri": "https://files.test/v1.mp4" } }
            ] } }
        }))
        .unwrap();
        assert_eq!(rest.video_uri(), Some("https://files.test/v1.mp4"));

        let sdk: Operation = serde_json::from_value(json!({
            "name": "operations/2",
            "done": true,
            "response": { "generatedVideos": [{ "video": { "uri": "https://files.test/v2.mp4" } }] }
        }))
        .unwrap();
        assert_eq!(sdk.video_uri(), Some("https://files.test/v2.mp4"));

        let missing: Operation =
            serde_json::from_value(json!({ "name": "operations/3", "done": true })).unwrap();
        assert_eq!(missing.video_uri(), None);
    }

    #[test]
    fn test_video_parameters_wire_names() {
        let body = serde_json::to_value(PredictLongRunningRequest {
            instances: vec![VideoInstance {
                prompt: "p".to_string(),
            }],
            parameters: VideoParameters {
                number_of_videos: 1,
                resolution: "720p".to_string(),
                aspect_ratio: "9:16".to_string(),
            },
        })
        .unwrap();

        assert_eq!(
            body,
            json!({
                "instances": [{ "prompt": "p" }],
                "parameters": { "sampleCount": 1, "resolution": "720p", "aspectRatio": "9:16" }
            })
        );
    }

    #[test]
    fn test_google_search_tool_serializes_as_empty_object() {
        let tool = serde_json::to_value(Tool {
            google_search: GoogleSearch {},
        })
        .unwrap();
        assert_eq!(tool, json!({ "googleSearch": {} }));
    }
}
