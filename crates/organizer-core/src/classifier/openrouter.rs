use super::payload::parse_categorizations;
use super::Classifier;
use crate::config::AppConfig;
use crate::error::Error;
use crate::model::{Categorization, Entry};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

/// Classifier backed by an OpenAI-compatible chat completion endpoint
/// (OpenRouter by default) returning structured JSON.
pub struct OpenRouterClassifier {
    model: String,
    api_key: String,
    api_base_url: String,
    allowed_roots: Vec<String>,
    http_client: reqwest::blocking::Client,
}

impl OpenRouterClassifier {
    pub fn new(
        model: impl Into<String>,
        api_key: impl Into<String>,
        api_base_url: impl Into<String>,
        allowed_roots: Vec<String>,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(Error::InvalidConfig("model must not be empty".to_string()));
        }
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "openrouter_api_key must not be empty".to_string(),
            ));
        }

        let http_client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            model,
            api_key,
            api_base_url: api_base_url.into(),
            allowed_roots,
            http_client,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| Error::InvalidConfig("MODEL is not set".to_string()))?;
        let api_key = config
            .openrouter_api_key
            .clone()
            .ok_or_else(|| Error::InvalidConfig("OPENROUTER_API_KEY is not set".to_string()))?;
        Self::new(
            model,
            api_key,
            config.api_base_url.clone(),
            config.allowed_roots.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn system_prompt(&self) -> String {
        let roots = serde_json::to_string(&self.allowed_roots).unwrap_or_default();
        format!(
            "You are an AI assistant that categorizes files and folders. Your task is to suggest \
             appropriate locations for organizing content.\n\n\
             Given a list of files and folders, categorize them into a logical directory structure. \
             The categorization should be based on:\n\
             1. File/folder name patterns\n\
             2. Potential media type (anime, movies, tv shows, music, software, etc.)\n\
             3. Any identifiable genres, artists, or series\n\n\
             Organize only into the following root folders:\n{}\n\n\
             For files, the target path does not include the name of the file.\n\
             Be creative but logical in your categorization.",
            roots
        )
    }

    fn request_body(&self, items: &[Entry]) -> Result<Value, Error> {
        Ok(json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": self.system_prompt() },
                { "role": "user", "content": format!("Data: {}", serde_json::to_string(items)?) }
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "categorizations",
                    "strict": true,
                    "schema": response_schema()
                }
            }
        }))
    }
}

impl Classifier for OpenRouterClassifier {
    fn classify(&self, items: &[Entry]) -> Result<Vec<Categorization>, Error> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        info!("Categorizing {} items with {}", items.len(), self.model);
        let url = format!("{}/chat/completions", self.api_base_url.trim_end_matches('/'));
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(items)?)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Classifier(format!(
                "{} returned {}: {}",
                url,
                status,
                truncate(&body, 500)
            )));
        }

        let completion: Value = response.json()?;
        let payload = extract_payload(&completion)?;
        let results = parse_categorizations(&payload, items)?;
        debug!("Classifier returned {} categorizations", results.len());
        Ok(results)
    }
}

fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "elements": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "source": {
                            "type": "object",
                            "properties": {
                                "name": {
                                    "type": "string",
                                    "description": "The original source name, i.e. 'Nichijou'"
                                },
                                "type": {
                                    "type": "string",
                                    "enum": ["file", "folder"]
                                }
                            },
                            "required": ["name", "type"],
                            "additionalProperties": false
                        },
                        "targets": {
                            "type": "array",
                            "items": { "type": "string" },
                            "description": "Target paths, e.g. 'Movies/Nichijou' or 'Anime/Nichijou'. For files, the target path does not include the name of the file."
                        }
                    },
                    "required": ["source", "targets"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["elements"],
        "additionalProperties": false
    })
}

/// Pull the JSON document out of a chat completion, tolerating a markdown
/// code fence around it.
fn extract_payload(completion: &Value) -> Result<Value, Error> {
    let content = completion
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Classifier("completion has no message content".to_string()))?;

    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    Ok(serde_json::from_str(unfenced.trim())?)
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
