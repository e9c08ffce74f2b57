//! OpenAI provider using the Chat Completions API.
//!
//! Text prompts go out as a plain user message; image prompts send the image
//! as a data URL in the user message content array.

use super::provider::{merge_extra, Completion, ImageInput, LlmProvider, ProviderError};
use crate::config::ExtraParams;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// OpenAI provider using Chat Completions API.
pub struct OpenAiProvider {
    name: &'static str,
    api_key: String,
    model: String,
    vision_model: Option<String>,
    client: reqwest::Client,
    endpoint: String,
    extra: ExtraParams,
}

impl OpenAiProvider {
    pub fn new(
        api_key: &str,
        model: &str,
        vision_model: &str,
        endpoint: &str,
        extra: ExtraParams,
    ) -> Self {
        Self {
            name: "openai",
            api_key: api_key.to_string(),
            model: model.to_string(),
            vision_model: Some(vision_model.to_string()),
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            extra,
        }
    }

    /// A text-only client for an OpenAI-compatible endpoint (used by DeepSeek).
    pub fn text_only(
        name: &'static str,
        api_key: &str,
        model: &str,
        endpoint: &str,
        extra: ExtraParams,
    ) -> Self {
        Self {
            name,
            api_key: api_key.to_string(),
            model: model.to_string(),
            vision_model: None,
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            extra,
        }
    }

    fn build_body(&self, model: &str, content: MessageContent) -> serde_json::Value {
        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content,
            }],
        };
        let mut body = serde_json::to_value(&request).unwrap_or_default();
        merge_extra(&mut body, &self.extra);
        body
    }

    async fn send(&self, body: &serde_json::Value) -> Result<Completion, ProviderError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::new(format!("{} request failed: {e}", self.name)))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ProviderError::http(
                format!("{} HTTP {status}: {text}", self.name),
                status.as_u16(),
            ));
        }

        let chat_resp: ChatResponse = resp.json().await.map_err(|e| {
            ProviderError::new(format!("Failed to parse {} response: {e}", self.name))
        })?;

        chat_resp.into_completion(self.name)
    }
}

// --- Request types ---

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: MessageContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

impl ChatResponse {
    fn into_completion(self, provider: &str) -> Result<Completion, ProviderError> {
        let text = self
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                ProviderError::new(format!(
                    "{provider} returned empty choices array, no content generated"
                ))
            })?;

        Ok(Completion {
            text,
            total_tokens: self.usage.map(|u| u.total_tokens),
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn supports_vision(&self) -> bool {
        self.vision_model.is_some()
    }

    async fn complete_text(&self, prompt: &str) -> Result<Completion, ProviderError> {
        let body = self.build_body(&self.model, MessageContent::Text(prompt.to_string()));
        self.send(&body).await
    }

    async fn complete_vision(
        &self,
        prompt: &str,
        image: &ImageInput,
    ) -> Result<Completion, ProviderError> {
        let Some(vision_model) = &self.vision_model else {
            return Err(ProviderError::new(format!(
                "{} does not accept image input",
                self.name
            )));
        };

        let body = self.build_body(
            vision_model,
            MessageContent::Parts(vec![
                ContentPart::Text {
                    text: prompt.to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image.data_url(),
                    },
                },
            ]),
        );
        self.send(&body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider(extra: ExtraParams) -> OpenAiProvider {
        OpenAiProvider::new(
            "sk-test",
            "gpt-3.5-turbo",
            "gpt-4o",
            "http://localhost/v1/chat/completions",
            extra,
        )
    }

    #[test]
    fn test_text_body_shape() {
        let p = provider(ExtraParams::new());
        let body = p.build_body("gpt-3.5-turbo", MessageContent::Text("hi".into()));
        assert_eq!(
            body,
            json!({
                "model": "gpt-3.5-turbo",
                "messages": [{"role": "user", "content": "hi"}]
            })
        );
    }

    #[test]
    fn test_vision_body_shape_with_extra() {
        let mut extra = ExtraParams::new();
        extra.insert("max_tokens".into(), json!(512));
        let p = provider(extra);
        let image = ImageInput::from_bytes(&[1, 2, 3], "image/png");
        let body = p.build_body(
            "gpt-4o",
            MessageContent::Parts(vec![
                ContentPart::Text {
                    text: "what is this".into(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image.data_url(),
                    },
                },
            ]),
        );
        assert_eq!(body["model"], json!("gpt-4o"));
        assert_eq!(body["max_tokens"], json!(512));
        let parts = &body["messages"][0]["content"];
        assert_eq!(parts[0], json!({"type": "text", "text": "what is this"}));
        assert_eq!(parts[1]["type"], json!("image_url"));
        assert_eq!(
            parts[1]["image_url"]["url"],
            json!("data:image/png;base64,AQID")
        );
    }

    #[test]
    fn test_response_with_usage() {
        let resp: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"content": "pong"}}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 4}
        }))
        .unwrap();
        let completion = resp.into_completion("openai").unwrap();
        assert_eq!(completion.text, "pong");
        assert_eq!(completion.total_tokens, Some(4));
    }

    #[test]
    fn test_response_empty_choices() {
        let resp: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        let err = resp.into_completion("openai").unwrap_err();
        assert!(err.message.contains("empty choices"));
        assert!(err.status_code.is_none());
    }

    #[test]
    fn test_text_only_client_has_no_vision() {
        let p = OpenAiProvider::text_only(
            "deepseek",
            "sk-test",
            "deepseek-chat",
            "http://localhost/chat/completions",
            ExtraParams::new(),
        );
        assert!(!p.supports_vision());
        assert_eq!(p.name(), "deepseek");
    }
}
