/// OpenAI-compatible chat-completion provider
///
/// POSTs to `{api_url}/chat/completions` with bearer auth and returns the first
/// choice's content.
use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{ApiCompletionResponse, CompletionMessage, CompletionRequest},
    services::providers::ChatProvider,
};
use reqwest::Client as HttpClient;

#[derive(Clone)]
pub struct OpenAiProvider {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiProvider {
    pub fn new(
        api_key: Option<String>,
        api_url: String,
        model: String,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            model,
            max_tokens,
            temperature,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.openai_api_key.clone(),
            config.openai_api_url.clone(),
            config.openai_model.clone(),
            config.openai_max_tokens,
            config.openai_temperature,
        )
    }

    fn build_request(&self, messages: Vec<CompletionMessage>) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    fn extract_content(response: ApiCompletionResponse) -> AppResult<String> {
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| AppError::ExternalApi("API response contained no message".to_string()))
    }
}

#[async_trait::async_trait]
impl ChatProvider for OpenAiProvider {
    async fn complete(&self, messages: Vec<CompletionMessage>) -> AppResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::ExternalApi("OPENAI_API_KEY is not set".to_string()))?;

        let url = format!("{}/chat/completions", self.api_url.trim_end_matches('/'));
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key)
            .json(&self.build_request(messages))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "API returned status {}: {}",
                status, body
            )));
        }

        let completion: ApiCompletionResponse = response.json().await?;
        let content = Self::extract_content(completion)?;

        tracing::info!(
            model = %self.model,
            chars = content.chars().count(),
            provider = "openai",
            "Chat completion received"
        );

        Ok(content)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApiChoice, ApiChoiceMessage};

    fn create_test_provider(api_key: Option<&str>) -> OpenAiProvider {
        OpenAiProvider::new(
            api_key.map(str::to_string),
            "http://test.local/v1".to_string(),
            "gpt-4".to_string(),
            500,
            0.7,
        )
    }

    #[test]
    fn test_request_carries_model_limits_and_messages() {
        let provider = create_test_provider(Some("sk-test"));
        let request = provider.build_request(vec![
            CompletionMessage::system("preamble"),
            CompletionMessage::user("대전 중구 맛집?"),
        ]);

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["model"], "gpt-4");
        assert_eq!(body["max_tokens"], 500);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "대전 중구 맛집?");
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_extract_content_trims_first_choice() {
        let response = ApiCompletionResponse {
            choices: vec![
                ApiChoice {
                    message: ApiChoiceMessage {
                        content: Some("  성심당은 대전의 빵집입니다.\n".to_string()),
                    },
                },
                ApiChoice {
                    message: ApiChoiceMessage {
                        content: Some("second".to_string()),
                    },
                },
            ],
        };

        assert_eq!(
            OpenAiProvider::extract_content(response).unwrap(),
            "성심당은 대전의 빵집입니다."
        );
    }

    #[test]
    fn test_extract_content_without_choices_is_an_error() {
        let response: ApiCompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(
            OpenAiProvider::extract_content(response),
            Err(AppError::ExternalApi(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_sending() {
        let provider = create_test_provider(None);
        let result = provider
            .complete(vec![CompletionMessage::user("대전")])
            .await;

        match result {
            Err(AppError::ExternalApi(msg)) => assert!(msg.contains("OPENAI_API_KEY")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
