use std::time::Duration;

use async_openai::{
    config::{Config, OpenAIConfig},
    error::{ApiError, OpenAIError},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    Error, ProviderSettings,
    llms::{BackgroundJobProvider, JobHandle, JobProgress},
};

/// Timeout for a single HTTP call (submission or one status query), not for the whole job.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Runs prompts as OpenAI Responses API background jobs (`background: true`) with web search enabled.
pub struct OpenAiBackground {
    http: reqwest::Client,
    config: OpenAIConfig,
    model: String,
}

impl OpenAiBackground {
    pub fn new(settings: &ProviderSettings) -> Result<Self, Error> {
        let config = OpenAIConfig::new()
            .with_api_key(settings.api_key.clone())
            .with_api_base(settings.api_base.clone());
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            config,
            model: settings.model.clone(),
        })
    }
}

#[derive(Debug, Serialize)]
struct CreateBackgroundResponse<'a> {
    model: &'a str,
    input: &'a str,
    background: bool,
    tools: [Tool; 1],
}

#[derive(Debug, Serialize)]
struct Tool {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// The parts of a Responses API object that we need.
#[derive(Debug, Deserialize)]
struct ResponseObject {
    id: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    output: Option<Vec<OutputItem>>,
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    error: Option<ResponseError>,
    #[serde(default)]
    incomplete_details: Option<IncompleteDetails>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Option<Vec<OutputContent>>,
}

#[derive(Debug, Deserialize)]
struct OutputContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IncompleteDetails {
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

impl ResponseObject {
    /// All `output_text` parts of the response's messages, in order.
    fn collected_output_text(&self) -> Option<String> {
        if let Some(text) = self.output_text.as_ref().filter(|t| !t.trim().is_empty()) {
            return Some(text.clone());
        }

        let text: String = self
            .output
            .iter()
            .flatten()
            .flat_map(|item| item.content.iter().flatten())
            .filter(|content| content.kind == "output_text")
            .filter_map(|content| content.text.as_deref())
            .collect();

        if text.trim().is_empty() { None } else { Some(text) }
    }

    fn failure_reason(&self, status: &str) -> String {
        let error = self.error.as_ref().and_then(|e| match (&e.code, &e.message) {
            (Some(code), Some(message)) => Some(format!("{}: {}", code, message)),
            (None, Some(message)) => Some(message.clone()),
            (Some(code), None) => Some(code.clone()),
            (None, None) => None,
        });
        let incomplete = self
            .incomplete_details
            .as_ref()
            .and_then(|d| d.reason.clone())
            .map(|reason| format!("incomplete: {}", reason));

        error
            .or(incomplete)
            .unwrap_or_else(|| format!("job ended with status '{}'", status))
    }

    fn into_progress(self) -> JobProgress {
        let status = self.status.clone().unwrap_or_else(|| "unknown".to_string());
        match status.as_str() {
            "completed" | "succeeded" => match self.collected_output_text() {
                Some(output_text) => JobProgress::Succeeded { output_text },
                None => JobProgress::Failed {
                    reason: "job completed without any output text".to_string(),
                },
            },
            "failed" | "cancelled" | "incomplete" => JobProgress::Failed {
                reason: self.failure_reason(&status),
            },
            _ => JobProgress::Pending { status },
        }
    }
}

/// Deserializes a successful response body, or turns an error body into a provider error.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, Error> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        return match serde_json::from_slice::<ApiErrorBody>(&body) {
            Ok(wrapped) => Err(OpenAIError::ApiError(wrapped.error).into()),
            Err(_) => Err(Error::UnexpectedResponse(format!(
                "HTTP {}: {}",
                status,
                String::from_utf8_lossy(&body)
            ))),
        };
    }

    serde_json::from_slice::<T>(&body).map_err(|e| OpenAIError::JSONDeserialize(e).into())
}

#[async_trait]
impl BackgroundJobProvider for OpenAiBackground {
    async fn submit(&self, prompt: &str) -> Result<JobHandle, Error> {
        let request = CreateBackgroundResponse {
            model: &self.model,
            input: prompt,
            background: true,
            tools: [Tool {
                kind: "web_search_preview",
            }],
        };

        let response = self
            .http
            .post(self.config.url("/responses"))
            .headers(self.config.headers())
            .json(&request)
            .send()
            .await?;
        let created: ResponseObject = read_json(response).await?;

        if created.id.trim().is_empty() {
            return Err(Error::UnexpectedResponse("background job has an empty id".to_string()));
        }
        tracing::debug!(
            "[job: {}] Created with status {}",
            created.id,
            created.status.as_deref().unwrap_or("unknown")
        );
        Ok(JobHandle::new(created.id))
    }

    async fn progress(&self, job: &JobHandle) -> Result<JobProgress, Error> {
        let response = self
            .http
            .get(self.config.url(&format!("/responses/{}", job.job_id)))
            .headers(self.config.headers())
            .send()
            .await?;
        let current: ResponseObject = read_json(response).await?;
        Ok(current.into_progress())
    }
}

#[cfg(test)]
mod tests {
    use httptest::{Expectation, Server, all_of, matchers::*, responders::*};
    use serde_json::json;

    use super::*;

    fn provider_for(server: &Server) -> OpenAiBackground {
        OpenAiBackground::new(&ProviderSettings {
            api_key: "sk-test".to_string(),
            api_base: server.url_str("/v1"),
            model: "o3-deep-research".to_string(),
        })
        .unwrap()
    }

    fn parse(value: serde_json::Value) -> JobProgress {
        serde_json::from_value::<ResponseObject>(value).unwrap().into_progress()
    }

    #[tokio::test]
    async fn test_submit_sends_background_request() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("POST", "/v1/responses"),
                request::headers(contains(("authorization", "Bearer sk-test"))),
                request::body(json_decoded(eq(json!({
                    "model": "o3-deep-research",
                    "input": "Research Paris",
                    "background": true,
                    "tools": [{"type": "web_search_preview"}],
                })))),
            ])
            .respond_with(json_encoded(json!({"id": "resp_123", "status": "queued"}))),
        );

        let job = provider_for(&server).submit("Research Paris").await.unwrap();
        assert_eq!(job.job_id, "resp_123");
    }

    #[tokio::test]
    async fn test_submit_surfaces_api_errors() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/v1/responses")).respond_with(
                status_code(401).body(
                    json!({"error": {"message": "Incorrect API key provided", "type": "invalid_request_error", "param": null, "code": "invalid_api_key"}})
                        .to_string(),
                ),
            ),
        );

        let error = provider_for(&server).submit("Research Paris").await.unwrap_err();
        assert!(matches!(error, Error::ProviderError(OpenAIError::ApiError(_))));
        assert!(error.to_string().contains("Incorrect API key provided"));
    }

    #[tokio::test]
    async fn test_submit_non_json_error_body() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/v1/responses"))
                .respond_with(status_code(502).body("bad gateway")),
        );

        let error = provider_for(&server).submit("Research Paris").await.unwrap_err();
        assert!(matches!(error, Error::UnexpectedResponse(ref msg) if msg.contains("502")));
    }

    #[tokio::test]
    async fn test_progress_completed() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/v1/responses/resp_123")).respond_with(
                json_encoded(json!({
                    "id": "resp_123",
                    "status": "completed",
                    "output": [
                        {"type": "web_search_call", "id": "ws_1", "status": "completed"},
                        {"type": "message", "role": "assistant", "content": [
                            {"type": "output_text", "text": "{\"ccas_status\": \"Coordinated\"}", "annotations": []}
                        ]}
                    ]
                })),
            ),
        );

        let provider = provider_for(&server);
        let progress = provider
            .progress(&JobHandle::new("resp_123".to_string()))
            .await
            .unwrap();
        assert_eq!(
            progress,
            JobProgress::Succeeded {
                output_text: "{\"ccas_status\": \"Coordinated\"}".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_progress_query_error() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/v1/responses/resp_404")).respond_with(
                status_code(404).body(
                    json!({"error": {"message": "No response found with id 'resp_404'.", "type": "invalid_request_error", "param": null, "code": null}})
                        .to_string(),
                ),
            ),
        );

        let result = provider_for(&server)
            .progress(&JobHandle::new("resp_404".to_string()))
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_pending_statuses() {
        assert_eq!(
            parse(json!({"id": "r", "status": "queued", "output": []})),
            JobProgress::Pending {
                status: "queued".to_string()
            }
        );
        assert_eq!(
            parse(json!({"id": "r", "status": "in_progress", "output": null})),
            JobProgress::Pending {
                status: "in_progress".to_string()
            }
        );
    }

    #[test]
    fn test_failed_statuses_carry_reason() {
        assert_eq!(
            parse(json!({"id": "r", "status": "failed", "error": {"code": "server_error", "message": "boom"}})),
            JobProgress::Failed {
                reason: "server_error: boom".to_string()
            }
        );
        assert_eq!(
            parse(json!({"id": "r", "status": "incomplete", "incomplete_details": {"reason": "max_output_tokens"}})),
            JobProgress::Failed {
                reason: "incomplete: max_output_tokens".to_string()
            }
        );
        assert_eq!(
            parse(json!({"id": "r", "status": "cancelled"})),
            JobProgress::Failed {
                reason: "job ended with status 'cancelled'".to_string()
            }
        );
    }

    #[test]
    fn test_completed_without_text_is_failure() {
        assert!(matches!(
            parse(json!({"id": "r", "status": "completed", "output": [{"type": "reasoning", "summary": []}]})),
            JobProgress::Failed { .. }
        ));
    }

    #[test]
    fn test_top_level_output_text_is_accepted() {
        assert_eq!(
            parse(json!({"id": "r", "status": "succeeded", "output_text": "{}"})),
            JobProgress::Succeeded {
                output_text: "{}".to_string()
            }
        );
    }
}
