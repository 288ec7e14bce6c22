//! Report client with bounded retries and per-attempt deadlines.
//!
//! # Responsibilities
//! - Build the chat-completion request from report data
//! - Enforce a deadline on every attempt
//! - Retry failed attempts with a growing delay
//! - Fold the final outcome into an [`ApiResponse`]

use std::time::{Duration, Instant};

use crate::config::{LlmConfig, RetryConfig, TimeoutConfig};
use crate::llm::error::LlmError;
use crate::llm::types::{ChatMessage, ChatRequest, ChatResponse};
use crate::model::{ApiResponse, ReportData};
use crate::observability::metrics;
use crate::prompt::build_report_prompt;
use crate::resilience::{with_deadline, RetryPolicy};

/// User-facing message when the last attempt timed out.
pub const TIMEOUT_MESSAGE: &str = "请求超时，请检查网络连接或稍后重试";

/// Client for the report chat-completion endpoint.
#[derive(Clone)]
pub struct ReportClient {
    http: reqwest::Client,
    config: LlmConfig,
    policy: RetryPolicy,
    attempt_timeout: Duration,
}

impl ReportClient {
    /// Create a client from the service configuration sections.
    pub fn new(
        config: LlmConfig,
        retries: &RetryConfig,
        timeouts: &TimeoutConfig,
    ) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::Setup(e.to_string()))?;

        Ok(Self {
            http,
            config,
            policy: RetryPolicy::from_config(retries),
            attempt_timeout: Duration::from_secs(timeouts.upstream_request_secs),
        })
    }

    /// Override the per-attempt deadline.
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Generate report HTML for `data`.
    ///
    /// Never fails: every outcome, including exhausted retries, is reported in-band.
    pub async fn generate_report(&self, data: &ReportData) -> ApiResponse {
        let prompt = build_report_prompt(data);
        let max_attempts = self.policy.max_attempts();
        let started = Instant::now();

        let mut attempt = 1;
        loop {
            let outcome = match with_deadline(self.attempt_timeout, self.attempt(&prompt)).await {
                Ok(result) => result,
                Err(_) => Err(LlmError::Timeout(self.attempt_timeout.as_secs())),
            };

            match outcome {
                Ok(content) => {
                    metrics::record_llm_attempt("success");
                    metrics::record_report("success", started);
                    tracing::info!(
                        attempt,
                        model = %self.config.model,
                        bytes = content.len(),
                        "Report generated"
                    );
                    return ApiResponse::ok(content);
                }
                Err(err) => {
                    metrics::record_llm_attempt(err.kind());

                    if self.policy.should_retry(attempt, err.is_retryable()) {
                        let delay = self.policy.delay_after(attempt);
                        tracing::warn!(
                            attempt,
                            max_attempts,
                            delay = ?delay,
                            error = %err,
                            "Report attempt failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    tracing::error!(attempt, max_attempts, error = %err, "Report generation failed");
                    metrics::record_report("failure", started);
                    return ApiResponse::failure(final_message(&err, attempt, max_attempts));
                }
            }
        }
    }

    async fn attempt(&self, prompt: &str) -> Result<String, LlmError> {
        if self.config.api_key.is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage::user(prompt)],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .http
            .post(&self.config.base_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "无法获取错误详情".to_string());
            return Err(LlmError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
                body,
            });
        }

        let text = response.text().await?;
        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| LlmError::Decode(e.to_string()))?;
        parsed.first_content().ok_or(LlmError::MissingContent)
    }
}

fn final_message(err: &LlmError, attempt: u32, max_attempts: u32) -> String {
    if err.is_timeout() {
        TIMEOUT_MESSAGE.to_string()
    } else {
        format!("API请求失败 (尝试 {}/{}): {}", attempt, max_attempts, err)
    }
}
