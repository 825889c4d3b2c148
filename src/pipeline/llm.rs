//! Text generation: the generator seam and its LLM-backed implementation.
//!
//! The assembler only sees [`SectionGenerator`]. [`LlmGenerator`] implements
//! it on top of an `edgequake-llm` provider; tests use scripted fakes. All
//! prompt text lives in [`crate::prompts`].
//!
//! ## Retry Strategy
//!
//! HTTP 429 / 503 errors from LLM APIs are transient and frequent on free
//! tiers. Exponential backoff (`retry_backoff_ms * 2^attempt`) with 500 ms
//! base and 3 retries waits 500 ms → 1 s → 2 s before giving up on a call.
//! The delay saturates and never exceeds [`MAX_BACKOFF_MS`].
//! Each attempt is bounded by `api_timeout_secs`. Retrying is this module's
//! job only; the assembler treats any returned error as fatal.

use crate::config::ReportConfig;
use crate::error::GenerationError;
use crate::plan::SectionKey;
use crate::prompts::{
    references_prompt, section_prompt, REFERENCES_SYSTEM_PROMPT, SECTION_SYSTEM_PROMPT,
};
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, warn};

/// Upper bound for a single backoff delay.
pub const MAX_BACKOFF_MS: u64 = 60_000;

/// Delay before retry number `attempt` (1-based): `base * 2^(attempt-1)`.
fn backoff_ms(base: u64, attempt: u32) -> u64 {
    let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
    base.saturating_mul(factor).min(MAX_BACKOFF_MS)
}

/// Everything a generator needs to write one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRequest {
    pub report_title: String,
    pub key: SectionKey,
    pub section_title: String,
    pub target_words: u32,
    /// Tail of the previously generated text.
    pub context: String,
}

/// Text returned by one generator call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub duration_ms: u64,
    pub retries: u8,
}

impl Generation {
    /// A generation with only text, for generators without usage data.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Produces section bodies and the reference list.
pub trait SectionGenerator: Send + Sync {
    fn generate_section(
        &self,
        request: &SectionRequest,
    ) -> impl Future<Output = Result<Generation, GenerationError>> + Send;

    fn generate_references(
        &self,
        report_title: &str,
    ) -> impl Future<Output = Result<Generation, GenerationError>> + Send;
}

/// [`SectionGenerator`] backed by an `edgequake-llm` provider.
pub struct LlmGenerator {
    provider: Arc<dyn LLMProvider>,
    system_prompt: String,
    temperature: f32,
    max_tokens: usize,
    max_retries: u32,
    retry_backoff_ms: u64,
    api_timeout_secs: u64,
}

impl LlmGenerator {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &ReportConfig) -> Self {
        Self {
            provider,
            system_prompt: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| SECTION_SYSTEM_PROMPT.to_string()),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_retries: config.max_retries,
            retry_backoff_ms: config.retry_backoff_ms,
            api_timeout_secs: config.api_timeout_secs,
        }
    }

    fn options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        }
    }

    /// One chat completion with retry, backoff and a per-attempt timeout.
    async fn complete(
        &self,
        label: &str,
        system: &str,
        user: String,
    ) -> Result<Generation, GenerationError> {
        let start = Instant::now();
        let messages = vec![ChatMessage::system(system), ChatMessage::user(user)];
        let options = self.options();
        let limit = Duration::from_secs(self.api_timeout_secs);

        let mut last_err = GenerationError::Api {
            retries: 0,
            detail: "no attempt made".to_string(),
        };

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = backoff_ms(self.retry_backoff_ms, attempt);
                warn!(
                    "{}: retry {}/{} after {}ms",
                    label, attempt, self.max_retries, backoff
                );
                sleep(Duration::from_millis(backoff)).await;
            }

            match timeout(limit, self.provider.chat(&messages, Some(&options))).await {
                Ok(Ok(response)) => {
                    let duration = start.elapsed();
                    debug!(
                        "{}: {} input tokens, {} output tokens, {:?}",
                        label, response.prompt_tokens, response.completion_tokens, duration
                    );
                    if response.content.trim().is_empty() {
                        return Err(GenerationError::EmptyResponse);
                    }
                    return Ok(Generation {
                        text: response.content,
                        input_tokens: response.prompt_tokens,
                        output_tokens: response.completion_tokens,
                        duration_ms: duration.as_millis() as u64,
                        retries: u8::try_from(attempt).unwrap_or(u8::MAX),
                    });
                }
                Ok(Err(e)) => {
                    warn!("{}: attempt {} failed: {}", label, attempt + 1, e);
                    last_err = GenerationError::Api {
                        retries: u8::try_from(self.max_retries).unwrap_or(u8::MAX),
                        detail: e.to_string(),
                    };
                }
                Err(_) => {
                    warn!(
                        "{}: attempt {} timed out after {}s",
                        label,
                        attempt + 1,
                        self.api_timeout_secs
                    );
                    last_err = GenerationError::Timeout {
                        secs: self.api_timeout_secs,
                    };
                }
            }
        }

        Err(last_err)
    }
}

impl SectionGenerator for LlmGenerator {
    async fn generate_section(
        &self,
        request: &SectionRequest,
    ) -> Result<Generation, GenerationError> {
        let label = format!("Section {}", request.key);
        self.complete(&label, &self.system_prompt, section_prompt(request))
            .await
    }

    async fn generate_references(&self, report_title: &str) -> Result<Generation, GenerationError> {
        self.complete(
            "References",
            REFERENCES_SYSTEM_PROMPT,
            references_prompt(report_title),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use edgequake_llm::{LLMResponse, LlmError};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::time::Instant as TokioInstant;

    #[test]
    fn generation_from_text() {
        let g = Generation::text("hello");
        assert_eq!(g.text, "hello");
        assert_eq!(g.input_tokens, 0);
        assert_eq!(g.retries, 0);
    }

    #[test]
    fn section_request_serialises_key() {
        let request = SectionRequest {
            report_title: "Smart Irrigation System".into(),
            key: SectionKey::new(2, 3),
            section_title: "Bibliometric analysis".into(),
            target_words: 150,
            context: String::new(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["key"]["chapter"], 2);
        assert_eq!(json["target_words"], 150);
    }

    #[test]
    fn backoff_doubles_then_saturates() {
        assert_eq!(backoff_ms(500, 1), 500);
        assert_eq!(backoff_ms(500, 2), 1000);
        assert_eq!(backoff_ms(500, 3), 2000);
        assert_eq!(backoff_ms(500, 64), MAX_BACKOFF_MS);
        assert_eq!(backoff_ms(u64::MAX, 200), MAX_BACKOFF_MS);
        assert_eq!(backoff_ms(0, 30), 0);
    }

    enum Step {
        Reply(&'static str),
        Fail,
        Hang,
    }

    /// Provider that plays back a fixed script and records when it was called.
    struct ScriptedProvider {
        steps: Mutex<VecDeque<Step>>,
        calls: Mutex<Vec<TokioInstant>>,
    }

    impl ScriptedProvider {
        fn new(steps: Vec<Step>) -> Arc<Self> {
            Arc::new(Self {
                steps: Mutex::new(steps.into()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<TokioInstant> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-model"
        }

        fn max_context_length(&self) -> usize {
            8192
        }

        async fn complete(&self, prompt: &str) -> edgequake_llm::Result<LLMResponse> {
            self.chat(&[ChatMessage::user(prompt)], None).await
        }

        async fn complete_with_options(
            &self,
            prompt: &str,
            options: &CompletionOptions,
        ) -> edgequake_llm::Result<LLMResponse> {
            self.chat(&[ChatMessage::user(prompt)], Some(options)).await
        }

        async fn chat(
            &self,
            _messages: &[ChatMessage],
            _options: Option<&CompletionOptions>,
        ) -> edgequake_llm::Result<LLMResponse> {
            self.calls.lock().unwrap().push(TokioInstant::now());
            let step = self.steps.lock().unwrap().pop_front();
            match step {
                Some(Step::Reply(text)) => {
                    Ok(LLMResponse::new(text, "scripted-model").with_usage(12, 34))
                }
                Some(Step::Fail) | None => Err(LlmError::ApiError("503 Service Unavailable".into())),
                Some(Step::Hang) => std::future::pending().await,
            }
        }
    }

    fn generator(provider: Arc<ScriptedProvider>, max_retries: u32) -> LlmGenerator {
        let config = ReportConfig::builder()
            .max_retries(max_retries)
            .retry_backoff_ms(500)
            .api_timeout_secs(60)
            .build()
            .unwrap();
        LlmGenerator::new(provider, &config)
    }

    fn gaps(calls: &[TokioInstant]) -> Vec<Duration> {
        calls.windows(2).map(|w| w[1] - w[0]).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn retries_with_doubling_backoff_then_succeeds() {
        let provider = ScriptedProvider::new(vec![
            Step::Fail,
            Step::Fail,
            Step::Fail,
            Step::Reply("1.1 Overview\nSoil moisture drives the pump."),
        ]);
        let generation = generator(provider.clone(), 3)
            .generate_references("Smart Irrigation System")
            .await
            .unwrap();

        assert_eq!(generation.retries, 3);
        assert_eq!(generation.input_tokens, 12);
        assert_eq!(generation.output_tokens, 34);
        assert!(generation.text.starts_with("1.1 Overview"));

        let gaps = gaps(&provider.calls());
        let expected = [500, 1000, 2000].map(Duration::from_millis);
        assert_eq!(gaps.len(), expected.len());
        for (gap, want) in gaps.iter().zip(expected) {
            assert!(*gap >= want && *gap < want + Duration::from_millis(50), "{gaps:?}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_report_api_error() {
        let provider = ScriptedProvider::new(vec![Step::Fail, Step::Fail, Step::Fail]);
        let err = generator(provider.clone(), 2)
            .generate_references("Smart Irrigation System")
            .await
            .unwrap_err();

        match err {
            GenerationError::Api { retries, detail } => {
                assert_eq!(retries, 2);
                assert!(detail.contains("503"), "{detail}");
            }
            other => panic!("expected Api, got {other:?}"),
        }
        assert_eq!(provider.calls().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_attempts_time_out() {
        let provider = ScriptedProvider::new(vec![Step::Hang, Step::Hang]);
        let start = TokioInstant::now();
        let err = generator(provider.clone(), 1)
            .generate_references("Smart Irrigation System")
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::Timeout { secs: 60 }), "{err:?}");
        assert_eq!(provider.calls().len(), 2);
        // Two 60 s attempts plus one 500 ms backoff.
        assert!(start.elapsed() >= Duration::from_millis(120_500));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_then_success_counts_the_retry() {
        let provider = ScriptedProvider::new(vec![Step::Hang, Step::Reply("Recovered text")]);
        let generation = generator(provider, 3)
            .generate_references("Smart Irrigation System")
            .await
            .unwrap();
        assert_eq!(generation.retries, 1);
        assert_eq!(generation.text, "Recovered text");
    }

    #[tokio::test(start_paused = true)]
    async fn blank_reply_is_an_empty_response() {
        let provider = ScriptedProvider::new(vec![Step::Reply("  \n\t ")]);
        let err = generator(provider.clone(), 3)
            .generate_references("Smart Irrigation System")
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::EmptyResponse), "{err:?}");
        assert_eq!(provider.calls().len(), 1);
    }
}
