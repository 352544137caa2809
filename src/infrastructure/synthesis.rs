use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::prompts::enhance;

pub const HF_INFERENCE_URL: &str = "https://api-inference.huggingface.co";
const USER_AGENT: &str = "Easel/1.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const GUIDANCE_SCALE: f64 = 7.5;
const NUM_INFERENCE_STEPS: u32 = 20;

/// Candidate models, in priority order. The first to return a non-empty
/// payload wins.
pub const DEFAULT_MODELS: &[&str] = &[
    "black-forest-labs/FLUX.1-schnell",
    "stabilityai/stable-diffusion-xl-base-1.0",
    "runwayml/stable-diffusion-v1-5",
    "stabilityai/stable-diffusion-2-1",
];

/// Static configuration for the synthesis fallback loop.
#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    pub base_url: String,
    pub models: Vec<String>,
    pub default_credential: String,
}

impl SynthesisConfig {
    pub fn new(base_url: impl Into<String>, default_credential: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            models: DEFAULT_MODELS.iter().map(ToString::to_string).collect(),
            default_credential: default_credential.into(),
        }
    }

    pub fn with_models(mut self, models: Vec<String>) -> Self {
        if !models.is_empty() {
            self.models = models;
        }
        self
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum SynthesisError {
    #[error("prompt is required")]
    EmptyPrompt,
    #[error("no API key available")]
    NoCredential,
    #[error("the API key was rejected")]
    Unauthorized,
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("models are still loading")]
    ModelsLoading,
    #[error("all models are unavailable")]
    Unavailable,
}

/// Per-attempt failure classification. Only the most recent failure survives
/// to the final error decision.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Failure {
    Loading,
    Unauthorized,
    RateLimited,
    Other,
}

fn classify_status(status: reqwest::StatusCode) -> Failure {
    match status.as_u16() {
        503 => Failure::Loading,
        401 | 403 => Failure::Unauthorized,
        429 => Failure::RateLimited,
        _ => Failure::Other,
    }
}

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    inputs: &'a str,
    parameters: Parameters,
}

#[derive(Debug, Serialize)]
struct Parameters {
    guidance_scale: f64,
    num_inference_steps: u32,
}

/// Attempt image synthesis against each configured model in order.
///
/// The caller-supplied credential takes priority over the configured default.
/// Every attempt failure is recorded and the loop continues; the final error
/// is classified from the last failure alone, so when different models fail
/// for different reasons the reported cause is whichever happened last.
pub async fn synthesize(
    client: &reqwest::Client,
    config: &SynthesisConfig,
    prompt: &str,
    credential: Option<&str>,
) -> Result<Vec<u8>, SynthesisError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(SynthesisError::EmptyPrompt);
    }

    let credential = match credential.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => config.default_credential.trim(),
    };
    if credential.is_empty() {
        return Err(SynthesisError::NoCredential);
    }

    let enhanced = enhance(prompt);
    let body = SynthesisRequest {
        inputs: &enhanced,
        parameters: Parameters {
            guidance_scale: GUIDANCE_SCALE,
            num_inference_steps: NUM_INFERENCE_STEPS,
        },
    };

    let base_url = config.base_url.trim_end_matches('/');
    let mut last_failure = None;

    for model in &config.models {
        debug!(model, "attempting image synthesis");

        let response = match client
            .post(format!("{base_url}/models/{model}"))
            .header("User-Agent", USER_AGENT)
            .bearer_auth(credential)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!(model, error = %err, "synthesis request failed");
                last_failure = Some(Failure::Other);
                continue;
            }
        };

        let status = response.status();
        if status.is_success() {
            match response.bytes().await {
                Ok(bytes) if !bytes.is_empty() => {
                    info!(model, bytes = bytes.len(), "image synthesized");
                    return Ok(bytes.to_vec());
                }
                Ok(_) => {
                    warn!(model, "model returned an empty payload");
                    last_failure = Some(Failure::Other);
                }
                Err(err) => {
                    warn!(model, error = %err, "failed to read synthesis response body");
                    last_failure = Some(Failure::Other);
                }
            }
            continue;
        }

        let failure = classify_status(status);
        warn!(model, status = %status, "model attempt failed");
        last_failure = Some(failure);
    }

    Err(match last_failure {
        Some(Failure::Unauthorized) => SynthesisError::Unauthorized,
        Some(Failure::RateLimited) => SynthesisError::RateLimited,
        Some(Failure::Loading) => SynthesisError::ModelsLoading,
        Some(Failure::Other) | None => SynthesisError::Unavailable,
    })
}
