use crate::domain::errors::ClassifierError;
use crate::domain::sentiment::{Classification, SentimentClassifier, SentimentLabel};
use crate::infrastructure::classifier::truncate_chars;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://router.huggingface.co/hf-inference/models";
pub const DEFAULT_MODEL: &str = "ProsusAI/finbert";

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

/// Asks the pipeline to cut input at the model's token limit (512 for BERT)
/// instead of failing. The character cap applied before sending is only a pre-trim.
#[derive(Debug, Serialize)]
struct InferenceParameters {
    truncation: bool,
}

fn request_body(text: &str) -> Result<Vec<u8>, ClassifierError> {
    let request = InferenceRequest {
        inputs: text,
        parameters: InferenceParameters { truncation: true },
    };
    serde_json::to_vec(&request).map_err(|e| ClassifierError::Backend {
        reason: format!("Failed to encode request: {e}"),
    })
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

/// Text classification responses come either nested per input or flat.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

#[derive(Debug, Deserialize)]
struct InferenceErrorBody {
    error: String,
}

/// Pretrained text classifier served by the Hugging Face inference API.
pub struct HuggingFaceClassifier {
    client: ClientWithMiddleware,
    endpoint: String,
    model: String,
    api_token: Option<String>,
    max_input_chars: usize,
}

impl HuggingFaceClassifier {
    pub fn new(
        client: ClientWithMiddleware,
        api_url: &str,
        model: impl Into<String>,
        api_token: Option<String>,
        max_input_chars: usize,
    ) -> Self {
        let model = model.into();
        Self {
            client,
            endpoint: format!("{}/{}", api_url.trim_end_matches('/'), model),
            model,
            api_token: api_token.filter(|t| !t.trim().is_empty()),
            max_input_chars,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SentimentClassifier for HuggingFaceClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        let text = truncate_chars(text.trim(), self.max_input_chars);
        if text.is_empty() {
            return Err(ClassifierError::EmptyInput);
        }

        let body = request_body(text)?;

        let mut request = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| ClassifierError::Backend {
            reason: e.to_string(),
        })?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| ClassifierError::Backend {
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            let reason = serde_json::from_slice::<InferenceErrorBody>(&bytes)
                .map(|b| b.error)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            return Err(ClassifierError::Backend {
                reason: format!("{} returned {}: {}", self.model, status, reason),
            });
        }

        let classification = parse_response(&bytes)?;
        debug!(
            "{} classified text as {} ({:.4})",
            self.model, classification.label, classification.confidence
        );
        Ok(classification)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Picks the top-scoring label out of an inference response.
fn parse_response(bytes: &[u8]) -> Result<Classification, ClassifierError> {
    let response: InferenceResponse =
        serde_json::from_slice(bytes).map_err(|e| ClassifierError::MalformedResponse {
            reason: e.to_string(),
        })?;

    let scores = match response {
        InferenceResponse::Nested(mut per_input) => {
            if per_input.is_empty() {
                Vec::new()
            } else {
                per_input.swap_remove(0)
            }
        }
        InferenceResponse::Flat(scores) => scores,
    };

    let top = scores
        .into_iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .ok_or_else(|| ClassifierError::MalformedResponse {
            reason: "no labels in response".to_string(),
        })?;

    let label: SentimentLabel = top.label.parse()?;
    Classification::new(label, top.score)
}
