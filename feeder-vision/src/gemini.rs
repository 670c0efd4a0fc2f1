//! Cliente Gemini `generateContent`

use std::fmt;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use feeder_core::config::{
    VisionSettings, DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_VISION_TIMEOUT_SECS,
};
use feeder_core::traits::{BowlVerdict, Classifier, ClassifierError, FeederComponent};
use feeder_photonic::ImageData;
use crate::error::{VisionError, VisionResult};
use crate::prompt::BOWL_PROMPT;

/// Tamanho máximo de corpo de erro preservado nas mensagens
const ERROR_BODY_EXCERPT: usize = 200;

// ═══════════════════════════════════════════════════════════════════════════════
// FORMATO DA API
// ═══════════════════════════════════════════════════════════════════════════════

/// Corpo de `models/{model}:generateContent`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// Parte de um conteúdo: texto ou dados inline
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// Bytes em base64
    pub data: String,
}

/// Resposta de `generateContent`
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

impl GenerateContentRequest {
    /// Foto + prompt, nesta ordem
    pub fn for_image(image: &ImageData, prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: image.mime_type().to_string(),
                            data: STANDARD.encode(image.bytes()),
                        }),
                    },
                    Part {
                        text: Some(prompt.to_string()),
                        inline_data: None,
                    },
                ],
            }],
        }
    }
}

impl GenerateContentResponse {
    /// Texto concatenado do primeiro candidato
    pub fn text(&self) -> VisionResult<String> {
        let candidate = match self.candidates.first() {
            Some(candidate) => candidate,
            None => {
                let reason = self
                    .prompt_feedback
                    .as_ref()
                    .and_then(|f| f.block_reason.clone());
                return Err(match reason {
                    Some(reason) => VisionError::Blocked(reason),
                    None => VisionError::InvalidResponse("no candidates".into()),
                });
            }
        };

        let text: String = candidate
            .content
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .collect();

        if text.trim().is_empty() {
            return Err(match &candidate.finish_reason {
                Some(reason) if reason != "STOP" => VisionError::Blocked(reason.clone()),
                _ => VisionError::InvalidResponse("candidate has no text".into()),
            });
        }

        Ok(text)
    }
}

/// Interpreta status + corpo HTTP e extrai o texto do modelo
pub fn parse_response(status: u16, body: &str) -> VisionResult<String> {
    if !(200..300).contains(&status) {
        if let Ok(envelope) = serde_json::from_str::<ApiErrorEnvelope>(body) {
            let code = if envelope.error.code == 0 { status } else { envelope.error.code };
            return Err(VisionError::Api {
                code,
                message: envelope.error.message,
            });
        }
        return Err(VisionError::Status {
            status,
            body: excerpt(body),
        });
    }

    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| VisionError::InvalidResponse(e.to_string()))?;
    response.text()
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(ERROR_BODY_EXCERPT) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLASSIFICADOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Configuração do classificador Gemini
#[derive(Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    /// Base da API, sem barra final
    pub endpoint: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_VISION_TIMEOUT_SECS),
        }
    }

    /// Monta a partir da seção `[vision]` da configuração
    pub fn from_settings(settings: &VisionSettings) -> VisionResult<Self> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| VisionError::InvalidConfig("GEMINI_API_KEY is not set".into()))?;

        Ok(Self {
            api_key,
            model: settings.model.clone(),
            endpoint: settings.endpoint.clone(),
            timeout: Duration::from_secs(settings.timeout_secs.max(1)),
        })
    }

    /// URL completa do método generateContent
    pub fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

// A chave nunca aparece em logs
impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Classificador que consulta o Gemini
pub struct GeminiClassifier {
    config: GeminiConfig,
    agent: ureq::Agent,
    prompt: String,
    request_count: u64,
    last_answer: Option<String>,
}

impl GeminiClassifier {
    /// Cria classificador
    pub fn new(config: GeminiConfig) -> VisionResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(VisionError::InvalidConfig("api key is empty".into()));
        }
        if config.model.trim().is_empty() {
            return Err(VisionError::InvalidConfig("model is empty".into()));
        }
        if !config.endpoint.starts_with("http://") && !config.endpoint.starts_with("https://") {
            return Err(VisionError::InvalidConfig(format!(
                "endpoint must be http(s): {}",
                config.endpoint
            )));
        }

        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();

        Ok(Self {
            config,
            agent,
            prompt: BOWL_PROMPT.to_string(),
            request_count: 0,
            last_answer: None,
        })
    }

    /// Troca o prompt padrão
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Requisições enviadas
    pub fn request_count(&self) -> u64 {
        self.request_count
    }

    /// Última resposta textual do modelo
    pub fn last_answer(&self) -> Option<&str> {
        self.last_answer.as_deref()
    }

    /// Envia a foto e devolve o texto bruto do modelo
    pub fn ask(&mut self, image: &ImageData) -> VisionResult<String> {
        let request = GenerateContentRequest::for_image(image, &self.prompt);
        let payload = serde_json::to_string(&request)
            .map_err(|e| VisionError::InvalidResponse(format!("Failed to encode request: {}", e)))?;

        self.request_count += 1;
        tracing::debug!(model = %self.config.model, bytes = image.len(), "sending bowl photo");

        let (status, body) = match self
            .agent
            .post(&self.config.url())
            .set("Content-Type", "application/json")
            .set("x-goog-api-key", &self.config.api_key)
            .send_string(&payload)
        {
            Ok(response) => {
                let status = response.status();
                let body = response.into_string().map_err(|e| {
                    VisionError::Request(format!("Failed to read response body: {}", e))
                })?;
                (status, body)
            }
            Err(ureq::Error::Status(code, response)) => {
                (code, response.into_string().unwrap_or_default())
            }
            Err(e) => return Err(VisionError::Request(e.to_string())),
        };

        let text = parse_response(status, &body)?;
        let answer = text.trim().to_string();
        tracing::debug!(answer = %answer, "AI response");
        self.last_answer = Some(answer.clone());
        Ok(answer)
    }
}

impl fmt::Debug for GeminiClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClassifier")
            .field("config", &self.config)
            .field("request_count", &self.request_count)
            .field("last_answer", &self.last_answer)
            .finish()
    }
}

impl FeederComponent for GeminiClassifier {
    fn name(&self) -> &str {
        "GeminiClassifier"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }
}

impl Classifier for GeminiClassifier {
    type Input = ImageData;

    fn classify(&mut self, input: &Self::Input) -> Result<BowlVerdict, ClassifierError> {
        let answer = self.ask(input)?;
        Ok(BowlVerdict::from_answer(&answer))
    }
}
