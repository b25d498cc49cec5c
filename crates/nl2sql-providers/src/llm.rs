// Archivo: llm.rs
// Propósito: contrato del modelo de lenguaje y cliente HTTP para APIs de
// chat-completions compatibles con OpenAI (Groq por defecto).
use crate::errors::{ProviderError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: MessageRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: MessageRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: MessageRole::Assistant, content: content.into() }
    }
}

/// Ajustes de decodificación. La temperatura se mantiene en 0 para que el
/// mismo prompt produzca la misma salida en lo posible.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self { model: DEFAULT_MODEL.to_string(), temperature: 0.0, timeout: Duration::from_secs(30) }
    }
}

/// Modelo de lenguaje: mensajes → texto de la respuesta.
///
/// Una llamada produce exactamente una respuesta; las implementaciones no
/// reintentan.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Identificador del modelo que atiende las peticiones.
    fn model_id(&self) -> &str;

    /// Devuelve el contenido textual de la respuesta del asistente.
    async fn complete(&self, messages: &[Message]) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Extrae el texto del primer `choice`. Es el único "parser" de salida: no
/// se recorta, no se quitan fences ni se valida SQL.
pub(crate) fn parse_chat_response(body: &str) -> Result<String> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Generation(format!("respuesta malformada: {}", e)))?;
    parsed.choices
          .into_iter()
          .next()
          .and_then(|c| c.message.content)
          .ok_or_else(|| ProviderError::Generation("la respuesta no contiene texto".into()))
}

/// Cliente de `/chat/completions` (Groq, OpenAI y compatibles).
pub struct ChatCompletionsModel {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    settings: ModelSettings,
}

impl ChatCompletionsModel {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, settings: ModelSettings) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ProviderError::Config("falta la API key del modelo de lenguaje".into()));
        }
        // el timeout del cliente es una cota de seguridad; el límite real lo
        // aplica quien llama
        let client = reqwest::Client::builder().timeout(settings.timeout)
                                               .build()
                                               .map_err(|e| ProviderError::Config(format!("cliente HTTP: {}", e)))?;
        Ok(Self { client,
                  base_url: base_url.into().trim_end_matches('/').to_string(),
                  api_key,
                  settings })
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }
}

#[async_trait]
impl LanguageModel for ChatCompletionsModel {
    fn model_id(&self) -> &str {
        &self.settings.model
    }

    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest { model: &self.settings.model, temperature: self.settings.temperature, messages };
        log::debug!("Enviando {} mensajes al modelo {}", messages.len(), self.settings.model);

        let response = self.client
                           .post(&url)
                           .bearer_auth(&self.api_key)
                           .json(&request)
                           .send()
                           .await
                           .map_err(|e| {
                               if e.is_timeout() {
                                   ProviderError::Timeout(self.settings.timeout)
                               } else {
                                   ProviderError::Generation(format!("petición al modelo: {}", e))
                               }
                           })?;

        let status = response.status();
        let body = response.text()
                           .await
                           .map_err(|e| ProviderError::Generation(format!("lectura de la respuesta: {}", e)))?;
        if !status.is_success() {
            let snippet: String = body.chars().take(200).collect();
            return Err(ProviderError::Generation(format!("el modelo respondió {}: {}", status, snippet)));
        }
        parse_chat_response(&body)
    }
}
