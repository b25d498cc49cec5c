// Archivo: stubs.rs
// Propósito: modelo de lenguaje guionizado para pruebas y demos sin red.
use crate::errors::{ProviderError, Result};
use crate::llm::{LanguageModel, Message};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Modelo que responde con textos predefinidos.
///
/// Las respuestas encoladas se consumen en orden; cuando se agotan se usa la
/// respuesta por defecto. Guarda todos los mensajes recibidos.
pub struct ScriptedModel {
    default_reply: std::result::Result<String, ProviderError>,
    queue: Mutex<VecDeque<std::result::Result<String, ProviderError>>>,
    received: Mutex<Vec<Vec<Message>>>,
    delay: Option<Duration>,
}

impl ScriptedModel {
    /// Siempre responde `reply`.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self { default_reply: Ok(reply.into()),
               queue: Mutex::new(VecDeque::new()),
               received: Mutex::new(Vec::new()),
               delay: None }
    }

    /// Siempre falla con `ProviderError::Generation(message)`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self { default_reply: Err(ProviderError::Generation(message.into())),
               queue: Mutex::new(VecDeque::new()),
               received: Mutex::new(Vec::new()),
               delay: None }
    }

    /// Espera `delay` antes de responder (útil para probar timeouts).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Encola una respuesta que se devolverá antes que la por defecto.
    pub fn push_reply(&self, reply: impl Into<String>) {
        self.lock(&self.queue).push_back(Ok(reply.into()));
    }

    fn lock<'a, T>(&'a self, m: &'a Mutex<T>) -> MutexGuard<'a, T> {
        m.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Conversaciones recibidas, una por llamada.
    pub fn received(&self) -> Vec<Vec<Message>> {
        self.lock(&self.received).clone()
    }

    pub fn calls(&self) -> usize {
        self.lock(&self.received).len()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn model_id(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, messages: &[Message]) -> Result<String> {
        self.lock(&self.received).push(messages.to_vec());
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        let next = self.lock(&self.queue).pop_front();
        next.unwrap_or_else(|| self.default_reply.clone())
    }
}
