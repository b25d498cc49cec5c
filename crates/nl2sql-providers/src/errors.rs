use std::time::Duration;
use thiserror::Error;

/// Errores de los proveedores externos.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProviderError {
    /// Falló el cálculo de un embedding.
    #[error("Error de embedding: {0}")]
    Embedding(String),
    /// El modelo respondió con error o con una respuesta malformada.
    #[error("Error de generación: {0}")]
    Generation(String),
    /// El modelo no respondió dentro del límite.
    #[error("El modelo no respondió en {0:?}")]
    Timeout(Duration),
    /// Configuración incompleta del proveedor (por ejemplo sin API key).
    #[error("Configuración inválida: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ProviderError>;
