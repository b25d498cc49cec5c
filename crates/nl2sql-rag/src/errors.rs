// Archivo: errors.rs
// Propósito: errores del índice de ejemplos, la recuperación y la carga de
// semillas.
use nl2sql_providers::ProviderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RagError {
    /// Falló el proveedor de embeddings.
    #[error("Error del proveedor: {0}")]
    Provider(#[from] ProviderError),
    /// Un vector no tiene la dimensión del resto del índice.
    #[error("Dimensión inconsistente: se esperaba {expected}, llegó {found}")]
    Dimension { expected: usize, found: usize },
    /// `k` fuera de rango.
    #[error("k debe ser >= 1 (recibido {0})")]
    InvalidK(usize),
    /// Corpus semilla vacío o inválido.
    #[error("Semillas inválidas: {0}")]
    Seeds(String),
}

pub type Result<T> = std::result::Result<T, RagError>;
