// Archivo: retriever.rs
// Propósito: recuperador de top-k sobre un `ExampleIndex` compartido.
use crate::errors::{RagError, Result};
use crate::index::ExampleIndex;
use nl2sql_domain::SeedExample;
use std::sync::Arc;

pub const DEFAULT_TOP_K: usize = 2;

/// Recupera los `k` ejemplos semilla más parecidos a una pregunta.
#[derive(Debug, Clone)]
pub struct ExampleRetriever {
    index: Arc<ExampleIndex>,
    k: usize,
}

impl ExampleRetriever {
    pub fn new(index: Arc<ExampleIndex>, k: usize) -> Result<Self> {
        if k == 0 {
            return Err(RagError::InvalidK(k));
        }
        Ok(Self { index, k })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn index(&self) -> &ExampleIndex {
        &self.index
    }

    /// Ejemplos más similares, de mejor a peor.
    pub fn retrieve(&self, question: &str) -> Result<Vec<SeedExample>> {
        log::info!("Buscando {} ejemplos similares para: {}", self.k, question);
        let hits = self.index.search_scored(question, self.k)?;
        for h in &hits {
            log::debug!("  {:.3} {}", h.score, h.example.question());
        }
        log::info!("Encontrados {} ejemplos similares", hits.len());
        Ok(hits.into_iter().map(|h| h.example.clone()).collect())
    }
}
