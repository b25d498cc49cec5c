// Archivo: index.rs
// Propósito: índice en memoria de ejemplos semilla con búsqueda por
// similitud coseno.
use crate::errors::{RagError, Result};
use nl2sql_domain::{SeedExample, SeedPair};
use nl2sql_providers::Embedder;
use rayon::prelude::*;
use std::fmt;
use std::sync::Arc;

/// Ejemplo recuperado junto con su similitud con la consulta.
#[derive(Debug, Clone, Copy)]
pub struct ScoredExample<'a> {
    pub score: f32,
    pub example: &'a SeedExample,
}

/// Índice inmutable de ejemplos semilla.
///
/// Todos los vectores tienen la misma dimensión y están normalizados, así
/// que la similitud coseno es el producto escalar.
pub struct ExampleIndex {
    examples: Vec<SeedExample>,
    embedder: Arc<dyn Embedder>,
    dimension: usize,
}

impl fmt::Debug for ExampleIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExampleIndex")
         .field("len", &self.examples.len())
         .field("dimension", &self.dimension)
         .finish_non_exhaustive()
    }
}

fn normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
    v
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

impl ExampleIndex {
    /// Embebe la pregunta de cada semilla y construye el índice.
    ///
    /// Los embeddings se calculan en paralelo pero el orden de inserción se
    /// conserva. Un solo fallo invalida la construcción completa.
    pub fn build(seeds: Vec<SeedPair>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        if seeds.is_empty() {
            return Err(RagError::Seeds("el corpus semilla está vacío".into()));
        }
        let dimension = embedder.dimension();
        log::info!("Construyendo índice de ejemplos: {} semillas, dimensión {}", seeds.len(), dimension);

        let vectors: Vec<Vec<f32>> = seeds.par_iter()
                                          .map(|s| embedder.embed(&s.question))
                                          .collect::<std::result::Result<_, _>>()?;

        let mut examples = Vec::with_capacity(seeds.len());
        for (pair, vector) in seeds.into_iter().zip(vectors) {
            if vector.len() != dimension {
                return Err(RagError::Dimension { expected: dimension, found: vector.len() });
            }
            examples.push(SeedExample::new(pair, normalize(vector)));
        }
        log::info!("Índice de ejemplos listo ({} entradas)", examples.len());
        Ok(Self { examples, embedder, dimension })
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Ejemplos en orden de inserción.
    pub fn examples(&self) -> &[SeedExample] {
        &self.examples
    }

    /// Los `k` ejemplos más similares a `query`, de mejor a peor. Los
    /// empates conservan el orden de inserción. Si `k` supera el tamaño del
    /// índice se devuelven todos.
    pub fn search_scored(&self, query: &str, k: usize) -> Result<Vec<ScoredExample<'_>>> {
        if k == 0 {
            return Err(RagError::InvalidK(k));
        }
        let q = self.embedder.embed(query)?;
        if q.len() != self.dimension {
            return Err(RagError::Dimension { expected: self.dimension, found: q.len() });
        }
        let q = normalize(q);

        let mut scored: Vec<ScoredExample<'_>> =
            self.examples
                .iter()
                .map(|e| {
                    // un NaN de un embedder externo cuenta como la peor similitud
                    let score = dot(&q, e.embedding());
                    ScoredExample { score: if score.is_nan() { f32::NEG_INFINITY } else { score }, example: e }
                })
                .collect();
        // orden total y estable: a igual puntuación gana el que se insertó antes
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        Ok(scored)
    }

    /// Igual que `search_scored` pero sin las puntuaciones.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<&SeedExample>> {
        Ok(self.search_scored(query, k)?.into_iter().map(|s| s.example).collect())
    }
}
